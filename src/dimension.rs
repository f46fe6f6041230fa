use std::fmt;

use crate::location::Location;

/// Dimension of a geometry or of an intersection set.
///
/// `False` denotes the empty set. The ordering `False < P < L < A` is
/// what makes intersection-matrix updates monotone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Dimension {
    False,
    P,
    L,
    A,
}

impl Dimension {
    pub fn symbol(&self) -> char {
        match self {
            Dimension::False => 'F',
            Dimension::P => '0',
            Dimension::L => '1',
            Dimension::A => '2',
        }
    }

    pub fn from_symbol(c: char) -> Option<Dimension> {
        match c {
            'F' | 'f' => Some(Dimension::False),
            '0' => Some(Dimension::P),
            '1' => Some(Dimension::L),
            '2' => Some(Dimension::A),
            _ => None,
        }
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

/// Combined (dimension, location) code for a point probed against a
/// geometry, reporting the highest-dimensional element containing it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DimensionLocation {
    Exterior,
    Point,
    LineInterior,
    LineBoundary,
    AreaInterior,
    AreaBoundary,
}

impl DimensionLocation {
    pub fn area(loc: Location) -> DimensionLocation {
        match loc {
            Location::Interior => DimensionLocation::AreaInterior,
            Location::Boundary => DimensionLocation::AreaBoundary,
            _ => DimensionLocation::Exterior,
        }
    }

    pub fn line(loc: Location) -> DimensionLocation {
        match loc {
            Location::Interior => DimensionLocation::LineInterior,
            Location::Boundary => DimensionLocation::LineBoundary,
            _ => DimensionLocation::Exterior,
        }
    }

    pub fn dimension(&self) -> Dimension {
        match self {
            DimensionLocation::Point => Dimension::P,
            DimensionLocation::LineInterior | DimensionLocation::LineBoundary => Dimension::L,
            DimensionLocation::AreaInterior | DimensionLocation::AreaBoundary => Dimension::A,
            DimensionLocation::Exterior => Dimension::False,
        }
    }

    pub fn location(&self) -> Location {
        match self {
            DimensionLocation::Point
            | DimensionLocation::LineInterior
            | DimensionLocation::AreaInterior => Location::Interior,
            DimensionLocation::LineBoundary | DimensionLocation::AreaBoundary => {
                Location::Boundary
            }
            DimensionLocation::Exterior => Location::Exterior,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dimension_ordering_is_monotone() {
        assert!(Dimension::False < Dimension::P);
        assert!(Dimension::P < Dimension::L);
        assert!(Dimension::L < Dimension::A);
    }

    #[test]
    fn dim_location_roundtrip() {
        let dl = DimensionLocation::area(Location::Boundary);
        assert_eq!(dl.dimension(), Dimension::A);
        assert_eq!(dl.location(), Location::Boundary);
        assert_eq!(DimensionLocation::Exterior.location(), Location::Exterior);
        assert_eq!(DimensionLocation::Exterior.dimension(), Dimension::False);
    }
}
