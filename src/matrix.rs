use std::fmt;
use std::str::FromStr;

use log::warn;

use crate::dimension::Dimension;
use crate::error::RelateError;
use crate::location::Location;

/// A DE-9IM intersection matrix.
///
/// Rows are the interior/boundary/exterior of the first geometry, columns
/// of the second; each cell holds the dimension of the intersection of
/// that pair of point sets. Cells only ever increase while a relate
/// computation runs ([`IntersectionMatrix::set_at_least`] is the sole
/// mutator used), which is what allows predicates to conclude early.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IntersectionMatrix {
    dims: [[Dimension; 3]; 3],
}

impl Default for IntersectionMatrix {
    fn default() -> Self {
        IntersectionMatrix {
            dims: [[Dimension::False; 3]; 3],
        }
    }
}

impl IntersectionMatrix {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn get(&self, row: Location, col: Location) -> Dimension {
        self.dims[row.index()][col.index()]
    }

    pub fn set(&mut self, row: Location, col: Location, dim: Dimension) {
        self.dims[row.index()][col.index()] = dim;
    }

    /// Monotone update: raise the cell to `dim` if it is currently lower.
    /// A lower `dim` leaves the cell alone, so repeated discovery of the
    /// same interaction can never lose information.
    pub fn set_at_least(&mut self, row: Location, col: Location, dim: Dimension) {
        let cell = &mut self.dims[row.index()][col.index()];
        if *cell < dim {
            *cell = dim;
        }
    }

    /// Like `set_at_least` but asserts the update is non-decreasing
    /// for the exact cell semantics (used by the topology computer).
    pub(crate) fn update(&mut self, row: Location, col: Location, dim: Dimension) {
        if row == Location::NoneLoc || col == Location::NoneLoc {
            debug_assert!(false, "matrix update with NoneLoc location");
            warn!("ignoring matrix update at NoneLoc");
            return;
        }
        self.set_at_least(row, col, dim);
    }

    /// Match against a DE-9IM pattern of 9 chars over `F T 0 1 2 *`.
    pub fn matches(&self, pattern: &str) -> Result<bool, RelateError> {
        let pat = Pattern::from_str(pattern)?;
        Ok(pat.matches(self))
    }

    /// The matrix of the arguments swapped: `relate(B, A)` is the
    /// transpose of `relate(A, B)`.
    pub fn transposed(&self) -> IntersectionMatrix {
        let mut out = IntersectionMatrix::new();
        for row in 0..3 {
            for col in 0..3 {
                out.dims[col][row] = self.dims[row][col];
            }
        }
        out
    }

    fn cell(&self, i: usize) -> Dimension {
        self.dims[i / 3][i % 3]
    }
}

impl fmt::Display for IntersectionMatrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in &self.dims {
            for d in row {
                write!(f, "{}", d.symbol())?;
            }
        }
        Ok(())
    }
}

impl FromStr for IntersectionMatrix {
    type Err = RelateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.chars().count() != 9 {
            return Err(RelateError::InvalidPattern(s.to_string()));
        }
        let mut im = IntersectionMatrix::new();
        for (i, c) in s.chars().enumerate() {
            let dim = Dimension::from_symbol(c)
                .ok_or_else(|| RelateError::InvalidPattern(s.to_string()))?;
            im.dims[i / 3][i % 3] = dim;
        }
        Ok(im)
    }
}

/// One cell constraint of a DE-9IM pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum CellPattern {
    Any,
    True,
    False,
    Dim(Dimension),
}

impl CellPattern {
    pub(crate) fn matches(&self, dim: Dimension) -> bool {
        match self {
            CellPattern::Any => true,
            CellPattern::True => dim != Dimension::False,
            CellPattern::False => dim == Dimension::False,
            CellPattern::Dim(d) => dim == *d,
        }
    }

    /// With monotone cell values, can this constraint still be met once
    /// the cell has reached `dim`?
    pub(crate) fn satisfiable_at(&self, dim: Dimension) -> bool {
        match self {
            CellPattern::Any | CellPattern::True => true,
            CellPattern::False => dim == Dimension::False,
            CellPattern::Dim(d) => dim <= *d,
        }
    }
}

/// A parsed DE-9IM pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Pattern {
    cells: [CellPattern; 9],
}

impl Pattern {
    pub(crate) fn cells(&self) -> &[CellPattern; 9] {
        &self.cells
    }

    pub(crate) fn matches(&self, im: &IntersectionMatrix) -> bool {
        (0..9).all(|i| self.cells[i].matches(im.cell(i)))
    }
}

impl FromStr for Pattern {
    type Err = RelateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut cells = [CellPattern::Any; 9];
        let mut n = 0;
        for (i, c) in s.chars().enumerate() {
            if i >= 9 {
                return Err(RelateError::InvalidPattern(s.to_string()));
            }
            cells[i] = match c {
                '*' => CellPattern::Any,
                'T' | 't' => CellPattern::True,
                'F' | 'f' => CellPattern::False,
                _ => Dimension::from_symbol(c)
                    .filter(|d| *d != Dimension::False)
                    .map(CellPattern::Dim)
                    .ok_or_else(|| RelateError::InvalidPattern(s.to_string()))?,
            };
            n += 1;
        }
        if n != 9 {
            return Err(RelateError::InvalidPattern(s.to_string()));
        }
        Ok(Pattern { cells })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use Location::*;

    #[test]
    fn empty_matrix_is_all_false() {
        let im = IntersectionMatrix::new();
        assert_eq!(im.to_string(), "FFFFFFFFF");
        assert!(im.matches("FFFFFFFFF").unwrap());
        assert!(im.matches("*********").unwrap());
    }

    #[test]
    fn set_at_least_is_monotone() {
        let mut im = IntersectionMatrix::new();
        im.set_at_least(Interior, Interior, Dimension::P);
        im.set_at_least(Interior, Interior, Dimension::L);
        assert_eq!(im.get(Interior, Interior), Dimension::L);
        // lower request leaves the cell alone
        im.set_at_least(Interior, Interior, Dimension::P);
        assert_eq!(im.get(Interior, Interior), Dimension::L);
    }

    #[test]
    fn pattern_match_semantics() {
        let im: IntersectionMatrix = "212101212".parse().unwrap();
        assert!(im.matches("T*T***T**").unwrap()); // overlaps (A/A)
        assert!(!im.matches("T*F**F***").unwrap()); // within
        assert!(im.matches("212101212").unwrap());
        assert!(!im.matches("2121012FF").unwrap());
    }

    #[test]
    fn string_roundtrip() {
        for s in &["FF0FFF0F2", "1FFF0FFF2", "212101212", "FFFFFFFF2"] {
            let im: IntersectionMatrix = s.parse().unwrap();
            assert_eq!(&im.to_string(), s);
        }
    }

    #[test]
    fn bad_patterns_rejected() {
        let im = IntersectionMatrix::new();
        assert!(im.matches("TTTT").is_err());
        assert!(im.matches("TTTTTTTTX").is_err());
        assert!("F".parse::<IntersectionMatrix>().is_err());
    }

    #[test]
    fn satisfiable_tracking() {
        assert!(CellPattern::False.satisfiable_at(Dimension::False));
        assert!(!CellPattern::False.satisfiable_at(Dimension::P));
        assert!(CellPattern::Dim(Dimension::L).satisfiable_at(Dimension::P));
        assert!(!CellPattern::Dim(Dimension::P).satisfiable_at(Dimension::L));
        assert!(CellPattern::True.satisfiable_at(Dimension::False));
    }
}
