use std::collections::BTreeMap;

use geo::{Coordinate, GeoFloat, LineString};

use crate::coords::PtKey;

/// Strategy deciding whether a line endpoint with a given incidence
/// count lies on the boundary of its geometry.
///
/// The OGC/SFS convention is [`BoundaryNodeRule::Mod2`]: an endpoint is
/// on the boundary iff an odd number of line ends meet there.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoundaryNodeRule {
    /// Boundary iff the endpoint count is odd (OGC SFS). The default.
    Mod2,
    /// Boundary iff at least one line ends there.
    Endpoint,
    /// Boundary iff more than one line ends there.
    MultivalentEndpoint,
    /// Boundary iff exactly one line ends there.
    MonovalentEndpoint,
}

impl Default for BoundaryNodeRule {
    fn default() -> Self {
        BoundaryNodeRule::Mod2
    }
}

impl BoundaryNodeRule {
    pub fn is_in_boundary(&self, boundary_count: usize) -> bool {
        match self {
            BoundaryNodeRule::Mod2 => boundary_count % 2 == 1,
            BoundaryNodeRule::Endpoint => boundary_count > 0,
            BoundaryNodeRule::MultivalentEndpoint => boundary_count > 1,
            BoundaryNodeRule::MonovalentEndpoint => boundary_count == 1,
        }
    }
}

/// Endpoint-count index over the linear components of a geometry,
/// answering boundary queries under a [`BoundaryNodeRule`].
///
/// Closed lines contribute two coincident ends and so never produce a
/// Mod2 boundary, which is the SFS behaviour for rings.
#[derive(Debug)]
pub(crate) struct LinearBoundary<T: GeoFloat> {
    counts: BTreeMap<PtKey<T>, usize>,
    has_boundary: bool,
    rule: BoundaryNodeRule,
}

impl<T: GeoFloat> LinearBoundary<T> {
    pub(crate) fn new<'a, I>(lines: I, rule: BoundaryNodeRule) -> Self
    where
        I: IntoIterator<Item = &'a LineString<T>>,
        T: 'a,
    {
        let mut counts = BTreeMap::new();
        for line in lines {
            let n = line.0.len();
            if n == 0 {
                continue;
            }
            Self::add_endpoint(&mut counts, line.0[0]);
            Self::add_endpoint(&mut counts, line.0[n - 1]);
        }
        let has_boundary = counts.values().any(|&c| rule.is_in_boundary(c));
        LinearBoundary {
            counts,
            has_boundary,
            rule,
        }
    }

    fn add_endpoint(counts: &mut BTreeMap<PtKey<T>, usize>, pt: Coordinate<T>) {
        *counts.entry(pt.into()).or_insert(0) += 1;
    }

    /// Whether any endpoint of the indexed lines is a boundary point.
    pub(crate) fn has_boundary(&self) -> bool {
        self.has_boundary
    }

    pub(crate) fn is_boundary(&self, pt: Coordinate<T>) -> bool {
        match self.counts.get(&pt.into()) {
            Some(&n) => self.rule.is_in_boundary(n),
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::line_string;

    #[test]
    fn rule_semantics() {
        use BoundaryNodeRule::*;
        assert!(Mod2.is_in_boundary(1));
        assert!(!Mod2.is_in_boundary(2));
        assert!(Mod2.is_in_boundary(3));
        assert!(Endpoint.is_in_boundary(1));
        assert!(Endpoint.is_in_boundary(2));
        assert!(!Endpoint.is_in_boundary(0));
        assert!(!MultivalentEndpoint.is_in_boundary(1));
        assert!(MultivalentEndpoint.is_in_boundary(2));
        assert!(MonovalentEndpoint.is_in_boundary(1));
        assert!(!MonovalentEndpoint.is_in_boundary(2));
    }

    #[test]
    fn open_line_ends_are_boundary_under_mod2() {
        let l = line_string![(x: 0., y: 0.), (x: 1., y: 0.), (x: 1., y: 1.)];
        let lb = LinearBoundary::new([&l], BoundaryNodeRule::Mod2);
        assert!(lb.has_boundary());
        assert!(lb.is_boundary(Coordinate { x: 0., y: 0. }));
        assert!(lb.is_boundary(Coordinate { x: 1., y: 1. }));
        assert!(!lb.is_boundary(Coordinate { x: 1., y: 0. }));
    }

    #[test]
    fn closed_line_has_no_mod2_boundary() {
        let l = line_string![(x: 0., y: 0.), (x: 1., y: 0.), (x: 0., y: 1.), (x: 0., y: 0.)];
        let lb = LinearBoundary::new([&l], BoundaryNodeRule::Mod2);
        assert!(!lb.has_boundary());
        assert!(!lb.is_boundary(Coordinate { x: 0., y: 0. }));
        // ... but it is under the Endpoint rule
        let lb = LinearBoundary::new([&l], BoundaryNodeRule::Endpoint);
        assert!(lb.is_boundary(Coordinate { x: 0., y: 0. }));
    }

    #[test]
    fn touching_lines_cancel_under_mod2() {
        let l1 = line_string![(x: 0., y: 0.), (x: 1., y: 0.)];
        let l2 = line_string![(x: 1., y: 0.), (x: 2., y: 0.)];
        let lb = LinearBoundary::new(vec![&l1, &l2], BoundaryNodeRule::Mod2);
        assert!(!lb.is_boundary(Coordinate { x: 1., y: 0. }));
        assert!(lb.is_boundary(Coordinate { x: 0., y: 0. }));
        assert!(lb.is_boundary(Coordinate { x: 2., y: 0. }));
    }
}
