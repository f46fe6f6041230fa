use std::cmp::Ordering;

use geo::kernels::{HasKernel, Kernel, Orientation};
use geo::{Coordinate, GeoFloat};

/// Wraps a [`Coordinate`] to support total lexicographic ordering.
///
/// The ordering is by `x` and then by `y`, which is enough to key node
/// maps and point sets. The trait impls exist even though `T` is not
/// `Ord`; construction asserts the components are finite so that the
/// ordering is in fact total (non-finite inputs are rejected by the
/// facade before any key is built).
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct PtKey<T: GeoFloat>(pub Coordinate<T>);

impl<T: GeoFloat> From<Coordinate<T>> for PtKey<T> {
    fn from(pt: Coordinate<T>) -> Self {
        debug_assert!(
            pt.x.is_finite() && pt.y.is_finite(),
            "point key requires finite coordinates"
        );
        PtKey(pt)
    }
}

impl<T: GeoFloat> PartialOrd for PtKey<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match self.0.x.partial_cmp(&other.0.x) {
            Some(Ordering::Equal) => self.0.y.partial_cmp(&other.0.y),
            o => o,
        }
    }
}

impl<T: GeoFloat> Ord for PtKey<T> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.partial_cmp(other).unwrap()
    }
}

impl<T: GeoFloat> Eq for PtKey<T> {}

/// Quadrant of the vector `origin -> p`, counter-clockwise from the
/// positive x axis. The assignment on axis directions (+x and +y to 0,
/// -x to 1, -y to 3) is arbitrary but consistent with the within-quadrant
/// orientation tie-break in [`polar_compare`].
pub(crate) fn quadrant<T: GeoFloat>(origin: Coordinate<T>, p: Coordinate<T>) -> u8 {
    let dx = p.x - origin.x;
    let dy = p.y - origin.y;
    debug_assert!(!(dx == T::zero() && dy == T::zero()), "zero-length direction");
    if dx >= T::zero() {
        if dy >= T::zero() {
            0
        } else {
            3
        }
    } else if dy >= T::zero() {
        1
    } else {
        2
    }
}

/// Compare the counter-clockwise angles of `p` and `q` around `origin`,
/// measured from the positive x axis.
///
/// Uses quadrants plus the orientation kernel, so collinear same-direction
/// vectors compare equal regardless of length.
pub(crate) fn polar_compare<T: GeoFloat>(
    origin: Coordinate<T>,
    p: Coordinate<T>,
    q: Coordinate<T>,
) -> Ordering {
    let qp = quadrant(origin, p);
    let qq = quadrant(origin, q);
    if qp != qq {
        return qp.cmp(&qq);
    }
    match T::Ker::orient2d(origin, q, p) {
        Orientation::CounterClockwise => Ordering::Greater,
        Orientation::Clockwise => Ordering::Less,
        Orientation::Collinear => Ordering::Equal,
    }
}

/// Whether the angle of `origin -> p` is strictly greater than that of
/// `origin -> q` (counter-clockwise from +x).
pub(crate) fn is_angle_greater<T: GeoFloat>(
    origin: Coordinate<T>,
    p: Coordinate<T>,
    q: Coordinate<T>,
) -> bool {
    polar_compare(origin, p, q) == Ordering::Greater
}

/// Whether `p` lies strictly within the counter-clockwise sector from
/// `e0` to `e1` around `origin`.
fn is_between<T: GeoFloat>(
    origin: Coordinate<T>,
    p: Coordinate<T>,
    e0: Coordinate<T>,
    e1: Coordinate<T>,
) -> bool {
    is_angle_greater(origin, p, e0) && !is_angle_greater(origin, p, e1)
}

/// Whether the path `b0 - node - b1` crosses the path `a0 - node - a1`
/// at the node, i.e. the `b` arms leave through opposite sectors cut by
/// the `a` arms. Used to detect area/area interior crossings at
/// non-proper intersection nodes.
pub(crate) fn is_crossing<T: GeoFloat>(
    node: Coordinate<T>,
    a0: Coordinate<T>,
    a1: Coordinate<T>,
    b0: Coordinate<T>,
    b1: Coordinate<T>,
) -> bool {
    let (lo, hi) = if is_angle_greater(node, a0, a1) {
        (a1, a0)
    } else {
        (a0, a1)
    };
    is_between(node, b0, lo, hi) != is_between(node, b1, lo, hi)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn c(x: f64, y: f64) -> Coordinate<f64> {
        Coordinate { x, y }
    }

    #[test]
    fn pt_key_ordering() {
        let p1 = PtKey::from(c(0., 0.));
        let p2 = PtKey::from(c(1., 0.));
        let p3 = PtKey::from(c(1., 1.));
        assert!(p1 < p2);
        assert!(p2 < p3);
        assert!(p1 < p3);
    }

    #[test]
    fn quadrants() {
        let o = c(0., 0.);
        assert_eq!(quadrant(o, c(1., 0.)), 0);
        assert_eq!(quadrant(o, c(1., 1.)), 0);
        assert_eq!(quadrant(o, c(0., 1.)), 0);
        assert_eq!(quadrant(o, c(-1., 1.)), 1);
        assert_eq!(quadrant(o, c(-1., -1.)), 2);
        assert_eq!(quadrant(o, c(1., -1.)), 3);
        assert_eq!(quadrant(o, c(0., -1.)), 3);
    }

    #[test]
    fn polar_ordering_goes_ccw() {
        let o = c(0., 0.);
        let dirs = [c(1., 0.), c(1., 1.), c(0., 1.), c(-1., 0.), c(0., -2.)];
        for w in dirs.windows(2) {
            assert_eq!(polar_compare(o, w[0], w[1]), Ordering::Less);
        }
        // collinear same direction, different length
        assert_eq!(polar_compare(o, c(2., 2.), c(5., 5.)), Ordering::Equal);
    }

    #[test]
    fn crossing_detection() {
        let n = c(0., 0.);
        // straight horizontal path crossed by a vertical one
        assert!(is_crossing(n, c(-1., 0.), c(1., 0.), c(0., -1.), c(0., 1.)));
        // path that touches and turns back stays on one side
        assert!(!is_crossing(n, c(-1., 0.), c(1., 0.), c(-1., 1.), c(1., 1.)));
    }
}
