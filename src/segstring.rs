use geo::winding_order::{Winding, WindingOrder};
use geo::{Coordinate, GeoFloat, Line, LineString};

use crate::dimension::Dimension;
use crate::node::NodeSection;

fn eq2d<T: GeoFloat>(p: Coordinate<T>, q: Coordinate<T>) -> bool {
    p.x == q.x && p.y == q.y
}

/// An ordered run of segments from one element of an input geometry,
/// tagged with enough identity to reconstruct topology at the nodes
/// discovered on it.
///
/// Ring strings are normalized so shells wind clockwise and holes
/// counter-clockwise, putting the polygon interior on the right of
/// travel; repeated points are removed on construction.
#[derive(Debug)]
pub(crate) struct SegmentString<T: GeoFloat> {
    is_a: bool,
    dim: Dimension,
    element_id: usize,
    ring_id: Option<usize>,
    parent_poly: Option<usize>,
    pts: Vec<Coordinate<T>>,
}

impl<T: GeoFloat> SegmentString<T> {
    pub(crate) fn create_line(line: &LineString<T>, is_a: bool, element_id: usize) -> Self {
        SegmentString {
            is_a,
            dim: Dimension::L,
            element_id,
            ring_id: None,
            parent_poly: None,
            pts: remove_repeated(&line.0),
        }
    }

    /// `ring_id` 0 is the shell, `i > 0` the i-th hole. `parent_poly`
    /// is the walk ordinal of the polygon the ring bounds, used to
    /// answer node-in-area queries without self-incidence.
    pub(crate) fn create_ring(
        ring: &LineString<T>,
        is_a: bool,
        element_id: usize,
        ring_id: usize,
        parent_poly: usize,
    ) -> Self {
        let want_cw = ring_id == 0;
        let mut pts = remove_repeated(&ring.0);
        let is_cw = matches!(ring.winding_order(), Some(WindingOrder::Clockwise));
        if is_cw != want_cw {
            pts.reverse();
        }
        SegmentString {
            is_a,
            dim: Dimension::A,
            element_id,
            ring_id: Some(ring_id),
            parent_poly: Some(parent_poly),
            pts,
        }
    }

    pub(crate) fn is_a(&self) -> bool {
        self.is_a
    }

    pub(crate) fn dim(&self) -> Dimension {
        self.dim
    }

    pub(crate) fn element_id(&self) -> usize {
        self.element_id
    }

    pub(crate) fn ring_id(&self) -> Option<usize> {
        self.ring_id
    }

    pub(crate) fn num_segments(&self) -> usize {
        self.pts.len().saturating_sub(1)
    }

    pub(crate) fn segment(&self, i: usize) -> Line<T> {
        Line::new(self.pts[i], self.pts[i + 1])
    }

    fn is_closed(&self) -> bool {
        self.pts.len() > 2 && eq2d(self.pts[0], self.pts[self.pts.len() - 1])
    }

    /// Whether this segment is the canonical owner of an intersection at
    /// `pt`, so that endpoint intersections are processed exactly once.
    /// A segment owns its start vertex, its interior, and (for the final
    /// segment of an open string) its end vertex.
    pub(crate) fn is_containing_segment(&self, seg_index: usize, pt: Coordinate<T>) -> bool {
        if eq2d(pt, self.pts[seg_index]) {
            return true;
        }
        if eq2d(pt, self.pts[seg_index + 1]) {
            let is_final = seg_index == self.num_segments() - 1;
            return is_final && !self.is_closed();
        }
        true
    }

    pub(crate) fn create_node_section(
        &self,
        seg_index: usize,
        int_pt: Coordinate<T>,
    ) -> NodeSection<T> {
        let c0 = self.pts[seg_index];
        let c1 = self.pts[seg_index + 1];
        let is_node_at_vertex = eq2d(int_pt, c0) || eq2d(int_pt, c1);
        NodeSection {
            is_a: self.is_a,
            dim: self.dim,
            element_id: self.element_id,
            ring_id: self.ring_id,
            is_node_at_vertex,
            parent_poly: self.parent_poly,
            node_pt: int_pt,
            prev: self.prev_vertex(seg_index, int_pt),
            next: self.next_vertex(seg_index, int_pt),
        }
    }

    /// The vertex before `pt` along the string, wrapping on rings.
    /// `None` when `pt` sits at the start of an open string.
    fn prev_vertex(&self, seg_index: usize, pt: Coordinate<T>) -> Option<Coordinate<T>> {
        let seg_start = self.pts[seg_index];
        if !eq2d(pt, seg_start) {
            return Some(seg_start);
        }
        if seg_index > 0 {
            return Some(self.pts[seg_index - 1]);
        }
        if self.is_closed() {
            // last point repeats the first
            return Some(self.pts[self.pts.len() - 2]);
        }
        None
    }

    /// The vertex after `pt` along the string, wrapping on rings.
    /// `None` when `pt` sits at the end of an open string.
    fn next_vertex(&self, seg_index: usize, pt: Coordinate<T>) -> Option<Coordinate<T>> {
        let seg_end = self.pts[seg_index + 1];
        if !eq2d(pt, seg_end) {
            return Some(seg_end);
        }
        if seg_index + 2 < self.pts.len() {
            return Some(self.pts[seg_index + 2]);
        }
        if self.is_closed() {
            return Some(self.pts[1]);
        }
        None
    }
}

fn remove_repeated<T: GeoFloat>(pts: &[Coordinate<T>]) -> Vec<Coordinate<T>> {
    let mut out: Vec<Coordinate<T>> = Vec::with_capacity(pts.len());
    for &p in pts {
        if out.last().map_or(true, |&q| !eq2d(p, q)) {
            out.push(p);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::{line_string, polygon};

    fn c(x: f64, y: f64) -> Coordinate<f64> {
        Coordinate { x, y }
    }

    #[test]
    fn repeated_points_removed() {
        let l = line_string![(x: 0., y: 0.), (x: 0., y: 0.), (x: 1., y: 0.), (x: 1., y: 0.), (x: 2., y: 0.)];
        let ss = SegmentString::create_line(&l, true, 0);
        assert_eq!(ss.num_segments(), 2);
    }

    #[test]
    fn ring_orientation_normalized() {
        // a counter-clockwise shell gets flipped to clockwise
        let poly = polygon![(x: 0., y: 0.), (x: 2., y: 0.), (x: 2., y: 2.), (x: 0., y: 2.), (x: 0., y: 0.)];
        let ss = SegmentString::create_ring(poly.exterior(), true, 0, 0, 0);
        // clockwise from (0,0) goes up the left edge first
        assert_eq!(ss.segment(0), Line::new(c(0., 0.), c(0., 2.)));
    }

    #[test]
    fn vertex_neighbours_on_open_line() {
        let l = line_string![(x: 0., y: 0.), (x: 1., y: 0.), (x: 2., y: 1.)];
        let ss = SegmentString::create_line(&l, true, 0);
        // interior of first segment
        let ns = ss.create_node_section(0, c(0.5, 0.));
        assert!(ns.is_proper());
        assert_eq!(ns.prev, Some(c(0., 0.)));
        assert_eq!(ns.next, Some(c(1., 0.)));
        // start of the string: no previous vertex
        let ns = ss.create_node_section(0, c(0., 0.));
        assert!(!ns.is_proper());
        assert_eq!(ns.prev, None);
        assert_eq!(ns.next, Some(c(1., 0.)));
        // shared interior vertex
        let ns = ss.create_node_section(1, c(1., 0.));
        assert_eq!(ns.prev, Some(c(0., 0.)));
        assert_eq!(ns.next, Some(c(2., 1.)));
    }

    #[test]
    fn vertex_neighbours_wrap_on_ring() {
        let poly = polygon![(x: 0., y: 0.), (x: 0., y: 2.), (x: 2., y: 2.), (x: 2., y: 0.), (x: 0., y: 0.)];
        let ss = SegmentString::create_ring(poly.exterior(), false, 3, 0, 0);
        let ns = ss.create_node_section(0, c(0., 0.));
        assert_eq!(ns.prev, Some(c(2., 0.)));
        assert_eq!(ns.next, Some(c(0., 2.)));
        assert_eq!(ns.ring_id, Some(0));
        assert!(!ns.is_a);
    }

    #[test]
    fn endpoint_ownership() {
        let l = line_string![(x: 0., y: 0.), (x: 1., y: 0.), (x: 2., y: 0.)];
        let ss = SegmentString::create_line(&l, true, 0);
        // shared vertex (1,0) is owned by the segment it starts
        assert!(!ss.is_containing_segment(0, c(1., 0.)));
        assert!(ss.is_containing_segment(1, c(1., 0.)));
        // final endpoint of an open string is owned by the last segment
        assert!(ss.is_containing_segment(1, c(2., 0.)));
        // interior points always owned
        assert!(ss.is_containing_segment(0, c(0.5, 0.)));
    }
}
