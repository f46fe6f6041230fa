use std::cmp::Ordering;

use geo::{Coordinate, GeoFloat};
use log::trace;
use smallvec::SmallVec;

use crate::coords::polar_compare;
use crate::dimension::Dimension;
use crate::location::Location;

/// Side of a directed edge ray leaving a node, or the ray itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Position {
    Left,
    Right,
    On,
}

/// One incidence of an input's linework at a node: the segment-string
/// element it came from and the vertices before and after the node.
///
/// Area sections arise from polygon rings (oriented so the polygon
/// interior lies to the right of travel); line sections from
/// line strings. `prev`/`next` are `None` at an open line end.
#[derive(Debug, Clone, Copy)]
pub(crate) struct NodeSection<T: GeoFloat> {
    pub is_a: bool,
    pub dim: Dimension,
    pub element_id: usize,
    pub ring_id: Option<usize>,
    pub is_node_at_vertex: bool,
    /// Ordinal of the polygon owning the ring, in depth-first walk
    /// order of its input geometry.
    pub parent_poly: Option<usize>,
    pub node_pt: Coordinate<T>,
    pub prev: Option<Coordinate<T>>,
    pub next: Option<Coordinate<T>>,
}

impl<T: GeoFloat> NodeSection<T> {
    /// A proper intersection lies strictly inside both segments, so the
    /// node cannot be at a vertex of this section.
    pub fn is_proper(&self) -> bool {
        !self.is_node_at_vertex
    }

    pub fn is_same_geometry(&self, other: &Self) -> bool {
        self.is_a == other.is_a
    }

    pub fn is_area(&self) -> bool {
        self.dim == Dimension::A
    }
}

/// Per-input topology labels of a [`RelateEdge`].
///
/// `dim` is `None` while the input has no edge along the ray; the
/// locations are then filled in by propagation around the node.
#[derive(Debug, Clone, Copy)]
struct EdgeLabel {
    dim: Option<Dimension>,
    left: Location,
    right: Location,
    on: Location,
}

impl EdgeLabel {
    fn unknown() -> Self {
        EdgeLabel {
            dim: None,
            left: Location::NoneLoc,
            right: Location::NoneLoc,
            on: Location::NoneLoc,
        }
    }

    fn line() -> Self {
        EdgeLabel {
            dim: Some(Dimension::L),
            left: Location::Exterior,
            right: Location::Exterior,
            on: Location::Interior,
        }
    }

    /// A ring edge: travelling forward the polygon interior is on the
    /// right (shells are normalized clockwise, holes counter-clockwise),
    /// so a ray toward the next vertex carries Interior on its right and
    /// a ray back toward the previous vertex carries it on its left.
    fn area(is_forward: bool) -> Self {
        let (left, right) = if is_forward {
            (Location::Exterior, Location::Interior)
        } else {
            (Location::Interior, Location::Exterior)
        };
        EdgeLabel {
            dim: Some(Dimension::A),
            left,
            right,
            on: Location::Boundary,
        }
    }

    fn merge(&mut self, incoming: EdgeLabel) {
        match (self.dim, incoming.dim) {
            (None, _) => *self = incoming,
            (Some(Dimension::L), Some(Dimension::A)) => {
                // an area boundary subsumes a collinear line edge
                let mut merged = incoming;
                merged.merge_sides(*self);
                *self = merged;
            }
            (Some(Dimension::A), Some(Dimension::A)) => self.merge_sides(incoming),
            // line onto line, or line onto area boundary: nothing new
            _ => {}
        }
    }

    /// Interior wins on each side; two rings of the same input sharing a
    /// ray (a shell touching a hole, adjacent polygons) leave Interior
    /// wherever either claims it.
    fn merge_sides(&mut self, other: EdgeLabel) {
        if self.left != Location::Interior && other.left == Location::Interior {
            self.left = Location::Interior;
        }
        if self.right != Location::Interior && other.right == Location::Interior {
            self.right = Location::Interior;
        }
    }

    fn set_all(&mut self, loc: Location) {
        self.left = loc;
        self.right = loc;
        self.on = loc;
    }

    fn is_known(&self) -> bool {
        self.dim.is_some()
    }
}

/// A unique outgoing ray direction at a node, carrying the location of
/// each input on the ray and on both its sides.
#[derive(Debug, Clone, Copy)]
pub(crate) struct RelateEdge<T: GeoFloat> {
    dir_pt: Coordinate<T>,
    a: EdgeLabel,
    b: EdgeLabel,
}

impl<T: GeoFloat> RelateEdge<T> {
    fn new(dir_pt: Coordinate<T>, is_a: bool, label: EdgeLabel) -> Self {
        let mut e = RelateEdge {
            dir_pt,
            a: EdgeLabel::unknown(),
            b: EdgeLabel::unknown(),
        };
        *e.label_mut(is_a) = label;
        e
    }

    fn label(&self, is_a: bool) -> &EdgeLabel {
        if is_a {
            &self.a
        } else {
            &self.b
        }
    }

    fn label_mut(&mut self, is_a: bool) -> &mut EdgeLabel {
        if is_a {
            &mut self.a
        } else {
            &mut self.b
        }
    }

    pub(crate) fn location(&self, is_a: bool, pos: Position) -> Location {
        let label = self.label(is_a);
        match pos {
            Position::Left => label.left,
            Position::Right => label.right,
            Position::On => label.on,
        }
    }
}

/// The cyclic edge structure around a single node.
///
/// Edges are kept sorted counter-clockwise by ray angle; coincident rays
/// merge. Once all sections are added, [`RelateNode::finish`] resolves
/// the labels of each input on rays it does not own by walking the
/// sorted cycle, after which every (ray, side) pair carries a definite
/// location for both inputs.
#[derive(Debug)]
pub(crate) struct RelateNode<T: GeoFloat> {
    node_pt: Coordinate<T>,
    edges: SmallVec<[RelateEdge<T>; 8]>,
}

impl<T: GeoFloat> RelateNode<T> {
    pub(crate) fn new(node_pt: Coordinate<T>) -> Self {
        RelateNode {
            node_pt,
            edges: SmallVec::new(),
        }
    }

    pub(crate) fn add_sections(&mut self, ns: &NodeSection<T>) {
        match ns.dim {
            Dimension::L => {
                self.add_edge(ns.is_a, ns.prev, EdgeLabel::line());
                self.add_edge(ns.is_a, ns.next, EdgeLabel::line());
            }
            Dimension::A => {
                self.add_edge(ns.is_a, ns.prev, EdgeLabel::area(false));
                self.add_edge(ns.is_a, ns.next, EdgeLabel::area(true));
            }
            _ => debug_assert!(false, "node section must be linear or areal"),
        }
    }

    fn add_edge(&mut self, is_a: bool, dir_pt: Option<Coordinate<T>>, label: EdgeLabel) {
        let dir_pt = match dir_pt {
            Some(p) if p.x != self.node_pt.x || p.y != self.node_pt.y => p,
            // open line end, or a repeated vertex: no ray
            _ => return,
        };
        for i in 0..self.edges.len() {
            match polar_compare(self.node_pt, self.edges[i].dir_pt, dir_pt) {
                Ordering::Equal => {
                    self.edges[i].label_mut(is_a).merge(label);
                    return;
                }
                Ordering::Greater => {
                    self.edges.insert(i, RelateEdge::new(dir_pt, is_a, label));
                    return;
                }
                Ordering::Less => {}
            }
        }
        self.edges.push(RelateEdge::new(dir_pt, is_a, label));
    }

    /// Resolve per-input labels on rays the input does not own.
    ///
    /// If the node lies in the area interior of an input (through some
    /// polygon other than the ones sectioned here), every label of that
    /// input collapses to Interior.
    pub(crate) fn finish(&mut self, is_area_interior_a: bool, is_area_interior_b: bool) {
        self.finish_input(true, is_area_interior_a);
        self.finish_input(false, is_area_interior_b);
        trace!("node {:?} edges {:?}", self.node_pt, self.edges);
    }

    fn finish_input(&mut self, is_a: bool, is_area_interior: bool) {
        if is_area_interior {
            for e in self.edges.iter_mut() {
                e.label_mut(is_a).set_all(Location::Interior);
            }
            return;
        }
        let start = match self.edges.iter().position(|e| e.label(is_a).is_known()) {
            Some(i) => i,
            // input has no linework here; nothing to propagate from
            None => return,
        };
        // The sector counter-clockwise of a ray is that ray's left side,
        // and equally the right side of the next ray around.
        let mut curr_loc = self.edges[start].label(is_a).left;
        let n = self.edges.len();
        for k in 1..n {
            let i = (start + k) % n;
            let label = self.edges[i].label_mut(is_a);
            if label.is_known() {
                curr_loc = label.left;
            } else {
                label.set_all(curr_loc);
            }
        }
    }

    /// Whether any ray or sector of the given input is Exterior.
    /// Used to decide if coincident polygon boundaries fully surround
    /// a point.
    pub(crate) fn has_exterior_edge(&self, is_a: bool) -> bool {
        self.edges.iter().any(|e| {
            e.label(is_a).left == Location::Exterior
                || e.label(is_a).right == Location::Exterior
                || e.label(is_a).on == Location::Exterior
        })
    }

    pub(crate) fn edges(&self) -> impl Iterator<Item = &RelateEdge<T>> {
        self.edges.iter()
    }
}

/// Accumulates the incident sections of both inputs at one node point
/// until the node is ready to evaluate.
#[derive(Debug)]
pub(crate) struct NodeSections<T: GeoFloat> {
    node_pt: Coordinate<T>,
    sections: Vec<NodeSection<T>>,
}

impl<T: GeoFloat> NodeSections<T> {
    pub(crate) fn new(node_pt: Coordinate<T>) -> Self {
        NodeSections {
            node_pt,
            sections: Vec::new(),
        }
    }

    pub(crate) fn node_pt(&self) -> Coordinate<T> {
        self.node_pt
    }

    pub(crate) fn add_section(&mut self, ns: NodeSection<T>) {
        self.sections.push(ns);
    }

    /// Whether sections from both inputs meet here. Nodes discovered
    /// only by self-noding carry one input and need no evaluation.
    pub(crate) fn has_interaction_ab(&self) -> bool {
        self.sections.iter().any(|ns| ns.is_a) && self.sections.iter().any(|ns| !ns.is_a)
    }

    /// The polygon owning an area section of the given input, if any.
    /// Lets the node-in-area query exclude the polygon the node's own
    /// ring belongs to.
    pub(crate) fn polygonal(&self, is_a: bool) -> Option<usize> {
        self.sections
            .iter()
            .filter(|ns| ns.is_a == is_a)
            .find_map(|ns| ns.parent_poly)
    }

    /// Build the cyclic edge structure. Adding a section is idempotent
    /// on the edge labels, so duplicate sections discovered through
    /// different opposing segments are harmless.
    pub(crate) fn create_node(&self) -> RelateNode<T> {
        let mut node = RelateNode::new(self.node_pt);
        for ns in &self.sections {
            node.add_sections(ns);
        }
        node
    }
}
