use std::collections::BTreeMap;

use geo::GeoFloat;
use log::{debug, trace};

use crate::coords::{is_crossing, PtKey};
use crate::dimension::Dimension;
use crate::geometry::{input_name, RelateGeometry};
use crate::location::Location::{self, Boundary, Exterior, Interior, NoneLoc};
use crate::node::{NodeSection, NodeSections, Position};
use crate::predicate::TopologyPredicate;

/// Orchestrates the topology evaluation for one relate computation:
/// seeds the exterior cells from the input dimensions, accumulates node
/// sections from the intersection driver, receives direct incidences
/// from point probing, evaluates nodes, and streams every matrix update
/// into the predicate so it can conclude early.
pub(crate) struct TopologyComputer<'p, 'a, T: GeoFloat> {
    predicate: &'p mut dyn TopologyPredicate,
    geom_a: &'p RelateGeometry<'a, T>,
    geom_b: &'p RelateGeometry<'a, T>,
    node_map: BTreeMap<PtKey<T>, NodeSections<T>>,
}

impl<'p, 'a, T: GeoFloat> TopologyComputer<'p, 'a, T> {
    pub(crate) fn new(
        predicate: &'p mut dyn TopologyPredicate,
        geom_a: &'p RelateGeometry<'a, T>,
        geom_b: &'p RelateGeometry<'a, T>,
    ) -> Self {
        let mut tc = TopologyComputer {
            predicate,
            geom_a,
            geom_b,
            node_map: BTreeMap::new(),
        };
        tc.init_exterior_dims();
        tc
    }

    pub(crate) fn geometry(&self, is_a: bool) -> &'p RelateGeometry<'a, T> {
        if is_a {
            self.geom_a
        } else {
            self.geom_b
        }
    }

    pub(crate) fn dimension(&self, is_a: bool) -> Dimension {
        self.geometry(is_a).dimension()
    }

    fn is_area_area(&self) -> bool {
        self.dimension(true) == Dimension::A && self.dimension(false) == Dimension::A
    }

    pub(crate) fn is_self_noding_required(&self) -> bool {
        self.predicate.require_self_noding()
            && (self.geom_a.is_self_noding_required() || self.geom_b.is_self_noding_required())
    }

    pub(crate) fn is_exterior_check_required(&self, is_a: bool) -> bool {
        self.predicate.require_exterior_check(is_a)
    }

    pub(crate) fn is_result_known(&self) -> bool {
        self.predicate.is_known()
    }

    pub(crate) fn result(&self) -> bool {
        self.predicate.value()
    }

    pub(crate) fn finish(&mut self) {
        self.predicate.finish();
    }

    fn update_dim(&mut self, loc_a: Location, loc_b: Location, dim: Dimension) {
        if loc_a == NoneLoc || loc_b == NoneLoc {
            debug_assert!(false, "topology update with unresolved location");
            return;
        }
        trace!("update {}{} -> {}", loc_a, loc_b, dim);
        self.predicate.update_dim(loc_a, loc_b, dim);
    }

    /// Update with the first location belonging to the given input.
    fn update_dim_for(&mut self, is_a: bool, loc1: Location, loc2: Location, dim: Dimension) {
        if is_a {
            self.update_dim(loc1, loc2, dim);
        } else {
            self.update_dim(loc2, loc1, dim);
        }
    }

    /// A priori exterior topology implied by the effective dimensions:
    /// a lower-dimensional input can never cover the other's interior.
    fn init_exterior_dims(&mut self) {
        let dim_a = self.geom_a.dimension_real();
        let dim_b = self.geom_b.dimension_real();
        if dim_a == Dimension::False || dim_b == Dimension::False {
            self.init_exterior_empty();
            return;
        }
        use Dimension::{A, L, P};
        match (dim_a, dim_b) {
            (P, L) => self.update_dim(Exterior, Interior, L),
            (L, P) => self.update_dim(Interior, Exterior, L),
            (P, A) => {
                self.update_dim(Exterior, Interior, A);
                self.update_dim(Exterior, Boundary, L);
            }
            (A, P) => {
                self.update_dim(Interior, Exterior, A);
                self.update_dim(Boundary, Exterior, L);
            }
            (L, A) => self.update_dim(Exterior, Interior, A),
            (A, L) => self.update_dim(Interior, Exterior, A),
            // equal dimensions: either could cover the other
            _ => {}
        }
    }

    /// With an empty input, the other's interior and boundary lie
    /// wholly in its exterior.
    fn init_exterior_empty(&mut self) {
        for &is_a in &[true, false] {
            let geom = self.geometry(is_a);
            if geom.is_empty() {
                continue;
            }
            let dim = geom.dimension_real();
            self.update_dim_for(is_a, Interior, Exterior, dim);
            match dim {
                Dimension::A => self.update_dim_for(is_a, Boundary, Exterior, Dimension::L),
                Dimension::L if geom.has_boundary() => {
                    self.update_dim_for(is_a, Boundary, Exterior, Dimension::P)
                }
                _ => {}
            }
        }
    }

    /// Both inputs are pure point sets: compare the unique coordinates.
    pub(crate) fn compute_pp(&mut self) {
        let pts_a = self.geom_a.unique_points().clone();
        let pts_b = self.geom_b.unique_points();
        let mut common = 0usize;
        let total_b = pts_b.len();
        for pa in &pts_a {
            if pts_b.contains(pa) {
                common += 1;
                self.update_dim(Interior, Interior, Dimension::P);
            } else {
                self.update_dim(Interior, Exterior, Dimension::P);
            }
            if self.is_result_known() {
                return;
            }
        }
        if common < total_b {
            self.update_dim(Exterior, Interior, Dimension::P);
        }
    }

    /// A point element found at `loc_target` in the other input.
    pub(crate) fn add_point_on_geometry(&mut self, is_a: bool, loc_target: Location) {
        debug!(
            "point of {} on other at {}",
            input_name(is_a),
            loc_target
        );
        self.update_dim_for(is_a, Interior, loc_target, Dimension::P);
    }

    /// A line end located at `loc_line_end` within its own geometry and
    /// `loc_target` in the other. Near an end in the target's interior
    /// or exterior, a one-dimensional piece of the line shares that
    /// location; zero-length lines have no such piece.
    pub(crate) fn add_line_end_on_geometry(
        &mut self,
        is_line_a: bool,
        loc_line_end: Location,
        loc_target: Location,
        dim_target: Dimension,
        is_zero_len: bool,
    ) {
        trace!(
            "line end of {} ({}) on other at {} dim {}",
            input_name(is_line_a),
            loc_line_end,
            loc_target,
            dim_target
        );
        self.update_dim_for(is_line_a, loc_line_end, loc_target, Dimension::P);
        if dim_target == Dimension::A && !is_zero_len && loc_target != Boundary {
            self.update_dim_for(is_line_a, Interior, loc_target, Dimension::L);
        }
    }

    /// A vertex of an area's ring located against the other input.
    /// `loc_area` is the vertex's location in its own geometry, which
    /// in a collection of overlapping polygons may be Interior rather
    /// than Boundary.
    pub(crate) fn add_area_vertex(
        &mut self,
        is_area_a: bool,
        loc_area: Location,
        loc_target: Location,
        dim_target: Dimension,
    ) {
        trace!(
            "area vertex of {} ({}) on other at {} dim {}",
            input_name(is_area_a),
            loc_area,
            loc_target,
            dim_target
        );
        if loc_target == Exterior {
            self.update_dim_for(is_area_a, Interior, Exterior, Dimension::A);
            if loc_area == Boundary {
                self.update_dim_for(is_area_a, Boundary, Exterior, Dimension::L);
                self.update_dim_for(is_area_a, Exterior, Exterior, Dimension::A);
            }
            return;
        }
        match dim_target {
            Dimension::P => self.add_area_vertex_on_point(is_area_a, loc_area),
            Dimension::L => self.add_area_vertex_on_line(is_area_a, loc_area, loc_target),
            Dimension::A => self.add_area_vertex_on_area(is_area_a, loc_area, loc_target),
            Dimension::False => {}
        }
    }

    /// The vertex coincides with an isolated point of the target, whose
    /// neighbourhood is target-exterior.
    fn add_area_vertex_on_point(&mut self, is_area_a: bool, loc_area: Location) {
        self.update_dim_for(is_area_a, loc_area, Interior, Dimension::P);
        self.update_dim_for(is_area_a, Interior, Exterior, Dimension::A);
        if loc_area == Boundary {
            self.update_dim_for(is_area_a, Boundary, Exterior, Dimension::L);
        }
    }

    fn add_area_vertex_on_line(
        &mut self,
        is_area_a: bool,
        loc_area: Location,
        loc_target: Location,
    ) {
        self.update_dim_for(is_area_a, loc_area, loc_target, Dimension::P);
    }

    fn add_area_vertex_on_area(
        &mut self,
        is_area_a: bool,
        loc_area: Location,
        loc_target: Location,
    ) {
        if loc_target == Interior {
            self.update_dim_for(is_area_a, loc_area, Interior, Dimension::P);
            self.update_dim_for(is_area_a, Interior, Interior, Dimension::A);
            if loc_area == Boundary {
                self.update_dim_for(is_area_a, Boundary, Interior, Dimension::L);
                self.update_dim_for(is_area_a, Exterior, Interior, Dimension::A);
            }
        } else {
            // boundary-on-boundary refines during node evaluation
            self.update_dim_for(is_area_a, loc_area, Boundary, Dimension::P);
        }
    }

    /// An intersection reported by the segment driver. Cross-input
    /// pairs update the node-point topology immediately; all pairs
    /// queue their sections for full node evaluation.
    pub(crate) fn add_intersection(&mut self, a: NodeSection<T>, b: NodeSection<T>) {
        if !a.is_same_geometry(&b) {
            if a.is_area() && b.is_area() {
                self.update_area_area_cross(&a, &b);
            }
            self.update_node_location(&a, &b);
        }
        self.add_node_sections(a, b);
    }

    /// Two area boundaries cross at a node if the intersection is
    /// proper, or if the opposing ring's arms leave through opposite
    /// sides; either way the area interiors overlap.
    fn update_area_area_cross(&mut self, a: &NodeSection<T>, b: &NodeSection<T>) {
        let crosses = (a.is_proper() && b.is_proper())
            || match (a.prev, a.next, b.prev, b.next) {
                (Some(ap), Some(an), Some(bp), Some(bn)) => {
                    is_crossing(a.node_pt, ap, an, bp, bn)
                }
                _ => false,
            };
        if crosses {
            self.update_dim(Interior, Interior, Dimension::A);
        }
    }

    fn update_node_location(&mut self, a: &NodeSection<T>, b: &NodeSection<T>) {
        let pt = a.node_pt;
        let loc_a = self.geom_a.locate_node(pt, a.parent_poly);
        let loc_b = self.geom_b.locate_node(pt, b.parent_poly);
        self.update_dim(loc_a, loc_b, Dimension::P);
    }

    fn add_node_sections(&mut self, a: NodeSection<T>, b: NodeSection<T>) {
        let pt = a.node_pt;
        let entry = self
            .node_map
            .entry(pt.into())
            .or_insert_with(|| NodeSections::new(pt));
        entry.add_section(a);
        entry.add_section(b);
    }

    /// Evaluate the full edge topology at every node where the inputs
    /// interact.
    pub(crate) fn evaluate_nodes(&mut self) {
        let keys: Vec<PtKey<T>> = self.node_map.keys().copied().collect();
        for key in keys {
            let (pt, node, poly_a, poly_b, interacts) = {
                let ns = &self.node_map[&key];
                (
                    ns.node_pt(),
                    ns.create_node(),
                    ns.polygonal(true),
                    ns.polygonal(false),
                    ns.has_interaction_ab(),
                )
            };
            if !interacts {
                continue;
            }
            let mut node = node;
            let is_area_interior_a = self.geom_a.is_node_in_area(pt, poly_a);
            let is_area_interior_b = self.geom_b.is_node_in_area(pt, poly_b);
            node.finish(is_area_interior_a, is_area_interior_b);
            let is_area_area = self.is_area_area();
            let mut updates: Vec<(Location, Location, Dimension)> = Vec::new();
            for e in node.edges() {
                if is_area_area {
                    updates.push((
                        e.location(true, Position::Left),
                        e.location(false, Position::Left),
                        Dimension::A,
                    ));
                    updates.push((
                        e.location(true, Position::Right),
                        e.location(false, Position::Right),
                        Dimension::A,
                    ));
                }
                updates.push((
                    e.location(true, Position::On),
                    e.location(false, Position::On),
                    Dimension::L,
                ));
            }
            for (loc_a, loc_b, dim) in updates {
                self.update_dim(loc_a, loc_b, dim);
            }
            if self.is_result_known() {
                return;
            }
        }
    }
}
