use std::collections::BTreeSet;

use geo::coordinate_position::{CoordPos, CoordinatePosition};
use geo::intersects::Intersects;
use geo::{Coordinate, GeoFloat, Geometry, LineString, Polygon};

use crate::boundary::{BoundaryNodeRule, LinearBoundary};
use crate::coords::PtKey;
use crate::dimension::DimensionLocation;
use crate::location::Location;
use crate::node::RelateNode;
use crate::segstring::SegmentString;

/// Locates a point against a whole geometry, reporting the
/// (dimension, location) of the highest-dimensional element containing
/// it: areas are probed first, then lines, then isolated points.
///
/// Line endpoints classify as boundary or interior through the active
/// [`BoundaryNodeRule`], counting incidences across *all* linear
/// components before committing. The locator copies the element
/// structure out of the input, so it carries no borrow and can be
/// cached for prepared evaluation.
pub(crate) struct RelatePointLocator<T: GeoFloat> {
    is_empty: bool,
    is_polygonal_input: bool,
    points: BTreeSet<PtKey<T>>,
    lines: Vec<LineString<T>>,
    polygons: Vec<Polygon<T>>,
    line_boundary: LinearBoundary<T>,
}

impl<T: GeoFloat> RelatePointLocator<T> {
    pub(crate) fn new(geom: &Geometry<T>, rule: BoundaryNodeRule) -> Self {
        let mut points = BTreeSet::new();
        let mut lines = Vec::new();
        let mut polygons = Vec::new();
        collect_elements(geom, &mut points, &mut lines, &mut polygons);
        let line_boundary = LinearBoundary::new(lines.iter(), rule);
        RelatePointLocator {
            is_empty: points.is_empty() && lines.is_empty() && polygons.is_empty(),
            is_polygonal_input: matches!(
                geom,
                Geometry::Polygon(_)
                    | Geometry::MultiPolygon(_)
                    | Geometry::Rect(_)
                    | Geometry::Triangle(_)
            ),
            points,
            lines,
            polygons,
            line_boundary,
        }
    }

    pub(crate) fn locate(&self, p: Coordinate<T>) -> Location {
        self.locate_with_dim(p).location()
    }

    pub(crate) fn locate_with_dim(&self, p: Coordinate<T>) -> DimensionLocation {
        self.locate_full(p, false, None)
    }

    /// Locate a node known to lie on this geometry's linework.
    /// `parent_poly` is the walk ordinal of the polygon whose own ring
    /// produced the node; it reports Boundary directly rather than
    /// re-probing itself.
    pub(crate) fn locate_node(&self, p: Coordinate<T>, parent_poly: Option<usize>) -> Location {
        self.locate_node_with_dim(p, parent_poly).location()
    }

    pub(crate) fn locate_node_with_dim(
        &self,
        p: Coordinate<T>,
        parent_poly: Option<usize>,
    ) -> DimensionLocation {
        self.locate_full(p, true, parent_poly)
    }

    /// Classify the end of a line through the boundary-node rule alone,
    /// ignoring any area elements covering it.
    pub(crate) fn locate_line_end(&self, p: Coordinate<T>) -> Location {
        if self.line_boundary.is_boundary(p) {
            Location::Boundary
        } else {
            Location::Interior
        }
    }

    /// Whether the linear components have any boundary point under the
    /// active rule (closed rings have none under Mod2).
    pub(crate) fn has_boundary(&self) -> bool {
        self.line_boundary.has_boundary()
    }

    fn locate_full(
        &self,
        p: Coordinate<T>,
        is_node: bool,
        parent_poly: Option<usize>,
    ) -> DimensionLocation {
        if self.is_empty {
            return DimensionLocation::Exterior;
        }
        // in a purely polygonal geometry every node is on a ring
        if is_node && self.is_polygonal_input {
            return DimensionLocation::AreaBoundary;
        }
        if !self.polygons.is_empty() {
            let loc = self.locate_on_polygons(p, is_node, parent_poly);
            if loc != Location::Exterior {
                return DimensionLocation::area(loc);
            }
        }
        if !self.lines.is_empty() {
            let loc = self.locate_on_lines(p, is_node);
            if loc != Location::Exterior {
                return DimensionLocation::line(loc);
            }
        }
        if self.points.contains(&p.into()) {
            return DimensionLocation::Point;
        }
        DimensionLocation::Exterior
    }

    fn locate_on_lines(&self, p: Coordinate<T>, is_node: bool) -> Location {
        if self.line_boundary.is_boundary(p) {
            return Location::Boundary;
        }
        // a node is known to lie on the linework
        if is_node {
            return Location::Interior;
        }
        for line in &self.lines {
            if line.lines().any(|seg| seg.intersects(&p)) {
                return Location::Interior;
            }
        }
        Location::Exterior
    }

    fn locate_on_polygons(
        &self,
        p: Coordinate<T>,
        is_node: bool,
        parent_poly: Option<usize>,
    ) -> Location {
        let mut num_boundary = 0;
        for (i, poly) in self.polygons.iter().enumerate() {
            let loc = if is_node && parent_poly == Some(i) {
                // the node arose on this polygon's own ring
                Location::Boundary
            } else {
                match poly.coordinate_position(&p) {
                    CoordPos::Inside => Location::Interior,
                    CoordPos::OnBoundary => Location::Boundary,
                    CoordPos::Outside => Location::Exterior,
                }
            };
            if loc == Location::Interior {
                return Location::Interior;
            }
            if loc == Location::Boundary {
                num_boundary += 1;
            }
        }
        match num_boundary {
            0 => Location::Exterior,
            1 => Location::Boundary,
            // on the boundary of several polygons: interior if the
            // incident ring edges fully surround the point
            _ => self.locate_adjacent(p),
        }
    }

    /// Resolve a point lying on coincident boundaries of two or more
    /// polygonal elements (adjacent or overlapping polygons in a
    /// collection) by examining the ring edges around it.
    fn locate_adjacent(&self, p: Coordinate<T>) -> Location {
        let mut node = RelateNode::new(p);
        for (eid, poly) in self.polygons.iter().enumerate() {
            add_incident_ring_sections(&mut node, p, poly, eid);
        }
        node.finish(false, false);
        if node.has_exterior_edge(true) {
            Location::Boundary
        } else {
            Location::Interior
        }
    }
}

fn add_incident_ring_sections<T: GeoFloat>(
    node: &mut RelateNode<T>,
    p: Coordinate<T>,
    poly: &Polygon<T>,
    element_id: usize,
) {
    let rings = std::iter::once(poly.exterior()).chain(poly.interiors().iter());
    for (ring_id, ring) in rings.enumerate() {
        if ring.0.is_empty() {
            continue;
        }
        let ss = SegmentString::create_ring(ring, true, element_id, ring_id, element_id);
        for i in 0..ss.num_segments() {
            if !ss.segment(i).intersects(&p) {
                continue;
            }
            if !ss.is_containing_segment(i, p) {
                continue;
            }
            node.add_sections(&ss.create_node_section(i, p));
        }
    }
}

fn collect_elements<T: GeoFloat>(
    geom: &Geometry<T>,
    points: &mut BTreeSet<PtKey<T>>,
    lines: &mut Vec<LineString<T>>,
    polygons: &mut Vec<Polygon<T>>,
) {
    match geom {
        Geometry::Point(p) => {
            points.insert(p.0.into());
        }
        Geometry::MultiPoint(mp) => {
            for p in &mp.0 {
                points.insert(p.0.into());
            }
        }
        Geometry::Line(l) => {
            lines.push(LineString(vec![l.start, l.end]));
        }
        Geometry::LineString(l) => {
            if !l.0.is_empty() {
                lines.push(l.clone());
            }
        }
        Geometry::MultiLineString(mls) => {
            for l in &mls.0 {
                if !l.0.is_empty() {
                    lines.push(l.clone());
                }
            }
        }
        Geometry::Polygon(p) => {
            if !p.exterior().0.is_empty() {
                polygons.push(p.clone());
            }
        }
        Geometry::MultiPolygon(mp) => {
            for p in &mp.0 {
                if !p.exterior().0.is_empty() {
                    polygons.push(p.clone());
                }
            }
        }
        Geometry::Rect(r) => {
            polygons.push(r.to_polygon());
        }
        Geometry::Triangle(t) => {
            polygons.push(t.to_polygon());
        }
        Geometry::GeometryCollection(gc) => {
            for g in &gc.0 {
                collect_elements(g, points, lines, polygons);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::{line_string, polygon, Geometry, GeometryCollection};

    fn c(x: f64, y: f64) -> Coordinate<f64> {
        Coordinate { x, y }
    }

    fn square(x0: f64, y0: f64, x1: f64, y1: f64) -> Polygon<f64> {
        polygon![(x: x0, y: y0), (x: x1, y: y0), (x: x1, y: y1), (x: x0, y: y1), (x: x0, y: y0)]
    }

    #[test]
    fn polygon_locations() {
        let g = Geometry::Polygon(square(0., 0., 2., 2.));
        let loc = RelatePointLocator::new(&g, BoundaryNodeRule::Mod2);
        assert_eq!(loc.locate_with_dim(c(1., 1.)), DimensionLocation::AreaInterior);
        assert_eq!(loc.locate_with_dim(c(1., 0.)), DimensionLocation::AreaBoundary);
        assert_eq!(loc.locate_with_dim(c(0., 0.)), DimensionLocation::AreaBoundary);
        assert_eq!(loc.locate_with_dim(c(3., 1.)), DimensionLocation::Exterior);
    }

    #[test]
    fn line_endpoint_rules() {
        let g = Geometry::LineString(line_string![(x: 0., y: 0.), (x: 1., y: 0.), (x: 1., y: 1.)]);
        let loc = RelatePointLocator::new(&g, BoundaryNodeRule::Mod2);
        assert_eq!(loc.locate_with_dim(c(0., 0.)), DimensionLocation::LineBoundary);
        assert_eq!(loc.locate_with_dim(c(0.5, 0.)), DimensionLocation::LineInterior);
        assert_eq!(loc.locate_with_dim(c(1., 0.)), DimensionLocation::LineInterior);
        assert_eq!(loc.locate_with_dim(c(2., 2.)), DimensionLocation::Exterior);
        assert_eq!(loc.locate_line_end(c(0., 0.)), Location::Boundary);
        assert_eq!(loc.locate_line_end(c(1., 0.)), Location::Interior);
    }

    #[test]
    fn highest_dimension_wins() {
        let g = Geometry::GeometryCollection(GeometryCollection(vec![
            Geometry::Point(c(1., 1.).into()),
            Geometry::LineString(line_string![(x: -2., y: 1.), (x: 4., y: 1.)]),
            Geometry::Polygon(square(0., 0., 2., 2.)),
        ]));
        let loc = RelatePointLocator::new(&g, BoundaryNodeRule::Mod2);
        // covered by the polygon interior even though point and line hit too
        assert_eq!(loc.locate_with_dim(c(1., 1.)), DimensionLocation::AreaInterior);
        // on the line outside the polygon
        assert_eq!(loc.locate_with_dim(c(3., 1.)), DimensionLocation::LineInterior);
        // line end outside everything
        assert_eq!(loc.locate_with_dim(c(-2., 1.)), DimensionLocation::LineBoundary);
    }

    #[test]
    fn adjacent_polygon_edge_is_interior() {
        let g = Geometry::GeometryCollection(GeometryCollection(vec![
            Geometry::Polygon(square(0., 0., 1., 1.)),
            Geometry::Polygon(square(1., 0., 2., 1.)),
        ]));
        let loc = RelatePointLocator::new(&g, BoundaryNodeRule::Mod2);
        // midpoint of the shared edge is surrounded
        assert_eq!(loc.locate_with_dim(c(1., 0.5)), DimensionLocation::AreaInterior);
        // corner of the shared edge still touches the exterior
        assert_eq!(loc.locate_with_dim(c(1., 0.)), DimensionLocation::AreaBoundary);
        // plain boundary elsewhere
        assert_eq!(loc.locate_with_dim(c(0.5, 0.)), DimensionLocation::AreaBoundary);
    }

    #[test]
    fn node_probing_in_polygonal_input() {
        let g = Geometry::Polygon(square(0., 0., 2., 2.));
        let loc = RelatePointLocator::new(&g, BoundaryNodeRule::Mod2);
        // nodes on a polygonal geometry are boundary by construction
        assert_eq!(loc.locate_node(c(1., 0.), None), Location::Boundary);
        assert_eq!(
            loc.locate_node_with_dim(c(1., 0.), Some(0)),
            DimensionLocation::AreaBoundary
        );
    }

    #[test]
    fn node_exclusion_in_collection() {
        let g = Geometry::GeometryCollection(GeometryCollection(vec![
            Geometry::Polygon(square(0., 0., 2., 2.)),
            Geometry::Polygon(square(1., 1., 3., 3.)),
        ]));
        let loc = RelatePointLocator::new(&g, BoundaryNodeRule::Mod2);
        // a node on the second polygon's ring inside the first polygon
        assert_eq!(
            loc.locate_node_with_dim(c(1.5, 1.), Some(1)),
            DimensionLocation::AreaInterior
        );
    }
}
