use std::collections::BTreeSet;

use geo::bounding_rect::BoundingRect;
use geo::{Coordinate, GeoFloat, Geometry, LineString, MultiLineString, Polygon, Rect};
use once_cell::unsync::OnceCell;

use crate::boundary::BoundaryNodeRule;
use crate::coords::PtKey;
use crate::dimension::{Dimension, DimensionLocation};
use crate::location::Location;
use crate::locator::RelatePointLocator;
use crate::segstring::SegmentString;

/// Display name of an input in logs and assertions.
pub(crate) fn input_name(is_a: bool) -> &'static str {
    if is_a {
        "A"
    } else {
        "B"
    }
}

/// One line element's endpoints and zero-length flag, for line-end
/// probing.
#[derive(Debug, Clone, Copy)]
pub(crate) struct LineEnds<T: GeoFloat> {
    pub start: Coordinate<T>,
    pub end: Coordinate<T>,
    pub is_zero_len: bool,
}

/// Wraps one relate input: caches its envelope and dimension structure,
/// lazily builds the point locator and unique-point set, and extracts
/// segment strings for noding.
///
/// The caches use single-threaded interior mutability; concurrent
/// relate calls must wrap the same geometry separately. Polygons are
/// identified throughout by their ordinal in a depth-first walk, which
/// ties segment strings to the locator's element list without back
/// references.
pub(crate) struct RelateGeometry<'a, T: GeoFloat> {
    geom: &'a Geometry<T>,
    rule: BoundaryNodeRule,
    env: Option<Rect<T>>,
    is_geom_empty: bool,
    has_points: bool,
    has_lines: bool,
    has_areas: bool,
    is_line_zero_len: bool,
    locator: OnceCell<RelatePointLocator<T>>,
    unique_points: OnceCell<BTreeSet<PtKey<T>>>,
    prepared_strings: OnceCell<Vec<SegmentString<T>>>,
}

impl<'a, T: GeoFloat> RelateGeometry<'a, T> {
    pub(crate) fn new(geom: &'a Geometry<T>, rule: BoundaryNodeRule) -> Self {
        let mut rg = RelateGeometry {
            geom,
            rule,
            env: geom.bounding_rect(),
            is_geom_empty: true,
            has_points: false,
            has_lines: false,
            has_areas: false,
            is_line_zero_len: false,
            locator: OnceCell::new(),
            unique_points: OnceCell::new(),
            prepared_strings: OnceCell::new(),
        };
        rg.analyze_dimensions(geom);
        rg.is_line_zero_len = !rg.has_areas && rg.has_lines && all_lines_zero_length(geom);
        rg
    }

    fn analyze_dimensions(&mut self, geom: &Geometry<T>) {
        match geom {
            Geometry::Point(_) => {
                self.has_points = true;
                self.is_geom_empty = false;
            }
            Geometry::MultiPoint(mp) => {
                if !mp.0.is_empty() {
                    self.has_points = true;
                    self.is_geom_empty = false;
                }
            }
            Geometry::Line(_) => {
                self.has_lines = true;
                self.is_geom_empty = false;
            }
            Geometry::LineString(l) => {
                if !l.0.is_empty() {
                    self.has_lines = true;
                    self.is_geom_empty = false;
                }
            }
            Geometry::MultiLineString(mls) => {
                for l in &mls.0 {
                    if !l.0.is_empty() {
                        self.has_lines = true;
                        self.is_geom_empty = false;
                    }
                }
            }
            Geometry::Polygon(p) => {
                if !p.exterior().0.is_empty() {
                    self.has_areas = true;
                    self.is_geom_empty = false;
                }
            }
            Geometry::MultiPolygon(mp) => {
                for p in &mp.0 {
                    if !p.exterior().0.is_empty() {
                        self.has_areas = true;
                        self.is_geom_empty = false;
                    }
                }
            }
            Geometry::Rect(_) | Geometry::Triangle(_) => {
                self.has_areas = true;
                self.is_geom_empty = false;
            }
            Geometry::GeometryCollection(gc) => {
                for g in &gc.0 {
                    self.analyze_dimensions(g);
                }
            }
        }
    }

    pub(crate) fn envelope(&self) -> Option<Rect<T>> {
        self.env
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.is_geom_empty
    }

    pub(crate) fn dimension(&self) -> Dimension {
        if self.has_areas {
            Dimension::A
        } else if self.has_lines {
            Dimension::L
        } else if self.has_points {
            Dimension::P
        } else {
            Dimension::False
        }
    }

    pub(crate) fn has_dimension(&self, dim: Dimension) -> bool {
        match dim {
            Dimension::P => self.has_points,
            Dimension::L => self.has_lines,
            Dimension::A => self.has_areas,
            Dimension::False => false,
        }
    }

    /// The effective dimension: zero-length linework collapses to a
    /// point set.
    pub(crate) fn dimension_real(&self) -> Dimension {
        if self.is_geom_empty {
            return Dimension::False;
        }
        if self.dimension() == Dimension::L && self.is_line_zero_len {
            return Dimension::P;
        }
        self.dimension()
    }

    pub(crate) fn has_edges(&self) -> bool {
        self.has_lines || self.has_areas
    }

    /// Whether self-noding is needed to evaluate this input against
    /// another: lines may self-cross, and polygons inside a collection
    /// may overlap each other. Plain point and polygonal inputs cannot.
    pub(crate) fn is_self_noding_required(&self) -> bool {
        match self.geom {
            Geometry::Point(_)
            | Geometry::MultiPoint(_)
            | Geometry::Polygon(_)
            | Geometry::MultiPolygon(_)
            | Geometry::Rect(_)
            | Geometry::Triangle(_) => false,
            _ => self.has_edges(),
        }
    }

    fn locator(&self) -> &RelatePointLocator<T> {
        self.locator
            .get_or_init(|| RelatePointLocator::new(self.geom, self.rule))
    }

    pub(crate) fn locate_with_dim(&self, pt: Coordinate<T>) -> DimensionLocation {
        self.locator().locate_with_dim(pt)
    }

    pub(crate) fn locate_node(&self, pt: Coordinate<T>, parent_poly: Option<usize>) -> Location {
        self.locator().locate_node(pt, parent_poly)
    }

    /// A polygon vertex is on the boundary of its own polygon, but may
    /// be interior to an overlapping polygon elsewhere in a collection.
    pub(crate) fn locate_area_vertex(&self, pt: Coordinate<T>) -> Location {
        self.locate_node(pt, None)
    }

    pub(crate) fn locate_line_end(&self, pt: Coordinate<T>) -> Location {
        self.locator().locate_line_end(pt)
    }

    /// Classify a line end against this geometry's own elements: ends
    /// covered by an area of a collection stop being line ends.
    pub(crate) fn locate_line_end_with_dim(&self, pt: Coordinate<T>) -> DimensionLocation {
        if self.has_areas {
            let dim_loc = self.locator().locate_with_dim(pt);
            if dim_loc.dimension() == Dimension::A {
                return dim_loc;
            }
        }
        DimensionLocation::line(self.locate_line_end(pt))
    }

    pub(crate) fn is_node_in_area(&self, pt: Coordinate<T>, parent_poly: Option<usize>) -> bool {
        self.locator().locate_node_with_dim(pt, parent_poly) == DimensionLocation::AreaInterior
    }

    pub(crate) fn has_boundary(&self) -> bool {
        self.has_lines && self.locator().has_boundary()
    }

    /// Coordinates of the point elements, deduplicated.
    pub(crate) fn unique_points(&self) -> &BTreeSet<PtKey<T>> {
        self.unique_points.get_or_init(|| {
            let mut set = BTreeSet::new();
            collect_point_coords(self.geom, &mut set);
            set
        })
    }

    /// Point-element coordinates not covered by a higher-dimensional
    /// element of this geometry.
    pub(crate) fn effective_points(&self) -> Vec<Coordinate<T>> {
        let all: Vec<Coordinate<T>> = self.unique_points().iter().map(|k| k.0).collect();
        if self.dimension_real() <= Dimension::P {
            return all;
        }
        all.into_iter()
            .filter(|&p| self.locate_with_dim(p).dimension() == Dimension::P)
            .collect()
    }

    /// The endpoints of each line element, for line-end probing.
    pub(crate) fn line_ends(&self) -> Vec<LineEnds<T>> {
        let mut ends = Vec::new();
        collect_line_ends(self.geom, &mut ends);
        ends
    }

    /// One representative boundary vertex per polygon ring, for probing
    /// containment when rings never cross the other geometry.
    pub(crate) fn ring_vertices(&self) -> Vec<Coordinate<T>> {
        let mut pts = Vec::new();
        collect_ring_vertices(self.geom, &mut pts);
        pts
    }

    /// Extract the segment strings whose envelope interacts with
    /// `env_filter` (all of them when `None`).
    pub(crate) fn extract_segment_strings(
        &self,
        is_a: bool,
        env_filter: Option<&Rect<T>>,
    ) -> Vec<SegmentString<T>> {
        let mut out = Vec::new();
        let mut walk = WalkIds::default();
        extract_strings(self.geom, is_a, env_filter, &mut walk, &mut out);
        out
    }

    /// Prepared mode: extract every segment string once and reuse the
    /// set across calls.
    pub(crate) fn prepared_segment_strings(&self, is_a: bool) -> &[SegmentString<T>] {
        self.prepared_strings
            .get_or_init(|| self.extract_segment_strings(is_a, None))
    }
}

fn all_lines_zero_length<T: GeoFloat>(geom: &Geometry<T>) -> bool {
    match geom {
        Geometry::Line(l) => l.start == l.end,
        Geometry::LineString(l) => is_zero_length(l),
        Geometry::MultiLineString(mls) => mls.0.iter().all(is_zero_length),
        Geometry::GeometryCollection(gc) => gc.0.iter().all(all_lines_zero_length),
        _ => true,
    }
}

/// All vertices equal to the first: most lines fail at the second
/// vertex, so length itself is never computed.
fn is_zero_length<T: GeoFloat>(line: &LineString<T>) -> bool {
    if line.0.len() < 2 {
        return true;
    }
    let p0 = line.0[0];
    line.0[1..].iter().all(|p| p.x == p0.x && p.y == p0.y)
}

fn collect_point_coords<T: GeoFloat>(geom: &Geometry<T>, set: &mut BTreeSet<PtKey<T>>) {
    match geom {
        Geometry::Point(p) => {
            set.insert(p.0.into());
        }
        Geometry::MultiPoint(mp) => {
            for p in &mp.0 {
                set.insert(p.0.into());
            }
        }
        Geometry::GeometryCollection(gc) => {
            for g in &gc.0 {
                collect_point_coords(g, set);
            }
        }
        _ => {}
    }
}

fn collect_line_ends<T: GeoFloat>(geom: &Geometry<T>, out: &mut Vec<LineEnds<T>>) {
    match geom {
        Geometry::Line(l) => out.push(LineEnds {
            start: l.start,
            end: l.end,
            is_zero_len: l.start == l.end,
        }),
        Geometry::LineString(l) => {
            if let (Some(&start), Some(&end)) = (l.0.first(), l.0.last()) {
                out.push(LineEnds {
                    start,
                    end,
                    is_zero_len: is_zero_length(l),
                });
            }
        }
        Geometry::MultiLineString(mls) => {
            for l in &mls.0 {
                if let (Some(&start), Some(&end)) = (l.0.first(), l.0.last()) {
                    out.push(LineEnds {
                        start,
                        end,
                        is_zero_len: is_zero_length(l),
                    });
                }
            }
        }
        Geometry::GeometryCollection(gc) => {
            for g in &gc.0 {
                collect_line_ends(g, out);
            }
        }
        _ => {}
    }
}

fn collect_ring_vertices<T: GeoFloat>(geom: &Geometry<T>, out: &mut Vec<Coordinate<T>>) {
    let mut push_poly = |p: &Polygon<T>| {
        if let Some(&v) = p.exterior().0.first() {
            out.push(v);
        }
        for hole in p.interiors() {
            if let Some(&v) = hole.0.first() {
                out.push(v);
            }
        }
    };
    match geom {
        Geometry::Polygon(p) => push_poly(p),
        Geometry::MultiPolygon(mp) => mp.0.iter().for_each(push_poly),
        Geometry::Rect(r) => push_poly(&r.to_polygon()),
        Geometry::Triangle(t) => push_poly(&t.to_polygon()),
        Geometry::GeometryCollection(gc) => {
            for g in &gc.0 {
                collect_ring_vertices(g, out);
            }
        }
        _ => {}
    }
}

pub(crate) fn rects_intersect<T: GeoFloat>(a: &Rect<T>, b: &Rect<T>) -> bool {
    a.min().x <= b.max().x
        && b.min().x <= a.max().x
        && a.min().y <= b.max().y
        && b.min().y <= a.max().y
}

fn env_interacts<T: GeoFloat>(env: Option<Rect<T>>, filter: Option<&Rect<T>>) -> bool {
    match (env, filter) {
        (Some(e), Some(f)) => rects_intersect(&e, f),
        (None, _) => false,
        (_, None) => true,
    }
}

/// Element and polygon counters for the depth-first extraction walk.
/// The polygon ordinal must advance even for envelope-filtered
/// polygons so it stays aligned with the locator's element list.
#[derive(Default)]
struct WalkIds {
    element_id: usize,
    poly_ordinal: usize,
}

fn extract_strings<T: GeoFloat>(
    geom: &Geometry<T>,
    is_a: bool,
    env_filter: Option<&Rect<T>>,
    walk: &mut WalkIds,
    out: &mut Vec<SegmentString<T>>,
) {
    match geom {
        Geometry::Line(l) => {
            let ls = LineString(vec![l.start, l.end]);
            extract_line_string(&ls, is_a, env_filter, walk, out);
        }
        Geometry::LineString(l) => extract_line_string(l, is_a, env_filter, walk, out),
        Geometry::MultiLineString(mls) => {
            for l in &mls.0 {
                extract_line_string(l, is_a, env_filter, walk, out);
            }
        }
        Geometry::Polygon(p) => extract_polygon_strings(p, is_a, env_filter, walk, out),
        Geometry::MultiPolygon(mp) => {
            for p in &mp.0 {
                extract_polygon_strings(p, is_a, env_filter, walk, out);
            }
        }
        Geometry::Rect(r) => extract_polygon_strings(&r.to_polygon(), is_a, env_filter, walk, out),
        Geometry::Triangle(t) => {
            extract_polygon_strings(&t.to_polygon(), is_a, env_filter, walk, out)
        }
        Geometry::GeometryCollection(gc) => {
            for g in &gc.0 {
                extract_strings(g, is_a, env_filter, walk, out);
            }
        }
        _ => {}
    }
}

fn extract_line_string<T: GeoFloat>(
    l: &LineString<T>,
    is_a: bool,
    env_filter: Option<&Rect<T>>,
    walk: &mut WalkIds,
    out: &mut Vec<SegmentString<T>>,
) {
    if l.0.is_empty() {
        return;
    }
    walk.element_id += 1;
    if !env_interacts(l.bounding_rect(), env_filter) {
        return;
    }
    let ss = SegmentString::create_line(l, is_a, walk.element_id);
    if ss.num_segments() > 0 {
        out.push(ss);
    }
}

fn extract_polygon_strings<T: GeoFloat>(
    poly: &Polygon<T>,
    is_a: bool,
    env_filter: Option<&Rect<T>>,
    walk: &mut WalkIds,
    out: &mut Vec<SegmentString<T>>,
) {
    if poly.exterior().0.is_empty() {
        return;
    }
    walk.element_id += 1;
    let poly_ordinal = walk.poly_ordinal;
    walk.poly_ordinal += 1;
    if !env_interacts(poly.bounding_rect(), env_filter) {
        return;
    }
    let rings = std::iter::once(poly.exterior()).chain(poly.interiors().iter());
    for (ring_id, ring) in rings.enumerate() {
        if ring.0.is_empty() || !env_interacts(ring.bounding_rect(), env_filter) {
            continue;
        }
        let ss = SegmentString::create_ring(ring, is_a, walk.element_id, ring_id, poly_ordinal);
        if ss.num_segments() > 0 {
            out.push(ss);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::{line_string, polygon, Geometry, GeometryCollection};

    #[test]
    fn dimension_analysis() {
        let g: Geometry<f64> = Geometry::GeometryCollection(GeometryCollection(vec![
            Geometry::Point(Coordinate { x: 0., y: 0. }.into()),
            Geometry::LineString(line_string![(x: 0., y: 0.), (x: 1., y: 0.)]),
        ]));
        let rg = RelateGeometry::new(&g, BoundaryNodeRule::Mod2);
        assert!(rg.has_dimension(Dimension::P));
        assert!(rg.has_dimension(Dimension::L));
        assert!(!rg.has_dimension(Dimension::A));
        assert_eq!(rg.dimension(), Dimension::L);
        assert_eq!(rg.dimension_real(), Dimension::L);
        assert!(!rg.is_empty());
    }

    #[test]
    fn zero_length_line_collapses_to_point() {
        // all vertices equal, including past the second one
        let g: Geometry<f64> = Geometry::LineString(line_string![
            (x: 1., y: 1.), (x: 1., y: 1.), (x: 1., y: 1.)
        ]);
        let rg = RelateGeometry::new(&g, BoundaryNodeRule::Mod2);
        assert_eq!(rg.dimension(), Dimension::L);
        assert_eq!(rg.dimension_real(), Dimension::P);
        // a line that doubles back is not zero-length
        let g: Geometry<f64> = Geometry::LineString(line_string![
            (x: 1., y: 1.), (x: 2., y: 1.), (x: 1., y: 1.)
        ]);
        let rg = RelateGeometry::new(&g, BoundaryNodeRule::Mod2);
        assert_eq!(rg.dimension_real(), Dimension::L);
    }

    #[test]
    fn empty_geometry() {
        let g: Geometry<f64> = Geometry::GeometryCollection(GeometryCollection(vec![]));
        let rg = RelateGeometry::new(&g, BoundaryNodeRule::Mod2);
        assert!(rg.is_empty());
        assert_eq!(rg.dimension_real(), Dimension::False);
        assert!(rg.envelope().is_none());
    }

    #[test]
    fn extraction_emits_rings_and_lines() {
        let g: Geometry<f64> = Geometry::GeometryCollection(GeometryCollection(vec![
            Geometry::LineString(line_string![(x: 0., y: 0.), (x: 1., y: 0.)]),
            Geometry::Polygon(polygon!(
                exterior: [(x: 0., y: 0.), (x: 10., y: 0.), (x: 10., y: 10.), (x: 0., y: 10.), (x: 0., y: 0.)],
                interiors: [[(x: 4., y: 4.), (x: 6., y: 4.), (x: 6., y: 6.), (x: 4., y: 6.), (x: 4., y: 4.)]],
            )),
        ]));
        let rg = RelateGeometry::new(&g, BoundaryNodeRule::Mod2);
        let strings = rg.extract_segment_strings(true, None);
        assert_eq!(strings.len(), 3);
        assert_eq!(strings[0].dim(), Dimension::L);
        assert_eq!(strings[1].ring_id(), Some(0));
        assert_eq!(strings[2].ring_id(), Some(1));
        // hole belongs to the same element as the shell
        assert_eq!(strings[1].element_id(), strings[2].element_id());
    }

    #[test]
    fn extraction_respects_envelope_filter() {
        let lines: Vec<LineString<f64>> = vec![
            line_string![(x: 0., y: 0.), (x: 1., y: 0.)],
            line_string![(x: 100., y: 100.), (x: 101., y: 100.)],
        ];
        let g: Geometry<f64> = Geometry::MultiLineString(MultiLineString(lines));
        let rg = RelateGeometry::new(&g, BoundaryNodeRule::Mod2);
        let filter = Rect::new(Coordinate { x: -1., y: -1. }, Coordinate { x: 2., y: 2. });
        let strings = rg.extract_segment_strings(false, Some(&filter));
        assert_eq!(strings.len(), 1);
    }
}
