use geo::{GeoFloat, Geometry, LineString, Polygon, Rect};
use log::debug;

use crate::boundary::BoundaryNodeRule;
use crate::computer::TopologyComputer;
use crate::dimension::Dimension;
use crate::error::{RelateError, Result};
use crate::geometry::{rects_intersect, RelateGeometry};
use crate::index::intersect_segments;
use crate::location::Location;
use crate::matrix::IntersectionMatrix;
use crate::predicate::{EnvelopeInfo, PatternPredicate, RelateMatrixPredicate, TopologyPredicate};
use crate::predicates;
use crate::segstring::SegmentString;

/// Topological relation engine over [`geo_types::Geometry`] inputs.
///
/// Wraps the first input once and evaluates any number of predicates or
/// second inputs against it; preparation warms the point locator and
/// the extracted segment strings, which repeated calls then reuse.
///
/// ```
/// use geo::{polygon, Geometry};
/// use geo_relate::RelateNG;
///
/// let a = Geometry::Polygon(polygon![(x: 0., y: 0.), (x: 2., y: 0.), (x: 2., y: 2.), (x: 0., y: 2.)]);
/// let b = Geometry::Polygon(polygon![(x: 1., y: 1.), (x: 3., y: 1.), (x: 3., y: 3.), (x: 1., y: 3.)]);
/// let rel = RelateNG::prepare(&a).unwrap();
/// assert!(rel.intersects(&b).unwrap());
/// assert_eq!(rel.relate(&b).unwrap().to_string(), "212101212");
/// ```
pub struct RelateNG<'a, T: GeoFloat> {
    geom_a: RelateGeometry<'a, T>,
    rule: BoundaryNodeRule,
    prepared: bool,
}

impl<'a, T: GeoFloat> RelateNG<'a, T> {
    /// Wrap `a` for repeated evaluation, caching its derived structures
    /// across calls.
    pub fn prepare(a: &'a Geometry<T>) -> Result<Self> {
        Self::with_rule(a, BoundaryNodeRule::default(), true)
    }

    /// Prepared form with an explicit boundary-node rule.
    pub fn prepare_with_rule(a: &'a Geometry<T>, rule: BoundaryNodeRule) -> Result<Self> {
        Self::with_rule(a, rule, true)
    }

    fn with_rule(a: &'a Geometry<T>, rule: BoundaryNodeRule, prepared: bool) -> Result<Self> {
        validate(a)?;
        Ok(RelateNG {
            geom_a: RelateGeometry::new(a, rule),
            rule,
            prepared,
        })
    }

    /// Evaluate an arbitrary predicate against a second geometry.
    pub fn evaluate(&self, b: &Geometry<T>, predicate: &mut dyn TopologyPredicate) -> Result<bool> {
        validate(b)?;
        let geom_b = RelateGeometry::new(b, self.rule);
        debug!("relate {} starting", predicate.name());
        Ok(self.compute(&geom_b, predicate))
    }

    /// The full DE-9IM matrix between the wrapped geometry and `b`.
    pub fn relate(&self, b: &Geometry<T>) -> Result<IntersectionMatrix> {
        let mut pred = RelateMatrixPredicate::new();
        self.evaluate(b, &mut pred)?;
        Ok(pred.matrix())
    }

    /// Match the relationship against a DE-9IM pattern such as
    /// `"T*F**FFF*"`.
    pub fn relate_matches(&self, b: &Geometry<T>, pattern: &str) -> Result<bool> {
        let mut pred = PatternPredicate::new(pattern)?;
        self.evaluate(b, &mut pred)
    }

    pub fn intersects(&self, b: &Geometry<T>) -> Result<bool> {
        self.evaluate(b, &mut predicates::Intersects::new())
    }

    pub fn disjoint(&self, b: &Geometry<T>) -> Result<bool> {
        self.evaluate(b, &mut predicates::Disjoint::new())
    }

    pub fn contains(&self, b: &Geometry<T>) -> Result<bool> {
        self.evaluate(b, &mut predicates::Contains::new())
    }

    pub fn within(&self, b: &Geometry<T>) -> Result<bool> {
        self.evaluate(b, &mut predicates::Within::new())
    }

    pub fn covers(&self, b: &Geometry<T>) -> Result<bool> {
        self.evaluate(b, &mut predicates::Covers::new())
    }

    pub fn covered_by(&self, b: &Geometry<T>) -> Result<bool> {
        self.evaluate(b, &mut predicates::CoveredBy::new())
    }

    pub fn crosses(&self, b: &Geometry<T>) -> Result<bool> {
        self.evaluate(b, &mut predicates::Crosses::new())
    }

    pub fn overlaps(&self, b: &Geometry<T>) -> Result<bool> {
        self.evaluate(b, &mut predicates::Overlaps::new())
    }

    pub fn touches(&self, b: &Geometry<T>) -> Result<bool> {
        self.evaluate(b, &mut predicates::Touches::new())
    }

    pub fn equals_topo(&self, b: &Geometry<T>) -> Result<bool> {
        self.evaluate(b, &mut predicates::EqualsTopo::new())
    }

    fn compute(&self, geom_b: &RelateGeometry<'_, T>, predicate: &mut dyn TopologyPredicate) -> bool {
        let geom_a = &self.geom_a;
        predicate.init_dim(geom_a.dimension_real(), geom_b.dimension_real());
        if predicate.is_known() {
            return finish_value(predicate);
        }
        let env = envelope_info(geom_a.envelope(), geom_b.envelope());
        predicate.init_env(env);
        if predicate.is_known() {
            return finish_value(predicate);
        }
        if predicate.require_interaction() && !env.intersects {
            return finish_value(predicate);
        }

        let mut topo = TopologyComputer::new(predicate, geom_a, geom_b);
        if topo.is_result_known() {
            topo.finish();
            return topo.result();
        }
        if geom_a.is_empty() || geom_b.is_empty() {
            // exterior topology was fully seeded by the computer
            topo.finish();
            return topo.result();
        }

        if geom_a.dimension() == Dimension::P && geom_b.dimension() == Dimension::P {
            topo.compute_pp();
        } else {
            compute_points(true, &mut topo);
            compute_points(false, &mut topo);
            if !topo.is_result_known() {
                self.compute_edges(&mut topo);
            }
        }
        topo.finish();
        topo.result()
    }

    fn compute_edges(&self, topo: &mut TopologyComputer<'_, '_, T>) {
        let geom_a = topo.geometry(true);
        let geom_b = topo.geometry(false);

        if geom_a.has_edges() && geom_b.has_edges() {
            if let Some(env_int) = env_intersection(geom_a.envelope(), geom_b.envelope()) {
                let strings_b = geom_b.extract_segment_strings(false, Some(&env_int));
                let fresh_a;
                let strings_a: &[SegmentString<T>] = if self.prepared {
                    geom_a.prepared_segment_strings(true)
                } else {
                    fresh_a = geom_a.extract_segment_strings(true, Some(&env_int));
                    &fresh_a
                };
                let all: Vec<&SegmentString<T>> =
                    strings_a.iter().chain(strings_b.iter()).collect();
                let self_noding = topo.is_self_noding_required();
                debug!(
                    "noding {} strings (self-noding: {})",
                    all.len(),
                    self_noding
                );
                intersect_segments(&all, self_noding, |nsa, nsb| {
                    topo.add_intersection(nsa, nsb);
                    topo.is_result_known()
                });
            }
        }
        if topo.is_result_known() {
            return;
        }

        compute_line_ends(true, topo);
        compute_line_ends(false, topo);
        if topo.is_result_known() {
            return;
        }
        compute_area_vertices(true, topo);
        compute_area_vertices(false, topo);
        if topo.is_result_known() {
            return;
        }

        topo.evaluate_nodes();
    }
}

/// One-shot DE-9IM matrix between two geometries.
pub fn relate<T: GeoFloat>(a: &Geometry<T>, b: &Geometry<T>) -> Result<IntersectionMatrix> {
    RelateNG::with_rule(a, BoundaryNodeRule::default(), false)?.relate(b)
}

/// One-shot matrix under a non-default boundary-node rule.
pub fn relate_with_rule<T: GeoFloat>(
    a: &Geometry<T>,
    b: &Geometry<T>,
    rule: BoundaryNodeRule,
) -> Result<IntersectionMatrix> {
    RelateNG::with_rule(a, rule, false)?.relate(b)
}

/// One-shot DE-9IM pattern match.
pub fn relate_matches<T: GeoFloat>(
    a: &Geometry<T>,
    b: &Geometry<T>,
    pattern: &str,
) -> Result<bool> {
    RelateNG::with_rule(a, BoundaryNodeRule::default(), false)?.relate_matches(b, pattern)
}

/// One-shot evaluation of an arbitrary predicate.
pub fn evaluate<T: GeoFloat>(
    a: &Geometry<T>,
    b: &Geometry<T>,
    predicate: &mut dyn TopologyPredicate,
) -> Result<bool> {
    RelateNG::with_rule(a, BoundaryNodeRule::default(), false)?.evaluate(b, predicate)
}

macro_rules! one_shot {
    ($(#[$doc:meta] $name:ident => $pred:ident),* $(,)?) => {
        $(
            #[$doc]
            pub fn $name<T: GeoFloat>(a: &Geometry<T>, b: &Geometry<T>) -> Result<bool> {
                evaluate(a, b, &mut predicates::$pred::new())
            }
        )*
    };
}

one_shot! {
    /// Whether the geometries share any point.
    intersects => Intersects,
    /// Whether the geometries share no point.
    disjoint => Disjoint,
    /// Whether `a` contains `b`.
    contains => Contains,
    /// Whether `a` lies within `b`.
    within => Within,
    /// Whether `a` covers `b`.
    covers => Covers,
    /// Whether `a` is covered by `b`.
    covered_by => CoveredBy,
    /// Whether the geometries cross.
    crosses => Crosses,
    /// Whether the geometries overlap.
    overlaps => Overlaps,
    /// Whether the geometries touch only on boundaries.
    touches => Touches,
    /// Whether the geometries are topologically equal.
    equals_topo => EqualsTopo,
}

fn finish_value(predicate: &mut dyn TopologyPredicate) -> bool {
    predicate.finish();
    predicate.value()
}

fn envelope_info<T: GeoFloat>(env_a: Option<Rect<T>>, env_b: Option<Rect<T>>) -> EnvelopeInfo {
    match (env_a, env_b) {
        (Some(a), Some(b)) => EnvelopeInfo {
            intersects: rects_intersect(&a, &b),
            a_covers_b: rect_covers(&a, &b),
            b_covers_a: rect_covers(&b, &a),
        },
        _ => EnvelopeInfo::default(),
    }
}

fn rect_covers<T: GeoFloat>(outer: &Rect<T>, inner: &Rect<T>) -> bool {
    outer.min().x <= inner.min().x
        && outer.min().y <= inner.min().y
        && outer.max().x >= inner.max().x
        && outer.max().y >= inner.max().y
}

fn env_intersection<T: GeoFloat>(
    env_a: Option<Rect<T>>,
    env_b: Option<Rect<T>>,
) -> Option<Rect<T>> {
    let (a, b) = match (env_a, env_b) {
        (Some(a), Some(b)) => (a, b),
        _ => return None,
    };
    if !rects_intersect(&a, &b) {
        return None;
    }
    let min_x = if a.min().x > b.min().x { a.min().x } else { b.min().x };
    let min_y = if a.min().y > b.min().y { a.min().y } else { b.min().y };
    let max_x = if a.max().x < b.max().x { a.max().x } else { b.max().x };
    let max_y = if a.max().y < b.max().y { a.max().y } else { b.max().y };
    Some(Rect::new(
        geo::Coordinate { x: min_x, y: min_y },
        geo::Coordinate { x: max_x, y: max_y },
    ))
}

fn compute_points<T: GeoFloat>(is_a: bool, topo: &mut TopologyComputer<'_, '_, T>) {
    let geom = topo.geometry(is_a);
    let other = topo.geometry(!is_a);
    if !geom.has_dimension(Dimension::P) {
        return;
    }
    let other_env = other.envelope();
    for p in geom.effective_points() {
        let in_env = other_env.map_or(false, |e| {
            e.min().x <= p.x && p.x <= e.max().x && e.min().y <= p.y && p.y <= e.max().y
        });
        if !in_env {
            if topo.is_exterior_check_required(is_a) {
                topo.add_point_on_geometry(is_a, Location::Exterior);
            }
        } else {
            let loc = other.locate_with_dim(p).location();
            topo.add_point_on_geometry(is_a, loc);
        }
        if topo.is_result_known() {
            return;
        }
    }
}

fn compute_line_ends<T: GeoFloat>(is_a: bool, topo: &mut TopologyComputer<'_, '_, T>) {
    let geom = topo.geometry(is_a);
    let other = topo.geometry(!is_a);
    if !geom.has_dimension(Dimension::L) {
        return;
    }
    let other_env = other.envelope();
    for le in geom.line_ends() {
        let mut pts = vec![le.start];
        if !le.is_zero_len {
            pts.push(le.end);
        }
        for pt in pts {
            let end_dim_loc = geom.locate_line_end_with_dim(pt);
            // an end swallowed by an area of its own collection is not
            // a line end any more
            if end_dim_loc.dimension() != Dimension::L {
                continue;
            }
            let loc_end = end_dim_loc.location();
            let in_env = other_env.map_or(false, |e| {
                e.min().x <= pt.x && pt.x <= e.max().x && e.min().y <= pt.y && pt.y <= e.max().y
            });
            let (loc_target, dim_target) = if !in_env {
                if !topo.is_exterior_check_required(is_a) {
                    continue;
                }
                (Location::Exterior, other.dimension_real())
            } else {
                let dl = other.locate_with_dim(pt);
                let dim = if dl.location() == Location::Exterior {
                    other.dimension_real()
                } else {
                    dl.dimension()
                };
                (dl.location(), dim)
            };
            topo.add_line_end_on_geometry(is_a, loc_end, loc_target, dim_target, le.is_zero_len);
            if topo.is_result_known() {
                return;
            }
        }
    }
}

fn compute_area_vertices<T: GeoFloat>(is_a: bool, topo: &mut TopologyComputer<'_, '_, T>) {
    let geom = topo.geometry(is_a);
    let other = topo.geometry(!is_a);
    if !geom.has_dimension(Dimension::A) {
        return;
    }
    let other_env = other.envelope();
    for pt in geom.ring_vertices() {
        let in_env = other_env.map_or(false, |e| {
            e.min().x <= pt.x && pt.x <= e.max().x && e.min().y <= pt.y && pt.y <= e.max().y
        });
        let (loc_target, dim_target) = if !in_env {
            if !topo.is_exterior_check_required(is_a) {
                continue;
            }
            (Location::Exterior, other.dimension_real())
        } else {
            let dl = other.locate_with_dim(pt);
            let dim = if dl.location() == Location::Exterior {
                other.dimension_real()
            } else {
                dl.dimension()
            };
            (dl.location(), dim)
        };
        let loc_area = geom.locate_area_vertex(pt);
        topo.add_area_vertex(is_a, loc_area, loc_target, dim_target);
        if topo.is_result_known() {
            return;
        }
    }
}

fn validate<T: GeoFloat>(geom: &Geometry<T>) -> Result<()> {
    use geo::coords_iter::CoordsIter;
    use num_traits::ToPrimitive;
    for c in geom.coords_iter() {
        if !c.x.is_finite() || !c.y.is_finite() {
            return Err(RelateError::NonFiniteCoord(
                c.x.to_f64().unwrap_or(f64::NAN),
                c.y.to_f64().unwrap_or(f64::NAN),
            ));
        }
    }
    validate_rings(geom)
}

fn validate_rings<T: GeoFloat>(geom: &Geometry<T>) -> Result<()> {
    let check_poly = |p: &Polygon<T>| -> Result<()> {
        let check_ring = |r: &LineString<T>| -> Result<()> {
            if r.0.len() > 1 && r.0.first() != r.0.last() {
                return Err(RelateError::RingNotClosed);
            }
            Ok(())
        };
        check_ring(p.exterior())?;
        for hole in p.interiors() {
            check_ring(hole)?;
        }
        Ok(())
    };
    match geom {
        Geometry::Polygon(p) => check_poly(p),
        Geometry::MultiPolygon(mp) => mp.0.iter().try_for_each(check_poly),
        Geometry::GeometryCollection(gc) => gc.0.iter().try_for_each(validate_rings),
        _ => Ok(()),
    }
}
