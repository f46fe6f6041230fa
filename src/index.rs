use geo::algorithm::line_intersection::{line_intersection, LineIntersection};
use geo::GeoFloat;
use log::trace;

use crate::node::NodeSection;
use crate::segstring::SegmentString;

/// A segment envelope in the sweep, referencing its string.
#[derive(Debug, Clone, Copy)]
struct SegEntry<T: GeoFloat> {
    string_idx: usize,
    seg_idx: usize,
    min_x: T,
    max_x: T,
    min_y: T,
    max_y: T,
}

/// Finds all intersections between segments of the given strings and
/// reports them as pairs of node sections.
///
/// Pairs drawn from the same input are compared only when `self_noding`
/// is set, so that nodes created by self-crossing linework are
/// discovered explicitly and locations stay consistent across inputs.
/// Candidate pairing is an x-interval sweep over segment envelopes;
/// it only prunes, never decides.
///
/// `on_intersection` receives the two sections (the first from input A
/// when the pair crosses inputs) and returns `true` to stop early.
pub(crate) fn intersect_segments<T, F>(
    strings: &[&SegmentString<T>],
    self_noding: bool,
    mut on_intersection: F,
) where
    T: GeoFloat,
    F: FnMut(NodeSection<T>, NodeSection<T>) -> bool,
{
    let mut entries: Vec<SegEntry<T>> = Vec::new();
    for (si, ss) in strings.iter().enumerate() {
        for i in 0..ss.num_segments() {
            let seg = ss.segment(i);
            let (min_x, max_x) = minmax(seg.start.x, seg.end.x);
            let (min_y, max_y) = minmax(seg.start.y, seg.end.y);
            entries.push(SegEntry {
                string_idx: si,
                seg_idx: i,
                min_x,
                max_x,
                min_y,
                max_y,
            });
        }
    }
    entries.sort_by(|a, b| a.min_x.partial_cmp(&b.min_x).unwrap());

    for i in 0..entries.len() {
        let e1 = entries[i];
        for e2 in &entries[i + 1..] {
            if e2.min_x > e1.max_x {
                break;
            }
            if e2.min_y > e1.max_y || e2.max_y < e1.min_y {
                continue;
            }
            if process_pair(strings, e1, *e2, self_noding, &mut on_intersection) {
                return;
            }
        }
    }
}

fn minmax<T: GeoFloat>(a: T, b: T) -> (T, T) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

fn process_pair<T, F>(
    strings: &[&SegmentString<T>],
    e1: SegEntry<T>,
    e2: SegEntry<T>,
    self_noding: bool,
    on_intersection: &mut F,
) -> bool
where
    T: GeoFloat,
    F: FnMut(NodeSection<T>, NodeSection<T>) -> bool,
{
    let s1 = strings[e1.string_idx];
    let s2 = strings[e2.string_idx];
    if s1.is_a() == s2.is_a() {
        if !self_noding {
            return false;
        }
        if e1.string_idx == e2.string_idx && e1.seg_idx == e2.seg_idx {
            return false;
        }
    }
    // report sections with the A input first for cross-input pairs
    let ((sa, ia), (sb, ib)) = if !s1.is_a() && s2.is_a() {
        ((s2, e2.seg_idx), (s1, e1.seg_idx))
    } else {
        ((s1, e1.seg_idx), (s2, e2.seg_idx))
    };

    let isect = match line_intersection(sa.segment(ia), sb.segment(ib)) {
        Some(isect) => isect,
        None => return false,
    };
    match isect {
        LineIntersection::SinglePoint {
            intersection,
            is_proper,
        } => {
            // Endpoint intersections are reported once, by the segments
            // owning the point; proper ones lie on a unique segment and
            // skip the ownership test, which roundoff makes unreliable.
            if is_proper
                || (sa.is_containing_segment(ia, intersection)
                    && sb.is_containing_segment(ib, intersection))
            {
                trace!("intersection at {:?} proper={}", intersection, is_proper);
                let nsa = sa.create_node_section(ia, intersection);
                let nsb = sb.create_node_section(ib, intersection);
                if on_intersection(nsa, nsb) {
                    return true;
                }
            }
        }
        LineIntersection::Collinear { intersection } => {
            for pt in [intersection.start, intersection.end] {
                if sa.is_containing_segment(ia, pt) && sb.is_containing_segment(ib, pt) {
                    trace!("collinear overlap end at {:?}", pt);
                    let nsa = sa.create_node_section(ia, pt);
                    let nsb = sb.create_node_section(ib, pt);
                    if on_intersection(nsa, nsb) {
                        return true;
                    }
                }
            }
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::line_string;

    #[test]
    fn crossing_lines_report_one_proper_node() {
        let l1 = line_string![(x: 0., y: 0.), (x: 2., y: 2.)];
        let l2 = line_string![(x: 0., y: 2.), (x: 2., y: 0.)];
        let owned = vec![
            SegmentString::create_line(&l1, true, 0),
            SegmentString::create_line(&l2, false, 0),
        ];
        let strings: Vec<&_> = owned.iter().collect();
        let mut hits = Vec::new();
        intersect_segments(&strings, false, |a, b| {
            assert!(a.is_a && !b.is_a);
            assert!(a.is_proper() && b.is_proper());
            hits.push(a.node_pt);
            false
        });
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0], geo::Coordinate { x: 1., y: 1. });
    }

    #[test]
    fn shared_interior_vertices_do_not_node() {
        // a chain intersected with a far-away line: the chain's own
        // vertices never report, even with self-noding on
        let l1 = line_string![(x: 0., y: 0.), (x: 1., y: 0.), (x: 2., y: 1.), (x: 3., y: 1.)];
        let l2 = line_string![(x: 10., y: 10.), (x: 11., y: 10.)];
        let owned = vec![
            SegmentString::create_line(&l1, true, 0),
            SegmentString::create_line(&l2, false, 0),
        ];
        let strings: Vec<&_> = owned.iter().collect();
        let mut count = 0;
        intersect_segments(&strings, true, |_, _| {
            count += 1;
            false
        });
        assert_eq!(count, 0);
    }

    #[test]
    fn self_crossing_discovered_only_when_requested() {
        let bowtie = line_string![(x: 0., y: 0.), (x: 2., y: 2.), (x: 0., y: 2.), (x: 2., y: 0.)];
        let owned = vec![SegmentString::create_line(&bowtie, true, 0)];
        let strings: Vec<&_> = owned.iter().collect();
        let mut count = 0;
        intersect_segments(&strings, false, |_, _| {
            count += 1;
            false
        });
        assert_eq!(count, 0);
        intersect_segments(&strings, true, |a, b| {
            assert!(a.is_same_geometry(&b));
            count += 1;
            false
        });
        assert_eq!(count, 1);
    }

    #[test]
    fn inexact_crossing_point_is_close() {
        use approx::assert_relative_eq;
        let l1 = line_string![(x: 0., y: 0.), (x: 10., y: 10.)];
        let l2 = line_string![(x: 0., y: 1.), (x: 10., y: 0.)];
        let owned = vec![
            SegmentString::create_line(&l1, true, 0),
            SegmentString::create_line(&l2, false, 0),
        ];
        let strings: Vec<&_> = owned.iter().collect();
        let mut hits = Vec::new();
        intersect_segments(&strings, false, |a, _| {
            hits.push(a.node_pt);
            false
        });
        assert_eq!(hits.len(), 1);
        assert_relative_eq!(hits[0].x, 10. / 11., epsilon = 1e-9);
        assert_relative_eq!(hits[0].y, 10. / 11., epsilon = 1e-9);
    }

    #[test]
    fn collinear_overlap_reports_both_ends() {
        let l1 = line_string![(x: 0., y: 0.), (x: 3., y: 0.)];
        let l2 = line_string![(x: 1., y: 0.), (x: 2., y: 0.)];
        let owned = vec![
            SegmentString::create_line(&l1, true, 0),
            SegmentString::create_line(&l2, false, 0),
        ];
        let strings: Vec<&_> = owned.iter().collect();
        let mut hits = Vec::new();
        intersect_segments(&strings, false, |a, _| {
            hits.push(a.node_pt);
            false
        });
        assert_eq!(hits.len(), 2);
    }

    #[test]
    fn early_exit_stops_the_sweep() {
        let l1 = line_string![(x: 0., y: 0.), (x: 10., y: 0.)];
        let l2 = line_string![(x: 1., y: -1.), (x: 1., y: 1.)];
        let l3 = line_string![(x: 2., y: -1.), (x: 2., y: 1.)];
        let owned = vec![
            SegmentString::create_line(&l1, true, 0),
            SegmentString::create_line(&l2, false, 0),
            SegmentString::create_line(&l3, false, 1),
        ];
        let strings: Vec<&_> = owned.iter().collect();
        let mut count = 0;
        intersect_segments(&strings, false, |_, _| {
            count += 1;
            true
        });
        assert_eq!(count, 1);
    }
}
