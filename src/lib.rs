//! Topological relations between planar geometries.
//!
//! Computes the DE-9IM intersection matrix between two
//! [`geo_types::Geometry`] values and evaluates the named spatial
//! predicates (`intersects`, `contains`, `touches`, `crosses`, ...)
//! with predicate-driven early exit: evaluation stops as soon as the
//! answer is determined, so most predicate queries never compute the
//! full topology.
//!
//! ```
//! use geo::Geometry;
//! use wkt::TryFromWkt;
//!
//! let a: Geometry<f64> =
//!     Geometry::try_from_wkt_str("POLYGON((0 0, 2 0, 2 2, 0 2, 0 0))").unwrap();
//! let b: Geometry<f64> = Geometry::try_from_wkt_str("LINESTRING(-1 1, 3 1)").unwrap();
//!
//! assert!(geo_relate::crosses(&a, &b).unwrap());
//! assert_eq!(geo_relate::relate(&a, &b).unwrap().to_string(), "1F20F1102");
//! ```

mod boundary;
mod computer;
mod coords;
mod dimension;
mod error;
mod geometry;
mod index;
mod location;
mod locator;
mod matrix;
mod node;
mod predicate;
mod segstring;

pub mod predicates;

mod relate;

pub use boundary::BoundaryNodeRule;
pub use dimension::Dimension;
pub use error::RelateError;
pub use location::Location;
pub use matrix::IntersectionMatrix;
pub use predicate::{EnvelopeInfo, PatternPredicate, RelateMatrixPredicate, TopologyPredicate};
pub use relate::{
    contains, covered_by, covers, crosses, disjoint, equals_topo, evaluate, intersects, overlaps,
    relate, relate_matches, relate_with_rule, touches, within, RelateNG,
};
