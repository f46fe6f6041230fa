use std::str::FromStr;

use log::trace;

use crate::dimension::Dimension;
use crate::error::RelateError;
use crate::location::Location;
use crate::matrix::{IntersectionMatrix, Pattern};

/// Precomputed envelope relationships between the two inputs, handed to
/// predicates so they can conclude without any noding.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnvelopeInfo {
    pub intersects: bool,
    pub a_covers_b: bool,
    pub b_covers_a: bool,
}

/// The topology predicate protocol.
///
/// The computer streams monotone `(location, location, dimension)`
/// updates into the predicate and stops as soon as it reports its value
/// is known; the computer never inspects predicate state beyond that.
/// The `require_*` hints let the computer skip work that cannot affect
/// the outcome (self-noding, exterior probes, non-covering envelopes).
pub trait TopologyPredicate {
    fn name(&self) -> &'static str;

    /// Whether self-intersection nodes of one input must be computed
    /// for this predicate to evaluate correctly.
    fn require_self_noding(&self) -> bool {
        true
    }

    /// Whether the predicate is trivially false when the inputs do not
    /// interact at all.
    fn require_interaction(&self) -> bool {
        true
    }

    /// Whether the predicate can only hold when the given input's
    /// envelope covers the other's.
    fn require_covers(&self, _is_a: bool) -> bool {
        false
    }

    /// Whether locating parts of the given input in the *other* input's
    /// exterior can affect the outcome.
    fn require_exterior_check(&self, _is_a: bool) -> bool {
        true
    }

    /// Receive the effective dimensions of the inputs.
    fn init_dim(&mut self, _dim_a: Dimension, _dim_b: Dimension) {}

    /// Receive the envelope relationships of the inputs.
    fn init_env(&mut self, _env: EnvelopeInfo) {}

    /// Receive a monotone matrix update.
    fn update_dim(&mut self, loc_a: Location, loc_b: Location, dim: Dimension);

    /// Whether the value is already determined.
    fn is_known(&self) -> bool;

    /// Resolve the value from whatever has been seen; after this,
    /// [`TopologyPredicate::value`] is definitive.
    fn finish(&mut self);

    fn value(&self) -> bool;
}

/// Shared state for predicates that accumulate an intersection matrix.
#[derive(Debug, Clone)]
pub(crate) struct ImState {
    im: IntersectionMatrix,
    pub dim_a: Dimension,
    pub dim_b: Dimension,
    value: Option<bool>,
}

impl ImState {
    pub(crate) fn new() -> Self {
        let mut im = IntersectionMatrix::new();
        // the exteriors of two planar geometries always share area
        im.set(Location::Exterior, Location::Exterior, Dimension::A);
        ImState {
            im,
            dim_a: Dimension::False,
            dim_b: Dimension::False,
            value: None,
        }
    }

    pub(crate) fn matrix(&self) -> &IntersectionMatrix {
        &self.im
    }

    pub(crate) fn set_dims(&mut self, dim_a: Dimension, dim_b: Dimension) {
        self.dim_a = dim_a;
        self.dim_b = dim_b;
    }

    /// Conclude `false` unless the precondition holds.
    pub(crate) fn require(&mut self, cond: bool) {
        if !cond {
            self.value = Some(false);
        }
    }

    pub(crate) fn set_value(&mut self, v: bool) {
        if self.value.is_none() {
            self.value = Some(v);
        }
    }

    pub(crate) fn is_known(&self) -> bool {
        self.value.is_some()
    }

    pub(crate) fn value(&self) -> bool {
        self.value.unwrap_or(false)
    }

    pub(crate) fn update_cell(&mut self, loc_a: Location, loc_b: Location, dim: Dimension) {
        self.im.update(loc_a, loc_b, dim);
    }

    pub(crate) fn intersects_cell(&self, row: Location, col: Location) -> bool {
        self.im.get(row, col) != Dimension::False
    }

    pub(crate) fn dim_cell(&self, row: Location, col: Location) -> Dimension {
        self.im.get(row, col)
    }
}

/// Predicate that runs the computation to completion and captures the
/// full matrix; the facade uses it to implement `relate`.
#[derive(Debug, Clone)]
pub struct RelateMatrixPredicate {
    state: ImState,
}

impl RelateMatrixPredicate {
    pub fn new() -> Self {
        RelateMatrixPredicate {
            state: ImState::new(),
        }
    }

    /// The matrix accumulated so far.
    pub fn matrix(&self) -> IntersectionMatrix {
        *self.state.matrix()
    }
}

impl Default for RelateMatrixPredicate {
    fn default() -> Self {
        Self::new()
    }
}

impl TopologyPredicate for RelateMatrixPredicate {
    fn name(&self) -> &'static str {
        "relateMatrix"
    }

    // the whole matrix is wanted, so nothing may be skipped
    fn require_interaction(&self) -> bool {
        false
    }

    fn init_dim(&mut self, dim_a: Dimension, dim_b: Dimension) {
        self.state.set_dims(dim_a, dim_b);
    }

    fn update_dim(&mut self, loc_a: Location, loc_b: Location, dim: Dimension) {
        trace!("IM[{}{}] <- {}", loc_a, loc_b, dim);
        self.state.update_cell(loc_a, loc_b, dim);
    }

    fn is_known(&self) -> bool {
        false
    }

    fn finish(&mut self) {}

    fn value(&self) -> bool {
        true
    }
}

/// Matches the matrix against an arbitrary DE-9IM pattern, concluding
/// `false` as soon as monotone growth makes some cell unsatisfiable.
#[derive(Debug, Clone)]
pub struct PatternPredicate {
    pattern: Pattern,
    state: ImState,
}

impl PatternPredicate {
    pub fn new(pattern: &str) -> Result<Self, RelateError> {
        Ok(PatternPredicate {
            pattern: Pattern::from_str(pattern)?,
            state: ImState::new(),
        })
    }
}

impl TopologyPredicate for PatternPredicate {
    fn name(&self) -> &'static str {
        "matches"
    }

    fn init_dim(&mut self, dim_a: Dimension, dim_b: Dimension) {
        self.state.set_dims(dim_a, dim_b);
    }

    fn update_dim(&mut self, loc_a: Location, loc_b: Location, dim: Dimension) {
        self.state.update_cell(loc_a, loc_b, dim);
        let i = loc_a.index() * 3 + loc_b.index();
        if !self.pattern.cells()[i].satisfiable_at(self.state.dim_cell(loc_a, loc_b)) {
            self.state.set_value(false);
        }
    }

    fn is_known(&self) -> bool {
        self.state.is_known()
    }

    fn finish(&mut self) {
        let v = self.pattern.matches(self.state.matrix());
        self.state.set_value(v);
    }

    fn value(&self) -> bool {
        self.state.value()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matrix_predicate_collects_everything() {
        let mut p = RelateMatrixPredicate::new();
        assert!(!p.is_known());
        p.update_dim(Location::Interior, Location::Interior, Dimension::L);
        p.update_dim(Location::Boundary, Location::Exterior, Dimension::P);
        assert!(!p.is_known());
        let im = p.matrix();
        assert_eq!(im.to_string(), "1FFFF0FF2");
    }

    #[test]
    fn pattern_predicate_fails_fast_on_forbidden_cell() {
        let mut p = PatternPredicate::new("FF*FF****").unwrap();
        p.update_dim(Location::Interior, Location::Boundary, Dimension::P);
        assert!(!p.is_known());
        p.update_dim(Location::Interior, Location::Interior, Dimension::P);
        assert!(p.is_known());
        p.finish();
        assert!(!p.value());
    }

    #[test]
    fn pattern_predicate_exact_dim_overshoot() {
        let mut p = PatternPredicate::new("0********").unwrap();
        p.update_dim(Location::Interior, Location::Interior, Dimension::P);
        assert!(!p.is_known());
        p.update_dim(Location::Interior, Location::Interior, Dimension::L);
        assert!(p.is_known());
        p.finish();
        assert!(!p.value());
    }

    #[test]
    fn pattern_predicate_true_at_finish() {
        let mut p = PatternPredicate::new("T********").unwrap();
        p.update_dim(Location::Interior, Location::Interior, Dimension::A);
        p.finish();
        assert!(p.value());
    }
}
