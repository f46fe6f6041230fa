//! The named topological predicates.
//!
//! Each predicate tracks only the matrix cells it cares about and
//! reports its value as soon as monotone growth determines it, so the
//! computer can stop noding mid-way.

use crate::dimension::Dimension;
use crate::location::Location::{self, Boundary, Exterior, Interior};
use crate::predicate::{EnvelopeInfo, ImState, TopologyPredicate};

/// `dim_a` can cover `dim_b` only when it is at least as large and
/// neither input is empty.
fn dims_compatible_with_covers(dim_a: Dimension, dim_b: Dimension) -> bool {
    dim_a != Dimension::False && dim_b != Dimension::False && dim_a >= dim_b
}

/// True if the two geometries share at least one point.
#[derive(Debug, Clone, Default)]
pub struct Intersects {
    value: Option<bool>,
}

impl Intersects {
    pub fn new() -> Self {
        Default::default()
    }
}

impl TopologyPredicate for Intersects {
    fn name(&self) -> &'static str {
        "intersects"
    }

    fn require_self_noding(&self) -> bool {
        false
    }

    fn require_exterior_check(&self, _is_a: bool) -> bool {
        false
    }

    fn init_env(&mut self, env: EnvelopeInfo) {
        if !env.intersects {
            self.value = Some(false);
        }
    }

    fn update_dim(&mut self, loc_a: Location, loc_b: Location, _dim: Dimension) {
        if loc_a != Exterior && loc_b != Exterior {
            self.value = Some(true);
        }
    }

    fn is_known(&self) -> bool {
        self.value.is_some()
    }

    fn finish(&mut self) {
        self.value.get_or_insert(false);
    }

    fn value(&self) -> bool {
        self.value.unwrap_or(false)
    }
}

/// True if the two geometries share no point at all.
#[derive(Debug, Clone, Default)]
pub struct Disjoint {
    value: Option<bool>,
}

impl Disjoint {
    pub fn new() -> Self {
        Default::default()
    }
}

impl TopologyPredicate for Disjoint {
    fn name(&self) -> &'static str {
        "disjoint"
    }

    fn require_self_noding(&self) -> bool {
        false
    }

    fn require_exterior_check(&self, _is_a: bool) -> bool {
        false
    }

    fn init_env(&mut self, env: EnvelopeInfo) {
        if !env.intersects {
            self.value = Some(true);
        }
    }

    fn update_dim(&mut self, loc_a: Location, loc_b: Location, _dim: Dimension) {
        if loc_a != Exterior && loc_b != Exterior {
            self.value = Some(false);
        }
    }

    fn is_known(&self) -> bool {
        self.value.is_some()
    }

    fn finish(&mut self) {
        self.value.get_or_insert(true);
    }

    fn value(&self) -> bool {
        self.value.unwrap_or(true)
    }
}

macro_rules! im_predicate_shell {
    () => {
        fn init_dim(&mut self, dim_a: Dimension, dim_b: Dimension) {
            self.state.set_dims(dim_a, dim_b);
            self.init_dims_check();
        }

        fn update_dim(&mut self, loc_a: Location, loc_b: Location, dim: Dimension) {
            self.state.update_cell(loc_a, loc_b, dim);
            if !self.state.is_known() && self.is_determined() {
                let v = self.value_im();
                self.state.set_value(v);
            }
        }

        fn is_known(&self) -> bool {
            self.state.is_known()
        }

        fn finish(&mut self) {
            let v = self.value_im();
            self.state.set_value(v);
        }

        fn value(&self) -> bool {
            self.state.value()
        }
    };
}

/// True if B lies in A's closure and touches A's interior.
#[derive(Debug, Clone)]
pub struct Contains {
    state: ImState,
}

impl Contains {
    pub fn new() -> Self {
        Contains { state: ImState::new() }
    }

    fn init_dims_check(&mut self) {
        let ok = dims_compatible_with_covers(self.state.dim_a, self.state.dim_b);
        self.state.require(ok);
    }

    fn is_determined(&self) -> bool {
        // any part of B found in A's exterior settles it
        self.state.intersects_cell(Exterior, Interior)
            || self.state.intersects_cell(Exterior, Boundary)
    }

    fn value_im(&self) -> bool {
        self.state.intersects_cell(Interior, Interior)
            && !self.state.intersects_cell(Exterior, Interior)
            && !self.state.intersects_cell(Exterior, Boundary)
    }
}

impl TopologyPredicate for Contains {
    fn name(&self) -> &'static str {
        "contains"
    }

    fn require_self_noding(&self) -> bool {
        false
    }

    fn require_covers(&self, is_a: bool) -> bool {
        is_a
    }

    fn require_exterior_check(&self, is_a: bool) -> bool {
        !is_a
    }

    fn init_env(&mut self, env: EnvelopeInfo) {
        self.state.require(env.a_covers_b);
    }

    im_predicate_shell!();
}

/// True if A lies in B's closure and touches B's interior.
#[derive(Debug, Clone)]
pub struct Within {
    state: ImState,
}

impl Within {
    pub fn new() -> Self {
        Within { state: ImState::new() }
    }

    fn init_dims_check(&mut self) {
        let ok = dims_compatible_with_covers(self.state.dim_b, self.state.dim_a);
        self.state.require(ok);
    }

    fn is_determined(&self) -> bool {
        self.state.intersects_cell(Interior, Exterior)
            || self.state.intersects_cell(Boundary, Exterior)
    }

    fn value_im(&self) -> bool {
        self.state.intersects_cell(Interior, Interior)
            && !self.state.intersects_cell(Interior, Exterior)
            && !self.state.intersects_cell(Boundary, Exterior)
    }
}

impl TopologyPredicate for Within {
    fn name(&self) -> &'static str {
        "within"
    }

    fn require_self_noding(&self) -> bool {
        false
    }

    fn require_covers(&self, is_a: bool) -> bool {
        !is_a
    }

    fn require_exterior_check(&self, is_a: bool) -> bool {
        is_a
    }

    fn init_env(&mut self, env: EnvelopeInfo) {
        self.state.require(env.b_covers_a);
    }

    im_predicate_shell!();
}

/// True if every point of B lies in A's closure.
#[derive(Debug, Clone)]
pub struct Covers {
    state: ImState,
}

impl Covers {
    pub fn new() -> Self {
        Covers { state: ImState::new() }
    }

    fn init_dims_check(&mut self) {
        let ok = dims_compatible_with_covers(self.state.dim_a, self.state.dim_b);
        self.state.require(ok);
    }

    fn is_determined(&self) -> bool {
        self.state.intersects_cell(Exterior, Interior)
            || self.state.intersects_cell(Exterior, Boundary)
    }

    fn value_im(&self) -> bool {
        let any_intersection = self.state.intersects_cell(Interior, Interior)
            || self.state.intersects_cell(Interior, Boundary)
            || self.state.intersects_cell(Boundary, Interior)
            || self.state.intersects_cell(Boundary, Boundary);
        any_intersection
            && !self.state.intersects_cell(Exterior, Interior)
            && !self.state.intersects_cell(Exterior, Boundary)
    }
}

impl TopologyPredicate for Covers {
    fn name(&self) -> &'static str {
        "covers"
    }

    fn require_self_noding(&self) -> bool {
        false
    }

    fn require_covers(&self, is_a: bool) -> bool {
        is_a
    }

    fn require_exterior_check(&self, is_a: bool) -> bool {
        !is_a
    }

    fn init_env(&mut self, env: EnvelopeInfo) {
        self.state.require(env.a_covers_b);
    }

    im_predicate_shell!();
}

/// True if every point of A lies in B's closure.
#[derive(Debug, Clone)]
pub struct CoveredBy {
    state: ImState,
}

impl CoveredBy {
    pub fn new() -> Self {
        CoveredBy { state: ImState::new() }
    }

    fn init_dims_check(&mut self) {
        let ok = dims_compatible_with_covers(self.state.dim_b, self.state.dim_a);
        self.state.require(ok);
    }

    fn is_determined(&self) -> bool {
        self.state.intersects_cell(Interior, Exterior)
            || self.state.intersects_cell(Boundary, Exterior)
    }

    fn value_im(&self) -> bool {
        let any_intersection = self.state.intersects_cell(Interior, Interior)
            || self.state.intersects_cell(Interior, Boundary)
            || self.state.intersects_cell(Boundary, Interior)
            || self.state.intersects_cell(Boundary, Boundary);
        any_intersection
            && !self.state.intersects_cell(Interior, Exterior)
            && !self.state.intersects_cell(Boundary, Exterior)
    }
}

impl TopologyPredicate for CoveredBy {
    fn name(&self) -> &'static str {
        "coveredBy"
    }

    fn require_self_noding(&self) -> bool {
        false
    }

    fn require_covers(&self, is_a: bool) -> bool {
        !is_a
    }

    fn require_exterior_check(&self, is_a: bool) -> bool {
        is_a
    }

    fn init_env(&mut self, env: EnvelopeInfo) {
        self.state.require(env.b_covers_a);
    }

    im_predicate_shell!();
}

/// True if the interiors intersect in a lower dimension and each input
/// reaches outside the other (the OGC dimension-dependent definition).
#[derive(Debug, Clone)]
pub struct Crosses {
    state: ImState,
}

impl Crosses {
    pub fn new() -> Self {
        Crosses { state: ImState::new() }
    }

    fn init_dims_check(&mut self) {
        let (a, b) = (self.state.dim_a, self.state.dim_b);
        let both_points_or_areas = (a == Dimension::P && b == Dimension::P)
            || (a == Dimension::A && b == Dimension::A);
        self.state
            .require(a != Dimension::False && b != Dimension::False && !both_points_or_areas);
    }

    fn is_determined(&self) -> bool {
        let (a, b) = (self.state.dim_a, self.state.dim_b);
        if a == Dimension::L && b == Dimension::L {
            // two lines cross only in a point; higher settles false
            return self.state.dim_cell(Interior, Interior) > Dimension::P;
        }
        if a < b {
            return self.state.intersects_cell(Interior, Interior)
                && self.state.intersects_cell(Interior, Exterior);
        }
        if a > b {
            return self.state.intersects_cell(Interior, Interior)
                && self.state.intersects_cell(Exterior, Interior);
        }
        false
    }

    fn value_im(&self) -> bool {
        let (a, b) = (self.state.dim_a, self.state.dim_b);
        if a == Dimension::L && b == Dimension::L {
            return self.state.dim_cell(Interior, Interior) == Dimension::P;
        }
        if a < b {
            return self.state.intersects_cell(Interior, Interior)
                && self.state.intersects_cell(Interior, Exterior);
        }
        if a > b {
            return self.state.intersects_cell(Interior, Interior)
                && self.state.intersects_cell(Exterior, Interior);
        }
        false
    }
}

impl TopologyPredicate for Crosses {
    fn name(&self) -> &'static str {
        "crosses"
    }

    im_predicate_shell!();
}

/// True if the inputs share interior points but neither covers the
/// other; defined only for equal dimensions.
#[derive(Debug, Clone)]
pub struct Overlaps {
    state: ImState,
}

impl Overlaps {
    pub fn new() -> Self {
        Overlaps { state: ImState::new() }
    }

    fn init_dims_check(&mut self) {
        let (a, b) = (self.state.dim_a, self.state.dim_b);
        self.state.require(a != Dimension::False && a == b);
    }

    fn required_cells_met(&self) -> bool {
        let ii_ok = if self.state.dim_a == Dimension::L {
            // line/line overlap must be one-dimensional
            self.state.dim_cell(Interior, Interior) == Dimension::L
        } else {
            self.state.intersects_cell(Interior, Interior)
        };
        ii_ok
            && self.state.intersects_cell(Interior, Exterior)
            && self.state.intersects_cell(Exterior, Interior)
    }

    fn is_determined(&self) -> bool {
        self.required_cells_met()
    }

    fn value_im(&self) -> bool {
        self.required_cells_met()
    }
}

impl TopologyPredicate for Overlaps {
    fn name(&self) -> &'static str {
        "overlaps"
    }

    im_predicate_shell!();
}

/// True if the inputs touch only on boundaries: some boundary contact,
/// no interior/interior contact.
#[derive(Debug, Clone)]
pub struct Touches {
    state: ImState,
}

impl Touches {
    pub fn new() -> Self {
        Touches { state: ImState::new() }
    }

    fn init_dims_check(&mut self) {
        let (a, b) = (self.state.dim_a, self.state.dim_b);
        // points have no boundary to touch with
        let both_points = a == Dimension::P && b == Dimension::P;
        self.state
            .require(a != Dimension::False && b != Dimension::False && !both_points);
    }

    fn is_determined(&self) -> bool {
        self.state.intersects_cell(Interior, Interior)
    }

    fn value_im(&self) -> bool {
        let has_boundary_contact = self.state.intersects_cell(Interior, Boundary)
            || self.state.intersects_cell(Boundary, Interior)
            || self.state.intersects_cell(Boundary, Boundary);
        !self.state.intersects_cell(Interior, Interior) && has_boundary_contact
    }
}

impl TopologyPredicate for Touches {
    fn name(&self) -> &'static str {
        "touches"
    }

    im_predicate_shell!();
}

/// Topological equality: the inputs cover each other.
#[derive(Debug, Clone)]
pub struct EqualsTopo {
    state: ImState,
}

impl EqualsTopo {
    pub fn new() -> Self {
        EqualsTopo { state: ImState::new() }
    }

    fn init_dims_check(&mut self) {
        let (a, b) = (self.state.dim_a, self.state.dim_b);
        self.state.require(a != Dimension::False && a == b);
    }

    fn is_determined(&self) -> bool {
        self.state.intersects_cell(Interior, Exterior)
            || self.state.intersects_cell(Boundary, Exterior)
            || self.state.intersects_cell(Exterior, Interior)
            || self.state.intersects_cell(Exterior, Boundary)
    }

    fn value_im(&self) -> bool {
        self.state.intersects_cell(Interior, Interior)
            && !self.state.intersects_cell(Interior, Exterior)
            && !self.state.intersects_cell(Boundary, Exterior)
            && !self.state.intersects_cell(Exterior, Interior)
            && !self.state.intersects_cell(Exterior, Boundary)
    }
}

impl TopologyPredicate for EqualsTopo {
    fn name(&self) -> &'static str {
        "equalsTopo"
    }

    fn require_covers(&self, _is_a: bool) -> bool {
        true
    }

    fn init_env(&mut self, env: EnvelopeInfo) {
        self.state.require(env.a_covers_b && env.b_covers_a);
    }

    im_predicate_shell!();
}
