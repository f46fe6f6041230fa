use thiserror::Error;

/// Errors raised while validating relate inputs.
///
/// A predicate evaluating to `false` is a value, not an error; these
/// only cover inputs the engine cannot assign a topology to.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum RelateError {
    /// An input coordinate is NaN or infinite.
    #[error("non-finite coordinate ({0}, {1}) in input geometry")]
    NonFiniteCoord(f64, f64),

    /// A polygon ring does not end at its start point.
    #[error("polygon ring is not closed")]
    RingNotClosed,

    /// A DE-9IM pattern string is malformed.
    #[error("invalid DE-9IM pattern {0:?}: must be 9 chars of F,T,0,1,2,*")]
    InvalidPattern(String),
}

pub type Result<T> = std::result::Result<T, RelateError>;
