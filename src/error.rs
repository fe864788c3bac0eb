use thiserror::Error;

use crate::Float;

/// Errors raised while validating the description of the search region, before any sampling
/// or fitness evaluation takes place.
///
/// These are returned by [`Bounds::new`](crate::Bounds::new); a [`Bounds`](crate::Bounds)
/// value that exists is always well formed.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigurationError {
    /// The search region must have at least one dimension.
    #[error("search region has zero dimensions")]
    EmptyBounds,
    /// The lower and upper limit vectors must have the same length.
    #[error("bound vectors differ in length ({lower} lower limits, {upper} upper limits)")]
    LengthMismatch {
        /// Number of lower limits given.
        lower: usize,
        /// Number of upper limits given.
        upper: usize,
    },
    /// Every limit must be a finite number.
    #[error("non-finite limit in dimension {index}")]
    NonFiniteBound {
        /// The offending dimension.
        index: usize,
    },
    /// Every lower limit must not exceed its upper limit.
    #[error("lower limit {lower} exceeds upper limit {upper} in dimension {index}")]
    InvertedBound {
        /// The offending dimension.
        index: usize,
        /// The lower limit in that dimension.
        lower: Float,
        /// The upper limit in that dimension.
        upper: Float,
    },
}
