//! Error types surfaced to identifier-request callers.

use crate::cache::CacheKey;
use crate::config::ConfigError;
use crate::encoder::EncodeError;

/// Errors returned by [`SegmentCache`](crate::SegmentCache).
///
/// Authority failures never appear here: they are absorbed by serving the remaining segment
/// capacity or by degrading to a fallback identifier.
#[derive(thiserror::Error, Clone, Eq, PartialEq, Debug)]
pub enum Error {
    /// A served integer could not be mapped through the digit table.
    #[error("encoding error: {0}")]
    Encode(#[from] EncodeError),

    /// The cache was called with an identity other than the one it was first used with.
    #[error("cache is bound to {expected}, refusing to serve {found}")]
    IdentityMismatch { expected: CacheKey, found: CacheKey },

    /// The cache was constructed with an unusable configuration.
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
}

pub type Result<T> = std::result::Result<T, Error>;
