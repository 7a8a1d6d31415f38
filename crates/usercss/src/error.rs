//! Error types for the usercss crate.
//!
//! Problems in user-supplied UserCSS never surface as errors; they are
//! reported as [`Diagnostic`](crate::Diagnostic)s on the parse result.
//! [`UsercssError`] covers the remaining fallible APIs.

use thiserror::Error;

/// Errors returned by fallible library operations.
#[derive(Debug, Error)]
pub enum UsercssError {
    /// A stored style could not be serialized or deserialized.
    #[error("stored style JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A stored `regexp` domain rule does not compile.
    #[error("invalid regexp domain rule: {0}")]
    InvalidRegex(#[from] fancy_regex::Error),
}

/// Result type for usercss operations.
pub type Result<T> = std::result::Result<T, UsercssError>;
