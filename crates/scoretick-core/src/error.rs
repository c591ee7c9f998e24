//! Error types shared across the scoretick core.

use thiserror::Error;

/// Errors produced by map construction, conversion queries, frame generation,
/// and frame persistence.
#[derive(Debug, Error)]
pub enum ScoretickError {
    /// A required input file (MIDI, anchor list, frame file) does not exist.
    #[error("input not found: {0}")]
    InputNotFound(String),

    /// The input exists but violates a structural invariant, e.g. a tempo map
    /// that cannot be built from non-monotonic events. Construction-time
    /// errors abort the whole pipeline stage; partial maps are not usable.
    #[error("malformed input: {0}")]
    MalformedInput(String),

    /// A tick or time was queried outside the representable span. Unreachable
    /// for maps honoring the default-entry invariant, but checked defensively.
    #[error("out of range: {0}")]
    OutOfRange(String),

    /// A caller contract violation, e.g. non-positive period, spacing, or fps.
    #[error("invalid configuration: {0}")]
    Configuration(String),

    /// IO error during reading or writing.
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON (de)serialization error during frame persistence.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, ScoretickError>;
