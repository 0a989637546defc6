//! # Resize Errors

/// Errors surfaced by the conditioning resizer.
///
/// Every error aborts the whole call; there are no partial results.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ResizeError {
    /// ``attention_bias`` is present but is not a ``[batch, heads, seq, seq]`` tensor.
    #[error("invalid attention_bias shape: {0}")]
    InvalidShape(String),

    /// A resize parameter is outside its accepted domain.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),
}

/// Result type alias for resizer operations.
pub type Result<T> = std::result::Result<T, ResizeError>;
