//! Error types for tfmock
//!
//! These errors cover value access and codec failures inside the crate.
//! Failures crossing the provider boundary are reported as diagnostics on the
//! response, never as `Err`.

/// Error type for tfmock operations
#[derive(Debug, thiserror::Error)]
pub enum TfMockError {
    #[error("encoding error: {0}")]
    Encoding(String),

    #[error("decoding error: {0}")]
    Decoding(String),

    #[error("type mismatch: expected {expected}, got {actual}")]
    TypeMismatch { expected: String, actual: String },

    #[error("attribute '{0}' not found")]
    AttributeNotFound(String),

    #[error("{0}")]
    Custom(String),
}

/// Result type alias for tfmock operations
pub type Result<T> = std::result::Result<T, TfMockError>;
