//! Error types for the lighting block.

use thiserror::Error;

/// Lighting system errors
#[derive(Error, Debug)]
pub enum LightError {
    /// Command address matched no routing pattern
    #[error("unknown address: {0}")]
    UnknownAddress(String),

    /// Segment parameter name not handled
    #[error("unknown parameter: {0}")]
    UnknownParameter(String),

    /// Scene/effect/segment id absent
    #[error("{kind} {id} not found")]
    NotFound {
        kind: &'static str,
        id: i32,
    },

    /// Payload variant did not have the expected shape
    #[error(transparent)]
    PayloadMismatch(#[from] beatstrip_core::CoreError),

    /// Standard IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/Deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for lighting operations
pub type Result<T> = std::result::Result<T, LightError>;
