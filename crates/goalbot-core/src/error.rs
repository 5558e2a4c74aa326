use thiserror::Error;

/// Top-level error type for goalbot.
#[derive(Debug, Error)]
pub enum GoalbotError {
    /// Network or HTTP-level failure talking to the messaging gateway.
    #[error("transport error: {0}")]
    Transport(String),

    /// Gateway response did not match the expected shape.
    #[error("protocol decode error: {0}")]
    ProtocolDecode(String),

    /// A category or goal lookup failed (missing, deleted, or not owned).
    #[error("domain lookup error: {0}")]
    DomainLookup(String),

    /// Verification code did not match any pending chat identity.
    #[error("not found: {0}")]
    NotFound(String),

    /// Input rejected before reaching storage.
    #[error("validation error: {0}")]
    Validation(String),

    /// Configuration error.
    #[error("config error: {0}")]
    Config(String),

    /// Storage error.
    #[error("memory error: {0}")]
    Memory(String),

    /// I/O error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
