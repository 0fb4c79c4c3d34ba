//! Error types for Agora.
//!
//! Cache lookups never fail: a miss is `None`, not an error. Everything in
//! this enum comes from the geocoding boundary or from configuration.

use thiserror::Error;

/// Result type alias using `AgoraError`.
pub type Result<T> = std::result::Result<T, AgoraError>;

/// Main error type for all Agora operations.
#[derive(Debug, Error)]
pub enum AgoraError {
    // ═══════════════════════════════════════════════════════════════════════════
    // NETWORK ERRORS
    // ═══════════════════════════════════════════════════════════════════════════

    /// HTTP request failed before a response arrived.
    #[error("HTTP request failed: {0}")]
    HttpError(String),

    /// Server answered with a non-success status.
    #[error("HTTP {status}: {body}")]
    HttpStatus { status: u16, body: String },

    /// Server answered with an empty body.
    #[error("Empty response body")]
    EmptyResponse,

    /// Response body could not be decoded.
    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    /// Connection timeout.
    #[error("Connection timeout: {0}")]
    ConnectionTimeout(String),

    /// Local I/O error.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    // ═══════════════════════════════════════════════════════════════════════════
    // SERIALIZATION ERRORS
    // ═══════════════════════════════════════════════════════════════════════════

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    // ═══════════════════════════════════════════════════════════════════════════
    // VALIDATION ERRORS
    // ═══════════════════════════════════════════════════════════════════════════

    /// Input validation failed.
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl AgoraError {
    /// Returns true if this error came from the transport or the response
    /// body (the I/O kind callers react to by retrying or showing an error).
    pub fn is_io_error(&self) -> bool {
        matches!(
            self,
            AgoraError::HttpError(_)
                | AgoraError::HttpStatus { .. }
                | AgoraError::EmptyResponse
                | AgoraError::MalformedResponse(_)
                | AgoraError::ConnectionTimeout(_)
                | AgoraError::IoError(_)
        )
    }

    /// Returns true if retrying the same call may succeed.
    pub fn is_recoverable(&self) -> bool {
        match self {
            AgoraError::HttpError(_) | AgoraError::ConnectionTimeout(_) => true,
            AgoraError::HttpStatus { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }
}
