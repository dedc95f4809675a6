use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type for remote platform calls.
pub type PlatformResult<T> = std::result::Result<T, PlatformError>;

/// An error raised by a remote platform client.
///
/// Callers above the client layer propagate these verbatim; nothing in this
/// workspace retries or reinterprets them.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlatformError {
    /// The request never produced a response (connect failure, timeout, TLS).
    #[error("Request Error: {0}")]
    Request(String),

    /// The requested resource does not exist.
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// The service rejected the request credentials.
    #[error("Unauthenticated: {0}")]
    Unauthenticated(String),

    /// The caller is authenticated but not allowed to read the resource.
    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    /// Any other non-success response from the service.
    #[error("Service returned status {code}: {message}")]
    Status {
        /// HTTP status code.
        code: u16,
        /// Error body or status reason.
        message: String,
    },

    /// The response body could not be decoded.
    #[error("Decode Error: {0}")]
    Decode(String),
}
