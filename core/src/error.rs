//! Error types for the paddock API client.
//!
//! # Design
//! The backend does not distinguish error kinds beyond the HTTP status, so
//! neither do we: every non-2xx response lands in `Http` with the numeric
//! status and the body (or the reason phrase when the body is empty). The
//! rendered message is what the front-end shows verbatim.

/// Errors returned by the client's parse methods and by `Api` operations.
#[derive(thiserror::Error, Debug)]
pub enum ApiError {
    /// The server returned a non-2xx status.
    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },

    /// The request never produced a response (connect, DNS, TLS, ...).
    #[error("transport failed: {0}")]
    Transport(String),

    /// The response body could not be deserialized into the expected type.
    #[error("deserialization failed: {0}")]
    Deserialization(String),

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    Serialization(String),
}

impl ApiError {
    /// Status code of an `Http` error, `None` for the other kinds.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, ApiError>;
