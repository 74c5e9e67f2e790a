//! Error types for the fabraic client.
//!
//! # Design
//! Every failure is scoped to a single construction or a single request, so a
//! flat enum is enough. `Request` keeps the status and whatever JSON the server
//! sent back; when that body does not parse it is `Value::Null` rather than a
//! second error, so the status is never masked.

use serde_json::Value;

/// Errors returned by `FabraicClient` and `ServiceClient`.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Missing credentials, no usable transport, a bad base URL or an empty
    /// service path. Raised at construction time.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// The server answered with a non-2xx status.
    #[error("request failed with status {status}")]
    Request { status: u16, body: Value },

    /// A 2xx response carried a non-empty body that is not valid JSON.
    #[error("decoding failed: {0}")]
    Decoding(String),

    /// The request body could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    Serialization(String),

    /// The transport could not complete the round trip.
    #[error("transport error: {0}")]
    Transport(String),
}

impl Error {
    /// HTTP status for `Request` errors.
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Request { status, .. } => Some(*status),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
