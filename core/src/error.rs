//! Error types for the catalog client.
//!
//! # Design
//! Each failure kind a caller plausibly branches on gets its own variant:
//! `NotFound` for absent items, `Authentication` for bad credentials or a
//! missing/expired session, `Validation` for payloads the catalog rejected.
//! Unexpected statuses land in `Http` with the raw status code and body for
//! debugging. Nothing is silently suppressed; every variant carries the
//! catalog-provided message when one is available.

use std::fmt;

/// Errors returned by catalog client operations.
#[derive(Debug)]
pub enum Error {
    /// Bad environment name or client setup; fatal, surfaced at construction.
    Configuration(String),

    /// Invalid credentials, or the session is missing/expired (HTTP 401/403).
    Authentication(String),

    /// The server returned 404 — the referenced item or resource is absent.
    NotFound,

    /// The server rejected the payload shape or content (HTTP 400/422).
    Validation { status: u16, message: String },

    /// A local file could not be read, or an upload round trip failed.
    Upload(String),

    /// Network-level failure after any applicable retries were exhausted.
    Transport(String),

    /// The server returned a status outside the expected set and the error
    /// taxonomy above.
    Http { status: u16, body: String },

    /// The request payload could not be serialized to JSON.
    Serialization(String),

    /// The response body could not be deserialized into the expected type.
    Deserialization(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Configuration(msg) => write!(f, "configuration error: {msg}"),
            Error::Authentication(msg) => write!(f, "authentication failed: {msg}"),
            Error::NotFound => write!(f, "resource not found"),
            Error::Validation { status, message } => {
                write!(f, "validation failed (HTTP {status}): {message}")
            }
            Error::Upload(msg) => write!(f, "upload failed: {msg}"),
            Error::Transport(msg) => write!(f, "transport error: {msg}"),
            Error::Http { status, body } => write!(f, "HTTP {status}: {body}"),
            Error::Serialization(msg) => write!(f, "serialization failed: {msg}"),
            Error::Deserialization(msg) => {
                write!(f, "deserialization failed: {msg}")
            }
        }
    }
}

impl std::error::Error for Error {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_carries_status_and_message() {
        let err = Error::Validation {
            status: 400,
            message: "unknown parentId".to_string(),
        };
        assert_eq!(err.to_string(), "validation failed (HTTP 400): unknown parentId");

        let err = Error::Http {
            status: 500,
            body: "internal error".to_string(),
        };
        assert_eq!(err.to_string(), "HTTP 500: internal error");
    }

    #[test]
    fn not_found_display() {
        assert_eq!(Error::NotFound.to_string(), "resource not found");
    }
}
