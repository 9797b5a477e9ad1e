//! Error types for the Kanka API client.
//!
//! # Design
//! Every failure an operation can produce lands in one of three `ApiError`
//! variants, so callers match exhaustively instead of probing error types at
//! runtime:
//! - `Validation`: a body did not have the expected shape.
//! - `Http`: the server answered with a status outside 200-299.
//! - `Network`: no response was received at all.
//!
//! Errors are created once at the failure site and handed to the caller
//! unchanged. Nothing in the crate retries or recovers.

use std::error::Error as StdError;
use std::fmt;

use thiserror::Error;

/// Errors returned by every client operation.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The response (or, rarely, the request payload) did not match the
    /// expected schema.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The server returned a non-2xx status. `body` is kept verbatim.
    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },

    /// The request never produced a response.
    #[error(transparent)]
    Network(#[from] NetworkError),
}

impl ApiError {
    /// Status code of an `Http` error, `None` for the other variants.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Http { status, .. } => Some(*status),
            ApiError::Validation(_) | ApiError::Network(_) => None,
        }
    }

    /// Parses the body of an `Http` error as JSON, if it is JSON.
    pub fn json_body(&self) -> Option<serde_json::Value> {
        match self {
            ApiError::Http { body, .. } => serde_json::from_str(body).ok(),
            ApiError::Validation(_) | ApiError::Network(_) => None,
        }
    }
}

/// A body failed to decode into the expected type.
///
/// `path` addresses the offending element, e.g. `data[2].name`; `$` refers
/// to the whole document.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("validation failed at `{path}`: {message}")]
pub struct ValidationError {
    pub path: String,
    pub message: String,
}

impl ValidationError {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// Broad classification of a transport failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NetworkErrorKind {
    /// DNS resolution or TCP/TLS connection failed.
    Connect,
    /// The configured timeout elapsed.
    Timeout,
    /// The request could not be built or sent.
    Request,
    /// The response body could not be read.
    Body,
}

impl fmt::Display for NetworkErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            NetworkErrorKind::Connect => "connect",
            NetworkErrorKind::Timeout => "timeout",
            NetworkErrorKind::Request => "request",
            NetworkErrorKind::Body => "body",
        };
        f.write_str(name)
    }
}

/// A transport-level failure wrapping the underlying cause.
#[derive(Debug, Error)]
#[error("network error ({kind}): {source}")]
pub struct NetworkError {
    pub kind: NetworkErrorKind,
    #[source]
    pub source: Box<dyn StdError + Send + Sync>,
}

impl NetworkError {
    pub fn new(kind: NetworkErrorKind, source: impl Into<Box<dyn StdError + Send + Sync>>) -> Self {
        Self {
            kind,
            source: source.into(),
        }
    }
}
