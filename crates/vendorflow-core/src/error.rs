//! Error types for the VendorFlow client toolkit.
//!
//! This module provides a unified error type with explicit variants for
//! authentication, rate limiting, server, transport, and input validation
//! failures. Every failure of a request is returned as one of these values;
//! callers branch on the variant rather than on panics.

use std::fmt;
use thiserror::Error;

/// Default wait applied when a 429 response carries no usable `Retry-After`.
pub const DEFAULT_RETRY_AFTER_MS: u64 = 5_000;

/// The unified error type for VendorFlow client operations.
#[derive(Debug, Error)]
pub enum Error {
    /// No usable credential exists; the user has been sent to login.
    #[error("not authenticated")]
    Unauthenticated,

    /// The server answered 429. Never retried automatically.
    #[error(
        "Rate limited. Please wait {} seconds before retrying.",
        .retry_after_ms.div_ceil(1000)
    )]
    RateLimited { retry_after_ms: u64 },

    /// Non-OK HTTP status after any retry logic completed.
    #[error(transparent)]
    Server(#[from] ServerError),

    /// Network transport errors (DNS, connection, timeout).
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// The caller aborted the request.
    #[error("Request was cancelled")]
    Cancelled,

    /// The refresh endpoint failed; credentials have been cleared.
    #[error("Authentication failed: {0}")]
    RefreshFailed(#[from] RefreshError),

    /// The response body could not be decoded.
    #[error("invalid response: {message}")]
    Decode { message: String },

    /// Persistent credential storage failed.
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    /// Input validation errors (base URL, header values).
    #[error("invalid input: {0}")]
    InvalidInput(#[from] InvalidInputError),
}

impl Error {
    /// Returns the HTTP status associated with this error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::RateLimited { .. } => Some(429),
            Error::Server(err) => Some(err.status),
            Error::RefreshFailed(RefreshError::Rejected { status, .. }) => Some(*status),
            _ => None,
        }
    }

    /// True when this error left the client without credentials.
    pub fn requires_login(&self) -> bool {
        matches!(self, Error::Unauthenticated | Error::RefreshFailed(_))
    }

    pub fn decode(message: impl Into<String>) -> Self {
        Error::Decode {
            message: message.into(),
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::decode(err.to_string())
    }
}

/// An error reported by the server with a non-OK status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerError {
    /// HTTP status code.
    pub status: u16,
    /// Canonical reason phrase for the status.
    pub status_text: String,
    /// Server-provided message, if the body carried one.
    pub message: Option<String>,
}

impl ServerError {
    pub fn new(status: u16, status_text: impl Into<String>, message: Option<String>) -> Self {
        Self {
            status,
            status_text: status_text.into(),
            message,
        }
    }

    /// Check if this is an authorization rejection.
    pub fn is_unauthorized(&self) -> bool {
        self.status == 401
    }
}

impl fmt::Display for ServerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.message {
            Some(ref message) => write!(f, "{}", message),
            None => write!(f, "HTTP {}: {}", self.status, self.status_text),
        }
    }
}

impl std::error::Error for ServerError {}

/// Transport-level errors. None of these carry a status code.
#[derive(Debug, Clone, Error)]
pub enum TransportError {
    /// Network connection failed.
    #[error("Network error - unable to connect to server: {message}")]
    Connection { message: String },

    /// Request timed out.
    #[error("request timed out")]
    Timeout,

    /// Generic HTTP error.
    #[error("HTTP error: {message}")]
    Http { message: String },
}

/// Failure of the shared token refresh.
///
/// Every caller waiting on the same refresh receives a clone of this value.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RefreshError {
    /// The refresh endpoint answered with a non-OK status.
    #[error("token refresh rejected with HTTP {status}")]
    Rejected { status: u16, message: Option<String> },

    /// The refresh request never produced a response.
    #[error("token refresh failed: {message}")]
    Transport { message: String },

    /// The refresh response did not carry a usable token.
    #[error("token refresh returned an invalid body: {message}")]
    InvalidResponse { message: String },

    /// The refresh task stopped before producing a result.
    #[error("token refresh interrupted: {message}")]
    Interrupted { message: String },
}

/// Errors from persistent credential storage.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Reading or writing the backing medium failed.
    #[error("I/O error on {path}: {message}")]
    Io { path: String, message: String },

    /// Stored data could not be parsed.
    #[error("corrupt entry '{key}': {message}")]
    Corrupt { key: String, message: String },
}

/// Input validation errors.
#[derive(Debug, Error)]
pub enum InvalidInputError {
    /// Invalid API base URL.
    #[error("invalid API URL '{value}': {reason}")]
    ApiUrl { value: String, reason: String },

    /// Header value contains characters HTTP does not allow.
    #[error("invalid header '{name}': {reason}")]
    Header { name: String, reason: String },

    /// Invalid access token.
    #[error("invalid access token: {reason}")]
    Token { reason: String },

    /// Generic invalid input.
    #[error("invalid input: {message}")]
    Other { message: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rate_limited_reports_whole_seconds() {
        let err = Error::RateLimited {
            retry_after_ms: 10_000,
        };
        assert_eq!(
            err.to_string(),
            "Rate limited. Please wait 10 seconds before retrying."
        );

        let err = Error::RateLimited {
            retry_after_ms: 1_500,
        };
        assert!(err.to_string().contains("wait 2 seconds"));
    }

    #[test]
    fn server_error_prefers_server_message() {
        let err = ServerError::new(400, "Bad Request", Some("Email already in use".into()));
        assert_eq!(err.to_string(), "Email already in use");

        let err = ServerError::new(502, "Bad Gateway", None);
        assert_eq!(err.to_string(), "HTTP 502: Bad Gateway");
    }

    #[test]
    fn status_is_exposed_for_http_failures() {
        assert_eq!(Error::RateLimited { retry_after_ms: 0 }.status(), Some(429));
        assert_eq!(
            Error::Server(ServerError::new(404, "Not Found", None)).status(),
            Some(404)
        );
        assert_eq!(Error::Cancelled.status(), None);
        assert_eq!(Error::Transport(TransportError::Timeout).status(), None);
    }

    #[test]
    fn login_required_variants() {
        assert!(Error::Unauthenticated.requires_login());
        assert!(
            Error::RefreshFailed(RefreshError::Rejected {
                status: 401,
                message: None
            })
            .requires_login()
        );
        assert!(!Error::Cancelled.requires_login());
    }
}
