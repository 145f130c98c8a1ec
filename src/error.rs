//! Error types for the Forge client

use thiserror::Error;

/// Result type alias for client operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while building or sending a render request
#[derive(Error, Debug)]
pub enum Error {
    /// The request was rejected locally and never reached the network
    #[error("invalid value for `{key}`: expected {expected}")]
    Validation {
        /// Option key (wire name) that failed validation
        key: &'static str,
        /// Human readable description of the accepted domain
        expected: String,
    },

    /// The rendering service answered with a 4xx/5xx status
    #[error("server error ({status}): {message}")]
    Server {
        /// HTTP status code
        status: u16,
        /// Message extracted from the error body, empty when none was found
        message: String,
    },

    /// Transport failure: DNS, refused connection, reset, or timeout
    #[error("connection error: {0}")]
    Connection(#[source] reqwest::Error),

    /// The client was used after `close()`
    #[error("client is closed")]
    Closed,

    /// Invalid client configuration
    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl Error {
    pub(crate) fn validation(key: &'static str, expected: impl Into<String>) -> Self {
        Error::Validation {
            key,
            expected: expected.into(),
        }
    }

    /// True for locally detected request problems.
    pub fn is_validation(&self) -> bool {
        matches!(self, Error::Validation { .. })
    }

    /// True when the service returned an error status.
    pub fn is_server(&self) -> bool {
        matches!(self, Error::Server { .. })
    }

    /// True for transport-level failures, timeouts included.
    pub fn is_connection(&self) -> bool {
        matches!(self, Error::Connection(_))
    }

    /// True when the request exceeded its timeout.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Error::Connection(e) if e.is_timeout())
    }

    /// HTTP status of a server error.
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Server { status, .. } => Some(*status),
            _ => None,
        }
    }
}
