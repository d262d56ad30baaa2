//! Error types split along the demo's two-tier policy: setup failures are
//! fatal and propagate out of `main`, operation failures are returned as
//! values and absorbed by the caller.

use thiserror::Error;
use tonic::{Code, Status};

/// Fatal errors raised while preparing the demo: configuration, logging
/// bootstrap, connection and authentication.
#[derive(Debug, Error)]
pub enum SetupError {
    #[error("invalid endpoint: {0}")]
    InvalidEndpoint(String),

    #[error("connection failed: {0}")]
    Connect(#[from] tonic::transport::Error),

    #[error("authentication rejected for user '{user}': {message}")]
    Authentication { user: String, message: String },

    #[error("credentials are not valid request metadata: {0}")]
    InvalidCredentials(String),

    #[error("logging initialization failed: {0}")]
    Logging(String),

    #[error("cannot read config file {path}: {source}")]
    ConfigRead {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot parse config file {path}: {source}")]
    ConfigParse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Per-operation failures. Never fatal for the demo flow.
#[derive(Debug, Error)]
pub enum OpError {
    /// The server refused the operation for this principal.
    #[error("{0}")]
    Denied(String),

    /// The connection was already released.
    #[error("not connected to the cache service")]
    NotConnected,

    /// Any other transport or server-side failure.
    #[error("remote operation failed: {0}")]
    Remote(String),
}

impl OpError {
    pub fn is_denied(&self) -> bool {
        matches!(self, OpError::Denied(_))
    }

    /// Only plain transport failures qualify for a retry.
    pub(crate) fn is_retryable(&self) -> bool {
        matches!(self, OpError::Remote(_))
    }
}

impl From<Status> for OpError {
    fn from(status: Status) -> Self {
        match status.code() {
            Code::PermissionDenied | Code::Unauthenticated => {
                OpError::Denied(status.message().to_string())
            }
            _ => OpError::Remote(status.message().to_string()),
        }
    }
}
