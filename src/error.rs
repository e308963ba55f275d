//! Crate-wide error taxonomy.

use thiserror::Error;

/// Errors surfaced by record construction and the upload protocol.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// A required construction parameter is missing. Raised before any
    /// network activity.
    #[error("missing required parameter '{0}'")]
    InvalidConfiguration(&'static str),

    /// Invalid input at a record boundary, raised synchronously at the
    /// point of assignment.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The client id is not recognized by the authentication server.
    /// Distinct from bad user credentials.
    #[error("invalid client id: {0}")]
    InvalidClientId(String),

    /// Bad username/password, or a token the server rejected.
    #[error("access denied: {0}")]
    AccessDenied(String),

    /// Unexpected status, content type, unparseable body, or a transport
    /// that could not reach the server at all.
    #[error("server error: {0}")]
    Server(String),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;
