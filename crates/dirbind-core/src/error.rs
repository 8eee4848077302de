//! Error types for Dirbind
//!
//! Two families are kept apart on purpose: [`Error::ConnectionFailed`] means the
//! credential could not be checked at all, [`Error::Authentication`] means it was
//! checked and rejected. Callers drive lockout counters and audit trails off this
//! split, so no code path may turn one into the other.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Directory connection failed: {0}")]
    ConnectionFailed(String),

    #[error(transparent)]
    Authentication(#[from] AuthFailure),
}

/// A bind or lookup that the directory answered with a rejection.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthFailure {
    #[error("User not found")]
    UserNotFound,

    #[error("Incorrect password")]
    IncorrectPassword,

    /// Rejected by the server without enough context to say which case applies.
    #[error("Authentication rejected: {0}")]
    Unspecified(String),
}

impl Error {
    /// Create an invalid argument error
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Error::InvalidArgument(msg.into())
    }

    /// Create a connection failure error
    pub fn connection(msg: impl Into<String>) -> Self {
        Error::ConnectionFailed(msg.into())
    }

    pub fn code(&self) -> &'static str {
        match self {
            Error::InvalidArgument(_) => "InvalidArgument",
            Error::ConnectionFailed(_) => "ConnectionFailed",
            Error::Authentication(failure) => failure.code(),
        }
    }

    /// Whether the directory could not be reached or answered unexpectedly.
    pub fn is_connection_failure(&self) -> bool {
        matches!(self, Error::ConnectionFailed(_))
    }

    pub fn auth_failure(&self) -> Option<&AuthFailure> {
        match self {
            Error::Authentication(failure) => Some(failure),
            _ => None,
        }
    }
}

impl AuthFailure {
    pub fn code(&self) -> &'static str {
        match self {
            AuthFailure::UserNotFound => "UserNotFound",
            AuthFailure::IncorrectPassword => "IncorrectPassword",
            AuthFailure::Unspecified(_) => "UnspecifiedAuthFailure",
        }
    }
}
