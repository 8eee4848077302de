//! Authentication outcome

use dirbind_core::{AuthFailure, Error, Result};

/// Every way a credential check can end.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthOutcome {
    /// Credentials accepted
    Authenticated,
    /// No entry matched the login
    UserNotFound,
    /// The entry exists but the bind was rejected
    WrongPassword,
    /// The check could not be carried out
    ConnectionFailed(String),
    /// Rejected without further detail
    UnspecifiedAuthFailure,
}

impl AuthOutcome {
    /// Classify the result of an authentication attempt.
    pub fn from_result<T>(result: Result<T>) -> Self {
        match result {
            Ok(_) => AuthOutcome::Authenticated,
            Err(Error::Authentication(AuthFailure::UserNotFound)) => AuthOutcome::UserNotFound,
            Err(Error::Authentication(AuthFailure::IncorrectPassword)) => {
                AuthOutcome::WrongPassword
            }
            Err(Error::Authentication(AuthFailure::Unspecified(_))) => {
                AuthOutcome::UnspecifiedAuthFailure
            }
            Err(e) => AuthOutcome::ConnectionFailed(e.to_string()),
        }
    }

    /// Whether the credential was accepted.
    pub fn is_success(&self) -> bool {
        matches!(self, AuthOutcome::Authenticated)
    }

    /// The directory answered and said no.
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            AuthOutcome::UserNotFound
                | AuthOutcome::WrongPassword
                | AuthOutcome::UnspecifiedAuthFailure
        )
    }

    /// Stable name of the outcome
    pub fn as_str(&self) -> &'static str {
        match self {
            AuthOutcome::Authenticated => "authenticated",
            AuthOutcome::UserNotFound => "user_not_found",
            AuthOutcome::WrongPassword => "wrong_password",
            AuthOutcome::ConnectionFailed(_) => "connection_failed",
            AuthOutcome::UnspecifiedAuthFailure => "unspecified_auth_failure",
        }
    }
}
