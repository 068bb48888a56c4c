//! Authentication error types.

use thiserror::Error;

/// Errors that can occur while signing an administrator in.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Invalid email format.
    #[error("invalid email: {0}")]
    InvalidEmail(#[from] zym_power_core::EmailError),

    /// Wrong password or unknown account.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// The account has been disabled.
    #[error("user disabled")]
    UserDisabled,

    /// The identity service is throttling this account.
    #[error("too many attempts")]
    TooManyAttempts,

    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// API returned an unexpected error response.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Failed to parse response.
    #[error("Parse error: {0}")]
    Parse(String),
}

impl AuthError {
    /// Whether the failure is the visitor's fault rather than a service outage.
    #[must_use]
    pub const fn is_rejection(&self) -> bool {
        matches!(
            self,
            Self::InvalidEmail(_)
                | Self::InvalidCredentials
                | Self::UserDisabled
                | Self::TooManyAttempts
        )
    }
}
