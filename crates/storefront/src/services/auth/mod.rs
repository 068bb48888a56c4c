//! Administrator authentication.
//!
//! Credentials are checked by a hosted identity service. A successful
//! sign-in yields an ID token that authorises product writes until it expires.

mod error;

pub use error::AuthError;

use std::time::Duration;

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use zym_power_core::{AdminUid, Email};

/// Bearer token proving an administrator's identity to the product store.
#[derive(Clone)]
pub struct IdToken(SecretString);

impl IdToken {
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self(SecretString::from(token.into()))
    }

    /// The raw token, for `Authorization` headers.
    #[must_use]
    pub fn expose(&self) -> &str {
        self.0.expose_secret()
    }
}

impl std::fmt::Debug for IdToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("IdToken([REDACTED])")
    }
}

/// Result of a successful sign-in.
#[derive(Debug, Clone)]
pub struct SignedIn {
    pub uid: AdminUid,
    pub email: String,
    pub id_token: IdToken,
    /// Token lifetime as reported by the identity service.
    pub expires_in: Duration,
}

/// Email/password identity service.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Check credentials and return a fresh ID token.
    async fn sign_in(&self, email: &Email, password: &SecretString) -> Result<SignedIn, AuthError>;
}
