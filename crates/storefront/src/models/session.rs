//! Session-related types.
//!
//! Types stored in the session for the cart and the admin sign-in.

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use zym_power_core::AdminUid;

use crate::services::auth::{IdToken, SignedIn};

/// Tokens are treated as expired this long before the identity service says.
const EXPIRY_MARGIN_SECS: i64 = 60;

/// Session-stored administrator identity.
///
/// Implements `Debug` manually to redact the token.
#[derive(Clone, Serialize, Deserialize)]
pub struct AdminSession {
    pub uid: AdminUid,
    pub email: String,
    id_token: String,
    pub expires_at: DateTime<Utc>,
}

impl AdminSession {
    /// Build the session record for a successful sign-in at `now`.
    #[must_use]
    pub fn from_sign_in(signed_in: &SignedIn, now: DateTime<Utc>) -> Self {
        let lifetime = TimeDelta::from_std(signed_in.expires_in).unwrap_or(TimeDelta::hours(1));
        Self {
            uid: signed_in.uid.clone(),
            email: signed_in.email.clone(),
            id_token: signed_in.id_token.expose().to_string(),
            expires_at: now + lifetime,
        }
    }

    /// Whether the token can no longer be used for writes.
    #[must_use]
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now + TimeDelta::seconds(EXPIRY_MARGIN_SECS) >= self.expires_at
    }

    /// Token to present to the product store.
    #[must_use]
    pub fn id_token(&self) -> IdToken {
        IdToken::new(self.id_token.clone())
    }
}

impl std::fmt::Debug for AdminSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminSession")
            .field("uid", &self.uid)
            .field("email", &self.email)
            .field("id_token", &"[REDACTED]")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

/// Session keys.
pub mod keys {
    /// Key for the visitor's cart.
    pub const CART: &str = "cart";

    /// Key for the signed-in administrator.
    pub const ADMIN: &str = "admin";
}
