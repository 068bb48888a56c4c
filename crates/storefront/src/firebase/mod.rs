//! Firebase REST clients.
//!
//! - [`FirestoreClient`] - product documents, implements [`crate::store::ProductStore`]
//! - [`FirebaseAuthClient`] - email/password sign-in, implements
//!   [`crate::services::auth::IdentityProvider`]
//!
//! Both speak plain JSON over `reqwest`; no Firebase SDK is involved.

mod auth;
mod firestore;
pub mod value;

pub use auth::FirebaseAuthClient;
pub use firestore::FirestoreClient;

use serde::Deserialize;

/// Google API error envelope: `{"error": {"code", "message", "status"}}`.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct ApiErrorBody {
    #[serde(default)]
    error: ApiErrorDetail,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct ApiErrorDetail {
    #[serde(default)]
    message: String,
    #[serde(default)]
    status: String,
}

/// Best human-readable message from an error body.
pub(crate) fn api_message(body: &ApiErrorBody) -> String {
    match (body.error.message.is_empty(), body.error.status.is_empty()) {
        (false, _) => body.error.message.clone(),
        (true, false) => body.error.status.clone(),
        (true, true) => "unknown error".to_string(),
    }
}
