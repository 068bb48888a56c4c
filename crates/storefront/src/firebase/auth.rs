//! Firebase Authentication (Identity Toolkit) client.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Response;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tracing::instrument;
use zym_power_core::{AdminUid, Email};

use super::{ApiErrorBody, api_message};
use crate::config::FirebaseConfig;
use crate::services::auth::{AuthError, IdToken, IdentityProvider, SignedIn};

/// Token lifetime assumed when the response omits `expiresIn`.
const DEFAULT_TOKEN_LIFETIME: Duration = Duration::from_secs(3600);

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SignInRequest<'a> {
    email: &'a str,
    password: &'a str,
    return_secure_token: bool,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SignInResponse {
    local_id: String,
    #[serde(default)]
    email: String,
    id_token: String,
    expires_in: Option<String>,
}

/// Email/password sign-in against Firebase Authentication.
#[derive(Clone)]
pub struct FirebaseAuthClient {
    client: reqwest::Client,
    sign_in_url: String,
    api_key: SecretString,
}

impl FirebaseAuthClient {
    #[must_use]
    pub fn new(client: reqwest::Client, config: &FirebaseConfig) -> Self {
        Self {
            client,
            sign_in_url: format!(
                "{}/accounts:signInWithPassword",
                config.auth_url.trim_end_matches('/')
            ),
            api_key: config.api_key.clone(),
        }
    }

    async fn error_from(response: Response) -> AuthError {
        let status = response.status().as_u16();
        let body: ApiErrorBody = response.json().await.unwrap_or_default();
        classify(status, api_message(&body))
    }
}

/// Map Identity Toolkit error codes. Messages look like
/// `TOO_MANY_ATTEMPTS_TRY_LATER : Access to this account has been temporarily disabled`.
fn classify(status: u16, message: String) -> AuthError {
    let code = message.split(" : ").next().unwrap_or_default().trim();
    match code {
        "INVALID_LOGIN_CREDENTIALS" | "EMAIL_NOT_FOUND" | "INVALID_PASSWORD" | "INVALID_EMAIL"
        | "MISSING_PASSWORD" => AuthError::InvalidCredentials,
        "USER_DISABLED" => AuthError::UserDisabled,
        "TOO_MANY_ATTEMPTS_TRY_LATER" => AuthError::TooManyAttempts,
        _ => AuthError::Api { status, message },
    }
}

#[async_trait]
impl IdentityProvider for FirebaseAuthClient {
    #[instrument(skip(self, password), fields(email = %email))]
    async fn sign_in(&self, email: &Email, password: &SecretString) -> Result<SignedIn, AuthError> {
        let response = self
            .client
            .post(&self.sign_in_url)
            .query(&[("key", self.api_key.expose_secret())])
            .json(&SignInRequest {
                email: email.as_str(),
                password: password.expose_secret(),
                return_secure_token: true,
            })
            .send()
            .await?;

        if !response.status().is_success() {
            let error = Self::error_from(response).await;
            tracing::warn!(error = %error, "Sign-in failed");
            return Err(error);
        }

        let body: SignInResponse = response
            .json()
            .await
            .map_err(|e| AuthError::Parse(e.to_string()))?;

        let expires_in = body
            .expires_in
            .as_deref()
            .and_then(|secs| secs.parse::<u64>().ok())
            .map_or(DEFAULT_TOKEN_LIFETIME, Duration::from_secs);

        Ok(SignedIn {
            uid: AdminUid::new(body.local_id),
            email: if body.email.is_empty() {
                email.as_str().to_string()
            } else {
                body.email
            },
            id_token: IdToken::new(body.id_token),
            expires_in,
        })
    }
}
