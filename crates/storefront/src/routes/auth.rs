//! Admin sign-in route handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use chrono::Utc;
use secrecy::SecretString;
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;
use zym_power_core::Email;

use crate::error::{AppError, Result, clear_sentry_user, set_sentry_user};
use crate::filters;
use crate::middleware::{OptionalAdmin, clear_admin, set_admin};
use crate::models::AdminSession;
use crate::state::AppState;

/// Where a signed-in administrator lands.
pub const ADMIN_HOME: &str = "/admin/products";

/// Generic sign-in failure message.
pub const INVALID_CREDENTIALS_MESSAGE: &str = "Email ou mot de passe invalide.";

/// Login form data.
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// Login page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/login.html")]
pub struct LoginTemplate {
    pub email: String,
    pub error: Option<String>,
}

/// Display login page, or skip it when already signed in.
#[instrument(skip(admin))]
pub async fn login_page(OptionalAdmin(admin): OptionalAdmin) -> Response {
    if admin.is_some() {
        return Redirect::to(ADMIN_HOME).into_response();
    }

    LoginTemplate {
        email: String::new(),
        error: None,
    }
    .into_response()
}

/// Sign in with email and password.
#[instrument(skip(state, session, form), fields(email = %form.email))]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<LoginForm>,
) -> Result<Response> {
    let rejected = |email: String| {
        (
            StatusCode::UNAUTHORIZED,
            LoginTemplate {
                email,
                error: Some(INVALID_CREDENTIALS_MESSAGE.to_string()),
            },
        )
            .into_response()
    };

    let Ok(email) = Email::parse(&form.email) else {
        return Ok(rejected(form.email));
    };
    if form.password.is_empty() {
        return Ok(rejected(form.email));
    }

    let password = SecretString::from(form.password);
    let signed_in = match state.identity().sign_in(&email, &password).await {
        Ok(signed_in) => signed_in,
        Err(e) if e.is_rejection() => {
            tracing::info!(error = %e, "Sign-in rejected");
            return Ok(rejected(form.email));
        }
        Err(e) => {
            // Outages show the same message
            let event_id = sentry::capture_error(&e);
            tracing::error!(error = %e, sentry_event_id = %event_id, "Identity service failed");
            let mut response = rejected(form.email);
            *response.status_mut() = StatusCode::BAD_GATEWAY;
            return Ok(response);
        }
    };

    let admin = AdminSession::from_sign_in(&signed_in, Utc::now());
    set_admin(&session, &admin)
        .await
        .map_err(|e| AppError::Internal(format!("failed to store sign-in: {e}")))?;

    set_sentry_user(&admin.uid, Some(&admin.email));
    tracing::info!(uid = %admin.uid, "Admin signed in");

    Ok(Redirect::to(ADMIN_HOME).into_response())
}

/// Sign out.
#[instrument(skip(session))]
pub async fn logout(session: Session) -> Result<Redirect> {
    clear_admin(&session)
        .await
        .map_err(|e| AppError::Internal(format!("failed to clear sign-in: {e}")))?;
    clear_sentry_user();

    Ok(Redirect::to("/login"))
}
