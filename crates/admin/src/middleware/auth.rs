//! Authentication guard for admin.
//!
//! Provides extractors for requiring admin authentication in route handlers.
//! A session counts as logged in while its token decodes, has not expired
//! and, when fabricated here, carries a valid signature.

use axum::{
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Redirect, Response},
};
use chrono::Utc;
use tower_sessions::Session;

use shopfront_core::AuthUser;

use crate::models::{StoredToken, session_keys};
use crate::state::AppState;

/// Extractor that requires admin authentication.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(
///     RequireAdminAuth(admin): RequireAdminAuth,
/// ) -> impl IntoResponse {
///     format!("Hello, {}!", admin.display_name())
/// }
/// ```
pub struct RequireAdminAuth(pub AuthUser);

/// Error returned when admin authentication is required but missing.
pub enum AdminAuthRejection {
    /// Redirect to login page (for HTML requests).
    RedirectToLogin,
    /// Unauthorized response (for HTMX fragment requests).
    Unauthorized,
}

impl IntoResponse for AdminAuthRejection {
    fn into_response(self) -> Response {
        match self {
            Self::RedirectToLogin => Redirect::to("/auth/login").into_response(),
            Self::Unauthorized => StatusCode::UNAUTHORIZED.into_response(),
        }
    }
}

/// Decode the session's token into the admin it belongs to.
pub(crate) async fn current_admin(parts: &Parts, state: &AppState) -> Option<AuthUser> {
    let session = parts.extensions.get::<Session>()?;
    let stored: StoredToken = session
        .get(session_keys::AUTH_TOKEN)
        .await
        .ok()
        .flatten()?;
    state.auth().authenticate(&stored, Utc::now())
}

impl FromRequestParts<AppState> for RequireAdminAuth {
    type Rejection = AdminAuthRejection;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        if parts.extensions.get::<Session>().is_none() {
            return Err(AdminAuthRejection::Unauthorized);
        }

        current_admin(parts, state).await.map(Self).ok_or_else(|| {
            if parts.headers.contains_key("hx-request") {
                AdminAuthRejection::Unauthorized
            } else {
                AdminAuthRejection::RedirectToLogin
            }
        })
    }
}

/// Store the admin's token, cycling the session ID first.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn set_auth_token(
    session: &Session,
    token: &StoredToken,
) -> Result<(), tower_sessions::session::Error> {
    session.cycle_id().await?;
    session.insert(session_keys::AUTH_TOKEN, token).await
}

/// Helper to clear the token from the session (logout).
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn clear_auth_token(session: &Session) -> Result<(), tower_sessions::session::Error> {
    session
        .remove::<StoredToken>(session_keys::AUTH_TOKEN)
        .await?;
    Ok(())
}
