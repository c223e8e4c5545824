//! Authentication extractors.
//!
//! The session holds a [`StoredToken`]; these extractors decode it on each
//! request. A token that no longer decodes, has expired, or (for locally
//! fabricated tokens) fails its signature check counts as logged out.

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

/// Extractor that requires a logged-in user.
///
/// If nobody is logged in, HTML requests are redirected to the login page.
pub struct RequireAuth(pub AuthUser);

/// Error returned when authentication is required but missing.
pub enum AuthRejection {
    /// Redirect to login page (for HTML requests).
    RedirectToLogin,
    /// Unauthorized response (no session layer, or HTMX requests).
    Unauthorized,
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        match self {
            Self::RedirectToLogin => Redirect::to("/auth/login").into_response(),
            Self::Unauthorized => StatusCode::UNAUTHORIZED.into_response(),
        }
    }
}

async fn current_user(parts: &Parts, state: &AppState) -> Option<AuthUser> {
    let session = parts.extensions.get::<Session>()?;
    let stored: StoredToken = session
        .get(session_keys::AUTH_TOKEN)
        .await
        .ok()
        .flatten()?;
    state.auth().authenticate(&stored, Utc::now())
}

impl FromRequestParts<AppState> for RequireAuth {
    type Rejection = AuthRejection;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        if parts.extensions.get::<Session>().is_none() {
            return Err(AuthRejection::Unauthorized);
        }

        current_user(parts, state).await.map(Self).ok_or_else(|| {
            if parts.headers.contains_key("hx-request") {
                AuthRejection::Unauthorized
            } else {
                AuthRejection::RedirectToLogin
            }
        })
    }
}

/// Extractor that optionally gets the logged-in user.
///
/// Unlike `RequireAuth`, this does not reject the request. [`Layout`] uses it
/// to show who is signed in on every page.
///
/// [`Layout`]: crate::middleware::Layout
pub struct OptionalAuth(pub Option<AuthUser>);

impl FromRequestParts<AppState> for OptionalAuth {
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        Ok(Self(current_user(parts, state).await))
    }
}

/// Store the auth token in the session.
///
/// The session ID is cycled first so a pre-login session ID cannot be reused.
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

/// Remove the auth token from the session (logout). The cart is kept.
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
