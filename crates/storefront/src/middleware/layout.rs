//! Per-page layout data.
//!
//! Every full page renders the same header: who is logged in and any flash
//! notice left by the previous request. The [`Layout`] extractor gathers
//! both so handlers only pass it through to their template.

use axum::{extract::FromRequestParts, http::request::Parts};
use tower_sessions::Session;

use crate::middleware::auth::OptionalAuth;
use crate::models::{Flash, session_keys};
use crate::state::AppState;

/// Header data shared by all full-page templates.
#[derive(Debug, Clone, Default)]
pub struct Layout {
    /// Display name of the logged-in user.
    pub user_name: Option<String>,
    /// Notice to show once, taken out of the session.
    pub flash: Option<Flash>,
    /// Delay for search-as-you-type inputs.
    pub search_debounce_ms: u64,
}

impl FromRequestParts<AppState> for Layout {
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let OptionalAuth(user) = OptionalAuth::from_request_parts(parts, state).await?;
        let user_name = user.map(|user| user.display_name().to_string());

        let flash = match parts.extensions.get::<Session>() {
            Some(session) => session
                .remove::<Flash>(session_keys::FLASH)
                .await
                .ok()
                .flatten(),
            None => None,
        };

        Ok(Self {
            user_name,
            flash,
            search_debounce_ms: state.config().search_debounce_ms,
        })
    }
}

/// Leave a notice for the next page view.
pub async fn set_flash(session: &Session, flash: Flash) {
    if let Err(e) = session.insert(session_keys::FLASH, flash).await {
        tracing::warn!(error = %e, "failed to store flash message");
    }
}
