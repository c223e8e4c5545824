//! Admin page chrome: who is logged in, which section is active, and the
//! pending flash notice.

use axum::{extract::FromRequestParts, http::request::Parts};
use tower_sessions::Session;

use crate::middleware::auth::current_admin;
use crate::models::{Flash, session_keys};
use crate::state::AppState;

/// Data every full admin page renders around its content.
#[derive(Debug, Clone, Default)]
pub struct Layout {
    /// Name, email or "Admin"; `None` on the login page.
    pub admin_name: Option<String>,
    /// Request path, for highlighting the sidebar entry.
    pub current_path: String,
    pub flash: Option<Flash>,
    /// "View site" link target.
    pub storefront_url: String,
    pub search_debounce_ms: u64,
}

impl Layout {
    /// Whether the sidebar entry for `section` is active.
    #[must_use]
    pub fn is_active(&self, section: &str) -> bool {
        if section == "/" {
            self.current_path == "/"
        } else {
            self.current_path.starts_with(section)
        }
    }
}

impl FromRequestParts<AppState> for Layout {
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let admin_name = current_admin(parts, state)
            .await
            .map(|admin| admin.display_name().to_string());

        let flash = match parts.extensions.get::<Session>() {
            Some(session) => session
                .remove::<Flash>(session_keys::FLASH)
                .await
                .ok()
                .flatten(),
            None => None,
        };

        Ok(Self {
            admin_name,
            current_path: parts.uri.path().to_string(),
            flash,
            storefront_url: state.config().storefront_link().to_string(),
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
