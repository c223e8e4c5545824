//! Account route handlers.
//!
//! These routes require authentication.

use askama::Template;
use askama_web::WebTemplate;
use axum::response::IntoResponse;

use crate::filters;
use crate::middleware::{Layout, RequireAuth};

/// Account overview page template.
#[derive(Template, WebTemplate)]
#[template(path = "account/index.html")]
pub struct AccountIndexTemplate {
    pub layout: Layout,
    pub display_name: String,
    pub email: Option<String>,
    pub user_id: Option<String>,
}

/// Display what the session token says about the user.
pub async fn index(RequireAuth(user): RequireAuth, layout: Layout) -> impl IntoResponse {
    AccountIndexTemplate {
        layout,
        display_name: user.display_name().to_string(),
        email: user.email,
        user_id: user.id,
    }
}
