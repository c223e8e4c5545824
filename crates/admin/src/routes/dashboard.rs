//! Dashboard handler.

use askama::Template;
use askama_web::WebTemplate;
use axum::{extract::State, response::IntoResponse};
use tracing::instrument;

use crate::filters;
use crate::middleware::{Layout, RequireAdminAuth};
use crate::routes::products::ProductRow;
use crate::routes::users::UserRow;
use crate::state::AppState;

/// Dashboard page template.
#[derive(Template, WebTemplate)]
#[template(path = "dashboard.html")]
pub struct DashboardTemplate {
    pub layout: Layout,
    pub product_count: u64,
    pub user_count: u64,
    pub products: Vec<ProductRow>,
    pub users: Vec<UserRow>,
}

/// Counts plus the newest products and users.
#[instrument(skip(state, layout))]
pub async fn index(
    RequireAdminAuth(_admin): RequireAdminAuth,
    State(state): State<AppState>,
    layout: Layout,
) -> impl IntoResponse {
    let dashboard = state.store().dashboard().await;

    DashboardTemplate {
        layout,
        product_count: dashboard.product_count,
        user_count: dashboard.user_count,
        products: dashboard.products.iter().map(ProductRow::from).collect(),
        users: dashboard.users.iter().map(UserRow::from).collect(),
    }
}
