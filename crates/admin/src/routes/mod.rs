//! HTTP route handlers for admin.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                 - Health check
//!
//! # Dashboard
//! GET  /                       - Counts, newest products, first users
//!
//! # Auth
//! GET  /auth/login             - Login page
//! POST /auth/login             - Login action
//! GET  /auth/handoff           - Sign in with a storefront handoff token
//! POST /auth/logout            - Logout
//!
//! # Products (?page, ?per_page, ?q, ?min_price, ?max_price)
//! GET  /products               - Product table with filters
//! GET  /products/table         - Table fragment (HTMX)
//! GET  /products/new           - Create form
//! POST /products               - Create
//! GET  /products/{id}/edit     - Edit form
//! POST /products/{id}          - Update
//! POST /products/{id}/delete   - Delete
//!
//! # Users (?page, ?q; 10 per page)
//! GET  /users                  - User table (fragment for HTMX)
//! GET  /users/new              - Create form
//! POST /users                  - Create
//! GET  /users/{id}/edit        - Edit form
//! POST /users/{id}             - Update
//! POST /users/{id}/delete      - Delete
//! ```

pub mod auth;
pub mod dashboard;
pub mod products;
pub mod users;

use axum::{
    Router,
    http::HeaderMap,
    routing::{get, post},
};

use crate::api::ApiError;
use crate::models::Flash;
use crate::state::AppState;

/// Flash shown when a write could not reach the API.
pub const UNREACHABLE_MESSAGE: &str = "API unreachable, changes not saved";

/// Whether the request was issued by HTMX (expects a fragment).
pub(crate) fn is_htmx(headers: &HeaderMap) -> bool {
    headers.contains_key("hx-request")
}

/// Flash for a failed write to `entity`.
pub(crate) fn write_failure(entity: &str, error: &ApiError) -> Flash {
    if error.is_unreachable() {
        Flash::error(UNREACHABLE_MESSAGE)
    } else if error.is_not_found() {
        Flash::error(format!("{entity} not found"))
    } else {
        Flash::error(format!("Could not save {}: {error}", entity.to_lowercase()))
    }
}

/// Append `&key=value` for each non-empty value.
pub(crate) fn encode_filters(pairs: &[(&str, &str)]) -> String {
    pairs
        .iter()
        .filter(|(_, value)| !value.is_empty())
        .map(|(key, value)| format!("&{key}={}", urlencoding::encode(value)))
        .collect()
}

fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/login", get(auth::login_page).post(auth::login))
        .route("/handoff", get(auth::handoff))
        .route("/logout", post(auth::logout))
}

fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(products::index).post(products::create))
        .route("/table", get(products::table))
        .route("/new", get(products::new_form))
        .route("/{id}", post(products::update))
        .route("/{id}/edit", get(products::edit_form))
        .route("/{id}/delete", post(products::delete))
}

fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(users::index).post(users::create))
        .route("/new", get(users::new_form))
        .route("/{id}", post(users::update))
        .route("/{id}/edit", get(users::edit_form))
        .route("/{id}/delete", post(users::delete))
}

/// Create all routes for the admin panel.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(dashboard::index))
        .nest("/auth", auth_routes())
        .nest("/products", product_routes())
        .nest("/users", user_routes())
}
