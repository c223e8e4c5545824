//! Home page route handler.

use axum::response::Redirect;

/// The catalog is the landing page.
pub async fn home() -> Redirect {
    Redirect::to("/products")
}
