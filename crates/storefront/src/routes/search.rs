//! Search-as-you-type suggestions.
//!
//! The catalog search box fires `GET /search/suggest?q=` through HTMX after
//! the configured debounce delay; the response replaces the suggestion list.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Query, State},
    response::IntoResponse,
};
use serde::Deserialize;
use tracing::instrument;

use crate::routes::products::ProductView;
use crate::state::AppState;

/// Most suggestions shown under the search box.
const MAX_SUGGESTIONS: u32 = 5;

/// Suggestion query parameters.
#[derive(Debug, Deserialize)]
pub struct SuggestQuery {
    pub q: Option<String>,
}

/// Suggestion list fragment.
#[derive(Template, WebTemplate)]
#[template(path = "partials/suggestions.html")]
pub struct SuggestionsTemplate {
    pub q: String,
    pub products: Vec<ProductView>,
}

/// Render suggestions for a partial query (HTMX).
#[instrument(skip(state))]
pub async fn suggest(
    State(state): State<AppState>,
    Query(query): Query<SuggestQuery>,
) -> impl IntoResponse {
    let q = query.q.unwrap_or_default().trim().to_string();
    let products = state
        .catalog()
        .suggest(&q, MAX_SUGGESTIONS)
        .await
        .iter()
        .map(ProductView::from)
        .collect();

    SuggestionsTemplate { q, products }
}
