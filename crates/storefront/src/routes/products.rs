//! Product route handlers.

use std::str::FromStr;

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use tracing::instrument;

use shopfront_core::search::normalize_query;
use shopfront_core::{Page, PageRequest, Product, ProductId};

use crate::filters;
use crate::middleware::Layout;
use crate::state::AppState;

/// Product display data for templates.
#[derive(Clone)]
pub struct ProductView {
    pub id: i64,
    pub name: String,
    pub price: Option<String>,
    pub image: Option<String>,
    pub description: String,
}

impl From<&Product> for ProductView {
    fn from(product: &Product) -> Self {
        Self {
            id: product.id.as_i64(),
            name: product.name.clone(),
            price: product.price.map(|p| p.to_string()),
            image: product.image.clone(),
            description: product.description.clone().unwrap_or_default(),
        }
    }
}

/// A numbered pager link.
#[derive(Clone)]
pub struct PageLink {
    pub number: u32,
    pub href: String,
    pub current: bool,
    /// Pages were skipped between the previous link and this one
    pub gap_before: bool,
}

/// Pager state for templates.
#[derive(Clone)]
pub struct Pager {
    pub links: Vec<PageLink>,
    pub prev_href: Option<String>,
    pub next_href: Option<String>,
}

impl Pager {
    /// Build pager links; `href` maps a page number to its URL.
    pub fn new<T>(page: &Page<T>, href: impl Fn(u32) -> String) -> Self {
        let current = page.clamp(page.page);
        let mut previous = 0;
        Self {
            links: page
                .page_numbers()
                .into_iter()
                .map(|number| {
                    let gap_before = previous != 0 && number > previous + 1;
                    previous = number;
                    PageLink {
                        number,
                        href: href(number),
                        current: number == current,
                        gap_before,
                    }
                })
                .collect(),
            prev_href: page.has_prev().then(|| href(page.clamp(current - 1))),
            next_href: page.has_next().then(|| href(page.clamp(current + 1))),
        }
    }

    /// Whether there is more than one page to link to.
    #[must_use]
    pub fn is_multi_page(&self) -> bool {
        self.links.len() > 1
    }
}

/// Catalog URL for a page and query.
fn catalog_href(page: u32, q: Option<&str>) -> String {
    match q {
        Some(q) => format!("/products?page={page}&q={}", urlencoding::encode(q)),
        None => format!("/products?page={page}"),
    }
}

/// Listing query parameters.
///
/// `page` stays a string so garbage like `?page=abc` falls back to page 1
/// instead of failing extraction.
#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub page: Option<String>,
    pub q: Option<String>,
}

/// Product listing page template.
#[derive(Template, WebTemplate)]
#[template(path = "products/index.html")]
pub struct ProductsIndexTemplate {
    pub layout: Layout,
    pub products: Vec<ProductView>,
    pub q: String,
    pub total: u64,
    pub pager: Pager,
    pub offline: bool,
}

/// Product detail page template.
#[derive(Template, WebTemplate)]
#[template(path = "products/show.html")]
pub struct ProductShowTemplate {
    pub layout: Layout,
    pub product: ProductView,
    pub offline: bool,
}

/// Not-found page template.
#[derive(Template, WebTemplate)]
#[template(path = "not_found.html")]
pub struct NotFoundTemplate {
    pub layout: Layout,
    pub message: String,
}

/// Display product listing page.
#[instrument(skip(state, layout))]
pub async fn index(
    State(state): State<AppState>,
    layout: Layout,
    Query(query): Query<ListQuery>,
) -> impl IntoResponse {
    let q = normalize_query(query.q.as_deref());
    let request = PageRequest::from_query(query.page.as_deref(), state.config().page_size);
    let listing = state.catalog().products(q.as_deref(), request).await;

    let pager = Pager::new(&listing.page, |n| catalog_href(n, q.as_deref()));

    ProductsIndexTemplate {
        layout,
        products: listing.page.items.iter().map(ProductView::from).collect(),
        q: q.unwrap_or_default(),
        total: listing.page.total,
        pager,
        offline: listing.source.is_sample(),
    }
}

/// Display product detail page.
#[instrument(skip(state, layout))]
pub async fn show(
    State(state): State<AppState>,
    layout: Layout,
    Path(id): Path<String>,
) -> Response {
    let found = match ProductId::from_str(&id) {
        Ok(id) => state.catalog().product(id).await,
        Err(_) => None,
    };

    match found {
        Some((product, source)) => ProductShowTemplate {
            layout,
            product: ProductView::from(&product),
            offline: source.is_sample(),
        }
        .into_response(),
        None => (
            StatusCode::NOT_FOUND,
            NotFoundTemplate {
                layout,
                message: "Product not found".to_string(),
            },
        )
            .into_response(),
    }
}
