//! Product management handlers.

use std::str::FromStr;

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use shopfront_core::pagination::admin_per_page;
use shopfront_core::validation::ProductDraft;
use shopfront_core::{FieldErrors, PageRequest, Product, ProductFilter, ProductId};

use crate::components::{DataTableConfig, Pager, products_table_config};
use crate::error::{AppError, Result};
use crate::filters;
use crate::middleware::{Layout, RequireAdminAuth, set_flash};
use crate::models::Flash;
use crate::routes::{encode_filters, write_failure};
use crate::state::AppState;

/// Product row for templates.
#[derive(Debug, Clone)]
pub struct ProductRow {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub price: Option<String>,
    pub image: Option<String>,
}

impl From<&Product> for ProductRow {
    fn from(product: &Product) -> Self {
        Self {
            id: product.id.as_i64(),
            name: product.name.clone(),
            description: product.description.clone().unwrap_or_default(),
            price: product.price.map(|p| p.to_string()),
            image: product.image.clone(),
        }
    }
}

/// Products list query parameters. Kept as strings so junk falls back to
/// defaults instead of failing extraction.
#[derive(Debug, Default, Deserialize)]
pub struct ProductsQuery {
    pub page: Option<String>,
    pub per_page: Option<String>,
    pub q: Option<String>,
    pub min_price: Option<String>,
    pub max_price: Option<String>,
}

/// Everything the products table renders.
#[derive(Debug, Clone)]
pub struct ProductsTable {
    pub config: DataTableConfig,
    pub rows: Vec<ProductRow>,
    pub pager: Pager,
    /// Full-page URL of this view, pushed to history on HTMX swaps
    pub page_url: String,
    pub total: u64,
    pub per_page: u32,
    pub q: String,
    pub min_price: String,
    pub max_price: String,
    pub offline: bool,
}

impl ProductsTable {
    async fn load(state: &AppState, query: &ProductsQuery) -> Self {
        let raw = |v: &Option<String>| v.as_deref().map(str::trim).unwrap_or_default().to_string();
        let (q, min_price, max_price) = (raw(&query.q), raw(&query.min_price), raw(&query.max_price));

        let per_page = admin_per_page(query.per_page.as_deref());
        let request = PageRequest::from_query(query.page.as_deref(), per_page);
        let filter = ProductFilter::from_raw(
            Some(q.as_str()),
            Some(min_price.as_str()),
            Some(max_price.as_str()),
        );
        let listing = state.store().products(&filter, request).await;

        let per_page_text = per_page.to_string();
        let filters = encode_filters(&[
            ("per_page", per_page_text.as_str()),
            ("q", q.as_str()),
            ("min_price", min_price.as_str()),
            ("max_price", max_price.as_str()),
        ]);

        Self {
            config: products_table_config(),
            rows: listing.page.items.iter().map(ProductRow::from).collect(),
            pager: Pager::new(&listing.page, "/products", "/products/table", &filters),
            page_url: format!("/products?page={}{filters}", listing.page.clamp(listing.page.page)),
            total: listing.page.total,
            per_page,
            q,
            min_price,
            max_price,
            offline: listing.source.is_sample(),
        }
    }

    /// Whether `option` is the selected page size.
    #[must_use]
    pub fn is_per_page(&self, option: &u32) -> bool {
        *option == self.per_page
    }
}

/// Products list page template.
#[derive(Template, WebTemplate)]
#[template(path = "products/index.html")]
pub struct ProductsIndexTemplate {
    pub layout: Layout,
    pub table: ProductsTable,
}

/// Products table fragment template (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/products_table.html")]
pub struct ProductsTableTemplate {
    pub table: ProductsTable,
}

/// Create/edit form template.
#[derive(Template, WebTemplate)]
#[template(path = "products/form.html")]
pub struct ProductFormTemplate {
    pub layout: Layout,
    pub heading: String,
    pub action: String,
    pub draft: ProductDraft,
    pub errors: FieldErrors,
    pub offline: bool,
}

/// Products list page handler.
#[instrument(skip(state, layout))]
pub async fn index(
    RequireAdminAuth(_admin): RequireAdminAuth,
    State(state): State<AppState>,
    layout: Layout,
    Query(query): Query<ProductsQuery>,
) -> impl IntoResponse {
    ProductsIndexTemplate {
        layout,
        table: ProductsTable::load(&state, &query).await,
    }
}

/// Table fragment for debounced search, filters and paging.
#[instrument(skip(state))]
pub async fn table(
    RequireAdminAuth(_admin): RequireAdminAuth,
    State(state): State<AppState>,
    Query(query): Query<ProductsQuery>,
) -> impl IntoResponse {
    let table = ProductsTable::load(&state, &query).await;
    (
        [("HX-Push-Url", table.page_url.clone())],
        ProductsTableTemplate { table },
    )
}

/// Empty create form.
pub async fn new_form(RequireAdminAuth(_admin): RequireAdminAuth, layout: Layout) -> impl IntoResponse {
    ProductFormTemplate {
        layout,
        heading: "New product".to_string(),
        action: "/products".to_string(),
        draft: ProductDraft::default(),
        errors: FieldErrors::new(),
        offline: false,
    }
}

/// Create a product.
#[instrument(skip(state, session, layout, draft), fields(name = %draft.name))]
pub async fn create(
    RequireAdminAuth(_admin): RequireAdminAuth,
    State(state): State<AppState>,
    session: Session,
    layout: Layout,
    Form(draft): Form<ProductDraft>,
) -> Response {
    let payload = match draft.validate() {
        Ok(payload) => payload,
        Err(errors) => {
            return invalid(ProductFormTemplate {
                layout,
                heading: "New product".to_string(),
                action: "/products".to_string(),
                draft,
                errors,
                offline: false,
            });
        }
    };

    let flash = match state.store().create_product(&payload).await {
        Ok(product) => Flash::success(format!("Created {}", product.name)),
        Err(e) => {
            tracing::warn!(error = %e, "product create failed");
            write_failure("Product", &e)
        }
    };
    set_flash(&session, flash).await;
    Redirect::to("/products").into_response()
}

/// Edit form, prefilled from the API (or the sample catalog when it is down).
#[instrument(skip(state, layout))]
pub async fn edit_form(
    RequireAdminAuth(_admin): RequireAdminAuth,
    State(state): State<AppState>,
    layout: Layout,
    Path(id): Path<String>,
) -> Result<impl IntoResponse> {
    let id = parse_id(&id)?;
    let (product, source) = state
        .store()
        .product(id)
        .await
        .ok_or_else(|| AppError::NotFound(format!("product {id}")))?;

    Ok(ProductFormTemplate {
        layout,
        heading: format!("Edit {}", product.name),
        action: format!("/products/{id}"),
        draft: ProductDraft::from_product(&product),
        errors: FieldErrors::new(),
        offline: source.is_sample(),
    })
}

/// Replace a product.
#[instrument(skip(state, session, layout, draft), fields(name = %draft.name))]
pub async fn update(
    RequireAdminAuth(_admin): RequireAdminAuth,
    State(state): State<AppState>,
    session: Session,
    layout: Layout,
    Path(id): Path<String>,
    Form(draft): Form<ProductDraft>,
) -> Result<Response> {
    let id = parse_id(&id)?;
    let payload = match draft.validate() {
        Ok(payload) => payload,
        Err(errors) => {
            return Ok(invalid(ProductFormTemplate {
                layout,
                heading: "Edit product".to_string(),
                action: format!("/products/{id}"),
                draft,
                errors,
                offline: false,
            }));
        }
    };

    let flash = match state.store().update_product(id, &payload).await {
        Ok(product) => Flash::success(format!("Updated {}", product.name)),
        Err(e) => {
            tracing::warn!(error = %e, "product update failed");
            write_failure("Product", &e)
        }
    };
    set_flash(&session, flash).await;
    Ok(Redirect::to("/products").into_response())
}

/// Delete a product.
#[instrument(skip(state, session))]
pub async fn delete(
    RequireAdminAuth(_admin): RequireAdminAuth,
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<String>,
) -> Result<Redirect> {
    let id = parse_id(&id)?;
    let flash = match state.store().delete_product(id).await {
        Ok(()) => Flash::success("Product deleted"),
        Err(e) => {
            tracing::warn!(error = %e, "product delete failed");
            write_failure("Product", &e)
        }
    };
    set_flash(&session, flash).await;
    Ok(Redirect::to("/products"))
}

fn parse_id(raw: &str) -> Result<ProductId> {
    ProductId::from_str(raw).map_err(|_| AppError::NotFound(format!("product {raw}")))
}

fn invalid(form: ProductFormTemplate) -> Response {
    (StatusCode::UNPROCESSABLE_ENTITY, form).into_response()
}
