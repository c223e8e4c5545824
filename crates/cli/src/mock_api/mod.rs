//! In-memory mock of the shop REST API.
//!
//! Implements the json-server subset the storefront and admin rely on:
//!
//! ```text
//! GET    /products?_page&_limit&q&price_gte&price_lte   (X-Total-Count)
//! POST   /products
//! GET    /products/{id}
//! PUT    /products/{id}
//! PATCH  /products/{id}
//! DELETE /products/{id}
//! ...same for /users (?q matches name or email)
//! POST   /login       {email, password} -> {accessToken, user}
//! POST   /register    {name, email, password} -> {accessToken, user}
//! ```
//!
//! Passwords are accepted as-is; login only checks that the email belongs
//! to a known user.

pub mod collection;

use std::future::Future;
use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::{HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tokio::net::TcpListener;
use tokio::sync::RwLock;
use tower_http::trace::TraceLayer;
use tracing::{debug, info};

use shopfront_core::search::{filter_products, filter_users};
use shopfront_core::{
    Email, Identity, Product, ProductFilter, ProductId, ProductPayload, SampleData, TokenSigner,
    User, UserId, UserPayload,
};

use self::collection::{Collection, IdsExhausted, ListParams, parse_id};

/// Header carrying the unpaged result count.
pub const TOTAL_COUNT_HEADER: &str = "x-total-count";

/// Errors returned by the mock API.
#[derive(Debug, thiserror::Error)]
pub enum MockApiError {
    #[error("{0} not found")]
    NotFound(&'static str),

    /// Rejected input, reported the way json-server-auth does.
    #[error("{0}")]
    BadRequest(String),

    #[error("invalid record: {0}")]
    InvalidRecord(#[from] serde_json::Error),

    #[error(transparent)]
    IdsExhausted(#[from] IdsExhausted),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl IntoResponse for MockApiError {
    fn into_response(self) -> Response {
        match self {
            Self::NotFound(_) => (StatusCode::NOT_FOUND, Json(json!({}))).into_response(),
            Self::BadRequest(message) => {
                (StatusCode::BAD_REQUEST, Json(json!({ "error": message }))).into_response()
            }
            Self::InvalidRecord(e) => {
                (StatusCode::BAD_REQUEST, Json(json!({ "error": e.to_string() }))).into_response()
            }
            Self::IdsExhausted(e) => {
                tracing::error!(error = %e, "mock API out of ids");
                (StatusCode::INSUFFICIENT_STORAGE, Json(json!({ "error": e.to_string() })))
                    .into_response()
            }
            Self::Io(e) => {
                tracing::error!(error = %e, "mock API I/O error");
                StatusCode::INTERNAL_SERVER_ERROR.into_response()
            }
        }
    }
}

type Result<T> = std::result::Result<T, MockApiError>;

/// All records held by the mock.
#[derive(Debug, Clone)]
pub struct MockDb {
    pub products: Collection<Product>,
    pub users: Collection<User>,
}

impl MockDb {
    /// Start from the bundled sample products and users.
    #[must_use]
    pub fn seeded() -> Self {
        let sample = SampleData::bundled();
        Self {
            products: Collection::new(sample.products().to_vec()),
            users: Collection::new(sample.users().to_vec()),
        }
    }

    #[must_use]
    pub const fn empty() -> Self {
        Self {
            products: Collection::new(Vec::new()),
            users: Collection::new(Vec::new()),
        }
    }
}

/// Shared mock API state.
#[derive(Clone)]
pub struct MockApi {
    inner: Arc<MockApiInner>,
}

struct MockApiInner {
    db: RwLock<MockDb>,
    signer: TokenSigner,
}

impl MockApi {
    #[must_use]
    pub fn new(db: MockDb, signer: TokenSigner) -> Self {
        Self {
            inner: Arc::new(MockApiInner {
                db: RwLock::new(db),
                signer,
            }),
        }
    }

    /// Number of products and users currently stored.
    pub async fn counts(&self) -> (usize, usize) {
        let db = self.inner.db.read().await;
        (db.products.all().len(), db.users.all().len())
    }

    /// Build the HTTP router.
    pub fn router(&self) -> Router {
        Router::new()
            .route("/products", get(list_products).post(create_product))
            .route(
                "/products/{id}",
                get(get_product)
                    .put(replace_product)
                    .patch(patch_product)
                    .delete(delete_product),
            )
            .route("/users", get(list_users).post(create_user))
            .route(
                "/users/{id}",
                get(get_user)
                    .put(replace_user)
                    .patch(patch_user)
                    .delete(delete_user),
            )
            .route("/login", post(login))
            .route("/register", post(register))
            .layer(TraceLayer::new_for_http())
            .with_state(self.clone())
    }

    fn session(&self, user: &User) -> AuthResponse {
        let identity = Identity {
            email: user.email.clone(),
            name: user.name.clone(),
        };
        AuthResponse {
            access_token: self
                .inner
                .signer
                .issue(user.id.as_i64(), &identity, Utc::now()),
            user: user.clone(),
        }
    }
}

/// Serve `api` on `listener` until `shutdown` resolves.
///
/// # Errors
///
/// Returns an error if the server fails while accepting connections.
pub async fn serve(
    listener: TcpListener,
    api: MockApi,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> Result<()> {
    if let Ok(addr) = listener.local_addr() {
        let (products, users) = api.counts().await;
        info!(%addr, products, users, "mock API listening");
    }
    axum::serve(listener, api.router())
        .with_graceful_shutdown(shutdown)
        .await?;
    Ok(())
}

/// A JSON array plus its unpaged count.
fn listing<T: Serialize>(items: Vec<T>, total: usize) -> Response {
    let mut headers = HeaderMap::new();
    headers.insert(TOTAL_COUNT_HEADER, HeaderValue::from(total));
    headers.insert(
        "access-control-expose-headers",
        HeaderValue::from_static("X-Total-Count"),
    );
    (headers, Json(items)).into_response()
}

// =============================================================================
// Products
// =============================================================================

async fn list_products(State(api): State<MockApi>, Query(params): Query<ListParams>) -> Response {
    let filter = ProductFilter::from_raw(
        params.q.as_deref(),
        params.price_gte.as_deref(),
        params.price_lte.as_deref(),
    );
    let matching = filter_products(api.inner.db.read().await.products.all(), &filter);
    let total = matching.len();
    debug!(total, "listing products");
    listing(params.apply(matching), total)
}

async fn get_product(State(api): State<MockApi>, Path(id): Path<String>) -> Result<Json<Product>> {
    let db = api.inner.db.read().await;
    parse_id(&id)
        .and_then(|id| db.products.get(id))
        .cloned()
        .map(Json)
        .ok_or(MockApiError::NotFound("product"))
}

async fn create_product(
    State(api): State<MockApi>,
    Json(body): Json<Value>,
) -> Result<(StatusCode, Json<Product>)> {
    let payload: ProductPayload = serde_json::from_value(body)?;
    let created = api
        .inner
        .db
        .write()
        .await
        .products
        .insert_with(|id| payload.with_id(ProductId::new(id)))?;
    info!(id = %created.id, "product created");
    Ok((StatusCode::CREATED, Json(created)))
}

async fn replace_product(
    State(api): State<MockApi>,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> Result<Json<Product>> {
    let id = parse_id(&id).ok_or(MockApiError::NotFound("product"))?;
    let payload: ProductPayload = serde_json::from_value(body)?;
    api.inner
        .db
        .write()
        .await
        .products
        .replace(payload.with_id(ProductId::new(id)))
        .map(Json)
        .ok_or(MockApiError::NotFound("product"))
}

async fn patch_product(
    State(api): State<MockApi>,
    Path(id): Path<String>,
    Json(changes): Json<Value>,
) -> Result<Json<Product>> {
    let id = parse_id(&id).ok_or(MockApiError::NotFound("product"))?;
    api.inner
        .db
        .write()
        .await
        .products
        .patch(id, &changes)?
        .map(Json)
        .ok_or(MockApiError::NotFound("product"))
}

async fn delete_product(State(api): State<MockApi>, Path(id): Path<String>) -> Result<Json<Value>> {
    let id = parse_id(&id).ok_or(MockApiError::NotFound("product"))?;
    api.inner
        .db
        .write()
        .await
        .products
        .remove(id)
        .map(|_| Json(json!({})))
        .ok_or(MockApiError::NotFound("product"))
}

// =============================================================================
// Users
// =============================================================================

async fn list_users(State(api): State<MockApi>, Query(params): Query<ListParams>) -> Response {
    let matching = filter_users(api.inner.db.read().await.users.all(), params.q.as_deref());
    let total = matching.len();
    listing(params.apply(matching), total)
}

async fn get_user(State(api): State<MockApi>, Path(id): Path<String>) -> Result<Json<User>> {
    let db = api.inner.db.read().await;
    parse_id(&id)
        .and_then(|id| db.users.get(id))
        .cloned()
        .map(Json)
        .ok_or(MockApiError::NotFound("user"))
}

async fn create_user(
    State(api): State<MockApi>,
    Json(body): Json<Value>,
) -> Result<(StatusCode, Json<User>)> {
    let payload: UserPayload = serde_json::from_value(body)?;
    let created = api
        .inner
        .db
        .write()
        .await
        .users
        .insert_with(|id| payload.with_id(UserId::new(id)))?;
    info!(id = %created.id, "user created");
    Ok((StatusCode::CREATED, Json(created)))
}

async fn replace_user(
    State(api): State<MockApi>,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> Result<Json<User>> {
    let id = parse_id(&id).ok_or(MockApiError::NotFound("user"))?;
    let payload: UserPayload = serde_json::from_value(body)?;
    api.inner
        .db
        .write()
        .await
        .users
        .replace(payload.with_id(UserId::new(id)))
        .map(Json)
        .ok_or(MockApiError::NotFound("user"))
}

async fn patch_user(
    State(api): State<MockApi>,
    Path(id): Path<String>,
    Json(changes): Json<Value>,
) -> Result<Json<User>> {
    let id = parse_id(&id).ok_or(MockApiError::NotFound("user"))?;
    api.inner
        .db
        .write()
        .await
        .users
        .patch(id, &changes)?
        .map(Json)
        .ok_or(MockApiError::NotFound("user"))
}

async fn delete_user(State(api): State<MockApi>, Path(id): Path<String>) -> Result<Json<Value>> {
    let id = parse_id(&id).ok_or(MockApiError::NotFound("user"))?;
    api.inner
        .db
        .write()
        .await
        .users
        .remove(id)
        .map(|_| Json(json!({})))
        .ok_or(MockApiError::NotFound("user"))
}

// =============================================================================
// Auth
// =============================================================================

#[derive(Debug, Deserialize)]
struct LoginBody {
    #[serde(default)]
    email: String,
}

#[derive(Debug, Deserialize)]
struct RegisterBody {
    #[serde(default)]
    name: String,
    #[serde(default)]
    email: String,
}

/// Successful login or registration.
#[derive(Debug, Serialize, Deserialize)]
pub struct AuthResponse {
    #[serde(rename = "accessToken")]
    pub access_token: String,
    pub user: User,
}

fn same_email(user: &User, email: &str) -> bool {
    user.email.trim().eq_ignore_ascii_case(email.trim())
}

async fn login(State(api): State<MockApi>, Json(body): Json<LoginBody>) -> Result<Json<AuthResponse>> {
    if body.email.trim().is_empty() {
        return Err(MockApiError::BadRequest("Email and password are required".to_string()));
    }

    let db = api.inner.db.read().await;
    let user = db
        .users
        .all()
        .iter()
        .find(|u| same_email(u, &body.email))
        .ok_or_else(|| MockApiError::BadRequest("Cannot find user".to_string()))?;

    info!(id = %user.id, "login");
    Ok(Json(api.session(user)))
}

async fn register(
    State(api): State<MockApi>,
    Json(body): Json<RegisterBody>,
) -> Result<(StatusCode, Json<AuthResponse>)> {
    let email = Email::parse(&body.email).map_err(|_| {
        MockApiError::BadRequest("Email format is invalid".to_string())
    })?;

    let mut db = api.inner.db.write().await;
    if db.users.all().iter().any(|u| same_email(u, email.as_str())) {
        return Err(MockApiError::BadRequest("Email already exists".to_string()));
    }

    let name = if body.name.trim().is_empty() {
        email.local_part().to_string()
    } else {
        body.name.trim().to_string()
    };
    let user = db
        .users
        .insert_with(|id| UserPayload { name, email }.with_id(UserId::new(id)))?;
    drop(db);

    info!(id = %user.id, "registered");
    Ok((StatusCode::CREATED, Json(api.session(&user))))
}
