//! REST API client for product and user management.
//!
//! json-server semantics: `GET /{resource}` with `_page`, `_limit`, `q`,
//! `price_gte`, `price_lte` and the unpaged count in `X-Total-Count`;
//! `POST /{resource}`, `PUT /{resource}/{id}` and `DELETE /{resource}/{id}`
//! for writes. Nothing is cached here: the admin always shows fresh data.

use std::sync::Arc;

use reqwest::StatusCode;
use serde::{Serialize, de::DeserializeOwned};
use serde_json::Value;
use thiserror::Error;
use tracing::instrument;
use url::Url;

use shopfront_core::pagination::parse_total_count;
use shopfront_core::validation::LoginRequest;
use shopfront_core::{
    Page, PageRequest, Product, ProductFilter, ProductId, ProductPayload, User, UserId,
    UserPayload,
};

use crate::config::ApiConfig;

const PRODUCTS: &str = "products";
const USERS: &str = "users";

/// Errors that can occur when talking to the REST API.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Transport failure: refused connection, timeout, bad body.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The API answered with a non-success status.
    #[error("API returned {0}")]
    Status(StatusCode),

    /// The configured base URL cannot have path segments appended.
    #[error("Invalid API base URL: {0}")]
    InvalidBaseUrl(String),
}

impl ApiError {
    /// Whether the API is down or broken (as opposed to rejecting the request).
    #[must_use]
    pub fn is_unreachable(&self) -> bool {
        match self {
            Self::Http(e) => e.is_connect() || e.is_timeout() || e.is_request(),
            Self::Status(status) => status.is_server_error(),
            Self::InvalidBaseUrl(_) => true,
        }
    }

    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Status(StatusCode::NOT_FOUND))
    }
}

/// Client for the shop REST API.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ApiClientInner>,
}

struct ApiClientInner {
    client: reqwest::Client,
    base_url: Url,
}

impl ApiClient {
    /// Create a new API client.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: &ApiConfig) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder().timeout(config.timeout).build()?;
        Ok(Self {
            inner: Arc::new(ApiClientInner {
                client,
                base_url: config.base_url.clone(),
            }),
        })
    }

    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.inner.base_url
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, ApiError> {
        let mut url = self.inner.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| ApiError::InvalidBaseUrl(self.inner.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    // =========================================================================
    // Generic resource operations
    // =========================================================================

    async fn list<T: DeserializeOwned>(
        &self,
        resource: &str,
        filters: Vec<(&'static str, String)>,
        request: PageRequest,
    ) -> Result<Page<T>, ApiError> {
        let mut query = vec![
            ("_page", request.page().to_string()),
            ("_limit", request.limit().to_string()),
        ];
        query.extend(filters);

        let response = self
            .inner
            .client
            .get(self.endpoint(&[resource])?)
            .query(&query)
            .send()
            .await?;
        let response = check(response)?;

        let total_header = response
            .headers()
            .get("x-total-count")
            .and_then(|v| v.to_str().ok())
            .map(String::from);
        let items: Vec<T> = response.json().await?;
        let total = parse_total_count(total_header.as_deref(), items.len());
        Ok(Page::new(items, request, total))
    }

    async fn fetch<T: DeserializeOwned>(
        &self,
        resource: &str,
        id: &str,
    ) -> Result<Option<T>, ApiError> {
        let response = self
            .inner
            .client
            .get(self.endpoint(&[resource, id])?)
            .send()
            .await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        Ok(Some(check(response)?.json().await?))
    }

    async fn create<T: DeserializeOwned, B: Serialize + Sync>(
        &self,
        resource: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let response = self
            .inner
            .client
            .post(self.endpoint(&[resource])?)
            .json(body)
            .send()
            .await?;
        Ok(check(response)?.json().await?)
    }

    async fn replace<T: DeserializeOwned, B: Serialize + Sync>(
        &self,
        resource: &str,
        id: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let response = self
            .inner
            .client
            .put(self.endpoint(&[resource, id])?)
            .json(body)
            .send()
            .await?;
        Ok(check(response)?.json().await?)
    }

    async fn remove(&self, resource: &str, id: &str) -> Result<(), ApiError> {
        let response = self
            .inner
            .client
            .delete(self.endpoint(&[resource, id])?)
            .send()
            .await?;
        check(response)?;
        Ok(())
    }

    /// Cheapest request that proves the API answers: one product.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure or a non-success status.
    pub async fn ping(&self) -> Result<(), ApiError> {
        let response = self
            .inner
            .client
            .get(self.endpoint(&["products"])?)
            .query(&[("_limit", "1")])
            .send()
            .await?;
        check(response)?;
        Ok(())
    }

    // =========================================================================
    // Products
    // =========================================================================

    /// Fetch one page of products passing `filter`.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure or a non-success status.
    #[instrument(skip(self), fields(page = request.page(), limit = request.limit()))]
    pub async fn list_products(
        &self,
        filter: &ProductFilter,
        request: PageRequest,
    ) -> Result<Page<Product>, ApiError> {
        self.list(PRODUCTS, filter.to_query_pairs(), request).await
    }

    /// Fetch one product. A 404 is `Ok(None)`.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure or any other non-success status.
    #[instrument(skip(self))]
    pub async fn get_product(&self, id: ProductId) -> Result<Option<Product>, ApiError> {
        self.fetch(PRODUCTS, &id.to_string()).await
    }

    /// Create a product; the API assigns the id.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure or a non-success status.
    #[instrument(skip(self, payload), fields(name = %payload.name))]
    pub async fn create_product(&self, payload: &ProductPayload) -> Result<Product, ApiError> {
        self.create(PRODUCTS, payload).await
    }

    /// Replace a product.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure or a non-success status.
    #[instrument(skip(self, payload), fields(name = %payload.name))]
    pub async fn update_product(
        &self,
        id: ProductId,
        payload: &ProductPayload,
    ) -> Result<Product, ApiError> {
        self.replace(PRODUCTS, &id.to_string(), payload).await
    }

    /// Delete a product.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure or a non-success status.
    #[instrument(skip(self))]
    pub async fn delete_product(&self, id: ProductId) -> Result<(), ApiError> {
        self.remove(PRODUCTS, &id.to_string()).await
    }

    // =========================================================================
    // Users
    // =========================================================================

    /// Fetch one page of users matching `q`.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure or a non-success status.
    #[instrument(skip(self), fields(page = request.page(), limit = request.limit()))]
    pub async fn list_users(
        &self,
        q: Option<&str>,
        request: PageRequest,
    ) -> Result<Page<User>, ApiError> {
        let filters = q.map(|q| vec![("q", q.to_string())]).unwrap_or_default();
        self.list(USERS, filters, request).await
    }

    /// Fetch one user. A 404 is `Ok(None)`.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure or any other non-success status.
    #[instrument(skip(self))]
    pub async fn get_user(&self, id: UserId) -> Result<Option<User>, ApiError> {
        self.fetch(USERS, &id.to_string()).await
    }

    /// Create a user.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure or a non-success status.
    #[instrument(skip(self, payload), fields(email = %payload.email))]
    pub async fn create_user(&self, payload: &UserPayload) -> Result<User, ApiError> {
        self.create(USERS, payload).await
    }

    /// Replace a user.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure or a non-success status.
    #[instrument(skip(self, payload), fields(email = %payload.email))]
    pub async fn update_user(&self, id: UserId, payload: &UserPayload) -> Result<User, ApiError> {
        self.replace(USERS, &id.to_string(), payload).await
    }

    /// Delete a user.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure or a non-success status.
    #[instrument(skip(self))]
    pub async fn delete_user(&self, id: UserId) -> Result<(), ApiError> {
        self.remove(USERS, &id.to_string()).await
    }

    // =========================================================================
    // Auth
    // =========================================================================

    /// Ask the API for a token. `Ok(None)` when it answered without one.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure or a non-success status.
    #[instrument(skip(self, request), fields(email = %request.email))]
    pub async fn login(&self, request: &LoginRequest) -> Result<Option<String>, ApiError> {
        let response = self
            .inner
            .client
            .post(self.endpoint(&["login"])?)
            .json(request)
            .send()
            .await?;
        let body: Value = check(response)?.json().await?;
        Ok(["accessToken", "token"]
            .iter()
            .find_map(|field| body.get(*field).and_then(Value::as_str))
            .filter(|t| !t.is_empty())
            .map(String::from))
    }
}

/// Turn a non-success status into an error.
fn check(response: reqwest::Response) -> Result<reqwest::Response, ApiError> {
    let status = response.status();
    if status.is_success() {
        Ok(response)
    } else {
        Err(ApiError::Status(status))
    }
}
