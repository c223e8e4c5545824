//! REST API client for the catalog and auth endpoints.
//!
//! Talks to a json-server compatible API: `_page`/`_limit` paging with the
//! unpaged count in `X-Total-Count`, `q` full-text search, and
//! `POST /login` / `POST /register` for auth. Successful reads are cached with
//! `moka`; failures are never cached so the next request retries.

mod cache;

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use reqwest::StatusCode;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, instrument};
use url::Url;

use shopfront_core::pagination::parse_total_count;
use shopfront_core::validation::{LoginRequest, RegisterRequest};
use shopfront_core::{Page, PageRequest, Product, ProductFilter, ProductId, User};

use crate::config::ApiConfig;

use cache::{CacheKey, CacheValue};

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
}

/// Client for the shop REST API.
///
/// Cheap to clone; clones share the connection pool and cache.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ApiClientInner>,
}

struct ApiClientInner {
    client: reqwest::Client,
    base_url: Url,
    cache: Cache<CacheKey, CacheValue>,
}

impl ApiClient {
    /// Create a new API client.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: &ApiConfig, cache_ttl: Duration) -> Result<Self, ApiError> {
        let cache = Cache::builder()
            .max_capacity(1000)
            .time_to_live(cache_ttl)
            .build();

        let client = reqwest::Client::builder().timeout(config.timeout).build()?;

        Ok(Self {
            inner: Arc::new(ApiClientInner {
                client,
                base_url: config.base_url.clone(),
                cache,
            }),
        })
    }

    /// Base URL requests are sent to.
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

    /// Fetch one page of products matching `q`.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure or a non-success status.
    #[instrument(skip(self), fields(page = request.page(), limit = request.limit()))]
    pub async fn list_products(
        &self,
        q: Option<&str>,
        request: PageRequest,
    ) -> Result<Page<Product>, ApiError> {
        let filter = ProductFilter::query(q);
        let key = CacheKey::Products {
            page: request.page(),
            limit: request.limit(),
            q: filter.q.clone(),
        };
        if let Some(CacheValue::Products(page)) = self.inner.cache.get(&key).await {
            debug!("products cache hit");
            return Ok(page);
        }

        let mut query = vec![
            ("_page", request.page().to_string()),
            ("_limit", request.limit().to_string()),
        ];
        query.extend(filter.to_query_pairs());

        let response = self
            .inner
            .client
            .get(self.endpoint(&["products"])?)
            .query(&query)
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::Status(status));
        }

        let total_header = response
            .headers()
            .get("x-total-count")
            .and_then(|v| v.to_str().ok())
            .map(String::from);
        let items: Vec<Product> = response.json().await?;
        let total = parse_total_count(total_header.as_deref(), items.len());
        let page = Page::new(items, request, total);

        self.inner
            .cache
            .insert(key, CacheValue::Products(page.clone()))
            .await;
        Ok(page)
    }

    /// Fetch a single product. A 404 is `Ok(None)`.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure or any other non-success status.
    #[instrument(skip(self))]
    pub async fn get_product(&self, id: ProductId) -> Result<Option<Product>, ApiError> {
        let key = CacheKey::Product(id);
        if let Some(CacheValue::Product(product)) = self.inner.cache.get(&key).await {
            debug!("product cache hit");
            return Ok(Some(*product));
        }

        let response = self
            .inner
            .client
            .get(self.endpoint(&["products", &id.to_string()])?)
            .send()
            .await?;
        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            return Err(ApiError::Status(status));
        }

        let product: Product = response.json().await?;
        self.inner
            .cache
            .insert(key, CacheValue::Product(Box::new(product.clone())))
            .await;
        Ok(Some(product))
    }

    /// Fetch every user.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure or a non-success status.
    #[instrument(skip(self))]
    pub async fn list_users(&self) -> Result<Vec<User>, ApiError> {
        if let Some(CacheValue::Users(users)) = self.inner.cache.get(&CacheKey::Users).await {
            debug!("users cache hit");
            return Ok(users);
        }

        let response = self
            .inner
            .client
            .get(self.endpoint(&["users"])?)
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::Status(status));
        }

        let users: Vec<User> = response.json().await?;
        self.inner
            .cache
            .insert(CacheKey::Users, CacheValue::Users(users.clone()))
            .await;
        Ok(users)
    }

    /// Ask the API for a token. `Ok(None)` when it answered without one.
    ///
    /// Accepts either an `accessToken` or a `token` field in the response.
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
        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::Status(status));
        }

        let body: Value = response.json().await?;
        let token = ["accessToken", "token"]
            .iter()
            .find_map(|field| body.get(*field).and_then(Value::as_str))
            .filter(|t| !t.is_empty())
            .map(String::from);
        Ok(token)
    }

    /// Register an account.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure or a non-success status.
    #[instrument(skip(self, request), fields(email = %request.email))]
    pub async fn register(&self, request: &RegisterRequest) -> Result<(), ApiError> {
        let response = self
            .inner
            .client
            .post(self.endpoint(&["register"])?)
            .json(request)
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::Status(status));
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use shopfront_core::Email;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client(server: &MockServer) -> ApiClient {
        let config = ApiConfig {
            base_url: Url::parse(&server.uri()).unwrap(),
            timeout: Duration::from_secs(2),
        };
        ApiClient::new(&config, Duration::from_secs(30)).unwrap()
    }

    fn login_request() -> LoginRequest {
        LoginRequest {
            email: Email::parse("a@example.com").unwrap(),
            password: "pw".to_string(),
        }
    }

    #[tokio::test]
    async fn test_list_products_reads_total_header() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/products"))
            .and(query_param("_page", "2"))
            .and(query_param("_limit", "8"))
            .and(query_param("q", "áo"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("X-Total-Count", "17")
                    .set_body_json(serde_json::json!([{"id": 9, "name": "Áo", "price": 1000}])),
            )
            .expect(1)
            .mount(&server)
            .await;

        let api = client(&server);
        let page = api
            .list_products(Some(" áo "), PageRequest::new(2, 8))
            .await
            .unwrap();
        assert_eq!(page.total, 17);
        assert_eq!(page.items.len(), 1);
        assert_eq!(page.total_pages(), 3);

        // Second call is served from cache (the mock expects exactly one hit).
        let again = api
            .list_products(Some("áo"), PageRequest::new(2, 8))
            .await
            .unwrap();
        assert_eq!(again, page);
    }

    #[tokio::test]
    async fn test_list_products_without_total_header() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/products"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                {"id": 1, "name": "A"},
                {"id": "2", "name": "B"}
            ])))
            .mount(&server)
            .await;

        let page = client(&server)
            .list_products(None, PageRequest::new(1, 8))
            .await
            .unwrap();
        assert_eq!(page.total, 2);
    }

    #[tokio::test]
    async fn test_server_error_is_unreachable() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/products"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let err = client(&server)
            .list_products(None, PageRequest::new(1, 8))
            .await
            .unwrap_err();
        assert!(err.is_unreachable());
    }

    #[tokio::test]
    async fn test_get_product_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/products/404"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let found = client(&server).get_product(ProductId::new(404)).await.unwrap();
        assert!(found.is_none());
    }

    #[tokio::test]
    async fn test_negative_price_fails_to_decode() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/products/3"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"id": 3, "name": "Lỗi", "price": -500})),
            )
            .mount(&server)
            .await;

        let err = client(&server).get_product(ProductId::new(3)).await.unwrap_err();
        assert!(matches!(err, ApiError::Http(ref e) if e.is_decode()), "{err}");
    }

    #[tokio::test]
    async fn test_connection_refused_is_unreachable() {
        let config = ApiConfig {
            base_url: Url::parse("http://127.0.0.1:9").unwrap(),
            timeout: Duration::from_millis(500),
        };
        let api = ApiClient::new(&config, Duration::from_secs(30)).unwrap();
        let err = api.list_users().await.unwrap_err();
        assert!(err.is_unreachable());
    }

    #[tokio::test]
    async fn test_login_accepts_either_token_field() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/login"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"token": "abc.def.ghi"})),
            )
            .mount(&server)
            .await;

        let token = client(&server).login(&login_request()).await.unwrap();
        assert_eq!(token.as_deref(), Some("abc.def.ghi"));
    }

    #[tokio::test]
    async fn test_login_without_token_field() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/login"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"ok": true})))
            .mount(&server)
            .await;

        assert!(client(&server).login(&login_request()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_login_rejected() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/login"))
            .respond_with(ResponseTemplate::new(400))
            .mount(&server)
            .await;

        let err = client(&server).login(&login_request()).await.unwrap_err();
        assert!(matches!(err, ApiError::Status(StatusCode::BAD_REQUEST)));
        assert!(!err.is_unreachable());
    }
}
