//! Catalog reads with sample-data fallback.
//!
//! Every read goes to the REST API first. When the API fails, the bundled
//! sample catalog is served instead and the page shows an offline banner.

use tracing::{instrument, warn};

use shopfront_core::{Page, PageRequest, Product, ProductFilter, ProductId, SampleData, User};

use crate::api::ApiClient;

/// Where a result came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataSource {
    Api,
    Sample,
}

impl DataSource {
    #[must_use]
    pub const fn is_sample(self) -> bool {
        matches!(self, Self::Sample)
    }
}

/// A page of products and its origin.
#[derive(Debug, Clone)]
pub struct ProductListing {
    pub page: Page<Product>,
    pub source: DataSource,
}

/// Product and user reads for the public site.
#[derive(Clone)]
pub struct Catalog {
    api: ApiClient,
    sample: &'static SampleData,
}

impl Catalog {
    #[must_use]
    pub fn new(api: ApiClient) -> Self {
        Self {
            api,
            sample: SampleData::bundled(),
        }
    }

    /// One page of products matching `q`.
    ///
    /// Falls back to the sample catalog when the API fails, and also when it
    /// returns nothing for an unfiltered first page (an empty mock server).
    #[instrument(skip(self), fields(page = request.page()))]
    pub async fn products(&self, q: Option<&str>, request: PageRequest) -> ProductListing {
        let filter = ProductFilter::query(q);
        match self.api.list_products(filter.q.as_deref(), request).await {
            Ok(page) if page.items.is_empty() && request.page() == 1 && filter.q.is_none() => {
                warn!("API returned no products, serving sample catalog");
                self.sample_products(&filter, request)
            }
            Ok(page) => ProductListing {
                page,
                source: DataSource::Api,
            },
            Err(e) => {
                warn!(error = %e, "product list unavailable, serving sample catalog");
                self.sample_products(&filter, request)
            }
        }
    }

    fn sample_products(&self, filter: &ProductFilter, request: PageRequest) -> ProductListing {
        ProductListing {
            page: self.sample.search_products(filter, request),
            source: DataSource::Sample,
        }
    }

    /// A single product, from the API or else the sample catalog.
    #[instrument(skip(self))]
    pub async fn product(&self, id: ProductId) -> Option<(Product, DataSource)> {
        match self.api.get_product(id).await {
            Ok(Some(product)) => return Some((product, DataSource::Api)),
            Ok(None) => {}
            Err(e) => warn!(error = %e, "product unavailable, trying sample catalog"),
        }
        self.sample
            .find_product(id)
            .cloned()
            .map(|p| (p, DataSource::Sample))
    }

    /// Up to `limit` products whose name or description contains `q`.
    pub async fn suggest(&self, q: &str, limit: u32) -> Vec<Product> {
        if q.trim().is_empty() {
            return Vec::new();
        }
        self.products(Some(q), PageRequest::new(1, limit))
            .await
            .page
            .items
    }

    /// Every user, from the API or else the sample users.
    #[instrument(skip(self))]
    pub async fn users(&self) -> (Vec<User>, DataSource) {
        match self.api.list_users().await {
            Ok(users) => (users, DataSource::Api),
            Err(e) => {
                warn!(error = %e, "user list unavailable, serving sample users");
                (self.sample.users().to_vec(), DataSource::Sample)
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::time::Duration;

    use url::Url;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::config::ApiConfig;

    fn catalog_for(base_url: &str) -> Catalog {
        let config = ApiConfig {
            base_url: Url::parse(base_url).unwrap(),
            timeout: Duration::from_millis(500),
        };
        Catalog::new(ApiClient::new(&config, Duration::from_secs(30)).unwrap())
    }

    #[tokio::test]
    async fn test_unreachable_api_serves_sample_page() {
        let catalog = catalog_for("http://127.0.0.1:9");
        let listing = catalog.products(None, PageRequest::new(1, 8)).await;
        assert_eq!(listing.source, DataSource::Sample);
        assert_eq!(listing.page.items.len(), 8);
        assert_eq!(listing.page.total, 12);
    }

    #[tokio::test]
    async fn test_unreachable_api_sample_lookup() {
        let catalog = catalog_for("http://127.0.0.1:9");
        let (product, source) = catalog.product(ProductId::new(2)).await.unwrap();
        assert_eq!(product.id, ProductId::new(2));
        assert!(source.is_sample());
        assert!(catalog.product(ProductId::new(777)).await.is_none());

        let (users, source) = catalog.users().await;
        assert_eq!(users.len(), 2);
        assert!(source.is_sample());
    }

    #[tokio::test]
    async fn test_empty_first_page_serves_sample() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/products"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("X-Total-Count", "0")
                    .set_body_json(serde_json::json!([])),
            )
            .mount(&server)
            .await;

        let catalog = catalog_for(&server.uri());
        let listing = catalog.products(None, PageRequest::new(1, 8)).await;
        assert_eq!(listing.source, DataSource::Sample);

        // A search with no hits is a real empty result.
        let listing = catalog.products(Some("zzz"), PageRequest::new(1, 8)).await;
        assert_eq!(listing.source, DataSource::Api);
        assert!(listing.page.items.is_empty());
    }

    #[tokio::test]
    async fn test_api_404_falls_back_to_sample_lookup() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/products/3"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let (_, source) = catalog_for(&server.uri())
            .product(ProductId::new(3))
            .await
            .unwrap();
        assert_eq!(source, DataSource::Sample);
    }
}
