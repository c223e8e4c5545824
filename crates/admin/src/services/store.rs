//! Product and user management with sample-data fallback for reads.
//!
//! Lists and edit forms keep working when the API is down by showing the
//! bundled sample data. Writes never fall back: they go to the API or fail.

use tracing::{instrument, warn};

use shopfront_core::{
    Page, PageRequest, Product, ProductFilter, ProductId, ProductPayload, SampleData, User,
    UserId, UserPayload,
};

use crate::api::{ApiClient, ApiError};

/// Items shown per dashboard panel.
pub const DASHBOARD_LIMIT: u32 = 6;

/// Where a read was served from.
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

/// A page of records and where it came from.
#[derive(Debug, Clone)]
pub struct Listing<T> {
    pub page: Page<T>,
    pub source: DataSource,
}

/// Dashboard numbers and the newest records.
#[derive(Debug, Clone, Default)]
pub struct Dashboard {
    pub product_count: u64,
    pub user_count: u64,
    pub products: Vec<Product>,
    pub users: Vec<User>,
}

/// Product and user store backed by the REST API.
#[derive(Clone)]
pub struct Store {
    api: ApiClient,
    sample: &'static SampleData,
}

impl Store {
    #[must_use]
    pub fn new(api: ApiClient) -> Self {
        Self {
            api,
            sample: SampleData::bundled(),
        }
    }

    /// A page of products; the first page of matching samples when the API is down.
    #[instrument(skip(self))]
    pub async fn products(&self, filter: &ProductFilter, request: PageRequest) -> Listing<Product> {
        match self.api.list_products(filter, request).await {
            Ok(page) => Listing {
                page,
                source: DataSource::Api,
            },
            Err(e) => {
                warn!(error = %e, "product list failed, showing sample data");
                Listing {
                    page: self
                        .sample
                        .search_products(filter, PageRequest::new(1, request.limit())),
                    source: DataSource::Sample,
                }
            }
        }
    }

    /// A page of users; the sample users when the API is down.
    #[instrument(skip(self))]
    pub async fn users(&self, q: Option<&str>, request: PageRequest) -> Listing<User> {
        match self.api.list_users(q, request).await {
            Ok(page) => Listing {
                page,
                source: DataSource::Api,
            },
            Err(e) => {
                warn!(error = %e, "user list failed, showing sample users");
                Listing {
                    page: self
                        .sample
                        .search_users(q, PageRequest::new(1, request.limit())),
                    source: DataSource::Sample,
                }
            }
        }
    }

    /// One product for the edit form.
    #[instrument(skip(self))]
    pub async fn product(&self, id: ProductId) -> Option<(Product, DataSource)> {
        match self.api.get_product(id).await {
            Ok(found) => found.map(|p| (p, DataSource::Api)),
            Err(e) => {
                warn!(error = %e, "product lookup failed, trying sample data");
                self.sample
                    .find_product(id)
                    .cloned()
                    .map(|p| (p, DataSource::Sample))
            }
        }
    }

    /// One user for the edit form.
    #[instrument(skip(self))]
    pub async fn user(&self, id: UserId) -> Option<(User, DataSource)> {
        match self.api.get_user(id).await {
            Ok(found) => found.map(|u| (u, DataSource::Api)),
            Err(e) => {
                warn!(error = %e, "user lookup failed, trying sample data");
                self.sample
                    .users()
                    .iter()
                    .find(|u| u.id == id)
                    .cloned()
                    .map(|u| (u, DataSource::Sample))
            }
        }
    }

    /// Whether the API currently answers.
    pub async fn api_ready(&self) -> bool {
        self.api.ping().await.is_ok()
    }

    /// Counts and newest records. Empty when the API is down.
    #[instrument(skip(self))]
    pub async fn dashboard(&self) -> Dashboard {
        let request = PageRequest::new(1, DASHBOARD_LIMIT);
        let filter = ProductFilter::default();
        let (products, users) = tokio::join!(
            self.api.list_products(&filter, request),
            self.api.list_users(None, request),
        );

        let mut dashboard = Dashboard::default();
        match products {
            Ok(page) => {
                dashboard.product_count = page.total;
                dashboard.products = page.items;
            }
            Err(e) => warn!(error = %e, "dashboard products unavailable"),
        }
        match users {
            Ok(page) => {
                dashboard.user_count = page.total;
                dashboard.users = page.items;
            }
            Err(e) => warn!(error = %e, "dashboard users unavailable"),
        }
        dashboard
    }

    /// # Errors
    ///
    /// Returns the API error; nothing is stored locally.
    pub async fn create_product(&self, payload: &ProductPayload) -> Result<Product, ApiError> {
        self.api.create_product(payload).await
    }

    /// # Errors
    ///
    /// Returns the API error; nothing is stored locally.
    pub async fn update_product(
        &self,
        id: ProductId,
        payload: &ProductPayload,
    ) -> Result<Product, ApiError> {
        self.api.update_product(id, payload).await
    }

    /// # Errors
    ///
    /// Returns the API error; nothing is stored locally.
    pub async fn delete_product(&self, id: ProductId) -> Result<(), ApiError> {
        self.api.delete_product(id).await
    }

    /// # Errors
    ///
    /// Returns the API error; nothing is stored locally.
    pub async fn create_user(&self, payload: &UserPayload) -> Result<User, ApiError> {
        self.api.create_user(payload).await
    }

    /// # Errors
    ///
    /// Returns the API error; nothing is stored locally.
    pub async fn update_user(&self, id: UserId, payload: &UserPayload) -> Result<User, ApiError> {
        self.api.update_user(id, payload).await
    }

    /// # Errors
    ///
    /// Returns the API error; nothing is stored locally.
    pub async fn delete_user(&self, id: UserId) -> Result<(), ApiError> {
        self.api.delete_user(id).await
    }
}
