//! Bundled sample catalog.
//!
//! Shown whenever the REST API cannot be reached, and used to seed the mock
//! API. The data is compiled into the binary from `data/sample.json`.

use std::sync::LazyLock;

use serde::Deserialize;

use crate::pagination::{Page, PageRequest, paginate};
use crate::search::{ProductFilter, filter_products, filter_users};
use crate::types::{Product, ProductId, User};

const SAMPLE_JSON: &str = include_str!("../data/sample.json");

static BUNDLED: LazyLock<SampleData> =
    LazyLock::new(|| serde_json::from_str(SAMPLE_JSON).unwrap_or_default());

/// Sample products and users.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct SampleData {
    #[serde(default)]
    products: Vec<Product>,
    #[serde(default)]
    users: Vec<User>,
}

impl SampleData {
    /// The data compiled into this binary.
    #[must_use]
    pub fn bundled() -> &'static Self {
        &BUNDLED
    }

    #[must_use]
    pub fn products(&self) -> &[Product] {
        &self.products
    }

    #[must_use]
    pub fn users(&self) -> &[User] {
        &self.users
    }

    #[must_use]
    pub fn find_product(&self, id: ProductId) -> Option<&Product> {
        self.products.iter().find(|p| p.id == id)
    }

    /// Filter then page the sample products.
    #[must_use]
    pub fn search_products(&self, filter: &ProductFilter, request: PageRequest) -> Page<Product> {
        paginate(&filter_products(&self.products, filter), request)
    }

    /// Filter then page the sample users.
    #[must_use]
    pub fn search_users(&self, q: Option<&str>, request: PageRequest) -> Page<User> {
        paginate(&filter_users(&self.users, q), request)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_bundled_data_parses() {
        let sample = SampleData::bundled();
        assert_eq!(sample.products().len(), 12);
        assert_eq!(sample.users().len(), 2);
        assert_eq!(sample.users()[0].name, "Người dùng A");
        assert_eq!(sample.users()[1].email, "b@example.com");
    }

    #[test]
    fn test_bundled_ids_are_unique() {
        let mut ids: Vec<i64> = SampleData::bundled()
            .products()
            .iter()
            .map(|p| p.id.as_i64())
            .collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), 12);
    }

    #[test]
    fn test_find_product() {
        let sample = SampleData::bundled();
        assert!(sample.find_product(ProductId::new(3)).is_some());
        assert!(sample.find_product(ProductId::new(999)).is_none());
    }

    #[test]
    fn test_search_products_pages_filtered_set() {
        let sample = SampleData::bundled();
        let first = sample.search_products(&ProductFilter::default(), PageRequest::new(1, 8));
        assert_eq!(first.items.len(), 8);
        assert_eq!(first.total, 12);
        assert_eq!(first.total_pages(), 2);

        let jackets = sample.search_products(&ProductFilter::query(Some("áo")), PageRequest::new(1, 8));
        assert!(jackets.items.iter().all(|p| p.name.to_lowercase().contains("áo")
            || p.description.as_deref().unwrap_or("").to_lowercase().contains("áo")));
        assert_eq!(jackets.total as usize, jackets.items.len());
    }

    #[test]
    fn test_search_users() {
        let page = SampleData::bundled().search_users(Some("b@"), PageRequest::new(1, 10));
        assert_eq!(page.total, 1);
    }
}
