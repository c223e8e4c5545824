//! Cache types for REST API responses.

use shopfront_core::{Page, Product, ProductId, User};

/// Cache key for catalog reads.
#[derive(Debug, Clone, Hash, PartialEq, Eq)]
pub enum CacheKey {
    Products {
        page: u32,
        limit: u32,
        q: Option<String>,
    },
    Product(ProductId),
    Users,
}

/// Cached value types.
#[derive(Debug, Clone)]
pub enum CacheValue {
    Products(Page<Product>),
    Product(Box<Product>),
    Users(Vec<User>),
}
