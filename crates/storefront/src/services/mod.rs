//! Business logic services for storefront.
//!
//! # Services
//!
//! - `catalog` - Product and user reads with sample-data fallback
//! - `auth` - Login and registration with fabricated-token fallback

pub mod auth;
pub mod catalog;

pub use auth::AuthService;
pub use catalog::{Catalog, DataSource, ProductListing};
