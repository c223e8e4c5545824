//! Business logic between the routes and the REST API.

pub mod auth;
pub mod store;

pub use auth::AuthService;
pub use store::{Dashboard, DataSource, Listing, Store};
