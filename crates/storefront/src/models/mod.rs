//! Session-backed models for storefront.

pub mod session;

pub use session::{Flash, StoredToken, TokenIssuer, keys as session_keys};
