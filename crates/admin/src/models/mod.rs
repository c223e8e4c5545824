//! Session-stored models for the admin panel.

pub mod session;

pub use session::{Flash, StoredToken, TokenIssuer, keys as session_keys};
