//! Session-related types.
//!
//! The session stands in for the browser's local storage: it holds the cart
//! and the auth token under the same keys a browser client would use.

use serde::{Deserialize, Serialize};

/// Who minted a stored token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenIssuer {
    /// Returned by the REST API's `/login`; cannot be verified here.
    Api,
    /// Fabricated by this server and signed with the session secret.
    Local,
}

/// Session-stored auth token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredToken {
    pub token: String,
    pub issuer: TokenIssuer,
}

/// A one-shot notice rendered on the next page view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flash {
    pub success: bool,
    pub message: String,
}

impl Flash {
    #[must_use]
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
        }
    }
}

/// Session keys.
pub mod keys {
    /// Key for the cart, stored as its JSON array form.
    pub const CART: &str = shopfront_core::Cart::STORAGE_KEY;

    /// Key for the auth token.
    pub const AUTH_TOKEN: &str = "auth:token";

    /// Key for a one-shot notice shown on the next page.
    pub const FLASH: &str = "flash";
}
