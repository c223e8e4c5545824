//! Session-related types for admin authentication.

use serde::{Deserialize, Serialize};

/// Who minted a stored token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenIssuer {
    /// Returned by the REST API's `/login`.
    Api,
    /// Fabricated here and signed with the session secret.
    Local,
}

/// Session-stored auth token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredToken {
    pub token: String,
    pub issuer: TokenIssuer,
}

/// Notice shown once after a redirect.
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

/// Session keys for admin authentication data.
pub mod keys {
    /// Key for the current admin's token.
    pub const AUTH_TOKEN: &str = "auth:token";

    /// Key for the pending flash notice.
    pub const FLASH: &str = "flash";
}
