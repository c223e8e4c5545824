//! Subcommand implementations.

pub mod mock_api;
pub mod seed;
pub mod token;

use chrono::Duration;
use secrecy::{ExposeSecret, SecretString};

use shopfront_core::{TokenError, TokenSigner};

/// Signing secret for tokens issued outside the web apps.
pub const TOKEN_SECRET_VAR: &str = "SHOPFRONT_TOKEN_SECRET";

/// Used when `SHOPFRONT_TOKEN_SECRET` is unset. Only good for local play.
const DEV_TOKEN_SECRET: &str = "shopfront-dev-token-secret";

/// Read the token secret from the environment (after `.env`).
pub fn token_secret() -> SecretString {
    dotenvy::dotenv().ok();
    std::env::var(TOKEN_SECRET_VAR).map_or_else(
        |_| {
            tracing::warn!("{TOKEN_SECRET_VAR} not set, using the development secret");
            SecretString::from(DEV_TOKEN_SECRET)
        },
        SecretString::from,
    )
}

/// Build a signer from the configured secret.
///
/// # Errors
///
/// Returns an error if the key is rejected.
pub fn signer(ttl: Duration) -> Result<TokenSigner, TokenError> {
    TokenSigner::new(token_secret().expose_secret().as_bytes(), ttl)
}
