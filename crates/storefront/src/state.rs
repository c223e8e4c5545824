//! Application state shared across handlers.

use std::sync::Arc;

use secrecy::ExposeSecret;

use shopfront_core::{TokenError, TokenSigner};

use crate::api::{ApiClient, ApiError};
use crate::config::StorefrontConfig;
use crate::services::{AuthService, Catalog};

/// Error building application state.
#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("API client: {0}")]
    Api(#[from] ApiError),
    #[error("token signer: {0}")]
    Token(#[from] TokenError),
}

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// configuration and the catalog/auth services.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    catalog: Catalog,
    auth: AuthService,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client or token signer cannot be built.
    pub fn new(config: StorefrontConfig) -> Result<Self, StateError> {
        let api = ApiClient::new(&config.api, config.cache_ttl)?;
        let signer = TokenSigner::new(
            config.session_secret.expose_secret().as_bytes(),
            config.token_ttl,
        )?;
        let mut auth = AuthService::new(api.clone(), signer);
        if let Some(secret) = &config.handoff_secret {
            auth = auth.with_handoff(TokenSigner::handoff(secret.expose_secret().as_bytes())?);
        }

        Ok(Self {
            inner: Arc::new(AppStateInner {
                catalog: Catalog::new(api),
                auth,
                config,
            }),
        })
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get a reference to the catalog service.
    #[must_use]
    pub fn catalog(&self) -> &Catalog {
        &self.inner.catalog
    }

    /// Get a reference to the auth service.
    #[must_use]
    pub fn auth(&self) -> &AuthService {
        &self.inner.auth
    }
}
