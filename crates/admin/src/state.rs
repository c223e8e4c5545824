//! Application state shared across handlers.

use std::sync::Arc;

use secrecy::ExposeSecret;

use shopfront_core::{TokenError, TokenSigner};

use crate::api::{ApiClient, ApiError};
use crate::config::AdminConfig;
use crate::services::{AuthService, Store};

/// Error building application state.
#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("API client: {0}")]
    Api(#[from] ApiError),
    #[error("token signer: {0}")]
    Token(#[from] TokenError),
}

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: AdminConfig,
    store: Store,
    auth: AuthService,
}

impl AppState {
    /// # Errors
    ///
    /// Returns an error if the HTTP client or token signer cannot be built.
    pub fn new(config: AdminConfig) -> Result<Self, StateError> {
        let api = ApiClient::new(&config.api)?;
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
                store: Store::new(api),
                auth,
                config,
            }),
        })
    }

    #[must_use]
    pub fn config(&self) -> &AdminConfig {
        &self.inner.config
    }

    #[must_use]
    pub fn store(&self) -> &Store {
        &self.inner.store
    }

    #[must_use]
    pub fn auth(&self) -> &AuthService {
        &self.inner.auth
    }
}
