//! Admin login.
//!
//! Same pseudo-auth as the storefront: the REST API is asked for a token
//! and a locally signed one is fabricated when it has none to give.
//! A storefront login can also be carried over with a handoff token signed
//! by the key both apps share.

use chrono::{DateTime, Utc};
use tracing::{info, instrument, warn};

use shopfront_core::token::{self, DecodedToken};
use shopfront_core::validation::LoginRequest;
use shopfront_core::{AuthUser, Identity, TokenSigner};

use crate::api::ApiClient;
use crate::models::{StoredToken, TokenIssuer};

/// Issues and checks admin session tokens.
#[derive(Clone)]
pub struct AuthService {
    api: ApiClient,
    signer: TokenSigner,
    handoff: Option<TokenSigner>,
}

impl AuthService {
    #[must_use]
    pub const fn new(api: ApiClient, signer: TokenSigner) -> Self {
        Self {
            api,
            signer,
            handoff: None,
        }
    }

    /// Accept storefront handoff tokens signed by `signer`.
    #[must_use]
    pub fn with_handoff(mut self, signer: TokenSigner) -> Self {
        self.handoff = Some(signer);
        self
    }

    /// Exchange a storefront handoff token for an admin session token.
    #[instrument(skip_all)]
    pub fn accept_handoff(&self, token: &str, now: DateTime<Utc>) -> Option<StoredToken> {
        let Some(handoff) = &self.handoff else {
            warn!("handoff token received but no handoff key is configured");
            return None;
        };
        let Some(user) = handoff.accept(token, now) else {
            warn!("rejected handoff token");
            return None;
        };

        info!("admin signed in from storefront handoff");
        let identity = Identity {
            email: user.email.clone().unwrap_or_default(),
            name: user.display_name().to_string(),
        };
        Some(StoredToken {
            token: self.signer.fabricate(&identity, now),
            issuer: TokenIssuer::Local,
        })
    }

    /// Log in, falling back to a token named after the email's local part.
    #[instrument(skip(self, request), fields(email = %request.email))]
    pub async fn login(&self, request: &LoginRequest) -> StoredToken {
        match self.api.login(request).await {
            Ok(Some(token)) if token::decode(&token).is_ok() => {
                info!("admin logged in with API token");
                return StoredToken {
                    token,
                    issuer: TokenIssuer::Api,
                };
            }
            Ok(_) => warn!("API login returned no usable token"),
            Err(e) => warn!(error = %e, "API login failed"),
        }

        info!("fabricated local admin token");
        StoredToken {
            token: self
                .signer
                .fabricate(&Identity::from_email(request.email.as_str()), Utc::now()),
            issuer: TokenIssuer::Local,
        }
    }

    /// The admin a stored token belongs to, if it is still acceptable.
    #[must_use]
    pub fn authenticate(&self, stored: &StoredToken, now: DateTime<Utc>) -> Option<AuthUser> {
        if stored.issuer == TokenIssuer::Local && !self.signer.verify(&stored.token) {
            return None;
        }
        let DecodedToken { user, .. } = token::decode(&stored.token)
            .ok()
            .filter(|decoded| !decoded.is_expired(now))?;
        Some(user)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::time::Duration;

    use url::Url;

    use shopfront_core::Email;

    use super::*;
    use crate::config::ApiConfig;

    fn signer(secret: &[u8]) -> TokenSigner {
        TokenSigner::new(secret, chrono::Duration::hours(1)).unwrap()
    }

    fn offline_service(secret: &[u8]) -> AuthService {
        let api = ApiClient::new(&ApiConfig {
            base_url: Url::parse("http://127.0.0.1:9").unwrap(),
            timeout: Duration::from_millis(200),
        })
        .unwrap();
        AuthService::new(api, signer(secret))
    }

    #[tokio::test]
    async fn test_offline_login_fabricates_verifiable_token() {
        let auth = offline_service(b"0123456789abcdef0123456789abcdef");
        let stored = auth
            .login(&LoginRequest {
                email: Email::parse("boss@shop.vn").unwrap(),
                password: "pw".to_string(),
            })
            .await;

        assert_eq!(stored.issuer, TokenIssuer::Local);
        let user = auth.authenticate(&stored, Utc::now()).unwrap();
        assert_eq!(user.display_name(), "boss");
    }

    #[tokio::test]
    async fn test_token_from_other_key_rejected() {
        let other = offline_service(b"fedcba9876543210fedcba9876543210");
        let stored = other
            .login(&LoginRequest {
                email: Email::parse("boss@shop.vn").unwrap(),
                password: "pw".to_string(),
            })
            .await;

        let auth = offline_service(b"0123456789abcdef0123456789abcdef");
        assert!(auth.authenticate(&stored, Utc::now()).is_none());
    }

    #[test]
    fn test_expired_token_rejected() {
        let auth = offline_service(b"0123456789abcdef0123456789abcdef");
        let issued = Utc::now() - chrono::Duration::hours(2);
        let stored = StoredToken {
            token: signer(b"0123456789abcdef0123456789abcdef")
                .fabricate(&Identity::from_email("boss@shop.vn"), issued),
            issuer: TokenIssuer::Local,
        };
        assert!(auth.authenticate(&stored, Utc::now()).is_none());
    }

    #[test]
    fn test_handoff_exchanged_for_session_token() {
        let key = b"handoff-key-handoff-key-handoff!";
        let storefront = TokenSigner::handoff(key).unwrap();
        let now = Utc::now();
        let handoff = storefront.fabricate(
            &Identity {
                email: "lan@shop.vn".to_string(),
                name: "Trần Lan".to_string(),
            },
            now,
        );

        let without_key = offline_service(b"0123456789abcdef0123456789abcdef");
        assert!(without_key.accept_handoff(&handoff, now).is_none());

        let auth = without_key.with_handoff(TokenSigner::handoff(key).unwrap());
        let stored = auth.accept_handoff(&handoff, now).unwrap();
        assert_eq!(stored.issuer, TokenIssuer::Local);
        let admin = auth.authenticate(&stored, now).unwrap();
        assert_eq!(admin.display_name(), "Trần Lan");
        assert_eq!(admin.email.as_deref(), Some("lan@shop.vn"));

        let late = now + chrono::Duration::seconds(shopfront_core::token::HANDOFF_TTL_SECS + 1);
        assert!(auth.accept_handoff(&handoff, late).is_none());
        assert!(auth.accept_handoff(&format!("{handoff}x"), now).is_none());
    }
}
