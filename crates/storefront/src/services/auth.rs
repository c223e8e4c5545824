//! Pseudo-authentication.
//!
//! The REST API may or may not run an auth server. Login asks it first; if it
//! fails or returns no usable token, a token is fabricated locally and signed
//! with the session secret. Either way the user ends up logged in.
//!
//! With a handoff key shared with the admin, a signed-in user can also be
//! given a one-minute token the admin exchanges for its own session.

use chrono::{DateTime, Utc};
use tracing::{info, instrument, warn};

use shopfront_core::token::{self, DecodedToken};
use shopfront_core::validation::{LoginRequest, RegisterRequest};
use shopfront_core::{AuthUser, Identity, TokenSigner};

use crate::api::ApiClient;
use crate::models::{StoredToken, TokenIssuer};

/// Issues and checks session tokens.
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

    /// Sign handoff tokens for the admin with `signer`.
    #[must_use]
    pub fn with_handoff(mut self, signer: TokenSigner) -> Self {
        self.handoff = Some(signer);
        self
    }

    /// A short-lived token the admin accepts in place of a second login.
    /// `None` without a handoff key.
    #[must_use]
    pub fn handoff_token(&self, user: &AuthUser, now: DateTime<Utc>) -> Option<String> {
        let signer = self.handoff.as_ref()?;
        let identity = Identity {
            email: user.email.clone().unwrap_or_default(),
            name: user.display_name().to_string(),
        };
        Some(signer.fabricate(&identity, now))
    }

    /// Log in, falling back to a fabricated token.
    ///
    /// The fabricated identity is named after the email's local part.
    #[instrument(skip(self, request), fields(email = %request.email))]
    pub async fn login(&self, request: &LoginRequest) -> StoredToken {
        match self.api.login(request).await {
            Ok(Some(token)) if token::decode(&token).is_ok() => {
                info!("logged in with API token");
                return StoredToken {
                    token,
                    issuer: TokenIssuer::Api,
                };
            }
            Ok(_) => warn!("API login returned no usable token"),
            Err(e) => warn!(error = %e, "API login failed"),
        }
        self.fabricate(&Identity::from_email(request.email.as_str()))
    }

    /// Register then log in. If registration fails, fabricate a token
    /// carrying the submitted name.
    #[instrument(skip(self, request), fields(email = %request.email))]
    pub async fn register(&self, request: &RegisterRequest) -> StoredToken {
        match self.api.register(request).await {
            Ok(()) => self.login(&request.login()).await,
            Err(e) => {
                warn!(error = %e, "API registration failed");
                self.fabricate(&Identity {
                    email: request.email.as_str().to_string(),
                    name: request.name.clone(),
                })
            }
        }
    }

    fn fabricate(&self, identity: &Identity) -> StoredToken {
        info!("fabricated local token");
        StoredToken {
            token: self.signer.fabricate(identity, Utc::now()),
            issuer: TokenIssuer::Local,
        }
    }

    /// The user a stored token belongs to, if it is still acceptable.
    ///
    /// Rejects undecodable tokens, expired tokens, and local tokens whose
    /// signature does not match this server's key.
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
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use shopfront_core::Email;

    use super::*;
    use crate::config::ApiConfig;

    fn service(base_url: &str) -> AuthService {
        let config = ApiConfig {
            base_url: Url::parse(base_url).unwrap(),
            timeout: Duration::from_millis(500),
        };
        let api = ApiClient::new(&config, Duration::from_secs(30)).unwrap();
        let signer =
            TokenSigner::new(b"0123456789abcdef0123456789abcdef", chrono::Duration::hours(24)).unwrap();
        AuthService::new(api, signer)
    }

    fn login_request(email: &str) -> LoginRequest {
        LoginRequest {
            email: Email::parse(email).unwrap(),
            password: "pw".to_string(),
        }
    }

    #[tokio::test]
    async fn test_login_without_api_fabricates_token() {
        let auth = service("http://127.0.0.1:9");
        let stored = auth.login(&login_request("lan@shop.vn")).await;
        assert_eq!(stored.issuer, TokenIssuer::Local);

        let user = auth.authenticate(&stored, Utc::now()).unwrap();
        assert_eq!(user.name.as_deref(), Some("lan"));
        assert_eq!(user.email.as_deref(), Some("lan@shop.vn"));
    }

    #[tokio::test]
    async fn test_register_without_api_keeps_name() {
        let auth = service("http://127.0.0.1:9");
        let request = RegisterRequest {
            name: "Trần Lan".to_string(),
            email: Email::parse("lan@shop.vn").unwrap(),
            password: "pw".to_string(),
        };
        let stored = auth.register(&request).await;
        let user = auth.authenticate(&stored, Utc::now()).unwrap();
        assert_eq!(user.display_name(), "Trần Lan");
    }

    #[tokio::test]
    async fn test_login_uses_api_token() {
        let server = MockServer::start().await;
        // {"email":"a@example.com","sub":"1"}
        let api_token = "eyJhbGciOiJIUzI1NiJ9.eyJlbWFpbCI6ImFAZXhhbXBsZS5jb20iLCJzdWIiOiIxIn0.x";
        Mock::given(method("POST"))
            .and(path("/login"))
            .and(body_json(serde_json::json!({"email": "a@example.com", "password": "pw"})))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"accessToken": api_token})),
            )
            .mount(&server)
            .await;

        let auth = service(&server.uri());
        let stored = auth.login(&login_request("a@example.com")).await;
        assert_eq!(stored.issuer, TokenIssuer::Api);
        assert_eq!(stored.token, api_token);

        let user = auth.authenticate(&stored, Utc::now()).unwrap();
        assert_eq!(user.id.as_deref(), Some("1"));
    }

    #[tokio::test]
    async fn test_authenticate_rejects_forged_and_expired() {
        let auth = service("http://127.0.0.1:9");
        let stored = auth.login(&login_request("a@b.c")).await;

        let forged = StoredToken {
            token: format!("{}x", stored.token),
            issuer: TokenIssuer::Local,
        };
        assert!(auth.authenticate(&forged, Utc::now()).is_none());

        let later = Utc::now() + chrono::Duration::hours(25);
        assert!(auth.authenticate(&stored, later).is_none());

        let garbage = StoredToken {
            token: "garbage".to_string(),
            issuer: TokenIssuer::Api,
        };
        assert!(auth.authenticate(&garbage, Utc::now()).is_none());
    }

    #[tokio::test]
    async fn test_handoff_token_needs_key() {
        let auth = service("http://127.0.0.1:9");
        let stored = auth.login(&login_request("lan@shop.vn")).await;
        let user = auth.authenticate(&stored, Utc::now()).unwrap();
        assert!(auth.handoff_token(&user, Utc::now()).is_none());

        let key = b"handoff-key-handoff-key-handoff!";
        let auth = auth.with_handoff(TokenSigner::handoff(key).unwrap());
        let now = Utc::now();
        let token = auth.handoff_token(&user, now).unwrap();

        let admin_side = TokenSigner::handoff(key).unwrap();
        let carried = admin_side.accept(&token, now).unwrap();
        assert_eq!(carried.email.as_deref(), Some("lan@shop.vn"));
        assert_eq!(carried.name.as_deref(), Some("lan"));
        // The storefront session token is signed with another key.
        assert!(admin_side.accept(&stored.token, now).is_none());
        assert!(admin_side.accept(&token, now + chrono::Duration::minutes(2)).is_none());
    }
}
