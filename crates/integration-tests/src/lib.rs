//! Integration test harness for Shopfront.
//!
//! Every test gets its own mock REST API, storefront and admin, each bound
//! to an ephemeral port on localhost. Nothing external has to be running.
//!
//! ```rust,ignore
//! let ctx = TestContext::start().await;
//! let page = ctx.storefront_client().get(ctx.storefront("/products")).send().await?;
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::net::SocketAddr;
use std::time::Duration;

use axum::Router;
use secrecy::SecretString;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use url::Url;

use shopfront_admin::config::AdminConfig;
use shopfront_cli::mock_api::{MockApi, MockDb, serve};
use shopfront_core::TokenSigner;
use shopfront_storefront::config::StorefrontConfig;

const SESSION_SECRET: &str = "t7Qw2eR9yU4iO1pA6sD3fG8hJ5kL0zX";
const HANDOFF_SECRET: &str = "Lm4Nb7Vc2Xz9Qa1Ws5Ed8Rf3Tg6Yh0Uj";

/// Running servers for one test. Dropping the context stops them.
pub struct TestContext {
    pub api: MockApi,
    pub api_url: Url,
    pub storefront_addr: SocketAddr,
    pub admin_addr: SocketAddr,
    shutdown: Vec<oneshot::Sender<()>>,
}

impl TestContext {
    /// Start with the sample data seeded.
    ///
    /// # Panics
    ///
    /// Panics if a listener cannot be bound.
    pub async fn start() -> Self {
        Self::with_db(MockDb::seeded()).await
    }

    /// Start with the given records.
    ///
    /// # Panics
    ///
    /// Panics if a listener cannot be bound or an app cannot be configured.
    pub async fn with_db(db: MockDb) -> Self {
        Self::build(db, false).await
    }

    /// Start with the storefront sending logins on to the admin, both sharing
    /// a handoff key.
    ///
    /// # Panics
    ///
    /// Panics if a listener cannot be bound or an app cannot be configured.
    pub async fn linked() -> Self {
        Self::build(MockDb::seeded(), true).await
    }

    #[allow(clippy::expect_used)]
    async fn build(db: MockDb, linked: bool) -> Self {
        let mut shutdown = Vec::new();

        let signer = TokenSigner::new(b"integration-mock-key", chrono::Duration::hours(1))
            .expect("signer");
        let api = MockApi::new(db, signer);
        let (listener, api_addr) = bind().await;
        let (tx, rx) = oneshot::channel();
        shutdown.push(tx);
        let served = api.clone();
        tokio::spawn(async move {
            serve(listener, served, async {
                rx.await.ok();
            })
            .await
            .ok();
        });
        let api_url = Url::parse(&format!("http://{api_addr}")).expect("api url");

        let (admin_listener, admin_addr) = bind().await;
        let handoff = || linked.then(|| SecretString::from(HANDOFF_SECRET));

        let (listener, storefront_addr) = bind().await;
        let mut config = StorefrontConfig::new(
            format!("http://{storefront_addr}"),
            SecretString::from(SESSION_SECRET),
            api_url.clone(),
        );
        config.cache_ttl = Duration::from_millis(1);
        if linked {
            config.admin_url = Some(format!("http://{admin_addr}/"));
            config.handoff_secret = handoff();
        }
        let state = shopfront_storefront::state::AppState::new(config).expect("storefront state");
        shutdown.push(spawn(listener, shopfront_storefront::app(state)));

        let mut config = AdminConfig::new(
            format!("http://{admin_addr}"),
            SecretString::from(SESSION_SECRET),
            api_url.clone(),
        );
        config.handoff_secret = handoff();
        let state = shopfront_admin::state::AppState::new(config).expect("admin state");
        shutdown.push(spawn(admin_listener, shopfront_admin::app(state)));

        Self {
            api,
            api_url,
            storefront_addr,
            admin_addr,
            shutdown,
        }
    }

    #[must_use]
    pub fn storefront(&self, path: &str) -> String {
        format!("http://{}{path}", self.storefront_addr)
    }

    #[must_use]
    pub fn admin(&self, path: &str) -> String {
        format!("http://{}{path}", self.admin_addr)
    }

    #[must_use]
    pub fn api(&self, path: &str) -> String {
        format!("{}{}", self.api_url.as_str().trim_end_matches('/'), path)
    }

    /// A browser-like client: keeps cookies, does not follow redirects.
    ///
    /// # Panics
    ///
    /// Panics if the client cannot be built.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn browser() -> reqwest::Client {
        reqwest::Client::builder()
            .cookie_store(true)
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .expect("Failed to create HTTP client")
    }

    /// A browser signed in to the admin as `email`.
    ///
    /// # Panics
    ///
    /// Panics if the login request fails.
    #[allow(clippy::expect_used)]
    pub async fn admin_browser(&self, email: &str) -> reqwest::Client {
        let client = Self::browser();
        let response = client
            .post(self.admin("/auth/login"))
            .form(&[("email", email), ("password", "secret")])
            .send()
            .await
            .expect("admin login");
        assert!(response.status().is_redirection(), "login was not accepted");
        client
    }
}

impl Drop for TestContext {
    fn drop(&mut self) {
        for tx in self.shutdown.drain(..) {
            tx.send(()).ok();
        }
    }
}

#[allow(clippy::expect_used)]
async fn bind() -> (TcpListener, SocketAddr) {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("local addr");
    (listener, addr)
}

fn spawn(listener: TcpListener, app: Router) -> oneshot::Sender<()> {
    let (tx, rx) = oneshot::channel::<()>();
    tokio::spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(async {
                rx.await.ok();
            })
            .await
            .ok();
    });
    tx
}
