//! Shopfront admin library.
//!
//! Dashboard plus product and user management over the same REST API the
//! storefront reads. List tables search, filter and page in place through
//! HTMX fragments. Reads fall back to the bundled sample data when the API
//! is down; writes never do.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod api;
pub mod components;
pub mod config;
pub mod error;
pub mod filters;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;

use axum::extract::State;
use axum::http::StatusCode;
use axum::{Router, middleware::from_fn, routing::get};
use tower_http::services::ServeDir;
use tower_http::trace::{DefaultOnResponse, OnResponse, TraceLayer};
use tracing::Span;

use crate::middleware::{create_session_layer, request_id_middleware};
use crate::state::AppState;

const STATIC_DIR: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/static");

/// Build the full admin router. Sentry layers are added by the binary.
pub fn app(state: AppState) -> Router {
    let session_layer = create_session_layer(state.config());

    Router::new()
        .route("/health", get(health))
        .route("/health/ready", get(readiness))
        .merge(routes::routes())
        .nest_service("/static", ServeDir::new(STATIC_DIR))
        .layer(session_layer)
        .layer(from_fn(request_id_middleware))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &axum::http::Request<_>| {
                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        uri = %request.uri(),
                        request_id = tracing::field::Empty,
                        status = tracing::field::Empty,
                        latency_ms = tracing::field::Empty,
                    )
                })
                .on_response(
                    |response: &axum::http::Response<_>,
                     latency: std::time::Duration,
                     span: &Span| {
                        span.record("status", response.status().as_u16());
                        span.record(
                            "latency_ms",
                            u64::try_from(latency.as_millis()).unwrap_or(u64::MAX),
                        );
                        DefaultOnResponse::default().on_response(response, latency, span);
                    },
                ),
        )
        .with_state(state)
}

/// Liveness health check endpoint.
async fn health() -> &'static str {
    "ok"
}

/// Readiness: 503 while the REST API does not answer.
async fn readiness(State(state): State<AppState>) -> StatusCode {
    if state.store().api_ready().await {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::body::{Body, to_bytes};
    use axum::http::{Request, header};
    use axum::response::Response;
    use secrecy::SecretString;
    use tower::ServiceExt;
    use url::Url;

    use super::*;
    use crate::config::AdminConfig;

    const HANDOFF_KEY: &str = "hX3kP9mQ2wL7vB4nR8tY1cF6jD0sG5aZ";

    fn offline_config() -> AdminConfig {
        // Nothing listens on the discard port, so the API is "down".
        let mut config = AdminConfig::new(
            "http://localhost:8081",
            SecretString::from("p4Vn8sQ2xK7mW1zR5tY9bH3cJ6fL0dG"),
            Url::parse("http://127.0.0.1:9").unwrap(),
        );
        config.api.timeout = std::time::Duration::from_millis(200);
        config
    }

    fn offline_app() -> Router {
        app(AppState::new(offline_config()).unwrap())
    }

    fn handoff_app() -> Router {
        let mut config = offline_config();
        config.handoff_secret = Some(SecretString::from(HANDOFF_KEY));
        app(AppState::new(config).unwrap())
    }

    fn handoff_token(key: &str, now: chrono::DateTime<chrono::Utc>) -> String {
        shopfront_core::TokenSigner::handoff(key.as_bytes())
            .unwrap()
            .fabricate(
                &shopfront_core::Identity {
                    email: "lan@shop.vn".to_string(),
                    name: "Lan".to_string(),
                },
                now,
            )
    }

    async fn body_text(response: Response) -> String {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    fn session_cookie(response: &Response) -> String {
        let raw = response.headers()[header::SET_COOKIE].to_str().unwrap();
        raw.split(';').next().unwrap().to_string()
    }

    /// Sign in against the offline app and return the session cookie.
    async fn sign_in(app: &Router) -> String {
        let response = app
            .clone()
            .oneshot(
                Request::post("/auth/login")
                    .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                    .body(Body::from("email=admin%40example.com&password=secret"))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert!(response.status().is_redirection());
        assert_eq!(response.headers()[header::LOCATION], "/");
        session_cookie(&response)
    }

    async fn get(app: &Router, uri: &str, cookie: &str) -> Response {
        app.clone()
            .oneshot(
                Request::get(uri)
                    .header(header::COOKIE, cookie)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let response = offline_app()
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().contains_key("x-request-id"));
    }

    #[tokio::test]
    async fn test_readiness_reports_api_down() {
        let response = offline_app()
            .oneshot(Request::get("/health/ready").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn test_dashboard_requires_login() {
        let response = offline_app()
            .oneshot(Request::get("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert!(response.status().is_redirection());
        assert_eq!(response.headers()[header::LOCATION], "/auth/login");
    }

    #[tokio::test]
    async fn test_htmx_without_login_is_unauthorized() {
        let response = offline_app()
            .oneshot(
                Request::get("/products/table")
                    .header("hx-request", "true")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_login_validation_errors_rerender() {
        let response = offline_app()
            .oneshot(
                Request::post("/auth/login")
                    .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                    .body(Body::from("email=not-an-email&password="))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert!(body_text(response).await.contains("field-error"));
    }

    #[tokio::test]
    async fn test_dashboard_offline_shows_zero_counts() {
        let app = offline_app();
        let cookie = sign_in(&app).await;

        let response = get(&app, "/", &cookie).await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_text(response).await;
        assert!(body.contains("Signed in as"));
        assert!(body.contains("No products yet"));
        assert!(body.contains("View site"));
    }

    #[tokio::test]
    async fn test_products_offline_fall_back_to_sample_first_page() {
        let app = offline_app();
        let cookie = sign_in(&app).await;

        let response = get(&app, "/products?page=2&per_page=6", &cookie).await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_text(response).await;
        assert!(body.contains("Showing sample products"));
        assert!(body.contains("id=\"products-table\""));
        assert!(body.contains("/products/1/edit"));
    }

    #[tokio::test]
    async fn test_products_table_fragment_has_no_chrome() {
        let app = offline_app();
        let cookie = sign_in(&app).await;

        let response = get(&app, "/products/table?q=zzzz-nothing", &cookie).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()["hx-push-url"],
            "/products?page=1&per_page=6&q=zzzz-nothing"
        );
        let body = body_text(response).await;
        assert!(!body.contains("<html"));
        assert!(body.contains("No products yet"));
    }

    #[tokio::test]
    async fn test_users_htmx_returns_table_only() {
        let app = offline_app();
        let cookie = sign_in(&app).await;

        let response = app
            .clone()
            .oneshot(
                Request::get("/users")
                    .header(header::COOKIE, &cookie)
                    .header("hx-request", "true")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_text(response).await;
        assert!(body.starts_with("<div id=\"users-table\""));
        assert!(body.contains("Showing sample users"));
    }

    #[tokio::test]
    async fn test_create_while_offline_flashes_failure() {
        let app = offline_app();
        let cookie = sign_in(&app).await;

        let response = app
            .clone()
            .oneshot(
                Request::post("/products")
                    .header(header::COOKIE, &cookie)
                    .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                    .body(Body::from("name=Mug&price=90000&image=&description="))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert!(response.status().is_redirection());
        assert_eq!(response.headers()[header::LOCATION], "/products");

        let body = body_text(get(&app, "/products", &cookie).await).await;
        assert!(body.contains("API unreachable, changes not saved"));
    }

    #[tokio::test]
    async fn test_create_validation_errors_rerender() {
        let app = offline_app();
        let cookie = sign_in(&app).await;

        let response = app
            .clone()
            .oneshot(
                Request::post("/products")
                    .header(header::COOKIE, &cookie)
                    .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                    .body(Body::from("name=&price=-5"))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let body = body_text(response).await;
        assert!(body.contains("Name is required"));
        assert!(body.contains("Price must be a non-negative number"));
    }

    #[tokio::test]
    async fn test_edit_unknown_product_is_404() {
        let app = offline_app();
        let cookie = sign_in(&app).await;

        let response = get(&app, "/products/9999/edit", &cookie).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_handoff_signs_in_without_second_login() {
        let app = handoff_app();
        let token = handoff_token(HANDOFF_KEY, chrono::Utc::now());

        let response = app
            .clone()
            .oneshot(
                Request::get(format!("/auth/handoff?token={}", urlencoding::encode(&token)))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert!(response.status().is_redirection());
        assert_eq!(response.headers()[header::LOCATION], "/");
        let cookie = session_cookie(&response);

        let response = get(&app, "/", &cookie).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert!(body_text(response).await.contains("Signed in as Lan"));
    }

    #[tokio::test]
    async fn test_handoff_rejects_bad_tokens() {
        let stale = handoff_token(HANDOFF_KEY, chrono::Utc::now() - chrono::Duration::minutes(5));
        let foreign = handoff_token("zZ9yY8xX7wW6vV5uU4tT3sS2rR1qQ0pP", chrono::Utc::now());
        let fresh = handoff_token(HANDOFF_KEY, chrono::Utc::now());

        let cases = [
            (handoff_app(), format!("/auth/handoff?token={stale}")),
            (handoff_app(), format!("/auth/handoff?token={foreign}")),
            (handoff_app(), "/auth/handoff".to_string()),
            (offline_app(), format!("/auth/handoff?token={fresh}")),
        ];
        for (app, uri) in cases {
            let response = app
                .clone()
                .oneshot(Request::get(uri.as_str()).body(Body::empty()).unwrap())
                .await
                .unwrap();
            assert_eq!(response.headers()[header::LOCATION], "/auth/login", "{uri}");
            let cookie = session_cookie(&response);

            let body = body_text(get(&app, "/auth/login", &cookie).await).await;
            assert!(body.contains("Sign-in link expired or invalid"), "{uri}");
            let dashboard = get(&app, "/", &cookie).await;
            assert_eq!(dashboard.headers()[header::LOCATION], "/auth/login", "{uri}");
        }
    }

    #[tokio::test]
    async fn test_logout_returns_to_login() {
        let app = offline_app();
        let cookie = sign_in(&app).await;

        let response = app
            .clone()
            .oneshot(
                Request::post("/auth/logout")
                    .header(header::COOKIE, &cookie)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.headers()[header::LOCATION], "/auth/login");
    }
}
