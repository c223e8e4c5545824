//! Seed a REST API with the bundled sample data.
//!
//! Records are POSTed without ids so the API assigns its own.
//!
//! # Usage
//!
//! ```bash
//! shopfront seed --api http://localhost:3000
//! ```

use std::time::Duration;

use thiserror::Error;
use tracing::{info, warn};
use url::Url;

use shopfront_core::{Email, ProductPayload, SampleData, UserPayload};

/// Errors that stop seeding.
#[derive(Debug, Error)]
pub enum SeedError {
    #[error("API URL cannot take a path: {0}")]
    InvalidBaseUrl(Url),

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),
}

/// How many records were created and how many were refused.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SeedSummary {
    pub products: usize,
    pub users: usize,
    pub failed: usize,
}

fn endpoint(base: &Url, resource: &str) -> Result<Url, SeedError> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|()| SeedError::InvalidBaseUrl(base.clone()))?
        .pop_if_empty()
        .push(resource);
    Ok(url)
}

/// POST every sample product and user to `api`.
///
/// Individual rejections are logged and counted; transport errors abort.
///
/// # Errors
///
/// Returns an error if the API cannot be reached.
pub async fn run(api: &Url) -> Result<SeedSummary, SeedError> {
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(10))
        .build()?;
    let sample = SampleData::bundled();
    let mut summary = SeedSummary::default();

    let products_url = endpoint(api, "products")?;
    for product in sample.products() {
        let payload = ProductPayload {
            name: product.name.clone(),
            price: product.price,
            image: product.image.clone(),
            description: product.description.clone(),
        };
        let response = client.post(products_url.clone()).json(&payload).send().await?;
        if response.status().is_success() {
            summary.products += 1;
        } else {
            warn!(name = %product.name, status = %response.status(), "product rejected");
            summary.failed += 1;
        }
    }

    let users_url = endpoint(api, "users")?;
    for user in sample.users() {
        let Ok(email) = Email::parse(&user.email) else {
            warn!(email = %user.email, "skipping user with invalid email");
            summary.failed += 1;
            continue;
        };
        let payload = UserPayload {
            name: user.name.clone(),
            email,
        };
        let response = client.post(users_url.clone()).json(&payload).send().await?;
        if response.status().is_success() {
            summary.users += 1;
        } else {
            warn!(email = %user.email, status = %response.status(), "user rejected");
            summary.failed += 1;
        }
    }

    info!(
        products = summary.products,
        users = summary.users,
        failed = summary.failed,
        "seeding complete"
    );
    Ok(summary)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, Request, ResponseTemplate};

    use super::*;

    fn has_no_id(request: &Request) -> bool {
        serde_json::from_slice::<serde_json::Value>(&request.body)
            .is_ok_and(|body| body.get("id").is_none())
    }

    #[tokio::test]
    async fn test_run_posts_samples_and_counts_rejections() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/products"))
            .and(body_partial_json(serde_json::json!({"name": "Mũ lưỡi trai"})))
            .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({"error": "nope"})))
            .with_priority(1)
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/products"))
            .and(has_no_id)
            .respond_with(ResponseTemplate::new(201))
            .expect(11)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/users"))
            .and(has_no_id)
            .respond_with(ResponseTemplate::new(201))
            .expect(2)
            .mount(&server)
            .await;

        let api = Url::parse(&server.uri()).unwrap();
        let summary = run(&api).await.unwrap();
        assert_eq!(
            summary,
            SeedSummary {
                products: 11,
                users: 2,
                failed: 1,
            }
        );
    }

    #[tokio::test]
    async fn test_run_aborts_when_api_is_down() {
        let api = Url::parse("http://127.0.0.1:9").unwrap();
        assert!(matches!(run(&api).await, Err(SeedError::Http(_))));
    }

    #[test]
    fn test_endpoint_keeps_base_path() {
        let base = Url::parse("http://localhost:3000/api/").unwrap();
        assert_eq!(
            endpoint(&base, "products").unwrap().as_str(),
            "http://localhost:3000/api/products"
        );
    }

    #[test]
    fn test_endpoint_rejects_opaque_url() {
        let base = Url::parse("mailto:shop@example.com").unwrap();
        assert!(endpoint(&base, "users").is_err());
    }
}
