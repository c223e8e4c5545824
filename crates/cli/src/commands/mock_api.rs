//! Run the in-memory mock REST API.
//!
//! # Usage
//!
//! ```bash
//! # Seeded with the bundled sample catalog
//! shopfront mock-api --port 3000
//!
//! # No records at all
//! shopfront mock-api --empty
//! ```

use std::net::{IpAddr, SocketAddr};

use chrono::Duration;
use tokio::net::TcpListener;

use shopfront_cli::mock_api::{MockApi, MockDb, MockApiError, serve};

/// Tokens from the mock's `/login` live this long.
const MOCK_TOKEN_TTL_HOURS: i64 = 24;

/// Bind and serve until Ctrl+C.
///
/// # Errors
///
/// Returns an error if the address cannot be bound or the server fails.
pub async fn run(host: IpAddr, port: u16, empty: bool) -> Result<(), Box<dyn std::error::Error>> {
    let db = if empty { MockDb::empty() } else { MockDb::seeded() };
    let api = MockApi::new(db, super::signer(Duration::hours(MOCK_TOKEN_TTL_HOURS))?);

    let listener = TcpListener::bind(SocketAddr::new(host, port))
        .await
        .map_err(MockApiError::from)?;

    serve(listener, api, async {
        tokio::signal::ctrl_c().await.ok();
        tracing::info!("Shutdown signal received");
    })
    .await?;
    Ok(())
}
