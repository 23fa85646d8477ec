//! Integration tests for Pawcase.
//!
//! # Running Tests
//!
//! ```bash
//! # Against an in-process server with memory storage (default)
//! cargo test -p pawcase-integration-tests
//!
//! # Against a running storefront
//! PAWCASE_TEST_URL=http://localhost:5000 cargo test -p pawcase-integration-tests
//! ```

use std::net::SocketAddr;

use reqwest::{Client, Response};
use serde_json::Value;

use pawcase_storefront::config::StorefrontConfig;
use pawcase_storefront::db::Stores;
use pawcase_storefront::middleware::memory_session_layer;
use pawcase_storefront::routes;
use pawcase_storefront::state::AppState;

/// Base URL and a cookie-carrying client for one test.
pub struct TestContext {
    pub base_url: String,
    pub client: Client,
}

impl TestContext {
    /// Use `PAWCASE_TEST_URL` if set, otherwise start an in-memory server.
    ///
    /// # Errors
    ///
    /// Returns an error if the listener cannot be bound or the client built.
    pub async fn new() -> Result<Self, Box<dyn std::error::Error>> {
        let base_url = match std::env::var("PAWCASE_TEST_URL") {
            Ok(url) if !url.is_empty() => url.trim_end_matches('/').to_owned(),
            _ => spawn_memory_server().await?,
        };
        Ok(Self {
            base_url,
            client: Self::client()?,
        })
    }

    /// A fresh client with its own cookie jar, for a second user.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn client() -> Result<Client, reqwest::Error> {
        Client::builder().cookie_store(true).build()
    }

    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }
}

/// Start the storefront with memory storage on an ephemeral port.
///
/// Returns the base URL.
///
/// # Errors
///
/// Returns an error if the listener cannot be bound.
pub async fn spawn_memory_server() -> Result<String, std::io::Error> {
    let config = StorefrontConfig::in_memory();
    let sessions = memory_session_layer(&config);
    let app = routes::app(AppState::new(config, Stores::memory()), sessions);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    tokio::spawn(async move {
        if let Err(e) = axum::serve(
            listener,
            app.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .await
        {
            #[allow(clippy::print_stderr)]
            {
                eprintln!("storefront test server on {addr} stopped: {e}");
            }
        }
    });

    Ok(format!("http://{addr}"))
}

/// An email address no other test uses.
#[must_use]
pub fn unique_email(prefix: &str) -> String {
    format!("{prefix}-{}@example.com", uuid::Uuid::new_v4().simple())
}

/// Status and JSON body of a response (`Null` when the body is empty).
///
/// # Errors
///
/// Returns an error if the body cannot be read.
pub async fn json_body(response: Response) -> Result<(reqwest::StatusCode, Value), reqwest::Error> {
    let status = response.status();
    let text = response.text().await?;
    Ok((status, serde_json::from_str(&text).unwrap_or(Value::Null)))
}
