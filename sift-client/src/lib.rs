//! Sift HTTP Client
//!
//! A small, type-safe HTTP client for the Sift review analysis API.
//!
//! # Example
//!
//! ```no_run
//! use sift_client::SiftClient;
//! use sift_core::dto::analysis::CollectAndAnalyzeRequest;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = SiftClient::new("http://localhost:3000");
//!
//!     let response = client
//!         .collect_and_analyze(&CollectAndAnalyzeRequest {
//!             question: Some("Is sizing accurate?".to_string()),
//!             product_url: Some("https://shop.example/p/123".to_string()),
//!             ..Default::default()
//!         })
//!         .await?;
//!
//!     println!("{}", response.answer);
//!     Ok(())
//! }
//! ```

pub mod error;
mod analysis;

// Re-export commonly used types
pub use error::{ClientError, Result};

use reqwest::Client;
use serde::de::DeserializeOwned;
use std::time::Duration;

/// Pipelines scrape, index and query in one request; allow them plenty of time
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(600);

/// HTTP client for the Sift API
#[derive(Debug, Clone)]
pub struct SiftClient {
    /// Base URL of the server (e.g., "http://localhost:3000")
    base_url: String,
    /// HTTP client instance
    client: Client,
}

impl SiftClient {
    /// Create a new client with [`DEFAULT_TIMEOUT`]
    ///
    /// # Example
    /// ```
    /// use sift_client::SiftClient;
    ///
    /// let client = SiftClient::new("http://localhost:3000");
    /// ```
    pub fn new(base_url: impl Into<String>) -> Self {
        let client = Client::builder()
            .timeout(DEFAULT_TIMEOUT)
            .build()
            .unwrap_or_else(|e| {
                tracing::warn!("Falling back to default HTTP client: {}", e);
                Client::new()
            });
        Self::with_client(base_url, client)
    }

    /// Create a new client with a custom HTTP client
    ///
    /// This allows you to configure timeouts, proxies, TLS settings, etc.
    pub fn with_client(base_url: impl Into<String>, client: Client) -> Self {
        let base_url = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        }
    }

    /// Get the base URL of the server
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    // =============================================================================
    // Response Handlers
    // =============================================================================

    /// Handle an API response and deserialize JSON
    ///
    /// Non-2xx responses become [`ClientError::Pipeline`] when the body is a
    /// Sift error body, so stage diagnostics reach the caller intact.
    async fn handle_response<T: DeserializeOwned>(&self, response: reqwest::Response) -> Result<T> {
        let status = response.status();

        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(ClientError::from_response_body(status.as_u16(), error_text));
        }

        response
            .json()
            .await
            .map_err(|e| ClientError::ParseError(format!("Failed to parse JSON response: {}", e)))
    }
}
