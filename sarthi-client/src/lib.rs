//! Sarthi HTTP Client
//!
//! A small, type-safe HTTP client for the Sarthi advisory backend.
//!
//! The poller and the CLI both talk to the backend through this crate, so
//! request building, authentication and error mapping live in one place.
//!
//! # Example
//!
//! ```no_run
//! use sarthi_client::ApiClient;
//! use sarthi_core::domain::job::JobId;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let client = ApiClient::new("http://localhost:5000/api/v1").with_bearer_token("secret");
//!
//!     let log = client.get_diagnosis_log(&JobId::from("7")).await?;
//!     println!("Diagnosis {} is {}", log.id, log.processing_status);
//!     Ok(())
//! }
//! ```

mod diagnostics;
pub mod error;

// Re-export commonly used types
pub use error::{ClientError, Result};

use reqwest::{Client, Method, RequestBuilder};
use serde::de::DeserializeOwned;

/// HTTP client for the Sarthi backend API
///
/// Cloning is cheap; the underlying connection pool is shared.
#[derive(Debug, Clone)]
pub struct ApiClient {
    /// Base URL of the API (e.g., "http://localhost:5000/api/v1")
    base_url: String,
    /// HTTP client instance
    client: Client,
    /// Bearer token sent with every request, if any
    token: Option<String>,
}

impl ApiClient {
    /// Create a new API client
    ///
    /// # Arguments
    /// * `base_url` - The base URL of the API (e.g., "http://localhost:5000/api/v1")
    ///
    /// # Example
    /// ```
    /// use sarthi_client::ApiClient;
    ///
    /// let client = ApiClient::new("http://localhost:5000/api/v1");
    /// ```
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(base_url, Client::new())
    }

    /// Create a new API client with a custom HTTP client
    ///
    /// This allows you to configure timeouts, proxies, TLS settings, etc.
    ///
    /// # Example
    /// ```
    /// use sarthi_client::ApiClient;
    /// use reqwest::Client;
    /// use std::time::Duration;
    ///
    /// let http_client = Client::builder()
    ///     .timeout(Duration::from_secs(30))
    ///     .build()
    ///     .unwrap();
    ///
    /// let client = ApiClient::with_client("http://localhost:5000/api/v1", http_client);
    /// ```
    pub fn with_client(base_url: impl Into<String>, client: Client) -> Self {
        let base_url = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
            token: None,
        }
    }

    /// Attach a bearer token to every request
    ///
    /// Where the token comes from is up to the caller.
    pub fn with_bearer_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Get the base URL of the API
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Whether requests carry a bearer token
    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    /// Start a request against an API path, with auth applied
    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        let builder = self
            .client
            .request(method, &url)
            .header(reqwest::header::ACCEPT, "application/json");

        match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    // =============================================================================
    // Response Handlers
    // =============================================================================

    /// Handle an API response and deserialize JSON
    ///
    /// This method checks the status code and returns an appropriate error if
    /// the request failed, or deserializes the response body if successful.
    async fn handle_response<T: DeserializeOwned>(&self, response: reqwest::Response) -> Result<T> {
        let status = response.status();

        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(ClientError::from_body(status.as_u16(), &error_text));
        }

        response
            .json()
            .await
            .map_err(|e| ClientError::ParseError(format!("Failed to parse JSON response: {}", e)))
    }
}
