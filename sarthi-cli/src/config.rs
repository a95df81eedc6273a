//! Configuration module
//!
//! Handles CLI configuration: where the API lives and how to authenticate.

use sarthi_client::ApiClient;

/// CLI configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the Sarthi API
    pub api_url: String,

    /// Bearer token for authenticated endpoints
    pub token: Option<String>,
}

impl Config {
    /// Build an API client for this configuration
    pub fn client(&self) -> ApiClient {
        let client = ApiClient::new(&self.api_url);
        match &self.token {
            Some(token) => client.with_bearer_token(token),
            None => client,
        }
    }
}
