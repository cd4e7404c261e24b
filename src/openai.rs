//! Clients for OpenAI-compatible endpoints.
//!
//! Both the embeddings provider and the chat-completion provider speak the
//! OpenAI wire format, so a single constructor covers them; only the base URL,
//! key and timeout differ.

use crate::error::{RagError, Result};
use async_openai::{config::OpenAIConfig, Client};
use std::time::Duration;

/// Default timeout for API requests (5 minutes).
pub const DEFAULT_TIMEOUT_SECS: u64 = 300;

/// Connection parameters for an OpenAI-compatible API.
#[derive(Debug, Clone)]
pub struct Endpoint {
    pub api_base: String,
    pub api_key: String,
    pub timeout: Duration,
}

impl Endpoint {
    pub fn new(api_base: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            api_base: api_base.into(),
            api_key: api_key.into(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Create a client for the given endpoint.
///
/// The client never retries: a rate-limited request fails immediately and the
/// error reaches the caller.
pub fn create_client(endpoint: &Endpoint) -> Result<Client<OpenAIConfig>> {
    let http_client = reqwest::Client::builder()
        .timeout(endpoint.timeout)
        .build()
        .map_err(|e| RagError::Config(format!("Failed to create HTTP client: {}", e)))?;

    let config = OpenAIConfig::new()
        .with_api_base(endpoint.api_base.trim_end_matches('/'))
        .with_api_key(endpoint.api_key.clone());

    Ok(Client::with_config(config)
        .with_http_client(http_client)
        .with_backoff(no_retry()))
}

fn no_retry() -> backoff::ExponentialBackoff {
    backoff::ExponentialBackoffBuilder::new()
        .with_max_elapsed_time(Some(Duration::ZERO))
        .build()
}

/// Read an API key from the named environment variable.
///
/// Returns `None` when the variable is unset or blank.
pub fn api_key_from_env(var: &str) -> Option<String> {
    std::env::var(var)
        .ok()
        .map(|k| k.trim().to_string())
        .filter(|k| !k.is_empty())
}
