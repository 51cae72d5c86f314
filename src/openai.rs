//! OpenAI client construction with sensible defaults.

use crate::config::Credentials;
use async_openai::{config::OpenAIConfig, Client};
use std::time::Duration;

/// Default timeout for OpenAI API requests (2 minutes).
const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Create an OpenAI client from explicit credentials.
///
/// The API key comes from the caller's [`Credentials`] rather than ambient
/// process state, and a timeout prevents hung API calls.
pub fn create_client(credentials: &Credentials) -> Client<OpenAIConfig> {
    create_client_with_timeout(credentials, Duration::from_secs(DEFAULT_TIMEOUT_SECS))
}

/// Create an OpenAI client with a custom timeout.
pub fn create_client_with_timeout(
    credentials: &Credentials,
    timeout: Duration,
) -> Client<OpenAIConfig> {
    let http_client = reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .expect("Failed to create HTTP client");

    let config = OpenAIConfig::new().with_api_key(&credentials.openai_api_key);
    Client::with_config(config).with_http_client(http_client)
}
