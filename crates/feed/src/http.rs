use reqwest::Client;
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use std::time::Duration;
use tickwatch_core::config::FeedConfig;
use tickwatch_core::market::error::MarketError;

/// # Summary
/// Builds the HTTP client shared by both providers.
///
/// # Logic
/// 1. Sends a browser User-Agent, both sites reject the reqwest default.
/// 2. Bounds every request by `timeout_secs`.
pub(crate) fn build_client(cfg: &FeedConfig) -> Result<Client, MarketError> {
    let mut headers = HeaderMap::new();
    let agent = HeaderValue::from_str(&cfg.user_agent)
        .map_err(|e| MarketError::Unknown(format!("invalid user agent: {}", e)))?;
    headers.insert(USER_AGENT, agent);

    Client::builder()
        .timeout(Duration::from_secs(cfg.timeout_secs))
        .default_headers(headers)
        .build()
        .map_err(|e| MarketError::Network(format!("failed to build HTTP client: {}", e)))
}
