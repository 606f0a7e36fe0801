//! HTTP client construction (headers, pooling, retry middleware).

use std::time::Duration;

use reqwest::Client;
use reqwest::header::{ACCEPT, HeaderMap, HeaderValue};
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_retry::{RetryTransientMiddleware, policies::ExponentialBackoff};

use crate::config::{Config, api};

/// User agent sent with every request; carries the contact address when set.
pub(crate) fn user_agent(config: &Config) -> String {
    match &config.mailto {
        Some(mailto) => format!("research-metrics/{} (mailto:{})", env!("CARGO_PKG_VERSION"), mailto),
        None => format!("research-metrics/{}", env!("CARGO_PKG_VERSION")),
    }
}

/// Build the pooled reqwest client wrapped in transient-retry middleware.
pub(crate) fn build_http_client(config: &Config) -> anyhow::Result<ClientWithMiddleware> {
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

    let client = Client::builder()
        .default_headers(headers)
        .user_agent(user_agent(config))
        .timeout(config.request_timeout)
        .connect_timeout(config.connect_timeout)
        .pool_max_idle_per_host(api::MAX_KEEPALIVE)
        .pool_idle_timeout(api::KEEPALIVE_EXPIRY)
        .gzip(true)
        .build()?;

    let retry_policy = ExponentialBackoff::builder()
        .retry_bounds(Duration::from_millis(500), Duration::from_secs(30))
        .build_with_max_retries(config.max_retries);

    Ok(ClientBuilder::new(client)
        .with(RetryTransientMiddleware::new_with_policy(retry_policy))
        .build())
}
