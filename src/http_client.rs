use reqwest::Client;
use std::time::Duration;

/// Build the shared `reqwest` client for Gemini calls.
///
/// Bounded request and connect times, with a small warm connection pool for
/// back-to-back calls against the same host.
pub(crate) fn build_api_client(timeout_secs: u64) -> Client {
    Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .connect_timeout(Duration::from_secs(10))
        .pool_max_idle_per_host(10)
        .pool_idle_timeout(Duration::from_secs(90))
        .tcp_keepalive(Duration::from_secs(60))
        .build()
        .unwrap_or_else(|_| Client::new())
}
