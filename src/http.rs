use std::time::Duration;

use reqwest::Client;

const APP_USER_AGENT: &str = concat!("packmint/", env!("CARGO_PKG_VERSION"));

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Build the shared HTTP client used by providers and the resolver.
pub fn build_http_client() -> Result<Client, reqwest::Error> {
    build_http_client_with_timeout(DEFAULT_TIMEOUT)
}

/// Same as [`build_http_client`] but with a caller-chosen request timeout.
pub fn build_http_client_with_timeout(timeout: Duration) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(APP_USER_AGENT)
        .timeout(timeout)
        .build()
}
