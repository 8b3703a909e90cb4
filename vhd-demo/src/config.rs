//! Client configuration
//!
//! Two base addresses: the classification API (`/health`, `/predict`) and the
//! site hosting the example recordings (`/sound/<file>`). Pointing the API
//! base at `<proxy>/api` routes through vhd-proxy; pointing it at the backend
//! talks to it directly.

use std::time::Duration;
use vhd_common::config::normalize_base_url;

const USER_AGENT: &str = concat!("vhd-demo/", env!("CARGO_PKG_VERSION"));

/// Explicitly constructed client configuration, passed to every component
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DemoConfig {
    pub api_base_url: String,
    pub site_base_url: String,
    /// `None` keeps the HTTP client default (no timeout)
    pub request_timeout: Option<Duration>,
}

impl DemoConfig {
    pub fn new(api_base_url: &str, site_base_url: &str) -> vhd_common::Result<Self> {
        Ok(Self {
            api_base_url: normalize_base_url(api_base_url)?,
            site_base_url: normalize_base_url(site_base_url)?,
            request_timeout: None,
        })
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    /// Build the HTTP client shared by the workflow components
    pub fn http_client(&self) -> reqwest::Result<reqwest::Client> {
        let mut builder = reqwest::Client::builder().user_agent(USER_AGENT);
        if let Some(timeout) = self.request_timeout {
            builder = builder.timeout(timeout);
        }
        builder.build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_normalizes_urls() {
        let config = DemoConfig::new("http://localhost:3000/api/", "http://localhost:3000").unwrap();
        assert_eq!(config.api_base_url, "http://localhost:3000/api");
        assert!(config.request_timeout.is_none());
    }

    #[test]
    fn test_new_rejects_bad_url() {
        assert!(DemoConfig::new("localhost:8001", "http://localhost:3000").is_err());
    }

    #[test]
    fn test_http_client_with_timeout() {
        let config = DemoConfig::new("http://localhost:8001", "http://localhost:3000")
            .unwrap()
            .with_timeout(Duration::from_secs(10));
        assert!(config.http_client().is_ok());
    }
}
