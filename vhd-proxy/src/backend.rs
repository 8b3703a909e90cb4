//! Classification backend client
//!
//! Single-hop forwarding to `<backend>/health` and `<backend>/predict`.
//! No retry, no caching: every proxy request maps to exactly one backend call.

use reqwest::header::ACCEPT;
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

use crate::error::{upstream_status, ProxyError};

const USER_AGENT: &str = concat!("vhd-proxy/", env!("CARGO_PKG_VERSION"));

/// HTTP client bound to one backend base address
#[derive(Clone)]
pub struct BackendClient {
    http_client: reqwest::Client,
    base_url: String,
}

impl BackendClient {
    /// Create a client; `timeout` of `None` keeps the reqwest default (no timeout)
    pub fn new(base_url: impl Into<String>, timeout: Option<Duration>) -> reqwest::Result<Self> {
        let mut builder = reqwest::Client::builder().user_agent(USER_AGENT);
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            http_client: builder.build()?,
            base_url: base_url.into(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// GET `<backend>/health` and return its JSON body unchanged
    pub async fn health(&self) -> Result<Value, ProxyError> {
        let url = format!("{}/health", self.base_url);
        debug!(url = %url, "Forwarding health check");

        let response = self
            .http_client
            .get(&url)
            .header(ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| ProxyError::HealthConnect(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ProxyError::HealthUpstream(upstream_status(status.as_u16())));
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| ProxyError::HealthConnect(e.to_string()))
    }

    /// POST a multipart form to `<backend>/predict` and return its JSON body unchanged
    pub async fn predict(&self, form: reqwest::multipart::Form) -> Result<Value, ProxyError> {
        let url = format!("{}/predict", self.base_url);
        debug!(url = %url, "Forwarding prediction request");

        let response = self
            .http_client
            .post(&url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| ProxyError::PredictConnect(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let details = response.text().await.unwrap_or_default();
            return Err(ProxyError::PredictUpstream {
                status: upstream_status(status.as_u16()),
                details,
            });
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| ProxyError::PredictConnect(e.to_string()))
    }
}
