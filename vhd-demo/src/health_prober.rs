//! Backend health probe
//!
//! One bounded GET to `<api>/health`. The backend is available iff it answers
//! 2xx with `status == "healthy"` and `model_loaded == true`; everything else
//! is `Unavailable`. No retry: the caller decides whether to probe again.

use reqwest::header::ACCEPT;
use thiserror::Error;
use tracing::debug;
use vhd_common::api::HealthStatus;

/// Health probe errors
#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("Service unavailable: {0}")]
    Unavailable(String),
}

/// Health prober bound to one API base address
#[derive(Debug, Clone)]
pub struct HealthProber {
    http_client: reqwest::Client,
    health_url: String,
}

impl HealthProber {
    pub fn new(http_client: reqwest::Client, api_base_url: &str) -> Self {
        Self {
            http_client,
            health_url: format!("{}/health", api_base_url),
        }
    }

    /// Probe the backend once
    ///
    /// Idempotent; safe to call repeatedly.
    pub async fn probe(&self) -> Result<HealthStatus, ProbeError> {
        debug!(url = %self.health_url, "Probing backend health");

        let response = self
            .http_client
            .get(&self.health_url)
            .header(ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| ProbeError::Unavailable(format!("request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ProbeError::Unavailable(format!(
                "health endpoint returned {}",
                status.as_u16()
            )));
        }

        let health: HealthStatus = response
            .json()
            .await
            .map_err(|e| ProbeError::Unavailable(format!("malformed health response: {}", e)))?;

        if !health.is_available() {
            return Err(ProbeError::Unavailable(format!(
                "backend reports status={:?}, model_loaded={}",
                health.status, health.model_loaded
            )));
        }

        debug!(service = %health.service, version = %health.version, "Backend available");
        Ok(health)
    }
}
