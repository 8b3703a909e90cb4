//! Error types for vhd-proxy
//!
//! Each variant renders the JSON body the demo client expects from the
//! corresponding pass-through route.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;
use vhd_common::api::{ErrorBody, UnhealthyBody};

/// Proxy error type
#[derive(Debug, Error)]
pub enum ProxyError {
    /// Backend `/health` answered with a non-2xx status
    #[error("Backend service unavailable (status {0})")]
    HealthUpstream(StatusCode),

    /// Backend `/health` could not be reached or returned unparsable JSON
    #[error("Failed to connect to backend service: {0}")]
    HealthConnect(String),

    /// Backend `/predict` answered with a non-2xx status
    #[error("Backend error: {}", .status.as_u16())]
    PredictUpstream { status: StatusCode, details: String },

    /// Backend `/predict` could not be reached or returned unparsable JSON
    #[error("Failed to connect to prediction service: {0}")]
    PredictConnect(String),

    /// Incoming request was not a readable multipart form (400)
    #[error("Invalid multipart form: {0}")]
    BadMultipart(String),

    /// Incoming upload exceeded the configured body limit (413)
    #[error("Upload too large: {0}")]
    UploadTooLarge(String),
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        match self {
            ProxyError::HealthUpstream(status) => (
                status,
                Json(UnhealthyBody::new("Backend service unavailable")),
            )
                .into_response(),
            ProxyError::HealthConnect(_) => (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(UnhealthyBody::new("Failed to connect to backend service")),
            )
                .into_response(),
            ProxyError::PredictUpstream { status, details } => (
                status,
                Json(ErrorBody::with_details(
                    format!("Backend error: {}", status.as_u16()),
                    details,
                )),
            )
                .into_response(),
            ProxyError::PredictConnect(_) => (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(ErrorBody::new("Failed to connect to prediction service")),
            )
                .into_response(),
            ProxyError::BadMultipart(details) => (
                StatusCode::BAD_REQUEST,
                Json(ErrorBody::with_details("Invalid multipart form", details)),
            )
                .into_response(),
            ProxyError::UploadTooLarge(details) => (
                StatusCode::PAYLOAD_TOO_LARGE,
                Json(ErrorBody::with_details("Upload too large", details)),
            )
                .into_response(),
        }
    }
}

/// Convert an upstream status code into the server's `StatusCode`
///
/// reqwest and axum depend on different `http` major versions, so the code
/// is carried across as a plain integer.
pub fn upstream_status(code: u16) -> StatusCode {
    StatusCode::from_u16(code).unwrap_or(StatusCode::BAD_GATEWAY)
}

/// Result type for proxy handlers
pub type ProxyResult<T> = Result<T, ProxyError>;
