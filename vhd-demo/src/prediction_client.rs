//! Prediction client
//!
//! Sends an [`UploadCandidate`] as multipart field `file` to `<api>/predict`
//! and parses the backend's JSON reply. One POST per call, no retry.

use thiserror::Error;
use tracing::{debug, info};
use vhd_common::api::PredictionResult;

use crate::file_intake::UploadCandidate;

/// Shown for any failure that is not an HTTP status from the backend
pub const CONNECTION_ERROR_MESSAGE: &str = "Failed to analyze audio. Please try again.";

/// Prediction client errors
#[derive(Debug, Error)]
pub enum PredictError {
    /// Backend answered with a non-2xx status
    #[error("Server error: {status}")]
    ServerError { status: u16, body: String },

    /// Request could not complete, or the reply was not a prediction
    #[error("Connection error: {0}")]
    ConnectionError(String),
}

impl PredictError {
    /// Message surfaced to the user
    pub fn user_message(&self) -> String {
        match self {
            PredictError::ServerError { status, .. } => format!("Server error: {}", status),
            PredictError::ConnectionError(_) => CONNECTION_ERROR_MESSAGE.to_string(),
        }
    }
}

/// Prediction client bound to one API base address
#[derive(Debug, Clone)]
pub struct PredictionClient {
    http_client: reqwest::Client,
    predict_url: String,
}

impl PredictionClient {
    pub fn new(http_client: reqwest::Client, api_base_url: &str) -> Self {
        Self {
            http_client,
            predict_url: format!("{}/predict", api_base_url),
        }
    }

    /// Submit one candidate for classification
    ///
    /// The parsed result is returned as-is: `prediction` is not checked
    /// against the argmax of `probabilities`.
    pub async fn predict(&self, candidate: &UploadCandidate) -> Result<PredictionResult, PredictError> {
        let part = reqwest::multipart::Part::bytes(candidate.bytes().to_vec())
            .file_name(candidate.original_name().to_string())
            .mime_str(candidate.mime_type())
            .map_err(|e| PredictError::ConnectionError(e.to_string()))?;
        let form = reqwest::multipart::Form::new().part("file", part);

        debug!(
            url = %self.predict_url,
            filename = %candidate.original_name(),
            bytes = candidate.bytes().len(),
            "Submitting prediction request"
        );

        let response = self
            .http_client
            .post(&self.predict_url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| PredictError::ConnectionError(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(PredictError::ServerError {
                status: status.as_u16(),
                body,
            });
        }

        let result: PredictionResult = response
            .json()
            .await
            .map_err(|e| PredictError::ConnectionError(e.to_string()))?;

        info!(
            filename = %result.filename,
            prediction = %result.prediction,
            confidence = result.confidence,
            "Prediction received"
        );
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_error_message_contains_status() {
        let err = PredictError::ServerError {
            status: 500,
            body: "Internal Server Error".to_string(),
        };
        assert_eq!(err.user_message(), "Server error: 500");
        assert_eq!(err.to_string(), "Server error: 500");
    }

    #[test]
    fn test_connection_error_message_is_generic() {
        let err = PredictError::ConnectionError("connection refused".to_string());
        assert_eq!(err.user_message(), CONNECTION_ERROR_MESSAGE);
    }

    #[tokio::test]
    async fn test_unreachable_backend_is_connection_error() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = PredictionClient::new(reqwest::Client::new(), &format!("http://{}", addr));
        let candidate = UploadCandidate::new("a.wav", "audio/wav", b"RIFF".to_vec()).unwrap();

        let err = client.predict(&candidate).await.unwrap_err();
        assert!(matches!(err, PredictError::ConnectionError(_)));
    }
}
