//! Backend pass-through routes
//!
//! `GET /api/health` and `POST /api/predict` forward to the classification
//! backend and relay its JSON body. Failures are rendered by `ProxyError`.

use axum::{
    extract::{
        multipart::{MultipartError, MultipartRejection},
        Multipart, State,
    },
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde_json::Value;
use tracing::{info, warn};

use crate::error::{ProxyError, ProxyResult};
use crate::AppState;

/// GET /api/health
pub async fn backend_health(State(state): State<AppState>) -> ProxyResult<Json<Value>> {
    match state.backend.health().await {
        Ok(body) => Ok(Json(body)),
        Err(e) => {
            warn!("Backend health check failed: {}", e);
            Err(e)
        }
    }
}

/// POST /api/predict
///
/// Every incoming form field is re-encoded as-is (name, filename, content
/// type, bytes); the backend reads the audio from the `file` field.
pub async fn predict(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> ProxyResult<Json<Value>> {
    let mut multipart = multipart.map_err(|e| ProxyError::BadMultipart(e.to_string()))?;
    let form = rebuild_form(&mut multipart).await?;

    match state.backend.predict(form).await {
        Ok(body) => {
            info!(
                prediction = %body.get("prediction").and_then(serde_json::Value::as_str).unwrap_or("?"),
                "Prediction forwarded"
            );
            Ok(Json(body))
        }
        Err(e) => {
            warn!("Prediction forwarding failed: {}", e);
            Err(e)
        }
    }
}

/// Body-limit overruns keep their 413; anything else is a malformed form
fn field_error(e: MultipartError) -> ProxyError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ProxyError::UploadTooLarge(e.to_string())
    } else {
        ProxyError::BadMultipart(e.to_string())
    }
}

async fn rebuild_form(multipart: &mut Multipart) -> ProxyResult<reqwest::multipart::Form> {
    let mut form = reqwest::multipart::Form::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(field_error)?
    {
        let name = field.name().unwrap_or_default().to_string();
        let file_name = field.file_name().map(str::to_string);
        let content_type = field.content_type().map(str::to_string);
        let bytes = field.bytes().await.map_err(field_error)?;

        let mut part = reqwest::multipart::Part::bytes(bytes.to_vec());
        if let Some(file_name) = file_name {
            part = part.file_name(file_name);
        }
        if let Some(content_type) = content_type {
            part = part
                .mime_str(&content_type)
                .map_err(|e| ProxyError::BadMultipart(e.to_string()))?;
        }
        form = form.part(name, part);
    }

    Ok(form)
}

/// Build pass-through routes
pub fn proxy_routes() -> Router<AppState> {
    Router::new()
        .route("/api/health", get(backend_health))
        .route("/api/predict", post(predict))
}
