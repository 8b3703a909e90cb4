//! Test Helper Utilities
//!
//! Mock classification backend for vhd-demo integration tests

#![allow(dead_code)]

use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use vhd_demo::{DemoConfig, WorkflowController};

/// Canned prediction for `New_N_020.wav`
pub fn normal_prediction() -> Value {
    json!({
        "filename": "New_N_020.wav",
        "prediction": "N",
        "class_id": 4,
        "confidence": 0.91,
        "probabilities": {"AS": 0.02, "MR": 0.03, "MS": 0.01, "MVP": 0.03, "N": 0.91}
    })
}

/// Minimal RIFF/WAVE bytes
pub fn wav_bytes() -> Vec<u8> {
    let mut bytes = b"RIFF".to_vec();
    bytes.extend_from_slice(&36u32.to_le_bytes());
    bytes.extend_from_slice(b"WAVEfmt ");
    bytes.extend_from_slice(&[0u8; 24]);
    bytes
}

/// How the mock backend answers
#[derive(Debug, Clone)]
pub struct BackendBehavior {
    /// Body of `GET /health`
    pub health_body: Value,
    /// Plain-text `GET /health` body sent with 200 instead of `health_body`
    pub health_text: Option<&'static str>,
    /// Number of initial health checks answered with 503
    pub unhealthy_first: usize,
    /// Status of `POST /predict`; non-2xx answers with a plain-text body
    pub predict_status: StatusCode,
    /// Body of a successful `POST /predict`
    pub predict_body: Value,
    /// Delay before answering `POST /predict`
    pub predict_delay: Duration,
}

impl Default for BackendBehavior {
    fn default() -> Self {
        Self {
            health_body: json!({
                "status": "healthy",
                "model_loaded": true,
                "service": "VHD Audio Classification API",
                "version": "1.0.0"
            }),
            health_text: None,
            unhealthy_first: 0,
            predict_status: StatusCode::OK,
            predict_body: normal_prediction(),
            predict_delay: Duration::ZERO,
        }
    }
}

/// The `file` part of the last accepted `POST /predict`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReceivedUpload {
    pub filename: Option<String>,
    pub content_type: Option<String>,
    pub len: usize,
}

#[derive(Clone)]
struct MockState {
    behavior: BackendBehavior,
    health_calls: Arc<AtomicUsize>,
    predict_calls: Arc<AtomicUsize>,
    last_upload: Arc<Mutex<Option<ReceivedUpload>>>,
}

/// A running mock backend
pub struct MockBackend {
    pub base_url: String,
    health_calls: Arc<AtomicUsize>,
    predict_calls: Arc<AtomicUsize>,
    last_upload: Arc<Mutex<Option<ReceivedUpload>>>,
}

impl MockBackend {
    pub async fn spawn(behavior: BackendBehavior) -> Self {
        let health_calls = Arc::new(AtomicUsize::new(0));
        let predict_calls = Arc::new(AtomicUsize::new(0));
        let last_upload = Arc::new(Mutex::new(None));
        let state = MockState {
            behavior,
            health_calls: health_calls.clone(),
            predict_calls: predict_calls.clone(),
            last_upload: last_upload.clone(),
        };

        let router = Router::new()
            .route("/health", get(health))
            .route("/predict", post(predict))
            .route("/sound/:filename", get(sound))
            .with_state(state);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });

        Self {
            base_url: format!("http://{}", addr),
            health_calls,
            predict_calls,
            last_upload,
        }
    }

    pub async fn healthy() -> Self {
        Self::spawn(BackendBehavior::default()).await
    }

    pub fn health_calls(&self) -> usize {
        self.health_calls.load(Ordering::SeqCst)
    }

    pub fn predict_calls(&self) -> usize {
        self.predict_calls.load(Ordering::SeqCst)
    }

    pub fn last_upload(&self) -> Option<ReceivedUpload> {
        self.last_upload.lock().unwrap().clone()
    }

    /// Controller using this backend for both the API and `/sound`
    pub fn controller(&self) -> WorkflowController {
        let config = DemoConfig::new(&self.base_url, &self.base_url).unwrap();
        WorkflowController::new(&config).unwrap()
    }
}

async fn health(State(state): State<MockState>) -> Response {
    let call = state.health_calls.fetch_add(1, Ordering::SeqCst);
    if call < state.behavior.unhealthy_first {
        return (StatusCode::SERVICE_UNAVAILABLE, "starting up").into_response();
    }
    if let Some(text) = state.behavior.health_text {
        return (StatusCode::OK, text).into_response();
    }
    Json(state.behavior.health_body.clone()).into_response()
}

/// Mirrors the backend: the audio must arrive in the multipart field `file`
async fn predict(State(state): State<MockState>, mut multipart: Multipart) -> Response {
    state.predict_calls.fetch_add(1, Ordering::SeqCst);

    let mut upload = None;
    while let Ok(Some(field)) = multipart.next_field().await {
        if field.name() != Some("file") {
            continue;
        }
        let filename = field.file_name().map(str::to_string);
        let content_type = field.content_type().map(str::to_string);
        let len = field.bytes().await.map(|b| b.len()).unwrap_or(0);
        upload = Some(ReceivedUpload {
            filename,
            content_type,
            len,
        });
    }
    let Some(upload) = upload else {
        return (StatusCode::UNPROCESSABLE_ENTITY, "field `file` missing").into_response();
    };
    *state.last_upload.lock().unwrap() = Some(upload);

    if !state.behavior.predict_delay.is_zero() {
        tokio::time::sleep(state.behavior.predict_delay).await;
    }
    if !state.behavior.predict_status.is_success() {
        return (state.behavior.predict_status, "inference failed").into_response();
    }
    Json(state.behavior.predict_body.clone()).into_response()
}

async fn sound(Path(filename): Path<String>) -> Response {
    if vhd_common::catalog::find_example(&filename).is_some() {
        ([("content-type", "audio/wav")], wav_bytes()).into_response()
    } else {
        StatusCode::NOT_FOUND.into_response()
    }
}

/// Base URL of a port nothing listens on
pub async fn unreachable_url() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}", addr)
}
