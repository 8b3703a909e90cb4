//! vhd-proxy library
//!
//! Pass-through HTTP service in front of the VHD classification backend:
//! `/api/health` and `/api/predict` forward to the backend, `/sound/*` serves
//! the bundled example recordings.

pub mod api;
pub mod backend;
pub mod error;

pub use crate::backend::BackendClient;
pub use crate::error::{ProxyError, ProxyResult};

use axum::extract::DefaultBodyLimit;
use axum::Router;
use chrono::{DateTime, Utc};
use std::path::PathBuf;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Client bound to the classification backend
    pub backend: BackendClient,
    /// Directory served under `/sound`
    pub sound_dir: PathBuf,
    /// Maximum accepted request body size
    pub max_upload_bytes: usize,
    /// Service startup timestamp for uptime tracking
    pub startup_time: DateTime<Utc>,
}

impl AppState {
    pub fn new(backend: BackendClient, sound_dir: PathBuf, max_upload_bytes: usize) -> Self {
        Self {
            backend,
            sound_dir,
            max_upload_bytes,
            startup_time: Utc::now(),
        }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    let sound = ServeDir::new(&state.sound_dir);
    let body_limit = DefaultBodyLimit::max(state.max_upload_bytes);

    Router::new()
        .merge(api::proxy_routes())
        .merge(api::example_routes())
        .merge(api::health_routes())
        .with_state(state)
        .nest_service("/sound", sound)
        .layer(body_limit)
        .layer(TraceLayer::new_for_http())
        // Browser demo pages may be hosted on another origin
        .layer(CorsLayer::permissive())
}
