//! Example catalog endpoint
//!
//! Lists the bundled recordings; the audio itself is served from `/sound`.

use axum::{routing::get, Json, Router};
use vhd_common::catalog::{ExampleFile, EXAMPLE_FILES};

use crate::AppState;

/// GET /api/examples
pub async fn list_examples() -> Json<Vec<ExampleFile>> {
    Json(EXAMPLE_FILES.to_vec())
}

pub fn example_routes() -> Router<AppState> {
    Router::new().route("/api/examples", get(list_examples))
}
