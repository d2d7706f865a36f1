//! Health check

use axum::{Json, Router, routing::get};
use serde_json::{Value, json};

use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health))
}

/// GET /health - public liveness check
async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
