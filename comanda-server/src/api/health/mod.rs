//! Health check endpoint

use axum::{Json, Router, routing::get};
use chrono::Utc;
use serde_json::{Value, json};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().route("/api/health", get(health))
}

async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "timestamp": Utc::now(),
    }))
}
