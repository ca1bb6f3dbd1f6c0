//! `GET /health` (spec §6): liveness probe, no dependency checks.

use axum::Json;
use serde_json::{json, Value};

pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
