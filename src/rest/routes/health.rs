use axum::Json;
use serde_json::{json, Value};

/// Liveness probe. Never checks store connectivity, so it answers 200 even
/// while the database is down. Point readiness checks at `GET /tasks`.
pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
