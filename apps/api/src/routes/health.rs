use axum::Json;
use serde_json::{json, Value};

/// GET /health
/// Fixed status object; touches no other component.
pub async fn health_handler() -> Json<Value> {
    Json(json!({
        "status": "Server is running"
    }))
}
