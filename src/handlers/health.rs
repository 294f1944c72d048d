use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde_json::{json, Value};

use crate::state::AppState;

// GET /api/health
pub async fn health(State(state): State<Arc<AppState>>) -> Json<Value> {
    Json(json!({
        "success": true,
        "message": "Salon booking API is running",
        "storage": state.config.storage_backend.as_str(),
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}
