use std::sync::Arc;

use axum::extract::State;
use axum::Json;

use super::ApiResponse;
use crate::models::ServiceOffering;
use crate::state::AppState;

// GET /api/services
pub async fn list_services(
    State(state): State<Arc<AppState>>,
) -> Json<ApiResponse<Vec<ServiceOffering>>> {
    Json(ApiResponse::ok(state.bookings.catalog().services().to_vec()))
}
