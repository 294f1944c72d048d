pub mod bookings;
pub mod catalog;
pub mod health;

use std::sync::Arc;

use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post, put};
use axum::{Json, Router};
use serde::Serialize;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Envelope wrapped around every successful response.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pagination: Option<bookings::Pagination>,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            message: None,
            data: Some(data),
            pagination: None,
        }
    }

    pub fn with_message(message: &str, data: T) -> Self {
        Self {
            message: Some(message.to_string()),
            ..Self::ok(data)
        }
    }
}

impl ApiResponse<()> {
    pub fn message_only(message: &str) -> Self {
        Self {
            success: true,
            message: Some(message.to_string()),
            data: None,
            pagination: None,
        }
    }
}

pub fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/health", get(health::health))
        .route("/api/services", get(catalog::list_services))
        .route("/api/bookings", post(bookings::create).get(bookings::list))
        .route("/api/bookings/stats/dashboard", get(bookings::dashboard))
        .route(
            "/api/bookings/:id",
            get(bookings::get_booking).delete(bookings::delete_booking),
        )
        .route("/api/bookings/:id/confirm", put(bookings::confirm))
        .route("/api/bookings/:id/cancel", put(bookings::cancel))
        .route("/api/bookings/:id/reschedule", put(bookings::reschedule))
        .route("/api/bookings/:id/complete", put(bookings::complete))
        .route("/api/bookings/:id/call-update", put(bookings::call_update))
        .route("/api/bookings/:id/payment-update", put(bookings::payment_update))
        .route("/api/bookings/:id/feedback", put(bookings::feedback))
        .fallback(route_not_found)
        .with_state(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

async fn route_not_found() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(serde_json::json!({
            "success": false,
            "message": "Route not found",
            "error": "not_found",
        })),
    )
}
