use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::models::{RuleViolation, ValidationError};
use crate::store::StoreError;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    BusinessRule(#[from] RuleViolation),

    #[error("booking not found: {0}")]
    NotFound(String),

    #[error("storage failure: {0}")]
    Storage(StoreError),

    #[error("configuration error: {0}")]
    Config(String),
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(id) => AppError::NotFound(id),
            StoreError::Rejected(rule) => AppError::BusinessRule(rule),
            other => AppError::Storage(other),
        }
    }
}

impl AppError {
    /// Stable machine-readable code carried in the `error` field.
    pub fn code(&self) -> &'static str {
        match self {
            AppError::Validation(_) => "validation_error",
            AppError::BusinessRule(_) => "business_rule_violation",
            AppError::NotFound(_) => "not_found",
            AppError::Storage(_) => "storage_failure",
            AppError::Config(_) => "configuration_error",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_) | AppError::BusinessRule(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Storage(_) | AppError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let message = match &self {
            AppError::Validation(_) | AppError::BusinessRule(_) => self.to_string(),
            AppError::NotFound(_) => "Booking not found".to_string(),
            AppError::Storage(e) => {
                tracing::error!(error = %e, "storage operation failed");
                "Storage operation failed".to_string()
            }
            AppError::Config(e) => {
                tracing::error!(error = %e, "configuration error");
                "Server misconfigured".to_string()
            }
        };

        let body = serde_json::json!({
            "success": false,
            "message": message,
            "error": self.code(),
        });
        (self.status(), axum::Json(body)).into_response()
    }
}
