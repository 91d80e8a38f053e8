//! Unified Error Handling
//!
//! Application-wide error type and the JSON response envelope every handler
//! returns. Engine and repository errors convert into `AppError` at the HTTP
//! boundary; the payout batch path aggregates instead (see `engine::executor`).

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use tracing::error;

use crate::db::repository::RepoError;
use crate::engine::EngineError;

/// Unified API response structure
#[derive(Debug, Serialize)]
pub struct AppResponse<T> {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

/// Application-level error type
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    // ========== Authentication Errors ==========
    #[error("Authentication required")]
    Unauthorized,

    // ========== Business Logic Errors ==========
    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Business rule violation: {0}")]
    BusinessRule(String),

    #[error("Resource already exists: {0}")]
    Conflict(String),

    // ========== External Dependencies ==========
    #[error("Payment gateway error: {0}")]
    Payment(String),

    // ========== System Errors ==========
    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

pub type AppResult<T> = Result<T, AppError>;

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Unauthorized => {
                (StatusCode::UNAUTHORIZED, "E3001", "Unauthorized".to_string())
            }
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "E0003", msg.clone()),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "E0002", msg.clone()),
            AppError::BusinessRule(msg) => {
                (StatusCode::UNPROCESSABLE_ENTITY, "E0005", msg.clone())
            }
            AppError::Conflict(msg) => (StatusCode::CONFLICT, "E0004", msg.clone()),
            AppError::Payment(msg) => {
                error!(target: "payment", error = %msg, "Payment gateway error");
                (StatusCode::BAD_GATEWAY, "E8001", "Payment gateway error".to_string())
            }
            AppError::Database(msg) => {
                error!(target: "database", error = %msg, "Database error occurred");
                (StatusCode::INTERNAL_SERVER_ERROR, "E9002", "Database error".to_string())
            }
            AppError::Internal(msg) => {
                error!(target: "internal", error = %msg, "Internal error occurred");
                (StatusCode::INTERNAL_SERVER_ERROR, "E9001", "Internal server error".to_string())
            }
        };

        let body = Json(AppResponse::<()> {
            code: code.to_string(),
            message,
            data: None,
        });

        (status, body).into_response()
    }
}

impl From<EngineError> for AppError {
    fn from(e: EngineError) -> Self {
        match e {
            EngineError::InvalidQuantity(_)
            | EngineError::InvalidAmount(_)
            | EngineError::MissingRequiredField(_)
            | EngineError::UnsupportedDiscountConfig(_) => AppError::Validation(e.to_string()),
            EngineError::ProductNotFound(_) | EngineError::PartnershipNotFound(_) => {
                AppError::NotFound(e.to_string())
            }
            EngineError::PartnershipNotApproved(_)
            | EngineError::InsufficientInventory { .. }
            | EngineError::ExternalCheckout(_)
            | EngineError::AmountOutOfRange { .. } => AppError::BusinessRule(e.to_string()),
            EngineError::Payment(pe) => AppError::Payment(pe.to_string()),
            EngineError::Database(re) => AppError::Database(re.to_string()),
        }
    }
}

impl From<RepoError> for AppError {
    fn from(e: RepoError) -> Self {
        match e {
            RepoError::NotFound(msg) => AppError::NotFound(msg),
            RepoError::Duplicate(msg) => AppError::Conflict(msg),
            RepoError::Validation(msg) => AppError::Validation(msg),
            RepoError::Database(msg) => AppError::Database(msg),
        }
    }
}

// ========== Helper functions ==========

/// Create a successful response
pub fn ok<T: Serialize>(data: T) -> Json<AppResponse<T>> {
    Json(AppResponse {
        code: "E0000".to_string(),
        message: "Success".to_string(),
        data: Some(data),
    })
}
