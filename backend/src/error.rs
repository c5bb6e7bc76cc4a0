//! Error handling for the Seed Bank Accession Platform
//!
//! Every failure leaves the server as a JSON `ErrorResponse`. Domain errors
//! keep their field name so forms can highlight the offending input.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use shared::DomainError;
use thiserror::Error;

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    // Authentication errors
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    // Validation errors
    #[error("Validation error: {0}")]
    ValidationError(#[from] validator::ValidationErrors),

    /// Rejected by the accession model
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error("Duplicate entry: {0}")]
    DuplicateEntry(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    // Database errors
    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),

    // Internal errors
    #[error("Internal server error")]
    InternalError(#[from] anyhow::Error),
}

/// Error response structure
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

impl ErrorDetail {
    pub fn new(code: &str, message: impl Into<String>, field: Option<String>) -> Self {
        Self {
            code: code.to_string(),
            message: message.into(),
            field,
        }
    }
}

fn domain_status(error: &DomainError) -> StatusCode {
    match error {
        DomainError::RecordNotFound { .. } => StatusCode::NOT_FOUND,
        DomainError::UnitFamilyMismatch { .. } | DomainError::ReservedPurpose { .. } => {
            StatusCode::BAD_REQUEST
        }
        DomainError::NegativeQuantity { .. }
        | DomainError::RequiredFieldMissing { .. }
        | DomainError::FutureDateRejected { .. }
        | DomainError::InvalidField { .. }
        | DomainError::UndoNotPermitted { .. } => StatusCode::UNPROCESSABLE_ENTITY,
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_detail) = match &self {
            AppError::Unauthorized(message) => (
                StatusCode::UNAUTHORIZED,
                ErrorDetail::new("UNAUTHORIZED", message.clone(), None),
            ),
            AppError::Forbidden(message) => (
                StatusCode::FORBIDDEN,
                ErrorDetail::new("FORBIDDEN", message.clone(), None),
            ),
            AppError::ValidationError(errors) => {
                let field = errors.field_errors().keys().next().map(|f| f.to_string());
                (
                    StatusCode::BAD_REQUEST,
                    ErrorDetail::new("VALIDATION_ERROR", errors.to_string(), field),
                )
            }
            AppError::Domain(error) => (
                domain_status(error),
                ErrorDetail::new(
                    error.code(),
                    error.to_string(),
                    error.field().map(str::to_string),
                ),
            ),
            AppError::DuplicateEntry(field) => (
                StatusCode::CONFLICT,
                ErrorDetail::new(
                    "DUPLICATE_ENTRY",
                    format!("A record with this {} already exists", field),
                    Some(field.clone()),
                ),
            ),
            AppError::NotFound(resource) => (
                StatusCode::NOT_FOUND,
                ErrorDetail::new("NOT_FOUND", format!("{} not found", resource), None),
            ),
            AppError::DatabaseError(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorDetail::new("DATABASE_ERROR", "A database error occurred", None),
            ),
            AppError::InternalError(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorDetail::new("INTERNAL_ERROR", "An internal server error occurred", None),
            ),
        };

        if status.is_server_error() {
            tracing::error!("Error: {:?}", self);
        } else {
            tracing::debug!("Request rejected: {}", self);
        }

        (status, Json(ErrorResponse { error: error_detail })).into_response()
    }
}

/// Result type alias for handlers
pub type AppResult<T> = Result<T, AppError>;
