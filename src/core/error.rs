use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::shared::types::ApiResponse;
use crate::shared::validation::FieldError;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid fields: {}", FieldError::join(.0))]
    InvalidFields(Vec<FieldError>),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Internal server error: {0}")]
    Internal(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Payload too large: {0}")]
    PayloadTooLarge(String),

    #[error("External service error: {0}")]
    ExternalServiceError(String),

    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),

    /// The municipal backend answered with an error status or could not be reached.
    /// `status` is `None` for transport failures.
    #[error("Upstream error ({status:?}): {message}")]
    Upstream {
        status: Option<u16>,
        message: String,
        errors: Vec<String>,
    },
}

impl AppError {
    fn upstream_status(status: Option<u16>) -> StatusCode {
        status
            .and_then(|s| StatusCode::from_u16(s).ok())
            .filter(|s| s.is_client_error())
            .unwrap_or(StatusCode::BAD_GATEWAY)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message, errors) = match self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg, None),
            AppError::Validation(msg) => {
                (StatusCode::BAD_REQUEST, msg.clone(), Some(vec![msg]))
            }
            AppError::InvalidFields(fields) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "Please correct the highlighted fields".to_string(),
                Some(fields.iter().map(|f| f.to_string()).collect()),
            ),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg, None),
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                    None,
                )
            }
            AppError::Conflict(msg) => (StatusCode::CONFLICT, msg, None),
            AppError::PayloadTooLarge(msg) => (StatusCode::PAYLOAD_TOO_LARGE, msg, None),
            AppError::ServiceUnavailable(msg) => {
                tracing::warn!("Service unavailable: {}", msg);
                (StatusCode::SERVICE_UNAVAILABLE, msg, None)
            }
            AppError::ExternalServiceError(msg) => {
                tracing::error!("External service error: {}", msg);
                (StatusCode::BAD_GATEWAY, msg, None)
            }
            AppError::Upstream {
                status,
                message,
                errors,
            } => {
                tracing::warn!("Backend error (status {:?}): {}", status, message);
                let errors = if errors.is_empty() {
                    None
                } else {
                    Some(errors)
                };
                (Self::upstream_status(status), message, errors)
            }
        };

        let body = Json(ApiResponse::<()>::error(Some(message), errors));

        (status, body).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
