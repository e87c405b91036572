use actix_web::{http::StatusCode, HttpResponse};
use thiserror::Error;

use crate::api::types::ApiError;

/// Client-visible failures. The snapshot cycle swallows its own errors by
/// design, so only request validation ever surfaces here.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),
}

impl From<AppError> for HttpResponse {
    fn from(error: AppError) -> Self {
        let (status, error_code, message) = match error {
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg),
        };

        HttpResponse::build(status).json(ApiError {
            error: message,
            error_code: error_code.to_string(),
            details: None,
        })
    }
}
