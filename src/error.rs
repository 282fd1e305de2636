use axum::http::{Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use crate::validator::ValidationErrors;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("validation failed on {} field(s)", .0.len())]
    Validation(ValidationErrors),
    #[error("record not found")]
    NotFound,
    #[error("bad request: {0}")]
    BadRequest(String),
    #[error("method {0} not allowed")]
    MethodNotAllowed(Method),
    #[error("storage error: {0}")]
    Storage(#[from] sqlx::Error),
}

pub type Result<T> = std::result::Result<T, AppError>;

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::NotFound => StatusCode::NOT_FOUND,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::MethodNotAllowed(_) => StatusCode::METHOD_NOT_ALLOWED,
            AppError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<ValidationErrors> for AppError {
    fn from(errors: ValidationErrors) -> Self {
        AppError::Validation(errors)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match self {
            AppError::Validation(errors) => json!({ "error": errors }),
            AppError::NotFound => json!({ "error": "the requested resource could not be found" }),
            AppError::BadRequest(message) => json!({ "error": message }),
            AppError::MethodNotAllowed(method) => {
                let message = format!("the {method} method is not supported for this resource");
                json!({ "error": message })
            }
            AppError::Storage(e) => {
                tracing::error!("Storage error: {e}");
                let message = "the server encountered a problem and could not process your request";
                json!({ "error": message })
            }
        };
        (status, Json(body)).into_response()
    }
}
