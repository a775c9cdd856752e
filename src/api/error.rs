use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use tracing::error;

use crate::shared::errors::{PipelineError, ValidationError};

/// Error envelope for the read API: `{"message": ..., "status": ...}`
#[derive(Debug)]
pub enum ApiError {
    BadRequest(ValidationError),
    NotFound,
    MethodNotAllowed,
    /// Feed or store failure; details stay in the log
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn message(&self) -> String {
        match self {
            Self::BadRequest(e) => e.to_string(),
            Self::NotFound => "Requested path is not found".to_string(),
            Self::MethodNotAllowed => "Method Not allowed. Allowed Methods are GET".to_string(),
            Self::Internal(_) => "Try again later".to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let Self::Internal(detail) = &self {
            error!("Request failed: {}", detail);
        }
        let status = self.status();
        let body = json!({ "message": self.message(), "status": status.as_u16() });
        (status, axum::Json(body)).into_response()
    }
}

impl From<ValidationError> for ApiError {
    fn from(e: ValidationError) -> Self {
        Self::BadRequest(e)
    }
}

impl From<PipelineError> for ApiError {
    fn from(e: PipelineError) -> Self {
        Self::Internal(e.to_string())
    }
}
