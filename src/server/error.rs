use axum::{
    response::{IntoResponse, Response},
    http::StatusCode,
    Json,
};
use std::fmt::{self, Display};
use std::error::Error;

use crate::form::ValidationError;
use crate::merge::MergeError;

/// Application error types
#[derive(Debug)]
pub enum AppError {
    ValidationError(String),
    ParseError(String),
    InternalError(String),
}

impl AppError {
    fn kind(&self) -> &'static str {
        match self {
            AppError::ValidationError(_) => "validation_error",
            AppError::ParseError(_) => "parse_error",
            AppError::InternalError(_) => "internal_error",
        }
    }
}

impl From<ValidationError> for AppError {
    fn from(err: ValidationError) -> Self {
        AppError::ValidationError(err.to_string())
    }
}

impl From<MergeError> for AppError {
    fn from(err: MergeError) -> Self {
        AppError::ParseError(err.to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let kind = self.kind();
        let (status, message) = match self {
            AppError::ValidationError(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::ParseError(msg) => (StatusCode::UNPROCESSABLE_ENTITY, msg),
            AppError::InternalError(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        let body = Json(serde_json::json!({
            "error": {
                "type": kind,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}

impl Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::ValidationError(msg) => write!(f, "Validation error: {}", msg),
            AppError::ParseError(msg) => write!(f, "Parse error: {}", msg),
            AppError::InternalError(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl Error for AppError {}
