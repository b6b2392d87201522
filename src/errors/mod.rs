/// Error handling module
///
/// `RepositoryError` covers the data-access layer; `ApiError` maps
/// every failure onto a unified HTTP error response.
use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use serde::Serialize;
use std::fmt;

#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("unknown field: {path}")]
    UnknownField { path: String },
    #[error("invalid value {value:?} for field {path}")]
    InvalidValue { path: String, value: String },
    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

#[derive(Debug)]
pub enum ApiError {
    Internal { reason: String },
    BadRequest { reason: String },
    NotFound { resource: String },
    ServiceUnavailable { details: String },
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::Internal { reason } => write!(f, "Internal error: {}", reason),
            ApiError::BadRequest { reason } => write!(f, "Bad request: {}", reason),
            ApiError::NotFound { resource } => write!(f, "Not found: {}", resource),
            ApiError::ServiceUnavailable { details } => {
                write!(f, "Service unavailable: {}", details)
            }
        }
    }
}

impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::UnknownField { .. } | RepositoryError::InvalidValue { .. } => {
                ApiError::BadRequest {
                    reason: err.to_string(),
                }
            }
            RepositoryError::Database(e) => {
                tracing::error!(error = %e, "Database operation failed");
                ApiError::Internal {
                    reason: "database operation failed".to_string(),
                }
            }
        }
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            ApiError::NotFound { .. } => StatusCode::NOT_FOUND,
            ApiError::ServiceUnavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        let response = match self {
            ApiError::Internal { reason } => ErrorResponse {
                error: "Internal server error".to_string(),
                details: Some(reason.clone()),
            },
            ApiError::BadRequest { reason } => ErrorResponse {
                error: "Bad request".to_string(),
                details: Some(reason.clone()),
            },
            ApiError::NotFound { resource } => ErrorResponse {
                error: format!("{} not found", resource),
                details: None,
            },
            ApiError::ServiceUnavailable { details } => ErrorResponse {
                error: "Service unavailable".to_string(),
                details: Some(details.clone()),
            },
        };
        HttpResponse::build(status).json(response)
    }
}
