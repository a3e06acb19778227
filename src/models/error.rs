use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("{0}")]
    ValidationError(String),

    #[error("HTTP request error: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("Remote service responded with status {0}")]
    RemoteStatus(u16),

    #[error("Baseline catalog lookup failed: {0}")]
    CatalogLoadError(String),

    #[error("Payload formatting failed: {0}")]
    FormatError(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Session not found: {0}")]
    SessionNotFound(String),

    #[error("A comparison run is already in progress")]
    RunInProgress,

    #[error("Internal server error: {0}")]
    InternalError(String),
}

impl AppError {
    pub fn is_validation(&self) -> bool {
        matches!(self, AppError::ValidationError(_))
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::ValidationError(_) => (StatusCode::BAD_REQUEST, self.to_string()),
            AppError::HttpError(_) => (StatusCode::BAD_GATEWAY, "Comparison service unreachable".to_string()),
            AppError::RemoteStatus(_) => (StatusCode::BAD_GATEWAY, self.to_string()),
            AppError::CatalogLoadError(_) => (StatusCode::BAD_GATEWAY, self.to_string()),
            AppError::FormatError(_) => (StatusCode::UNPROCESSABLE_ENTITY, self.to_string()),
            AppError::InvalidUrl(_) => (StatusCode::BAD_REQUEST, self.to_string()),
            AppError::SessionNotFound(_) => (StatusCode::NOT_FOUND, self.to_string()),
            AppError::RunInProgress => (StatusCode::CONFLICT, self.to_string()),
            AppError::InternalError(_) => (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".to_string()),
        };

        let body = Json(json!({
            "error": error_message,
            "status": status.as_u16()
        }));

        (status, body).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;
