// Error types shared by the request handlers

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use crate::models::ErrorResponse;

/// Every way a single request can fail. The `Display` text is what the
/// caller receives in the `error` field of the JSON body.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("missing access token")]
    MissingToken,

    #[error("invalid access token")]
    InvalidToken,

    #[error("error getting file: {0}")]
    MissingFile(String),

    #[error("error reading file: {0}")]
    UnreadableFile(String),

    #[error("error creating drive service: {0}")]
    Session(String),

    #[error("error creating file: {0}")]
    CreateFile(String),
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::MissingToken
            | AppError::MissingFile(_)
            | AppError::UnreadableFile(_) => StatusCode::BAD_REQUEST,
            AppError::InvalidToken => StatusCode::UNAUTHORIZED,
            AppError::Session(_) | AppError::CreateFile(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = ErrorResponse {
            error: self.to_string(),
        };
        (self.status_code(), Json(body)).into_response()
    }
}

pub type AppResult<T> = std::result::Result<T, AppError>;
