use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;
use tracing::{error, warn};

use mt799_db::DbError;
use mt799_parser::ParseError;
use mt799_types::api::ErrorResponse;

#[derive(Debug, Error)]
pub enum ApiError {
    /// Missing, empty or malformed upload.
    #[error("{0}")]
    Input(String),

    #[error("file exceeds the {0} byte upload limit")]
    TooLarge(usize),

    /// The uploaded stream could not be drained.
    #[error("failed to read uploaded file: {0}")]
    Read(String),

    #[error("invalid MT799 message: {0}")]
    Format(#[from] ParseError),

    #[error("database unavailable")]
    Store(#[from] DbError),

    #[error("{0} not found")]
    NotFound(String),

    #[error("internal server error")]
    Internal,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Input(_) | ApiError::Format(_) => StatusCode::BAD_REQUEST,
            ApiError::TooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Read(_) | ApiError::Store(_) | ApiError::Internal => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        match &self {
            ApiError::Store(source) => error!("Request failed: {}: {}", self, source),
            _ if status.is_server_error() => error!("Request failed: {}", self),
            _ => warn!("Rejected request ({}): {}", status.as_u16(), self),
        }

        (
            status,
            Json(ErrorResponse {
                error: self.to_string(),
            }),
        )
            .into_response()
    }
}
