use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use std::fmt;

use super::ApiResponse;
use crate::utils::error::MediagrabError;

#[derive(Debug)]
pub enum ApiError {
    Media(MediagrabError),

    NotFound(String),

    ValidationError(String),

    InternalError(String),
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::Media(err) => write!(f, "{}", err),
            ApiError::NotFound(msg) => write!(f, "Not found: {}", msg),
            ApiError::ValidationError(msg) => write!(f, "Validation error: {}", msg),
            ApiError::InternalError(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for ApiError {}

/// HTTP status for each error kind
pub fn status_for(err: &MediagrabError) -> StatusCode {
    match err {
        MediagrabError::InvalidUrl(_) | MediagrabError::InvalidRequest(_) => {
            StatusCode::BAD_REQUEST
        }
        MediagrabError::AgeRestricted(_) => StatusCode::FORBIDDEN,
        MediagrabError::VideoUnavailable(_) | MediagrabError::FileNotFound(_) => {
            StatusCode::NOT_FOUND
        }
        MediagrabError::NoMatchingStream | MediagrabError::ImageError(_) => {
            StatusCode::UNPROCESSABLE_ENTITY
        }
        MediagrabError::NetworkBlocked(_)
        | MediagrabError::ExtractionError(_)
        | MediagrabError::DownloadError(_)
        | MediagrabError::HttpStatus { .. }
        | MediagrabError::NetworkError(_) => StatusCode::BAD_GATEWAY,
        MediagrabError::YtDlpNotFound
        | MediagrabError::IoError(_)
        | MediagrabError::SerializationError(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_message) = match &self {
            ApiError::Media(err) => {
                let status = status_for(err);
                if status.is_server_error() {
                    tracing::error!("Request failed: {}", err);
                } else {
                    tracing::warn!("Request rejected: {}", err);
                }
                (status, err.user_message())
            }
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            ApiError::ValidationError(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            ApiError::InternalError(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An internal error occurred".to_string(),
                )
            }
        };

        let body = ApiResponse::<()>::error(error_message);
        (status, Json(body)).into_response()
    }
}

impl From<MediagrabError> for ApiError {
    fn from(err: MediagrabError) -> Self {
        ApiError::Media(err)
    }
}

impl From<tokio::task::JoinError> for ApiError {
    fn from(err: tokio::task::JoinError) -> Self {
        ApiError::InternalError(err.to_string())
    }
}

impl ApiError {
    pub fn validation(msg: impl Into<String>) -> Self {
        ApiError::ValidationError(msg.into())
    }

    pub fn file_not_found(name: &str) -> Self {
        ApiError::NotFound(format!("File '{}' not found", name))
    }
}
