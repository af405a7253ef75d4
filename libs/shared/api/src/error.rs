use thiserror::Error;

use shared_models::error::AppError;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("API path must start with '/': {0}")]
    InvalidPath(String),

    #[error("Failed to reach API for {path}. Tried: {}", .attempts.join(", "))]
    Unreachable { path: String, attempts: Vec<String> },

    #[error("API error ({status}): {message}")]
    Status { status: u16, message: String },

    #[error("Failed to decode API response: {0}")]
    Decode(String),
}

impl From<ApiError> for AppError {
    fn from(err: ApiError) -> Self {
        let text = err.to_string();
        match err {
            ApiError::InvalidPath(_) => AppError::Internal(text),
            ApiError::Status { status: 401, message } => AppError::Auth(message),
            ApiError::Status { status: 403, message } => AppError::Forbidden(message),
            ApiError::Status { status: 404, message } => AppError::NotFound(message),
            ApiError::Status { status: 400 | 422, message } => AppError::BadRequest(message),
            ApiError::Unreachable { .. } | ApiError::Status { .. } | ApiError::Decode(_) => {
                AppError::ExternalService(text)
            }
        }
    }
}
