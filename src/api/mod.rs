// API module for exposing functionality via HTTP
// Author: Gabriel Demetrios Lafis

mod server;
mod routes;
mod handlers;
mod models;

pub use server::*;
pub use routes::*;
pub use handlers::*;
pub use models::*;

use actix_web::error::BlockingError;
use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use serde_json::json;
use thiserror::Error;

use crate::data::DataError;
use crate::processing::ProcessingError;
use crate::storage::StorageError;

/// Represents an error in the API module
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Unsupported file format!")]
    UnsupportedFormat(String),

    #[error("{0}")]
    Data(DataError),

    #[error("{0}")]
    InvalidArgument(String),

    #[error("{0}")]
    NotFound(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ApiError {
    /// Short machine-readable error kind
    pub fn kind(&self) -> &'static str {
        match self {
            ApiError::UnsupportedFormat(_) => "unsupported_format",
            ApiError::Data(DataError::Parse(_)) | ApiError::Data(DataError::SchemaMismatch { .. }) => {
                "parse_error"
            }
            ApiError::Data(_) => "data_error",
            ApiError::InvalidArgument(_) => "invalid_argument",
            ApiError::NotFound(_) => "not_found",
            ApiError::Internal(_) => "internal_error",
        }
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::UnsupportedFormat(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            ApiError::Data(DataError::Parse(_)) | ApiError::Data(DataError::SchemaMismatch { .. }) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            ApiError::Data(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::InvalidArgument(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(json!({
            "error": self.kind(),
            "message": self.to_string(),
        }))
    }
}

impl From<DataError> for ApiError {
    fn from(err: DataError) -> Self {
        ApiError::Data(err)
    }
}

impl From<ProcessingError> for ApiError {
    fn from(err: ProcessingError) -> Self {
        match err {
            ProcessingError::DataError(err) => ApiError::Data(err),
            ProcessingError::InvalidArgument(msg) => ApiError::InvalidArgument(msg),
            ProcessingError::Render(msg) => ApiError::Internal(msg),
        }
    }
}

impl From<StorageError> for ApiError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::Data(err) => ApiError::Data(err),
            StorageError::UnsupportedFormat(name) => ApiError::UnsupportedFormat(name),
            err @ StorageError::NotFound(_) => ApiError::NotFound(err.to_string()),
            StorageError::Other(msg) => ApiError::Internal(msg),
        }
    }
}

impl From<BlockingError> for ApiError {
    fn from(err: BlockingError) -> Self {
        ApiError::Internal(err.to_string())
    }
}
