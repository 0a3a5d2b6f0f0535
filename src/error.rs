//! Error taxonomy shared by the ingestion and query paths.
//!
//! Every failure is converted to a JSON `{"error": ...}` body at the HTTP
//! boundary through [`ApiError`]'s `IntoResponse` impl.

use axum::{
    extract::rejection::{BytesRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

// ---

/// Malformed or incomplete client input. Always reported as 400.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("malformed body")]
    MalformedBody,

    #[error("missing required fields: {}", .0.join(", "))]
    MissingFields(Vec<&'static str>),

    #[error("invalid field: {0}")]
    InvalidField(&'static str),

    #[error("sensorId is required")]
    MissingSensorId,

    #[error("invalid cursor")]
    InvalidCursor,

    #[error("invalid limit")]
    InvalidLimit,
}

/// Failure talking to the key-value store or the object archive.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("store write failed: {0}")]
    Write(String),

    #[error("store read failed: {0}")]
    Read(String),

    #[error("reading already exists for sensor '{sensor_id}' at {timestamp}")]
    Conflict { sensor_id: String, timestamp: String },

    #[error("start key does not belong to this query")]
    InvalidStartKey,

    #[error("archive write failed for '{key}': {reason}")]
    Archive { key: String, reason: String },
}

/// Everything a request handler can fail with.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Storage(StorageError),

    #[error("Unsupported HTTP method")]
    UnsupportedMethod,

    /// The request could not be extracted (bad query string, path or body).
    #[error("{message}")]
    Rejected { status: StatusCode, message: String },
}

impl From<StorageError> for ApiError {
    fn from(err: StorageError) -> Self {
        // A start key the store cannot interpret only ever comes from a cursor.
        match err {
            StorageError::InvalidStartKey => ApiError::Validation(ValidationError::InvalidCursor),
            other => ApiError::Storage(other),
        }
    }
}

macro_rules! from_rejection {
    ($($rejection:ty),+) => {
        $(impl From<$rejection> for ApiError {
            fn from(rejection: $rejection) -> Self {
                ApiError::Rejected {
                    status: rejection.status(),
                    message: rejection.body_text(),
                }
            }
        })+
    };
}

from_rejection!(BytesRejection, PathRejection, QueryRejection);

/// JSON body used for every error response.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

impl ErrorBody {
    pub fn new(message: impl Into<String>) -> Self {
        ErrorBody {
            error: message.into(),
        }
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) | ApiError::UnsupportedMethod => StatusCode::BAD_REQUEST,
            ApiError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Rejected { status, .. } => *status,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        // ---
        match &self {
            ApiError::Validation(e) => tracing::debug!("Rejected request: {}", e),
            ApiError::UnsupportedMethod => tracing::debug!("Rejected unsupported method"),
            ApiError::Rejected { status, message } => {
                tracing::debug!("Rejected request ({}): {}", status, message)
            }
            ApiError::Storage(e) => tracing::error!("Storage failure: {}", e),
        }

        (self.status(), Json(ErrorBody::new(self.to_string()))).into_response()
    }
}
