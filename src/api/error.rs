//! HTTP error mapping for the API layer.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

use crate::results::ResultsError;

/// Errors surfaced to HTTP clients.
///
/// `Validation` and `NotFound` are expected outcomes; `Internal` covers
/// backend failures (pool exhaustion, disk errors) that the client can only
/// retry by resubmitting.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),

    #[error("result not found")]
    NotFound,

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl From<ResultsError> for ApiError {
    fn from(err: ResultsError) -> Self {
        match err {
            ResultsError::Validation(msg) => ApiError::Validation(msg),
            ResultsError::NotFound => ApiError::NotFound,
            other => ApiError::Internal(anyhow::Error::new(other)),
        }
    }
}

impl From<axum::http::Error> for ApiError {
    fn from(err: axum::http::Error) -> Self {
        ApiError::Internal(anyhow::Error::new(err))
    }
}

impl From<axum::Error> for ApiError {
    fn from(err: axum::Error) -> Self {
        ApiError::Internal(anyhow::Error::new(err))
    }
}

impl From<tokio::task::JoinError> for ApiError {
    fn from(err: tokio::task::JoinError) -> Self {
        ApiError::Internal(anyhow::Error::new(err))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, detail) = match self {
            ApiError::Validation(msg) => (StatusCode::UNPROCESSABLE_ENTITY, msg),
            ApiError::NotFound => (StatusCode::NOT_FOUND, "Result not found".to_string()),
            ApiError::Internal(err) => {
                tracing::error!(error = %err, "request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal server error".to_string(),
                )
            }
        };

        (status, Json(json!({ "detail": detail }))).into_response()
    }
}
