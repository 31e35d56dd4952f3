use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use fcc_core::{CoreError, ShortenerError};
use thiserror::Error;
use tracing::{debug, error, warn};

use crate::model::{ErrorResponse, MessageResponse};

pub type Result<T> = std::result::Result<T, AppError>;

pub const INVALID_URL: &str = "invalid url";
pub const SHORT_URL_NOT_FOUND: &str = "The short url does not exist!";

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Shortener(#[from] ShortenerError),
    #[error("malformed short url: {0}")]
    MalformedShortUrl(#[from] CoreError),
}

fn not_found() -> Response {
    Json(MessageResponse {
        message: SHORT_URL_NOT_FOUND,
    })
    .into_response()
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let err = match self {
            AppError::Shortener(err) => err,
            AppError::MalformedShortUrl(reason) => {
                debug!(reason = %reason, "malformed short url");
                return not_found();
            }
        };

        // Validation and lookup misses are reported in the payload with a 200,
        // which is what the freeCodeCamp test runner expects.
        match err {
            ShortenerError::InvalidUrl(reason) => {
                debug!(reason = %reason, "rejected url");
                Json(ErrorResponse { error: INVALID_URL }).into_response()
            }
            ShortenerError::NotFound(code) => {
                debug!(code = %code, "short url not found");
                not_found()
            }
            ShortenerError::Timeout(reason) => {
                warn!(reason = %reason, "request timed out");
                (
                    StatusCode::GATEWAY_TIMEOUT,
                    Json(ErrorResponse {
                        error: "upstream timeout",
                    }),
                )
                    .into_response()
            }
            ShortenerError::Storage(source) => {
                error!(error = %source, "storage failure");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(ErrorResponse {
                        error: "internal server error",
                    }),
                )
                    .into_response()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fcc_core::{ShortCode, StorageError};
    use serde_json::{json, Value};

    async fn status_and_body(err: AppError) -> (StatusCode, Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn storage_failure_is_internal_error() {
        let err = AppError::from(ShortenerError::Storage(StorageError::Unavailable(
            "pool closed".into(),
        )));

        let (status, body) = status_and_body(err).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, json!({ "error": "internal server error" }));
    }

    #[tokio::test]
    async fn exhausted_allocation_retries_are_internal_error() {
        let err = AppError::from(ShortenerError::Storage(StorageError::DuplicateKey(
            "https://example.com/".into(),
        )));

        let (status, _) = status_and_body(err).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn timeout_is_gateway_timeout() {
        let err = AppError::from(ShortenerError::from(StorageError::Timeout(
            "registry allocate".into(),
        )));

        let (status, body) = status_and_body(err).await;
        assert_eq!(status, StatusCode::GATEWAY_TIMEOUT);
        assert_eq!(body, json!({ "error": "upstream timeout" }));
    }

    #[tokio::test]
    async fn validation_and_lookup_misses_are_ok() {
        let (status, body) =
            status_and_body(ShortenerError::InvalidUrl("no host".into()).into()).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "error": INVALID_URL }));

        let (status, body) =
            status_and_body(ShortenerError::NotFound(ShortCode::new(999)).into()).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "message": SHORT_URL_NOT_FOUND }));
    }
}
