use axum::{
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::time::Duration;
use thiserror::Error;

/// Failure of the extraction collaborator. Surfaced unchanged, never retried.
#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("failed to run yt-dlp: {0}")]
    Spawn(#[source] std::io::Error),

    #[error("extraction timed out after {}s", .0.as_secs())]
    Timeout(Duration),

    #[error("{0}")]
    Failed(String),

    #[error("unreadable yt-dlp output: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Errors a request handler can return.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    BadRequest(String),

    #[error("Unsupported URL: {0}")]
    UnsupportedUrl(String),

    #[error("{0}")]
    NotFound(String),

    /// A request that axum could not decode, with axum's status and reason.
    #[error("{1}")]
    Rejected(StatusCode, String),

    #[error(transparent)]
    Extraction(#[from] ExtractionError),
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::Rejected(rejection.status(), rejection.body_text())
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::Rejected(rejection.status(), rejection.body_text())
    }
}

// This implementation allows us to convert our AppError into a valid HTTP response.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::BadRequest(e) => (StatusCode::BAD_REQUEST, e),
            AppError::UnsupportedUrl(url) => {
                (StatusCode::BAD_REQUEST, format!("Unsupported URL: {}", url))
            }
            AppError::NotFound(e) => (StatusCode::NOT_FOUND, e),
            AppError::Rejected(status, e) => (status, e),
            AppError::Extraction(ExtractionError::Failed(e)) => {
                (StatusCode::BAD_REQUEST, format!("yt-dlp error: {}", e))
            }
            AppError::Extraction(e @ ExtractionError::Timeout(_)) => {
                (StatusCode::GATEWAY_TIMEOUT, e.to_string())
            }
            AppError::Extraction(e) => {
                // Log the full error for debugging
                tracing::error!("Internal server error: {:?}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An internal server error occurred".to_string(),
                )
            }
        };

        let body = Json(json!({ "error": error_message }));
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extraction_errors_map_to_statuses() {
        let failed = AppError::from(ExtractionError::Failed("Video unavailable".into())).into_response();
        assert_eq!(failed.status(), StatusCode::BAD_REQUEST);

        let timeout = AppError::from(ExtractionError::Timeout(Duration::from_secs(30))).into_response();
        assert_eq!(timeout.status(), StatusCode::GATEWAY_TIMEOUT);

        let spawn = ExtractionError::Spawn(std::io::Error::from(std::io::ErrorKind::NotFound));
        assert_eq!(
            AppError::from(spawn).into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn input_errors_are_client_errors() {
        let unsupported = AppError::UnsupportedUrl("https://example.com".into()).into_response();
        assert_eq!(unsupported.status(), StatusCode::BAD_REQUEST);
        assert_eq!(AppError::NotFound("x".into()).into_response().status(), StatusCode::NOT_FOUND);
        let rejected = AppError::Rejected(StatusCode::UNPROCESSABLE_ENTITY, "bad body".into());
        assert_eq!(rejected.into_response().status(), StatusCode::UNPROCESSABLE_ENTITY);
    }
}
