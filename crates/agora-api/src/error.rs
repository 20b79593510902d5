use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;
use tracing::error;

use agora_types::api::ApiMessage;

/// Error taxonomy surfaced by the handlers. Each variant maps to one
/// status code; internal failures are logged and never leak detail.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    Unauthorized(&'static str),
    #[error("{0}")]
    Forbidden(&'static str),
    #[error("{0}")]
    NotFound(&'static str),
    #[error("{0}")]
    Conflict(&'static str),
    #[error("{0}")]
    Validation(&'static str),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg.to_string()),
            ApiError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg.to_string()),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.to_string()),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, msg.to_string()),
            ApiError::Validation(msg) => (StatusCode::BAD_REQUEST, msg.to_string()),
            ApiError::Internal(err) => {
                error!("internal error: {:#}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };
        (status, Json(ApiMessage { message })).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn variants_map_to_expected_status() {
        let cases = [
            (ApiError::Unauthorized("x"), StatusCode::UNAUTHORIZED),
            (ApiError::Forbidden("x"), StatusCode::FORBIDDEN),
            (ApiError::NotFound("x"), StatusCode::NOT_FOUND),
            (ApiError::Conflict("x"), StatusCode::CONFLICT),
            (ApiError::Validation("x"), StatusCode::BAD_REQUEST),
        ];
        for (err, status) in cases {
            assert_eq!(err.into_response().status(), status);
        }
    }

    #[test]
    fn internal_errors_surface_generic_message() {
        let err = ApiError::Internal(anyhow::anyhow!("disk on fire at /var/db"));
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
