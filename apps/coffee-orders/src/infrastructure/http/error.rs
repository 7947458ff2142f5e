//! API error responses.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use super::response::ErrorBody;
use crate::application::services::RepositoryError;

/// Errors returned by the order endpoints.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Request body is not a JSON object matching the order shape.
    #[error("malformed JSON body")]
    MalformedJson,

    /// The order store failed.
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            Self::MalformedJson => (StatusCode::BAD_REQUEST, "Malformed JSON"),
            Self::Repository(e) => {
                tracing::error!(error = %e, "Order store request failed");
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
            }
        };

        (
            status,
            Json(ErrorBody {
                err: message.to_string(),
            }),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::StoreError;

    #[test]
    fn malformed_json_is_bad_request() {
        let response = ApiError::MalformedJson.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn store_failure_is_internal_error() {
        let error = ApiError::from(RepositoryError::Store(StoreError::Read("io".to_string())));
        assert_eq!(
            error.into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
