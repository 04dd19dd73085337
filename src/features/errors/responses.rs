use axum::http::{HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use serde_json::json;

use crate::data::models::ApiError;
use crate::features::generation::GenerationError;
use crate::features::storage::StorageError;

impl ApiError {
    /// Status code and client-facing message for this error.
    pub fn status_and_message(&self) -> (StatusCode, String) {
        match self {
            ApiError::NotFound(_) => (StatusCode::NOT_FOUND, self.to_string()),
            ApiError::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            ApiError::Unauthorized | ApiError::InvalidCredentials => {
                (StatusCode::UNAUTHORIZED, self.to_string())
            }
            ApiError::PayloadTooLarge(msg) => (StatusCode::PAYLOAD_TOO_LARGE, msg.clone()),
            ApiError::ServiceUnavailable(msg) => (StatusCode::SERVICE_UNAVAILABLE, msg.clone()),
            ApiError::DatabaseError(e) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Database error: {}", e),
            ),
            ApiError::PoolError(e) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Database pool error: {}", e),
            ),
            ApiError::HashingError(e) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Hashing error: {}", e),
            ),
            ApiError::StorageError(StorageError::NotConfigured(msg)) => {
                (StatusCode::BAD_REQUEST, msg.clone())
            }
            ApiError::StorageError(StorageError::InvalidFileId(id)) => {
                (StatusCode::BAD_REQUEST, format!("Invalid file id: {}", id))
            }
            ApiError::StorageError(e) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Storage error: {}", e),
            ),
            ApiError::GenerationError(GenerationError::NotConfigured) => (
                StatusCode::SERVICE_UNAVAILABLE,
                GenerationError::NotConfigured.to_string(),
            ),
            ApiError::GenerationError(e) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Generation error: {}", e),
            ),
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg.clone()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = self.status_and_message();

        if status.is_server_error() {
            log::error!("{} {}", status.as_u16(), message);
        }

        let body = json!({
            "error": message,
            "status": status.as_u16()
        });

        let mut response = (status, axum::Json(body)).into_response();
        if status == StatusCode::UNAUTHORIZED {
            response
                .headers_mut()
                .insert(header::WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
        }
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn categories_map_to_their_status_codes() {
        let cases = [
            (ApiError::not_found("Card"), StatusCode::NOT_FOUND),
            (ApiError::validation("bad"), StatusCode::BAD_REQUEST),
            (ApiError::Unauthorized, StatusCode::UNAUTHORIZED),
            (ApiError::InvalidCredentials, StatusCode::UNAUTHORIZED),
            (
                ApiError::PayloadTooLarge("big".into()),
                StatusCode::PAYLOAD_TOO_LARGE,
            ),
            (
                ApiError::Internal("boom".into()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (
                ApiError::DatabaseError(diesel::result::Error::NotFound),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (
                ApiError::GenerationError(GenerationError::NotConfigured),
                StatusCode::SERVICE_UNAVAILABLE,
            ),
            (
                ApiError::StorageError(StorageError::NotConfigured("none".into())),
                StatusCode::BAD_REQUEST,
            ),
        ];

        for (error, expected) in cases {
            assert_eq!(error.status_and_message().0, expected, "{error:?}");
        }
    }

    #[test]
    fn not_found_names_the_entity() {
        let (_, message) = ApiError::not_found("Deck").status_and_message();
        assert_eq!(message, "Deck not found");
    }

    #[test]
    fn unauthorized_response_asks_for_bearer() {
        let response = ApiError::Unauthorized.into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            response.headers().get(header::WWW_AUTHENTICATE).unwrap(),
            "Bearer"
        );
    }
}
