/// Server error types
use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use shelf_core::ShelfError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ServerError>;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Internal server error: {0}")]
    Internal(String),

    #[error(transparent)]
    Domain(#[from] ShelfError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JWT error: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),

    #[error("Bcrypt error: {0}")]
    Bcrypt(#[from] bcrypt::BcryptError),
}

impl From<shelf_storage::StorageError> for ServerError {
    fn from(err: shelf_storage::StorageError) -> Self {
        // StorageError -> ShelfError -> ServerError
        ServerError::Domain(err.into())
    }
}

impl From<JsonRejection> for ServerError {
    fn from(rejection: JsonRejection) -> Self {
        ServerError::BadRequest(rejection.body_text())
    }
}

impl ServerError {
    /// Status code and client-safe message. Internal details are logged
    /// here and never reach the response body.
    fn status_and_message(self) -> (StatusCode, String) {
        match self {
            ServerError::Auth(msg) => (StatusCode::UNAUTHORIZED, msg),
            ServerError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg),
            ServerError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ServerError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ServerError::Domain(err) => domain_status(err),
            ServerError::Config(ref msg) => {
                tracing::error!("Config error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Configuration error".to_string(),
                )
            }
            ServerError::Internal(ref msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
            ServerError::Io(ref e) => {
                tracing::error!("IO error: {:?}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "IO error".to_string())
            }
            ServerError::Jwt(ref e) => {
                tracing::error!("JWT error: {:?}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Token error".to_string(),
                )
            }
            ServerError::Bcrypt(ref e) => {
                tracing::error!("Bcrypt error: {:?}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Password error".to_string(),
                )
            }
        }
    }
}

fn domain_status(err: ShelfError) -> (StatusCode, String) {
    match err {
        ShelfError::Validation(_) | ShelfError::Duplicate { .. } => {
            (StatusCode::BAD_REQUEST, err.to_string())
        }
        ShelfError::InvalidCredentials => (StatusCode::UNAUTHORIZED, err.to_string()),
        ShelfError::Forbidden(_) => (StatusCode::FORBIDDEN, err.to_string()),
        ShelfError::NotFound { entity, .. } => {
            (StatusCode::NOT_FOUND, format!("{} not found", entity))
        }
        ShelfError::Upstream(ref msg) => {
            tracing::error!("Image store error: {}", msg);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Image upload failed".to_string(),
            )
        }
        ShelfError::Storage(ref msg) => {
            tracing::error!("Storage error: {}", msg);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Database error".to_string(),
            )
        }
        ShelfError::Other(ref msg) => {
            tracing::error!("Internal error: {}", msg);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
            )
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let (status, message) = self.status_and_message();

        let body = Json(json!({
            "success": false,
            "message": message,
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status_of(err: impl Into<ServerError>) -> StatusCode {
        err.into().into_response().status()
    }

    #[test]
    fn domain_errors_map_to_client_statuses() {
        assert_eq!(
            status_of(ShelfError::validation("bad")),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(ShelfError::duplicate("Email")),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(ShelfError::InvalidCredentials),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(status_of(ShelfError::forbidden("book")), StatusCode::FORBIDDEN);
        assert_eq!(
            status_of(ShelfError::not_found("Book", "42")),
            StatusCode::NOT_FOUND
        );
    }

    #[test]
    fn infrastructure_errors_are_500() {
        assert_eq!(
            status_of(ShelfError::upstream("timeout")),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            status_of(ShelfError::storage("disk full")),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            status_of(ServerError::Internal("boom".into())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn not_found_message_hides_the_id() {
        let (_, message) =
            ServerError::from(ShelfError::not_found("Book", "abc")).status_and_message();
        assert_eq!(message, "Book not found");
    }
}
