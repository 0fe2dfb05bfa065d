//! Server error types.

use api_protocol::error_codes;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use contact_store::ContactStoreError;
use serde_json::json;
use sync_engine::SyncError;

/// Server error type.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// Invalid request parameters.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Authentication required.
    #[error("Authentication required")]
    AuthenticationRequired,

    /// Authentication rejected.
    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    /// Permission denied.
    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Persistence store failure.
    #[error("Store error: {0}")]
    Store(#[from] ContactStoreError),

    /// Sync engine failure.
    #[error("Sync error: {0}")]
    Sync(#[from] SyncError),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let (status, error_code, message) = match &self {
            ServerError::InvalidRequest(msg) => {
                (StatusCode::BAD_REQUEST, error_codes::INVALID_REQUEST, msg.clone())
            }
            ServerError::AuthenticationRequired => (
                StatusCode::UNAUTHORIZED,
                error_codes::AUTHENTICATION_REQUIRED,
                "Authentication required".to_string(),
            ),
            ServerError::AuthenticationFailed(msg) => (
                StatusCode::UNAUTHORIZED,
                error_codes::AUTHENTICATION_FAILED,
                msg.clone(),
            ),
            ServerError::PermissionDenied(msg) => {
                (StatusCode::FORBIDDEN, error_codes::PERMISSION_DENIED, msg.clone())
            }
            ServerError::NotFound(msg) => {
                (StatusCode::NOT_FOUND, error_codes::RESOURCE_NOT_FOUND, msg.clone())
            }
            // Validation failures inside the engine are the caller's fault;
            // everything else from the engine is a dependency failure.
            ServerError::Sync(SyncError::Validation(msg)) => {
                (StatusCode::BAD_REQUEST, error_codes::INVALID_REQUEST, msg.clone())
            }
            ServerError::Sync(SyncError::Store(e)) => {
                tracing::error!(error = %e, "store failure during sync operation");
                dependency_failure()
            }
            ServerError::Store(e) => {
                tracing::error!(error = %e, "store failure");
                dependency_failure()
            }
            ServerError::Internal(msg) => {
                tracing::error!(error = %msg, "internal server error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    error_codes::INTERNAL_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        let body = json!({
            "error": {
                "code": error_code,
                "message": message,
            }
        });

        (status, Json(body)).into_response()
    }
}

/// Generic retryable-failure response; internal detail stays in the logs.
fn dependency_failure() -> (StatusCode, &'static str, String) {
    (
        StatusCode::SERVICE_UNAVAILABLE,
        error_codes::DEPENDENCY_FAILURE,
        "A backing service is unavailable, please retry".to_string(),
    )
}

/// Result type alias for server operations.
pub type ServerResult<T> = Result<T, ServerError>;
