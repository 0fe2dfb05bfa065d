//! API error envelope and error codes.

use serde::{Deserialize, Serialize};

/// Machine-readable error codes carried in error responses.
pub mod error_codes {
    /// Malformed request shape or parameters.
    pub const INVALID_REQUEST: &str = "INVALID_REQUEST";
    /// No credential presented.
    pub const AUTHENTICATION_REQUIRED: &str = "AUTHENTICATION_REQUIRED";
    /// Credential or challenge rejected.
    pub const AUTHENTICATION_FAILED: &str = "AUTHENTICATION_FAILED";
    /// Authenticated but not allowed.
    pub const PERMISSION_DENIED: &str = "PERMISSION_DENIED";
    /// The requested resource does not exist.
    pub const RESOURCE_NOT_FOUND: &str = "RESOURCE_NOT_FOUND";
    /// A backing dependency failed; the whole operation may be retried.
    pub const DEPENDENCY_FAILURE: &str = "DEPENDENCY_FAILURE";
    /// Unexpected server-side failure.
    pub const INTERNAL_ERROR: &str = "INTERNAL_ERROR";
}

/// The error object nested in an error response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    /// One of [`error_codes`].
    pub code: String,
    /// Human-readable reason.
    pub message: String,
}

/// Error response body: `{"error": {"code": ..., "message": ...}}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiErrorResponse {
    /// The error.
    pub error: ApiError,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_envelope_shape() {
        let body = ApiErrorResponse {
            error: ApiError {
                code: error_codes::INVALID_REQUEST.to_string(),
                message: "bad mobile number".to_string(),
            },
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["error"]["code"], "INVALID_REQUEST");
    }
}
