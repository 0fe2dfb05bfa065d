//! Bearer token authentication middleware.

use api_protocol::error_codes;
use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use contact_store::ContactStore;
use entities::User;
use serde_json::json;

use crate::state::SharedState;

/// The authenticated caller, stored in request extensions.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    /// The resolved user record.
    pub user: User,
}

/// Extracts the bearer token from the Authorization header.
fn extract_token(request: &Request) -> Option<&str> {
    request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
}

fn unauthorized(message: &str) -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({
            "error": {
                "code": error_codes::AUTHENTICATION_REQUIRED,
                "message": message,
            }
        })),
    )
        .into_response()
}

/// Authentication middleware.
///
/// Resolves the bearer token against the token store and places the caller
/// in the request extensions as [`CurrentUser`].
pub async fn auth_middleware<S: ContactStore + 'static>(
    State(state): State<SharedState<S>>,
    mut request: Request,
    next: Next,
) -> Response {
    let token = match extract_token(&request) {
        Some(token) => token,
        None => return unauthorized("Missing authorization header"),
    };

    let user = match state.store.get_user_by_token(token).await {
        Ok(Some(user)) => user,
        Ok(None) => return unauthorized("Invalid token"),
        Err(e) => {
            tracing::error!(error = %e, "token lookup failed");
            return (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "error": {
                        "code": error_codes::DEPENDENCY_FAILURE,
                        "message": "A backing service is unavailable, please retry",
                    }
                })),
            )
                .into_response();
        }
    };

    request.extensions_mut().insert(CurrentUser { user });
    next.run(request).await
}

#[cfg(test)]
mod tests {
    #[test]
    fn test_extract_token_shapes() {
        let bearer = "Bearer abc123";
        assert_eq!(bearer.strip_prefix("Bearer "), Some("abc123"));

        let basic = "Basic credentials";
        assert_eq!(basic.strip_prefix("Bearer "), None);
    }
}
