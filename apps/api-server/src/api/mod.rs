//! API endpoints.

pub mod auth;
pub mod contacts;
pub mod groups;
pub mod users;

use axum::{
    middleware::from_fn_with_state,
    routing::{get, post},
    Router,
};
use contact_store::ContactStore;

use crate::middleware::auth_middleware;
use crate::state::SharedState;

/// Creates the API router with all endpoints.
pub fn create_router<S: ContactStore + 'static>(state: SharedState<S>) -> Router {
    let protected: Router<SharedState<S>> = Router::new()
        // Contact endpoints
        .route("/api/contacts/submit", post(contacts::submit_contacts))
        .route("/api/contacts/sync", get(contacts::fetch_sync))
        // Profile endpoints
        .route("/api/users/me", get(users::get_me).put(users::update_me))
        .route("/api/users/:mobile_number", get(users::get_by_mobile))
        // Group endpoints
        .route("/api/groups", post(groups::create_group).get(groups::list_groups))
        .route("/api/groups/:id", get(groups::get_group))
        .route("/api/groups/:id/members", post(groups::add_members))
        .route_layer(from_fn_with_state(state.clone(), auth_middleware::<S>));

    Router::new()
        // Auth endpoints
        .route("/api/auth/request-otp", post(auth::request_otp))
        .route("/api/auth/verify-otp", post(auth::verify_otp))
        // Health check
        .route("/health", get(health_check))
        .merge(protected)
        .with_state(state)
}

/// Health check endpoint.
async fn health_check() -> &'static str {
    "OK"
}
