//! Parley API Server
//!
//! HTTP surface for the contacts-sync backend: OTP login, contact
//! submission and incremental sync, profiles, and chat groups.

pub mod api;
pub mod config;
pub mod error;
pub mod middleware;
pub mod state;

use std::sync::Arc;

use axum::Router;
use contact_store::ContactStore;
use sms_gateway::SmsGateway;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::config::Config;
use crate::state::{create_shared_state, SharedState};

/// Creates the application router with all routes configured.
pub fn create_app<S: ContactStore + 'static>(state: SharedState<S>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    api::create_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

/// Creates the application state with the given configuration, store, and
/// SMS gateway.
pub fn create_state<S: ContactStore>(
    config: Config,
    store: S,
    sms: Arc<dyn SmsGateway>,
) -> SharedState<S> {
    create_shared_state(config, store, sms)
}

/// Initializes tracing with the given log level.
pub fn init_tracing(log_level: &str) {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();
}
