//! Application state.

use std::sync::Arc;

use contact_store::ContactStore;
use sms_gateway::SmsGateway;
use sync_engine::Reconciler;

use crate::config::Config;

/// Shared application state.
pub struct AppState<S: ContactStore> {
    /// Server configuration.
    pub config: Config,
    /// Contact and identity store.
    pub store: S,
    /// Outbound SMS gateway.
    pub sms: Arc<dyn SmsGateway>,
    /// Reconciliation engine.
    pub reconciler: Reconciler,
}

impl<S: ContactStore> AppState<S> {
    /// Creates new application state.
    pub fn new(config: Config, store: S, sms: Arc<dyn SmsGateway>) -> Self {
        let reconciler = Reconciler::new().with_max_batch(config.max_contact_batch);
        Self {
            config,
            store,
            sms,
            reconciler,
        }
    }
}

/// Type alias for shared state.
pub type SharedState<S> = Arc<AppState<S>>;

/// Creates shared state from config, store, and gateway.
pub fn create_shared_state<S: ContactStore>(
    config: Config,
    store: S,
    sms: Arc<dyn SmsGateway>,
) -> SharedState<S> {
    Arc::new(AppState::new(config, store, sms))
}
