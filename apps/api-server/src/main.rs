//! Parley API Server binary.

use std::net::SocketAddr;
use std::sync::Arc;

use api_server::{config::Config, create_app, create_state, init_tracing};
use contact_store::SqliteContactStore;
use sms_gateway::LogSmsGateway;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env if present
    dotenvy::dotenv().ok();

    // Load configuration
    let config = Config::from_env()?;

    // Initialize tracing
    init_tracing(&config.log_level);

    tracing::info!(
        database_url = %config.database_url,
        max_contact_batch = ?config.max_contact_batch,
        "Starting Parley API Server"
    );

    // Connect the store and bootstrap the schema
    let store = SqliteContactStore::connect(&config.database_url).await?;

    // OTP delivery gateway; swap for a real provider in deployment
    let sms = Arc::new(LogSmsGateway::new());

    // Create application state
    let state = create_state(config.clone(), store, sms);

    // Create application router
    let app = create_app(state);

    // Parse server address
    let addr: SocketAddr = config.server_addr().parse()?;

    tracing::info!(addr = %addr, "Server listening");

    // Start server
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
