//! Logging gateway for development deployments.

use async_trait::async_trait;

use crate::{SmsGateway, SmsResult};

/// Gateway that logs messages instead of delivering them.
#[derive(Debug, Default, Clone)]
pub struct LogSmsGateway;

impl LogSmsGateway {
    /// Creates a new logging gateway.
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl SmsGateway for LogSmsGateway {
    async fn send(&self, to: &str, body: &str) -> SmsResult<()> {
        tracing::info!(to = %to, body = %body, "SMS (log-only gateway)");
        Ok(())
    }
}
