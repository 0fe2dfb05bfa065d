//! SMS gateway trait.

use async_trait::async_trait;

use crate::SmsResult;

/// Trait for outbound SMS delivery.
#[async_trait]
pub trait SmsGateway: Send + Sync {
    /// Sends `body` to the E.164-style destination `to`.
    async fn send(&self, to: &str, body: &str) -> SmsResult<()>;
}
