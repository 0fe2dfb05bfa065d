//! Recording gateway for tests.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::{SmsError, SmsGateway, SmsResult};

/// A sent message captured by [`RecordingSmsGateway`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentSms {
    /// Destination number.
    pub to: String,
    /// Message body.
    pub body: String,
}

/// Gateway that records messages in memory, optionally failing every send.
///
/// Exported for use by tests in dependent crates, the same way the store
/// crate exports its in-memory implementation.
#[derive(Debug, Default, Clone)]
pub struct RecordingSmsGateway {
    sent: Arc<Mutex<Vec<SentSms>>>,
    fail: bool,
}

impl RecordingSmsGateway {
    /// Creates a gateway that accepts every send.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a gateway that fails every send.
    pub fn failing() -> Self {
        Self {
            sent: Arc::default(),
            fail: true,
        }
    }

    /// Returns the messages sent so far.
    pub async fn sent(&self) -> Vec<SentSms> {
        self.sent.lock().await.clone()
    }
}

#[async_trait]
impl SmsGateway for RecordingSmsGateway {
    async fn send(&self, to: &str, body: &str) -> SmsResult<()> {
        if self.fail {
            return Err(SmsError::Unreachable("recording gateway set to fail".into()));
        }
        self.sent.lock().await.push(SentSms {
            to: to.to_string(),
            body: body.to_string(),
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_records_sends() {
        let gateway = RecordingSmsGateway::new();
        gateway.send("+393331112222", "code 12345").await.unwrap();

        let sent = gateway.sent().await;
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].to, "+393331112222");
    }

    #[tokio::test]
    async fn test_failing_gateway() {
        let gateway = RecordingSmsGateway::failing();
        assert!(gateway.send("+393331112222", "code").await.is_err());
        assert!(gateway.sent().await.is_empty());
    }
}
