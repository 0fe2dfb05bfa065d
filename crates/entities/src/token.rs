//! Access token entity definitions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An opaque bearer credential tied to one user.
///
/// One token per user: repeated issuance returns the existing record rather
/// than minting a new one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessToken {
    /// The opaque credential string.
    pub token: String,
    /// The user this credential authenticates.
    pub user_id: i64,
    /// When this record was created.
    pub created_at: DateTime<Utc>,
}

impl AccessToken {
    /// Creates a token record for a user.
    pub fn new(token: impl Into<String>, user_id: i64) -> Self {
        Self {
            token: token.into(),
            user_id,
            created_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_creation() {
        let token = AccessToken::new("deadbeef", 7);
        assert_eq!(token.user_id, 7);
        assert_eq!(token.token, "deadbeef");
    }
}
