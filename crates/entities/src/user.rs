//! User-related entity definitions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A registered user, keyed by a store-assigned integer id.
///
/// `mobile_number` is globally unique once set and never reused by another
/// user. `login_otp` is the pending OTP challenge; an empty string means no
/// challenge is outstanding.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// Unique identifier, assigned by the store at creation.
    pub id: i64,
    /// Public username, globally unique.
    pub username: String,
    /// Display name.
    pub name: String,
    /// Dialing country code, e.g. "+39".
    pub country_code: String,
    /// Mobile number, globally unique once set.
    pub mobile_number: Option<String>,
    /// Status line shown to contacts.
    pub status: String,
    /// Profile bio.
    pub bio: String,
    /// Pending OTP challenge; empty when no challenge is outstanding.
    pub login_otp: String,
    /// Sync watermark: everything updated before this has been delivered.
    pub last_sync: DateTime<Utc>,
    /// When this record was created.
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Returns true if an OTP challenge is outstanding.
    pub fn has_pending_challenge(&self) -> bool {
        !self.login_otp.is_empty()
    }

    /// Starts (or replaces) an OTP challenge with the given code.
    pub fn begin_challenge(&mut self, code: impl Into<String>) {
        self.login_otp = code.into();
    }

    /// Checks a submitted code against the pending challenge.
    ///
    /// A match clears the challenge; a mismatch leaves it pending. An empty
    /// submission never matches, so a user with no outstanding challenge
    /// cannot be verified.
    pub fn verify_challenge(&mut self, submitted: &str) -> bool {
        if self.login_otp.is_empty() || self.login_otp != submitted {
            return false;
        }
        self.login_otp.clear();
        true
    }
}

/// Fields needed to create a new user record.
#[derive(Debug, Clone)]
pub struct NewUser {
    /// Public username; auto-generated by the caller when not supplied.
    pub username: String,
    /// Display name.
    pub name: String,
    /// Dialing country code.
    pub country_code: String,
    /// Mobile number the user is registering with.
    pub mobile_number: String,
}

impl NewUser {
    /// Creates a new-user record.
    pub fn new(
        username: impl Into<String>,
        country_code: impl Into<String>,
        mobile_number: impl Into<String>,
    ) -> Self {
        Self {
            username: username.into(),
            name: String::new(),
            country_code: country_code.into(),
            mobile_number: mobile_number.into(),
        }
    }

    /// Sets the display name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }
}

/// Outcome of a get-or-create user lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookupOutcome {
    /// A fresh record was inserted.
    Created,
    /// A record with this mobile number already existed.
    Existing,
}

/// A user together with how the lookup resolved.
#[derive(Debug, Clone)]
pub struct UserLookup {
    /// The resolved user.
    pub user: User,
    /// Whether the record was created or already present.
    pub outcome: LookupOutcome,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_user() -> User {
        let now = Utc::now();
        User {
            id: 1,
            username: "u1".to_string(),
            name: "Test".to_string(),
            country_code: "+39".to_string(),
            mobile_number: Some("3331112222".to_string()),
            status: String::new(),
            bio: String::new(),
            login_otp: String::new(),
            last_sync: now,
            created_at: now,
        }
    }

    #[test]
    fn test_challenge_lifecycle() {
        let mut user = sample_user();
        assert!(!user.has_pending_challenge());

        user.begin_challenge("12345");
        assert!(user.has_pending_challenge());

        // Wrong code leaves the challenge pending.
        assert!(!user.verify_challenge("54321"));
        assert!(user.has_pending_challenge());

        // Correct code clears it.
        assert!(user.verify_challenge("12345"));
        assert!(!user.has_pending_challenge());
    }

    #[test]
    fn test_empty_code_never_matches() {
        let mut user = sample_user();
        assert!(!user.verify_challenge(""));

        // A new challenge overwrites the pending one.
        user.begin_challenge("11111");
        user.begin_challenge("22222");
        assert!(!user.verify_challenge("11111"));
        assert!(user.verify_challenge("22222"));
    }

    #[test]
    fn test_new_user_builder() {
        let new_user = NewUser::new("rnd0user123", "+39", "3331112222").with_name("Alice");
        assert_eq!(new_user.name, "Alice");
        assert_eq!(new_user.mobile_number, "3331112222");
    }
}
