//! Contact book entity definitions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One contact book row: "this owner knows this mobile number".
///
/// At most one entry exists per `(owner_id, mobile_number)` pair, and per
/// `(owner_id, username)` pair once the username is known. `username` is the
/// denormalized handle of the registered user behind the number; it is set
/// at reconciliation time when the number is already registered, or later by
/// activation propagation. The `active == username.is_some()` invariant
/// holds at all times.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContactBookEntry {
    /// Unique identifier, assigned by the store.
    pub id: i64,
    /// The user who submitted this entry.
    pub owner_id: i64,
    /// Contact name as the owner typed it.
    pub name: String,
    /// Dialing country code.
    pub country_code: String,
    /// Contact mobile number.
    pub mobile_number: String,
    /// Username of the registered user behind the number, if known.
    pub username: Option<String>,
    /// True iff the number belongs to a registered user.
    pub active: bool,
    /// Refreshed on every mutation; drives incremental sync.
    pub updated_at: DateTime<Utc>,
}

impl ContactBookEntry {
    /// Returns true if the active flag matches the username presence.
    pub fn is_consistent(&self) -> bool {
        self.active == self.username.is_some()
    }
}

/// Fields needed to create a new contact book row.
///
/// `active` is derived from `username` so a freshly built row cannot violate
/// the consistency invariant.
#[derive(Debug, Clone)]
pub struct NewContact {
    /// The owning user.
    pub owner_id: i64,
    /// Contact name as submitted.
    pub name: String,
    /// Dialing country code.
    pub country_code: String,
    /// Contact mobile number.
    pub mobile_number: String,
    /// Username when the number is already registered.
    pub username: Option<String>,
    /// Creation timestamp, also the initial `updated_at`.
    pub updated_at: DateTime<Utc>,
}

impl NewContact {
    /// Creates a new-contact record stamped with the given time.
    pub fn new(
        owner_id: i64,
        name: impl Into<String>,
        country_code: impl Into<String>,
        mobile_number: impl Into<String>,
        updated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            owner_id,
            name: name.into(),
            country_code: country_code.into(),
            mobile_number: mobile_number.into(),
            username: None,
            updated_at,
        }
    }

    /// Associates the row with a registered username.
    pub fn with_username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }

    /// True iff the number resolved to a registered user.
    pub fn is_active(&self) -> bool {
        self.username.is_some()
    }

    /// Builds the stored entry once the store has assigned an id.
    pub fn into_entry(self, id: i64) -> ContactBookEntry {
        ContactBookEntry {
            id,
            owner_id: self.owner_id,
            name: self.name,
            country_code: self.country_code,
            mobile_number: self.mobile_number,
            active: self.username.is_some(),
            username: self.username,
            updated_at: self.updated_at,
        }
    }
}
