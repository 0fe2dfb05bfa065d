//! Shared wire types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A contact row as exposed to clients.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Contact {
    pub name: String,
    pub country_code: String,
    pub mobile_number: String,
    pub username: Option<String>,
}

/// A contact row in a sync delta, with its change timestamp.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncedContact {
    pub name: String,
    pub country_code: String,
    pub mobile_number: String,
    pub username: String,
    pub updated_at: DateTime<Utc>,
}

/// A user profile as exposed to clients.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: i64,
    pub username: String,
    pub name: String,
    pub country_code: String,
    pub mobile_number: Option<String>,
    pub status: String,
    pub bio: String,
}

/// A group member in group detail responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupMemberDetail {
    pub id: i64,
    pub username: String,
    pub name: String,
    pub is_admin: bool,
}

/// A chat group as exposed to clients.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Group {
    pub id: i64,
    pub name: String,
    pub amount: i64,
    pub premium: bool,
    pub created_by: i64,
    pub created_at: DateTime<Utc>,
}
