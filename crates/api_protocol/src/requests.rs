//! API request types.

use serde::{Deserialize, Serialize};

// ============================================================================
// Auth requests
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestOtpRequest {
    pub country_code: String,
    pub mobile_number: String,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerifyOtpRequest {
    pub country_code: String,
    pub mobile_number: String,
    pub otp: String,
}

// ============================================================================
// Contact requests
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContactUpload {
    pub name: String,
    #[serde(default)]
    pub country_code: String,
    pub mobile_number: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitContactsRequest {
    pub contacts: Vec<ContactUpload>,
}

// ============================================================================
// Profile requests
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateProfileRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
}

// ============================================================================
// Group requests
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateGroupRequest {
    pub name: String,
    #[serde(default)]
    pub amount: i64,
    #[serde(default)]
    pub premium: bool,
    /// Usernames to add as initial members, besides the creator.
    #[serde(default)]
    pub users: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddGroupMembersRequest {
    pub users: Vec<String>,
}
