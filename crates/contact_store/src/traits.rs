//! Contact store trait definitions.

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use entities::{
    AccessToken, ChatGroup, ContactBookEntry, GroupMember, NewChatGroup, NewContact,
    NewGroupMember, NewUser, User, UserLookup,
};

use crate::ContactStoreResult;

/// Trait for contact and identity storage operations.
///
/// Bulk contact insertion is partial-tolerant: rows rejected by a
/// uniqueness constraint are silently dropped while sibling rows proceed.
/// Activation is an atomic bulk update over the matched set. Implementations
/// rely on their own uniqueness constraints for concurrency control; callers
/// never take application-level locks.
#[async_trait]
pub trait ContactStore: Send + Sync {
    // =========================================================================
    // User operations
    // =========================================================================

    /// Fetches the user registered with the given mobile number, creating
    /// the record if absent. The result is tagged with whether the record
    /// was created or already existed.
    async fn create_or_fetch_user(&self, new_user: NewUser) -> ContactStoreResult<UserLookup>;

    /// Gets a user by ID.
    async fn get_user(&self, id: i64) -> ContactStoreResult<Option<User>>;

    /// Gets a user by mobile number.
    async fn get_user_by_mobile(&self, mobile_number: &str) -> ContactStoreResult<Option<User>>;

    /// Updates a user record in place.
    async fn update_user(&self, user: User) -> ContactStoreResult<User>;

    /// Maps each registered mobile number in `numbers` to its username.
    /// Unregistered numbers are simply absent from the result.
    async fn usernames_by_mobile(
        &self,
        numbers: &[String],
    ) -> ContactStoreResult<HashMap<String, String>>;

    /// Gets the users behind the given usernames. Unknown usernames are
    /// absent from the result.
    async fn users_by_usernames(&self, usernames: &[String]) -> ContactStoreResult<Vec<User>>;

    /// Advances a user's sync watermark. The watermark never regresses: a
    /// `to` value at or before the stored one leaves the record unchanged.
    async fn advance_last_sync(&self, user_id: i64, to: DateTime<Utc>) -> ContactStoreResult<()>;

    // =========================================================================
    // Contact book operations
    // =========================================================================

    /// Returns the subset of `numbers` the owner already has entries for.
    async fn known_numbers(
        &self,
        owner_id: i64,
        numbers: &[String],
    ) -> ContactStoreResult<HashSet<String>>;

    /// Bulk-inserts contact rows, returning the rows that were actually
    /// persisted. A row that loses a uniqueness race is dropped from the
    /// result without failing its siblings.
    async fn bulk_insert_contacts(
        &self,
        rows: Vec<NewContact>,
    ) -> ContactStoreResult<Vec<ContactBookEntry>>;

    /// Marks every contact entry holding `mobile_number`, across all
    /// owners, as active under `username`, stamping `at` as the update
    /// time. Returns the number of rows touched.
    async fn activate_contacts(
        &self,
        mobile_number: &str,
        username: &str,
        at: DateTime<Utc>,
    ) -> ContactStoreResult<u64>;

    /// Lists the owner's activated entries updated at or after `watermark`,
    /// ordered by `(updated_at, id)`. Entries never activated are excluded.
    async fn contacts_updated_since(
        &self,
        owner_id: i64,
        watermark: DateTime<Utc>,
    ) -> ContactStoreResult<Vec<ContactBookEntry>>;

    // =========================================================================
    // Access token operations
    // =========================================================================

    /// Returns the user's access token, storing `candidate` as the token
    /// if the user has none yet. Repeated calls return the same record.
    async fn get_or_create_token(
        &self,
        user_id: i64,
        candidate: &str,
    ) -> ContactStoreResult<AccessToken>;

    /// Resolves a bearer token to its user.
    async fn get_user_by_token(&self, token: &str) -> ContactStoreResult<Option<User>>;

    // =========================================================================
    // Chat group operations
    // =========================================================================

    /// Creates a new chat group.
    async fn create_group(&self, group: NewChatGroup) -> ContactStoreResult<ChatGroup>;

    /// Gets a chat group by ID.
    async fn get_group(&self, id: i64) -> ContactStoreResult<Option<ChatGroup>>;

    /// Lists the groups a user belongs to.
    async fn list_groups_for_user(&self, user_id: i64) -> ContactStoreResult<Vec<ChatGroup>>;

    /// Adds memberships, returning the ones actually created. A membership
    /// that already exists is dropped from the result without failing its
    /// siblings.
    async fn add_group_members(
        &self,
        members: Vec<NewGroupMember>,
    ) -> ContactStoreResult<Vec<GroupMember>>;

    /// Lists the members of a group.
    async fn list_group_members(&self, group_id: i64) -> ContactStoreResult<Vec<GroupMember>>;
}
