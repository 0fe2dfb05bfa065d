//! In-memory contact store implementation.
//!
//! Used by tests and single-process runs. Uniqueness rules mirror the
//! SQLite schema: users are unique per mobile number and username, contact
//! rows per `(owner, mobile_number)` and `(owner, username)`, memberships
//! per `(group, user)`.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use entities::{
    AccessToken, ChatGroup, ContactBookEntry, GroupMember, LookupOutcome, NewChatGroup,
    NewContact, NewGroupMember, NewUser, User, UserLookup,
};
use tokio::sync::RwLock;

use crate::{ContactStore, ContactStoreError, ContactStoreResult};

#[derive(Debug, Default)]
struct Inner {
    users: HashMap<i64, User>,
    contacts: HashMap<i64, ContactBookEntry>,
    tokens: HashMap<String, AccessToken>,
    groups: HashMap<i64, ChatGroup>,
    members: HashMap<i64, GroupMember>,
    next_user_id: i64,
    next_contact_id: i64,
    next_group_id: i64,
    next_member_id: i64,
}

impl Inner {
    fn user_by_mobile(&self, mobile_number: &str) -> Option<&User> {
        self.users
            .values()
            .find(|u| u.mobile_number.as_deref() == Some(mobile_number))
    }

    fn contact_conflicts(&self, row: &NewContact) -> bool {
        self.contacts.values().any(|c| {
            c.owner_id == row.owner_id
                && (c.mobile_number == row.mobile_number
                    || (c.username.is_some() && c.username == row.username))
        })
    }
}

/// In-memory contact store.
#[derive(Debug, Default)]
pub struct MemoryContactStore {
    inner: Arc<RwLock<Inner>>,
}

impl MemoryContactStore {
    /// Creates a new in-memory contact store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ContactStore for MemoryContactStore {
    // =========================================================================
    // User operations
    // =========================================================================

    async fn create_or_fetch_user(&self, new_user: NewUser) -> ContactStoreResult<UserLookup> {
        let mut inner = self.inner.write().await;
        if let Some(user) = inner.user_by_mobile(&new_user.mobile_number) {
            return Ok(UserLookup {
                user: user.clone(),
                outcome: LookupOutcome::Existing,
            });
        }
        if inner.users.values().any(|u| u.username == new_user.username) {
            return Err(ContactStoreError::already_exists("User", new_user.username));
        }

        inner.next_user_id += 1;
        let now = Utc::now();
        let user = User {
            id: inner.next_user_id,
            username: new_user.username,
            name: new_user.name,
            country_code: new_user.country_code,
            mobile_number: Some(new_user.mobile_number),
            status: String::new(),
            bio: String::new(),
            login_otp: String::new(),
            last_sync: now,
            created_at: now,
        };
        inner.users.insert(user.id, user.clone());
        Ok(UserLookup {
            user,
            outcome: LookupOutcome::Created,
        })
    }

    async fn get_user(&self, id: i64) -> ContactStoreResult<Option<User>> {
        let inner = self.inner.read().await;
        Ok(inner.users.get(&id).cloned())
    }

    async fn get_user_by_mobile(&self, mobile_number: &str) -> ContactStoreResult<Option<User>> {
        let inner = self.inner.read().await;
        Ok(inner.user_by_mobile(mobile_number).cloned())
    }

    async fn update_user(&self, user: User) -> ContactStoreResult<User> {
        let mut inner = self.inner.write().await;
        if !inner.users.contains_key(&user.id) {
            return Err(ContactStoreError::not_found("User", user.id.to_string()));
        }
        inner.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn usernames_by_mobile(
        &self,
        numbers: &[String],
    ) -> ContactStoreResult<HashMap<String, String>> {
        let inner = self.inner.read().await;
        let wanted: HashSet<&str> = numbers.iter().map(String::as_str).collect();
        Ok(inner
            .users
            .values()
            .filter_map(|u| {
                let mobile = u.mobile_number.as_deref()?;
                wanted
                    .contains(mobile)
                    .then(|| (mobile.to_string(), u.username.clone()))
            })
            .collect())
    }

    async fn users_by_usernames(&self, usernames: &[String]) -> ContactStoreResult<Vec<User>> {
        let inner = self.inner.read().await;
        let wanted: HashSet<&str> = usernames.iter().map(String::as_str).collect();
        Ok(inner
            .users
            .values()
            .filter(|u| wanted.contains(u.username.as_str()))
            .cloned()
            .collect())
    }

    async fn advance_last_sync(&self, user_id: i64, to: DateTime<Utc>) -> ContactStoreResult<()> {
        let mut inner = self.inner.write().await;
        let user = inner
            .users
            .get_mut(&user_id)
            .ok_or_else(|| ContactStoreError::not_found("User", user_id.to_string()))?;
        if to > user.last_sync {
            user.last_sync = to;
        }
        Ok(())
    }

    // =========================================================================
    // Contact book operations
    // =========================================================================

    async fn known_numbers(
        &self,
        owner_id: i64,
        numbers: &[String],
    ) -> ContactStoreResult<HashSet<String>> {
        let inner = self.inner.read().await;
        let wanted: HashSet<&str> = numbers.iter().map(String::as_str).collect();
        Ok(inner
            .contacts
            .values()
            .filter(|c| c.owner_id == owner_id && wanted.contains(c.mobile_number.as_str()))
            .map(|c| c.mobile_number.clone())
            .collect())
    }

    async fn bulk_insert_contacts(
        &self,
        rows: Vec<NewContact>,
    ) -> ContactStoreResult<Vec<ContactBookEntry>> {
        let mut inner = self.inner.write().await;
        let mut inserted = Vec::new();
        for row in rows {
            if inner.contact_conflicts(&row) {
                tracing::debug!(
                    owner_id = row.owner_id,
                    mobile_number = %row.mobile_number,
                    "skipping conflicting contact row"
                );
                continue;
            }
            inner.next_contact_id += 1;
            let entry = row.into_entry(inner.next_contact_id);
            inner.contacts.insert(entry.id, entry.clone());
            inserted.push(entry);
        }
        Ok(inserted)
    }

    async fn activate_contacts(
        &self,
        mobile_number: &str,
        username: &str,
        at: DateTime<Utc>,
    ) -> ContactStoreResult<u64> {
        let mut inner = self.inner.write().await;
        let mut touched = 0;
        for contact in inner.contacts.values_mut() {
            if contact.mobile_number == mobile_number {
                contact.username = Some(username.to_string());
                contact.active = true;
                contact.updated_at = at;
                touched += 1;
            }
        }
        Ok(touched)
    }

    async fn contacts_updated_since(
        &self,
        owner_id: i64,
        watermark: DateTime<Utc>,
    ) -> ContactStoreResult<Vec<ContactBookEntry>> {
        let inner = self.inner.read().await;
        let mut result: Vec<ContactBookEntry> = inner
            .contacts
            .values()
            .filter(|c| {
                c.owner_id == owner_id
                    && c.updated_at >= watermark
                    && c.username.as_deref().is_some_and(|u| !u.is_empty())
            })
            .cloned()
            .collect();
        result.sort_by(|a, b| (a.updated_at, a.id).cmp(&(b.updated_at, b.id)));
        Ok(result)
    }

    // =========================================================================
    // Access token operations
    // =========================================================================

    async fn get_or_create_token(
        &self,
        user_id: i64,
        candidate: &str,
    ) -> ContactStoreResult<AccessToken> {
        let mut inner = self.inner.write().await;
        if let Some(existing) = inner.tokens.values().find(|t| t.user_id == user_id) {
            return Ok(existing.clone());
        }
        let token = AccessToken::new(candidate, user_id);
        inner.tokens.insert(token.token.clone(), token.clone());
        Ok(token)
    }

    async fn get_user_by_token(&self, token: &str) -> ContactStoreResult<Option<User>> {
        let inner = self.inner.read().await;
        Ok(inner
            .tokens
            .get(token)
            .and_then(|t| inner.users.get(&t.user_id))
            .cloned())
    }

    // =========================================================================
    // Chat group operations
    // =========================================================================

    async fn create_group(&self, group: NewChatGroup) -> ContactStoreResult<ChatGroup> {
        let mut inner = self.inner.write().await;
        inner.next_group_id += 1;
        let group = ChatGroup {
            id: inner.next_group_id,
            name: group.name,
            amount: group.amount,
            premium: group.premium,
            created_by: group.created_by,
            created_at: Utc::now(),
        };
        inner.groups.insert(group.id, group.clone());
        Ok(group)
    }

    async fn get_group(&self, id: i64) -> ContactStoreResult<Option<ChatGroup>> {
        let inner = self.inner.read().await;
        Ok(inner.groups.get(&id).cloned())
    }

    async fn list_groups_for_user(&self, user_id: i64) -> ContactStoreResult<Vec<ChatGroup>> {
        let inner = self.inner.read().await;
        let group_ids: HashSet<i64> = inner
            .members
            .values()
            .filter(|m| m.user_id == user_id)
            .map(|m| m.group_id)
            .collect();
        let mut result: Vec<ChatGroup> = inner
            .groups
            .values()
            .filter(|g| group_ids.contains(&g.id))
            .cloned()
            .collect();
        result.sort_by_key(|g| g.id);
        Ok(result)
    }

    async fn add_group_members(
        &self,
        members: Vec<NewGroupMember>,
    ) -> ContactStoreResult<Vec<GroupMember>> {
        let mut inner = self.inner.write().await;
        let mut added = Vec::new();
        for member in members {
            let exists = inner
                .members
                .values()
                .any(|m| m.group_id == member.group_id && m.user_id == member.user_id);
            if exists {
                continue;
            }
            inner.next_member_id += 1;
            let member = GroupMember {
                id: inner.next_member_id,
                group_id: member.group_id,
                user_id: member.user_id,
                is_admin: member.is_admin,
                joined_at: Utc::now(),
            };
            inner.members.insert(member.id, member.clone());
            added.push(member);
        }
        Ok(added)
    }

    async fn list_group_members(&self, group_id: i64) -> ContactStoreResult<Vec<GroupMember>> {
        let inner = self.inner.read().await;
        let mut result: Vec<GroupMember> = inner
            .members
            .values()
            .filter(|m| m.group_id == group_id)
            .cloned()
            .collect();
        result.sort_by_key(|m| m.id);
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn register(store: &MemoryContactStore, username: &str, mobile: &str) -> User {
        store
            .create_or_fetch_user(NewUser::new(username, "+39", mobile))
            .await
            .unwrap()
            .user
    }

    #[tokio::test]
    async fn test_create_or_fetch_user_tags_outcome() {
        let store = MemoryContactStore::new();

        let first = store
            .create_or_fetch_user(NewUser::new("alice99", "+39", "3331112222").with_name("Alice"))
            .await
            .unwrap();
        assert_eq!(first.outcome, LookupOutcome::Created);

        // Same number, different defaults: existing record wins.
        let second = store
            .create_or_fetch_user(NewUser::new("other", "+39", "3331112222"))
            .await
            .unwrap();
        assert_eq!(second.outcome, LookupOutcome::Existing);
        assert_eq!(second.user.id, first.user.id);
        assert_eq!(second.user.username, "alice99");
        assert_eq!(second.user.name, "Alice");
    }

    #[tokio::test]
    async fn test_bulk_insert_skips_conflicting_rows() {
        let store = MemoryContactStore::new();
        let owner = register(&store, "owner1", "3330000001").await;
        let now = Utc::now();

        let inserted = store
            .bulk_insert_contacts(vec![NewContact::new(
                owner.id,
                "Alice",
                "+39",
                "3331112222",
                now,
            )])
            .await
            .unwrap();
        assert_eq!(inserted.len(), 1);

        // Same (owner, number) again plus one fresh row: only the fresh row lands.
        let inserted = store
            .bulk_insert_contacts(vec![
                NewContact::new(owner.id, "Alicia", "+39", "3331112222", now),
                NewContact::new(owner.id, "Bob", "+39", "3334445555", now),
            ])
            .await
            .unwrap();
        assert_eq!(inserted.len(), 1);
        assert_eq!(inserted[0].name, "Bob");

        // Same (owner, username) under a different number is also rejected.
        let inserted = store
            .bulk_insert_contacts(vec![
                NewContact::new(owner.id, "Carol", "+39", "3335556666", now)
                    .with_username("carol7"),
                NewContact::new(owner.id, "Carol bis", "+39", "3337778888", now)
                    .with_username("carol7"),
            ])
            .await
            .unwrap();
        assert_eq!(inserted.len(), 1);
        assert_eq!(inserted[0].mobile_number, "3335556666");
    }

    #[tokio::test]
    async fn test_activation_touches_all_owners() {
        let store = MemoryContactStore::new();
        let owner_a = register(&store, "owner_a", "3330000001").await;
        let owner_b = register(&store, "owner_b", "3330000002").await;
        let then = Utc::now();

        store
            .bulk_insert_contacts(vec![
                NewContact::new(owner_a.id, "Dora", "+39", "3339990000", then),
                NewContact::new(owner_b.id, "Dorothy", "+39", "3339990000", then),
                NewContact::new(owner_b.id, "Eve", "+39", "3338880000", then),
            ])
            .await
            .unwrap();

        let at = Utc::now();
        let touched = store
            .activate_contacts("3339990000", "dora42", at)
            .await
            .unwrap();
        assert_eq!(touched, 2);

        for owner in [&owner_a, &owner_b] {
            let entries = store
                .contacts_updated_since(owner.id, then)
                .await
                .unwrap();
            assert_eq!(entries.len(), 1);
            assert_eq!(entries[0].username.as_deref(), Some("dora42"));
            assert!(entries[0].active);
            assert_eq!(entries[0].updated_at, at);
        }
    }

    #[tokio::test]
    async fn test_updated_since_excludes_dormant_and_old_rows() {
        let store = MemoryContactStore::new();
        let owner = register(&store, "owner1", "3330000001").await;
        let old = Utc::now() - chrono::Duration::seconds(60);
        let recent = Utc::now();

        store
            .bulk_insert_contacts(vec![
                NewContact::new(owner.id, "Old", "+39", "3331110000", old).with_username("old1"),
                NewContact::new(owner.id, "New", "+39", "3332220000", recent)
                    .with_username("new1"),
                NewContact::new(owner.id, "Dormant", "+39", "3333330000", recent),
            ])
            .await
            .unwrap();

        let watermark = Utc::now() - chrono::Duration::seconds(30);
        let entries = store.contacts_updated_since(owner.id, watermark).await.unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].name, "New");
    }

    #[tokio::test]
    async fn test_token_reuse() {
        let store = MemoryContactStore::new();
        let user = register(&store, "alice99", "3331112222").await;

        let first = store.get_or_create_token(user.id, "aaaa").await.unwrap();
        let second = store.get_or_create_token(user.id, "bbbb").await.unwrap();
        assert_eq!(first.token, second.token);

        let resolved = store.get_user_by_token(&first.token).await.unwrap().unwrap();
        assert_eq!(resolved.id, user.id);
        assert!(store.get_user_by_token("bbbb").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_last_sync_never_regresses() {
        let store = MemoryContactStore::new();
        let user = register(&store, "alice99", "3331112222").await;

        let forward = user.last_sync + chrono::Duration::seconds(10);
        store.advance_last_sync(user.id, forward).await.unwrap();

        let backward = user.last_sync - chrono::Duration::seconds(10);
        store.advance_last_sync(user.id, backward).await.unwrap();

        let stored = store.get_user(user.id).await.unwrap().unwrap();
        assert_eq!(stored.last_sync, forward);
    }

    #[tokio::test]
    async fn test_group_membership_dedup() {
        let store = MemoryContactStore::new();
        let creator = register(&store, "creator", "3330000001").await;
        let member = register(&store, "member", "3330000002").await;

        let group = store
            .create_group(NewChatGroup::new("friends", creator.id))
            .await
            .unwrap();

        let added = store
            .add_group_members(vec![
                NewGroupMember::admin(group.id, creator.id),
                NewGroupMember::new(group.id, member.id),
                NewGroupMember::new(group.id, member.id),
            ])
            .await
            .unwrap();
        assert_eq!(added.len(), 2);

        let members = store.list_group_members(group.id).await.unwrap();
        assert_eq!(members.len(), 2);
        assert!(members.iter().any(|m| m.user_id == creator.id && m.is_admin));

        let groups = store.list_groups_for_user(member.id).await.unwrap();
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].name, "friends");
    }
}
