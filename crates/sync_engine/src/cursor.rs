//! The sync cursor protocol.

use chrono::{DateTime, Utc};
use contact_store::ContactStore;
use entities::{ContactBookEntry, User};

use crate::SyncResult;

/// The result of one sync call: the changed entries and the watermark the
/// caller's record was advanced to.
#[derive(Debug, Clone)]
pub struct SyncDelta {
    /// Activated entries updated since the previous watermark, ordered by
    /// `(updated_at, id)`.
    pub entries: Vec<ContactBookEntry>,
    /// The new watermark.
    pub watermark: DateTime<Utc>,
}

/// Computes the incremental delta for `user` and advances their watermark.
///
/// The watermark is taken and persisted only after the result set is
/// materialized. An activation landing in between is missed by this call
/// and picked up by the next one; the reverse order would skip it forever.
pub async fn fetch_updates<S: ContactStore>(store: &S, user: &User) -> SyncResult<SyncDelta> {
    let entries = store.contacts_updated_since(user.id, user.last_sync).await?;

    let watermark = Utc::now();
    store.advance_last_sync(user.id, watermark).await?;

    tracing::debug!(
        user_id = user.id,
        delivered = entries.len(),
        watermark = %watermark,
        "sync cursor advanced"
    );
    Ok(SyncDelta { entries, watermark })
}

#[cfg(test)]
mod tests {
    use contact_store::MemoryContactStore;
    use entities::NewUser;

    use super::*;
    use crate::{propagate_activation, RawContact, Reconciler};

    async fn register(store: &MemoryContactStore, username: &str, mobile: &str) -> User {
        store
            .create_or_fetch_user(NewUser::new(username, "+39", mobile))
            .await
            .unwrap()
            .user
    }

    fn raw(name: &str, mobile: &str) -> RawContact {
        RawContact {
            name: name.to_string(),
            country_code: "+39".to_string(),
            mobile_number: mobile.to_string(),
        }
    }

    #[tokio::test]
    async fn test_second_sync_is_empty() {
        let store = MemoryContactStore::new();
        let owner = register(&store, "owner1", "3330000001").await;
        register(&store, "u1", "3331112222").await;

        Reconciler::new()
            .submit(&store, &owner, vec![raw("Alice", "3331112222")])
            .await
            .unwrap();

        let before = owner.last_sync;
        let first = fetch_updates(&store, &owner).await.unwrap();
        assert_eq!(first.entries.len(), 1);
        assert!(first.watermark >= before);

        // No further changes: the next call sees an empty delta.
        let owner = store.get_user(owner.id).await.unwrap().unwrap();
        let second = fetch_updates(&store, &owner).await.unwrap();
        assert!(second.entries.is_empty());
        assert!(second.watermark >= first.watermark);
    }

    #[tokio::test]
    async fn test_activation_surfaces_in_first_sync_after_it() {
        let store = MemoryContactStore::new();
        let owner = register(&store, "owner1", "3330000001").await;

        Reconciler::new()
            .submit(&store, &owner, vec![raw("Dora", "3339990000")])
            .await
            .unwrap();

        // Dormant entry: invisible to sync.
        let owner = store.get_user(owner.id).await.unwrap().unwrap();
        let delta = fetch_updates(&store, &owner).await.unwrap();
        assert!(delta.entries.is_empty());

        // The number registers and verifies at T1 > the owner's watermark.
        let dora = register(&store, "dora42", "3339990000").await;
        let activated_at = Utc::now();
        propagate_activation(&store, &dora).await.unwrap();

        let owner = store.get_user(owner.id).await.unwrap().unwrap();
        let delta = fetch_updates(&store, &owner).await.unwrap();
        assert_eq!(delta.entries.len(), 1);
        assert_eq!(delta.entries[0].username.as_deref(), Some("dora42"));
        // The new watermark does not regress before the activation.
        assert!(delta.watermark >= activated_at);

        // Exactly-once: the entry does not reappear.
        let owner = store.get_user(owner.id).await.unwrap().unwrap();
        let delta = fetch_updates(&store, &owner).await.unwrap();
        assert!(delta.entries.is_empty());
    }

    #[tokio::test]
    async fn test_never_activated_rows_are_never_surfaced() {
        let store = MemoryContactStore::new();
        let owner = register(&store, "owner1", "3330000001").await;

        Reconciler::new()
            .submit(&store, &owner, vec![raw("Ghost", "3337770000")])
            .await
            .unwrap();

        for _ in 0..3 {
            let owner = store.get_user(owner.id).await.unwrap().unwrap();
            let delta = fetch_updates(&store, &owner).await.unwrap();
            assert!(delta.entries.is_empty());
        }
    }
}
