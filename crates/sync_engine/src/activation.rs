//! The activation propagator.

use chrono::Utc;
use contact_store::ContactStore;
use entities::User;

use crate::SyncResult;

/// Marks every contact entry referencing `user`'s mobile number, across all
/// owners, as active under their username.
///
/// Runs after OTP verification and must be durably committed before the
/// caller learns that verification succeeded, so any affected owner's next
/// sync observes the activation. Idempotent: a repeat run rewrites the same
/// username and refreshes `updated_at`.
///
/// Returns the number of rows touched.
pub async fn propagate_activation<S: ContactStore>(store: &S, user: &User) -> SyncResult<u64> {
    let Some(mobile_number) = user.mobile_number.as_deref() else {
        return Ok(0);
    };

    let touched = store
        .activate_contacts(mobile_number, &user.username, Utc::now())
        .await?;
    if touched > 0 {
        tracing::info!(
            user_id = user.id,
            username = %user.username,
            touched,
            "activated contact entries"
        );
    }
    Ok(touched)
}

#[cfg(test)]
mod tests {
    use contact_store::MemoryContactStore;
    use entities::NewUser;

    use super::*;
    use crate::{RawContact, Reconciler};

    #[tokio::test]
    async fn test_dormant_entries_activate_across_owners() {
        let store = MemoryContactStore::new();
        let reconciler = Reconciler::new();

        let mut owners = Vec::new();
        for (username, mobile) in [("owner_a", "3330000001"), ("owner_b", "3330000002")] {
            let owner = store
                .create_or_fetch_user(NewUser::new(username, "+39", mobile))
                .await
                .unwrap()
                .user;
            reconciler
                .submit(
                    &store,
                    &owner,
                    vec![RawContact {
                        name: "Dora".to_string(),
                        country_code: "+39".to_string(),
                        mobile_number: "3339990000".to_string(),
                    }],
                )
                .await
                .unwrap();
            owners.push(owner);
        }

        let registered_at = Utc::now();
        let dora = store
            .create_or_fetch_user(NewUser::new("dora42", "+39", "3339990000"))
            .await
            .unwrap()
            .user;

        let touched = propagate_activation(&store, &dora).await.unwrap();
        assert_eq!(touched, 2);

        for owner in &owners {
            let entries = store
                .contacts_updated_since(owner.id, registered_at)
                .await
                .unwrap();
            assert_eq!(entries.len(), 1);
            assert!(entries[0].active);
            assert_eq!(entries[0].username.as_deref(), Some("dora42"));
            assert!(entries[0].updated_at >= registered_at);
            assert!(entries[0].is_consistent());
        }
    }

    #[tokio::test]
    async fn test_repeat_activation_is_idempotent() {
        let store = MemoryContactStore::new();
        let owner = store
            .create_or_fetch_user(NewUser::new("owner1", "+39", "3330000001"))
            .await
            .unwrap()
            .user;
        Reconciler::new()
            .submit(
                &store,
                &owner,
                vec![RawContact {
                    name: "Dora".to_string(),
                    country_code: "+39".to_string(),
                    mobile_number: "3339990000".to_string(),
                }],
            )
            .await
            .unwrap();

        let dora = store
            .create_or_fetch_user(NewUser::new("dora42", "+39", "3339990000"))
            .await
            .unwrap()
            .user;

        assert_eq!(propagate_activation(&store, &dora).await.unwrap(), 1);
        assert_eq!(propagate_activation(&store, &dora).await.unwrap(), 1);

        let entries = store
            .contacts_updated_since(owner.id, chrono::DateTime::<Utc>::MIN_UTC)
            .await
            .unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].username.as_deref(), Some("dora42"));
    }

    #[tokio::test]
    async fn test_user_without_number_is_a_noop() {
        let store = MemoryContactStore::new();
        let mut user = store
            .create_or_fetch_user(NewUser::new("limbo", "+39", "3330000009"))
            .await
            .unwrap()
            .user;
        user.mobile_number = None;

        assert_eq!(propagate_activation(&store, &user).await.unwrap(), 0);
    }
}
