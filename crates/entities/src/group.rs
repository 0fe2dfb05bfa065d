//! Chat group entity definitions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A chat group.
///
/// Premium groups gate member addition: only admin members may invite.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatGroup {
    /// Unique identifier, assigned by the store.
    pub id: i64,
    /// Group name.
    pub name: String,
    /// Subscription amount in minor currency units; zero for free groups.
    pub amount: i64,
    /// When true, only admin members may add members.
    pub premium: bool,
    /// The user who created the group.
    pub created_by: i64,
    /// When this record was created.
    pub created_at: DateTime<Utc>,
}

/// Fields needed to create a new chat group.
#[derive(Debug, Clone)]
pub struct NewChatGroup {
    /// Group name.
    pub name: String,
    /// Subscription amount in minor currency units.
    pub amount: i64,
    /// Premium flag.
    pub premium: bool,
    /// The creating user.
    pub created_by: i64,
}

impl NewChatGroup {
    /// Creates a free group record.
    pub fn new(name: impl Into<String>, created_by: i64) -> Self {
        Self {
            name: name.into(),
            amount: 0,
            premium: false,
            created_by,
        }
    }

    /// Marks the group as premium with the given amount.
    pub fn premium(mut self, amount: i64) -> Self {
        self.premium = true;
        self.amount = amount;
        self
    }
}

/// Membership of one user in one group, unique per `(group_id, user_id)`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupMember {
    /// Unique identifier, assigned by the store.
    pub id: i64,
    /// The group.
    pub group_id: i64,
    /// The member.
    pub user_id: i64,
    /// Admins may add members to premium groups.
    pub is_admin: bool,
    /// When the membership was created.
    pub joined_at: DateTime<Utc>,
}

/// Fields needed to create a new group membership.
#[derive(Debug, Clone)]
pub struct NewGroupMember {
    /// The group.
    pub group_id: i64,
    /// The member.
    pub user_id: i64,
    /// Admin flag.
    pub is_admin: bool,
}

impl NewGroupMember {
    /// Creates a regular membership.
    pub fn new(group_id: i64, user_id: i64) -> Self {
        Self {
            group_id,
            user_id,
            is_admin: false,
        }
    }

    /// Creates an admin membership.
    pub fn admin(group_id: i64, user_id: i64) -> Self {
        Self {
            group_id,
            user_id,
            is_admin: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_group_builder() {
        let free = NewChatGroup::new("friends", 1);
        assert!(!free.premium);
        assert_eq!(free.amount, 0);

        let paid = NewChatGroup::new("insiders", 1).premium(499);
        assert!(paid.premium);
        assert_eq!(paid.amount, 499);
    }

    #[test]
    fn test_member_builder() {
        assert!(NewGroupMember::admin(1, 2).is_admin);
        assert!(!NewGroupMember::new(1, 2).is_admin);
    }
}
