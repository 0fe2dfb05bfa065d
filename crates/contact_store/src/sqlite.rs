//! SQLite contact store implementation.
//!
//! Uniqueness constraints in the schema are the only concurrency guard for
//! bulk inserts: a row losing a race is rejected by `ON CONFLICT DO
//! NOTHING` and dropped from the result while sibling rows proceed.

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use entities::{
    AccessToken, ChatGroup, ContactBookEntry, GroupMember, LookupOutcome, NewChatGroup,
    NewContact, NewGroupMember, NewUser, User, UserLookup,
};
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::Row;

use crate::{ContactStore, ContactStoreError, ContactStoreResult};

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS users (
    id            INTEGER PRIMARY KEY AUTOINCREMENT,
    username      TEXT NOT NULL UNIQUE,
    name          TEXT NOT NULL DEFAULT '',
    country_code  TEXT NOT NULL DEFAULT '',
    mobile_number TEXT UNIQUE,
    status        TEXT NOT NULL DEFAULT '',
    bio           TEXT NOT NULL DEFAULT '',
    login_otp     TEXT NOT NULL DEFAULT '',
    last_sync     TEXT NOT NULL,
    created_at    TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS contacts (
    id            INTEGER PRIMARY KEY AUTOINCREMENT,
    owner_id      INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    name          TEXT NOT NULL,
    country_code  TEXT NOT NULL DEFAULT '',
    mobile_number TEXT NOT NULL,
    username      TEXT,
    active        INTEGER NOT NULL DEFAULT 0,
    updated_at    TEXT NOT NULL,
    UNIQUE (owner_id, mobile_number),
    UNIQUE (owner_id, username)
);

CREATE INDEX IF NOT EXISTS idx_contacts_mobile ON contacts (mobile_number);
CREATE INDEX IF NOT EXISTS idx_contacts_owner_updated ON contacts (owner_id, updated_at);

CREATE TABLE IF NOT EXISTS access_tokens (
    token      TEXT PRIMARY KEY,
    user_id    INTEGER NOT NULL UNIQUE REFERENCES users(id) ON DELETE CASCADE,
    created_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS chat_groups (
    id         INTEGER PRIMARY KEY AUTOINCREMENT,
    name       TEXT NOT NULL,
    amount     INTEGER NOT NULL DEFAULT 0,
    premium    INTEGER NOT NULL DEFAULT 0,
    created_by INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    created_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS group_members (
    id        INTEGER PRIMARY KEY AUTOINCREMENT,
    group_id  INTEGER NOT NULL REFERENCES chat_groups(id) ON DELETE CASCADE,
    user_id   INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    is_admin  INTEGER NOT NULL DEFAULT 0,
    joined_at TEXT NOT NULL,
    UNIQUE (group_id, user_id)
);
"#;

/// SQLite-backed contact store.
#[derive(Debug, Clone)]
pub struct SqliteContactStore {
    pool: SqlitePool,
}

impl SqliteContactStore {
    /// Connects to the given database URL and bootstraps the schema.
    pub async fn connect(database_url: &str) -> ContactStoreResult<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect(database_url)
            .await?;
        let store = Self { pool };
        store.migrate().await?;
        Ok(store)
    }

    /// Wraps an existing pool, bootstrapping the schema.
    pub async fn with_pool(pool: SqlitePool) -> ContactStoreResult<Self> {
        let store = Self { pool };
        store.migrate().await?;
        Ok(store)
    }

    async fn migrate(&self) -> ContactStoreResult<()> {
        sqlx::raw_sql(SCHEMA).execute(&self.pool).await?;
        Ok(())
    }
}

fn user_from_row(row: &SqliteRow) -> ContactStoreResult<User> {
    Ok(User {
        id: row.try_get("id")?,
        username: row.try_get("username")?,
        name: row.try_get("name")?,
        country_code: row.try_get("country_code")?,
        mobile_number: row.try_get("mobile_number")?,
        status: row.try_get("status")?,
        bio: row.try_get("bio")?,
        login_otp: row.try_get("login_otp")?,
        last_sync: row.try_get("last_sync")?,
        created_at: row.try_get("created_at")?,
    })
}

fn contact_from_row(row: &SqliteRow) -> ContactStoreResult<ContactBookEntry> {
    Ok(ContactBookEntry {
        id: row.try_get("id")?,
        owner_id: row.try_get("owner_id")?,
        name: row.try_get("name")?,
        country_code: row.try_get("country_code")?,
        mobile_number: row.try_get("mobile_number")?,
        username: row.try_get("username")?,
        active: row.try_get("active")?,
        updated_at: row.try_get("updated_at")?,
    })
}

fn group_from_row(row: &SqliteRow) -> ContactStoreResult<ChatGroup> {
    Ok(ChatGroup {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        amount: row.try_get("amount")?,
        premium: row.try_get("premium")?,
        created_by: row.try_get("created_by")?,
        created_at: row.try_get("created_at")?,
    })
}

fn member_from_row(row: &SqliteRow) -> ContactStoreResult<GroupMember> {
    Ok(GroupMember {
        id: row.try_get("id")?,
        group_id: row.try_get("group_id")?,
        user_id: row.try_get("user_id")?,
        is_admin: row.try_get("is_admin")?,
        joined_at: row.try_get("joined_at")?,
    })
}

fn placeholders(count: usize) -> String {
    vec!["?"; count].join(", ")
}

#[async_trait]
impl ContactStore for SqliteContactStore {
    // =========================================================================
    // User operations
    // =========================================================================

    async fn create_or_fetch_user(&self, new_user: NewUser) -> ContactStoreResult<UserLookup> {
        let now = Utc::now();
        let result = sqlx::query(
            "INSERT INTO users (username, name, country_code, mobile_number, last_sync, created_at) \
             VALUES (?, ?, ?, ?, ?, ?) \
             ON CONFLICT (mobile_number) DO NOTHING",
        )
        .bind(&new_user.username)
        .bind(&new_user.name)
        .bind(&new_user.country_code)
        .bind(&new_user.mobile_number)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 1 {
            let row = sqlx::query("SELECT * FROM users WHERE id = ?")
                .bind(result.last_insert_rowid())
                .fetch_one(&self.pool)
                .await?;
            return Ok(UserLookup {
                user: user_from_row(&row)?,
                outcome: LookupOutcome::Created,
            });
        }

        // Lost the insert: the number is already registered.
        let user = self
            .get_user_by_mobile(&new_user.mobile_number)
            .await?
            .ok_or_else(|| ContactStoreError::not_found("User", new_user.mobile_number.clone()))?;
        Ok(UserLookup {
            user,
            outcome: LookupOutcome::Existing,
        })
    }

    async fn get_user(&self, id: i64) -> ContactStoreResult<Option<User>> {
        let row = sqlx::query("SELECT * FROM users WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(user_from_row).transpose()
    }

    async fn get_user_by_mobile(&self, mobile_number: &str) -> ContactStoreResult<Option<User>> {
        let row = sqlx::query("SELECT * FROM users WHERE mobile_number = ?")
            .bind(mobile_number)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(user_from_row).transpose()
    }

    async fn update_user(&self, user: User) -> ContactStoreResult<User> {
        let result = sqlx::query(
            "UPDATE users SET username = ?, name = ?, country_code = ?, mobile_number = ?, \
             status = ?, bio = ?, login_otp = ? WHERE id = ?",
        )
        .bind(&user.username)
        .bind(&user.name)
        .bind(&user.country_code)
        .bind(&user.mobile_number)
        .bind(&user.status)
        .bind(&user.bio)
        .bind(&user.login_otp)
        .bind(user.id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(ContactStoreError::not_found("User", user.id.to_string()));
        }
        Ok(user)
    }

    async fn usernames_by_mobile(
        &self,
        numbers: &[String],
    ) -> ContactStoreResult<HashMap<String, String>> {
        if numbers.is_empty() {
            return Ok(HashMap::new());
        }
        let sql = format!(
            "SELECT mobile_number, username FROM users WHERE mobile_number IN ({})",
            placeholders(numbers.len())
        );
        let mut query = sqlx::query(&sql);
        for number in numbers {
            query = query.bind(number);
        }
        let rows = query.fetch_all(&self.pool).await?;
        rows.iter()
            .map(|row| {
                Ok((
                    row.try_get::<String, _>("mobile_number")?,
                    row.try_get::<String, _>("username")?,
                ))
            })
            .collect()
    }

    async fn users_by_usernames(&self, usernames: &[String]) -> ContactStoreResult<Vec<User>> {
        if usernames.is_empty() {
            return Ok(Vec::new());
        }
        let sql = format!(
            "SELECT * FROM users WHERE username IN ({})",
            placeholders(usernames.len())
        );
        let mut query = sqlx::query(&sql);
        for username in usernames {
            query = query.bind(username);
        }
        let rows = query.fetch_all(&self.pool).await?;
        rows.iter().map(user_from_row).collect()
    }

    async fn advance_last_sync(&self, user_id: i64, to: DateTime<Utc>) -> ContactStoreResult<()> {
        sqlx::query("UPDATE users SET last_sync = ? WHERE id = ? AND last_sync < ?")
            .bind(to)
            .bind(user_id)
            .bind(to)
            .execute(&self.pool)
            .await?;
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
        if numbers.is_empty() {
            return Ok(HashSet::new());
        }
        let sql = format!(
            "SELECT mobile_number FROM contacts WHERE owner_id = ? AND mobile_number IN ({})",
            placeholders(numbers.len())
        );
        let mut query = sqlx::query(&sql).bind(owner_id);
        for number in numbers {
            query = query.bind(number);
        }
        let rows = query.fetch_all(&self.pool).await?;
        rows.iter()
            .map(|row| Ok(row.try_get::<String, _>("mobile_number")?))
            .collect()
    }

    async fn bulk_insert_contacts(
        &self,
        rows: Vec<NewContact>,
    ) -> ContactStoreResult<Vec<ContactBookEntry>> {
        let mut inserted = Vec::new();
        for row in rows {
            let result = sqlx::query(
                "INSERT INTO contacts (owner_id, name, country_code, mobile_number, username, active, updated_at) \
                 VALUES (?, ?, ?, ?, ?, ?, ?) \
                 ON CONFLICT DO NOTHING",
            )
            .bind(row.owner_id)
            .bind(&row.name)
            .bind(&row.country_code)
            .bind(&row.mobile_number)
            .bind(&row.username)
            .bind(row.is_active())
            .bind(row.updated_at)
            .execute(&self.pool)
            .await?;

            if result.rows_affected() == 1 {
                inserted.push(row.into_entry(result.last_insert_rowid()));
            } else {
                tracing::debug!(
                    owner_id = row.owner_id,
                    mobile_number = %row.mobile_number,
                    "skipping conflicting contact row"
                );
            }
        }
        Ok(inserted)
    }

    async fn activate_contacts(
        &self,
        mobile_number: &str,
        username: &str,
        at: DateTime<Utc>,
    ) -> ContactStoreResult<u64> {
        let result = sqlx::query(
            "UPDATE contacts SET username = ?, active = 1, updated_at = ? WHERE mobile_number = ?",
        )
        .bind(username)
        .bind(at)
        .bind(mobile_number)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected())
    }

    async fn contacts_updated_since(
        &self,
        owner_id: i64,
        watermark: DateTime<Utc>,
    ) -> ContactStoreResult<Vec<ContactBookEntry>> {
        let rows = sqlx::query(
            "SELECT * FROM contacts \
             WHERE owner_id = ? AND updated_at >= ? AND username IS NOT NULL AND username != '' \
             ORDER BY updated_at, id",
        )
        .bind(owner_id)
        .bind(watermark)
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(contact_from_row).collect()
    }

    // =========================================================================
    // Access token operations
    // =========================================================================

    async fn get_or_create_token(
        &self,
        user_id: i64,
        candidate: &str,
    ) -> ContactStoreResult<AccessToken> {
        sqlx::query(
            "INSERT INTO access_tokens (token, user_id, created_at) VALUES (?, ?, ?) \
             ON CONFLICT (user_id) DO NOTHING",
        )
        .bind(candidate)
        .bind(user_id)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        let row = sqlx::query("SELECT * FROM access_tokens WHERE user_id = ?")
            .bind(user_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(AccessToken {
            token: row.try_get("token")?,
            user_id: row.try_get("user_id")?,
            created_at: row.try_get("created_at")?,
        })
    }

    async fn get_user_by_token(&self, token: &str) -> ContactStoreResult<Option<User>> {
        let row = sqlx::query(
            "SELECT u.* FROM users u JOIN access_tokens t ON t.user_id = u.id WHERE t.token = ?",
        )
        .bind(token)
        .fetch_optional(&self.pool)
        .await?;
        row.as_ref().map(user_from_row).transpose()
    }

    // =========================================================================
    // Chat group operations
    // =========================================================================

    async fn create_group(&self, group: NewChatGroup) -> ContactStoreResult<ChatGroup> {
        let now = Utc::now();
        let result = sqlx::query(
            "INSERT INTO chat_groups (name, amount, premium, created_by, created_at) \
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&group.name)
        .bind(group.amount)
        .bind(group.premium)
        .bind(group.created_by)
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(ChatGroup {
            id: result.last_insert_rowid(),
            name: group.name,
            amount: group.amount,
            premium: group.premium,
            created_by: group.created_by,
            created_at: now,
        })
    }

    async fn get_group(&self, id: i64) -> ContactStoreResult<Option<ChatGroup>> {
        let row = sqlx::query("SELECT * FROM chat_groups WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(group_from_row).transpose()
    }

    async fn list_groups_for_user(&self, user_id: i64) -> ContactStoreResult<Vec<ChatGroup>> {
        let rows = sqlx::query(
            "SELECT g.* FROM chat_groups g JOIN group_members m ON m.group_id = g.id \
             WHERE m.user_id = ? ORDER BY g.id",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(group_from_row).collect()
    }

    async fn add_group_members(
        &self,
        members: Vec<NewGroupMember>,
    ) -> ContactStoreResult<Vec<GroupMember>> {
        let mut added = Vec::new();
        for member in members {
            let now = Utc::now();
            let result = sqlx::query(
                "INSERT INTO group_members (group_id, user_id, is_admin, joined_at) \
                 VALUES (?, ?, ?, ?) \
                 ON CONFLICT (group_id, user_id) DO NOTHING",
            )
            .bind(member.group_id)
            .bind(member.user_id)
            .bind(member.is_admin)
            .bind(now)
            .execute(&self.pool)
            .await?;

            if result.rows_affected() == 1 {
                added.push(GroupMember {
                    id: result.last_insert_rowid(),
                    group_id: member.group_id,
                    user_id: member.user_id,
                    is_admin: member.is_admin,
                    joined_at: now,
                });
            }
        }
        Ok(added)
    }

    async fn list_group_members(&self, group_id: i64) -> ContactStoreResult<Vec<GroupMember>> {
        let rows = sqlx::query("SELECT * FROM group_members WHERE group_id = ? ORDER BY id")
            .bind(group_id)
            .fetch_all(&self.pool)
            .await?;
        rows.iter().map(member_from_row).collect()
    }
}
