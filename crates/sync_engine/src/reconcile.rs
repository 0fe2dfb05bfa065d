//! The reconciliation engine.
//!
//! Takes a raw address-book batch for an owner and decides which rows are
//! genuinely new. Existing entries are never overwritten by a later
//! submission of the same number (first-write-wins per owner/number pair),
//! so a retried submission is safe.

use std::collections::HashSet;

use chrono::Utc;
use contact_store::ContactStore;
use entities::{ContactBookEntry, NewContact, User};
use serde::{Deserialize, Serialize};

use crate::{SyncError, SyncResult};

/// Maximum length for submitted contact names, in characters.
const MAX_NAME_LEN: usize = 255;

/// One raw address-book tuple as submitted by a client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawContact {
    /// Contact name as the owner typed it.
    pub name: String,
    /// Dialing country code.
    pub country_code: String,
    /// Contact mobile number.
    pub mobile_number: String,
}

/// Checks a mobile number: exactly 10 ASCII digits.
pub fn valid_mobile_number(number: &str) -> bool {
    number.len() == 10 && number.bytes().all(|b| b.is_ascii_digit())
}

/// Checks a dialing country code.
pub fn valid_country_code(code: &str) -> bool {
    // "+" followed by 1-3 digits, or 1-4 bare digits. Empty is allowed.
    if code.is_empty() {
        return true;
    }
    let digits = code.strip_prefix('+').unwrap_or(code);
    let max = if code.starts_with('+') { 3 } else { 4 };
    !digits.is_empty() && digits.len() <= max && digits.bytes().all(|b| b.is_ascii_digit())
}

/// The reconciliation engine.
///
/// Stateless apart from the optional batch cap; one instance serves all
/// requests.
#[derive(Debug, Clone, Default)]
pub struct Reconciler {
    max_batch: Option<usize>,
}

impl Reconciler {
    /// Creates a reconciler with no batch cap.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the maximum accepted batch size. `None` disables the cap.
    pub fn with_max_batch(mut self, max_batch: Option<usize>) -> Self {
        self.max_batch = max_batch;
        self
    }

    /// Shape-validates a batch. All-or-nothing: any malformed tuple fails
    /// the whole submission before anything is persisted.
    fn validate(&self, batch: &[RawContact]) -> SyncResult<()> {
        if let Some(cap) = self.max_batch {
            if batch.len() > cap {
                return Err(SyncError::Validation(format!(
                    "batch of {} contacts exceeds the limit of {cap}",
                    batch.len()
                )));
            }
        }
        for contact in batch {
            if !valid_mobile_number(&contact.mobile_number) {
                return Err(SyncError::Validation(format!(
                    "mobile number {:?} must be exactly 10 digits",
                    contact.mobile_number
                )));
            }
            if !valid_country_code(&contact.country_code) {
                return Err(SyncError::Validation(format!(
                    "country code {:?} is malformed",
                    contact.country_code
                )));
            }
            if contact.name.is_empty() || contact.name.chars().count() > MAX_NAME_LEN {
                return Err(SyncError::Validation(format!(
                    "contact name for {} must be 1-{MAX_NAME_LEN} characters",
                    contact.mobile_number
                )));
            }
        }
        Ok(())
    }

    /// Reconciles a submitted batch against the owner's contact book and
    /// the user registry, persisting the genuinely new rows.
    ///
    /// Returns only the newly created rows whose number belongs to a
    /// registered user; dormant rows are persisted silently. A row that
    /// loses an insert race to a concurrent submission is dropped from the
    /// result without failing its siblings.
    pub async fn submit<S: ContactStore>(
        &self,
        store: &S,
        owner: &User,
        batch: Vec<RawContact>,
    ) -> SyncResult<Vec<ContactBookEntry>> {
        self.validate(&batch)?;

        // Stable dedup: first occurrence per number wins.
        let mut seen = HashSet::new();
        let deduped: Vec<RawContact> = batch
            .into_iter()
            .filter(|c| seen.insert(c.mobile_number.clone()))
            .collect();

        let numbers: Vec<String> = deduped.iter().map(|c| c.mobile_number.clone()).collect();
        let known = store.known_numbers(owner.id, &numbers).await?;
        let fresh: Vec<RawContact> = deduped
            .into_iter()
            .filter(|c| !known.contains(&c.mobile_number))
            .collect();

        let fresh_numbers: Vec<String> =
            fresh.iter().map(|c| c.mobile_number.clone()).collect();
        let registry = store.usernames_by_mobile(&fresh_numbers).await?;

        let now = Utc::now();
        let rows: Vec<NewContact> = fresh
            .into_iter()
            .map(|c| {
                let mut row =
                    NewContact::new(owner.id, c.name, c.country_code, c.mobile_number, now);
                if let Some(username) = registry.get(&row.mobile_number) {
                    row = row.with_username(username.clone());
                }
                row
            })
            .collect();

        let inserted = store.bulk_insert_contacts(rows).await?;
        tracing::debug!(
            owner_id = owner.id,
            submitted = numbers.len(),
            inserted = inserted.len(),
            "reconciled contact batch"
        );

        Ok(inserted.into_iter().filter(|e| e.active).collect())
    }
}
