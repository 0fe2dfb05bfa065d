//! Sync engine error types.

use contact_store::ContactStoreError;
use thiserror::Error;

/// Errors that can occur in the sync engine.
#[derive(Debug, Error)]
pub enum SyncError {
    /// The submitted batch failed shape validation. Nothing was persisted.
    #[error("Invalid contact batch: {0}")]
    Validation(String),

    /// The persistence store failed.
    #[error(transparent)]
    Store(#[from] ContactStoreError),
}

/// Result type for sync engine operations.
pub type SyncResult<T> = Result<T, SyncError>;
