//! Contact and identity storage for Parley.
//!
//! This crate defines the persistence boundary used by the sync engine and
//! the API server: the [`ContactStore`] trait, an in-memory implementation
//! for tests and single-process runs, and a SQLite implementation whose
//! uniqueness constraints act as the sole concurrency guard for bulk
//! inserts.

mod error;
mod memory;
mod sqlite;
mod traits;

pub use error::*;
pub use memory::*;
pub use sqlite::*;
pub use traits::*;
