//! Contact reconciliation and incremental sync for Parley.
//!
//! Three pieces make up the core:
//!
//! - [`Reconciler`]: ingests a raw address-book batch for an owner,
//!   deduplicates it against the owner's existing entries and the user
//!   registry, and persists the genuinely new rows.
//! - [`fetch_updates`]: the sync cursor. Materializes the entries that
//!   changed since the caller's watermark, then advances the watermark.
//! - [`propagate_activation`]: retroactively marks every stored contact
//!   row pointing at a freshly verified number as active.

mod activation;
mod cursor;
mod error;
mod reconcile;

pub use activation::*;
pub use cursor::*;
pub use error::*;
pub use reconcile::*;
