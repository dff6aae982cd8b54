//! Local backup archive maintenance.
//!
//! [`sync_backups`] brings the destination directory up to date with the hub and
//! [`prune_old_backups`] enforces the retention window. The two are independent;
//! the caller sequences them.

mod prune;
mod sync;

// Re-export public API
pub use prune::{prune_old_backups, prune_old_backups_at, PruneSummary};
pub use sync::{sync_backups, sync_backups_at, SyncSummary};
