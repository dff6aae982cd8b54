use crate::constants::BACKUP_EXTENSION;
use crate::errors::{AppError, AppResult};
use std::path::Path;
use std::time::SystemTime;
use tracing::{info, warn};

const SECONDS_PER_DAY: i64 = 86_400;

/// Outcome of one prune pass.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct PruneSummary {
    /// Backup files deleted
    pub removed: usize,
    /// Entries that could not be inspected or deleted
    pub errors: usize,
}

/// Deletes backup archives in `destination` that are at least `max_age_days` old.
///
/// See [`prune_old_backups_at`]; this variant measures age against the current time.
pub async fn prune_old_backups(destination: &Path, max_age_days: u32) -> AppResult<PruneSummary> {
    prune_old_backups_at(destination, max_age_days, SystemTime::now()).await
}

/// Deletes backup archives in `destination` that are at least `max_age_days` old
/// relative to `now`.
///
/// # Behavior
///
/// Only the top level of `destination` is scanned. An entry is a candidate when it
/// is a regular file (symbolic links are not followed) whose name ends in `.lzf`.
/// Its age is the number of whole days since its modification time, rounded down;
/// it is deleted when that age reaches `max_age_days`. Every other entry is left
/// alone.
///
/// # Error Handling
///
/// Failures on individual entries are logged as warnings and counted, and the scan
/// moves on. A missing `destination` is not an error; one that exists but cannot be
/// listed is.
pub async fn prune_old_backups_at(
    destination: &Path,
    max_age_days: u32,
    now: SystemTime,
) -> AppResult<PruneSummary> {
    if !tokio::fs::try_exists(destination).await? {
        info!(
            destination = %destination.display(),
            "Backup directory does not exist, skipping cleanup"
        );
        return Ok(PruneSummary::default());
    }

    let mut entries = tokio::fs::read_dir(destination).await.map_err(|e| {
        AppError::IoError(format!(
            "Failed to read directory {}: {e}",
            destination.display()
        ))
    })?;

    let mut summary = PruneSummary::default();
    loop {
        let entry = match entries.next_entry().await {
            Ok(Some(entry)) => entry,
            Ok(None) => break,
            Err(e) => {
                summary.errors += 1;
                warn!(
                    destination = %destination.display(),
                    error = %e,
                    "Failed to read directory entry"
                );
                continue;
            }
        };

        let name = entry.file_name();
        let name = name.to_string_lossy();
        if !name.ends_with(BACKUP_EXTENSION) {
            continue;
        }

        let path = entry.path();
        // symlink_metadata does not follow links
        let metadata = match tokio::fs::symlink_metadata(&path).await {
            Ok(metadata) => metadata,
            Err(e) => {
                summary.errors += 1;
                warn!(file = %path.display(), error = %e, "Failed to read file metadata");
                continue;
            }
        };
        if !metadata.file_type().is_file() {
            continue;
        }

        let modified = match metadata.modified() {
            Ok(modified) => modified,
            Err(e) => {
                summary.errors += 1;
                warn!(file = %path.display(), error = %e, "Failed to read modification time");
                continue;
            }
        };

        let age_days = age_in_days(now, modified);
        if age_days < i64::from(max_age_days) {
            continue;
        }

        match tokio::fs::remove_file(&path).await {
            Ok(()) => {
                summary.removed += 1;
                info!(file = %name, age_days = age_days, "Removing old backup file");
            }
            Err(e) => {
                summary.errors += 1;
                warn!(file = %path.display(), error = %e, "Failed to delete old backup file");
            }
        }
    }

    info!(
        removed = summary.removed,
        errors = summary.errors,
        max_age_days = max_age_days,
        "Cleanup completed"
    );

    Ok(summary)
}

/// Whole days from `modified` to `now`, rounded towards negative infinity.
fn age_in_days(now: SystemTime, modified: SystemTime) -> i64 {
    let seconds = match now.duration_since(modified) {
        Ok(elapsed) => elapsed.as_secs() as i64,
        // Modified in the future; round the fraction away from zero
        Err(e) => {
            let ahead = e.duration();
            -(ahead.as_secs() as i64) - i64::from(ahead.subsec_nanos() > 0)
        }
    };
    seconds.div_euclid(SECONDS_PER_DAY)
}
