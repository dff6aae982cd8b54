use crate::constants::PARTIAL_SUFFIX;
use crate::date_resolver::{resolve_backup_time, to_system_time};
use crate::errors::{AppError, AppResult};
use crate::hub::{BackupDescriptor, HubSession};
use chrono::{Local, NaiveDateTime};
use std::path::Path;
use std::time::SystemTime;
use tokio::fs;
use tokio::fs::File;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, warn};

/// Outcome of one sync pass.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SyncSummary {
    /// Backups fetched and written during this pass
    pub downloaded: usize,
    /// Backups skipped for an unrecognized extension
    pub unrecognized: usize,
    /// Backups skipped because a local copy already exists
    pub already_present: usize,
    /// Backups skipped because their name is not a plain file name
    pub unsafe_name: usize,
}

/// Downloads every hub backup that is missing from `destination`.
///
/// Uses the current local time to resolve the hub's year-less timestamps. See
/// [`sync_backups_at`].
pub async fn sync_backups(hub: &HubSession, destination: &Path) -> AppResult<SyncSummary> {
    sync_backups_at(hub, destination, Local::now().naive_local()).await
}

/// Downloads every hub backup that is missing from `destination`, resolving
/// creation times relative to `now`.
///
/// # Behavior
///
/// - **Directory**: `destination` and its parents are created if absent.
/// - **Filtering**: only `.lzf` archives are fetched; other names are logged and skipped.
/// - **Names**: a name that is not a single plain file name (`../x.lzf`, an
///   absolute path) is logged and skipped, so nothing is written outside
///   `destination`.
/// - **Skip existing**: a local file with the same name is never re-downloaded.
/// - **Timestamps**: each written file's modification time is the backup's
///   creation time as reported by the hub, not the download time.
/// - **Atomic writes**: archives are written to a `.part` file and renamed when
///   complete, so an interrupted pass never leaves a file that looks finished.
///
/// # Errors
///
/// Returns `EmptyBackupList` when the hub reports no backups. Directory creation,
/// list, download and write failures are returned as they happen; backups
/// written before the failure stay in place and later ones are not attempted.
pub async fn sync_backups_at(
    hub: &HubSession,
    destination: &Path,
    now: NaiveDateTime,
) -> AppResult<SyncSummary> {
    fs::create_dir_all(destination).await.map_err(|e| {
        AppError::IoError(format!(
            "Failed to create directory {}: {e}",
            destination.display()
        ))
    })?;

    let backups = hub.list_backups().await?;
    if backups.is_empty() {
        return Err(AppError::EmptyBackupList {
            address: hub.address().to_string(),
        });
    }

    debug!(count = backups.len(), "Hub reported backups");

    let mut summary = SyncSummary::default();
    for backup in &backups {
        if !backup.is_archive() {
            info!(backup = %backup.name, "Skipping backup: unrecognized suffix");
            summary.unrecognized += 1;
            continue;
        }

        if !backup.has_plain_name() {
            warn!(backup = %backup.name, "Skipping backup: name is not a plain file name");
            summary.unsafe_name += 1;
            continue;
        }

        let file_path = destination.join(&backup.name);
        if fs::try_exists(&file_path).await? {
            info!(backup = %backup.name, "Skipping already downloaded backup file");
            summary.already_present += 1;
            continue;
        }

        download_backup(hub, backup, destination, now).await?;
        summary.downloaded += 1;
    }

    info!(
        downloaded = summary.downloaded,
        already_present = summary.already_present,
        unrecognized = summary.unrecognized,
        unsafe_name = summary.unsafe_name,
        "Backup sync completed"
    );

    Ok(summary)
}

/// Fetches one backup and stores it as `destination/<name>` with the hub's
/// creation time as modification time.
async fn download_backup(
    hub: &HubSession,
    backup: &BackupDescriptor,
    destination: &Path,
    now: NaiveDateTime,
) -> AppResult<()> {
    let created = resolve_backup_time(&backup.create_time, now)?;
    let content = hub.download_backup(&backup.name).await?;

    info!(
        backup = %backup.name,
        bytes = content.len(),
        created = %created,
        "Downloading backup file"
    );

    let file_path = destination.join(&backup.name);
    let tmp_path = destination.join(format!("{}{PARTIAL_SUFFIX}", backup.name));

    if let Err(e) = write_partial(&tmp_path, &content, to_system_time(created)).await {
        return Err(discard_partial(&tmp_path, e).await);
    }

    if let Err(e) = fs::rename(&tmp_path, &file_path).await {
        let err = AppError::IoError(format!(
            "Failed to rename temp file {} to {}: {e}",
            tmp_path.display(),
            file_path.display()
        ));
        return Err(discard_partial(&tmp_path, err).await);
    }

    Ok(())
}

/// Writes `content` to the staging file and stamps its modification time.
async fn write_partial(tmp_path: &Path, content: &[u8], modified: SystemTime) -> AppResult<()> {
    let mut file = File::create(tmp_path).await.map_err(|e| {
        AppError::IoError(format!(
            "Failed to create temp file {}: {e}",
            tmp_path.display()
        ))
    })?;
    file.write_all(content).await.map_err(|e| {
        AppError::IoError(format!(
            "Failed to write to temp file {}: {e}",
            tmp_path.display()
        ))
    })?;
    file.flush().await?;

    let file = file.into_std().await;
    file.set_modified(modified).map_err(|e| {
        AppError::IoError(format!(
            "Failed to set modification time of {}: {e}",
            tmp_path.display()
        ))
    })?;

    Ok(())
}

/// Removes a staging file left by a failed write and hands back the original error.
async fn discard_partial(tmp_path: &Path, err: AppError) -> AppError {
    match fs::remove_file(tmp_path).await {
        Ok(()) => {}
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => warn!(
            file = %tmp_path.display(),
            error = %e,
            "Failed to remove partial backup file"
        ),
    }
    err
}
