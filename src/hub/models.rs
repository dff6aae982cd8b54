use crate::constants::BACKUP_EXTENSION;
use serde::Deserialize;
use std::path::{Component, Path};

/// One backup as listed by `GET /api/backups`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct BackupDescriptor {
    /// File name on the hub, including its format extension
    pub name: String,
    /// Creation time in the hub's year-less `MM/DD HH:MM` form
    #[serde(rename = "createTime")]
    pub create_time: String,
}

impl BackupDescriptor {
    /// Whether the name carries the hub's backup archive extension.
    pub fn is_archive(&self) -> bool {
        self.name.ends_with(BACKUP_EXTENSION)
    }

    /// Whether the name is a single plain file name that stays inside the
    /// directory it is joined to.
    pub fn has_plain_name(&self) -> bool {
        let mut components = Path::new(&self.name).components();
        matches!(
            (components.next(), components.next()),
            (Some(Component::Normal(_)), None)
        ) && !self.name.contains(['/', '\\'])
    }
}

/// Body of a successful `GET /api/backups` response.
#[derive(Debug, Deserialize)]
pub struct BackupList {
    #[serde(default)]
    backups: Option<Vec<BackupDescriptor>>,
}

impl BackupList {
    /// Backups in the order the hub reported them; a `null` list is empty.
    pub fn into_backups(self) -> Vec<BackupDescriptor> {
        self.backups.unwrap_or_default()
    }
}
