// Hub maintenance interface
pub const DEFAULT_MAINTENANCE_PORT: u16 = 8081;
pub const LOGIN_PATH: &str = "/newLogin";
pub const BACKUPS_PATH: &str = "/api/backups";
pub const DOWNLOAD_PATH_PREFIX: &str = "/api/downloadBackup/";

// Backup archives
pub const BACKUP_EXTENSION: &str = ".lzf";
pub const PARTIAL_SUFFIX: &str = ".part";

// Retention
pub const DEFAULT_MAX_AGE_DAYS: u32 = 90;

// Request timeouts
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;
