use crate::constants::{
    DEFAULT_CONNECT_TIMEOUT_SECS, DEFAULT_MAINTENANCE_PORT, DEFAULT_MAX_AGE_DAYS,
    DEFAULT_TIMEOUT_SECS,
};
use crate::errors::{AppError, AppResult};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Resolved configuration with all values filled in (no Options).
///
/// Holds the tunables shared by the `run` and `toml` commands. Every field has a
/// default, so a TOML file only needs to mention what it overrides.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ResolvedConfig {
    /// Port of the hub's maintenance interface
    pub maintenance_port: u16,
    /// Overall per-request timeout in seconds
    pub timeout_secs: u64,
    /// Connection establishment timeout in seconds
    pub connect_timeout_secs: u64,
    /// Local backups at least this many days old are deleted
    pub max_age_days: u32,
}

impl Default for ResolvedConfig {
    fn default() -> Self {
        Self {
            maintenance_port: DEFAULT_MAINTENANCE_PORT,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            connect_timeout_secs: DEFAULT_CONNECT_TIMEOUT_SECS,
            max_age_days: DEFAULT_MAX_AGE_DAYS,
        }
    }
}

impl ResolvedConfig {
    /// Rejects values that would make every request fail.
    pub fn validate(&self) -> AppResult<()> {
        if self.maintenance_port == 0 {
            return Err(AppError::InvalidInput(
                "Maintenance port must be greater than 0".into(),
            ));
        }
        if self.timeout_secs == 0 || self.connect_timeout_secs == 0 {
            return Err(AppError::InvalidInput(
                "Timeouts must be greater than 0".into(),
            ));
        }
        Ok(())
    }
}

/// Configuration that can be loaded from a TOML file.
///
/// Deserializes the hub coordinates (address, hub_id, destination) and optional
/// tunables. Unknown keys are rejected to catch typos.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ResolvedConfigFile {
    /// Hub IP address or host name
    pub address: String,
    /// Hub identifier (MAC address), used to derive the maintenance login
    pub hub_id: String,
    /// Directory holding the local backup archive
    pub destination: PathBuf,
    /// Flattened resolved configuration with defaults
    #[serde(flatten)]
    pub resolved: ResolvedConfig,
}

impl ResolvedConfigFile {
    /// Loads and validates configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns `IoError` if the file cannot be read and `InvalidInput` if the TOML
    /// is malformed, required fields are missing, unknown keys are present, or a
    /// port/timeout is zero.
    pub fn from_toml_file(path: &Path) -> AppResult<Self> {
        let contents = fs::read_to_string(path)?;
        let config: ResolvedConfigFile = toml::from_str(&contents)
            .map_err(|e| AppError::InvalidInput(format!("Failed to parse config: {e}")))?;

        if config.address.trim().is_empty() {
            return Err(AppError::InvalidInput("Hub address must not be empty".into()));
        }
        config.resolved.validate()?;

        Ok(config)
    }
}
