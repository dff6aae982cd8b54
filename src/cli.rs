use crate::backup::{prune_old_backups, sync_backups, PruneSummary, SyncSummary};
use crate::config::{ResolvedConfig, ResolvedConfigFile};
use crate::errors::{AppError, AppResult};
use crate::hub::HubSession;
use clap::{Arg, ArgAction, ArgMatches, Command};
use std::path::PathBuf;
use tracing::{error, info};

// CLI metadata constants
const APP_VERSION: &str = env!("CARGO_PKG_VERSION");
const APP_AUTHOR: &str = env!("CARGO_PKG_AUTHORS");
const APP_ABOUT: &str = env!("CARGO_PKG_DESCRIPTION");

/// Everything one run needs: which hub, where to keep backups, and the tunables.
#[derive(Debug, Clone)]
pub struct RunSettings {
    pub address: String,
    pub hub_id: String,
    pub destination: PathBuf,
    pub config: ResolvedConfig,
}

impl From<ResolvedConfigFile> for RunSettings {
    fn from(file: ResolvedConfigFile) -> Self {
        Self {
            address: file.address,
            hub_id: file.hub_id,
            destination: file.destination,
            config: file.resolved,
        }
    }
}

/// What a run did. The sync outcome is kept rather than propagated so that a
/// failed sync never prevents cleanup.
#[derive(Debug)]
pub struct RunReport {
    pub sync: AppResult<SyncSummary>,
    pub prune: PruneSummary,
}

/// Parses command-line arguments and executes the backup run.
///
/// This function handles two subcommands:
/// - `run`: hub address, hub identifier and destination given as arguments
/// - `toml`: everything read from a TOML configuration file
///
/// Both execute the same workflow:
/// 1. Signs in to the hub's maintenance interface
/// 2. Downloads backups missing from the destination directory
/// 3. Deletes local backups past the retention window, even if steps 1-2 failed
///
/// # Returns
///
/// Returns an error if the arguments or configuration are invalid, or if the
/// destination directory exists but cannot be scanned for cleanup. Sign-in and
/// download failures are logged, not returned.
pub async fn cli() -> AppResult<()> {
    let cmd = build_command();
    let mut cmd_for_help = cmd.clone();
    let matches = cmd.get_matches();

    let settings = match matches.subcommand() {
        Some(("run", sub)) => settings_from_args(sub)?,
        Some(("toml", sub)) => {
            let config_path = sub
                .get_one::<PathBuf>("config")
                .ok_or_else(|| AppError::InvalidInput("Missing config path".into()))?;
            RunSettings::from(ResolvedConfigFile::from_toml_file(config_path)?)
        }
        _ => {
            cmd_for_help
                .print_help()
                .map_err(|e| AppError::IoError(format!("Failed to print help: {e}")))?;
            return Ok(());
        }
    };

    run_workflow(&settings).await?;
    Ok(())
}

pub fn build_command() -> Command<'static> {
    Command::new("hubitat-backup")
        .version(APP_VERSION)
        .author(APP_AUTHOR)
        .about(APP_ABOUT)
        .subcommand(
            Command::new("run")
                .about("Download new backups from a hub and remove old local ones")
                .after_help("Backups must be enabled on the hub first (http://<hub>/hub/backup).\nExample:\n  hubitat-backup run 192.168.1.100 34:e1:d1:00:11:22 ~/hubitat-backups -a 7")
                .arg(
                    Arg::new("address")
                        .help("Hub IP address or host name")
                        .required(true)
                        .action(ArgAction::Set),
                )
                .arg(
                    Arg::new("hub_id")
                        .help("Hub MAC address, used to sign in to the maintenance interface")
                        .required(true)
                        .action(ArgAction::Set),
                )
                .arg(
                    Arg::new("destination")
                        .help("Directory that keeps the downloaded backups")
                        .required(true)
                        .value_parser(clap::value_parser!(PathBuf))
                        .action(ArgAction::Set),
                )
                .arg(
                    Arg::new("max_age_days")
                        .short('a')
                        .long("max-age-days")
                        .help("Delete local backups at least this many days old")
                        .value_parser(clap::value_parser!(u32))
                        .action(ArgAction::Set),
                )
                .arg(
                    Arg::new("port")
                        .short('p')
                        .long("port")
                        .help("Port of the hub's maintenance interface")
                        .value_parser(clap::value_parser!(u16))
                        .action(ArgAction::Set),
                )
                .arg(
                    Arg::new("timeout_secs")
                        .long("timeout-secs")
                        .help("Per-request timeout in seconds")
                        .value_parser(clap::value_parser!(u64))
                        .action(ArgAction::Set),
                ),
        )
        .subcommand(
            Command::new("toml")
                .about("Run using a TOML configuration file")
                .arg(
                    Arg::new("config")
                        .help("Path to the TOML config file")
                        .required(true)
                        .value_parser(clap::value_parser!(PathBuf)),
                ),
        )
}

/// Builds run settings from the `run` subcommand's arguments.
pub fn settings_from_args(sub: &ArgMatches) -> AppResult<RunSettings> {
    let required = |name: &str| {
        sub.get_one::<String>(name)
            .cloned()
            .ok_or_else(|| AppError::InvalidInput(format!("Missing argument: {name}")))
    };
    let address = required("address")?;
    let hub_id = required("hub_id")?;
    let destination = sub
        .get_one::<PathBuf>("destination")
        .cloned()
        .ok_or_else(|| AppError::InvalidInput("Missing argument: destination".into()))?;

    let mut config = ResolvedConfig::default();
    if let Some(&max_age_days) = sub.get_one::<u32>("max_age_days") {
        config.max_age_days = max_age_days;
    }
    if let Some(&port) = sub.get_one::<u16>("port") {
        config.maintenance_port = port;
    }
    if let Some(&timeout_secs) = sub.get_one::<u64>("timeout_secs") {
        config.timeout_secs = timeout_secs;
    }
    config.validate()?;

    Ok(RunSettings {
        address,
        hub_id,
        destination,
        config,
    })
}

/// Signs in, syncs, then prunes.
///
/// Any error from signing in or syncing is logged and recorded in the report;
/// cleanup runs regardless so old backups are removed even when the hub is
/// unreachable.
///
/// # Errors
///
/// Only cleanup failures that prevent scanning the destination are returned.
pub async fn run_workflow(settings: &RunSettings) -> AppResult<RunReport> {
    info!(
        destination = %settings.destination.display(),
        max_age_days = settings.config.max_age_days,
        "Downloading backup files, removing old ones"
    );

    let sync = sync_from_hub(settings).await;
    if let Err(e) = &sync {
        error!(address = %settings.address, error = %e, "Backup sync failed");
    }

    let prune = prune_old_backups(&settings.destination, settings.config.max_age_days).await?;

    Ok(RunReport { sync, prune })
}

async fn sync_from_hub(settings: &RunSettings) -> AppResult<SyncSummary> {
    let hub = HubSession::new(&settings.address, &settings.hub_id, &settings.config)?;
    hub.authenticate().await?;
    sync_backups(&hub, &settings.destination).await
}
