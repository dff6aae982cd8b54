//! hubitat-backup library
//!
//! This crate provides the core functionality for the `hubitat-backup` binary.
//! Keep the crate root minimal; implementation and tests live in their modules.
//!
//! ## Overview
//!
//! - [`hub`] - Authenticated session against a hub's maintenance interface
//! - [`backup`] - Downloads missing backups and prunes old local copies
//! - [`date_resolver`] - Turns the hub's year-less timestamps into full dates
//! - [`cli`] - Command-line interface orchestrating sign-in, sync and cleanup
//! - [`config`] - Defaults and TOML configuration loading
//! - [`errors`] - Error types used throughout the application
//!
//! ## Example Usage
//!
//! A run signs in, syncs, and prunes whether or not the sync succeeded:
//!
//! ```no_run
//! use hubitat_backup::{backup, config::ResolvedConfig, errors::AppResult, hub::HubSession};
//! use std::path::Path;
//!
//! # async fn example() -> AppResult<()> {
//! let config = ResolvedConfig::default();
//! let destination = Path::new("/var/backups/hubitat");
//! let hub = HubSession::new("192.168.1.100", "34:e1:d1:00:11:22", &config)?;
//!
//! if let Err(e) = async {
//!     hub.authenticate().await?;
//!     backup::sync_backups(&hub, destination).await
//! }
//! .await
//! {
//!     eprintln!("{e}");
//! }
//!
//! backup::prune_old_backups(destination, config.max_age_days).await?;
//! # Ok(())
//! # }
//! ```

pub mod backup;
pub mod cli;
pub mod config;
pub mod constants;
pub mod date_resolver;
pub mod errors;
pub mod hub;
