//! Communication with a hub's maintenance interface.
//!
//! [`HubSession`] owns the cookie-carrying HTTP client for one hub and exposes the
//! login, structured request and raw download calls every other module builds on.

mod models;
mod session;

// Re-export public API
pub use models::{BackupDescriptor, BackupList};
pub use session::{login_credential, HubSession};
