//! Common test utilities for integration tests

use hubitat_backup::config::ResolvedConfig;
use hubitat_backup::hub::HubSession;
use httpmock::MockServer;
use std::fs;
use std::path::Path;
use std::time::{Duration, SystemTime};

#[allow(dead_code)]
pub const DAY: Duration = Duration::from_secs(86_400);
#[allow(dead_code)]
pub const HUB_ID: &str = "34:e1:d1:00:11:22";
#[allow(dead_code)]
pub const CREDENTIAL: &str = "34E1D1001122";

/// Config pointing at the mock server's port with short timeouts
#[allow(dead_code)]
pub fn config_for(server: &MockServer) -> ResolvedConfig {
    ResolvedConfig {
        maintenance_port: server.port(),
        timeout_secs: 5,
        connect_timeout_secs: 2,
        ..ResolvedConfig::default()
    }
}

/// Session against the mock server
#[allow(dead_code)]
pub fn session_for(server: &MockServer) -> HubSession {
    HubSession::new(&server.host(), HUB_ID, &config_for(server)).unwrap()
}

/// Creates a file with the given content and modification time
#[allow(dead_code)]
pub fn create_file_with_mtime(path: &Path, content: &[u8], modified: SystemTime) {
    fs::write(path, content).unwrap();
    fs::File::options()
        .write(true)
        .open(path)
        .unwrap()
        .set_modified(modified)
        .unwrap();
}

/// Sorted file names directly inside `dir`
#[allow(dead_code)]
pub fn list_names(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}
