//! Integration tests for the sign-in, sync, cleanup workflow

#[path = "common/mod.rs"]
mod common;

use common::*;
use httpmock::prelude::*;
use hubitat_backup::cli::{run_workflow, RunSettings};
use hubitat_backup::config::ResolvedConfig;
use hubitat_backup::errors::AppError;
use serde_json::json;
use std::time::SystemTime;
use tempfile::TempDir;

#[tokio::test]
async fn test_workflow_prunes_even_when_hub_is_unreachable() {
    let temp_dir = TempDir::new().unwrap();
    let now = SystemTime::now();
    create_file_with_mtime(&temp_dir.path().join("old.lzf"), b"old", now - DAY * 120);
    create_file_with_mtime(&temp_dir.path().join("new.lzf"), b"new", now - DAY * 3);

    let settings = RunSettings {
        address: "127.0.0.1".to_string(),
        hub_id: HUB_ID.to_string(),
        destination: temp_dir.path().to_path_buf(),
        config: ResolvedConfig {
            maintenance_port: 1,
            connect_timeout_secs: 2,
            timeout_secs: 2,
            ..ResolvedConfig::default()
        },
    };

    let report = run_workflow(&settings).await.unwrap();

    assert!(matches!(report.sync, Err(AppError::RequestError { .. })));
    assert_eq!(report.prune.removed, 1);
    assert_eq!(list_names(temp_dir.path()), vec!["new.lzf"]);
}

#[tokio::test]
async fn test_workflow_prunes_after_rejected_login() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/newLogin");
            then.status(403);
        })
        .await;
    let list = server
        .mock_async(|when, then| {
            when.method(GET).path("/api/backups");
            then.status(200).json_body(json!({ "success": true, "backups": [] }));
        })
        .await;

    let temp_dir = TempDir::new().unwrap();
    create_file_with_mtime(
        &temp_dir.path().join("old.lzf"),
        b"old",
        SystemTime::now() - DAY * 90,
    );

    let settings = RunSettings {
        address: server.host(),
        hub_id: HUB_ID.to_string(),
        destination: temp_dir.path().to_path_buf(),
        config: config_for(&server),
    };

    let report = run_workflow(&settings).await.unwrap();

    assert!(matches!(report.sync, Err(AppError::AuthError { .. })));
    list.assert_calls_async(0).await;
    assert_eq!(report.prune.removed, 1);
    assert!(list_names(temp_dir.path()).is_empty());
}

#[tokio::test]
async fn test_workflow_signs_in_syncs_and_prunes() {
    let server = MockServer::start_async().await;
    let login = server
        .mock_async(|when, then| {
            when.method(POST).path("/newLogin").body(CREDENTIAL);
            then.status(200).json_body(json!({ "success": true }));
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/api/backups");
            then.status(200).json_body(json!({
                "success": true,
                "backups": [{ "name": "latest.lzf", "createTime": "01/01 00:00" }]
            }));
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/api/downloadBackup/latest.lzf");
            then.status(200).body("archive");
        })
        .await;

    let temp_dir = TempDir::new().unwrap();
    let destination = temp_dir.path().join("hub");
    let settings = RunSettings {
        address: server.host(),
        hub_id: HUB_ID.to_string(),
        destination: destination.clone(),
        config: ResolvedConfig {
            // Keep the fresh download regardless of today's date
            max_age_days: 1_000,
            ..config_for(&server)
        },
    };

    let report = run_workflow(&settings).await.unwrap();

    login.assert_async().await;
    assert_eq!(report.sync.unwrap().downloaded, 1);
    assert_eq!(report.prune.removed, 0);
    assert_eq!(list_names(&destination), vec!["latest.lzf"]);
}
