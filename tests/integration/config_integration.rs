//! Integration tests for layered configuration

use crate::integration::test_utils::ENV_MUTEX;
use layout3d::config::{AppConfig, ConfigLoader, StorageBackend};
use layout3d::error::ApiError;
use std::path::PathBuf;
use tempfile::TempDir;

fn write_workspace_config(workspace: &TempDir, name: &str, contents: &str) {
    let config_dir = workspace.path().join("config");
    std::fs::create_dir_all(&config_dir).unwrap();
    std::fs::write(config_dir.join(name), contents).unwrap();
}

#[test]
fn test_empty_workspace_uses_defaults() {
    let _guard = ENV_MUTEX.lock();
    let workspace = TempDir::new().unwrap();
    let config = ConfigLoader::load(workspace.path()).unwrap();

    let defaults = AppConfig::default();
    assert_eq!(config.scheduler, defaults.scheduler);
    assert_eq!(config.storage, defaults.storage);
    assert_eq!(config.logging.level, "info");
}

#[test]
fn test_environment_file_overrides_base_file() {
    let _guard = ENV_MUTEX.lock();
    let workspace = TempDir::new().unwrap();
    write_workspace_config(
        &workspace,
        "config.toml",
        r#"
[scheduler]
checkpoint_delay_ms = 20

[scheduler.retention]
max_terminal_jobs = 100

[storage]
layouts_path = "data/layouts"
"#,
    );
    write_workspace_config(
        &workspace,
        "development.toml",
        "[scheduler.retention]\nmax_terminal_jobs = 5\n",
    );

    std::env::remove_var("LAYOUT3D_ENV");
    let config = ConfigLoader::load(workspace.path()).unwrap();
    assert_eq!(config.scheduler.checkpoint_delay_ms, 20);
    assert_eq!(config.scheduler.retention.max_terminal_jobs, Some(5));
    assert_eq!(
        config.storage.resolve_layouts_path(workspace.path()),
        workspace.path().join("data/layouts")
    );
}

#[test]
fn test_environment_variables_override_files() {
    let _guard = ENV_MUTEX.lock();
    let workspace = TempDir::new().unwrap();
    write_workspace_config(&workspace, "config.toml", "[storage]\nbackend = \"sled\"\n");

    std::env::set_var("LAYOUT3D__STORAGE__BACKEND", "memory");
    std::env::set_var("LAYOUT3D__SCHEDULER__CHECKPOINT_DELAY_MS", "0");
    let loaded = ConfigLoader::load(workspace.path());
    std::env::remove_var("LAYOUT3D__STORAGE__BACKEND");
    std::env::remove_var("LAYOUT3D__SCHEDULER__CHECKPOINT_DELAY_MS");

    let config = loaded.unwrap();
    assert_eq!(config.storage.backend, StorageBackend::Memory);
    assert_eq!(config.scheduler.checkpoint_delay_ms, 0);
}

#[test]
fn test_invalid_values_are_reported_together() {
    let _guard = ENV_MUTEX.lock();
    let workspace = TempDir::new().unwrap();
    let path = workspace.path().join("broken.toml");
    std::fs::write(
        &path,
        r#"
[scheduler.retention]
max_terminal_jobs = 0

[logging]
output = "syslog"
"#,
    )
    .unwrap();

    match ConfigLoader::load_from_file(&path) {
        Err(ApiError::ConfigError(message)) => {
            assert!(message.contains("Scheduler:"));
            assert!(message.contains("Logging:"));
        }
        other => panic!("expected validation failure, got {:?}", other.map(|_| ())),
    }
}

#[test]
fn test_unknown_backend_is_rejected() {
    let _guard = ENV_MUTEX.lock();
    let workspace = TempDir::new().unwrap();
    let path = workspace.path().join("backend.toml");
    std::fs::write(&path, "[storage]\nbackend = \"postgres\"\n").unwrap();
    assert!(ConfigLoader::load_from_file(&path).is_err());
}

#[test]
fn test_config_serializes_to_toml() {
    let config = AppConfig::default();
    let rendered = toml::to_string_pretty(&config).unwrap();
    assert!(rendered.contains("checkpoint_delay_ms = 50"));
    let parsed: AppConfig = toml::from_str(&rendered).unwrap();
    assert_eq!(parsed.storage.layouts_path, PathBuf::from(".layout3d/layouts"));
}
