//! Configuration System
//!
//! Layered application configuration built with the `config` crate:
//! built-in defaults, the user-level file, `config/config.toml`,
//! `config/{LAYOUT3D_ENV}.toml`, then `LAYOUT3D__*` environment overrides.

use crate::error::ApiError;
use crate::job::SchedulerConfig;
use crate::logging::LoggingConfig;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::debug;

mod merge {
    pub mod merge_policy;
}
mod sources {
    pub mod environment;
    pub mod global_file;
    pub mod workspace_file;
}

pub use sources::global_file::global_config_path;

/// Root configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub scheduler: SchedulerConfig,

    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub storage: StorageConfig,
}

/// Where generated layouts are persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StorageBackend {
    /// sled database at `layouts_path`
    Sled,
    /// Process memory; nothing survives the run
    Memory,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_backend")]
    pub backend: StorageBackend,

    /// Layout database directory; relative paths resolve against the workspace root
    #[serde(default = "default_layouts_path")]
    pub layouts_path: PathBuf,
}

fn default_backend() -> StorageBackend {
    StorageBackend::Sled
}

fn default_layouts_path() -> PathBuf {
    PathBuf::from(".layout3d/layouts")
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: default_backend(),
            layouts_path: default_layouts_path(),
        }
    }
}

impl StorageConfig {
    pub fn resolve_layouts_path(&self, workspace_root: &Path) -> PathBuf {
        if self.layouts_path.is_absolute() {
            self.layouts_path.clone()
        } else {
            workspace_root.join(&self.layouts_path)
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.backend == StorageBackend::Sled && self.layouts_path.as_os_str().is_empty() {
            return Err("Layouts path cannot be empty".to_string());
        }
        Ok(())
    }
}

/// Configuration validation errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    Scheduler(String),
    Logging(String),
    Storage(String),
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::Scheduler(msg) => write!(f, "Scheduler: {}", msg),
            ValidationError::Logging(msg) => write!(f, "Logging: {}", msg),
            ValidationError::Storage(msg) => write!(f, "Storage: {}", msg),
        }
    }
}

impl std::error::Error for ValidationError {}

impl AppConfig {
    /// Validate the entire configuration, collecting every problem.
    pub fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();
        if let Err(e) = self.scheduler.validate() {
            errors.push(ValidationError::Scheduler(e));
        }
        if let Err(e) = self.logging.validate() {
            errors.push(ValidationError::Logging(e));
        }
        if let Err(e) = self.storage.validate() {
            errors.push(ValidationError::Storage(e));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

/// Builds an [`AppConfig`] from the layered sources.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration for `workspace_root`.
    pub fn load(workspace_root: &Path) -> Result<AppConfig, ApiError> {
        let builder = merge::merge_policy::builder_with_defaults()?;
        let builder = sources::global_file::add_to_builder(builder);
        let builder = sources::workspace_file::add_to_builder(builder, workspace_root);
        let builder = sources::environment::add_to_builder(builder);

        let config: AppConfig = builder.build()?.try_deserialize()?;
        debug!(workspace = %workspace_root.display(), "Configuration loaded");
        Self::validated(config)
    }

    /// Load configuration from one explicit file. Environment overrides still apply.
    pub fn load_from_file(path: &Path) -> Result<AppConfig, ApiError> {
        if !path.exists() {
            return Err(ApiError::ConfigError(format!(
                "Config file not found: {}",
                path.display()
            )));
        }
        let builder = merge::merge_policy::builder_with_defaults()?
            .add_source(config::File::from(path).required(true));
        let builder = sources::environment::add_to_builder(builder);

        let config: AppConfig = builder.build()?.try_deserialize()?;
        debug!(config_path = %path.display(), "Configuration loaded from file");
        Self::validated(config)
    }

    /// Built-in defaults only.
    pub fn default() -> AppConfig {
        AppConfig::default()
    }

    fn validated(config: AppConfig) -> Result<AppConfig, ApiError> {
        config.validate().map_err(|errors| {
            let messages: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
            ApiError::ConfigError(format!(
                "Configuration validation failed:\n{}",
                messages.join("\n")
            ))
        })?;
        Ok(config)
    }
}
