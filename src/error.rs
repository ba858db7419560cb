//! Error types for layout generation, scheduling and the scene tree.

use crate::job::JobId;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

/// Category of a pipeline failure, recorded on failed jobs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineErrorKind {
    Validation,
    Parse,
    Reconstruction,
    Persistence,
    Stage,
}

impl PipelineErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            PipelineErrorKind::Validation => "validation",
            PipelineErrorKind::Parse => "parse",
            PipelineErrorKind::Reconstruction => "reconstruction",
            PipelineErrorKind::Persistence => "persistence",
            PipelineErrorKind::Stage => "stage",
        }
    }
}

/// Errors raised by generation pipeline stages.
///
/// `Display` is the bare stage message; the category is available through [`kind`].
///
/// [`kind`]: PipelineError::kind
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PipelineError {
    /// Source content rejected before parsing
    #[error("{0}")]
    Validation(String),

    /// Malformed source content
    #[error("{0}")]
    Parse(String),

    #[error("{0}")]
    Reconstruction(String),

    #[error("{0}")]
    Persistence(String),

    /// Any other stage failure
    #[error("{0}")]
    Stage(String),
}

impl PipelineError {
    pub fn kind(&self) -> PipelineErrorKind {
        match self {
            PipelineError::Validation(_) => PipelineErrorKind::Validation,
            PipelineError::Parse(_) => PipelineErrorKind::Parse,
            PipelineError::Reconstruction(_) => PipelineErrorKind::Reconstruction,
            PipelineError::Persistence(_) => PipelineErrorKind::Persistence,
            PipelineError::Stage(_) => PipelineErrorKind::Stage,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            PipelineError::Validation(msg)
            | PipelineError::Parse(msg)
            | PipelineError::Reconstruction(msg)
            | PipelineError::Persistence(msg)
            | PipelineError::Stage(msg) => msg,
        }
    }
}

/// Caller-facing scheduler errors. Job failures never surface here; they are
/// recorded on the job itself.
#[derive(Debug, Error)]
pub enum SchedulerError {
    #[error("Generation pipeline not configured")]
    PipelineNotConfigured,

    #[error("No async runtime available to run generation jobs")]
    RuntimeUnavailable,

    #[error("Job not found: {0}")]
    JobNotFound(JobId),

    #[error("Timed out waiting for {0}")]
    Timeout(String),
}

/// Structural violations of the scene tree.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TreeError {
    #[error("Adding node '{child}' under '{parent}' would create a cycle")]
    Cycle { parent: String, child: String },

    #[error("Node '{0}' already has a parent")]
    AlreadyAttached(String),
}

/// Storage errors for persisted layouts
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Storage backend error: {0}")]
    Backend(#[from] sled::Error),

    #[error("Layout encoding error: {0}")]
    Encoding(#[from] bincode::Error),

    #[error("Invalid layout snapshot: {0}")]
    InvalidSnapshot(#[from] TreeError),
}

impl From<StorageError> for PipelineError {
    fn from(err: StorageError) -> Self {
        PipelineError::Persistence(err.to_string())
    }
}

/// Application-level errors for configuration, logging and the CLI.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Scheduler error: {0}")]
    Scheduler(#[from] SchedulerError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Generation failed: {0}")]
    GenerationFailed(String),

    #[error("Node not found in layout: {0}")]
    NodeNotFound(String),

    #[error("Failed to read plan {}: {source}", path.display())]
    PlanRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<config::ConfigError> for ApiError {
    fn from(err: config::ConfigError) -> Self {
        ApiError::ConfigError(err.to_string())
    }
}
