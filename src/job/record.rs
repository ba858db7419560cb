//! Job record and its state machine.

use crate::error::{PipelineError, PipelineErrorKind};
use crate::pipeline::GenerationOutput;
use crate::scene::SceneNode;
use crate::types::{new_id, now_millis};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Process-unique job identifier (`job-<pid>-<seq>`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobId(String);

impl JobId {
    pub fn generate() -> Self {
        JobId(new_id("job"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for JobId {
    fn from(value: &str) -> Self {
        JobId(value.to_string())
    }
}

impl From<String> for JobId {
    fn from(value: String) -> Self {
        JobId(value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JobStatus {
    Queued,
    Processing,
    Completed,
    Failed,
}

impl JobStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            JobStatus::Queued => "QUEUED",
            JobStatus::Processing => "PROCESSING",
            JobStatus::Completed => "COMPLETED",
            JobStatus::Failed => "FAILED",
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Failed)
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One unit of generation work.
///
/// `error`/`error_kind` are set iff `Failed`; `result_id`/`result` iff `Completed`.
#[derive(Debug, Clone, Serialize)]
pub struct JobRecord {
    pub id: JobId,
    /// Opaque source content handed to the pipeline
    #[serde(skip)]
    pub plan: Arc<str>,
    pub status: JobStatus,
    /// Percent complete; never decreases within a run
    pub progress: u8,
    pub error: Option<String>,
    pub error_kind: Option<PipelineErrorKind>,
    pub result_id: Option<String>,
    #[serde(skip)]
    pub result: Option<SceneNode>,
    pub submitted_at_ms: u64,
    pub started_at_ms: Option<u64>,
    pub finished_at_ms: Option<u64>,
}

impl JobRecord {
    pub(crate) fn queued(id: JobId, plan: Arc<str>) -> Self {
        Self {
            id,
            plan,
            status: JobStatus::Queued,
            progress: 0,
            error: None,
            error_kind: None,
            result_id: None,
            result: None,
            submitted_at_ms: now_millis(),
            started_at_ms: None,
            finished_at_ms: None,
        }
    }

    pub(crate) fn start(&mut self, progress: u8) {
        debug_assert_eq!(self.status, JobStatus::Queued);
        self.status = JobStatus::Processing;
        self.started_at_ms = Some(now_millis());
        self.advance(progress);
    }

    pub(crate) fn advance(&mut self, progress: u8) {
        self.progress = self.progress.max(progress.min(100));
    }

    pub(crate) fn complete(&mut self, output: GenerationOutput) {
        debug_assert_eq!(self.status, JobStatus::Processing);
        self.status = JobStatus::Completed;
        self.advance(100);
        self.result_id = Some(output.result_id);
        self.result = Some(output.layout);
        self.finished_at_ms = Some(now_millis());
    }

    pub(crate) fn fail(&mut self, error: &PipelineError) {
        debug_assert_eq!(self.status, JobStatus::Processing);
        self.status = JobStatus::Failed;
        self.error = Some(error.message().to_string());
        self.error_kind = Some(error.kind());
        self.finished_at_ms = Some(now_millis());
    }

    /// Milliseconds between start and finish, once terminal.
    pub fn duration_ms(&self) -> Option<u64> {
        match (self.started_at_ms, self.finished_at_ms) {
            (Some(start), Some(end)) => Some(end.saturating_sub(start)),
            _ => None,
        }
    }
}
