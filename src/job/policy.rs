//! Scheduler tuning and retention policy.

use serde::{Deserialize, Serialize};

/// How many finished jobs the table keeps.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetentionPolicy {
    /// Cap on COMPLETED + FAILED records; oldest are evicted first. `None` keeps all.
    #[serde(default)]
    pub max_terminal_jobs: Option<usize>,
}

impl RetentionPolicy {
    pub fn unbounded() -> Self {
        Self::default()
    }

    pub fn keep_last(max_terminal_jobs: usize) -> Self {
        Self {
            max_terminal_jobs: Some(max_terminal_jobs),
        }
    }
}

fn default_checkpoint_delay_ms() -> u64 {
    50
}

/// Configuration for the job scheduler
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchedulerConfig {
    /// Pause between progress checkpoints (milliseconds); 0 only yields
    #[serde(default = "default_checkpoint_delay_ms")]
    pub checkpoint_delay_ms: u64,

    #[serde(default)]
    pub retention: RetentionPolicy,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            checkpoint_delay_ms: default_checkpoint_delay_ms(),
            retention: RetentionPolicy::default(),
        }
    }
}

impl SchedulerConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.retention.max_terminal_jobs == Some(0) {
            return Err("retention.max_terminal_jobs must be at least 1".to_string());
        }
        Ok(())
    }
}
