//! Shared test utilities for integration tests
//!
//! `ScriptedPipeline` interprets the plan text as instructions, so scheduler tests
//! control duration and outcome per job:
//! - `fail:<message>` fails with `<message>`
//! - `panic` panics inside the pipeline
//! - `sleep:<ms>:<name>` sleeps, then succeeds
//! - anything else succeeds with a layout named after the plan

use async_trait::async_trait;
use layout3d::error::PipelineError;
use layout3d::job::{JobScheduler, SchedulerConfig};
use layout3d::pipeline::{GenerationOutput, GenerationPipeline};
use layout3d::scene::SceneNode;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

#[derive(Default)]
pub struct ScriptedPipeline {
    active: AtomicUsize,
    max_active: AtomicUsize,
    runs: AtomicUsize,
}

impl ScriptedPipeline {
    /// Highest number of concurrent `generate` calls observed.
    pub fn max_active(&self) -> usize {
        self.max_active.load(Ordering::SeqCst)
    }

    pub fn runs(&self) -> usize {
        self.runs.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl GenerationPipeline for ScriptedPipeline {
    async fn generate(&self, plan: &str) -> Result<GenerationOutput, PipelineError> {
        let now = self.active.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_active.fetch_max(now, Ordering::SeqCst);
        self.runs.fetch_add(1, Ordering::SeqCst);

        let outcome = run_script(plan).await;
        self.active.fetch_sub(1, Ordering::SeqCst);
        outcome
    }
}

async fn run_script(plan: &str) -> Result<GenerationOutput, PipelineError> {
    if let Some(message) = plan.strip_prefix("fail:") {
        return Err(PipelineError::Stage(message.to_string()));
    }
    if plan == "panic" {
        panic!("pipeline exploded");
    }

    let name = match plan.strip_prefix("sleep:") {
        Some(rest) => {
            let (ms, name) = rest.split_once(':').unwrap_or((rest, rest));
            let ms: u64 = ms.parse().unwrap_or(0);
            tokio::time::sleep(Duration::from_millis(ms)).await;
            name
        }
        None => plan,
    };

    Ok(GenerationOutput {
        result_id: format!("layout-{}", name),
        layout: SceneNode::layout("layout-1", name),
    })
}

pub fn fast_config() -> SchedulerConfig {
    SchedulerConfig {
        checkpoint_delay_ms: 0,
        ..SchedulerConfig::default()
    }
}

pub fn scripted_scheduler() -> (JobScheduler, Arc<ScriptedPipeline>) {
    scripted_scheduler_with(fast_config())
}

pub fn scripted_scheduler_with(config: SchedulerConfig) -> (JobScheduler, Arc<ScriptedPipeline>) {
    let pipeline = Arc::new(ScriptedPipeline::default());
    let scheduler = JobScheduler::with_pipeline(config, pipeline.clone());
    (scheduler, pipeline)
}

pub const WAIT: Option<Duration> = Some(Duration::from_secs(10));

/// Small floor plan: a closed 4x3 wall outline and one furniture line.
pub const ROOM_PLAN: &str = r#"{
    "entities": [
        { "type": "polyline", "layer": "WALLS", "closed": true,
          "vertices": [{"x": 0, "y": 0}, {"x": 4, "y": 0}, {"x": 4, "y": 3}, {"x": 0, "y": 3}] },
        { "type": "line", "layer": "FURNITURE",
          "vertices": [{"x": 1, "y": 1}, {"x": 2, "y": 1}] }
    ]
}"#;

/// Serializes tests that read or write `LAYOUT3D*` environment variables.
pub static ENV_MUTEX: parking_lot::Mutex<()> = parking_lot::const_mutex(());
