//! Generation Pipeline
//!
//! The fixed validate → parse → reconstruct → persist sequence run once per job.
//! Stages are collaborators behind traits; this module only sequences them and
//! propagates the first failure unchanged.

pub mod model;
pub mod stages;

pub use model::{EntityKind, PlanEntity, PlanModel, Point2};
pub use stages::{
    JsonPlanParser, NonEmptyValidator, PlanParser, PlanValidator, Reconstructor,
    SegmentReconstructor,
};

use crate::error::PipelineError;
use crate::scene::SceneNode;
use crate::store::LayoutStore;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, info, instrument};

/// Successful generation: the persisted id and the in-memory layout.
#[derive(Debug, Clone)]
pub struct GenerationOutput {
    pub result_id: String,
    pub layout: SceneNode,
}

/// Work executed by the scheduler for every job.
#[async_trait]
pub trait GenerationPipeline: Send + Sync {
    async fn generate(&self, plan: &str) -> Result<GenerationOutput, PipelineError>;
}

/// Short, char-safe prefix of plan content for log lines.
pub fn plan_preview(plan: &str) -> String {
    const PREVIEW_CHARS: usize = 20;
    let mut preview: String = plan.chars().take(PREVIEW_CHARS).collect();
    if plan.chars().count() > PREVIEW_CHARS {
        preview.push_str("...");
    }
    preview
}

/// The four-stage pipeline.
pub struct StagedPipeline {
    validator: Arc<dyn PlanValidator>,
    parser: Arc<dyn PlanParser>,
    reconstructor: Arc<dyn Reconstructor>,
    store: Arc<dyn LayoutStore>,
}

impl StagedPipeline {
    pub fn new(
        validator: Arc<dyn PlanValidator>,
        parser: Arc<dyn PlanParser>,
        reconstructor: Arc<dyn Reconstructor>,
        store: Arc<dyn LayoutStore>,
    ) -> Self {
        Self {
            validator,
            parser,
            reconstructor,
            store,
        }
    }

    /// Reference stages (non-empty validation, JSON plans, segment reconstruction)
    /// persisting into `store`.
    pub fn with_store(store: Arc<dyn LayoutStore>) -> Self {
        Self::new(
            Arc::new(NonEmptyValidator),
            Arc::new(JsonPlanParser),
            Arc::new(SegmentReconstructor::default()),
            store,
        )
    }

    pub fn store(&self) -> &Arc<dyn LayoutStore> {
        &self.store
    }
}

#[async_trait]
impl GenerationPipeline for StagedPipeline {
    #[instrument(skip_all, fields(plan = %plan_preview(plan)))]
    async fn generate(&self, plan: &str) -> Result<GenerationOutput, PipelineError> {
        debug!(stage = "validate", "Running pipeline stage");
        self.validator.validate(plan)?;
        tokio::task::yield_now().await;

        debug!(stage = "parse", "Running pipeline stage");
        let model = self.parser.parse(plan)?;
        tokio::task::yield_now().await;

        debug!(stage = "reconstruct", "Running pipeline stage");
        let layout = self.reconstructor.reconstruct(&model)?;
        tokio::task::yield_now().await;

        debug!(stage = "persist", "Running pipeline stage");
        let result_id = self.store.store(&layout)?;

        info!(result_id = %result_id, "Layout generated");
        Ok(GenerationOutput { result_id, layout })
    }
}
