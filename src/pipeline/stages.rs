//! Stage collaborators and the reference implementations used by the CLI.

use crate::error::PipelineError;
use crate::pipeline::model::{EntityKind, PlanModel};
use crate::scene::SceneNode;
use tracing::debug;

/// Accepts or rejects raw plan content before parsing.
pub trait PlanValidator: Send + Sync {
    fn validate(&self, plan: &str) -> Result<(), PipelineError>;
}

/// Turns raw plan content into a geometric model.
pub trait PlanParser: Send + Sync {
    fn parse(&self, plan: &str) -> Result<PlanModel, PipelineError>;
}

/// Builds the scene tree for a parsed plan.
pub trait Reconstructor: Send + Sync {
    fn reconstruct(&self, model: &PlanModel) -> Result<SceneNode, PipelineError>;
}

/// Rejects empty or whitespace-only plans.
#[derive(Debug, Clone, Copy, Default)]
pub struct NonEmptyValidator;

impl PlanValidator for NonEmptyValidator {
    fn validate(&self, plan: &str) -> Result<(), PipelineError> {
        if plan.trim().is_empty() {
            return Err(PipelineError::Validation(
                "Plan validation failed: plan is empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// Parses plans written as JSON `PlanModel` documents.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonPlanParser;

impl PlanParser for JsonPlanParser {
    fn parse(&self, plan: &str) -> Result<PlanModel, PipelineError> {
        let model: PlanModel = serde_json::from_str(plan)
            .map_err(|e| PipelineError::Parse(format!("Malformed plan: {}", e)))?;

        for (index, entity) in model.entities.iter().enumerate() {
            if entity.kind == EntityKind::Line && entity.vertices.len() < 2 {
                return Err(PipelineError::Parse(format!(
                    "Line entity {} has {} vertices (needs 2)",
                    index,
                    entity.vertices.len()
                )));
            }
        }

        debug!(entities = model.entities.len(), "Parsed plan");
        Ok(model)
    }
}

/// Reconstructs one layout with a single default room holding one item per segment.
#[derive(Debug, Clone)]
pub struct SegmentReconstructor {
    /// Segments shorter than this are dropped
    pub min_segment_length: f64,
}

impl Default for SegmentReconstructor {
    fn default() -> Self {
        Self {
            min_segment_length: 0.001,
        }
    }
}

impl SegmentReconstructor {
    fn item_name(layer: &str) -> &'static str {
        if layer == "WALLS" {
            "Wall"
        } else {
            "Furniture"
        }
    }
}

impl Reconstructor for SegmentReconstructor {
    fn reconstruct(&self, model: &PlanModel) -> Result<SceneNode, PipelineError> {
        let layout = SceneNode::layout("layout-1", "Main Layout");
        let room = SceneNode::room("room-1", "Default Room");

        let mut next_item = 1usize;
        for entity in &model.entities {
            for (a, b) in entity.segments() {
                if a.distance(&b) < self.min_segment_length {
                    continue;
                }
                let item = SceneNode::item(
                    format!("item-{}", next_item),
                    Self::item_name(&entity.layer),
                );
                next_item += 1;
                room.add(item)
                    .map_err(|e| PipelineError::Reconstruction(e.to_string()))?;
            }
        }

        debug!(items = next_item - 1, "Reconstructed layout");
        layout
            .add(room)
            .map_err(|e| PipelineError::Reconstruction(e.to_string()))?;
        Ok(layout)
    }
}
