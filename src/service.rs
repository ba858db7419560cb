//! Generation facade: one entry point wiring the pipeline, the job scheduler,
//! the layout store and the annotation collection.

use crate::annotation::{
    collect_markers, Annotation, AnnotationIterator, AnnotationStore, Marker, Position,
};
use crate::config::{AppConfig, StorageBackend};
use crate::error::{ApiError, SchedulerError, StorageError};
use crate::job::{JobId, JobRecord, JobScheduler, JobStatus, SchedulerConfig};
use crate::pipeline::{GenerationPipeline, StagedPipeline};
use crate::scene::SceneNode;
use crate::store::persistence::SledLayoutStore;
use crate::store::{InMemoryLayoutStore, LayoutStore};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

pub struct GenerationService {
    scheduler: JobScheduler,
    store: Arc<dyn LayoutStore>,
    annotations: AnnotationStore,
}

impl GenerationService {
    /// Reference pipeline persisting into `store`.
    pub fn new(config: SchedulerConfig, store: Arc<dyn LayoutStore>) -> Self {
        let pipeline = Arc::new(StagedPipeline::with_store(Arc::clone(&store)));
        Self::with_pipeline(config, pipeline, store)
    }

    pub fn with_pipeline(
        config: SchedulerConfig,
        pipeline: Arc<dyn GenerationPipeline>,
        store: Arc<dyn LayoutStore>,
    ) -> Self {
        Self {
            scheduler: JobScheduler::with_pipeline(config, pipeline),
            store,
            annotations: AnnotationStore::new(),
        }
    }

    /// Build from loaded configuration, opening the configured layout store.
    pub fn from_config(config: &AppConfig, workspace_root: &Path) -> Result<Self, ApiError> {
        let store: Arc<dyn LayoutStore> = match config.storage.backend {
            StorageBackend::Memory => Arc::new(InMemoryLayoutStore::new()),
            StorageBackend::Sled => {
                let path = config.storage.resolve_layouts_path(workspace_root);
                std::fs::create_dir_all(&path)?;
                debug!(path = %path.display(), "Opening layout store");
                Arc::new(SledLayoutStore::new(&path)?)
            }
        };
        Ok(Self::new(config.scheduler.clone(), store))
    }

    pub fn scheduler(&self) -> &JobScheduler {
        &self.scheduler
    }

    pub fn store(&self) -> &Arc<dyn LayoutStore> {
        &self.store
    }

    /// Queue generation of `plan`; returns immediately.
    pub fn enqueue_generation(&self, plan: impl Into<String>) -> Result<JobId, SchedulerError> {
        self.scheduler.submit(plan)
    }

    /// Queue `plan` and wait for the job to finish. A failed job is still `Ok`;
    /// inspect its status.
    pub async fn generate(
        &self,
        plan: impl Into<String>,
        timeout: Option<Duration>,
    ) -> Result<JobRecord, ApiError> {
        let job_id = self.enqueue_generation(plan)?;
        Ok(self.scheduler.wait_for_job(&job_id, timeout).await?)
    }

    /// Like [`generate`](Self::generate), but a failed job becomes an error and
    /// the layout is returned.
    pub async fn generate_layout(
        &self,
        plan: impl Into<String>,
        timeout: Option<Duration>,
    ) -> Result<SceneNode, ApiError> {
        let job = self.generate(plan, timeout).await?;
        match (job.status, job.result) {
            (JobStatus::Completed, Some(layout)) => Ok(layout),
            _ => Err(ApiError::GenerationFailed(
                job.error.unwrap_or_else(|| format!("job {} produced no layout", job.id)),
            )),
        }
    }

    pub fn load_layout(&self, result_id: &str) -> Result<Option<SceneNode>, StorageError> {
        self.store.load(result_id)
    }

    pub fn add_annotation(&self, text: impl Into<String>, position: Position) -> Annotation {
        let annotation = self.annotations.add(text, position);
        info!(annotation_id = %annotation.id, "Annotation added");
        annotation
    }

    pub fn update_annotation(&self, id: &str, text: impl Into<String>) -> bool {
        let updated = self.annotations.update(id, text);
        debug!(annotation_id = id, updated, "Annotation update");
        updated
    }

    pub fn remove_annotation(&self, id: &str) -> bool {
        let removed = self.annotations.remove(id);
        debug!(annotation_id = id, removed, "Annotation removal");
        removed
    }

    /// Live cursor over all annotations.
    pub fn annotations(&self) -> AnnotationIterator {
        self.annotations.create_iterator()
    }

    /// Renderer markers for every annotation.
    pub fn markers(&self) -> Vec<Marker> {
        collect_markers(self.annotations())
    }
}
