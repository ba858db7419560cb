//! End-to-end generation: staged pipeline, scheduler and persistent layout store

use crate::integration::test_utils::{fast_config, ROOM_PLAN, WAIT};
use layout3d::error::PipelineErrorKind;
use layout3d::job::{JobScheduler, JobStatus};
use layout3d::pipeline::StagedPipeline;
use layout3d::scene::{find_node_by_id, leaf_count, outline};
use layout3d::store::persistence::SledLayoutStore;
use layout3d::store::{InMemoryLayoutStore, LayoutStore};
use layout3d::GenerationService;
use std::sync::Arc;
use tempfile::TempDir;

fn sled_service(dir: &TempDir) -> (GenerationService, Arc<SledLayoutStore>) {
    let store = Arc::new(SledLayoutStore::new(dir.path().join("layouts")).unwrap());
    let service = GenerationService::new(fast_config(), store.clone());
    (service, store)
}

#[tokio::test]
async fn test_plan_becomes_three_level_layout() {
    let dir = TempDir::new().unwrap();
    let (service, _store) = sled_service(&dir);

    let job = service.generate(ROOM_PLAN, WAIT).await.unwrap();
    assert_eq!(job.status, JobStatus::Completed);
    assert_eq!(job.progress, 100);

    let layout = job.result.unwrap();
    assert_eq!(layout.name(), "Main Layout");
    let room = find_node_by_id(&layout, "room-1").unwrap();
    assert_eq!(room.child_count(), 5);
    assert_eq!(leaf_count(&layout), 5);
    assert_eq!(find_node_by_id(&layout, "item-4").unwrap().name(), "Wall");
    assert_eq!(find_node_by_id(&layout, "item-5").unwrap().name(), "Furniture");
}

#[tokio::test]
async fn test_result_is_persisted_and_reloadable() {
    let dir = TempDir::new().unwrap();
    let result_id;
    let expected;
    {
        let (service, store) = sled_service(&dir);
        let job = service.generate(ROOM_PLAN, WAIT).await.unwrap();
        result_id = job.result_id.unwrap();
        expected = outline(&job.result.unwrap());
        store.flush().unwrap();
        // The run loop holds the pipeline (and the database) until it goes idle
        service.scheduler().wait_for_idle(WAIT).await.unwrap();
    }

    assert!(result_id.starts_with("layout-"));
    let reopened = SledLayoutStore::new(dir.path().join("layouts")).unwrap();
    let loaded = reopened.load(&result_id).unwrap().unwrap();
    assert_eq!(outline(&loaded), expected);
}

#[tokio::test]
async fn test_same_plan_yields_same_result_id() {
    let dir = TempDir::new().unwrap();
    let (service, _store) = sled_service(&dir);

    let first = service.generate(ROOM_PLAN, WAIT).await.unwrap();
    let second = service.generate(ROOM_PLAN, WAIT).await.unwrap();
    assert_ne!(first.id, second.id);
    assert_eq!(first.result_id, second.result_id);
}

#[tokio::test]
async fn test_stage_failures_are_classified() {
    let store: Arc<dyn LayoutStore> = Arc::new(InMemoryLayoutStore::new());
    let pipeline = Arc::new(StagedPipeline::with_store(store));
    let scheduler = JobScheduler::with_pipeline(fast_config(), pipeline);

    let empty = scheduler.submit("").unwrap();
    let malformed = scheduler.submit("{ not json").unwrap();
    let good = scheduler.submit(ROOM_PLAN).unwrap();
    scheduler.wait_for_idle(WAIT).await.unwrap();

    let empty = scheduler.get_job(&empty).unwrap();
    assert_eq!(empty.status, JobStatus::Failed);
    assert_eq!(empty.error_kind, Some(PipelineErrorKind::Validation));
    assert_eq!(
        empty.error.as_deref(),
        Some("Plan validation failed: plan is empty")
    );

    let malformed = scheduler.get_job(&malformed).unwrap();
    assert_eq!(malformed.error_kind, Some(PipelineErrorKind::Parse));
    assert!(malformed.error.unwrap().starts_with("Malformed plan"));

    assert_eq!(scheduler.get_job(&good).unwrap().status, JobStatus::Completed);
}

#[tokio::test]
async fn test_service_reports_failures_and_keeps_annotations_apart() {
    let service = GenerationService::new(fast_config(), Arc::new(InMemoryLayoutStore::new()));
    service.add_annotation("entrance", layout3d::annotation::Position::new(0.0, 0.0, 0.0));

    let err = service.generate_layout("   ", WAIT).await.unwrap_err();
    assert!(err.to_string().contains("plan is empty"));

    // Jobs never touch annotations
    assert_eq!(service.markers().len(), 1);
    assert_eq!(service.scheduler().list_jobs().len(), 1);
}
