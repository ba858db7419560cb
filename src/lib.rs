//! layout3d: Background Generation of 3D Layout Hierarchies
//!
//! Turns 2D floor plans into a Layout → Room → Item scene tree on a single-lane
//! background job scheduler. Trees and annotation lists share one cursor type, and
//! every job state change is broadcast to subscribers.

pub mod annotation;
pub mod cli;
pub mod config;
pub mod error;
pub mod iterator;
pub mod job;
pub mod logging;
pub mod pipeline;
pub mod scene;
pub mod service;
pub mod store;
pub mod types;

pub use error::{ApiError, PipelineError, SchedulerError, StorageError, TreeError};
pub use iterator::{Aggregate, CompositeIterator, Cursor};
pub use job::{JobId, JobRecord, JobScheduler, JobStatus};
pub use scene::{find_node_by_id, NodeKind, SceneNode};
pub use service::GenerationService;
