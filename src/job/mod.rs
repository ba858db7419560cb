//! Background generation jobs: records, the single-lane scheduler and status fan-out.

pub mod events;
pub mod policy;
pub mod record;
pub mod scheduler;

pub use events::{JobEventReceiver, StatusHandler, SubscriptionId};
pub use policy::{RetentionPolicy, SchedulerConfig};
pub use record::{JobId, JobRecord, JobStatus};
pub use scheduler::{JobScheduler, JobStats, PROGRESS_PIPELINE, PROGRESS_STARTED};
