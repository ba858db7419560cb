//! Single-lane Job Scheduler
//!
//! Runs generation jobs one at a time in submission order. Submission never blocks:
//! the job is recorded as QUEUED and, if no run loop is active, one is spawned on the
//! current tokio runtime. The loop drains the queue and goes idle when it is empty.
//!
//! The job table is behind a `RwLock`. `submit` only appends; every later mutation
//! comes from the run loop. Each mutation is published to subscribers after the
//! table lock is released, so handlers may query the scheduler.

use crate::error::{PipelineError, SchedulerError};
use crate::job::events::{
    panic_message, Broadcaster, JobEventReceiver, StatusHandler, SubscriptionId,
};
use crate::job::policy::{RetentionPolicy, SchedulerConfig};
use crate::job::record::{JobId, JobRecord, JobStatus};
use crate::pipeline::{plan_preview, GenerationPipeline};
use parking_lot::{ReentrantMutex, RwLock};
use serde::Serialize;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::sync::Notify;
use tracing::{debug, error, info, warn};

/// Progress reported when a job enters PROCESSING.
pub const PROGRESS_STARTED: u8 = 10;
/// Progress reported just before the pipeline runs.
pub const PROGRESS_PIPELINE: u8 = 30;

/// Per-status job counts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct JobStats {
    pub queued: usize,
    pub processing: usize,
    pub completed: usize,
    pub failed: usize,
}

#[derive(Default)]
struct JobTable {
    /// Insertion order
    order: Vec<JobId>,
    jobs: HashMap<JobId, JobRecord>,
    /// QUEUED jobs not yet picked up, oldest first
    pending: VecDeque<JobId>,
}

impl JobTable {
    fn insert(&mut self, record: JobRecord) {
        self.order.push(record.id.clone());
        self.pending.push_back(record.id.clone());
        self.jobs.insert(record.id.clone(), record);
    }

    /// Drop the oldest terminal records beyond the policy cap.
    fn evict(&mut self, policy: &RetentionPolicy) -> Vec<JobId> {
        let Some(cap) = policy.max_terminal_jobs else {
            return Vec::new();
        };

        let terminal: Vec<JobId> = self
            .order
            .iter()
            .filter(|id| {
                self.jobs
                    .get(*id)
                    .map(|job| job.status.is_terminal())
                    .unwrap_or(false)
            })
            .cloned()
            .collect();
        if terminal.len() <= cap {
            return Vec::new();
        }

        let evicted: Vec<JobId> = terminal[..terminal.len() - cap].to_vec();
        for id in &evicted {
            self.jobs.remove(id);
        }
        self.order.retain(|id| self.jobs.contains_key(id));
        evicted
    }
}

struct Shared {
    config: SchedulerConfig,
    pipeline: RwLock<Option<Arc<dyn GenerationPipeline>>>,
    table: RwLock<JobTable>,
    broadcaster: Broadcaster,
    /// Keeps each mutation and its broadcast together, so subscribers observe
    /// changes in the order they were made. Reentrant so handlers may submit.
    publish_lock: ReentrantMutex<()>,
    running: AtomicBool,
    changed: Notify,
}

/// FIFO, single-flight generation job scheduler. Cheap to clone.
#[derive(Clone)]
pub struct JobScheduler {
    shared: Arc<Shared>,
}

impl JobScheduler {
    /// Create a scheduler with no pipeline wired. `submit` fails until
    /// [`set_pipeline`](Self::set_pipeline) is called.
    pub fn new(config: SchedulerConfig) -> Self {
        Self {
            shared: Arc::new(Shared {
                config,
                pipeline: RwLock::new(None),
                table: RwLock::new(JobTable::default()),
                broadcaster: Broadcaster::default(),
                publish_lock: ReentrantMutex::new(()),
                running: AtomicBool::new(false),
                changed: Notify::new(),
            }),
        }
    }

    pub fn with_pipeline(config: SchedulerConfig, pipeline: Arc<dyn GenerationPipeline>) -> Self {
        let scheduler = Self::new(config);
        scheduler.set_pipeline(pipeline);
        scheduler
    }

    /// Wire (or replace) the pipeline used for jobs started from now on.
    pub fn set_pipeline(&self, pipeline: Arc<dyn GenerationPipeline>) {
        *self.shared.pipeline.write() = Some(pipeline);
    }

    pub fn config(&self) -> &SchedulerConfig {
        &self.shared.config
    }

    /// Queue a generation job for `plan` and return its id immediately.
    ///
    /// Must be called from within a tokio runtime.
    pub fn submit(&self, plan: impl Into<String>) -> Result<JobId, SchedulerError> {
        if self.shared.pipeline.read().is_none() {
            return Err(SchedulerError::PipelineNotConfigured);
        }
        let handle = Handle::try_current().map_err(|_| SchedulerError::RuntimeUnavailable)?;

        let plan: String = plan.into();
        let record = JobRecord::queued(JobId::generate(), Arc::from(plan.as_str()));
        let job_id = record.id.clone();
        {
            let _publish = self.shared.publish_lock.lock();
            self.shared.table.write().insert(record.clone());
            info!(job_id = %job_id, plan = %plan_preview(&plan), "Job queued");
            self.shared.publish(&record);
        }

        self.shared.ensure_running(&handle);
        Ok(job_id)
    }

    pub fn get_job(&self, job_id: &JobId) -> Option<JobRecord> {
        self.shared.table.read().jobs.get(job_id).cloned()
    }

    /// All retained jobs in submission order.
    pub fn list_jobs(&self) -> Vec<JobRecord> {
        let table = self.shared.table.read();
        table
            .order
            .iter()
            .filter_map(|id| table.jobs.get(id).cloned())
            .collect()
    }

    pub fn stats(&self) -> JobStats {
        let table = self.shared.table.read();
        let mut stats = JobStats::default();
        for job in table.jobs.values() {
            match job.status {
                JobStatus::Queued => stats.queued += 1,
                JobStatus::Processing => stats.processing += 1,
                JobStatus::Completed => stats.completed += 1,
                JobStatus::Failed => stats.failed += 1,
            }
        }
        stats
    }

    /// No run loop active and nothing waiting.
    pub fn is_idle(&self) -> bool {
        !self.shared.running.load(Ordering::SeqCst) && self.shared.table.read().pending.is_empty()
    }

    /// Register a handler called synchronously with every job state change.
    pub fn subscribe<F>(&self, handler: F) -> SubscriptionId
    where
        F: Fn(&JobRecord) + Send + Sync + 'static,
    {
        let handler: StatusHandler = Arc::new(handler);
        self.shared.broadcaster.subscribe(handler)
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.shared.broadcaster.unsubscribe(id)
    }

    /// Channel receiving a snapshot of every job state change from now on.
    pub fn event_channel(&self) -> JobEventReceiver {
        self.shared.broadcaster.channel()
    }

    /// Resolve once `job_id` reaches COMPLETED or FAILED.
    ///
    /// The terminal record is taken from the event stream, so a job that retention
    /// evicts right after it finishes is still returned. A job already evicted when
    /// the call starts is `JobNotFound`.
    pub async fn wait_for_job(
        &self,
        job_id: &JobId,
        timeout: Option<Duration>,
    ) -> Result<JobRecord, SchedulerError> {
        let mut events = self.event_channel();
        let wait = async {
            match self.get_job(job_id) {
                Some(job) if job.status.is_terminal() => return Ok(job),
                Some(_) => {}
                None => {
                    while let Ok(job) = events.try_recv() {
                        if job.id == *job_id && job.status.is_terminal() {
                            return Ok(job);
                        }
                    }
                    return Err(SchedulerError::JobNotFound(job_id.clone()));
                }
            }
            while let Some(job) = events.recv().await {
                if job.id == *job_id && job.status.is_terminal() {
                    return Ok(job);
                }
            }
            Err(SchedulerError::JobNotFound(job_id.clone()))
        };

        match timeout {
            Some(limit) => tokio::time::timeout(limit, wait)
                .await
                .map_err(|_| SchedulerError::Timeout(format!("job {}", job_id)))?,
            None => wait.await,
        }
    }

    /// Resolve once the queue is drained and the run loop has stopped.
    pub async fn wait_for_idle(&self, timeout: Option<Duration>) -> Result<(), SchedulerError> {
        let wait = async {
            loop {
                let notified = self.shared.changed.notified();
                if self.is_idle() {
                    return;
                }
                notified.await;
            }
        };

        match timeout {
            Some(limit) => tokio::time::timeout(limit, wait)
                .await
                .map_err(|_| SchedulerError::Timeout("scheduler to go idle".to_string())),
            None => {
                wait.await;
                Ok(())
            }
        }
    }
}

impl Shared {
    fn publish(&self, record: &JobRecord) {
        self.broadcaster.publish(record);
        self.changed.notify_waiters();
    }

    /// Apply `update` to a job and broadcast the result.
    fn mutate<F>(&self, job_id: &JobId, update: F) -> Option<JobRecord>
    where
        F: FnOnce(&mut JobRecord),
    {
        let _publish = self.publish_lock.lock();
        let snapshot = {
            let mut table = self.table.write();
            let job = table.jobs.get_mut(job_id)?;
            update(job);
            job.clone()
        };
        self.publish(&snapshot);
        Some(snapshot)
    }

    fn ensure_running(self: &Arc<Self>, handle: &Handle) {
        if self
            .running
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
        {
            debug!("Starting scheduler run loop");
            handle.spawn(Arc::clone(self).run_loop());
        }
    }

    async fn run_loop(self: Arc<Self>) {
        let mut guard = RunLoopGuard {
            shared: Arc::clone(&self),
            armed: true,
        };
        loop {
            let next = self.table.write().pending.pop_front();
            match next {
                Some(job_id) => self.execute(job_id).await,
                None => {
                    self.running.store(false, Ordering::SeqCst);
                    // A submit may have queued after the pop but still seen the loop as running.
                    let pending = !self.table.read().pending.is_empty();
                    if pending
                        && self
                            .running
                            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
                            .is_ok()
                    {
                        continue;
                    }
                    guard.armed = false;
                    break;
                }
            }
        }

        debug!("Scheduler idle");
        self.changed.notify_waiters();
    }

    async fn checkpoint(&self) {
        match self.config.checkpoint_delay_ms {
            0 => tokio::task::yield_now().await,
            ms => tokio::time::sleep(Duration::from_millis(ms)).await,
        }
    }

    async fn execute(&self, job_id: JobId) {
        let Some(started) = self.mutate(&job_id, |job| job.start(PROGRESS_STARTED)) else {
            warn!(job_id = %job_id, "Queued job vanished before it could start");
            return;
        };
        info!(job_id = %job_id, plan = %plan_preview(&started.plan), "Starting job");

        self.checkpoint().await;
        self.mutate(&job_id, |job| job.advance(PROGRESS_PIPELINE));
        self.checkpoint().await;

        let outcome = self.run_pipeline(&started).await;
        self.checkpoint().await;

        match outcome {
            Ok(output) => {
                let result_id = output.result_id.clone();
                self.mutate(&job_id, |job| job.complete(output));
                info!(job_id = %job_id, result_id = %result_id, "Job completed");
            }
            Err(err) => {
                self.mutate(&job_id, |job| job.fail(&err));
                error!(
                    job_id = %job_id,
                    kind = err.kind().as_str(),
                    error = %err,
                    "Job failed"
                );
            }
        }

        let evicted = self.table.write().evict(&self.config.retention);
        if !evicted.is_empty() {
            debug!(count = evicted.len(), "Evicted finished jobs");
        }
    }

    /// Run the pipeline on its own task so a panic becomes a job failure.
    async fn run_pipeline(
        &self,
        job: &JobRecord,
    ) -> Result<crate::pipeline::GenerationOutput, PipelineError> {
        let pipeline = self
            .pipeline
            .read()
            .clone()
            .ok_or_else(|| PipelineError::Stage("Generation pipeline not configured".into()))?;
        let plan = Arc::clone(&job.plan);

        let task = tokio::spawn(async move { pipeline.generate(&plan).await });
        match task.await {
            Ok(result) => result,
            Err(join_err) if join_err.is_panic() => {
                let payload = join_err.into_panic();
                Err(PipelineError::Stage(panic_message(
                    payload.as_ref(),
                    "pipeline panicked",
                )))
            }
            Err(join_err) => Err(PipelineError::Stage(join_err.to_string())),
        }
    }
}

/// Clears `running` if the run loop task ends without reaching its idle exit,
/// so the next `submit` can start a fresh loop.
struct RunLoopGuard {
    shared: Arc<Shared>,
    armed: bool,
}

impl Drop for RunLoopGuard {
    fn drop(&mut self) {
        if self.armed {
            warn!("Scheduler run loop ended abnormally");
            self.shared.running.store(false, Ordering::SeqCst);
            self.shared.changed.notify_waiters();
        }
    }
}
