//! Status-change fan-out to handlers and channels.

use crate::job::record::JobRecord;
use parking_lot::{Mutex, RwLock};
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::error;

/// Callback invoked synchronously with the job's state after every mutation.
pub type StatusHandler = Arc<dyn Fn(&JobRecord) + Send + Sync>;

/// Receiver of job state snapshots, one per mutation.
pub type JobEventReceiver = mpsc::UnboundedReceiver<JobRecord>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

#[derive(Default)]
pub(crate) struct Broadcaster {
    next_id: AtomicU64,
    handlers: RwLock<Vec<(SubscriptionId, StatusHandler)>>,
    channels: Mutex<Vec<mpsc::UnboundedSender<JobRecord>>>,
}

impl Broadcaster {
    pub(crate) fn subscribe(&self, handler: StatusHandler) -> SubscriptionId {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.handlers.write().push((id, handler));
        id
    }

    pub(crate) fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut handlers = self.handlers.write();
        let before = handlers.len();
        handlers.retain(|(existing, _)| *existing != id);
        handlers.len() != before
    }

    pub(crate) fn channel(&self) -> JobEventReceiver {
        let (tx, rx) = mpsc::unbounded_channel();
        self.channels.lock().push(tx);
        rx
    }

    pub(crate) fn subscriber_count(&self) -> usize {
        self.handlers.read().len() + self.channels.lock().len()
    }

    /// Deliver `record` to every handler, then every open channel.
    ///
    /// Handlers run on a copy of the list, so they may subscribe or unsubscribe.
    /// A panicking handler is logged and skipped. Channels whose receiver was
    /// dropped are pruned.
    pub(crate) fn publish(&self, record: &JobRecord) {
        let handlers: Vec<(SubscriptionId, StatusHandler)> = self
            .handlers
            .read()
            .iter()
            .map(|(id, handler)| (*id, Arc::clone(handler)))
            .collect();
        for (id, handler) in handlers {
            if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(|| handler(record))) {
                error!(
                    subscription = id.0,
                    job_id = %record.id,
                    status = record.status.as_str(),
                    error = %panic_message(payload.as_ref(), "handler panicked"),
                    "Status handler panicked"
                );
            }
        }

        self.channels
            .lock()
            .retain(|tx| tx.send(record.clone()).is_ok());
    }
}

/// Text of a caught panic payload, or `fallback` when it is not a string.
pub(crate) fn panic_message(payload: &(dyn Any + Send), fallback: &str) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| fallback.to_string())
}
