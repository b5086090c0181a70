use std::sync::atomic::{AtomicU8, Ordering};

use compact_str::CompactString;
use parking_lot::Mutex;
use tokio::{sync::mpsc::UnboundedSender, task::JoinHandle};

use super::{PublishCallback, policy::CheckPolicy};
use crate::{fingerprint::SeenStatements, issue::Issue};

/// Lifecycle of one database's lint state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Phase {
    Uninstalled = 0,
    Installed = 1,
    /// Queued work drains without analysis; nothing is published
    Uninstalling = 2
}

impl Phase {
    fn from_u8(value: u8) -> Self {
        match value {
            1 => Self::Installed,
            2 => Self::Uninstalling,
            _ => Self::Uninstalled
        }
    }
}

/// Execution reported by the host engine.
#[derive(Debug, Clone)]
pub(crate) struct TraceEvent {
    pub sql:        String,
    pub elapsed_ms: u64,
    pub ext_info:   String
}

pub(crate) enum WorkItem {
    Execution(TraceEvent),
    InitCheck
}

pub(crate) struct DatabaseState {
    pub callback:     PublishCallback,
    pub policy:       CheckPolicy,
    pub seen:         SeenStatements,
    pub init_checked: bool
}

/// Everything the registry keeps for one installed database.
pub(crate) struct DatabaseLint {
    db_path:      CompactString,
    phase:        AtomicU8,
    state:        Mutex<DatabaseState>,
    publish_gate: Mutex<()>,
    queue:        Mutex<Option<UnboundedSender<WorkItem>>>,
    worker:       Mutex<Option<JoinHandle<()>>>
}

impl DatabaseLint {
    pub fn new(
        db_path: &str,
        callback: PublishCallback,
        max_seen: usize,
        queue: UnboundedSender<WorkItem>
    ) -> Self {
        Self {
            db_path:      db_path.into(),
            phase:        AtomicU8::new(Phase::Installed as u8),
            state:        Mutex::new(DatabaseState {
                callback,
                policy: CheckPolicy::default(),
                seen: SeenStatements::new(max_seen),
                init_checked: false
            }),
            publish_gate: Mutex::new(()),
            queue:        Mutex::new(Some(queue)),
            worker:       Mutex::new(None)
        }
    }

    pub fn db_path(&self) -> &str {
        &self.db_path
    }

    pub fn phase(&self) -> Phase {
        Phase::from_u8(self.phase.load(Ordering::Acquire))
    }

    pub fn is_installed(&self) -> bool {
        self.phase() == Phase::Installed
    }

    pub fn state(&self) -> parking_lot::MutexGuard<'_, DatabaseState> {
        self.state.lock()
    }

    pub fn set_worker(&self, worker: JoinHandle<()>) {
        *self.worker.lock() = Some(worker);
    }

    /// Queue work for the worker; dropped once the queue is closed.
    pub fn enqueue(&self, item: WorkItem) -> bool {
        match self.queue.lock().as_ref() {
            Some(tx) => tx.send(item).is_ok(),
            None => false
        }
    }

    /// Move from Installed to Uninstalling and close the queue.
    ///
    /// Returns the worker to wait on, or `None` if another caller already
    /// started the teardown.
    pub fn begin_uninstall(&self) -> Option<Option<JoinHandle<()>>> {
        self.phase
            .compare_exchange(
                Phase::Installed as u8,
                Phase::Uninstalling as u8,
                Ordering::AcqRel,
                Ordering::Acquire
            )
            .ok()?;
        self.queue.lock().take();
        Some(self.worker.lock().take())
    }

    pub fn finish_uninstall(&self) {
        self.phase.store(Phase::Uninstalled as u8, Ordering::Release);
    }

    /// Deliver one batch to the callback unless the database left Installed.
    ///
    /// Deliveries are serialized, so a batch is never delivered after the
    /// phase change has been observed by a concurrent publisher.
    pub fn publish(&self, issues: &[Issue]) -> bool {
        let _gate = self.publish_gate.lock();
        if !self.is_installed() {
            tracing::debug!(db = %self.db_path, count = issues.len(), "publish after uninstall dropped");
            return false;
        }
        let callback = self.state.lock().callback.clone();
        callback(self.db_path.as_str(), issues);
        true
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{
        Arc,
        atomic::{AtomicUsize, Ordering}
    };

    use tokio::sync::mpsc;

    use super::*;

    fn database(counter: Arc<AtomicUsize>) -> DatabaseLint {
        let (tx, _rx) = mpsc::unbounded_channel();
        let callback: PublishCallback = Arc::new(move |_: &str, issues: &[Issue]| {
            counter.fetch_add(issues.len(), Ordering::SeqCst);
        });
        DatabaseLint::new("app.db", callback, 16, tx)
    }

    #[test]
    fn test_phase_transitions() {
        let db = database(Arc::new(AtomicUsize::new(0)));
        assert_eq!(db.phase(), Phase::Installed);
        assert!(db.begin_uninstall().is_some());
        assert_eq!(db.phase(), Phase::Uninstalling);
        assert!(db.begin_uninstall().is_none());
        db.finish_uninstall();
        assert_eq!(db.phase(), Phase::Uninstalled);
    }

    #[test]
    fn test_enqueue_after_uninstall_rejected() {
        let db = database(Arc::new(AtomicUsize::new(0)));
        assert!(!db.enqueue(WorkItem::InitCheck));
        let (tx, mut rx) = mpsc::unbounded_channel();
        *db.queue.lock() = Some(tx);
        assert!(db.enqueue(WorkItem::InitCheck));
        assert!(rx.try_recv().is_ok());
        db.begin_uninstall();
        assert!(!db.enqueue(WorkItem::InitCheck));
    }

    #[test]
    fn test_publish_swallowed_after_uninstall() {
        let counter = Arc::new(AtomicUsize::new(0));
        let db = database(Arc::clone(&counter));
        assert!(db.publish(&[]));
        db.begin_uninstall();
        assert!(!db.publish(&[]));
        assert_eq!(counter.load(Ordering::SeqCst), 0);
    }
}
