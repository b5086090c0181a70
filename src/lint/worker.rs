use std::sync::Arc;

use tokio::sync::mpsc::UnboundedReceiver;
use tracing::{debug, warn};

use super::{
    LintEngine,
    database::{DatabaseLint, WorkItem},
    pipeline
};

/// Drain one database's queue in FIFO order until it is closed.
///
/// Each item is analyzed on the blocking pool. Items still queued when the
/// database leaves Installed are discarded unanalyzed.
pub(super) async fn run_worker(
    engine: Arc<LintEngine>,
    db: Arc<DatabaseLint>,
    mut rx: UnboundedReceiver<WorkItem>
) {
    while let Some(item) = rx.recv().await {
        if !db.is_installed() {
            debug!(db = db.db_path(), "queued work dropped after uninstall");
            continue;
        }
        let task_engine = Arc::clone(&engine);
        let task_db = Arc::clone(&db);
        let result = tokio::task::spawn_blocking(move || match item {
            WorkItem::Execution(event) => {
                pipeline::run(&task_engine, &task_db, &event);
            }
            WorkItem::InitCheck => pipeline::init_check(&task_engine, &task_db)
        })
        .await;
        if let Err(e) = result {
            warn!(db = db.db_path(), error = %e, "analysis task failed");
        }
    }
    debug!(db = db.db_path(), "lint worker stopped");
}
