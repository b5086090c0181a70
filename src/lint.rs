//! Lint orchestration across databases.
//!
//! A [`LintRegistry`] is the single authority for which databases are linted,
//! under which policy, and where their issues go. It is constructed by
//! whoever bootstraps linting and owns one worker task per installed
//! database.
//!
//! # Lifecycle
//!
//! ```text
//! Uninstalled --install--> Installed --uninstall--> Uninstalling --drained--> Uninstalled
//! ```
//!
//! Notifications for a database that is not Installed are ignored, and
//! nothing is published for it once uninstall has begun.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//!
//! use sqlite_lint::{config::Config, issue::Issue, lint::LintRegistry};
//!
//! # #[tokio::main]
//! # async fn main() -> sqlite_lint::AppResult<()> {
//! let registry = LintRegistry::init(&Config::default())?;
//! registry.install(
//!     "app.db",
//!     Arc::new(|db: &str, issues: &[Issue]| println!("{}: {} issue(s)", db, issues.len()))
//! );
//!
//! let ids = registry.notify_execution_sync("app.db", "SELECT * FROM t WHERE a LIKE '%x'", 5, "");
//! assert!(!ids.is_empty());
//!
//! registry.shutdown().await;
//! # Ok(())
//! # }
//! ```

mod database;
mod pipeline;
mod policy;
mod worker;

use std::{collections::HashMap, sync::Arc};

use compact_str::CompactString;
pub use database::Phase;
use database::{DatabaseLint, TraceEvent, WorkItem};
use parking_lot::RwLock;
pub use policy::{ALL_CHECKERS, CheckPolicy, WhiteList};
use tokio::{runtime::Handle, sync::mpsc, task::JoinHandle};
use tracing::{debug, info, warn};

use crate::{
    checker::CheckerRunner,
    config::{Config, LintConfig},
    error::{AppResult, runtime_error},
    issue::Issue
};

/// Receives every batch of issues published for a database.
pub type PublishCallback = Arc<dyn Fn(&str, &[Issue]) + Send + Sync>;

type Databases = Arc<RwLock<HashMap<CompactString, Arc<DatabaseLint>>>>;

/// Configuration and checkers shared by every database.
pub(crate) struct LintEngine {
    config:   LintConfig,
    checkers: CheckerRunner
}

/// Registry of linted databases.
pub struct LintRegistry {
    engine:    Arc<LintEngine>,
    databases: Databases,
    runtime:   Handle
}

impl LintRegistry {
    /// Create a registry whose workers run on the current tokio runtime.
    pub fn init(config: &Config) -> AppResult<Self> {
        let runtime = Handle::try_current()
            .map_err(|e| runtime_error(format!("Lint registry needs a tokio runtime: {}", e)))?;
        Ok(Self::with_handle(runtime, config))
    }

    /// Create a registry whose workers run on `runtime`.
    pub fn with_handle(runtime: Handle, config: &Config) -> Self {
        Self::with_checkers(runtime, config, CheckerRunner::with_config(&config.checkers))
    }

    /// Create a registry with a custom checker set.
    pub fn with_checkers(runtime: Handle, config: &Config, checkers: CheckerRunner) -> Self {
        debug!(checkers = ?checkers.names(), "lint registry created");
        Self {
            engine: Arc::new(LintEngine {
                config: config.lint.clone(),
                checkers
            }),
            databases: Arc::new(RwLock::new(HashMap::new())),
            runtime
        }
    }

    /// Enable linting for `db_path`.
    ///
    /// Re-installing an installed database only replaces its callback. A
    /// database that is still tearing down gets fresh state.
    pub fn install(&self, db_path: &str, callback: PublishCallback) {
        let mut databases = self.databases.write();
        if let Some(existing) = databases.get(db_path)
            && existing.is_installed()
        {
            existing.state().callback = callback;
            debug!(db = db_path, "publish callback replaced");
            return;
        }
        let (tx, rx) = mpsc::unbounded_channel();
        let db = Arc::new(DatabaseLint::new(
            db_path,
            callback,
            self.engine.config.max_seen_statements,
            tx
        ));
        let worker = self.runtime.spawn(worker::run_worker(
            Arc::clone(&self.engine),
            Arc::clone(&db),
            rx
        ));
        db.set_worker(worker);
        databases.insert(db_path.into(), db);
        info!(db = db_path, "lint installed");
    }

    /// Disable linting for `db_path` without waiting for in-flight work.
    ///
    /// New notifications are ignored immediately. A background task waits
    /// for the worker to drain and then releases the state; its handle is
    /// returned for callers that want to wait, and may be dropped.
    pub fn uninstall(&self, db_path: &str) -> Option<JoinHandle<()>> {
        let db = self.databases.read().get(db_path).cloned()?;
        let worker = db.begin_uninstall()?;
        debug!(db = db_path, "lint uninstalling");
        let databases = Arc::clone(&self.databases);
        Some(self.runtime.spawn(async move {
            if let Some(worker) = worker
                && let Err(e) = worker.await
            {
                warn!(db = db.db_path(), error = %e, "lint worker failed");
            }
            db.finish_uninstall();
            let mut databases = databases.write();
            if databases
                .get(db.db_path())
                .is_some_and(|current| Arc::ptr_eq(current, &db))
            {
                databases.remove(db.db_path());
            }
            info!(db = db.db_path(), "lint uninstalled");
        }))
    }

    /// Queue an execution for background analysis.
    pub fn notify_execution(
        &self,
        db_path: &str,
        sql: impl Into<String>,
        elapsed_ms: u64,
        ext_info: impl Into<String>
    ) {
        let Some(db) = self.installed_database(db_path) else {
            return;
        };
        let event = TraceEvent {
            sql: sql.into(),
            elapsed_ms,
            ext_info: ext_info.into()
        };
        if !db.enqueue(WorkItem::Execution(event)) {
            debug!(db = db_path, "execution dropped, queue closed");
        }
    }

    /// Analyze an execution on the calling thread.
    ///
    /// Returns the ids of the issues published for it. Every failure yields
    /// an empty list.
    pub fn notify_execution_sync(
        &self,
        db_path: &str,
        sql: impl Into<String>,
        elapsed_ms: u64,
        ext_info: impl Into<String>
    ) -> Vec<String> {
        let Some(db) = self.installed_database(db_path) else {
            return vec![];
        };
        let event = TraceEvent {
            sql: sql.into(),
            elapsed_ms,
            ext_info: ext_info.into()
        };
        pipeline::run(&self.engine, &db, &event)
    }

    /// Replace the table whitelist of `db_path`.
    pub fn set_white_list(&self, db_path: &str, whitelist: WhiteList) {
        if let Some(db) = self.installed_database(db_path) {
            db.state().policy.set_whitelist(whitelist);
        }
    }

    /// Add `checker` to the enabled checkers of `db_path`.
    pub fn enable_checker(&self, db_path: &str, checker: &str) {
        let Some(db) = self.installed_database(db_path) else {
            return;
        };
        if !self.engine.checkers.contains(checker) {
            warn!(db = db_path, checker, "enabling unregistered checker");
        }
        db.state().policy.enable(checker);
    }

    /// Queue the one-time startup check for every installed database.
    pub fn init_check(&self) {
        for db in self.databases.read().values() {
            if db.is_installed() {
                db.enqueue(WorkItem::InitCheck);
            }
        }
    }

    /// Queue the one-time startup check for one database.
    pub fn init_check_db(&self, db_path: &str) {
        if let Some(db) = self.installed_database(db_path) {
            db.enqueue(WorkItem::InitCheck);
        }
    }

    pub fn is_installed(&self, db_path: &str) -> bool {
        self.installed_database(db_path).is_some()
    }

    /// Installed databases, sorted by path.
    pub fn installed(&self) -> Vec<String> {
        let mut paths: Vec<String> = self
            .databases
            .read()
            .values()
            .filter(|db| db.is_installed())
            .map(|db| db.db_path().to_string())
            .collect();
        paths.sort();
        paths
    }

    pub fn phase(&self, db_path: &str) -> Phase {
        self.databases
            .read()
            .get(db_path)
            .map_or(Phase::Uninstalled, |db| db.phase())
    }

    pub fn checker_names(&self) -> Vec<&'static str> {
        self.engine.checkers.names()
    }

    /// Uninstall every database and wait for all teardowns.
    pub async fn shutdown(&self) {
        let handles: Vec<_> = self
            .installed()
            .iter()
            .filter_map(|db_path| self.uninstall(db_path))
            .collect();
        for handle in handles {
            if let Err(e) = handle.await {
                warn!(error = %e, "lint teardown failed");
            }
        }
        info!("lint registry shut down");
    }

    fn installed_database(&self, db_path: &str) -> Option<Arc<DatabaseLint>> {
        self.databases
            .read()
            .get(db_path)
            .filter(|db| db.is_installed())
            .cloned()
    }
}
