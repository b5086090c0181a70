use std::{
    collections::{HashMap, HashSet},
    sync::{
        Arc, Mutex,
        atomic::{AtomicUsize, Ordering},
        mpsc
    },
    time::Duration
};

use sqlite_lint::{
    config::Config,
    issue::Issue,
    lint::{LintRegistry, Phase, PublishCallback},
    sink::IssueLog
};

const TIMEOUT: Duration = Duration::from_secs(10);

/// Callback forwarding every batch to a channel.
fn channel_callback() -> (PublishCallback, mpsc::Receiver<(String, Vec<Issue>)>) {
    let (tx, rx) = mpsc::channel();
    let callback: PublishCallback = Arc::new(move |db: &str, issues: &[Issue]| {
        let _ = tx.send((db.to_string(), issues.to_vec()));
    });
    (callback, rx)
}

fn registry() -> LintRegistry {
    LintRegistry::init(&Config::default()).unwrap()
}

fn issue_types(batch: &[Issue]) -> Vec<&str> {
    batch.iter().map(|i| i.issue_type.as_str()).collect()
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_sync_notify_deduplicates() {
    let registry = registry();
    let (callback, rx) = channel_callback();
    registry.install("app.db", callback);

    let first = registry.notify_execution_sync(
        "app.db",
        "SELECT * FROM users WHERE name LIKE '%bob%'",
        3,
        ""
    );
    assert!(!first.is_empty());
    let (db, batch) = rx.try_recv().unwrap();
    assert_eq!(db, "app.db");
    let delivered: Vec<String> = batch.iter().map(|i| i.id.clone()).collect();
    assert_eq!(first, delivered);

    let second = registry.notify_execution_sync(
        "app.db",
        "SELECT * FROM users WHERE name LIKE '%bob%'",
        3,
        ""
    );
    assert!(second.is_empty());
    let third = registry.notify_execution_sync(
        "app.db",
        "select *   from users where name like '%alice%'",
        9,
        ""
    );
    assert!(third.is_empty());
    assert!(rx.try_recv().is_err());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_issue_fields() {
    let registry = registry();
    let (callback, rx) = channel_callback();
    registry.install("app.db", callback);
    let sql = "SELECT * FROM orders o WHERE o.user_id = 1 AND o.status = 2";
    registry.notify_execution_sync("app.db", sql, 1, "thread=main");

    let (_, batch) = rx.try_recv().unwrap();
    assert_eq!(issue_types(&batch), ["composite_index"]);
    let issue = &batch[0];
    assert_eq!(issue.db_path, "app.db");
    assert_eq!(issue.table, "orders");
    assert_eq!(issue.sql, sql);
    assert_eq!(issue.ext_info, "thread=main");
    assert!(issue.advice.contains("orders(user_id, status)"));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_ids_unique_within_batch() {
    let registry = registry();
    let (callback, rx) = channel_callback();
    registry.install("app.db", callback);
    let ids = registry.notify_execution_sync(
        "app.db",
        "SELECT * FROM t WHERE (a = 1 AND b = 2) OR (c = 3 AND d = 4)",
        1,
        ""
    );
    assert_eq!(ids.len(), 3);
    let unique: HashSet<&String> = ids.iter().collect();
    assert_eq!(unique.len(), ids.len());

    let (_, batch) = rx.try_recv().unwrap();
    assert_eq!(
        issue_types(&batch),
        ["composite_index", "composite_index", "or_condition"]
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_shift_operators_reported() {
    let registry = registry();
    let (callback, rx) = channel_callback();
    registry.install("app.db", callback);

    for sql in [
        "SELECT * FROM t WHERE (flags << 2) = 4",
        "SELECT * FROM u WHERE (flags >> 1) = 2"
    ] {
        let ids = registry.notify_execution_sync("app.db", sql, 1, "");
        assert_eq!(ids.len(), 1, "{}", sql);
        let (_, batch) = rx.try_recv().unwrap();
        assert_eq!(issue_types(&batch), ["bit_operation"]);
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_whitelist_suppresses() {
    let registry = registry();
    let (callback, rx) = channel_callback();
    registry.install("app.db", callback);

    let mut whitelist = HashMap::new();
    whitelist.insert(
        "users".to_string(),
        HashSet::from(["fuzzy_match".to_string()])
    );
    registry.set_white_list("app.db", whitelist);

    let ids = registry.notify_execution_sync("app.db", "SELECT * FROM users WHERE name LIKE 'a%'", 1, "");
    assert!(ids.is_empty());
    assert!(rx.try_recv().is_err());

    let ids = registry.notify_execution_sync(
        "app.db",
        "SELECT * FROM users WHERE name LIKE 'a%' OR id = 1",
        1,
        ""
    );
    assert_eq!(ids.len(), 1);
    let (_, batch) = rx.try_recv().unwrap();
    assert_eq!(issue_types(&batch), ["or_condition"]);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_whitelist_all_checkers() {
    let registry = registry();
    let (callback, rx) = channel_callback();
    registry.install("app.db", callback);

    let mut whitelist = HashMap::new();
    whitelist.insert("logs".to_string(), HashSet::from(["*".to_string()]));
    registry.set_white_list("app.db", whitelist);

    let ids = registry.notify_execution_sync(
        "app.db",
        "SELECT * FROM logs WHERE a = 1 AND b = 2 AND msg LIKE '%x' AND flags & 1",
        1,
        ""
    );
    assert!(ids.is_empty());
    assert!(rx.try_recv().is_err());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_enable_checker_is_additive() {
    let registry = registry();
    let (callback, rx) = channel_callback();
    registry.install("app.db", callback);
    registry.enable_checker("app.db", "or_condition");

    registry.notify_execution_sync(
        "app.db",
        "SELECT * FROM t WHERE a LIKE 'x%' OR b IN (1, 2)",
        1,
        ""
    );
    let (_, batch) = rx.try_recv().unwrap();
    assert_eq!(issue_types(&batch), ["or_condition"]);

    registry.enable_checker("app.db", "in_condition");
    registry.notify_execution_sync(
        "app.db",
        "SELECT * FROM t2 WHERE a LIKE 'x%' OR b IN (1, 2)",
        1,
        ""
    );
    let (_, batch) = rx.try_recv().unwrap();
    assert_eq!(issue_types(&batch), ["or_condition", "in_condition"]);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_not_installed_is_ignored() {
    let registry = registry();
    let ids = registry.notify_execution_sync("ghost.db", "SELECT * FROM t WHERE a LIKE 'x'", 1, "");
    assert!(ids.is_empty());
    registry.notify_execution("ghost.db", "SELECT 1", 1, "");
    registry.set_white_list("ghost.db", HashMap::new());
    registry.enable_checker("ghost.db", "fuzzy_match");
    registry.init_check_db("ghost.db");
    assert!(registry.uninstall("ghost.db").is_none());
    assert_eq!(registry.phase("ghost.db"), Phase::Uninstalled);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_parse_failure_dropped() {
    let registry = registry();
    let (callback, rx) = channel_callback();
    registry.install("app.db", callback);
    let ids = registry.notify_execution_sync("app.db", "SELEC * FORM t", 1, "");
    assert!(ids.is_empty());
    let ids = registry.notify_execution_sync("app.db", "DELETE FROM t WHERE a LIKE 'x'", 1, "");
    assert!(ids.is_empty());
    assert!(rx.try_recv().is_err());
    assert!(registry.is_installed("app.db"));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_min_elapsed_threshold() {
    let mut config = Config::default();
    config.lint.min_elapsed_ms = 10;
    let registry = LintRegistry::init(&config).unwrap();
    let (callback, _rx) = channel_callback();
    registry.install("app.db", callback);

    let sql = "SELECT * FROM t WHERE a LIKE '%x'";
    assert!(registry.notify_execution_sync("app.db", sql, 9, "").is_empty());
    assert!(!registry.notify_execution_sync("app.db", sql, 10, "").is_empty());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_databases_are_isolated() {
    let registry = registry();
    let (callback, rx) = channel_callback();
    registry.install("a.db", Arc::clone(&callback));
    registry.install("b.db", callback);
    let sql = "SELECT * FROM t WHERE x IN (1, 2)";
    let a = registry.notify_execution_sync("a.db", sql, 1, "");
    let b = registry.notify_execution_sync("b.db", sql, 1, "");
    assert_eq!(a.len(), 1);
    assert_eq!(b.len(), 1);
    assert_ne!(a, b);
    assert_eq!(rx.try_iter().count(), 2);
    assert_eq!(registry.installed(), ["a.db", "b.db"]);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_async_notify_preserves_order() {
    let registry = registry();
    let (callback, rx) = channel_callback();
    registry.install("app.db", callback);

    for i in 0..8 {
        registry.notify_execution("app.db", format!("SELECT * FROM t{} WHERE a LIKE 'x%'", i), 1, "");
    }
    let mut tables = Vec::new();
    for _ in 0..8 {
        let (_, batch) = rx.recv_timeout(TIMEOUT).unwrap();
        tables.push(batch[0].table.clone());
    }
    let expected: Vec<String> = (0..8).map(|i| format!("t{}", i)).collect();
    assert_eq!(tables, expected);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_no_publish_after_uninstall() {
    let registry = registry();
    let deliveries = Arc::new(AtomicUsize::new(0));
    let (entered_tx, entered_rx) = mpsc::channel::<()>();
    let (release_tx, release_rx) = mpsc::channel::<()>();
    let release_rx = Mutex::new(release_rx);

    let counter = Arc::clone(&deliveries);
    let callback: PublishCallback = Arc::new(move |_: &str, _: &[Issue]| {
        counter.fetch_add(1, Ordering::SeqCst);
        let _ = entered_tx.send(());
        // Hold the first delivery until the test has uninstalled
        let _ = release_rx.lock().unwrap().recv();
    });
    registry.install("app.db", callback);

    for i in 0..5 {
        registry.notify_execution("app.db", format!("SELECT * FROM t{} WHERE a LIKE 'x%'", i), 1, "");
    }
    entered_rx.recv_timeout(TIMEOUT).unwrap();

    let teardown = registry.uninstall("app.db").unwrap();
    assert!(!registry.is_installed("app.db"));
    assert_eq!(registry.phase("app.db"), Phase::Uninstalling);
    registry.notify_execution("app.db", "SELECT * FROM late WHERE a LIKE 'x%'", 1, "");
    release_tx.send(()).unwrap();
    drop(release_tx);

    tokio::time::timeout(TIMEOUT, teardown).await.unwrap().unwrap();
    assert_eq!(deliveries.load(Ordering::SeqCst), 1);
    assert_eq!(registry.phase("app.db"), Phase::Uninstalled);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_init_check_keeps_worker_running() {
    let registry = registry();
    let (callback, rx) = channel_callback();
    registry.install("app.db", callback);
    registry.enable_checker("app.db", "no_such_checker");
    registry.enable_checker("app.db", "fuzzy_match");
    registry.init_check();
    registry.init_check_db("app.db");
    registry.notify_execution("app.db", "SELECT * FROM t WHERE a LIKE 'x%'", 1, "");
    let (_, batch) = rx.recv_timeout(TIMEOUT).unwrap();
    assert_eq!(issue_types(&batch), ["fuzzy_match"]);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_shutdown_uninstalls_everything() {
    let registry = registry();
    let (callback, _rx) = channel_callback();
    registry.install("a.db", Arc::clone(&callback));
    registry.install("b.db", callback);
    registry.shutdown().await;
    assert!(registry.installed().is_empty());
    assert_eq!(registry.phase("a.db"), Phase::Uninstalled);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_issue_log_callback() {
    let dir = tempfile::tempdir().unwrap();
    let log = Arc::new(IssueLog::new(dir.path().join("issues.log")));
    let registry = registry();
    registry.install("app.db", Arc::clone(&log).callback());
    let ids = registry.notify_execution_sync("app.db", "SELECT * FROM t WHERE a & 2", 1, "");
    assert_eq!(ids.len(), 1);

    let text = std::fs::read_to_string(log.path()).unwrap();
    assert!(text.contains(&format!("issue_id : {}", ids[0])));
    assert!(text.contains("issue_type : bit_operation"));
}
