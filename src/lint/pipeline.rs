//! Per-event analysis shared by the queued and the synchronous paths.

use tracing::{debug, info, trace, warn};

use super::{
    LintEngine,
    database::{DatabaseLint, TraceEvent},
    policy::ALL_CHECKERS
};
use crate::{
    analyzer::SelectTreeAnalyzer,
    checker::CheckContext,
    fingerprint::fingerprint,
    issue::Issue,
    tree::parse_selects
};

/// Analyze one execution and publish its issues.
///
/// Returns the ids of the published issues; empty when the event was
/// skipped, produced nothing, or could not be delivered.
pub(super) fn run(engine: &LintEngine, db: &DatabaseLint, event: &TraceEvent) -> Vec<String> {
    if !db.is_installed() {
        return vec![];
    }
    if event.elapsed_ms < engine.config.min_elapsed_ms {
        trace!(db = db.db_path(), elapsed_ms = event.elapsed_ms, "execution below cost threshold");
        return vec![];
    }

    let fingerprint = fingerprint(&event.sql);
    let policy = {
        let mut state = db.state();
        if !state.seen.insert(fingerprint) {
            trace!(db = db.db_path(), fingerprint, "statement already analyzed");
            return vec![];
        }
        state.policy.clone()
    };

    let selects = match parse_selects(&event.sql, engine.config.dialect, engine.config.max_depth) {
        Ok(selects) => selects,
        Err(e) => {
            debug!(db = db.db_path(), sql = %event.sql, error = %e, "statement not analyzed");
            return vec![];
        }
    };

    let mut issues = Vec::new();
    for select in &selects {
        let mut analyzer = SelectTreeAnalyzer::with_max_depth(select, engine.config.max_depth);
        analyzer.process();
        if analyzer.is_truncated() {
            warn!(
                db = db.db_path(),
                max_depth = engine.config.max_depth,
                "statement nesting too deep, analysis abandoned"
            );
            continue;
        }
        let signals = analyzer.signals();
        let ctx = CheckContext::new(&event.sql, &signals);
        for finding in engine.checkers.run(&ctx, |name| policy.is_enabled(name)) {
            if policy.suppresses(&finding) {
                trace!(db = db.db_path(), checker = finding.checker, "finding whitelisted");
                continue;
            }
            let ordinal = issues.len();
            issues.push(Issue::from_finding(
                db.db_path(),
                &event.sql,
                fingerprint,
                ordinal,
                &event.ext_info,
                finding
            ));
        }
    }
    if issues.is_empty() {
        return vec![];
    }

    let ids: Vec<String> = issues.iter().map(|issue| issue.id.clone()).collect();
    if db.publish(&issues) {
        debug!(db = db.db_path(), count = ids.len(), "issues published");
        ids
    } else {
        vec![]
    }
}

/// One-time startup sweep: check configured names against the registered
/// checkers.
pub(super) fn init_check(engine: &LintEngine, db: &DatabaseLint) {
    if !db.is_installed() {
        return;
    }
    let mut state = db.state();
    if state.init_checked {
        return;
    }
    state.init_checked = true;

    let mut unknown = 0usize;
    for name in state.policy.enabled() {
        if !engine.checkers.contains(name) {
            warn!(db = db.db_path(), checker = name, "enabled checker is not registered");
            unknown += 1;
        }
    }
    for (table, checkers) in state.policy.whitelist() {
        for name in checkers {
            if name != ALL_CHECKERS && !engine.checkers.contains(name) {
                warn!(
                    db = db.db_path(),
                    table = table.as_str(),
                    checker = name.as_str(),
                    "whitelisted checker is not registered"
                );
                unknown += 1;
            }
        }
    }
    info!(
        db = db.db_path(),
        checkers = engine.checkers.names().len(),
        unknown,
        "initial check complete"
    );
}
