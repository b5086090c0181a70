//! Checker policies that turn analyzer signals into findings.
//!
//! Each checker implements [`Checker`] and looks at the [`Signals`] of one
//! analyzed statement. The [`CheckerRunner`] evaluates the active checkers
//! in parallel using [`rayon`] and applies configured severity overrides.
//!
//! # Built-in Checkers
//!
//! | Name | Signal |
//! |------|--------|
//! | `composite_index` | columns filtered together by `AND` |
//! | `fuzzy_match` | `LIKE` family operator |
//! | `bit_operation` | bitwise operator in a condition |
//! | `or_condition` | `OR` in a condition |
//! | `in_condition` | `IN` membership test |
//! | `join_qualifier` | `JOIN ... USING` / `JOIN ... ON` |
//!
//! # Implementing Custom Checkers
//!
//! ```
//! use sqlite_lint::checker::{CheckContext, Checker, CheckerInfo, Finding, Severity};
//!
//! pub struct TooManyTables;
//!
//! impl Checker for TooManyTables {
//!     fn info(&self) -> CheckerInfo {
//!         CheckerInfo {
//!             name:     "too_many_tables",
//!             summary:  "More than four tables in one statement",
//!             severity: Severity::Info
//!         }
//!     }
//!
//!     fn check(&self, ctx: &CheckContext<'_>) -> Vec<Finding> {
//!         if ctx.signals.tables.len() > 4 {
//!             vec![ctx.statement_finding(&self.info(), "Many tables", "", "Split the query")]
//!         } else {
//!             vec![]
//!         }
//!     }
//! }
//! ```

mod condition;
mod index;
mod pattern;
mod types;

use std::collections::HashMap;

use rayon::prelude::*;
pub use types::{CheckerInfo, Finding, Severity};

use crate::{analyzer::Signals, config::CheckersConfig};

/// Trait for implementing checker policies.
///
/// Checkers are stateless and must be `Send + Sync` for parallel execution.
pub trait Checker: Send + Sync {
    /// Returns metadata about this checker.
    fn info(&self) -> CheckerInfo;

    /// Evaluates one statement's signals and returns any findings.
    fn check(&self, ctx: &CheckContext<'_>) -> Vec<Finding>;
}

/// What a checker sees of one analyzed statement.
pub struct CheckContext<'a> {
    pub sql:     &'a str,
    pub signals: &'a Signals
}

impl<'a> CheckContext<'a> {
    pub fn new(sql: &'a str, signals: &'a Signals) -> Self {
        Self {
            sql,
            signals
        }
    }

    /// Finding that concerns every table the statement touches.
    pub fn statement_finding(
        &self,
        info: &CheckerInfo,
        desc: impl Into<String>,
        detail: impl Into<String>,
        advice: impl Into<String>
    ) -> Finding {
        Finding {
            checker: info.name,
            tables:  self.signals.tables.iter().cloned().collect(),
            desc:    desc.into(),
            detail:  detail.into(),
            advice:  advice.into(),
            level:   info.severity
        }
    }
}

/// Parallel checker execution engine.
///
/// # Example
///
/// ```
/// use sqlite_lint::{
///     analyzer::SelectTreeAnalyzer,
///     checker::{CheckContext, CheckerRunner},
///     tree::{SqlDialect, parse_selects}
/// };
///
/// let sql = "SELECT * FROM users WHERE name LIKE '%bob%'";
/// let selects = parse_selects(sql, SqlDialect::SQLite, 64).unwrap();
/// let mut analyzer = SelectTreeAnalyzer::new(&selects[0]);
/// analyzer.process();
/// let signals = analyzer.signals();
///
/// let runner = CheckerRunner::new();
/// let findings = runner.run(&CheckContext::new(sql, &signals), |_| true);
///
/// assert!(findings.iter().any(|f| f.checker == "fuzzy_match"));
/// ```
pub struct CheckerRunner {
    checkers:       Vec<Box<dyn Checker>>,
    severity_cache: HashMap<&'static str, Severity>
}

impl Default for CheckerRunner {
    fn default() -> Self {
        Self::new()
    }
}

impl CheckerRunner {
    /// Create a runner with every built-in checker
    pub fn new() -> Self {
        Self::with_config(&CheckersConfig::default())
    }

    /// Create a runner honoring disabled checkers and severity overrides
    pub fn with_config(config: &CheckersConfig) -> Self {
        let all_checkers: Vec<Box<dyn Checker>> = vec![
            Box::new(index::CompositeIndex),
            Box::new(pattern::FuzzyMatch),
            Box::new(pattern::BitOperation),
            Box::new(condition::OrCondition),
            Box::new(condition::InCondition),
            Box::new(condition::JoinQualifier)
        ];
        let checkers: Vec<Box<dyn Checker>> = all_checkers
            .into_iter()
            .filter(|c| {
                !config
                    .disabled
                    .iter()
                    .any(|d| d.eq_ignore_ascii_case(c.info().name))
            })
            .collect();
        let mut severity_cache = HashMap::new();
        for checker in &checkers {
            let name = checker.info().name;
            if let Some(sev_str) = config.severity.get(name)
                && let Some(sev) = Severity::parse(sev_str)
            {
                severity_cache.insert(name, sev);
            }
        }
        Self {
            checkers,
            severity_cache
        }
    }

    /// Register an additional checker
    pub fn register(&mut self, checker: Box<dyn Checker>) {
        self.checkers.push(checker);
    }

    /// Names of the registered checkers, in evaluation order
    pub fn names(&self) -> Vec<&'static str> {
        self.checkers.iter().map(|c| c.info().name).collect()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.checkers
            .iter()
            .any(|c| c.info().name.eq_ignore_ascii_case(name))
    }

    /// Run every checker accepted by `is_active` (parallel execution).
    ///
    /// Findings keep checker registration order.
    pub fn run<F>(&self, ctx: &CheckContext<'_>, is_active: F) -> Vec<Finding>
    where
        F: Fn(&str) -> bool + Sync
    {
        let findings: Vec<Finding> = self
            .checkers
            .par_iter()
            .filter(|c| is_active(c.info().name))
            .flat_map_iter(|c| c.check(ctx))
            .collect();
        findings
            .into_iter()
            .map(|mut finding| {
                if let Some(&severity) = self.severity_cache.get(finding.checker) {
                    finding.level = severity;
                }
                finding
            })
            .collect()
    }
}
