//! Execution of the `check` and `signals` commands.

use std::sync::Arc;

use parking_lot::Mutex;

use super::{
    convert::{convert_dialect, parse_whitelist},
    helpers::{
        calculate_exit_code, create_output_options, read_queries_input, validate_checker_names
    },
    types::{CheckParams, CommandResult, SignalsParams}
};
use crate::{
    analyzer::SelectTreeAnalyzer,
    config::Config,
    error::AppResult,
    issue::Issue,
    lint::{LintRegistry, PublishCallback},
    output::{IssueReport, StatementSignals, format_issues, format_signals},
    sink::IssueLog,
    tree::{parse_selects, split_statements}
};

/// Replays every statement through the synchronous lint path.
///
/// Statements are attributed to one database, so repeated statement shapes
/// are reported once. Issues are collected from the publish callback and,
/// when a log path is configured, appended to the issue log as well.
///
/// # Errors
///
/// Returns an error if the input cannot be read or parsed, a checker name is
/// unknown, or a whitelist entry is malformed.
///
/// # Example
///
/// ```no_run
/// use sqlite_lint::{
///     app::{CheckParams, run_check},
///     cli::Format,
///     config::Config
/// };
///
/// # async fn example() -> sqlite_lint::AppResult<()> {
/// let params = CheckParams {
///     queries_path: "queries.sql".to_string(),
///     db_path:      "main.db".to_string(),
///     dialect:      None,
///     format:       Format::Json,
///     enable:       vec![],
///     whitelist:    vec![],
///     log:          None,
///     no_color:     true
/// };
/// let result = run_check(params, Config::default()).await?;
/// println!("{}", result.output);
/// # Ok(())
/// # }
/// ```
pub async fn run_check(params: CheckParams, mut config: Config) -> AppResult<CommandResult> {
    if let Some(dialect) = params.dialect {
        config.lint.dialect = convert_dialect(dialect);
    }
    let sql = read_queries_input(&params.queries_path)?;
    let statements = split_statements(&sql, config.lint.dialect)?;
    let whitelist = parse_whitelist(&params.whitelist)?;

    let registry = LintRegistry::init(&config)?;
    let known = registry.checker_names();
    validate_checker_names(params.enable.iter().map(String::as_str), &known)?;
    validate_checker_names(
        whitelist.values().flatten().map(String::as_str),
        &known
    )?;

    let collected: Arc<Mutex<Vec<Issue>>> = Arc::new(Mutex::new(Vec::new()));
    let log = params
        .log
        .or(config.log.path.clone())
        .map(|path| Arc::new(IssueLog::new(path)).callback());
    let sink = Arc::clone(&collected);
    let callback: PublishCallback = Arc::new(move |db_path: &str, issues: &[Issue]| {
        sink.lock().extend_from_slice(issues);
        if let Some(log) = &log {
            log(db_path, issues);
        }
    });

    registry.install(&params.db_path, callback);
    for checker in &params.enable {
        registry.enable_checker(&params.db_path, checker);
    }
    registry.set_white_list(&params.db_path, whitelist);
    for statement in &statements {
        registry.notify_execution_sync(
            &params.db_path,
            statement.as_str(),
            config.lint.min_elapsed_ms,
            ""
        );
    }
    registry.shutdown().await;

    let issues = std::mem::take(&mut *collected.lock());
    let report = IssueReport {
        db_path:    &params.db_path,
        statements: statements.len(),
        issues:     &issues
    };
    let output_opts = create_output_options(params.format, params.no_color);
    Ok(CommandResult {
        exit_code: calculate_exit_code(&issues),
        output:    format_issues(&report, &output_opts)
    })
}

/// Prints the signals extracted from each `SELECT` without running checkers.
///
/// # Errors
///
/// Returns an error if the input cannot be read or parsed.
pub fn run_signals(params: SignalsParams, config: &Config) -> AppResult<CommandResult> {
    let dialect = params
        .dialect
        .map_or(config.lint.dialect, convert_dialect);
    let sql = read_queries_input(&params.queries_path)?;
    let mut statements = Vec::new();
    for statement in split_statements(&sql, dialect)? {
        for select in parse_selects(&statement, dialect, config.lint.max_depth)? {
            let mut analyzer = SelectTreeAnalyzer::with_max_depth(&select, config.lint.max_depth);
            analyzer.process();
            statements.push(StatementSignals {
                sql:     statement.clone(),
                signals: analyzer.signals()
            });
        }
    }
    let output_opts = create_output_options(params.format, params.no_color);
    Ok(CommandResult {
        exit_code: 0,
        output:    format_signals(&statements, &output_opts)
    })
}
