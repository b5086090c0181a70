//! Application types for CLI commands.

use std::path::PathBuf;

use crate::cli::{Dialect, Format};

/// Parameters for the check command.
///
/// # Example
///
/// ```
/// use sqlite_lint::{
///     app::CheckParams,
///     cli::Format
/// };
///
/// let params = CheckParams {
///     queries_path: "queries.sql".to_string(),
///     db_path:      "main.db".to_string(),
///     dialect:      None,
///     format:       Format::Text,
///     enable:       vec![],
///     whitelist:    vec!["users=fuzzy_match".to_string()],
///     log:          None,
///     no_color:     true
/// };
/// ```
#[derive(Debug, Clone)]
pub struct CheckParams {
    /// Path to statements file or "-" for stdin input.
    pub queries_path: String,
    /// Database the statements are attributed to.
    pub db_path:      String,
    /// Dialect override; the configured dialect is used when absent.
    pub dialect:      Option<Dialect>,
    pub format:       Format,
    /// Checkers to enable; all run when empty.
    pub enable:       Vec<String>,
    /// `table=checker[,checker]` suppression entries.
    pub whitelist:    Vec<String>,
    /// Issue log file, overriding the configured one.
    pub log:          Option<PathBuf>,
    pub no_color:     bool
}

/// Parameters for the signals command.
#[derive(Debug, Clone)]
pub struct SignalsParams {
    pub queries_path: String,
    pub dialect:      Option<Dialect>,
    pub format:       Format,
    pub no_color:     bool
}

/// Result of a command: what to print and how to exit.
#[derive(Debug, Clone)]
pub struct CommandResult {
    pub exit_code: i32,
    pub output:    String
}
