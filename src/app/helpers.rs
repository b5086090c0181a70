//! Helper functions for CLI operations.

use std::{
    fs::read_to_string,
    io::{self, Read}
};

use super::convert::convert_format;
use crate::{
    checker::Severity,
    cli::Format,
    error::{AppResult, config_error, file_read_error},
    issue::Issue,
    output::OutputOptions
};

/// Calculates the process exit code based on issue severities.
///
/// - `0` - No issues or only informational ones
/// - `1` - At least one warning present
/// - `2` - At least one error present
///
/// # Example
///
/// ```
/// use sqlite_lint::app::calculate_exit_code;
///
/// assert_eq!(calculate_exit_code(&[]), 0);
/// ```
pub fn calculate_exit_code(issues: &[Issue]) -> i32 {
    match issues.iter().map(|issue| issue.level).max() {
        Some(Severity::Error) => 2,
        Some(Severity::Warning) => 1,
        _ => 0
    }
}

/// Reads SQL statements from a file or stdin when the path is "-".
///
/// # Errors
///
/// Returns an error if the file cannot be read or stdin fails.
pub fn read_queries_input(path: &str) -> AppResult<String> {
    if path == "-" {
        let mut buffer = String::new();
        io::stdin()
            .read_to_string(&mut buffer)
            .map_err(|e| file_read_error("stdin", e))?;
        Ok(buffer)
    } else {
        read_to_string(path).map_err(|e| file_read_error(path, e))
    }
}

/// Creates output options from CLI parameters.
pub fn create_output_options(format: Format, no_color: bool) -> OutputOptions {
    OutputOptions {
        format:  convert_format(format),
        colored: !no_color
    }
}

/// Rejects checker names the registry does not know.
///
/// # Errors
///
/// Returns a config error naming the first unknown checker.
pub fn validate_checker_names<'a>(
    names: impl IntoIterator<Item = &'a str>,
    known: &[&str]
) -> AppResult<()> {
    for name in names {
        if name != crate::lint::ALL_CHECKERS && !known.iter().any(|k| k.eq_ignore_ascii_case(name)) {
            return Err(config_error(format!(
                "Unknown checker '{}'. Available: {}",
                name,
                known.join(", ")
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn issue(level: Severity) -> Issue {
        Issue {
            id: String::new(),
            db_path: String::new(),
            table: String::new(),
            sql: String::new(),
            issue_type: String::new(),
            create_time: 0,
            desc: String::new(),
            detail: String::new(),
            advice: String::new(),
            level,
            ext_info: String::new()
        }
    }

    #[test]
    fn test_exit_code_by_max_severity() {
        assert_eq!(calculate_exit_code(&[issue(Severity::Info)]), 0);
        assert_eq!(
            calculate_exit_code(&[issue(Severity::Info), issue(Severity::Warning)]),
            1
        );
        assert_eq!(
            calculate_exit_code(&[issue(Severity::Error), issue(Severity::Warning)]),
            2
        );
    }

    #[test]
    fn test_validate_checker_names() {
        let known = ["fuzzy_match", "or_condition"];
        assert!(validate_checker_names(["FUZZY_MATCH", "*"], &known).is_ok());
        assert!(validate_checker_names(["nope"], &known).is_err());
    }

    #[test]
    fn test_read_missing_file() {
        assert!(read_queries_input("/nonexistent/queries.sql").is_err());
    }
}
