use colored::Colorize;
use serde::Serialize;

use crate::{analyzer::Signals, checker::Severity, issue::Issue};

/// Output format for results
#[derive(Debug, Clone, Copy, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
    Yaml
}

/// Output options
#[derive(Debug, Clone)]
pub struct OutputOptions {
    pub format:  OutputFormat,
    pub colored: bool
}

impl Default for OutputOptions {
    fn default() -> Self {
        Self {
            format:  OutputFormat::Text,
            colored: true
        }
    }
}

/// Issues published for one database, for serialization
#[derive(Debug, Serialize)]
pub struct IssueReport<'a> {
    pub db_path:    &'a str,
    pub statements: usize,
    pub issues:     &'a [Issue]
}

/// Signal vector of one `SELECT`, for serialization
#[derive(Debug, Serialize)]
pub struct StatementSignals {
    pub sql:     String,
    pub signals: Signals
}

/// Format published issues based on output options
pub fn format_issues(report: &IssueReport<'_>, opts: &OutputOptions) -> String {
    match opts.format {
        OutputFormat::Json => serde_json::to_string_pretty(report).unwrap_or_default(),
        OutputFormat::Yaml => serde_yaml::to_string(report).unwrap_or_default(),
        OutputFormat::Text => format_text_issues(report, opts)
    }
}

/// Format per-statement signal vectors based on output options
pub fn format_signals(statements: &[StatementSignals], opts: &OutputOptions) -> String {
    match opts.format {
        OutputFormat::Json => serde_json::to_string_pretty(statements).unwrap_or_default(),
        OutputFormat::Yaml => serde_yaml::to_string(statements).unwrap_or_default(),
        OutputFormat::Text => format_text_signals(statements, opts)
    }
}

fn format_text_issues(report: &IssueReport<'_>, opts: &OutputOptions) -> String {
    let mut output = String::new();
    let header = format!(
        "=== Lint: {} ({} statements) ===",
        report.db_path, report.statements
    );
    if opts.colored {
        output.push_str(&header.bold().to_string());
    } else {
        output.push_str(&header);
    }
    output.push_str("\n\n");

    if report.issues.is_empty() {
        output.push_str("No issues found.\n");
        return output;
    }

    for issue in report.issues {
        let level = if opts.colored {
            colorize_level(issue.level)
        } else {
            issue.level.to_string()
        };
        output.push_str(&format!(
            "[{}] {} on {}: {}\n",
            level, issue.issue_type, issue.table, issue.desc
        ));
        output.push_str(&format!("  sql: {}\n", issue.sql));
        if !issue.detail.is_empty() {
            output.push_str(&format!("  detail: {}\n", issue.detail));
        }
        output.push_str(&format!("  advice: {}\n\n", issue.advice));
    }

    let count = |level: Severity| report.issues.iter().filter(|i| i.level == level).count();
    output.push_str(&format!(
        "Summary: {} errors, {} warnings, {} info\n",
        count(Severity::Error),
        count(Severity::Warning),
        count(Severity::Info)
    ));
    output
}

fn colorize_level(level: Severity) -> String {
    match level {
        Severity::Error => level.to_string().red().bold().to_string(),
        Severity::Warning => level.to_string().yellow().bold().to_string(),
        Severity::Info => level.to_string().blue().to_string()
    }
}

fn format_text_signals(statements: &[StatementSignals], opts: &OutputOptions) -> String {
    let mut output = String::from("Select trees:\n\n");

    for (i, statement) in statements.iter().enumerate() {
        let header = format!("Statement #{}:", i + 1);
        if opts.colored {
            output.push_str(&header.cyan().bold().to_string());
        } else {
            output.push_str(&header);
        }
        output.push('\n');
        output.push_str(&format!("{}\n", statement.sql));

        let signals = &statement.signals;
        let tables: Vec<&str> = signals.tables.iter().map(|t| t.as_str()).collect();
        output.push_str(&format!("Tables: {}\n", tables.join(", ")));

        let flags: Vec<&str> = [
            (signals.has_using_or_on, "using/on"),
            (signals.has_bit_operation, "bit operation"),
            (signals.has_fuzzy_matching, "fuzzy matching"),
            (signals.has_and, "and"),
            (signals.has_or, "or"),
            (signals.has_in, "in")
        ]
        .into_iter()
        .filter_map(|(set, name)| set.then_some(name))
        .collect();
        if !flags.is_empty() {
            output.push_str(&format!("Signals: {}\n", flags.join(", ")));
        }

        for group in &signals.and_column_groups {
            let cols: Vec<&str> = group.iter().map(|c| c.as_str()).collect();
            output.push_str(&format!("AND columns: {}\n", cols.join(", ")));
        }
        if signals.truncated {
            output.push_str("Truncated: nesting too deep\n");
        }
        output.push('\n');
    }
    output
}

#[cfg(test)]
mod tests {
    use super::*;

    fn issue(level: Severity) -> Issue {
        Issue {
            id: "0000000000000001".to_string(),
            db_path: "app.db".to_string(),
            table: "users".to_string(),
            sql: "SELECT * FROM users WHERE name LIKE '%a'".to_string(),
            issue_type: "fuzzy_match".to_string(),
            create_time: 1,
            desc: "Statement uses a LIKE pattern match".to_string(),
            detail: String::new(),
            advice: "Anchor the pattern".to_string(),
            level,
            ext_info: String::new()
        }
    }

    fn plain(format: OutputFormat) -> OutputOptions {
        OutputOptions {
            format,
            colored: false
        }
    }

    #[test]
    fn test_text_issues() {
        let issues = [issue(Severity::Warning)];
        let report = IssueReport {
            db_path:    "app.db",
            statements: 1,
            issues:     &issues
        };
        let text = format_issues(&report, &plain(OutputFormat::Text));
        assert!(text.contains("[WARN] fuzzy_match on users"));
        assert!(text.contains("Summary: 0 errors, 1 warnings, 0 info"));
        assert!(!text.contains("detail:"));
    }

    #[test]
    fn test_text_no_issues() {
        let report = IssueReport {
            db_path:    "app.db",
            statements: 3,
            issues:     &[]
        };
        let text = format_issues(&report, &plain(OutputFormat::Text));
        assert!(text.contains("No issues found."));
    }

    #[test]
    fn test_json_issues() {
        let issues = [issue(Severity::Error)];
        let report = IssueReport {
            db_path:    "app.db",
            statements: 1,
            issues:     &issues
        };
        let json = format_issues(&report, &plain(OutputFormat::Json));
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["issues"][0]["type"], "fuzzy_match");
        assert_eq!(value["issues"][0]["level"], "error");
    }

    #[test]
    fn test_text_signals() {
        let statements = [StatementSignals {
            sql:     "SELECT * FROM t WHERE a = 1 AND b = 2".to_string(),
            signals: Signals {
                has_and: true,
                and_column_groups: vec![["a", "b"].into_iter().map(Into::into).collect()],
                tables: vec!["t".into()],
                ..Signals::default()
            }
        }];
        let text = format_signals(&statements, &plain(OutputFormat::Text));
        assert!(text.contains("Tables: t"));
        assert!(text.contains("Signals: and"));
        assert!(text.contains("AND columns: a, b"));
    }
}
