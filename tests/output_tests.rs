// SPDX-FileCopyrightText: 2025 RAprogramm
// SPDX-License-Identifier: MIT

use sqlite_lint::{
    analyzer::SelectTreeAnalyzer,
    checker::Severity,
    issue::Issue,
    output::{
        IssueReport, OutputFormat, OutputOptions, StatementSignals, format_issues, format_signals
    },
    tree::{SqlDialect, parse_selects}
};

fn make_issue(issue_type: &str, level: Severity) -> Issue {
    Issue {
        id: "00000000000000ff".to_string(),
        db_path: "app.db".to_string(),
        table: "users".to_string(),
        sql: "SELECT * FROM users".to_string(),
        issue_type: issue_type.to_string(),
        create_time: 1_700_000_000_000,
        desc: "Something to look at".to_string(),
        detail: "Why it matters".to_string(),
        advice: "What to do".to_string(),
        level,
        ext_info: String::new()
    }
}

fn options(format: OutputFormat) -> OutputOptions {
    OutputOptions {
        format,
        colored: false
    }
}

fn sample_signals() -> Vec<StatementSignals> {
    let sql = "SELECT * FROM a JOIN b ON a.id = b.id WHERE a.x = 1 AND a.y = 2";
    parse_selects(sql, SqlDialect::SQLite, 64)
        .unwrap()
        .iter()
        .map(|select| {
            let mut analyzer = SelectTreeAnalyzer::new(select);
            analyzer.process();
            StatementSignals {
                sql:     sql.to_string(),
                signals: analyzer.signals()
            }
        })
        .collect()
}

#[test]
fn test_output_options_default() {
    let opts = OutputOptions::default();
    assert!(matches!(opts.format, OutputFormat::Text));
    assert!(opts.colored);
}

#[test]
fn test_text_issues_summary() {
    let issues = vec![
        make_issue("fuzzy_match", Severity::Warning),
        make_issue("composite_index", Severity::Error),
        make_issue("in_condition", Severity::Info)
    ];
    let report = IssueReport {
        db_path:    "app.db",
        statements: 3,
        issues:     &issues
    };
    let text = format_issues(&report, &options(OutputFormat::Text));
    assert!(text.contains("=== Lint: app.db (3 statements) ==="));
    assert!(text.contains("[ERROR] composite_index on users"));
    assert!(text.contains("  detail: Why it matters"));
    assert!(text.contains("Summary: 1 errors, 1 warnings, 1 info"));
}

#[test]
fn test_colored_text_issues() {
    let issues = vec![make_issue("fuzzy_match", Severity::Warning)];
    let report = IssueReport {
        db_path:    "app.db",
        statements: 1,
        issues:     &issues
    };
    let opts = OutputOptions {
        format:  OutputFormat::Text,
        colored: true
    };
    let text = format_issues(&report, &opts);
    assert!(text.contains("fuzzy_match"));
}

#[test]
fn test_yaml_issues() {
    let issues = vec![make_issue("or_condition", Severity::Info)];
    let report = IssueReport {
        db_path:    "app.db",
        statements: 1,
        issues:     &issues
    };
    let yaml = format_issues(&report, &options(OutputFormat::Yaml));
    assert!(yaml.contains("type: or_condition"));
    assert!(yaml.contains("createTime: 1700000000000"));
}

#[test]
fn test_signals_text() {
    let text = format_signals(&sample_signals(), &options(OutputFormat::Text));
    assert!(text.contains("Tables: a, b"));
    assert!(text.contains("Signals: using/on, and"));
    assert!(text.contains("AND columns: a.x, a.y"));
}

#[test]
fn test_signals_json() {
    let json = format_signals(&sample_signals(), &options(OutputFormat::Json));
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value[0]["signals"]["has_using_or_on"], true);
    assert_eq!(value[0]["signals"]["and_column_groups"][0][1], "a.y");
    assert_eq!(value[0]["signals"]["aliases"], serde_json::json!({}));
}
