//! Type conversion functions for CLI to internal types.

use std::collections::HashSet;

use crate::{
    cli::{Dialect, Format},
    error::{AppResult, config_error},
    lint::{ALL_CHECKERS, WhiteList},
    output::OutputFormat,
    tree::SqlDialect
};

/// Converts a CLI dialect enum to the internal SQL dialect type.
///
/// # Example
///
/// ```
/// use sqlite_lint::{app::convert_dialect, cli::Dialect, tree::SqlDialect};
///
/// let dialect = convert_dialect(Dialect::Mysql);
/// assert!(matches!(dialect, SqlDialect::MySQL));
/// ```
pub fn convert_dialect(dialect: Dialect) -> SqlDialect {
    match dialect {
        Dialect::Generic => SqlDialect::Generic,
        Dialect::Mysql => SqlDialect::MySQL,
        Dialect::Postgresql => SqlDialect::PostgreSQL,
        Dialect::Sqlite => SqlDialect::SQLite
    }
}

/// Converts a CLI format enum to the internal output format type.
pub fn convert_format(format: Format) -> OutputFormat {
    match format {
        Format::Text => OutputFormat::Text,
        Format::Json => OutputFormat::Json,
        Format::Yaml => OutputFormat::Yaml
    }
}

/// Parses `table=checker[,checker]` entries into a whitelist.
///
/// Repeated tables accumulate. `table=*` or `table=` suppresses every
/// checker for the table.
///
/// # Errors
///
/// Returns an error for an entry without `=` or with an empty table name.
///
/// # Example
///
/// ```
/// use sqlite_lint::app::parse_whitelist;
///
/// let whitelist = parse_whitelist(&["users=fuzzy_match,or_condition".to_string()]).unwrap();
/// assert_eq!(whitelist["users"].len(), 2);
/// ```
pub fn parse_whitelist(entries: &[String]) -> AppResult<WhiteList> {
    let mut whitelist = WhiteList::new();
    for entry in entries {
        let (table, checkers) = entry.split_once('=').ok_or_else(|| {
            config_error(format!(
                "Invalid whitelist entry '{}': expected table=checker[,checker]",
                entry
            ))
        })?;
        let table = table.trim();
        if table.is_empty() {
            return Err(config_error(format!(
                "Invalid whitelist entry '{}': missing table name",
                entry
            )));
        }
        let names = whitelist
            .entry(table.to_string())
            .or_insert_with(HashSet::new);
        for name in checkers.split(',').map(str::trim) {
            if name.is_empty() {
                continue;
            }
            names.insert(if name == ALL_CHECKERS {
                ALL_CHECKERS.to_string()
            } else {
                name.to_ascii_lowercase()
            });
        }
    }
    Ok(whitelist)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_convert_dialect() {
        assert!(matches!(
            convert_dialect(Dialect::Sqlite),
            SqlDialect::SQLite
        ));
        assert!(matches!(
            convert_dialect(Dialect::Postgresql),
            SqlDialect::PostgreSQL
        ));
    }

    #[test]
    fn test_convert_format() {
        assert!(matches!(convert_format(Format::Yaml), OutputFormat::Yaml));
    }

    #[test]
    fn test_parse_whitelist_accumulates() {
        let whitelist = parse_whitelist(&[
            "users=fuzzy_match".to_string(),
            "users=IN_CONDITION".to_string(),
            "orders=*".to_string(),
            "logs=".to_string()
        ])
        .unwrap();
        assert!(whitelist["users"].contains("in_condition"));
        assert_eq!(whitelist["users"].len(), 2);
        assert!(whitelist["orders"].contains("*"));
        assert!(whitelist["logs"].is_empty());
    }

    #[test]
    fn test_parse_whitelist_rejects_malformed() {
        assert!(parse_whitelist(&["users".to_string()]).is_err());
        assert!(parse_whitelist(&["=fuzzy_match".to_string()]).is_err());
    }
}
