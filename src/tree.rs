//! Operator-tagged syntax tree for `SELECT` statements.
//!
//! Intercepted statements are parsed with [`sqlparser`] and lowered into a
//! small tree of [`Select`], [`Expr`] and [`SrcItem`] nodes. The tree keeps
//! only what the analyzer needs: compound chains are linked through
//! [`Select::prior`], join chains are flattened into one source list and
//! parentheses disappear.
//!
//! # Example
//!
//! ```
//! use sqlite_lint::tree::{Op, SqlDialect, parse_selects};
//!
//! let selects = parse_selects("SELECT * FROM a WHERE x = 1", SqlDialect::SQLite, 64).unwrap();
//! let select = &selects[0];
//!
//! assert_eq!(select.from[0].name.as_deref(), Some("a"));
//! assert_eq!(select.selection.as_ref().unwrap().op, Op::Eq);
//! ```

mod lower;
mod types;

use serde::{Deserialize, Serialize};
use sqlparser::{
    ast::Statement,
    dialect::{Dialect, GenericDialect, MySqlDialect, PostgreSqlDialect, SQLiteDialect},
    parser::Parser
};
pub use types::{Expr, Op, Select, SrcItem};

use crate::error::{AppResult, query_parse_error};

/// SQL dialect for parsing
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[non_exhaustive]
pub enum SqlDialect {
    Generic,
    MySQL,
    PostgreSQL,
    #[default]
    SQLite
}

impl SqlDialect {
    /// Convert to sqlparser dialect for parsing
    pub fn into_parser_dialect(self) -> Box<dyn Dialect> {
        match self {
            Self::Generic => Box::new(GenericDialect {}),
            Self::MySQL => Box::new(MySqlDialect {}),
            Self::PostgreSQL => Box::new(PostgreSqlDialect {}),
            Self::SQLite => Box::new(SQLiteDialect {})
        }
    }

    /// Resolve a dialect from its configuration name
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "generic" => Some(Self::Generic),
            "mysql" => Some(Self::MySQL),
            "postgresql" | "postgres" => Some(Self::PostgreSQL),
            "sqlite" => Some(Self::SQLite),
            _ => None
        }
    }
}

/// Parse SQL text and lower every `SELECT` statement it contains.
///
/// Statements other than queries are skipped.
///
/// # Errors
///
/// Returns error if the text does not parse or a statement nests deeper than
/// `max_depth`.
pub fn parse_selects(sql: &str, dialect: SqlDialect, max_depth: usize) -> AppResult<Vec<Select>> {
    let statements = parse_statements(sql, dialect)?;
    let mut lowering = lower::Lowering::new(max_depth);
    let mut selects = Vec::new();
    for statement in &statements {
        if let Statement::Query(query) = statement {
            selects.push(lowering.lower_query(query)?);
        }
    }
    Ok(selects)
}

/// Split SQL text into its statements, each rendered back to SQL text.
///
/// # Errors
///
/// Returns error if the text does not parse.
pub fn split_statements(sql: &str, dialect: SqlDialect) -> AppResult<Vec<String>> {
    let statements = parse_statements(sql, dialect)?;
    Ok(statements.iter().map(ToString::to_string).collect())
}

/// Parse with `dialect`, falling back to the generic dialect for text it
/// rejects.
///
/// SQLite and MySQL dialects reject `<<` and `>>`, which the generic dialect
/// accepts. The error reported is the one from `dialect`.
fn parse_statements(sql: &str, dialect: SqlDialect) -> AppResult<Vec<Statement>> {
    let parser_dialect = dialect.into_parser_dialect();
    match Parser::parse_sql(parser_dialect.as_ref(), sql) {
        Ok(statements) => Ok(statements),
        Err(e) if dialect != SqlDialect::Generic => Parser::parse_sql(&GenericDialect {}, sql)
            .map_err(|_| query_parse_error(e.to_string())),
        Err(e) => Err(query_parse_error(e.to_string()))
    }
}
