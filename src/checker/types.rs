//! Type definitions for checker policies.
//!
//! - [`Severity`] - Issue severity levels (Info, Warning, Error)
//! - [`CheckerInfo`] - Checker identification and defaults
//! - [`Finding`] - One problem a checker reported for a statement

use compact_str::CompactString;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// Severity level of an issue.
///
/// Ordered from lowest to highest severity for sorting purposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Informational suggestion
    Info,
    /// Likely performance problem
    Warning,
    /// Problem that must be addressed
    Error
}

impl Severity {
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "error" => Some(Self::Error),
            "warning" | "warn" => Some(Self::Warning),
            "info" => Some(Self::Info),
            _ => None
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Info => write!(f, "INFO"),
            Self::Warning => write!(f, "WARN"),
            Self::Error => write!(f, "ERROR")
        }
    }
}

/// Metadata about a checker for identification and configuration.
#[derive(Debug, Clone)]
pub struct CheckerInfo {
    /// Checker name, also used as the issue type (e.g., "fuzzy_match")
    pub name:     &'static str,
    /// Human-readable summary
    pub summary:  &'static str,
    /// Default severity level
    pub severity: Severity
}

/// A single problem found in one statement.
#[derive(Debug, Clone, PartialEq)]
pub struct Finding {
    /// Name of the checker that produced it
    pub checker: &'static str,
    /// Tables the finding concerns; whitelisting any of them suppresses it
    pub tables:  SmallVec<[CompactString; 2]>,
    pub desc:    String,
    pub detail:  String,
    pub advice:  String,
    pub level:   Severity
}

impl Finding {
    /// Tables joined for display, e.g. `"users, orders"`.
    pub fn table_label(&self) -> String {
        self.tables
            .iter()
            .map(CompactString::as_str)
            .collect::<Vec<_>>()
            .join(", ")
    }
}
