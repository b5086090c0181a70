use compact_str::CompactString;
use smallvec::SmallVec;

use super::{CheckContext, Checker, CheckerInfo, Finding, Severity};
use crate::analyzer::{ColumnGroup, Signals};

/// Columns filtered together by `AND` are a composite index candidate
pub struct CompositeIndex;

impl Checker for CompositeIndex {
    fn info(&self) -> CheckerInfo {
        CheckerInfo {
            name:     "composite_index",
            summary:  "Columns filtered together may need a composite index",
            severity: Severity::Warning
        }
    }

    fn check(&self, ctx: &CheckContext<'_>) -> Vec<Finding> {
        let info = self.info();
        ctx.signals
            .and_column_groups
            .iter()
            .map(|group| {
                let tables = owning_tables(ctx.signals, group);
                let target = tables
                    .first()
                    .map(CompactString::as_str)
                    .unwrap_or("<table>");
                let advice = format!(
                    "Consider CREATE INDEX ON {}({}) ordered by selectivity",
                    target,
                    bare_columns(group).join(", ")
                );
                Finding {
                    checker: info.name,
                    desc: format!(
                        "{} columns are filtered together by AND: {}",
                        group.len(),
                        qualified_columns(group).join(", ")
                    ),
                    detail: "A single-column index serves only one of the conditions; the rest \
                             are checked row by row"
                        .to_string(),
                    advice,
                    level: info.severity,
                    tables
                }
            })
            .collect()
    }
}

/// Tables a column group belongs to, resolved through column qualifiers.
///
/// Unqualified columns in a single-table statement belong to that table; if
/// nothing resolves, every touched table is returned.
fn owning_tables(signals: &Signals, group: &ColumnGroup) -> SmallVec<[CompactString; 2]> {
    let mut tables: SmallVec<[CompactString; 2]> = SmallVec::new();
    for column in group {
        let Some((qualifier, _)) = column.rsplit_once('.') else {
            continue;
        };
        if let Some(table) = signals.resolve_table(qualifier)
            && !tables.contains(table)
        {
            tables.push(table.clone());
        }
    }
    if tables.is_empty() {
        tables.extend(signals.tables.iter().cloned());
    }
    tables
}

fn qualified_columns(group: &ColumnGroup) -> Vec<&str> {
    group.iter().map(CompactString::as_str).collect()
}

fn bare_columns(group: &ColumnGroup) -> Vec<&str> {
    group
        .iter()
        .map(|c| c.rsplit_once('.').map_or(c.as_str(), |(_, col)| col))
        .collect()
}
