//! Published issue records.

use std::{
    hash::{DefaultHasher, Hash, Hasher},
    time::{SystemTime, UNIX_EPOCH}
};

use serde::{Deserialize, Serialize};

use crate::checker::{Finding, Severity};

/// One finding delivered to a publish callback.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Issue {
    /// Stable identifier of this finding for this statement shape
    pub id:          String,
    pub db_path:     String,
    pub table:       String,
    pub sql:         String,
    /// Name of the checker that raised it
    #[serde(rename = "type")]
    pub issue_type:  String,
    /// Milliseconds since the Unix epoch
    pub create_time: u64,
    pub desc:        String,
    pub detail:      String,
    pub advice:      String,
    pub level:       Severity,
    /// Caller-supplied context passed through from the notification
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub ext_info:    String
}

impl Issue {
    /// `ordinal` is the finding's position among the findings of one
    /// execution; it keeps ids distinct within a batch.
    pub fn from_finding(
        db_path: &str,
        sql: &str,
        fingerprint: u64,
        ordinal: usize,
        ext_info: &str,
        finding: Finding
    ) -> Self {
        let table = finding.table_label();
        Self {
            id: issue_id(db_path, finding.checker, &table, fingerprint, ordinal),
            db_path: db_path.to_string(),
            sql: sql.to_string(),
            issue_type: finding.checker.to_string(),
            create_time: now_millis(),
            desc: finding.desc,
            detail: finding.detail,
            advice: finding.advice,
            level: finding.level,
            ext_info: ext_info.to_string(),
            table
        }
    }
}

/// 16 hex digits derived from where the issue was raised and by whom.
pub fn issue_id(
    db_path: &str,
    issue_type: &str,
    table: &str,
    fingerprint: u64,
    ordinal: usize
) -> String {
    let mut hasher = DefaultHasher::new();
    db_path.hash(&mut hasher);
    issue_type.hash(&mut hasher);
    table.hash(&mut hasher);
    fingerprint.hash(&mut hasher);
    ordinal.hash(&mut hasher);
    format!("{:016x}", hasher.finish())
}

fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
