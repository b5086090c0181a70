//! Shared text log of published issues.
//!
//! Several databases may publish at once; each batch is written under one
//! lock so blocks from different databases never interleave.

use std::{
    fmt::Write as _,
    fs::OpenOptions,
    io::Write,
    path::{Path, PathBuf},
    sync::Arc
};

use parking_lot::Mutex;

use crate::{
    error::{AppResult, file_write_error},
    issue::Issue,
    lint::PublishCallback
};

/// Append-only issue log file.
#[derive(Debug)]
pub struct IssueLog {
    path: PathBuf,
    lock: Mutex<()>
}

impl IssueLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(())
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one batch of issues published for `db_path`.
    pub fn append(&self, db_path: &str, issues: &[Issue]) -> AppResult<()> {
        if issues.is_empty() {
            return Ok(());
        }
        let text = render_batch(db_path, issues);
        let _guard = self.lock.lock();
        let path = self.path.display().to_string();
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| file_write_error(&path, e))?;
        file.write_all(text.as_bytes())
            .map_err(|e| file_write_error(&path, e))
    }

    /// Publish callback that appends every batch to this log.
    pub fn callback(self: Arc<Self>) -> PublishCallback {
        Arc::new(move |db_path: &str, issues: &[Issue]| {
            if let Err(e) = self.append(db_path, issues) {
                tracing::warn!(db = db_path, error = %e, "failed to write issue log");
            }
        })
    }
}

fn render_batch(db_path: &str, issues: &[Issue]) -> String {
    let mut out = String::new();
    for issue in issues {
        let _ = writeln!(out, "issue_id : {}", issue.id);
        let _ = writeln!(out, "db_path : {}", db_path);
        let _ = writeln!(out, "table : {}", issue.table);
        let _ = writeln!(out, "sql statement : {}", issue.sql);
        let _ = writeln!(out, "issue_type : {}", issue.issue_type);
        let _ = writeln!(out, "level : {}", issue.level);
        let _ = writeln!(out, "create_time : {}", issue.create_time);
        let _ = writeln!(out, "desc : {}", issue.desc);
        let _ = writeln!(out, "detail : {}", issue.detail);
        let _ = writeln!(out, "advice : {}", issue.advice);
        if !issue.ext_info.is_empty() {
            let _ = writeln!(out, "ext_info : {}", issue.ext_info);
        }
        out.push('\n');
    }
    out
}
