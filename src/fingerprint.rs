//! Statement fingerprints for de-duplication.
//!
//! Two executions that differ only in literal values or whitespace share a
//! fingerprint, so each statement shape is analyzed once per database.

use std::{
    collections::HashSet,
    hash::{DefaultHasher, Hash, Hasher},
    sync::LazyLock
};

use regex::Regex;

static STRING_LITERAL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"'(?:[^']|'')*'").expect("valid regex"));

static NUMBER_LITERAL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b\d+(?:\.\d+)?\b").expect("valid regex"));

static PLACEHOLDER_LIST: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\(\s*\?(?:\s*,\s*\?)*\s*\)").expect("valid regex"));

static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").expect("valid regex"));

/// Normalized statement text: literals become `?`, literal lists collapse to
/// `(?)`, whitespace is collapsed and the text is lower-cased.
///
/// # Example
///
/// ```
/// use sqlite_lint::fingerprint::normalize;
///
/// assert_eq!(
///     normalize("SELECT * FROM t WHERE id IN (1, 2,  3) AND name = 'x'"),
///     "select * from t where id in (?) and name = ?"
/// );
/// ```
pub fn normalize(sql: &str) -> String {
    let text = STRING_LITERAL.replace_all(sql, "?");
    let text = NUMBER_LITERAL.replace_all(&text, "?");
    let text = PLACEHOLDER_LIST.replace_all(&text, "(?)");
    let text = WHITESPACE.replace_all(&text, " ");
    text.trim().trim_end_matches(';').trim_end().to_lowercase()
}

/// Hash of the normalized statement text
pub fn fingerprint(sql: &str) -> u64 {
    let mut hasher = DefaultHasher::new();
    normalize(sql).hash(&mut hasher);
    hasher.finish()
}

/// Fingerprints already analyzed for one database.
#[derive(Debug)]
pub struct SeenStatements {
    seen:     HashSet<u64>,
    max_size: usize
}

impl SeenStatements {
    pub fn new(max_size: usize) -> Self {
        Self {
            seen: HashSet::with_capacity(max_size.min(1024)),
            max_size: max_size.max(1)
        }
    }

    /// Record a fingerprint; `false` when it was already present.
    pub fn insert(&mut self, fingerprint: u64) -> bool {
        if self.seen.contains(&fingerprint) {
            return false;
        }
        // Simple eviction: forget half when full
        if self.seen.len() >= self.max_size {
            let keys: Vec<_> = self
                .seen
                .iter()
                .take(self.max_size.div_ceil(2))
                .copied()
                .collect();
            for key in keys {
                self.seen.remove(&key);
            }
        }
        self.seen.insert(fingerprint)
    }

    pub fn contains(&self, fingerprint: u64) -> bool {
        self.seen.contains(&fingerprint)
    }

    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_literals_share_fingerprint() {
        assert_eq!(
            fingerprint("SELECT * FROM t WHERE id = 1"),
            fingerprint("select *  from t\n where id = 42;")
        );
        assert_eq!(
            fingerprint("SELECT * FROM t WHERE name = 'bob'"),
            fingerprint("SELECT * FROM t WHERE name = 'it''s'")
        );
    }

    #[test]
    fn test_identifiers_with_digits_kept() {
        assert_ne!(
            fingerprint("SELECT * FROM t1"),
            fingerprint("SELECT * FROM t2")
        );
    }

    #[test]
    fn test_in_lists_collapse() {
        assert_eq!(
            normalize("SELECT 1 FROM t WHERE a IN (1,2)"),
            normalize("SELECT 1 FROM t WHERE a IN (3, 4, 5)")
        );
    }

    #[test]
    fn test_seen_insert_once() {
        let mut seen = SeenStatements::new(8);
        assert!(seen.insert(1));
        assert!(!seen.insert(1));
        assert!(seen.contains(1));
        assert_eq!(seen.len(), 1);
    }

    #[test]
    fn test_seen_eviction_bounds_size() {
        let mut seen = SeenStatements::new(4);
        for fp in 0..20 {
            seen.insert(fp);
        }
        assert!(seen.len() <= 4);
        assert!(seen.contains(19));
    }
}
