use std::collections::{HashMap, HashSet};

use indexmap::IndexSet;

use crate::checker::Finding;

/// Checker name that whitelists every checker for a table.
pub const ALL_CHECKERS: &str = "*";

/// Table name mapped to the checkers suppressed for it.
pub type WhiteList = HashMap<String, HashSet<String>>;

/// Which checkers run for a database and which findings are suppressed.
#[derive(Debug, Clone, Default)]
pub struct CheckPolicy {
    enabled:   IndexSet<String>,
    whitelist: WhiteList
}

impl CheckPolicy {
    /// Add a checker to the enabled set.
    ///
    /// While the set is empty every checker is enabled.
    pub fn enable(&mut self, checker: &str) -> bool {
        self.enabled.insert(checker.to_ascii_lowercase())
    }

    pub fn set_whitelist(&mut self, whitelist: WhiteList) {
        self.whitelist = whitelist;
    }

    pub fn is_enabled(&self, checker: &str) -> bool {
        self.enabled.is_empty() || self.enabled.contains(&checker.to_ascii_lowercase())
    }

    pub fn enabled(&self) -> impl Iterator<Item = &str> {
        self.enabled.iter().map(String::as_str)
    }

    pub fn whitelist(&self) -> &WhiteList {
        &self.whitelist
    }

    /// Whether any table the finding concerns whitelists its checker.
    pub fn suppresses(&self, finding: &Finding) -> bool {
        finding
            .tables
            .iter()
            .any(|table| self.is_whitelisted(table, finding.checker))
    }

    /// An empty checker set or `*` suppresses every checker for the table.
    pub fn is_whitelisted(&self, table: &str, checker: &str) -> bool {
        self.whitelist
            .iter()
            .filter(|(key, _)| table_matches(key, table))
            .any(|(_, checkers)| {
                checkers.is_empty()
                    || checkers
                        .iter()
                        .any(|c| c == ALL_CHECKERS || c.eq_ignore_ascii_case(checker))
            })
    }
}

/// `main.users` is whitelisted by a `users` entry as well.
fn table_matches(key: &str, table: &str) -> bool {
    key.eq_ignore_ascii_case(table)
        || table
            .rsplit_once('.')
            .is_some_and(|(_, bare)| key.eq_ignore_ascii_case(bare))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checker::Severity;

    fn finding(checker: &'static str, tables: &[&str]) -> Finding {
        Finding {
            checker,
            tables: tables.iter().map(|t| (*t).into()).collect(),
            desc: String::new(),
            detail: String::new(),
            advice: String::new(),
            level: Severity::Info
        }
    }

    fn whitelist(table: &str, checkers: &[&str]) -> WhiteList {
        let mut map = WhiteList::new();
        map.insert(
            table.to_string(),
            checkers.iter().map(|c| c.to_string()).collect()
        );
        map
    }

    #[test]
    fn test_empty_enabled_set_enables_all() {
        let mut policy = CheckPolicy::default();
        assert!(policy.is_enabled("fuzzy_match"));
        policy.enable("OR_CONDITION");
        assert!(policy.is_enabled("or_condition"));
        assert!(!policy.is_enabled("fuzzy_match"));
    }

    #[test]
    fn test_whitelist_named_checker() {
        let mut policy = CheckPolicy::default();
        policy.set_whitelist(whitelist("Users", &["fuzzy_match"]));
        assert!(policy.suppresses(&finding("fuzzy_match", &["users", "orders"])));
        assert!(!policy.suppresses(&finding("or_condition", &["users"])));
        assert!(!policy.suppresses(&finding("fuzzy_match", &["orders"])));
    }

    #[test]
    fn test_whitelist_all_checkers() {
        let mut policy = CheckPolicy::default();
        policy.set_whitelist(whitelist("users", &["*"]));
        assert!(policy.suppresses(&finding("in_condition", &["users"])));
        policy.set_whitelist(whitelist("users", &[]));
        assert!(policy.suppresses(&finding("in_condition", &["main.users"])));
    }

    #[test]
    fn test_set_whitelist_replaces() {
        let mut policy = CheckPolicy::default();
        policy.set_whitelist(whitelist("a", &["*"]));
        policy.set_whitelist(whitelist("b", &["*"]));
        assert!(!policy.is_whitelisted("a", "fuzzy_match"));
        assert!(policy.is_whitelisted("b", "fuzzy_match"));
    }
}
