use super::{CheckContext, Checker, CheckerInfo, Finding, Severity};

/// `LIKE` family match in a condition
pub struct FuzzyMatch;

impl Checker for FuzzyMatch {
    fn info(&self) -> CheckerInfo {
        CheckerInfo {
            name:     "fuzzy_match",
            summary:  "LIKE pattern match may scan the whole table",
            severity: Severity::Warning
        }
    }

    fn check(&self, ctx: &CheckContext<'_>) -> Vec<Finding> {
        if !ctx.signals.has_fuzzy_matching {
            return vec![];
        }
        vec![ctx.statement_finding(
            &self.info(),
            "Statement uses a LIKE pattern match",
            "A pattern with a leading wildcard cannot use an index and forces a full scan",
            "Anchor the pattern with a literal prefix or use a full-text index"
        )]
    }
}

/// Bitwise operator in a condition
pub struct BitOperation;

impl Checker for BitOperation {
    fn info(&self) -> CheckerInfo {
        CheckerInfo {
            name:     "bit_operation",
            summary:  "Bitwise operator in a condition cannot use an index",
            severity: Severity::Info
        }
    }

    fn check(&self, ctx: &CheckContext<'_>) -> Vec<Finding> {
        if !ctx.signals.has_bit_operation {
            return vec![];
        }
        vec![ctx.statement_finding(
            &self.info(),
            "Statement uses a bitwise operator",
            "Conditions on bit masks are evaluated row by row",
            "Store frequently tested flags in their own indexed columns"
        )]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::Signals;

    #[test]
    fn test_fuzzy_match_fires_on_flag() {
        let signals = Signals {
            has_fuzzy_matching: true,
            tables: vec!["users".into()],
            ..Signals::default()
        };
        let findings = FuzzyMatch.check(&CheckContext::new("", &signals));
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].table_label(), "users");
        assert_eq!(findings[0].level, Severity::Warning);
    }

    #[test]
    fn test_quiet_without_flags() {
        let signals = Signals::default();
        let ctx = CheckContext::new("", &signals);
        assert!(FuzzyMatch.check(&ctx).is_empty());
        assert!(BitOperation.check(&ctx).is_empty());
    }

    #[test]
    fn test_bit_operation_is_info() {
        let signals = Signals {
            has_bit_operation: true,
            ..Signals::default()
        };
        let findings = BitOperation.check(&CheckContext::new("", &signals));
        assert_eq!(findings[0].level, Severity::Info);
    }
}
