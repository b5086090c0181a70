use super::{CheckContext, Checker, CheckerInfo, Finding, Severity};

/// `OR` in a condition
pub struct OrCondition;

impl Checker for OrCondition {
    fn info(&self) -> CheckerInfo {
        CheckerInfo {
            name:     "or_condition",
            summary:  "OR between conditions may defeat index selection",
            severity: Severity::Info
        }
    }

    fn check(&self, ctx: &CheckContext<'_>) -> Vec<Finding> {
        if !ctx.signals.has_or {
            return vec![];
        }
        vec![ctx.statement_finding(
            &self.info(),
            "Statement combines conditions with OR",
            "Unless every OR branch is covered by an index the planner falls back to a scan",
            "Rewrite as UNION ALL of indexed lookups or index each branch"
        )]
    }
}

/// `IN` membership test
pub struct InCondition;

impl Checker for InCondition {
    fn info(&self) -> CheckerInfo {
        CheckerInfo {
            name:     "in_condition",
            summary:  "IN list or sub-select membership test",
            severity: Severity::Info
        }
    }

    fn check(&self, ctx: &CheckContext<'_>) -> Vec<Finding> {
        if !ctx.signals.has_in {
            return vec![];
        }
        vec![ctx.statement_finding(
            &self.info(),
            "Statement uses an IN membership test",
            "A long IN list or an uncorrelated sub-select is probed once per row",
            "Keep IN lists short and make sure the tested column is indexed"
        )]
    }
}

/// `JOIN ... USING` / `JOIN ... ON`
pub struct JoinQualifier;

impl Checker for JoinQualifier {
    fn info(&self) -> CheckerInfo {
        CheckerInfo {
            name:     "join_qualifier",
            summary:  "Join columns should be indexed on the inner table",
            severity: Severity::Info
        }
    }

    fn check(&self, ctx: &CheckContext<'_>) -> Vec<Finding> {
        if !ctx.signals.has_using_or_on {
            return vec![];
        }
        vec![ctx.statement_finding(
            &self.info(),
            "Statement joins tables with USING or ON",
            "Without an index on the join columns each outer row scans the inner table",
            "Index the join columns of the inner table"
        )]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::Signals;

    #[test]
    fn test_each_checker_follows_its_flag() {
        let signals = Signals {
            has_in: true,
            tables: vec!["a".into(), "b".into()],
            ..Signals::default()
        };
        let ctx = CheckContext::new("", &signals);
        assert!(OrCondition.check(&ctx).is_empty());
        assert!(JoinQualifier.check(&ctx).is_empty());
        let findings = InCondition.check(&ctx);
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].table_label(), "a, b");
    }

    #[test]
    fn test_join_qualifier_fires() {
        let signals = Signals {
            has_using_or_on: true,
            ..Signals::default()
        };
        let findings = JoinQualifier.check(&CheckContext::new("", &signals));
        assert_eq!(findings[0].checker, "join_qualifier");
    }
}
