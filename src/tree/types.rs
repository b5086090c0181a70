use compact_str::CompactString;
use serde::Serialize;

/// Operator tag of an [`Expr`] node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[non_exhaustive]
pub enum Op {
    And,
    Or,
    Not,
    Eq,
    Ne,
    Gt,
    Ge,
    Lt,
    Le,
    Is,
    IsNot,
    IsNull,
    NotNull,
    In,
    Like,
    Between,
    BitAnd,
    BitOr,
    BitXor,
    BitNot,
    LShift,
    RShift,
    Plus,
    Minus,
    Multiply,
    Divide,
    Modulo,
    Concat,
    Negate,
    /// Bare identifier
    Id,
    /// Member access, `left.right`
    Dot,
    Literal,
    Function,
    Case,
    Cast,
    Exists,
    /// Scalar subquery
    Select,
    /// `*` or `t.*` in a projection
    Wildcard,
    Other
}

impl Op {
    pub fn is_bitwise(self) -> bool {
        matches!(
            self,
            Self::BitAnd | Self::BitOr | Self::BitXor | Self::BitNot | Self::LShift | Self::RShift
        )
    }

    /// Operators whose left operand joins an `AND` column group.
    pub fn is_index_comparison(self) -> bool {
        matches!(
            self,
            Self::Is | Self::In | Self::IsNull | Self::Eq | Self::Gt | Self::Le | Self::Lt | Self::Ge
        )
    }
}

/// One expression node. Children are owned by exactly one parent.
#[derive(Debug, Clone, PartialEq)]
pub struct Expr {
    pub op:     Op,
    pub left:   Option<Box<Expr>>,
    pub right:  Option<Box<Expr>>,
    /// Embedded statement for `IN (SELECT ...)`, `EXISTS` and scalar subqueries
    pub select: Option<Box<Select>>,
    /// Function arguments, `IN` members, `BETWEEN` bounds or `CASE` arms
    pub list:   Vec<Expr>,
    /// Identifier or literal text
    pub token:  Option<CompactString>
}

impl Expr {
    pub fn new(op: Op) -> Self {
        Self {
            op,
            left: None,
            right: None,
            select: None,
            list: Vec::new(),
            token: None
        }
    }

    pub fn leaf(op: Op, token: impl Into<CompactString>) -> Self {
        Self {
            token: Some(token.into()),
            ..Self::new(op)
        }
    }

    pub fn unary(op: Op, operand: Expr) -> Self {
        Self {
            left: Some(Box::new(operand)),
            ..Self::new(op)
        }
    }

    pub fn binary(op: Op, left: Expr, right: Expr) -> Self {
        Self {
            left: Some(Box::new(left)),
            right: Some(Box::new(right)),
            ..Self::new(op)
        }
    }

    pub fn with_list(mut self, list: Vec<Expr>) -> Self {
        self.list = list;
        self
    }

    pub fn with_select(mut self, select: Select) -> Self {
        self.select = Some(Box::new(select));
        self
    }

    /// Dot-qualified identifier this node names.
    ///
    /// `Id` yields its text and `Dot` joins both sides with `.`; any other
    /// node yields an empty string.
    pub fn identifier(&self) -> CompactString {
        match self.op {
            Op::Id => self.token.clone().unwrap_or_default(),
            Op::Dot => {
                let left = self.left.as_deref().map(Expr::identifier);
                let right = self.right.as_deref().map(Expr::identifier);
                let mut out = left.unwrap_or_default();
                out.push('.');
                out.push_str(&right.unwrap_or_default());
                out
            }
            _ => CompactString::default()
        }
    }
}

/// One `SELECT` (sub)statement.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Select {
    /// Bodies of common table expressions declared by this statement
    pub ctes:       Vec<Select>,
    /// Predecessor in a `UNION`/`INTERSECT`/`EXCEPT` chain
    pub prior:      Option<Box<Select>>,
    pub projection: Vec<Expr>,
    pub from:       Vec<SrcItem>,
    pub selection:  Option<Expr>,
    pub group_by:   Vec<Expr>,
    pub order_by:   Vec<Expr>,
    pub having:     Option<Expr>,
    pub limit:      Option<Expr>,
    pub offset:     Option<Expr>
}

/// One entry of a `FROM` source list.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SrcItem {
    /// Literal table name, absent for derived tables
    pub name:   Option<CompactString>,
    pub alias:  Option<CompactString>,
    /// Derived table body
    pub select: Option<Box<Select>>,
    pub using:  Option<Vec<CompactString>>,
    pub on:     Option<Expr>
}

impl SrcItem {
    pub fn table(name: impl Into<CompactString>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    pub fn derived(select: Select) -> Self {
        Self {
            select: Some(Box::new(select)),
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identifier_of_nested_dot() {
        let expr = Expr::binary(
            Op::Dot,
            Expr::leaf(Op::Id, "main"),
            Expr::binary(Op::Dot, Expr::leaf(Op::Id, "users"), Expr::leaf(Op::Id, "id"))
        );
        assert_eq!(expr.identifier(), "main.users.id");
    }

    #[test]
    fn test_identifier_of_literal_is_empty() {
        assert_eq!(Expr::leaf(Op::Literal, "1").identifier(), "");
    }

    #[test]
    fn test_bitwise_ops() {
        assert!(Op::BitAnd.is_bitwise());
        assert!(Op::RShift.is_bitwise());
        assert!(!Op::And.is_bitwise());
    }

    #[test]
    fn test_index_comparison_ops() {
        assert!(Op::Eq.is_index_comparison());
        assert!(Op::IsNull.is_index_comparison());
        assert!(!Op::Ne.is_index_comparison());
        assert!(!Op::Like.is_index_comparison());
    }
}
