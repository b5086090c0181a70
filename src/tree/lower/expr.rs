use sqlparser::ast::{
    self, BinaryOperator, FunctionArg, FunctionArgExpr, FunctionArguments, Ident, UnaryOperator
};

use super::Lowering;
use crate::{
    error::AppResult,
    tree::types::{Expr, Op}
};

impl Lowering {
    pub(super) fn lower_expr(&mut self, expr: &ast::Expr) -> AppResult<Expr> {
        self.nested(|this| this.lower_expr_node(expr))
    }

    pub(super) fn lower_exprs(&mut self, exprs: &[ast::Expr]) -> AppResult<Vec<Expr>> {
        exprs.iter().map(|e| self.lower_expr(e)).collect()
    }

    fn lower_expr_node(&mut self, expr: &ast::Expr) -> AppResult<Expr> {
        use sqlparser::ast::Expr as E;

        let lowered = match expr {
            E::Identifier(ident) => Expr::leaf(Op::Id, ident.value.as_str()),
            E::CompoundIdentifier(idents) => compound_identifier(idents),
            E::Value(value) => Expr::leaf(Op::Literal, value.to_string()),
            E::Nested(inner)
            | E::Collate {
                expr: inner, ..
            } => return self.lower_expr(inner),
            E::BinaryOp {
                left,
                op,
                right
            } => Expr::binary(
                binary_op(op),
                self.lower_expr(left)?,
                self.lower_expr(right)?
            ),
            E::UnaryOp {
                op,
                expr
            } => Expr::unary(unary_op(op), self.lower_expr(expr)?),
            E::Like {
                expr,
                pattern,
                ..
            }
            | E::ILike {
                expr,
                pattern,
                ..
            }
            | E::SimilarTo {
                expr,
                pattern,
                ..
            }
            | E::RLike {
                expr,
                pattern,
                ..
            } => Expr::binary(Op::Like, self.lower_expr(expr)?, self.lower_expr(pattern)?),
            E::InList {
                expr,
                list,
                ..
            } => Expr::unary(Op::In, self.lower_expr(expr)?).with_list(self.lower_exprs(list)?),
            E::InSubquery {
                expr,
                subquery,
                ..
            } => Expr::unary(Op::In, self.lower_expr(expr)?)
                .with_select(self.lower_query(subquery)?),
            E::IsNull(e) => Expr::unary(Op::IsNull, self.lower_expr(e)?),
            E::IsNotNull(e) => Expr::unary(Op::NotNull, self.lower_expr(e)?),
            E::IsTrue(e) | E::IsFalse(e) | E::IsUnknown(e) => {
                Expr::unary(Op::Is, self.lower_expr(e)?)
            }
            E::IsNotTrue(e) | E::IsNotFalse(e) | E::IsNotUnknown(e) => {
                Expr::unary(Op::IsNot, self.lower_expr(e)?)
            }
            E::IsNotDistinctFrom(left, right) => {
                Expr::binary(Op::Is, self.lower_expr(left)?, self.lower_expr(right)?)
            }
            E::IsDistinctFrom(left, right) => {
                Expr::binary(Op::IsNot, self.lower_expr(left)?, self.lower_expr(right)?)
            }
            E::Between {
                expr,
                low,
                high,
                ..
            } => Expr::unary(Op::Between, self.lower_expr(expr)?)
                .with_list(vec![self.lower_expr(low)?, self.lower_expr(high)?]),
            E::Subquery(query) => Expr::new(Op::Select).with_select(self.lower_query(query)?),
            E::Exists {
                subquery, ..
            } => Expr::new(Op::Exists).with_select(self.lower_query(subquery)?),
            E::Function(func) => self.lower_function(func)?,
            E::Case {
                operand,
                conditions,
                else_result,
                ..
            } => {
                let mut arms = Vec::with_capacity(conditions.len() * 2 + 1);
                for case_when in conditions {
                    arms.push(self.lower_expr(&case_when.condition)?);
                    arms.push(self.lower_expr(&case_when.result)?);
                }
                if let Some(else_res) = else_result {
                    arms.push(self.lower_expr(else_res)?);
                }
                let mut case = Expr::new(Op::Case).with_list(arms);
                if let Some(op) = operand {
                    case.left = Some(Box::new(self.lower_expr(op)?));
                }
                case
            }
            E::Cast {
                expr, ..
            } => Expr::unary(Op::Cast, self.lower_expr(expr)?),
            _ => Expr::new(Op::Other)
        };
        Ok(lowered)
    }

    fn lower_function(&mut self, func: &ast::Function) -> AppResult<Expr> {
        let mut lowered = Expr::leaf(Op::Function, func.name.to_string());
        match &func.args {
            FunctionArguments::List(arg_list) => {
                for arg in &arg_list.args {
                    match arg {
                        FunctionArg::Unnamed(FunctionArgExpr::Expr(e))
                        | FunctionArg::Named {
                            arg: FunctionArgExpr::Expr(e),
                            ..
                        } => lowered.list.push(self.lower_expr(e)?),
                        _ => {}
                    }
                }
            }
            FunctionArguments::Subquery(query) => {
                lowered.select = Some(Box::new(self.lower_query(query)?));
            }
            _ => {}
        }
        Ok(lowered)
    }
}

/// `a.b.c` becomes `Dot(a, Dot(b, c))`.
fn compound_identifier(idents: &[Ident]) -> Expr {
    let mut parts = idents.iter().rev();
    let Some(last) = parts.next() else {
        return Expr::new(Op::Other);
    };
    parts.fold(Expr::leaf(Op::Id, last.value.as_str()), |acc, ident| {
        Expr::binary(Op::Dot, Expr::leaf(Op::Id, ident.value.as_str()), acc)
    })
}

fn binary_op(op: &BinaryOperator) -> Op {
    match op {
        BinaryOperator::And => Op::And,
        BinaryOperator::Or => Op::Or,
        BinaryOperator::Eq => Op::Eq,
        BinaryOperator::NotEq => Op::Ne,
        BinaryOperator::Gt => Op::Gt,
        BinaryOperator::GtEq => Op::Ge,
        BinaryOperator::Lt => Op::Lt,
        BinaryOperator::LtEq => Op::Le,
        BinaryOperator::BitwiseAnd => Op::BitAnd,
        BinaryOperator::BitwiseOr => Op::BitOr,
        BinaryOperator::BitwiseXor => Op::BitXor,
        BinaryOperator::PGBitwiseShiftLeft => Op::LShift,
        BinaryOperator::PGBitwiseShiftRight => Op::RShift,
        BinaryOperator::Plus => Op::Plus,
        BinaryOperator::Minus => Op::Minus,
        BinaryOperator::Multiply => Op::Multiply,
        BinaryOperator::Divide => Op::Divide,
        BinaryOperator::Modulo => Op::Modulo,
        BinaryOperator::StringConcat => Op::Concat,
        _ => Op::Other
    }
}

fn unary_op(op: &UnaryOperator) -> Op {
    match op {
        UnaryOperator::Not => Op::Not,
        UnaryOperator::BitwiseNot => Op::BitNot,
        UnaryOperator::Minus => Op::Negate,
        _ => Op::Other
    }
}
