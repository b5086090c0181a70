use sqlparser::ast::{self, GroupByExpr, LimitClause, OrderByKind, SelectItem, SetExpr};

use super::Lowering;
use crate::{
    error::AppResult,
    tree::types::{Expr, Op, Select, SrcItem}
};

impl Lowering {
    /// Lower a full query; `ORDER BY`/`LIMIT`/`OFFSET` attach to the last
    /// member of a compound chain.
    pub(crate) fn lower_query(&mut self, query: &ast::Query) -> AppResult<Select> {
        self.nested(|this| {
            let mut select = this.lower_set_expr(&query.body, None)?;
            if let Some(with) = &query.with {
                for cte in &with.cte_tables {
                    select.ctes.push(this.lower_query(&cte.query)?);
                }
            }
            if let Some(order_by) = &query.order_by
                && let OrderByKind::Expressions(exprs) = &order_by.kind
            {
                for expr in exprs {
                    select.order_by.push(this.lower_expr(&expr.expr)?);
                }
            }
            if let Some(limit_clause) = &query.limit_clause {
                match limit_clause {
                    LimitClause::LimitOffset {
                        limit,
                        offset,
                        ..
                    } => {
                        if let Some(limit) = limit {
                            select.limit = Some(this.lower_expr(limit)?);
                        }
                        if let Some(offset) = offset {
                            select.offset = Some(this.lower_expr(&offset.value)?);
                        }
                    }
                    LimitClause::OffsetCommaLimit {
                        offset,
                        limit
                    } => {
                        select.limit = Some(this.lower_expr(limit)?);
                        select.offset = Some(this.lower_expr(offset)?);
                    }
                }
            }
            Ok(select)
        })
    }

    fn lower_set_expr(
        &mut self,
        set_expr: &SetExpr,
        prior: Option<Box<Select>>
    ) -> AppResult<Select> {
        match set_expr {
            SetExpr::Select(select) => {
                let mut lowered = self.lower_select(select)?;
                lowered.prior = prior;
                Ok(lowered)
            }
            SetExpr::SetOperation {
                left,
                right,
                ..
            } => {
                let left = self.nested(|this| this.lower_set_expr(left, prior))?;
                self.nested(|this| this.lower_set_expr(right, Some(Box::new(left))))
            }
            SetExpr::Query(query) => Ok(Select {
                prior,
                from: vec![SrcItem::derived(self.lower_query(query)?)],
                ..Select::default()
            }),
            SetExpr::Values(values) => {
                let mut projection = Vec::new();
                for row in &values.rows {
                    projection.extend(self.lower_exprs(row)?);
                }
                Ok(Select {
                    prior,
                    projection,
                    ..Select::default()
                })
            }
            _ => Ok(Select {
                prior,
                ..Select::default()
            })
        }
    }

    fn lower_select(&mut self, select: &ast::Select) -> AppResult<Select> {
        let mut lowered = Select::default();
        for item in &select.projection {
            match item {
                SelectItem::UnnamedExpr(expr)
                | SelectItem::ExprWithAlias {
                    expr, ..
                } => lowered.projection.push(self.lower_expr(expr)?),
                _ => lowered.projection.push(Expr::new(Op::Wildcard))
            }
        }
        for table in &select.from {
            self.lower_table_with_joins(table, &mut lowered.from)?;
        }
        if let Some(selection) = &select.selection {
            lowered.selection = Some(self.lower_expr(selection)?);
        }
        if let GroupByExpr::Expressions(exprs, _) = &select.group_by {
            lowered.group_by = self.lower_exprs(exprs)?;
        }
        if let Some(having) = &select.having {
            lowered.having = Some(self.lower_expr(having)?);
        }
        Ok(lowered)
    }
}
