use sqlparser::ast::{JoinConstraint, JoinOperator, TableFactor, TableWithJoins};

use super::Lowering;
use crate::{error::AppResult, tree::types::SrcItem};

impl Lowering {
    /// Flatten a table and its join chain into `out`, attaching each join
    /// qualifier to the first entry its relation produced.
    pub(super) fn lower_table_with_joins(
        &mut self,
        table: &TableWithJoins,
        out: &mut Vec<SrcItem>
    ) -> AppResult<()> {
        self.lower_table_factor(&table.relation, out)?;
        for join in &table.joins {
            let start = out.len();
            self.lower_table_factor(&join.relation, out)?;
            let Some(constraint) = join_constraint(&join.join_operator) else {
                continue;
            };
            let on = match constraint {
                JoinConstraint::On(expr) => Some(self.lower_expr(expr)?),
                _ => None
            };
            if let Some(item) = out.get_mut(start) {
                match constraint {
                    JoinConstraint::On(_) => item.on = on,
                    JoinConstraint::Using(columns) => {
                        item.using = Some(columns.iter().map(|c| c.to_string().into()).collect());
                    }
                    _ => {}
                }
            }
        }
        Ok(())
    }

    fn lower_table_factor(&mut self, factor: &TableFactor, out: &mut Vec<SrcItem>) -> AppResult<()> {
        match factor {
            TableFactor::Table {
                name,
                alias,
                ..
            } => {
                let mut item = SrcItem::table(name.to_string());
                item.alias = alias.as_ref().map(|a| a.name.value.as_str().into());
                out.push(item);
            }
            TableFactor::Derived {
                subquery,
                alias,
                ..
            } => {
                let mut item = SrcItem::derived(self.lower_query(subquery)?);
                item.alias = alias.as_ref().map(|a| a.name.value.as_str().into());
                out.push(item);
            }
            TableFactor::NestedJoin {
                table_with_joins, ..
            } => {
                self.nested(|this| this.lower_table_with_joins(table_with_joins, out))?;
            }
            _ => out.push(SrcItem::default())
        }
        Ok(())
    }
}

fn join_constraint(op: &JoinOperator) -> Option<&JoinConstraint> {
    match op {
        JoinOperator::Join(constraint)
        | JoinOperator::Inner(constraint)
        | JoinOperator::Left(constraint)
        | JoinOperator::LeftOuter(constraint)
        | JoinOperator::Right(constraint)
        | JoinOperator::RightOuter(constraint)
        | JoinOperator::FullOuter(constraint)
        | JoinOperator::Semi(constraint)
        | JoinOperator::LeftSemi(constraint)
        | JoinOperator::RightSemi(constraint)
        | JoinOperator::Anti(constraint)
        | JoinOperator::LeftAnti(constraint)
        | JoinOperator::RightAnti(constraint) => Some(constraint),
        _ => None
    }
}
