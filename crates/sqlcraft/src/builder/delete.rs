//! The DELETE statement builder.

use crate::builder::select::{render_conditions, render_joined};
use crate::builder::Statement;
use crate::condition::{ChainedCondition, ConditionBuilder};
use crate::error::{SqlError, SqlResult};
use crate::expr::{Expr, IntoTable, JoinType};
use crate::options::CompileOptions;
use crate::store::PositionedExpressions;
use crate::validate;

/// Clause slots of a DELETE, in rendering order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeletePosition {
    Before,
    From,
    Join,
    Where,
    After,
}

/// Fluent DELETE builder.
#[derive(Debug, Clone)]
pub struct Delete {
    store: PositionedExpressions<DeletePosition>,
    error: Option<SqlError>,
}

impl Delete {
    pub(crate) fn new(table: impl IntoTable) -> Self {
        let mut delete = Self {
            store: PositionedExpressions::new(),
            error: None,
        };
        match table.into_table() {
            Ok(expr) => delete.store.add(DeletePosition::From, expr, 0),
            Err(err) => delete.record(err),
        }
        delete
    }

    /// The core mutation point all sugar funnels through.
    pub fn expression(mut self, expr: Expr, position: DeletePosition, order: i32) -> Self {
        self.store.add(position, expr, order);
        self
    }

    /// Add a join with an explicit kind.
    pub fn join(
        mut self,
        kind: JoinType,
        table: impl IntoTable,
        on: impl FnOnce(ConditionBuilder) -> ChainedCondition,
    ) -> Self {
        let table = match table.into_table() {
            Ok(expr) => expr,
            Err(err) => {
                self.record(err);
                return self;
            }
        };
        match on(ConditionBuilder::new()).into_chain() {
            Ok(chain) => self.store.add(
                DeletePosition::Join,
                Expr::Join {
                    kind,
                    table: Box::new(table),
                    on: Some(chain),
                },
                0,
            ),
            Err(err) => self.record(err),
        }
        self
    }

    /// `INNER JOIN table ON ...`
    pub fn inner_join(
        self,
        table: impl IntoTable,
        on: impl FnOnce(ConditionBuilder) -> ChainedCondition,
    ) -> Self {
        self.join(JoinType::Inner, table, on)
    }

    /// Add a WHERE condition chain. Repeated calls AND together.
    pub fn where_(mut self, condition: impl FnOnce(ConditionBuilder) -> ChainedCondition) -> Self {
        match condition(ConditionBuilder::new()).into_chain() {
            Ok(chain) => self
                .store
                .add(DeletePosition::Where, Expr::Condition(chain), 0),
            Err(err) => self.record(err),
        }
        self
    }

    /// Add a raw fragment rendered before the statement.
    pub fn prepend_raw(mut self, sql: impl Into<String>) -> Self {
        match validate::not_blank("sql", sql) {
            Ok(sql) => self.store.add(DeletePosition::Before, Expr::Raw(sql), 0),
            Err(err) => self.record(err),
        }
        self
    }

    /// Add a raw fragment rendered after the statement.
    pub fn append_raw(mut self, sql: impl Into<String>) -> Self {
        match validate::not_blank("sql", sql) {
            Ok(sql) => self.store.add(DeletePosition::After, Expr::Raw(sql), 0),
            Err(err) => self.record(err),
        }
        self
    }

    fn record(&mut self, err: SqlError) {
        if self.error.is_none() {
            self.error = Some(err);
        }
    }
}

impl Statement for Delete {
    fn render_into(&self, buf: &mut String, options: CompileOptions) -> SqlResult<()> {
        if let Some(err) = &self.error {
            return Err(err.clone());
        }
        let sep = options.clause_separator();
        for expr in self.store.at(DeletePosition::Before) {
            expr.render(buf, options)?;
            buf.push_str(sep);
        }
        buf.push_str("DELETE FROM ");
        render_joined(buf, &self.store.at(DeletePosition::From), ", ", options)?;
        for join in self.store.at(DeletePosition::Join) {
            buf.push_str(sep);
            join.render(buf, options)?;
        }
        if self.store.has(DeletePosition::Where) {
            buf.push_str(sep);
            buf.push_str("WHERE ");
            render_conditions(buf, &self.store.at(DeletePosition::Where), options)?;
        }
        for expr in self.store.at(DeletePosition::After) {
            buf.push_str(sep);
            expr.render(buf, options)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::delete;

    fn built(statement: &Delete) -> String {
        statement.build(CompileOptions::empty()).unwrap()
    }

    #[test]
    fn basic_delete() {
        let statement = delete("Accounts").where_(|c| c.column("Id").equal_to(7));
        assert_eq!(built(&statement), "DELETE FROM Accounts WHERE Id = 7");
    }

    #[test]
    fn delete_without_where_removes_everything_on_purpose() {
        assert_eq!(built(&delete("Sessions")), "DELETE FROM Sessions");
    }

    #[test]
    fn or_chain_is_parenthesized_when_wheres_combine() {
        let statement = delete("Sessions")
            .where_(|c| c.column("Expired").equal_to(true))
            .where_(|c| {
                c.column("Kind").equal_to(1).or().column("Kind").equal_to(2)
            });
        assert_eq!(
            built(&statement),
            "DELETE FROM Sessions WHERE Expired = TRUE AND (Kind = 1 OR Kind = 2)"
        );
    }

    #[test]
    fn blank_table_fails_at_build() {
        let statement = delete(" ");
        assert!(statement.build(CompileOptions::empty()).is_err());
    }

    #[test]
    fn joined_delete() {
        let statement = delete(("Orders", "o"))
            .inner_join(("Accounts", "a"), |c| {
                c.column(("a", "Id")).equal_to_column(("o", "AccountId"))
            })
            .where_(|c| c.column(("a", "Closed")).equal_to(true));
        assert_eq!(
            built(&statement),
            "DELETE FROM Orders o INNER JOIN Accounts a ON a.Id = o.AccountId \
             WHERE a.Closed = TRUE"
        );
    }
}
