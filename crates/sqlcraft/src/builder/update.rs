//! The UPDATE statement builder.

use crate::builder::select::{render_conditions, render_joined};
use crate::builder::Statement;
use crate::condition::{ChainedCondition, ConditionBuilder};
use crate::error::{SqlError, SqlResult};
use crate::expr::{Expr, IntoColumn, IntoExpr, IntoTable, JoinType, SqlValue};
use crate::options::CompileOptions;
use crate::record::RecordValues;
use crate::store::PositionedExpressions;
use crate::validate;

/// Clause slots of an UPDATE, in rendering order.
///
/// Joins render between the table and SET, the only placement that keeps
/// joined-table updates grammatical.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UpdatePosition {
    Before,
    Table,
    Join,
    Set,
    Where,
    After,
}

/// Fluent UPDATE builder.
#[derive(Debug, Clone)]
pub struct Update {
    store: PositionedExpressions<UpdatePosition>,
    error: Option<SqlError>,
}

impl Update {
    pub(crate) fn new(table: impl IntoTable) -> Self {
        let mut update = Self {
            store: PositionedExpressions::new(),
            error: None,
        };
        match table.into_table() {
            Ok(expr) => update.store.add(UpdatePosition::Table, expr, 0),
            Err(err) => update.record(err),
        }
        update
    }

    /// The core mutation point all sugar funnels through.
    pub fn expression(mut self, expr: Expr, position: UpdatePosition, order: i32) -> Self {
        self.store.add(position, expr, order);
        self
    }

    /// `SET column = literal`.
    pub fn set(mut self, column: impl IntoColumn, value: impl Into<SqlValue>) -> Self {
        match column.into_column() {
            Ok(target) => self.store.add(
                UpdatePosition::Set,
                Expr::assignment(target, Expr::Value(value.into())),
                0,
            ),
            Err(err) => self.record(err),
        }
        self
    }

    /// `SET column = <expression>` for computed right-hand sides.
    pub fn set_expr(mut self, column: impl IntoColumn, value: impl IntoExpr) -> Self {
        match column.into_column() {
            Ok(target) => self.store.add(
                UpdatePosition::Set,
                Expr::assignment(target, value.into_expr()),
                0,
            ),
            Err(err) => self.record(err),
        }
        self
    }

    /// Derive assignments from a record, skipping `excluded`.
    pub fn set_using(mut self, row: &impl RecordValues, excluded: &[&str]) -> Self {
        let pairs: Vec<(&'static str, SqlValue)> = row
            .record_values()
            .into_iter()
            .filter(|(column, _)| !excluded.contains(column))
            .collect();
        if pairs.is_empty() {
            self.record(SqlError::invalid_argument(
                "row",
                "record has no columns left after exclusions",
            ));
            return self;
        }
        for (column, value) in pairs {
            self = self.set(column, value);
        }
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
                UpdatePosition::Join,
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

    /// `LEFT JOIN table ON ...`
    pub fn left_join(
        self,
        table: impl IntoTable,
        on: impl FnOnce(ConditionBuilder) -> ChainedCondition,
    ) -> Self {
        self.join(JoinType::Left, table, on)
    }

    /// Add a WHERE condition chain. Repeated calls AND together.
    pub fn where_(mut self, condition: impl FnOnce(ConditionBuilder) -> ChainedCondition) -> Self {
        match condition(ConditionBuilder::new()).into_chain() {
            Ok(chain) => self
                .store
                .add(UpdatePosition::Where, Expr::Condition(chain), 0),
            Err(err) => self.record(err),
        }
        self
    }

    /// Add a raw fragment rendered before the statement.
    pub fn prepend_raw(mut self, sql: impl Into<String>) -> Self {
        match validate::not_blank("sql", sql) {
            Ok(sql) => self.store.add(UpdatePosition::Before, Expr::Raw(sql), 0),
            Err(err) => self.record(err),
        }
        self
    }

    /// Add a raw fragment rendered after the statement.
    pub fn append_raw(mut self, sql: impl Into<String>) -> Self {
        match validate::not_blank("sql", sql) {
            Ok(sql) => self.store.add(UpdatePosition::After, Expr::Raw(sql), 0),
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

impl Statement for Update {
    fn render_into(&self, buf: &mut String, options: CompileOptions) -> SqlResult<()> {
        if let Some(err) = &self.error {
            return Err(err.clone());
        }
        if !self.store.has(UpdatePosition::Set) {
            return Err(SqlError::invalid_state(
                "UPDATE requires at least one SET assignment",
            ));
        }
        let sep = options.clause_separator();
        for expr in self.store.at(UpdatePosition::Before) {
            expr.render(buf, options)?;
            buf.push_str(sep);
        }
        buf.push_str("UPDATE ");
        render_joined(buf, &self.store.at(UpdatePosition::Table), ", ", options)?;
        for join in self.store.at(UpdatePosition::Join) {
            buf.push_str(sep);
            join.render(buf, options)?;
        }
        buf.push_str(sep);
        buf.push_str("SET ");
        render_joined(buf, &self.store.at(UpdatePosition::Set), ", ", options)?;
        if self.store.has(UpdatePosition::Where) {
            buf.push_str(sep);
            buf.push_str("WHERE ");
            render_conditions(buf, &self.store.at(UpdatePosition::Where), options)?;
        }
        for expr in self.store.at(UpdatePosition::After) {
            buf.push_str(sep);
            expr.render(buf, options)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::update;

    fn built(statement: &Update) -> String {
        statement.build(CompileOptions::empty()).unwrap()
    }

    #[test]
    fn basic_update() {
        let statement = update("Accounts")
            .set("Name", "Ada")
            .set("Age", 36)
            .where_(|c| c.column("Id").equal_to(7));
        assert_eq!(
            built(&statement),
            "UPDATE Accounts SET Name = 'Ada', Age = 36 WHERE Id = 7"
        );
    }

    #[test]
    fn set_expr_takes_computed_values() {
        let statement = update("Accounts").set_expr(
            "Visits",
            Expr::raw("Visits + 1"),
        );
        assert_eq!(built(&statement), "UPDATE Accounts SET Visits = Visits + 1");
    }

    #[test]
    fn joined_update_places_join_before_set() {
        let statement = update(("Accounts", "a"))
            .inner_join(("Orders", "o"), |c| {
                c.column(("o", "AccountId")).equal_to_column(("a", "Id"))
            })
            .set(("a", "HasOrders"), true);
        assert_eq!(
            built(&statement),
            "UPDATE Accounts a INNER JOIN Orders o ON o.AccountId = a.Id \
             SET a.HasOrders = TRUE"
        );
    }

    #[test]
    fn or_chain_is_parenthesized_when_wheres_combine() {
        let statement = update("Accounts")
            .set("Locked", true)
            .where_(|c| c.column("Active").equal_to(true))
            .where_(|c| {
                c.column("Age").less_than(13).or().column("Age").greater_than(65)
            });
        assert_eq!(
            built(&statement),
            "UPDATE Accounts SET Locked = TRUE \
             WHERE Active = TRUE AND (Age < 13 OR Age > 65)"
        );
    }

    #[test]
    fn update_without_set_is_rejected() {
        let statement = update("Accounts");
        assert!(statement.build(CompileOptions::empty()).is_err());
    }

    #[test]
    fn set_using_filters_exclusions() {
        struct Account;
        impl RecordValues for Account {
            fn record_values(&self) -> Vec<(&'static str, SqlValue)> {
                vec![
                    ("Id", SqlValue::Int(7)),
                    ("Name", SqlValue::Text("Ada".to_string())),
                ]
            }
        }
        let statement = update("Accounts")
            .set_using(&Account, &["Id"])
            .where_(|c| c.column("Id").equal_to(7));
        assert_eq!(
            built(&statement),
            "UPDATE Accounts SET Name = 'Ada' WHERE Id = 7"
        );
    }
}
