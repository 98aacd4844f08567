//! The SELECT statement builder.

use crate::alias::AliasRegistry;
use crate::builder::Statement;
use crate::condition::{ChainedCondition, ConditionBuilder};
use crate::error::{SqlError, SqlResult};
use crate::expr::{
    Expr, IntoColumn, IntoExpr, IntoQuerySource, IntoTable, JoinType, QuerySource, SortOrder,
};
use crate::options::CompileOptions;
use crate::record::Dataset;
use crate::store::PositionedExpressions;
use crate::validate;

/// Clause slots of a SELECT, in rendering order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SelectPosition {
    Before,
    Column,
    From,
    Join,
    Where,
    GroupBy,
    Having,
    Union,
    OrderBy,
    After,
}

/// Fluent SELECT builder.
///
/// ```ignore
/// let sql = select()
///     .column(("a", "Id"))
///     .column(("a", "Name"))
///     .from(("Accounts", "a"))
///     .where_(|c| c.column(("a", "Age")).greater_than(18))
///     .order_by(("a", "Name"))
///     .build(CompileOptions::empty())?;
/// ```
#[derive(Debug, Clone)]
pub struct Select {
    store: PositionedExpressions<SelectPosition>,
    aliases: AliasRegistry,
    distinct: bool,
    error: Option<SqlError>,
}

impl Select {
    pub(crate) fn new() -> Self {
        Self {
            store: PositionedExpressions::new(),
            aliases: AliasRegistry::new(),
            distinct: false,
            error: None,
        }
    }

    /// The core mutation point all sugar funnels through: append `expr` at
    /// `position` with an explicit order tag.
    pub fn expression(mut self, expr: Expr, position: SelectPosition, order: i32) -> Self {
        self.store.add(position, expr, order);
        self
    }

    /// Add an output column.
    pub fn column(mut self, column: impl IntoColumn) -> Self {
        match column.into_column() {
            Ok(expr) => self.store.add(SelectPosition::Column, expr, 0),
            Err(err) => self.record(err),
        }
        self
    }

    /// Add an output column with an alias.
    pub fn column_as(mut self, column: impl IntoColumn, alias: &str) -> Self {
        let aliased = column
            .into_column()
            .and_then(|expr| expr.with_alias(alias));
        match aliased {
            Ok(expr) => self.store.add(SelectPosition::Column, expr, 0),
            Err(err) => self.record(err),
        }
        self
    }

    /// Add several columns of one dataset at once.
    pub fn columns(mut self, dataset: &str, names: &[&str]) -> Self {
        if let Err(err) = validate::not_empty("names", names) {
            self.record(err);
            return self;
        }
        for name in names {
            match (dataset, *name).into_column() {
                Ok(expr) => self.store.add(SelectPosition::Column, expr, 0),
                Err(err) => {
                    self.record(err);
                    break;
                }
            }
        }
        self
    }

    /// Add an arbitrary output expression (function call, CASE, ...).
    pub fn column_expr(mut self, expr: impl IntoExpr) -> Self {
        self.store.add(SelectPosition::Column, expr.into_expr(), 0);
        self
    }

    /// Emit `SELECT DISTINCT`.
    pub fn distinct(mut self) -> Self {
        self.distinct = true;
        self
    }

    /// Set (or add) a FROM table.
    pub fn from(mut self, table: impl IntoTable) -> Self {
        match table.into_table() {
            Ok(expr) => self.store.add(SelectPosition::From, expr, 0),
            Err(err) => self.record(err),
        }
        self
    }

    /// Select from a sub-query: `FROM (<query>) alias`.
    pub fn from_query(mut self, source: impl IntoQuerySource, alias: &str) -> Self {
        match Expr::sub_query_as(source, alias) {
            Ok(expr) => self.store.add(SelectPosition::From, expr, 0),
            Err(err) => self.record(err),
        }
        self
    }

    /// Select from the table mapped to `T`, aliased through the registry.
    pub fn from_table<T: Dataset + 'static>(mut self) -> Self {
        let alias = self.aliases.get_or_create::<T>();
        match (T::table_name().as_str(), alias.as_str()).into_table() {
            Ok(expr) => self.store.add(SelectPosition::From, expr, 0),
            Err(err) => self.record(err),
        }
        self
    }

    /// Add a column qualified by the alias registered for `T`.
    pub fn typed_column<T: Dataset + 'static>(mut self, name: &str) -> Self {
        let alias = self.aliases.get_or_create::<T>();
        match (alias.as_str(), name).into_column() {
            Ok(expr) => self.store.add(SelectPosition::Column, expr, 0),
            Err(err) => self.record(err),
        }
        self
    }

    /// Override the alias the registry holds for `T`. Last write wins.
    pub fn alias_for<T: 'static>(mut self, alias: &str) -> Self {
        if let Err(err) = self.aliases.set::<T>(alias) {
            self.record(err);
        }
        self
    }

    /// The alias currently registered for `T`, creating the default on first
    /// reference.
    pub fn alias_of<T: 'static>(&mut self) -> String {
        self.aliases.get_or_create::<T>()
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
                SelectPosition::Join,
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

    /// `RIGHT JOIN table ON ...`
    pub fn right_join(
        self,
        table: impl IntoTable,
        on: impl FnOnce(ConditionBuilder) -> ChainedCondition,
    ) -> Self {
        self.join(JoinType::Right, table, on)
    }

    /// `FULL OUTER JOIN table ON ...`
    pub fn full_join(
        self,
        table: impl IntoTable,
        on: impl FnOnce(ConditionBuilder) -> ChainedCondition,
    ) -> Self {
        self.join(JoinType::Full, table, on)
    }

    /// `CROSS JOIN table` (no ON clause).
    pub fn cross_join(mut self, table: impl IntoTable) -> Self {
        match table.into_table() {
            Ok(expr) => self.store.add(
                SelectPosition::Join,
                Expr::Join {
                    kind: JoinType::Cross,
                    table: Box::new(expr),
                    on: None,
                },
                0,
            ),
            Err(err) => self.record(err),
        }
        self
    }

    /// Add a WHERE condition chain. Repeated calls AND together.
    pub fn where_(mut self, condition: impl FnOnce(ConditionBuilder) -> ChainedCondition) -> Self {
        match condition(ConditionBuilder::new()).into_chain() {
            Ok(chain) => self
                .store
                .add(SelectPosition::Where, Expr::Condition(chain), 0),
            Err(err) => self.record(err),
        }
        self
    }

    /// Add a GROUP BY column.
    pub fn group_by(mut self, column: impl IntoColumn) -> Self {
        match column.into_column() {
            Ok(expr) => self.store.add(SelectPosition::GroupBy, expr, 0),
            Err(err) => self.record(err),
        }
        self
    }

    /// Add a HAVING condition chain. Repeated calls AND together.
    pub fn having(mut self, condition: impl FnOnce(ConditionBuilder) -> ChainedCondition) -> Self {
        match condition(ConditionBuilder::new()).into_chain() {
            Ok(chain) => self
                .store
                .add(SelectPosition::Having, Expr::Condition(chain), 0),
            Err(err) => self.record(err),
        }
        self
    }

    /// Append `UNION <query>` (duplicate-eliminating).
    pub fn union(mut self, source: impl IntoQuerySource) -> Self {
        self.store.add(
            SelectPosition::Union,
            Expr::Union {
                source: source.into_query_source(),
                distinct: true,
            },
            0,
        );
        self
    }

    /// Append `UNION ALL <query>`.
    pub fn union_all(mut self, source: impl IntoQuerySource) -> Self {
        self.store.add(
            SelectPosition::Union,
            Expr::Union {
                source: source.into_query_source(),
                distinct: false,
            },
            0,
        );
        self
    }

    /// Add an ORDER BY column (ascending).
    pub fn order_by(self, column: impl IntoColumn) -> Self {
        self.ordered(column, None)
    }

    /// Add a descending ORDER BY column.
    pub fn order_by_desc(self, column: impl IntoColumn) -> Self {
        self.ordered(column, Some(SortOrder::Descending))
    }

    fn ordered(mut self, column: impl IntoColumn, direction: Option<SortOrder>) -> Self {
        match column.into_column() {
            Ok(expr) => self.store.add(
                SelectPosition::OrderBy,
                Expr::ordered(expr, direction),
                0,
            ),
            Err(err) => self.record(err),
        }
        self
    }

    /// `LIMIT n`, always before any OFFSET.
    pub fn limit(mut self, n: u64) -> Self {
        self.store
            .add(SelectPosition::After, Expr::raw(format!("LIMIT {n}")), 0);
        self
    }

    /// `OFFSET n`, always after any LIMIT.
    pub fn offset(mut self, n: u64) -> Self {
        self.store
            .add(SelectPosition::After, Expr::raw(format!("OFFSET {n}")), 1);
        self
    }

    /// Add a raw fragment rendered before the SELECT keyword.
    pub fn prepend_raw(mut self, sql: impl Into<String>) -> Self {
        match validate::not_blank("sql", sql) {
            Ok(sql) => self.store.add(SelectPosition::Before, Expr::Raw(sql), 0),
            Err(err) => self.record(err),
        }
        self
    }

    /// Add a raw fragment rendered after all clauses.
    pub fn append_raw(mut self, sql: impl Into<String>) -> Self {
        match validate::not_blank("sql", sql) {
            Ok(sql) => self.store.add(SelectPosition::After, Expr::Raw(sql), 0),
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

impl Statement for Select {
    fn render_into(&self, buf: &mut String, options: CompileOptions) -> SqlResult<()> {
        if let Some(err) = &self.error {
            return Err(err.clone());
        }
        let sep = options.clause_separator();
        for expr in self.store.at(SelectPosition::Before) {
            expr.render(buf, options)?;
            buf.push_str(sep);
        }
        buf.push_str("SELECT ");
        if self.distinct {
            buf.push_str("DISTINCT ");
        }
        let columns = self.store.at(SelectPosition::Column);
        if columns.is_empty() {
            buf.push('*');
        } else {
            render_joined(buf, &columns, ", ", options)?;
        }
        if self.store.has(SelectPosition::From) {
            buf.push_str(sep);
            buf.push_str("FROM ");
            render_joined(buf, &self.store.at(SelectPosition::From), ", ", options)?;
        }
        for join in self.store.at(SelectPosition::Join) {
            buf.push_str(sep);
            join.render(buf, options)?;
        }
        if self.store.has(SelectPosition::Where) {
            buf.push_str(sep);
            buf.push_str("WHERE ");
            render_conditions(buf, &self.store.at(SelectPosition::Where), options)?;
        }
        if self.store.has(SelectPosition::GroupBy) {
            buf.push_str(sep);
            buf.push_str("GROUP BY ");
            render_joined(buf, &self.store.at(SelectPosition::GroupBy), ", ", options)?;
        }
        if self.store.has(SelectPosition::Having) {
            buf.push_str(sep);
            buf.push_str("HAVING ");
            render_conditions(buf, &self.store.at(SelectPosition::Having), options)?;
        }
        for union in self.store.at(SelectPosition::Union) {
            buf.push_str(sep);
            union.render(buf, options)?;
        }
        if self.store.has(SelectPosition::OrderBy) {
            buf.push_str(sep);
            buf.push_str("ORDER BY ");
            render_joined(buf, &self.store.at(SelectPosition::OrderBy), ", ", options)?;
        }
        for expr in self.store.at(SelectPosition::After) {
            buf.push_str(sep);
            expr.render(buf, options)?;
        }
        Ok(())
    }
}

impl IntoQuerySource for Select {
    fn into_query_source(self) -> QuerySource {
        QuerySource::statement(self)
    }
}

pub(crate) fn render_joined(
    buf: &mut String,
    exprs: &[&Expr],
    glue: &str,
    options: CompileOptions,
) -> SqlResult<()> {
    for (i, expr) in exprs.iter().enumerate() {
        if i > 0 {
            buf.push_str(glue);
        }
        expr.render(buf, options)?;
    }
    Ok(())
}

/// AND together the condition chains of a WHERE/HAVING position. A chain
/// with a top-level OR gets parenthesized when it is combined with others,
/// so the OR cannot swallow its neighbours.
pub(crate) fn render_conditions(
    buf: &mut String,
    exprs: &[&Expr],
    options: CompileOptions,
) -> SqlResult<()> {
    let combined = exprs.len() > 1;
    for (i, expr) in exprs.iter().enumerate() {
        if i > 0 {
            buf.push_str(" AND ");
        }
        match expr {
            Expr::Condition(chain) if combined && chain.has_or_link() => {
                buf.push('(');
                expr.render(buf, options)?;
                buf.push(')');
            }
            _ => expr.render(buf, options)?,
        }
    }
    Ok(())
}
