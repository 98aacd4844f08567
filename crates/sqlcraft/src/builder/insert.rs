//! The INSERT statement builder.

use crate::builder::select::render_joined;
use crate::builder::Statement;
use crate::error::{SqlError, SqlResult};
use crate::expr::{Expr, IntoExpr, IntoQuerySource, IntoTable, SqlValue};
use crate::options::CompileOptions;
use crate::record::RecordValues;
use crate::store::PositionedExpressions;
use crate::validate;

/// Clause slots of an INSERT, in rendering order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InsertPosition {
    Before,
    Into,
    Columns,
    Values,
    After,
}

/// Fluent INSERT builder.
///
/// Rows added with [`Insert::values`] accumulate into a single `VALUES`
/// clause; alternatively [`Insert::from_select`] supplies one source query.
/// Mixing rows with a source, or adding a second source, is rejected.
#[derive(Debug, Clone)]
pub struct Insert {
    store: PositionedExpressions<InsertPosition>,
    column_count: Option<usize>,
    has_source: bool,
    error: Option<SqlError>,
}

impl Insert {
    pub(crate) fn new(table: impl IntoTable) -> Self {
        let mut insert = Self {
            store: PositionedExpressions::new(),
            column_count: None,
            has_source: false,
            error: None,
        };
        match table.into_table() {
            Ok(expr) => insert.store.add(InsertPosition::Into, expr, 0),
            Err(err) => insert.record_err(err),
        }
        insert
    }

    /// The core mutation point all sugar funnels through.
    pub fn expression(mut self, expr: Expr, position: InsertPosition, order: i32) -> Self {
        self.store.add(position, expr, order);
        self
    }

    /// Name the target columns.
    pub fn columns(mut self, names: &[&str]) -> Self {
        if let Err(err) = validate::not_empty("names", names) {
            self.record_err(err);
            return self;
        }
        for name in names {
            match validate::not_blank("column", *name) {
                Ok(name) => self.store.add(
                    InsertPosition::Columns,
                    Expr::Column {
                        dataset: None,
                        name,
                        alias: None,
                    },
                    0,
                ),
                Err(err) => {
                    self.record_err(err);
                    return self;
                }
            }
        }
        self.column_count = Some(self.store.count(InsertPosition::Columns));
        self
    }

    /// Add one row of literal values. Repeatable; each call is one
    /// parenthesized row.
    pub fn values<T: IntoExpr>(mut self, row: impl IntoIterator<Item = T>) -> Self {
        let items: Vec<Expr> = row.into_iter().map(IntoExpr::into_expr).collect();
        if let Some(expected) = self.column_count {
            if items.len() != expected {
                self.record_err(SqlError::invalid_argument(
                    "row",
                    format!("expected {expected} values, got {}", items.len()),
                ));
                return self;
            }
        }
        match Expr::list(items) {
            Ok(list) => self.store.add(InsertPosition::Values, list, 0),
            Err(err) => self.record_err(err),
        }
        self
    }

    /// Add one row of bind-parameter placeholders named after `names`.
    pub fn parameters(mut self, names: &[&str]) -> Self {
        if let Err(err) = validate::not_empty("names", names) {
            self.record_err(err);
            return self;
        }
        if let Some(expected) = self.column_count {
            if names.len() != expected {
                self.record_err(SqlError::invalid_argument(
                    "names",
                    format!("expected {expected} parameters, got {}", names.len()),
                ));
                return self;
            }
        }
        let mut items = Vec::with_capacity(names.len());
        for name in names {
            match Expr::parameter(*name) {
                Ok(expr) => items.push(expr),
                Err(err) => {
                    self.record_err(err);
                    return self;
                }
            }
        }
        match Expr::list(items) {
            Ok(list) => self.store.add(InsertPosition::Values, list, 0),
            Err(err) => self.record_err(err),
        }
        self
    }

    /// Insert the result of a query instead of literal rows. Only one
    /// source query is accepted.
    pub fn from_select(mut self, source: impl IntoQuerySource) -> Self {
        if self.has_source {
            self.record_err(SqlError::invalid_state(
                "INSERT already has a source query",
            ));
            return self;
        }
        self.has_source = true;
        let source = source.into_query_source();
        self.store.add(
            InsertPosition::Values,
            Expr::delegate(move |buf, options| source.render(buf, options.for_subquery())),
            0,
        );
        self
    }

    /// Derive columns and one row from a record, skipping `excluded`.
    pub fn record(mut self, row: &impl RecordValues, excluded: &[&str]) -> Self {
        let pairs: Vec<(&'static str, SqlValue)> = row
            .record_values()
            .into_iter()
            .filter(|(column, _)| !excluded.contains(column))
            .collect();
        if pairs.is_empty() {
            self.record_err(SqlError::invalid_argument(
                "row",
                "record has no columns left after exclusions",
            ));
            return self;
        }
        let names: Vec<&str> = pairs.iter().map(|(column, _)| *column).collect();
        let values: Vec<Expr> = pairs
            .into_iter()
            .map(|(_, value)| Expr::Value(value))
            .collect();
        self = self.columns(&names);
        match Expr::list(values) {
            Ok(list) => self.store.add(InsertPosition::Values, list, 0),
            Err(err) => self.record_err(err),
        }
        self
    }

    /// Add a raw fragment rendered before the statement.
    pub fn prepend_raw(mut self, sql: impl Into<String>) -> Self {
        match validate::not_blank("sql", sql) {
            Ok(sql) => self.store.add(InsertPosition::Before, Expr::Raw(sql), 0),
            Err(err) => self.record_err(err),
        }
        self
    }

    /// Add a raw fragment rendered after the statement.
    pub fn append_raw(mut self, sql: impl Into<String>) -> Self {
        match validate::not_blank("sql", sql) {
            Ok(sql) => self.store.add(InsertPosition::After, Expr::Raw(sql), 0),
            Err(err) => self.record_err(err),
        }
        self
    }

    fn record_err(&mut self, err: SqlError) {
        if self.error.is_none() {
            self.error = Some(err);
        }
    }
}

impl Statement for Insert {
    fn render_into(&self, buf: &mut String, options: CompileOptions) -> SqlResult<()> {
        if let Some(err) = &self.error {
            return Err(err.clone());
        }
        let values = self.store.at(InsertPosition::Values);
        if values.is_empty() {
            return Err(SqlError::invalid_state(
                "INSERT requires at least one VALUES row or a source query",
            ));
        }
        let rows: Vec<&&Expr> = values
            .iter()
            .filter(|e| matches!(e, Expr::List(_)))
            .collect();
        if !rows.is_empty() && rows.len() != values.len() {
            return Err(SqlError::invalid_state(
                "INSERT cannot mix VALUES rows with a source query",
            ));
        }
        let sep = options.clause_separator();
        for expr in self.store.at(InsertPosition::Before) {
            expr.render(buf, options)?;
            buf.push_str(sep);
        }
        buf.push_str("INSERT INTO ");
        render_joined(buf, &self.store.at(InsertPosition::Into), ", ", options)?;
        if self.store.has(InsertPosition::Columns) {
            buf.push_str(" (");
            render_joined(buf, &self.store.at(InsertPosition::Columns), ", ", options)?;
            buf.push(')');
        }
        buf.push_str(sep);
        if rows.is_empty() {
            // A source query: INSERT INTO t (cols) SELECT ...
            render_joined(buf, &values, sep, options)?;
        } else {
            buf.push_str("VALUES ");
            render_joined(buf, &values, ", ", options)?;
        }
        for expr in self.store.at(InsertPosition::After) {
            buf.push_str(sep);
            expr.render(buf, options)?;
        }
        Ok(())
    }
}
