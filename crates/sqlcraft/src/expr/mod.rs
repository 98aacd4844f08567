//! The SQL expression tree and its compiler.
//!
//! Every node is an immutable, clone-friendly value that knows how to render
//! itself into a text buffer given the active [`CompileOptions`]. Composite
//! nodes render fixed keywords and punctuation around recursive renders of
//! their children, in SQL grammar order. Malformed nodes cannot be
//! constructed: every entry point that accepts a caller-supplied name or
//! collection validates it first.

mod case;
pub mod func;
mod operator;
mod window;

pub use case::{Case, CaseExpr, CaseWhen};
pub use operator::{CompareOp, JoinType, LogicOp, SortOrder};
pub use window::{
    Frame, FrameBound, FrameBuilder, FrameLink, FrameLower, FrameUnit, FrameUpper, WindowFrame,
    WindowSpec,
};

use std::fmt;
use std::sync::Arc;

use crate::builder::Statement;
use crate::condition::ConditionChain;
use crate::error::SqlResult;
use crate::options::CompileOptions;
use crate::validate;

/// A literal constant rendered inline.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl SqlValue {
    fn render(&self, buf: &mut String) {
        match self {
            SqlValue::Null => buf.push_str("NULL"),
            SqlValue::Bool(true) => buf.push_str("TRUE"),
            SqlValue::Bool(false) => buf.push_str("FALSE"),
            SqlValue::Int(n) => buf.push_str(&n.to_string()),
            SqlValue::Float(f) if f.is_finite() => buf.push_str(&f.to_string()),
            // NaN and infinities have no SQL literal form.
            SqlValue::Float(_) => buf.push_str("NULL"),
            SqlValue::Text(s) => {
                buf.push('\'');
                for ch in s.chars() {
                    if ch == '\'' {
                        buf.push('\'');
                        buf.push('\'');
                    } else {
                        buf.push(ch);
                    }
                }
                buf.push('\'');
            }
        }
    }
}

impl From<bool> for SqlValue {
    fn from(v: bool) -> Self {
        SqlValue::Bool(v)
    }
}

impl From<i32> for SqlValue {
    fn from(v: i32) -> Self {
        SqlValue::Int(v as i64)
    }
}

impl From<i64> for SqlValue {
    fn from(v: i64) -> Self {
        SqlValue::Int(v)
    }
}

impl From<f64> for SqlValue {
    fn from(v: f64) -> Self {
        SqlValue::Float(v)
    }
}

impl From<&str> for SqlValue {
    fn from(v: &str) -> Self {
        SqlValue::Text(v.to_string())
    }
}

impl From<String> for SqlValue {
    fn from(v: String) -> Self {
        SqlValue::Text(v)
    }
}

impl<T: Into<SqlValue>> From<Option<T>> for SqlValue {
    fn from(v: Option<T>) -> Self {
        match v {
            Some(v) => v.into(),
            None => SqlValue::Null,
        }
    }
}

/// A caller-supplied render callback, wrapped for cloning and debugging.
#[derive(Clone)]
pub struct RenderFn(Arc<dyn Fn(&mut String, CompileOptions) -> SqlResult<()> + Send + Sync>);

impl RenderFn {
    /// Wrap a render callback.
    pub fn new(
        f: impl Fn(&mut String, CompileOptions) -> SqlResult<()> + Send + Sync + 'static,
    ) -> Self {
        Self(Arc::new(f))
    }

    fn call(&self, buf: &mut String, options: CompileOptions) -> SqlResult<()> {
        (self.0)(buf, options)
    }
}

impl fmt::Debug for RenderFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("RenderFn").field(&"<fn>").finish()
    }
}

/// The source behind a sub-query or set-operation expression: a finished
/// statement builder, a raw string, or a render delegate.
#[derive(Debug, Clone)]
pub enum QuerySource {
    Raw(String),
    Statement(Arc<dyn Statement>),
    Delegate(RenderFn),
}

impl QuerySource {
    /// Wrap a finished statement builder.
    pub fn statement(statement: impl Statement + 'static) -> Self {
        QuerySource::Statement(Arc::new(statement))
    }

    /// Wrap a raw SQL string.
    pub fn raw(sql: impl Into<String>) -> Self {
        QuerySource::Raw(sql.into())
    }

    /// Wrap a render delegate.
    pub fn delegate(
        f: impl Fn(&mut String, CompileOptions) -> SqlResult<()> + Send + Sync + 'static,
    ) -> Self {
        QuerySource::Delegate(RenderFn::new(f))
    }

    pub(crate) fn render(&self, buf: &mut String, options: CompileOptions) -> SqlResult<()> {
        match self {
            QuerySource::Raw(sql) => {
                buf.push_str(sql);
                Ok(())
            }
            QuerySource::Statement(statement) => statement.render_into(buf, options),
            QuerySource::Delegate(f) => f.call(buf, options),
        }
    }
}

/// Convert a value into a [`QuerySource`].
pub trait IntoQuerySource {
    fn into_query_source(self) -> QuerySource;
}

impl IntoQuerySource for QuerySource {
    fn into_query_source(self) -> QuerySource {
        self
    }
}

impl IntoQuerySource for &str {
    fn into_query_source(self) -> QuerySource {
        QuerySource::Raw(self.to_string())
    }
}

impl IntoQuerySource for String {
    fn into_query_source(self) -> QuerySource {
        QuerySource::Raw(self)
    }
}

/// A function or aggregate call, optionally windowed with `OVER (...)`.
#[derive(Debug, Clone)]
pub struct FunctionCall {
    name: String,
    args: Vec<Expr>,
    window: Option<WindowSpec>,
}

impl FunctionCall {
    /// Create a function call with the given arguments.
    pub fn new(name: impl Into<String>, args: Vec<Expr>) -> SqlResult<Self> {
        let name = validate::not_blank("function", name)?;
        Ok(Self {
            name,
            args,
            window: None,
        })
    }

    pub(crate) fn fixed(name: &'static str, args: Vec<Expr>) -> Self {
        Self {
            name: name.to_string(),
            args,
            window: None,
        }
    }

    /// Attach an `OVER (...)` window to this call.
    pub fn over(mut self, window: WindowSpec) -> Self {
        self.window = Some(window);
        self
    }

    fn render(&self, buf: &mut String, options: CompileOptions) -> SqlResult<()> {
        buf.push_str(&self.name);
        buf.push('(');
        for (i, arg) in self.args.iter().enumerate() {
            if i > 0 {
                buf.push_str(", ");
            }
            arg.render(buf, options)?;
        }
        buf.push(')');
        if let Some(window) = &self.window {
            buf.push_str(" OVER (");
            window.render(buf, options)?;
            buf.push(')');
        }
        Ok(())
    }
}

/// A node of the SQL expression tree.
///
/// Nodes are immutable once constructed and safe to share between cloned
/// builders; rendering never mutates anything but the output buffer.
#[derive(Debug, Clone)]
pub enum Expr {
    /// Verbatim SQL text.
    Raw(String),
    /// A column reference: `[dataset.]name[ AS alias]`.
    Column {
        dataset: Option<String>,
        name: String,
        alias: Option<String>,
    },
    /// A table reference: `[database.][schema.]name[ alias]`.
    Table {
        database: Option<String>,
        schema: Option<String>,
        name: String,
        alias: Option<String>,
    },
    /// A literal constant.
    Value(SqlValue),
    /// A bind parameter placeholder: `@name`.
    Parameter(String),
    /// A session/script variable: `@name`.
    Variable(String),
    /// A caller-supplied render callback.
    Delegate(RenderFn),
    /// A parenthesized, comma-separated list.
    List(Vec<Expr>),
    /// A parenthesized nested query, optionally aliased.
    SubQuery {
        alias: Option<String>,
        source: QuerySource,
    },
    /// A function or aggregate call.
    Function(FunctionCall),
    /// A CASE expression.
    Case(CaseExpr),
    /// An expression with a sort direction, for ORDER BY positions.
    Ordered {
        expr: Box<Expr>,
        direction: Option<SortOrder>,
    },
    /// A set operation appended to a SELECT: `UNION [ALL] <source>`.
    Union { source: QuerySource, distinct: bool },
    /// A chain of conditions, as produced by the condition builder.
    Condition(ConditionChain),
    /// A join clause: `<kind> JOIN <table> [ON <condition>]`.
    Join {
        kind: JoinType,
        table: Box<Expr>,
        on: Option<ConditionChain>,
    },
    /// An assignment: `<target> = <value>`, for SET positions.
    Assignment { target: Box<Expr>, value: Box<Expr> },
    /// Any expression given an output alias: `<expr> AS alias`.
    Aliased { expr: Box<Expr>, alias: String },
}

impl Expr {
    /// Verbatim SQL text.
    pub fn raw(sql: impl Into<String>) -> Self {
        Expr::Raw(sql.into())
    }

    /// A column reference, validated eagerly.
    pub fn column(column: impl IntoColumn) -> SqlResult<Self> {
        column.into_column()
    }

    /// A table reference, validated eagerly.
    pub fn table(table: impl IntoTable) -> SqlResult<Self> {
        table.into_table()
    }

    /// A fully qualified table reference.
    pub fn qualified_table(
        database: Option<&str>,
        schema: Option<&str>,
        name: &str,
        alias: Option<&str>,
    ) -> SqlResult<Self> {
        Ok(Expr::Table {
            database: database
                .map(|d| validate::not_blank("database", d))
                .transpose()?,
            schema: schema.map(|s| validate::not_blank("schema", s)).transpose()?,
            name: validate::not_blank("table", name)?,
            alias: alias.map(|a| validate::not_blank("alias", a)).transpose()?,
        })
    }

    /// A literal constant.
    pub fn value(value: impl Into<SqlValue>) -> Self {
        Expr::Value(value.into())
    }

    /// A bind parameter placeholder.
    pub fn parameter(name: impl Into<String>) -> SqlResult<Self> {
        Ok(Expr::Parameter(validate::not_blank("parameter", name)?))
    }

    /// A session/script variable.
    pub fn variable(name: impl Into<String>) -> SqlResult<Self> {
        Ok(Expr::Variable(validate::not_blank("variable", name)?))
    }

    /// A render delegate.
    pub fn delegate(
        f: impl Fn(&mut String, CompileOptions) -> SqlResult<()> + Send + Sync + 'static,
    ) -> Self {
        Expr::Delegate(RenderFn::new(f))
    }

    /// A parenthesized list of values.
    pub fn list(items: Vec<Expr>) -> SqlResult<Self> {
        validate::not_empty("items", &items)?;
        Ok(Expr::List(items))
    }

    /// A sub-query expression.
    pub fn sub_query(source: impl IntoQuerySource) -> Self {
        Expr::SubQuery {
            alias: None,
            source: source.into_query_source(),
        }
    }

    /// An aliased sub-query expression.
    pub fn sub_query_as(source: impl IntoQuerySource, alias: &str) -> SqlResult<Self> {
        Ok(Expr::SubQuery {
            alias: Some(validate::not_blank("alias", alias)?),
            source: source.into_query_source(),
        })
    }

    pub(crate) fn ordered(expr: Expr, direction: Option<SortOrder>) -> Self {
        Expr::Ordered {
            expr: Box::new(expr),
            direction,
        }
    }

    pub(crate) fn assignment(target: Expr, value: Expr) -> Self {
        Expr::Assignment {
            target: Box::new(target),
            value: Box::new(value),
        }
    }

    /// Give this expression an output alias.
    pub fn with_alias(self, alias: impl Into<String>) -> SqlResult<Self> {
        let alias = validate::not_blank("alias", alias)?;
        Ok(match self {
            Expr::Column { dataset, name, .. } => Expr::Column {
                dataset,
                name,
                alias: Some(alias),
            },
            Expr::SubQuery { source, .. } => Expr::SubQuery {
                alias: Some(alias),
                source,
            },
            other => Expr::Aliased {
                expr: Box::new(other),
                alias,
            },
        })
    }

    /// Render this node into `buf` under the given options.
    ///
    /// Append-only: a partially written buffer after an error is expected.
    pub fn render(&self, buf: &mut String, options: CompileOptions) -> SqlResult<()> {
        match self {
            Expr::Raw(sql) => buf.push_str(sql),
            Expr::Column {
                dataset,
                name,
                alias,
            } => {
                if let Some(dataset) = dataset {
                    buf.push_str(dataset);
                    buf.push('.');
                }
                buf.push_str(name);
                if let Some(alias) = alias {
                    buf.push_str(" AS ");
                    buf.push_str(alias);
                }
            }
            Expr::Table {
                database,
                schema,
                name,
                alias,
            } => {
                if let Some(database) = database {
                    buf.push_str(database);
                    buf.push('.');
                }
                if let Some(schema) = schema {
                    buf.push_str(schema);
                    buf.push('.');
                }
                buf.push_str(name);
                if let Some(alias) = alias {
                    buf.push(' ');
                    buf.push_str(alias);
                }
            }
            Expr::Value(value) => value.render(buf),
            Expr::Parameter(name) | Expr::Variable(name) => {
                buf.push('@');
                buf.push_str(name);
            }
            Expr::Delegate(f) => f.call(buf, options)?,
            Expr::List(items) => {
                buf.push('(');
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        buf.push_str(", ");
                    }
                    item.render(buf, options)?;
                }
                buf.push(')');
            }
            Expr::SubQuery { alias, source } => {
                buf.push('(');
                source.render(buf, options.for_subquery())?;
                buf.push(')');
                if let Some(alias) = alias {
                    buf.push(' ');
                    buf.push_str(alias);
                }
            }
            Expr::Function(call) => call.render(buf, options)?,
            Expr::Case(case) => case.render(buf, options)?,
            Expr::Ordered { expr, direction } => {
                expr.render(buf, options)?;
                if let Some(direction) = direction {
                    buf.push(' ');
                    buf.push_str(direction.token());
                }
            }
            Expr::Union { source, distinct } => {
                buf.push_str(if *distinct { "UNION " } else { "UNION ALL " });
                source.render(buf, options.for_subquery())?;
            }
            Expr::Condition(chain) => chain.render(buf, options)?,
            Expr::Join { kind, table, on } => {
                buf.push_str(kind.token());
                buf.push_str(" JOIN ");
                table.render(buf, options)?;
                if let Some(on) = on {
                    buf.push_str(" ON ");
                    on.render(buf, options)?;
                }
            }
            Expr::Assignment { target, value } => {
                target.render(buf, options)?;
                buf.push_str(" = ");
                value.render(buf, options)?;
            }
            Expr::Aliased { expr, alias } => {
                expr.render(buf, options)?;
                buf.push_str(" AS ");
                buf.push_str(alias);
            }
        }
        Ok(())
    }

    /// Render to a fresh string. Convenience for tests and composition.
    pub fn to_sql(&self, options: CompileOptions) -> SqlResult<String> {
        let mut buf = String::new();
        self.render(&mut buf, options)?;
        Ok(buf)
    }
}

/// Convert a value into an [`Expr`]. Plain Rust values become literal
/// constants; use [`Expr::column`] for column references.
pub trait IntoExpr {
    fn into_expr(self) -> Expr;
}

impl IntoExpr for Expr {
    fn into_expr(self) -> Expr {
        self
    }
}

impl IntoExpr for SqlValue {
    fn into_expr(self) -> Expr {
        Expr::Value(self)
    }
}

impl IntoExpr for FunctionCall {
    fn into_expr(self) -> Expr {
        Expr::Function(self)
    }
}

impl IntoExpr for CaseExpr {
    fn into_expr(self) -> Expr {
        Expr::Case(self)
    }
}

impl IntoExpr for bool {
    fn into_expr(self) -> Expr {
        Expr::Value(self.into())
    }
}

impl IntoExpr for i32 {
    fn into_expr(self) -> Expr {
        Expr::Value(self.into())
    }
}

impl IntoExpr for i64 {
    fn into_expr(self) -> Expr {
        Expr::Value(self.into())
    }
}

impl IntoExpr for f64 {
    fn into_expr(self) -> Expr {
        Expr::Value(self.into())
    }
}

impl IntoExpr for &str {
    fn into_expr(self) -> Expr {
        Expr::Value(self.into())
    }
}

impl IntoExpr for String {
    fn into_expr(self) -> Expr {
        Expr::Value(self.into())
    }
}

/// Convert a value into a validated column expression.
///
/// Implemented for `&str` (bare name) and `(&str, &str)` (dataset, name),
/// mirroring how call sites name columns.
pub trait IntoColumn {
    fn into_column(self) -> SqlResult<Expr>;
}

impl IntoColumn for Expr {
    fn into_column(self) -> SqlResult<Expr> {
        Ok(self)
    }
}

impl IntoColumn for &str {
    fn into_column(self) -> SqlResult<Expr> {
        Ok(Expr::Column {
            dataset: None,
            name: validate::not_blank("column", self)?,
            alias: None,
        })
    }
}

impl IntoColumn for String {
    fn into_column(self) -> SqlResult<Expr> {
        self.as_str().into_column()
    }
}

impl IntoColumn for (&str, &str) {
    fn into_column(self) -> SqlResult<Expr> {
        let (dataset, name) = self;
        Ok(Expr::Column {
            dataset: Some(validate::not_blank("dataset", dataset)?),
            name: validate::not_blank("column", name)?,
            alias: None,
        })
    }
}

/// Convert a value into a validated table expression.
///
/// Implemented for `&str` (bare name), `(&str, &str)` (name, alias) and
/// `(&str, &str, &str)` (schema, name, alias).
pub trait IntoTable {
    fn into_table(self) -> SqlResult<Expr>;
}

impl IntoTable for Expr {
    fn into_table(self) -> SqlResult<Expr> {
        Ok(self)
    }
}

impl IntoTable for &str {
    fn into_table(self) -> SqlResult<Expr> {
        Ok(Expr::Table {
            database: None,
            schema: None,
            name: validate::not_blank("table", self)?,
            alias: None,
        })
    }
}

impl IntoTable for String {
    fn into_table(self) -> SqlResult<Expr> {
        self.as_str().into_table()
    }
}

impl IntoTable for (&str, &str) {
    fn into_table(self) -> SqlResult<Expr> {
        let (name, alias) = self;
        Ok(Expr::Table {
            database: None,
            schema: None,
            name: validate::not_blank("table", name)?,
            alias: Some(validate::not_blank("alias", alias)?),
        })
    }
}

impl IntoTable for (&str, &str, &str) {
    fn into_table(self) -> SqlResult<Expr> {
        let (schema, name, alias) = self;
        Ok(Expr::Table {
            database: None,
            schema: Some(validate::not_blank("schema", schema)?),
            name: validate::not_blank("table", name)?,
            alias: Some(validate::not_blank("alias", alias)?),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SqlError;

    fn rendered(expr: &Expr) -> String {
        expr.to_sql(CompileOptions::empty()).unwrap()
    }

    #[test]
    fn column_with_dataset_and_alias() {
        let col = Expr::column(("a", "Name"))
            .unwrap()
            .with_alias("AccountName")
            .unwrap();
        assert_eq!(rendered(&col), "a.Name AS AccountName");
    }

    #[test]
    fn table_with_alias_uses_space() {
        let table = Expr::table(("Accounts", "a")).unwrap();
        assert_eq!(rendered(&table), "Accounts a");
    }

    #[test]
    fn qualified_table_renders_all_parts() {
        let table =
            Expr::qualified_table(Some("crm"), Some("dbo"), "Accounts", Some("a")).unwrap();
        assert_eq!(rendered(&table), "crm.dbo.Accounts a");
    }

    #[test]
    fn text_values_escape_quotes() {
        assert_eq!(rendered(&Expr::value("it's")), "'it''s'");
        assert_eq!(rendered(&Expr::value(SqlValue::Null)), "NULL");
        assert_eq!(rendered(&Expr::value(true)), "TRUE");
    }

    #[test]
    fn non_finite_floats_render_as_null() {
        assert_eq!(rendered(&Expr::value(1.5)), "1.5");
        assert_eq!(rendered(&Expr::value(f64::NAN)), "NULL");
        assert_eq!(rendered(&Expr::value(f64::INFINITY)), "NULL");
        assert_eq!(rendered(&Expr::value(f64::NEG_INFINITY)), "NULL");
    }

    #[test]
    fn list_renders_without_trailing_comma() {
        let list = Expr::list(vec![Expr::value(1), Expr::value(2), Expr::value(3)]).unwrap();
        assert_eq!(rendered(&list), "(1, 2, 3)");
    }

    #[test]
    fn empty_list_is_rejected() {
        assert!(Expr::list(Vec::new()).is_err());
    }

    #[test]
    fn parameter_and_variable_render_with_at() {
        assert_eq!(rendered(&Expr::parameter("Id").unwrap()), "@Id");
        assert_eq!(rendered(&Expr::variable("Count").unwrap()), "@Count");
        assert!(Expr::parameter(" ").is_err());
    }

    #[test]
    fn delegate_appends_text() {
        let expr = Expr::delegate(|buf, _| {
            buf.push_str("NOW()");
            Ok(())
        });
        assert_eq!(rendered(&expr), "NOW()");
    }

    #[test]
    fn delegate_errors_propagate_unmodified() {
        let expr = Expr::delegate(|_, _| Err(SqlError::render("custom failure")));
        assert_eq!(
            expr.to_sql(CompileOptions::empty()).unwrap_err(),
            SqlError::render("custom failure")
        );
    }

    #[test]
    fn subquery_strips_separator_and_keeps_format() {
        let expr = Expr::sub_query_as("SELECT 1", "sub").unwrap();
        let opts = CompileOptions::APPEND_SEPARATOR;
        assert_eq!(expr.to_sql(opts).unwrap(), "(SELECT 1) sub");
    }

    #[test]
    fn function_with_window() {
        let call = func::sum(Expr::column("amount").unwrap())
            .over(WindowSpec::new().partition_by("region"));
        assert_eq!(
            rendered(&call.into_expr()),
            "SUM(amount) OVER (PARTITION BY region)"
        );
    }

    #[test]
    fn blank_function_name_is_rejected() {
        assert!(FunctionCall::new("  ", Vec::new()).is_err());
    }
}
