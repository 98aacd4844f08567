//! Condition chains and their typed fluent builder.
//!
//! The builder moves through three by-value states so only grammatical
//! chains can be written: [`ConditionBuilder`] (expects a left-hand side),
//! [`ComparisonBuilder`] (expects an operator), [`ChainedCondition`]
//! (complete; expects `and`/`or` or the end of the chain). An invalid
//! argument records a deferred error instead of extending the chain, and
//! the error surfaces when the chain is finished.

use crate::error::{SqlError, SqlResult};
use crate::expr::{
    CompareOp, Expr, IntoColumn, IntoExpr, IntoQuerySource, LogicOp, QuerySource, SqlValue,
};
use crate::options::CompileOptions;
use crate::validate::{self, InclusiveRange};

/// The predicate kinds a chain node can hold.
#[derive(Debug, Clone)]
enum Predicate {
    Compare {
        left: Expr,
        op: CompareOp,
        right: Expr,
    },
    Between {
        left: Expr,
        negated: bool,
        low: Expr,
        high: Expr,
    },
    NullCheck {
        left: Expr,
        negated: bool,
    },
    Exists {
        negated: bool,
        source: QuerySource,
    },
    Group(ConditionChain),
    Full(String),
}

impl Predicate {
    fn render(&self, buf: &mut String, options: CompileOptions) -> SqlResult<()> {
        match self {
            Predicate::Compare { left, op, right } => {
                left.render(buf, options)?;
                buf.push(' ');
                buf.push_str(op.token());
                buf.push(' ');
                right.render(buf, options)?;
            }
            Predicate::Between {
                left,
                negated,
                low,
                high,
            } => {
                left.render(buf, options)?;
                buf.push_str(if *negated { " NOT BETWEEN " } else { " BETWEEN " });
                low.render(buf, options)?;
                buf.push_str(" AND ");
                high.render(buf, options)?;
            }
            Predicate::NullCheck { left, negated } => {
                left.render(buf, options)?;
                buf.push_str(if *negated { " IS NOT NULL" } else { " IS NULL" });
            }
            Predicate::Exists { negated, source } => {
                buf.push_str(if *negated { "NOT EXISTS (" } else { "EXISTS (" });
                source.render(buf, options.for_subquery())?;
                buf.push(')');
            }
            Predicate::Group(chain) => {
                buf.push('(');
                chain.render(buf, options)?;
                buf.push(')');
            }
            Predicate::Full(sql) => buf.push_str(sql),
        }
        Ok(())
    }
}

/// One condition with the logic operator linking it to the previous one.
#[derive(Debug, Clone)]
struct ConditionNode {
    link: Option<LogicOp>,
    negated: bool,
    predicate: Predicate,
}

/// A finished chain of conditions joined by AND/OR, rendered left to right
/// in the order the fluent calls were made.
#[derive(Debug, Clone)]
pub struct ConditionChain {
    nodes: Vec<ConditionNode>,
}

impl ConditionChain {
    /// `true` when the chain holds no conditions.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// `true` when any top-level node links with OR. Such a chain must be
    /// parenthesized before it is ANDed with another chain, or the OR would
    /// leak into the surrounding precedence.
    pub(crate) fn has_or_link(&self) -> bool {
        self.nodes.iter().any(|n| n.link == Some(LogicOp::Or))
    }

    pub(crate) fn render(&self, buf: &mut String, options: CompileOptions) -> SqlResult<()> {
        for node in &self.nodes {
            if let Some(link) = node.link {
                buf.push(' ');
                buf.push_str(link.token());
                buf.push(' ');
            }
            if node.negated {
                buf.push_str("NOT ");
            }
            node.predicate.render(buf, options)?;
        }
        Ok(())
    }
}

/// Start of a condition chain, or the state after `and()`/`or()`: the next
/// call supplies a left-hand side.
#[derive(Debug)]
pub struct ConditionBuilder {
    nodes: Vec<ConditionNode>,
    pending_link: Option<LogicOp>,
    pending_not: bool,
    error: Option<SqlError>,
}

impl ConditionBuilder {
    /// Start an empty chain.
    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            pending_link: None,
            pending_not: false,
            error: None,
        }
    }

    /// Negate the next condition. Toggles, so `not().not()` cancels out.
    pub fn not(mut self) -> Self {
        self.pending_not = !self.pending_not;
        self
    }

    /// Compare a column.
    pub fn column(mut self, column: impl IntoColumn) -> ComparisonBuilder {
        let left = match column.into_column() {
            Ok(expr) => expr,
            Err(err) => {
                self.record(err);
                Expr::Raw(String::new())
            }
        };
        ComparisonBuilder {
            builder: self,
            left,
        }
    }

    /// Compare a literal value.
    pub fn value(self, value: impl Into<SqlValue>) -> ComparisonBuilder {
        let left = Expr::Value(value.into());
        ComparisonBuilder {
            builder: self,
            left,
        }
    }

    /// Compare an arbitrary expression.
    pub fn expression(self, expr: impl IntoExpr) -> ComparisonBuilder {
        let left = expr.into_expr();
        ComparisonBuilder {
            builder: self,
            left,
        }
    }

    /// Append a verbatim condition.
    pub fn raw(mut self, sql: impl Into<String>) -> ChainedCondition {
        match validate::not_blank("condition", sql) {
            Ok(sql) => self.push(Predicate::Full(sql)),
            Err(err) => self.record(err),
        }
        ChainedCondition { builder: self }
    }

    /// Append a parenthesized sub-chain built by `inner`.
    pub fn group(
        mut self,
        inner: impl FnOnce(ConditionBuilder) -> ChainedCondition,
    ) -> ChainedCondition {
        match inner(ConditionBuilder::new()).into_chain() {
            Ok(chain) => self.push(Predicate::Group(chain)),
            Err(err) => self.record(err),
        }
        ChainedCondition { builder: self }
    }

    /// Append `EXISTS (<source>)`.
    pub fn exists(mut self, source: impl IntoQuerySource) -> ChainedCondition {
        self.push(Predicate::Exists {
            negated: false,
            source: source.into_query_source(),
        });
        ChainedCondition { builder: self }
    }

    /// Append `NOT EXISTS (<source>)`.
    pub fn not_exists(mut self, source: impl IntoQuerySource) -> ChainedCondition {
        self.push(Predicate::Exists {
            negated: true,
            source: source.into_query_source(),
        });
        ChainedCondition { builder: self }
    }

    fn push(&mut self, predicate: Predicate) {
        let link = if self.nodes.is_empty() {
            None
        } else {
            // `new()` and `and()`/`or()` are the only entry points, so a
            // non-first node always has a pending operator.
            Some(self.pending_link.take().unwrap_or(LogicOp::And))
        };
        self.nodes.push(ConditionNode {
            link,
            negated: std::mem::take(&mut self.pending_not),
            predicate,
        });
    }

    fn record(&mut self, err: SqlError) {
        self.pending_link = None;
        self.pending_not = false;
        if self.error.is_none() {
            self.error = Some(err);
        }
    }
}

impl Default for ConditionBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A left-hand side awaiting its operator.
#[derive(Debug)]
pub struct ComparisonBuilder {
    builder: ConditionBuilder,
    left: Expr,
}

impl ComparisonBuilder {
    /// `left = value`
    pub fn equal_to(self, value: impl IntoExpr) -> ChainedCondition {
        self.compare_to(CompareOp::Equal, value)
    }

    /// `left <> value`
    pub fn not_equal_to(self, value: impl IntoExpr) -> ChainedCondition {
        self.compare_to(CompareOp::NotEqual, value)
    }

    /// `left > value`
    pub fn greater_than(self, value: impl IntoExpr) -> ChainedCondition {
        self.compare_to(CompareOp::Greater, value)
    }

    /// `left >= value`
    pub fn greater_or_equal(self, value: impl IntoExpr) -> ChainedCondition {
        self.compare_to(CompareOp::GreaterOrEqual, value)
    }

    /// `left < value`
    pub fn less_than(self, value: impl IntoExpr) -> ChainedCondition {
        self.compare_to(CompareOp::Less, value)
    }

    /// `left <= value`
    pub fn less_or_equal(self, value: impl IntoExpr) -> ChainedCondition {
        self.compare_to(CompareOp::LessOrEqual, value)
    }

    /// Compare with an explicit operator. The escape hatch behind the named
    /// shorthands.
    pub fn compare_to(mut self, op: CompareOp, value: impl IntoExpr) -> ChainedCondition {
        self.push_compare(op, value.into_expr());
        ChainedCondition {
            builder: self.builder,
        }
    }

    /// `left = <column>` where the right side is a column reference, not a
    /// literal.
    pub fn equal_to_column(self, column: impl IntoColumn) -> ChainedCondition {
        self.compare_to_column(CompareOp::Equal, column)
    }

    /// Compare against a column with an explicit operator.
    pub fn compare_to_column(
        mut self,
        op: CompareOp,
        column: impl IntoColumn,
    ) -> ChainedCondition {
        match column.into_column() {
            Ok(right) => self.push_compare(op, right),
            Err(err) => self.builder.record(err),
        }
        ChainedCondition {
            builder: self.builder,
        }
    }

    /// `left LIKE pattern`
    pub fn like(mut self, pattern: impl Into<String>) -> ChainedCondition {
        match validate::not_blank("pattern", pattern) {
            Ok(pattern) => self.push_compare(CompareOp::Like, Expr::value(pattern)),
            Err(err) => self.builder.record(err),
        }
        ChainedCondition {
            builder: self.builder,
        }
    }

    /// `left NOT LIKE pattern`
    pub fn not_like(mut self, pattern: impl Into<String>) -> ChainedCondition {
        match validate::not_blank("pattern", pattern) {
            Ok(pattern) => self.push_compare(CompareOp::NotLike, Expr::value(pattern)),
            Err(err) => self.builder.record(err),
        }
        ChainedCondition {
            builder: self.builder,
        }
    }

    /// `left IS NULL`
    pub fn is_null(mut self) -> ChainedCondition {
        let left = self.take_left();
        self.builder.push(Predicate::NullCheck {
            left,
            negated: false,
        });
        ChainedCondition {
            builder: self.builder,
        }
    }

    /// `left IS NOT NULL`
    pub fn is_not_null(mut self) -> ChainedCondition {
        let left = self.take_left();
        self.builder.push(Predicate::NullCheck {
            left,
            negated: true,
        });
        ChainedCondition {
            builder: self.builder,
        }
    }

    /// `left IN (v1, v2, ...)` over literal values; rejects an empty set.
    pub fn in_values<T: IntoExpr>(self, values: impl IntoIterator<Item = T>) -> ChainedCondition {
        self.values_list(CompareOp::In, values)
    }

    /// `left NOT IN (v1, v2, ...)`; rejects an empty set.
    pub fn not_in_values<T: IntoExpr>(
        self,
        values: impl IntoIterator<Item = T>,
    ) -> ChainedCondition {
        self.values_list(CompareOp::NotIn, values)
    }

    /// `left IN (<sub-query>)`
    pub fn in_query(mut self, source: impl IntoQuerySource) -> ChainedCondition {
        self.push_compare(CompareOp::In, Expr::sub_query(source));
        ChainedCondition {
            builder: self.builder,
        }
    }

    /// `left BETWEEN min AND max`; an inverted range is rejected.
    pub fn between<T>(self, min: T, max: T) -> ChainedCondition
    where
        T: PartialOrd + Copy + std::fmt::Debug + Into<SqlValue>,
    {
        self.range(false, min, max)
    }

    /// `left NOT BETWEEN min AND max`; an inverted range is rejected.
    pub fn not_between<T>(self, min: T, max: T) -> ChainedCondition
    where
        T: PartialOrd + Copy + std::fmt::Debug + Into<SqlValue>,
    {
        self.range(true, min, max)
    }

    fn range<T>(mut self, negated: bool, min: T, max: T) -> ChainedCondition
    where
        T: PartialOrd + Copy + std::fmt::Debug + Into<SqlValue>,
    {
        match InclusiveRange::new(min, max) {
            Ok(range) => {
                let (low, high) = range.into_bounds();
                let left = self.take_left();
                self.builder.push(Predicate::Between {
                    left,
                    negated,
                    low: Expr::value(low),
                    high: Expr::value(high),
                });
            }
            Err(err) => self.builder.record(err),
        }
        ChainedCondition {
            builder: self.builder,
        }
    }

    fn values_list<T: IntoExpr>(
        mut self,
        op: CompareOp,
        values: impl IntoIterator<Item = T>,
    ) -> ChainedCondition {
        let items: Vec<Expr> = values.into_iter().map(IntoExpr::into_expr).collect();
        match Expr::list(items) {
            Ok(list) => self.push_compare(op, list),
            Err(err) => self.builder.record(err),
        }
        ChainedCondition {
            builder: self.builder,
        }
    }

    fn push_compare(&mut self, op: CompareOp, right: Expr) {
        let left = self.take_left();
        self.builder.push(Predicate::Compare { left, op, right });
    }

    fn take_left(&mut self) -> Expr {
        std::mem::replace(&mut self.left, Expr::Raw(String::new()))
    }
}

/// A complete chain; extend it with `and()`/`or()` or hand it back to the
/// statement builder.
#[derive(Debug)]
pub struct ChainedCondition {
    builder: ConditionBuilder,
}

impl ChainedCondition {
    /// Continue the chain with AND.
    pub fn and(mut self) -> ConditionBuilder {
        self.builder.pending_link = Some(LogicOp::And);
        self.builder
    }

    /// Continue the chain with OR.
    pub fn or(mut self) -> ConditionBuilder {
        self.builder.pending_link = Some(LogicOp::Or);
        self.builder
    }

    /// Finish the chain, surfacing any deferred argument error.
    pub fn into_chain(self) -> SqlResult<ConditionChain> {
        if let Some(err) = self.builder.error {
            return Err(err);
        }
        Ok(ConditionChain {
            nodes: self.builder.nodes,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rendered(chained: ChainedCondition) -> String {
        let chain = chained.into_chain().unwrap();
        let mut buf = String::new();
        chain.render(&mut buf, CompileOptions::empty()).unwrap();
        buf
    }

    #[test]
    fn chain_renders_in_call_order() {
        let sql = rendered(
            ConditionBuilder::new()
                .column("Age")
                .greater_than(18)
                .and()
                .column("Name")
                .like("A%")
                .or()
                .column("Vip")
                .equal_to(true),
        );
        assert_eq!(sql, "Age > 18 AND Name LIKE 'A%' OR Vip = TRUE");
    }

    #[test]
    fn group_parenthesizes_sub_chain() {
        let sql = rendered(
            ConditionBuilder::new()
                .group(|c| c.column("a").equal_to(1).or().column("b").equal_to(2))
                .and()
                .column("c")
                .equal_to(3),
        );
        assert_eq!(sql, "(a = 1 OR b = 2) AND c = 3");
    }

    #[test]
    fn not_negates_the_next_condition_only() {
        let sql = rendered(
            ConditionBuilder::new()
                .not()
                .group(|c| c.column("a").equal_to(1).or().column("b").equal_to(2))
                .and()
                .column("c")
                .equal_to(3),
        );
        assert_eq!(sql, "NOT (a = 1 OR b = 2) AND c = 3");
    }

    #[test]
    fn double_not_cancels() {
        let sql = rendered(ConditionBuilder::new().not().not().column("a").equal_to(1));
        assert_eq!(sql, "a = 1");
    }

    #[test]
    fn column_to_column_comparison() {
        let sql = rendered(
            ConditionBuilder::new()
                .column(("a", "Id"))
                .equal_to_column(("b", "AccountId")),
        );
        assert_eq!(sql, "a.Id = b.AccountId");
    }

    #[test]
    fn null_tests_use_is() {
        let sql = rendered(
            ConditionBuilder::new()
                .column("DeletedAt")
                .is_null()
                .and()
                .column("Email")
                .is_not_null(),
        );
        assert_eq!(sql, "DeletedAt IS NULL AND Email IS NOT NULL");
    }

    #[test]
    fn in_values_renders_list() {
        let sql = rendered(ConditionBuilder::new().column("Id").in_values([1, 2, 3]));
        assert_eq!(sql, "Id IN (1, 2, 3)");
    }

    #[test]
    fn empty_in_set_is_rejected() {
        let result = ConditionBuilder::new()
            .column("Id")
            .in_values(Vec::<i32>::new())
            .into_chain();
        assert!(result.is_err());
    }

    #[test]
    fn between_renders_bounds() {
        let sql = rendered(ConditionBuilder::new().column("Age").between(18, 65));
        assert_eq!(sql, "Age BETWEEN 18 AND 65");
    }

    #[test]
    fn inverted_between_surfaces_at_finish() {
        let result = ConditionBuilder::new()
            .column("Age")
            .between(65, 18)
            .into_chain();
        let err = result.unwrap_err();
        assert!(err.is_invalid_argument());
    }

    #[test]
    fn blank_column_is_deferred_not_panicked() {
        let result = ConditionBuilder::new().column(" ").equal_to(1).into_chain();
        assert!(result.is_err());
    }

    #[test]
    fn value_on_the_left_side() {
        let sql = rendered(ConditionBuilder::new().value(1).equal_to(1));
        assert_eq!(sql, "1 = 1");
    }

    #[test]
    fn exists_wraps_source_in_parens() {
        let sql = rendered(ConditionBuilder::new().not_exists("SELECT 1"));
        assert_eq!(sql, "NOT EXISTS (SELECT 1)");
    }
}
