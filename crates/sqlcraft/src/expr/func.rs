//! Shorthand constructors for common SQL functions and aggregates.
//!
//! Each returns a [`FunctionCall`] so callers can attach an `OVER (...)`
//! window with [`FunctionCall::over`].

use crate::expr::{Expr, FunctionCall, IntoExpr};

/// `COUNT(expr)`
pub fn count(expr: impl IntoExpr) -> FunctionCall {
    FunctionCall::fixed("COUNT", vec![expr.into_expr()])
}

/// `COUNT(*)`
pub fn count_all() -> FunctionCall {
    FunctionCall::fixed("COUNT", vec![Expr::Raw("*".to_string())])
}

/// `SUM(expr)`
pub fn sum(expr: impl IntoExpr) -> FunctionCall {
    FunctionCall::fixed("SUM", vec![expr.into_expr()])
}

/// `AVG(expr)`
pub fn avg(expr: impl IntoExpr) -> FunctionCall {
    FunctionCall::fixed("AVG", vec![expr.into_expr()])
}

/// `MIN(expr)`
pub fn min(expr: impl IntoExpr) -> FunctionCall {
    FunctionCall::fixed("MIN", vec![expr.into_expr()])
}

/// `MAX(expr)`
pub fn max(expr: impl IntoExpr) -> FunctionCall {
    FunctionCall::fixed("MAX", vec![expr.into_expr()])
}

/// `COALESCE(a, b, ...)`
pub fn coalesce(exprs: Vec<Expr>) -> FunctionCall {
    FunctionCall::fixed("COALESCE", exprs)
}

/// `ROW_NUMBER()`
pub fn row_number() -> FunctionCall {
    FunctionCall::fixed("ROW_NUMBER", Vec::new())
}

/// `RANK()`
pub fn rank() -> FunctionCall {
    FunctionCall::fixed("RANK", Vec::new())
}

/// `DENSE_RANK()`
pub fn dense_rank() -> FunctionCall {
    FunctionCall::fixed("DENSE_RANK", Vec::new())
}
