//! CASE expressions (simple and searched).

use crate::condition::{ChainedCondition, ConditionBuilder};
use crate::error::{SqlError, SqlResult};
use crate::expr::{Expr, IntoExpr};
use crate::options::CompileOptions;

/// One `WHEN ... THEN ...` arm.
#[derive(Debug, Clone)]
pub(crate) struct CaseArm {
    when: Expr,
    then: Expr,
}

/// A complete, renderable CASE expression.
///
/// Arms render in insertion order: `CASE [subject] WHEN w THEN t ...
/// [ELSE e] END`.
#[derive(Debug, Clone)]
pub struct CaseExpr {
    subject: Option<Box<Expr>>,
    arms: Vec<CaseArm>,
    otherwise: Option<Box<Expr>>,
}

impl CaseExpr {
    pub(crate) fn render(&self, buf: &mut String, options: CompileOptions) -> SqlResult<()> {
        buf.push_str("CASE");
        if let Some(subject) = &self.subject {
            buf.push(' ');
            subject.render(buf, options)?;
        }
        for arm in &self.arms {
            buf.push_str(" WHEN ");
            arm.when.render(buf, options)?;
            buf.push_str(" THEN ");
            arm.then.render(buf, options)?;
        }
        if let Some(otherwise) = &self.otherwise {
            buf.push_str(" ELSE ");
            otherwise.render(buf, options)?;
        }
        buf.push_str(" END");
        Ok(())
    }
}

/// Fluent CASE builder.
///
/// ```ignore
/// let expr = Case::searched()
///     .when(|c| c.column("Age").greater_or_equal(18))
///     .then("adult")
///     .otherwise("minor")
///     .end()?;
/// ```
#[derive(Debug)]
pub struct Case {
    subject: Option<Expr>,
    arms: Vec<CaseArm>,
    otherwise: Option<Expr>,
    error: Option<SqlError>,
}

impl Case {
    /// A searched CASE: each WHEN is a condition.
    pub fn searched() -> Self {
        Self {
            subject: None,
            arms: Vec::new(),
            otherwise: None,
            error: None,
        }
    }

    /// A simple CASE over a subject: each WHEN is a value.
    pub fn of(subject: impl IntoExpr) -> Self {
        Self {
            subject: Some(subject.into_expr()),
            arms: Vec::new(),
            otherwise: None,
            error: None,
        }
    }

    /// Start a searched WHEN arm.
    pub fn when(
        mut self,
        condition: impl FnOnce(ConditionBuilder) -> ChainedCondition,
    ) -> CaseWhen {
        let when = match condition(ConditionBuilder::new()).into_chain() {
            Ok(chain) => Expr::Condition(chain),
            Err(err) => {
                self.record(err);
                Expr::Raw(String::new())
            }
        };
        CaseWhen { case: self, when }
    }

    /// Start a simple WHEN arm comparing the subject against a value.
    pub fn when_value(self, value: impl IntoExpr) -> CaseWhen {
        let when = value.into_expr();
        CaseWhen { case: self, when }
    }

    /// Set the ELSE result.
    pub fn otherwise(mut self, value: impl IntoExpr) -> Self {
        self.otherwise = Some(value.into_expr());
        self
    }

    /// Finish the builder. Fails when no arm was added or an earlier fluent
    /// call recorded an error.
    pub fn end(self) -> SqlResult<CaseExpr> {
        if let Some(err) = self.error {
            return Err(err);
        }
        if self.arms.is_empty() {
            return Err(SqlError::invalid_state(
                "CASE expression requires at least one WHEN arm",
            ));
        }
        Ok(CaseExpr {
            subject: self.subject.map(Box::new),
            arms: self.arms,
            otherwise: self.otherwise.map(Box::new),
        })
    }

    fn record(&mut self, err: SqlError) {
        if self.error.is_none() {
            self.error = Some(err);
        }
    }
}

/// A WHEN arm awaiting its THEN result.
#[derive(Debug)]
pub struct CaseWhen {
    case: Case,
    when: Expr,
}

impl CaseWhen {
    /// Supply the result for this arm and return to the CASE builder.
    pub fn then(self, value: impl IntoExpr) -> Case {
        let mut case = self.case;
        case.arms.push(CaseArm {
            when: self.when,
            then: value.into_expr(),
        });
        case
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::SqlValue;

    fn rendered(case: CaseExpr) -> String {
        let mut buf = String::new();
        case.render(&mut buf, CompileOptions::empty()).unwrap();
        buf
    }

    #[test]
    fn searched_case_renders_arms_in_order() {
        let case = Case::searched()
            .when(|c| c.column("Age").greater_or_equal(18))
            .then("adult")
            .when(|c| c.column("Age").greater_or_equal(13))
            .then("teen")
            .otherwise("child")
            .end()
            .unwrap();
        assert_eq!(
            rendered(case),
            "CASE WHEN Age >= 18 THEN 'adult' WHEN Age >= 13 THEN 'teen' ELSE 'child' END"
        );
    }

    #[test]
    fn simple_case_renders_subject() {
        let case = Case::of(Expr::Column {
            dataset: None,
            name: "Status".to_string(),
            alias: None,
        })
        .when_value(1)
        .then("active")
        .when_value(SqlValue::Int(2))
        .then("disabled")
        .end()
        .unwrap();
        assert_eq!(
            rendered(case),
            "CASE Status WHEN 1 THEN 'active' WHEN 2 THEN 'disabled' END"
        );
    }

    #[test]
    fn case_without_arms_fails_to_finish() {
        assert!(Case::searched().otherwise(0).end().is_err());
    }
}
