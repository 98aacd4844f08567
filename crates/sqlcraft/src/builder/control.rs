//! Control-flow and variable statements: IF/ELSEIF/ELSE, DECLARE, SET.

use std::sync::Arc;

use crate::builder::Statement;
use crate::condition::{ChainedCondition, ConditionBuilder, ConditionChain};
use crate::error::{SqlError, SqlResult};
use crate::expr::{Expr, IntoExpr};
use crate::options::CompileOptions;
use crate::validate;

/// One `IF`/`ELSEIF` branch.
#[derive(Debug, Clone)]
struct IfArm {
    condition: ConditionChain,
    body: Vec<Arc<dyn Statement>>,
}

/// An `IF ... THEN ... [ELSEIF ...]* [ELSE ...] END IF` statement.
///
/// Branch bodies are ordered sequences of child statements, each terminated
/// with `;` in the output. Branches render in declaration order.
#[derive(Debug, Clone)]
pub struct IfStatement {
    arms: Vec<IfArm>,
    otherwise: Option<Vec<Arc<dyn Statement>>>,
    error: Option<SqlError>,
}

impl IfStatement {
    pub(crate) fn new(condition: impl FnOnce(ConditionBuilder) -> ChainedCondition) -> Self {
        let mut statement = Self {
            arms: Vec::new(),
            otherwise: None,
            error: None,
        };
        match condition(ConditionBuilder::new()).into_chain() {
            Ok(chain) => statement.arms.push(IfArm {
                condition: chain,
                body: Vec::new(),
            }),
            Err(err) => statement.record(err),
        }
        statement
    }

    /// Append a statement to the currently open branch body.
    pub fn then(mut self, statement: impl Statement + 'static) -> Self {
        let statement: Arc<dyn Statement> = Arc::new(statement);
        if let Some(body) = &mut self.otherwise {
            body.push(statement);
        } else if let Some(arm) = self.arms.last_mut() {
            arm.body.push(statement);
        }
        self
    }

    /// Open an `ELSEIF` branch. Must come before [`IfStatement::otherwise`].
    pub fn else_if(mut self, condition: impl FnOnce(ConditionBuilder) -> ChainedCondition) -> Self {
        if self.otherwise.is_some() {
            self.record(SqlError::invalid_state(
                "ELSEIF cannot follow the ELSE branch",
            ));
            return self;
        }
        match condition(ConditionBuilder::new()).into_chain() {
            Ok(chain) => self.arms.push(IfArm {
                condition: chain,
                body: Vec::new(),
            }),
            Err(err) => self.record(err),
        }
        self
    }

    /// Open the `ELSE` branch; later `then` calls land there.
    pub fn otherwise(mut self) -> Self {
        if self.otherwise.is_some() {
            self.record(SqlError::invalid_state("duplicate ELSE branch"));
            return self;
        }
        self.otherwise = Some(Vec::new());
        self
    }

    fn record(&mut self, err: SqlError) {
        if self.error.is_none() {
            self.error = Some(err);
        }
    }
}

fn render_body(
    buf: &mut String,
    body: &[Arc<dyn Statement>],
    options: CompileOptions,
) -> SqlResult<()> {
    let sep = options.clause_separator();
    for statement in body {
        buf.push_str(sep);
        statement.render_into(buf, options.for_subquery())?;
        buf.push(';');
    }
    Ok(())
}

impl Statement for IfStatement {
    fn render_into(&self, buf: &mut String, options: CompileOptions) -> SqlResult<()> {
        if let Some(err) = &self.error {
            return Err(err.clone());
        }
        for arm in &self.arms {
            if arm.body.is_empty() {
                return Err(SqlError::invalid_state(
                    "every IF/ELSEIF branch requires at least one statement",
                ));
            }
        }
        if let Some(body) = &self.otherwise {
            if body.is_empty() {
                return Err(SqlError::invalid_state(
                    "the ELSE branch requires at least one statement",
                ));
            }
        }
        let sep = options.clause_separator();
        for (i, arm) in self.arms.iter().enumerate() {
            buf.push_str(if i == 0 { "IF " } else { "ELSEIF " });
            arm.condition.render(buf, options)?;
            buf.push_str(" THEN");
            render_body(buf, &arm.body, options)?;
            buf.push_str(sep);
        }
        if let Some(body) = &self.otherwise {
            buf.push_str("ELSE");
            render_body(buf, body, options)?;
            buf.push_str(sep);
        }
        buf.push_str("END IF");
        Ok(())
    }
}

/// `DECLARE @name TYPE [= default]`.
#[derive(Debug, Clone)]
pub struct Declare {
    name: String,
    ty: String,
    default: Option<Expr>,
    error: Option<SqlError>,
}

impl Declare {
    pub(crate) fn new(name: impl Into<String>, ty: impl Into<String>) -> Self {
        let mut error = None;
        let name = validate::not_blank("name", name).unwrap_or_else(|err| {
            error = Some(err);
            String::new()
        });
        let ty = validate::not_blank("type", ty).unwrap_or_else(|err| {
            error.get_or_insert(err);
            String::new()
        });
        Self {
            name,
            ty,
            default: None,
            error,
        }
    }

    /// Initialize the variable in the declaration.
    pub fn default_value(mut self, value: impl IntoExpr) -> Self {
        self.default = Some(value.into_expr());
        self
    }
}

impl Statement for Declare {
    fn render_into(&self, buf: &mut String, options: CompileOptions) -> SqlResult<()> {
        if let Some(err) = &self.error {
            return Err(err.clone());
        }
        buf.push_str("DECLARE @");
        buf.push_str(&self.name);
        buf.push(' ');
        buf.push_str(&self.ty);
        if let Some(default) = &self.default {
            buf.push_str(" = ");
            default.render(buf, options)?;
        }
        Ok(())
    }
}

/// `SET @name = value`.
#[derive(Debug, Clone)]
pub struct SetVariable {
    name: String,
    value: Expr,
    error: Option<SqlError>,
}

impl SetVariable {
    pub(crate) fn new(name: impl Into<String>, value: impl IntoExpr) -> Self {
        let mut error = None;
        let name = validate::not_blank("name", name).unwrap_or_else(|err| {
            error = Some(err);
            String::new()
        });
        Self {
            name,
            value: value.into_expr(),
            error,
        }
    }
}

impl Statement for SetVariable {
    fn render_into(&self, buf: &mut String, options: CompileOptions) -> SqlResult<()> {
        if let Some(err) = &self.error {
            return Err(err.clone());
        }
        buf.push_str("SET @");
        buf.push_str(&self.name);
        buf.push_str(" = ");
        self.value.render(buf, options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::{declare, if_then, set_var, update};

    #[test]
    fn declare_with_default() {
        let statement = declare("Total", "INT").default_value(0);
        assert_eq!(
            statement.build(CompileOptions::empty()).unwrap(),
            "DECLARE @Total INT = 0"
        );
    }

    #[test]
    fn declare_blank_name_fails() {
        assert!(declare(" ", "INT").build(CompileOptions::empty()).is_err());
    }

    #[test]
    fn set_variable_renders_expression() {
        let statement = set_var("Total", Expr::raw("@Total + 1"));
        assert_eq!(
            statement.build(CompileOptions::empty()).unwrap(),
            "SET @Total = @Total + 1"
        );
    }

    #[test]
    fn if_else_chain_renders_in_declaration_order() {
        let statement = if_then(|c| c.expression(Expr::variable("Count").unwrap()).greater_than(10))
            .then(update("T").set("Big", true))
            .else_if(|c| c.expression(Expr::variable("Count").unwrap()).greater_than(5))
            .then(update("T").set("Medium", true))
            .otherwise()
            .then(update("T").set("Small", true));
        assert_eq!(
            statement.build(CompileOptions::empty()).unwrap(),
            "IF @Count > 10 THEN UPDATE T SET Big = TRUE; \
             ELSEIF @Count > 5 THEN UPDATE T SET Medium = TRUE; \
             ELSE UPDATE T SET Small = TRUE; END IF"
        );
    }

    #[test]
    fn empty_branch_is_rejected() {
        let statement = if_then(|c| c.value(1).equal_to(1));
        assert!(statement.build(CompileOptions::empty()).is_err());
    }

    #[test]
    fn empty_else_branch_is_rejected() {
        let statement = if_then(|c| c.value(1).equal_to(1))
            .then(update("T").set("a", 1))
            .otherwise();
        assert!(statement.build(CompileOptions::empty()).is_err());
    }

    #[test]
    fn else_if_after_else_is_rejected() {
        let statement = if_then(|c| c.value(1).equal_to(1))
            .then(update("T").set("a", 1))
            .otherwise()
            .then(update("T").set("b", 2))
            .else_if(|c| c.value(2).equal_to(2))
            .then(update("T").set("c", 3));
        assert!(statement.build(CompileOptions::empty()).is_err());
    }
}
