//! Multi-statement scripts.

use std::sync::Arc;

use crate::builder::Statement;
use crate::error::{SqlError, SqlResult};
use crate::options::CompileOptions;
use crate::validate;

/// One script entry: a child statement or a verbatim fragment, with the
/// terminator decision attached.
#[derive(Debug, Clone)]
enum ScriptItem {
    Statement {
        statement: Arc<dyn Statement>,
        full: bool,
    },
    Raw(String),
}

/// An ordered sequence of statements rendered as one script.
///
/// Items tagged as full statements get a `;` terminator right after them;
/// fragments are emitted as-is. The script manages its own terminators, so
/// [`CompileOptions::APPEND_SEPARATOR`] is a no-op at this level.
#[derive(Debug, Clone)]
pub struct MultiStatement {
    items: Vec<ScriptItem>,
    error: Option<SqlError>,
}

impl MultiStatement {
    pub(crate) fn new() -> Self {
        Self {
            items: Vec::new(),
            error: None,
        }
    }

    /// Append a full statement; a terminator follows it in the output.
    pub fn statement(mut self, statement: impl Statement + 'static) -> Self {
        self.items.push(ScriptItem::Statement {
            statement: Arc::new(statement),
            full: true,
        });
        self
    }

    /// Append a statement rendered without a terminator, for callers gluing
    /// fragments themselves.
    pub fn fragment(mut self, statement: impl Statement + 'static) -> Self {
        self.items.push(ScriptItem::Statement {
            statement: Arc::new(statement),
            full: false,
        });
        self
    }

    /// Append verbatim text.
    pub fn raw(mut self, sql: impl Into<String>) -> Self {
        match validate::not_blank("sql", sql) {
            Ok(sql) => self.items.push(ScriptItem::Raw(sql)),
            Err(err) => {
                if self.error.is_none() {
                    self.error = Some(err);
                }
            }
        }
        self
    }

    /// Number of script entries.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// `true` when no entries were added.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl Statement for MultiStatement {
    fn render_into(&self, buf: &mut String, options: CompileOptions) -> SqlResult<()> {
        if let Some(err) = &self.error {
            return Err(err.clone());
        }
        if self.items.is_empty() {
            return Err(SqlError::invalid_state("script contains no statements"));
        }
        let sep = options.clause_separator();
        for (i, item) in self.items.iter().enumerate() {
            if i > 0 {
                buf.push_str(sep);
            }
            match item {
                ScriptItem::Statement { statement, full } => {
                    statement.render_into(buf, options.for_subquery())?;
                    if *full {
                        buf.push(';');
                    }
                }
                ScriptItem::Raw(sql) => buf.push_str(sql),
            }
        }
        Ok(())
    }

    fn build_into(&self, buf: &mut String, options: CompileOptions) -> SqlResult<()> {
        // Terminators are per-item; never append another at the end.
        self.render_into(buf, options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::{declare, multi, select_from, set_var, update};
    use crate::expr::Expr;

    #[test]
    fn statements_are_terminated_in_order() {
        let script = multi()
            .statement(declare("Total", "INT").default_value(0))
            .statement(set_var("Total", Expr::raw("@Total + 1")))
            .statement(update("T").set_expr("Count", Expr::variable("Total").unwrap()));
        assert_eq!(
            script.build(CompileOptions::empty()).unwrap(),
            "DECLARE @Total INT = 0; SET @Total = @Total + 1; \
             UPDATE T SET Count = @Total"
        );
    }

    #[test]
    fn fragments_skip_the_terminator() {
        let script = multi().raw("-- cleanup").statement(select_from("T"));
        assert_eq!(
            script.build(CompileOptions::empty()).unwrap(),
            "-- cleanup SELECT * FROM T;"
        );
    }

    #[test]
    fn append_separator_does_not_double_terminate() {
        let script = multi().statement(select_from("T"));
        assert_eq!(
            script.build(CompileOptions::APPEND_SEPARATOR).unwrap(),
            "SELECT * FROM T;"
        );
    }

    #[test]
    fn format_puts_statements_on_their_own_lines() {
        let script = multi()
            .statement(select_from("A"))
            .statement(select_from("B"));
        assert_eq!(
            script.build(CompileOptions::FORMAT).unwrap(),
            "SELECT * FROM A;\nSELECT * FROM B;"
        );
    }

    #[test]
    fn empty_script_is_rejected() {
        let script = multi();
        assert!(script.build(CompileOptions::empty()).is_err());
    }
}
