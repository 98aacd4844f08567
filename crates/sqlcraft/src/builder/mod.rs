//! Statement builders and their shared [`Statement`] trait.
//!
//! Entry points are free functions: [`select`], [`insert`], [`update`],
//! [`delete`], [`if_then`], [`declare`], [`set_var`], [`multi`]. Each
//! builder owns one positioned expression store keyed by its own clause
//! enum, an alias registry where typed sugar applies, and a deferred error
//! slot: the first invalid fluent argument is recorded without touching the
//! store, and `build()` surfaces it.

mod control;
mod delete;
mod insert;
mod multi;
mod select;
mod update;

pub use control::{Declare, IfStatement, SetVariable};
pub use delete::{Delete, DeletePosition};
pub use insert::{Insert, InsertPosition};
pub use multi::MultiStatement;
pub use select::{Select, SelectPosition};
pub use update::{Update, UpdatePosition};

use std::fmt;

use crate::condition::{ChainedCondition, ConditionBuilder};
use crate::error::SqlResult;
use crate::expr::{IntoExpr, IntoTable};
use crate::options::CompileOptions;

/// A renderable SQL statement.
///
/// Object-safe so finished builders can be boxed behind `Arc<dyn Statement>`
/// inside sub-queries, IF bodies and multi-statement scripts.
pub trait Statement: fmt::Debug + Send + Sync {
    /// Append this statement's SQL to `buf`, without a trailing separator.
    fn render_into(&self, buf: &mut String, options: CompileOptions) -> SqlResult<()>;

    /// Render to a fresh string, appending the separator when
    /// [`CompileOptions::APPEND_SEPARATOR`] is set.
    ///
    /// Idempotent: repeated calls on the same builder produce identical
    /// output and never mutate the builder.
    fn build(&self, options: CompileOptions) -> SqlResult<String> {
        let mut buf = String::new();
        self.build_into(&mut buf, options)?;
        #[cfg(feature = "tracing")]
        tracing::trace!(len = buf.len(), "built statement");
        Ok(buf)
    }

    /// Append the full statement (separator included when requested) to an
    /// existing buffer, for composing scripts by hand.
    fn build_into(&self, buf: &mut String, options: CompileOptions) -> SqlResult<()> {
        self.render_into(buf, options)?;
        if options.contains(CompileOptions::APPEND_SEPARATOR) {
            buf.push(';');
        }
        Ok(())
    }
}

/// Start an empty SELECT.
pub fn select() -> Select {
    Select::new()
}

/// Start a SELECT with its FROM table already set.
pub fn select_from(table: impl IntoTable) -> Select {
    Select::new().from(table)
}

/// Start an INSERT into `table`.
pub fn insert(table: impl IntoTable) -> Insert {
    Insert::new(table)
}

/// Start an UPDATE of `table`.
pub fn update(table: impl IntoTable) -> Update {
    Update::new(table)
}

/// Start a DELETE from `table`.
pub fn delete(table: impl IntoTable) -> Delete {
    Delete::new(table)
}

/// Start an IF statement with its first condition.
pub fn if_then(condition: impl FnOnce(ConditionBuilder) -> ChainedCondition) -> IfStatement {
    IfStatement::new(condition)
}

/// `DECLARE @name TYPE`.
pub fn declare(name: impl Into<String>, ty: impl Into<String>) -> Declare {
    Declare::new(name, ty)
}

/// `SET @name = value`.
pub fn set_var(name: impl Into<String>, value: impl IntoExpr) -> SetVariable {
    SetVariable::new(name, value)
}

/// Start an empty multi-statement script.
pub fn multi() -> MultiStatement {
    MultiStatement::new()
}
