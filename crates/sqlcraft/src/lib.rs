//! # sqlcraft
//!
//! Fluent statement builders that compile a tree of SQL expression nodes
//! into deterministic SQL text. Pure in-memory transformation: no
//! execution, no driver binding, no parsing.
//!
//! ## Features
//!
//! - **Fluent builders**: SELECT / INSERT / UPDATE / DELETE, IF scripts,
//!   variables and multi-statement scripts
//! - **Typed chains**: illegal call sequences are unrepresentable; each
//!   builder phase only exposes the next legal operations
//! - **Eager validation**: blank names, empty sets and inverted ranges are
//!   caught at the call site, surfaced at `build()`
//! - **Deterministic output**: expressions render by `(order, call-order)`
//!   within fixed clause slots
//! - **Safe composition**: builders are `Clone`-independent and nest as
//!   sub-queries without leaking statement terminators
//!
//! ```ignore
//! use sqlcraft::{select, CompileOptions, Statement};
//!
//! let sql = select()
//!     .column(("a", "Id"))
//!     .column(("a", "Name"))
//!     .from(("Accounts", "a"))
//!     .where_(|c| c.column(("a", "Age")).greater_than(18))
//!     .order_by(("a", "Name"))
//!     .build(CompileOptions::empty())?;
//!
//! assert_eq!(sql, "SELECT a.Id, a.Name FROM Accounts a WHERE a.Age > 18 ORDER BY a.Name");
//! ```

pub mod alias;
pub mod builder;
pub mod condition;
pub mod error;
pub mod expr;
pub mod options;
pub mod record;
pub mod store;
pub mod validate;

pub use alias::AliasRegistry;
pub use condition::{ChainedCondition, ComparisonBuilder, ConditionBuilder, ConditionChain};
pub use error::{SqlError, SqlResult};
pub use expr::{
    Case, CaseExpr, CompareOp, Expr, Frame, FrameBound, FrameUnit, FunctionCall, IntoColumn,
    IntoExpr, IntoQuerySource, IntoTable, JoinType, LogicOp, QuerySource, SortOrder, SqlValue,
    WindowFrame, WindowSpec,
};
pub use options::CompileOptions;
pub use record::{Dataset, RecordValues};
pub use store::PositionedExpressions;
pub use validate::{ExclusiveRange, InclusiveRange};

// Re-export the builder module surface for easy access
pub use builder::{
    Declare, Delete, IfStatement, Insert, MultiStatement, Select, SetVariable, Statement, Update,
    declare, delete, if_then, insert, multi, select, select_from, set_var, update,
};
