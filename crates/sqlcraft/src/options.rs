//! Rendering flags threaded through every compile call.

use bitflags::bitflags;

bitflags! {
    /// Flags controlling text formatting and statement termination.
    ///
    /// Options propagate unchanged through every recursive render call.
    /// The only exception is [`CompileOptions::APPEND_SEPARATOR`]: a
    /// sub-query strips it for its inner statement, so only the outermost
    /// build decides whether a trailing separator is appended.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct CompileOptions: u8 {
        /// Pretty-print: newlines between clauses instead of single spaces.
        const FORMAT = 0b0000_0001;
        /// Emit the statement terminator (`;`) after the statement.
        const APPEND_SEPARATOR = 0b0000_0010;
    }
}

impl CompileOptions {
    /// The separator emitted between clauses.
    pub fn clause_separator(self) -> &'static str {
        if self.contains(CompileOptions::FORMAT) {
            "\n"
        } else {
            " "
        }
    }

    /// Options for rendering a nested statement: identical, minus the
    /// separator flag.
    pub fn for_subquery(self) -> Self {
        self.difference(CompileOptions::APPEND_SEPARATOR)
    }
}
