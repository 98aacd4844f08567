//! Ordered, position-keyed expression storage shared by all statement builders.

use crate::expr::Expr;

/// One stored expression with its ordering tags.
#[derive(Debug, Clone)]
struct Entry<P> {
    position: P,
    order: i32,
    sequence: usize,
    expr: Expr,
}

/// Append-only store mapping a clause position to an ordered sequence of
/// expressions.
///
/// Rendering order within a position is a stable sort by
/// `(order, insertion-index)`: lower `order` first, ties broken by call
/// order. This is what makes output deterministic.
///
/// `Clone` yields an independent store; the expression nodes themselves are
/// immutable and safe to share.
#[derive(Debug, Clone)]
pub struct PositionedExpressions<P> {
    entries: Vec<Entry<P>>,
}

impl<P: Copy + Eq> PositionedExpressions<P> {
    /// Create an empty store.
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Append an expression at `position` with an explicit order tag.
    pub fn add(&mut self, position: P, expr: Expr, order: i32) {
        let sequence = self.entries.len();
        self.entries.push(Entry {
            position,
            order,
            sequence,
            expr,
        });
    }

    /// All expressions at `position`, stable-sorted by `(order, sequence)`.
    pub fn at(&self, position: P) -> Vec<&Expr> {
        let mut matches: Vec<&Entry<P>> = self
            .entries
            .iter()
            .filter(|e| e.position == position)
            .collect();
        matches.sort_by_key(|e| (e.order, e.sequence));
        matches.into_iter().map(|e| &e.expr).collect()
    }

    /// `true` when at least one expression was added at `position`.
    pub fn has(&self, position: P) -> bool {
        self.entries.iter().any(|e| e.position == position)
    }

    /// Number of expressions at `position`.
    pub fn count(&self, position: P) -> usize {
        self.entries.iter().filter(|e| e.position == position).count()
    }

    /// Total number of stored expressions across all positions.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// `true` when nothing was added yet.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<P: Copy + Eq> Default for PositionedExpressions<P> {
    fn default() -> Self {
        Self::new()
    }
}
