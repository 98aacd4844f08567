//! Window (OVER) specifications and frame borders.
//!
//! A frame is built through a small chain of by-value steps so the
//! single-sided and `BETWEEN ... AND ...` grammars cannot be mixed:
//!
//! ```ignore
//! Frame::rows().between().preceding(3).and().following(2)
//! Frame::rows().unbounded_preceding()
//! ```

use crate::error::{SqlError, SqlResult};
use crate::expr::{Expr, IntoColumn};
use crate::options::CompileOptions;

/// Frame limiting unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FrameUnit {
    Rows,
    Range,
    Groups,
}

impl FrameUnit {
    /// The literal SQL token for this unit.
    pub fn token(self) -> &'static str {
        match self {
            FrameUnit::Rows => "ROWS",
            FrameUnit::Range => "RANGE",
            FrameUnit::Groups => "GROUPS",
        }
    }
}

/// One border of a window frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameBound {
    UnboundedPreceding,
    Preceding(u64),
    CurrentRow,
    Following(u64),
    UnboundedFollowing,
}

impl FrameBound {
    fn render(self, buf: &mut String) {
        match self {
            FrameBound::UnboundedPreceding => buf.push_str("UNBOUNDED PRECEDING"),
            FrameBound::Preceding(n) => {
                buf.push_str(&n.to_string());
                buf.push_str(" PRECEDING");
            }
            FrameBound::CurrentRow => buf.push_str("CURRENT ROW"),
            FrameBound::Following(n) => {
                buf.push_str(&n.to_string());
                buf.push_str(" FOLLOWING");
            }
            FrameBound::UnboundedFollowing => buf.push_str("UNBOUNDED FOLLOWING"),
        }
    }
}

/// A complete frame specification.
///
/// `end` is `None` for the single-sided form (`ROWS 3 PRECEDING`) and
/// `Some` for the two-sided form (`ROWS BETWEEN 3 PRECEDING AND 2 FOLLOWING`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowFrame {
    unit: FrameUnit,
    start: FrameBound,
    end: Option<FrameBound>,
}

impl WindowFrame {
    pub(crate) fn render(&self, buf: &mut String) {
        buf.push_str(self.unit.token());
        match self.end {
            Some(end) => {
                buf.push_str(" BETWEEN ");
                self.start.render(buf);
                buf.push_str(" AND ");
                end.render(buf);
            }
            None => {
                buf.push(' ');
                self.start.render(buf);
            }
        }
    }
}

/// Entry point for frame construction.
pub struct Frame;

impl Frame {
    /// Limit by physical rows.
    pub fn rows() -> FrameBuilder {
        FrameBuilder {
            unit: FrameUnit::Rows,
        }
    }

    /// Limit by value range.
    pub fn range() -> FrameBuilder {
        FrameBuilder {
            unit: FrameUnit::Range,
        }
    }

    /// Limit by peer groups.
    pub fn groups() -> FrameBuilder {
        FrameBuilder {
            unit: FrameUnit::Groups,
        }
    }
}

/// Frame with a unit chosen; pick the single-sided or BETWEEN form next.
pub struct FrameBuilder {
    unit: FrameUnit,
}

impl FrameBuilder {
    /// Start the two-sided `BETWEEN lower AND upper` form.
    pub fn between(self) -> FrameLower {
        FrameLower { unit: self.unit }
    }

    /// Single-sided: `n PRECEDING`.
    pub fn preceding(self, n: u64) -> WindowFrame {
        self.single(FrameBound::Preceding(n))
    }

    /// Single-sided: `UNBOUNDED PRECEDING`.
    pub fn unbounded_preceding(self) -> WindowFrame {
        self.single(FrameBound::UnboundedPreceding)
    }

    /// Single-sided: `CURRENT ROW`.
    pub fn current_row(self) -> WindowFrame {
        self.single(FrameBound::CurrentRow)
    }

    fn single(self, start: FrameBound) -> WindowFrame {
        WindowFrame {
            unit: self.unit,
            start,
            end: None,
        }
    }
}

/// Lower border of a two-sided frame.
pub struct FrameLower {
    unit: FrameUnit,
}

impl FrameLower {
    pub fn preceding(self, n: u64) -> FrameLink {
        self.bound(FrameBound::Preceding(n))
    }

    pub fn unbounded_preceding(self) -> FrameLink {
        self.bound(FrameBound::UnboundedPreceding)
    }

    pub fn current_row(self) -> FrameLink {
        self.bound(FrameBound::CurrentRow)
    }

    pub fn following(self, n: u64) -> FrameLink {
        self.bound(FrameBound::Following(n))
    }

    fn bound(self, start: FrameBound) -> FrameLink {
        FrameLink {
            unit: self.unit,
            start,
        }
    }
}

/// Connector between the two borders.
pub struct FrameLink {
    unit: FrameUnit,
    start: FrameBound,
}

impl FrameLink {
    pub fn and(self) -> FrameUpper {
        FrameUpper {
            unit: self.unit,
            start: self.start,
        }
    }
}

/// Upper border of a two-sided frame.
pub struct FrameUpper {
    unit: FrameUnit,
    start: FrameBound,
}

impl FrameUpper {
    pub fn preceding(self, n: u64) -> WindowFrame {
        self.finish(FrameBound::Preceding(n))
    }

    pub fn current_row(self) -> WindowFrame {
        self.finish(FrameBound::CurrentRow)
    }

    pub fn following(self, n: u64) -> WindowFrame {
        self.finish(FrameBound::Following(n))
    }

    pub fn unbounded_following(self) -> WindowFrame {
        self.finish(FrameBound::UnboundedFollowing)
    }

    fn finish(self, end: FrameBound) -> WindowFrame {
        WindowFrame {
            unit: self.unit,
            start: self.start,
            end: Some(end),
        }
    }
}

/// The body of an `OVER (...)` clause: partitioning, ordering and an
/// optional frame.
#[derive(Debug, Clone, Default)]
pub struct WindowSpec {
    partition_by: Vec<Expr>,
    order_by: Vec<Expr>,
    frame: Option<WindowFrame>,
    error: Option<SqlError>,
}

impl WindowSpec {
    /// Create an empty window specification (`OVER ()`).
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a PARTITION BY column.
    pub fn partition_by(mut self, column: impl IntoColumn) -> Self {
        match column.into_column() {
            Ok(expr) => self.partition_by.push(expr),
            Err(err) => self.record(err),
        }
        self
    }

    /// Add an ORDER BY column (ascending).
    pub fn order_by(mut self, column: impl IntoColumn) -> Self {
        match column.into_column() {
            Ok(expr) => self.order_by.push(Expr::ordered(expr, None)),
            Err(err) => self.record(err),
        }
        self
    }

    /// Add a descending ORDER BY column.
    pub fn order_by_desc(mut self, column: impl IntoColumn) -> Self {
        match column.into_column() {
            Ok(expr) => self
                .order_by
                .push(Expr::ordered(expr, Some(super::SortOrder::Descending))),
            Err(err) => self.record(err),
        }
        self
    }

    /// Set the window frame.
    pub fn frame(mut self, frame: WindowFrame) -> Self {
        self.frame = Some(frame);
        self
    }

    fn record(&mut self, err: SqlError) {
        if self.error.is_none() {
            self.error = Some(err);
        }
    }

    pub(crate) fn render(&self, buf: &mut String, options: CompileOptions) -> SqlResult<()> {
        if let Some(err) = &self.error {
            return Err(err.clone());
        }
        let mut first = true;
        if !self.partition_by.is_empty() {
            buf.push_str("PARTITION BY ");
            render_list(buf, &self.partition_by, options)?;
            first = false;
        }
        if !self.order_by.is_empty() {
            if !first {
                buf.push(' ');
            }
            buf.push_str("ORDER BY ");
            render_list(buf, &self.order_by, options)?;
            first = false;
        }
        if let Some(frame) = &self.frame {
            if !first {
                buf.push(' ');
            }
            frame.render(buf);
        }
        Ok(())
    }
}

fn render_list(buf: &mut String, exprs: &[Expr], options: CompileOptions) -> SqlResult<()> {
    for (i, expr) in exprs.iter().enumerate() {
        if i > 0 {
            buf.push_str(", ");
        }
        expr.render(buf, options)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rendered(frame: WindowFrame) -> String {
        let mut buf = String::new();
        frame.render(&mut buf);
        buf
    }

    #[test]
    fn single_sided_frame_has_no_between() {
        assert_eq!(
            rendered(Frame::rows().unbounded_preceding()),
            "ROWS UNBOUNDED PRECEDING"
        );
        assert_eq!(rendered(Frame::rows().preceding(3)), "ROWS 3 PRECEDING");
        assert_eq!(rendered(Frame::range().current_row()), "RANGE CURRENT ROW");
    }

    #[test]
    fn two_sided_frame_uses_between() {
        assert_eq!(
            rendered(Frame::rows().between().preceding(3).and().following(2)),
            "ROWS BETWEEN 3 PRECEDING AND 2 FOLLOWING"
        );
        assert_eq!(
            rendered(
                Frame::groups()
                    .between()
                    .unbounded_preceding()
                    .and()
                    .current_row()
            ),
            "GROUPS BETWEEN UNBOUNDED PRECEDING AND CURRENT ROW"
        );
    }

    #[test]
    fn window_spec_renders_all_sections() {
        let spec = WindowSpec::new()
            .partition_by("region")
            .order_by_desc("amount")
            .frame(Frame::rows().between().unbounded_preceding().and().current_row());
        let mut buf = String::new();
        spec.render(&mut buf, CompileOptions::empty()).unwrap();
        assert_eq!(
            buf,
            "PARTITION BY region ORDER BY amount DESC ROWS BETWEEN UNBOUNDED PRECEDING AND CURRENT ROW"
        );
    }

    #[test]
    fn empty_window_spec_renders_nothing() {
        let mut buf = String::new();
        WindowSpec::new()
            .render(&mut buf, CompileOptions::empty())
            .unwrap();
        assert!(buf.is_empty());
    }
}
