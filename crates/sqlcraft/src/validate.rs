//! Argument guards and range validators used by the fluent entry points.

use crate::error::{SqlError, SqlResult};

/// Validate that a caller-supplied name is neither empty nor whitespace.
///
/// Returns the trimmed-checked original value so call sites can chain.
pub fn not_blank(argument: &'static str, value: impl Into<String>) -> SqlResult<String> {
    let value = value.into();
    if value.trim().is_empty() {
        return Err(SqlError::invalid_argument(
            argument,
            "cannot be empty or whitespace",
        ));
    }
    Ok(value)
}

/// Validate that a caller-supplied collection contains at least one element.
pub fn not_empty<T>(argument: &'static str, values: &[T]) -> SqlResult<()> {
    if values.is_empty() {
        return Err(SqlError::invalid_argument(argument, "cannot be empty"));
    }
    Ok(())
}

/// An inclusive range: `contains` uses `>=` / `<=`.
///
/// Construction requires `min <= max`; an inverted range is rejected at
/// configuration time, not when the range is first evaluated.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InclusiveRange<T> {
    min: T,
    max: T,
}

impl<T: PartialOrd + Copy> InclusiveRange<T> {
    /// Create a new inclusive range.
    pub fn new(min: T, max: T) -> SqlResult<Self>
    where
        T: std::fmt::Debug,
    {
        if min > max {
            return Err(SqlError::invalid_argument(
                "min",
                format!("must be <= max, got min={min:?} max={max:?}"),
            ));
        }
        Ok(Self { min, max })
    }

    /// The lower bound.
    pub fn min(&self) -> T {
        self.min
    }

    /// The upper bound.
    pub fn max(&self) -> T {
        self.max
    }

    /// `true` when `min <= value <= max`.
    pub fn contains(&self, value: T) -> bool {
        value >= self.min && value <= self.max
    }
}

impl<T> InclusiveRange<T> {
    /// Consume the range, yielding `(min, max)`.
    pub fn into_bounds(self) -> (T, T) {
        (self.min, self.max)
    }
}

/// An exclusive range: `contains` uses strict `>` / `<`.
///
/// Construction requires `min < max`. Kept distinct from
/// [`InclusiveRange`] on purpose: the two boundary semantics exist side by
/// side and are named unambiguously rather than unified.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExclusiveRange<T> {
    min: T,
    max: T,
}

impl<T: PartialOrd + Copy> ExclusiveRange<T> {
    /// Create a new exclusive range.
    pub fn new(min: T, max: T) -> SqlResult<Self>
    where
        T: std::fmt::Debug,
    {
        if min >= max {
            return Err(SqlError::invalid_argument(
                "min",
                format!("must be < max, got min={min:?} max={max:?}"),
            ));
        }
        Ok(Self { min, max })
    }

    /// The lower bound.
    pub fn min(&self) -> T {
        self.min
    }

    /// The upper bound.
    pub fn max(&self) -> T {
        self.max
    }

    /// `true` when `min < value < max`.
    pub fn contains(&self, value: T) -> bool {
        value > self.min && value < self.max
    }
}
