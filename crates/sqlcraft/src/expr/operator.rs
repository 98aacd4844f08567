//! Operator and keyword enums with their SQL token tables.
//!
//! Every `token` method is an exhaustive `match`, so extending an enum
//! without extending its vocabulary fails to compile.

/// Comparison operator between two expressions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompareOp {
    Equal,
    NotEqual,
    Greater,
    GreaterOrEqual,
    Less,
    LessOrEqual,
    Like,
    NotLike,
    In,
    NotIn,
    Is,
    IsNot,
    Exists,
    NotExists,
    Between,
    NotBetween,
}

impl CompareOp {
    /// The literal SQL token for this operator.
    pub fn token(self) -> &'static str {
        match self {
            CompareOp::Equal => "=",
            CompareOp::NotEqual => "<>",
            CompareOp::Greater => ">",
            CompareOp::GreaterOrEqual => ">=",
            CompareOp::Less => "<",
            CompareOp::LessOrEqual => "<=",
            CompareOp::Like => "LIKE",
            CompareOp::NotLike => "NOT LIKE",
            CompareOp::In => "IN",
            CompareOp::NotIn => "NOT IN",
            CompareOp::Is => "IS",
            CompareOp::IsNot => "IS NOT",
            CompareOp::Exists => "EXISTS",
            CompareOp::NotExists => "NOT EXISTS",
            CompareOp::Between => "BETWEEN",
            CompareOp::NotBetween => "NOT BETWEEN",
        }
    }
}

/// Logic operator linking two conditions in a chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogicOp {
    And,
    Or,
}

impl LogicOp {
    /// The literal SQL token for this operator.
    pub fn token(self) -> &'static str {
        match self {
            LogicOp::And => "AND",
            LogicOp::Or => "OR",
        }
    }
}

/// Sort direction for ORDER BY expressions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SortOrder {
    Ascending,
    Descending,
}

impl SortOrder {
    /// The literal SQL token for this direction.
    pub fn token(self) -> &'static str {
        match self {
            SortOrder::Ascending => "ASC",
            SortOrder::Descending => "DESC",
        }
    }
}

/// Join kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JoinType {
    Inner,
    Left,
    Right,
    Full,
    Cross,
}

impl JoinType {
    /// The keyword prefix before `JOIN`.
    pub fn token(self) -> &'static str {
        match self {
            JoinType::Inner => "INNER",
            JoinType::Left => "LEFT",
            JoinType::Right => "RIGHT",
            JoinType::Full => "FULL OUTER",
            JoinType::Cross => "CROSS",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compare_tokens() {
        assert_eq!(CompareOp::Equal.token(), "=");
        assert_eq!(CompareOp::NotEqual.token(), "<>");
        assert_eq!(CompareOp::Like.token(), "LIKE");
        assert_eq!(CompareOp::In.token(), "IN");
        assert_eq!(CompareOp::IsNot.token(), "IS NOT");
        assert_eq!(CompareOp::NotBetween.token(), "NOT BETWEEN");
    }

    #[test]
    fn join_tokens() {
        assert_eq!(JoinType::Inner.token(), "INNER");
        assert_eq!(JoinType::Full.token(), "FULL OUTER");
    }
}
