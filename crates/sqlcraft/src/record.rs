//! Traits binding Rust types to tables and column/value rows.
//!
//! These replace runtime reflection with explicit implementations: a type
//! states its table name through [`Dataset`] and enumerates its columns
//! through [`RecordValues`]. Statement builders consume them for typed
//! sugar (`from_table::<T>()`, `record(&row)`, `set_using(&row)`).

use crate::alias::short_type_name;
use crate::expr::SqlValue;

/// Names the table a Rust type maps to.
///
/// The default is the type's unqualified name, matching the default alias
/// the registry derives.
pub trait Dataset {
    /// The table name used by `from_table::<T>()` and friends.
    fn table_name() -> String
    where
        Self: Sized,
    {
        short_type_name::<Self>()
    }
}

/// Yields `(column, value)` pairs in declaration order.
///
/// `insert(..).record(&row, ..)` and `update(..).set_using(&row, ..)`
/// consume this; both filter the caller's excluded columns.
pub trait RecordValues {
    /// The row as ordered column/value pairs.
    fn record_values(&self) -> Vec<(&'static str, SqlValue)>;
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Account {
        id: i64,
        name: String,
    }

    impl Dataset for Account {}

    impl RecordValues for Account {
        fn record_values(&self) -> Vec<(&'static str, SqlValue)> {
            vec![
                ("Id", SqlValue::Int(self.id)),
                ("Name", SqlValue::Text(self.name.clone())),
            ]
        }
    }

    #[test]
    fn default_table_name_is_type_name() {
        assert_eq!(Account::table_name(), "Account");
    }

    #[test]
    fn values_keep_declaration_order() {
        let row = Account {
            id: 7,
            name: "Ada".to_string(),
        };
        let values = row.record_values();
        assert_eq!(values[0].0, "Id");
        assert_eq!(values[1].0, "Name");
    }
}
