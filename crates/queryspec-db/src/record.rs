//! The record abstraction evaluated by specifications.
//!
//! [`Record`] is the only thing the evaluation layer needs from an entity:
//! a stable entity name and named field access. Expressions resolve
//! `Member` nodes against it, both when interpreting predicates in memory
//! and when the [`MemoryQueryProvider`](crate::query::MemoryQueryProvider)
//! executes a translated query.
//!
//! Most entities derive it with `#[derive(Record)]` from `queryspec-macros`.
//! It can also be implemented manually:
//!
//! ```
//! use std::borrow::Cow;
//!
//! use queryspec_db::record::Record;
//! use queryspec_db::value::Value;
//!
//! #[derive(Clone)]
//! struct Customer {
//!     id: i64,
//!     name: String,
//! }
//!
//! impl Record for Customer {
//!     fn entity_name() -> &'static str { "customers" }
//!
//!     fn field(&self, name: &str) -> Option<Value> {
//!         match name {
//!             "id" => Some(Value::from(self.id)),
//!             "name" => Some(Value::from(self.name.clone())),
//!             _ => None,
//!         }
//!     }
//!
//!     fn field_values(&self) -> Vec<(Cow<'static, str>, Value)> {
//!         vec![
//!             (Cow::Borrowed("id"), Value::from(self.id)),
//!             (Cow::Borrowed("name"), Value::from(self.name.clone())),
//!         ]
//!     }
//! }
//! ```

use std::borrow::Cow;
use std::collections::BTreeMap;

use queryspec_core::SpecError;

use crate::value::{FromValue, Value};

/// An entity whose fields can be read by name.
pub trait Record: Send + Sync {
    /// Returns the entity (table / collection) name.
    fn entity_name() -> &'static str
    where
        Self: Sized;

    /// Returns the value of the named field, or `None` if there is no such field.
    fn field(&self, name: &str) -> Option<Value>;

    /// Returns all field name-value pairs of this record, in field order.
    ///
    /// This is the record's value when an expression uses the entity itself,
    /// e.g. an identity selector or group key. Derived implementations list
    /// every non-skipped field.
    fn field_values(&self) -> Vec<(Cow<'static, str>, Value)>;
}

impl Record for BTreeMap<String, Value> {
    fn entity_name() -> &'static str {
        "object"
    }

    fn field(&self, name: &str) -> Option<Value> {
        self.get(name).cloned()
    }

    fn field_values(&self) -> Vec<(Cow<'static, str>, Value)> {
        self.iter()
            .map(|(k, v)| (Cow::Owned(k.clone()), v.clone()))
            .collect()
    }
}

/// A generic untyped row: a list of column names and their values.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    columns: Vec<String>,
    values: Vec<Value>,
}

impl Row {
    /// Creates a new row from column names and values.
    ///
    /// # Panics
    ///
    /// Panics if the number of columns does not match the number of values.
    pub fn new(columns: Vec<String>, values: Vec<Value>) -> Self {
        assert_eq!(
            columns.len(),
            values.len(),
            "Row column count must match value count"
        );
        Self { columns, values }
    }

    /// Builds a row from `(column, value)` pairs.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        let (columns, values) = pairs
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .unzip();
        Self { columns, values }
    }

    /// Returns the column names.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Returns the number of columns.
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// Returns `true` if the row has no columns.
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Gets a typed value by column name.
    ///
    /// # Errors
    ///
    /// Returns an error if the column does not exist or the value cannot be
    /// converted to the requested type.
    pub fn get<T: FromValue>(&self, column: &str) -> Result<T, SpecError> {
        let value = self.get_value(column).ok_or_else(|| {
            SpecError::Evaluation(format!("Column '{column}' not found in row"))
        })?;
        T::from_value(value)
    }

    /// Returns a reference to the raw value at the given column name.
    pub fn get_value(&self, column: &str) -> Option<&Value> {
        self.columns
            .iter()
            .position(|c| c == column)
            .map(|idx| &self.values[idx])
    }
}

impl Record for Row {
    fn entity_name() -> &'static str {
        "row"
    }

    fn field(&self, name: &str) -> Option<Value> {
        self.get_value(name).cloned()
    }

    fn field_values(&self) -> Vec<(Cow<'static, str>, Value)> {
        self.columns
            .iter()
            .zip(&self.values)
            .map(|(c, v)| (Cow::Owned(c.clone()), v.clone()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_get_typed() {
        let row = Row::from_pairs([("name", Value::from("Alice")), ("age", Value::Int(30))]);
        assert_eq!(row.get::<String>("name").unwrap(), "Alice");
        assert_eq!(row.get::<i64>("age").unwrap(), 30);
        assert!(row.get::<i64>("missing").is_err());
        assert!(row.get::<i64>("name").is_err());
    }

    #[test]
    fn test_row_as_record() {
        let row = Row::new(vec!["x".to_string()], vec![Value::Int(42)]);
        assert_eq!(row.field("x"), Some(Value::Int(42)));
        assert_eq!(row.field("y"), None);
        assert_eq!(Row::entity_name(), "row");
        assert_eq!(row.len(), 1);
        assert!(!row.is_empty());
    }

    #[test]
    fn test_row_field_values() {
        let row = Row::from_pairs([("b", Value::Int(1)), ("a", Value::from("x"))]);
        let names: Vec<String> = row.field_values().into_iter().map(|(n, _)| n.into_owned()).collect();
        assert_eq!(names, vec!["b", "a"]);
        assert!(Row::from_pairs(Vec::<(String, Value)>::new()).field_values().is_empty());
    }

    #[test]
    #[should_panic(expected = "column count must match")]
    fn test_row_mismatched_lengths_panics() {
        let _ = Row::new(vec!["a".to_string(), "b".to_string()], vec![Value::Null]);
    }

    #[test]
    fn test_map_as_record() {
        let mut map = BTreeMap::new();
        map.insert("k".to_string(), Value::Bool(true));
        assert_eq!(map.field("k"), Some(Value::Bool(true)));
        assert_eq!(<BTreeMap<String, Value> as Record>::entity_name(), "object");
    }
}
