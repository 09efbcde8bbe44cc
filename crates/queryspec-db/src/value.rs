//! Backend-agnostic values.
//!
//! The [`Value`] enum is what expressions evaluate to, what records expose
//! through [`Record::field`](crate::record::Record::field), and what the SQL
//! compiler binds as parameters. [`FromValue`] converts values back into
//! concrete Rust types for projections.

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;

use queryspec_core::SpecError;

/// A backend-agnostic representation of a value.
///
/// # Examples
///
/// ```
/// use queryspec_db::value::Value;
///
/// let v = Value::from(42_i64);
/// assert_eq!(v, Value::Int(42));
///
/// let v = Value::from("hello");
/// assert_eq!(v, Value::String("hello".to_string()));
/// ```
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "type", content = "value")]
pub enum Value {
    /// SQL NULL.
    Null,
    /// A boolean value.
    Bool(bool),
    /// A 64-bit signed integer.
    Int(i64),
    /// A 64-bit floating-point number.
    Float(f64),
    /// A UTF-8 string.
    String(String),
    /// Raw binary data.
    Bytes(Vec<u8>),
    /// A date without time.
    Date(chrono::NaiveDate),
    /// A date and time without timezone.
    DateTime(chrono::NaiveDateTime),
    /// A date and time with UTC timezone.
    DateTimeTz(chrono::DateTime<chrono::Utc>),
    /// A time without date.
    Time(chrono::NaiveTime),
    /// A duration / interval.
    Duration(chrono::Duration),
    /// A UUID value.
    Uuid(uuid::Uuid),
    /// A JSON value.
    Json(serde_json::Value),
    /// A list of values (navigation collections, `select_many` results).
    List(Vec<Value>),
    /// A named set of values (related records, anonymous projections).
    Object(BTreeMap<String, Value>),
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => write!(f, "NULL"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Int(i) => write!(f, "{i}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::String(s) => write!(f, "{s}"),
            Self::Bytes(b) => write!(f, "<{} bytes>", b.len()),
            Self::Date(d) => write!(f, "{d}"),
            Self::DateTime(dt) => write!(f, "{dt}"),
            Self::DateTimeTz(dt) => write!(f, "{dt}"),
            Self::Time(t) => write!(f, "{t}"),
            Self::Duration(d) => write!(f, "{d}"),
            Self::Uuid(u) => write!(f, "{u}"),
            Self::Json(j) => write!(f, "{j}"),
            Self::List(vals) => {
                write!(f, "[")?;
                for (i, v) in vals.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{v}")?;
                }
                write!(f, "]")
            }
            Self::Object(fields) => {
                write!(f, "{{")?;
                for (i, (k, v)) in fields.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{k}: {v}")?;
                }
                write!(f, "}}")
            }
        }
    }
}

// ── From implementations ───────────────────────────────────────────────

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Self::Int(i64::from(v))
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<u32> for Value {
    fn from(v: u32) -> Self {
        Self::Int(i64::from(v))
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Self::String(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::String(v.to_string())
    }
}

impl From<Vec<u8>> for Value {
    fn from(v: Vec<u8>) -> Self {
        Self::Bytes(v)
    }
}

impl From<chrono::NaiveDate> for Value {
    fn from(v: chrono::NaiveDate) -> Self {
        Self::Date(v)
    }
}

impl From<chrono::NaiveDateTime> for Value {
    fn from(v: chrono::NaiveDateTime) -> Self {
        Self::DateTime(v)
    }
}

impl From<chrono::DateTime<chrono::Utc>> for Value {
    fn from(v: chrono::DateTime<chrono::Utc>) -> Self {
        Self::DateTimeTz(v)
    }
}

impl From<chrono::NaiveTime> for Value {
    fn from(v: chrono::NaiveTime) -> Self {
        Self::Time(v)
    }
}

impl From<chrono::Duration> for Value {
    fn from(v: chrono::Duration) -> Self {
        Self::Duration(v)
    }
}

impl From<uuid::Uuid> for Value {
    fn from(v: uuid::Uuid) -> Self {
        Self::Uuid(v)
    }
}

impl From<serde_json::Value> for Value {
    fn from(v: serde_json::Value) -> Self {
        Self::Json(v)
    }
}

impl From<Vec<Value>> for Value {
    fn from(v: Vec<Value>) -> Self {
        Self::List(v)
    }
}

impl From<BTreeMap<String, Value>> for Value {
    fn from(v: BTreeMap<String, Value>) -> Self {
        Self::Object(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        match v {
            Some(inner) => inner.into(),
            None => Self::Null,
        }
    }
}

impl Value {
    /// Returns `true` if this value is `Null`.
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Attempts to extract a boolean value.
    pub const fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Attempts to extract an integer value.
    pub const fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Attempts to extract a float value.
    pub const fn as_float(&self) -> Option<f64> {
        match self {
            Self::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// Attempts to extract a string reference.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Returns a short name of the variant, used in error messages.
    pub const fn type_name(&self) -> &'static str {
        match self {
            Self::Null => "Null",
            Self::Bool(_) => "Bool",
            Self::Int(_) => "Int",
            Self::Float(_) => "Float",
            Self::String(_) => "String",
            Self::Bytes(_) => "Bytes",
            Self::Date(_) => "Date",
            Self::DateTime(_) => "DateTime",
            Self::DateTimeTz(_) => "DateTimeTz",
            Self::Time(_) => "Time",
            Self::Duration(_) => "Duration",
            Self::Uuid(_) => "Uuid",
            Self::Json(_) => "Json",
            Self::List(_) => "List",
            Self::Object(_) => "Object",
        }
    }

    /// Looks up a named member: an object key, or a key of a JSON object.
    pub fn member(&self, name: &str) -> Option<Value> {
        match self {
            Self::Object(fields) => fields.get(name).cloned(),
            Self::Json(serde_json::Value::Object(map)) => map.get(name).map(json_to_value),
            _ => None,
        }
    }

    /// Equality with numeric widening (`Int(1)` equals `Float(1.0)`).
    pub fn loose_eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Int(a), Self::Float(b)) | (Self::Float(b), Self::Int(a)) => (*a as f64) == *b,
            _ => self == other,
        }
    }

    /// Compares two values of compatible types.
    ///
    /// Returns `None` when the values are of incomparable types or either is
    /// `Null`.
    pub fn compare(&self, other: &Self) -> Option<Ordering> {
        match (self, other) {
            (Self::Bool(a), Self::Bool(b)) => Some(a.cmp(b)),
            (Self::Int(a), Self::Int(b)) => Some(a.cmp(b)),
            (Self::Float(a), Self::Float(b)) => a.partial_cmp(b),
            (Self::Int(a), Self::Float(b)) => (*a as f64).partial_cmp(b),
            (Self::Float(a), Self::Int(b)) => a.partial_cmp(&(*b as f64)),
            (Self::String(a), Self::String(b)) => Some(a.cmp(b)),
            (Self::Bytes(a), Self::Bytes(b)) => Some(a.cmp(b)),
            (Self::Date(a), Self::Date(b)) => Some(a.cmp(b)),
            (Self::DateTime(a), Self::DateTime(b)) => Some(a.cmp(b)),
            (Self::DateTimeTz(a), Self::DateTimeTz(b)) => Some(a.cmp(b)),
            (Self::Time(a), Self::Time(b)) => Some(a.cmp(b)),
            (Self::Duration(a), Self::Duration(b)) => Some(a.cmp(b)),
            (Self::Uuid(a), Self::Uuid(b)) => Some(a.cmp(b)),
            _ => None,
        }
    }

    /// A total order used for sorting: `Null` sorts first, incomparable
    /// values are treated as equal so stable sorts keep their input order.
    pub fn sort_cmp(&self, other: &Self) -> Ordering {
        match (self.is_null(), other.is_null()) {
            (true, true) => Ordering::Equal,
            (true, false) => Ordering::Less,
            (false, true) => Ordering::Greater,
            (false, false) => self.compare(other).unwrap_or(Ordering::Equal),
        }
    }

    /// A hashable key for grouping; values that are `loose_eq` share a key.
    ///
    /// Keys are the tagged JSON encoding, so nested values stay distinct
    /// where their display forms would not.
    #[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
    pub(crate) fn group_key(&self) -> Result<String, SpecError> {
        let widened;
        let key = match self {
            // Whole floats inside the i64 range group with the equal Int.
            Self::Float(f) if f.fract() == 0.0 && (i64::MIN as f64..i64::MAX as f64).contains(f) => {
                widened = Self::Int(*f as i64);
                &widened
            }
            other => other,
        };
        serde_json::to_string(key).map_err(|e| SpecError::Evaluation(format!("cannot group by {self}: {e}")))
    }
}

fn json_to_value(json: &serde_json::Value) -> Value {
    match json {
        serde_json::Value::Null => Value::Null,
        serde_json::Value::Bool(b) => Value::Bool(*b),
        serde_json::Value::Number(n) => n
            .as_i64()
            .map(Value::Int)
            .or_else(|| n.as_f64().map(Value::Float))
            .unwrap_or(Value::Null),
        serde_json::Value::String(s) => Value::String(s.clone()),
        other => Value::Json(other.clone()),
    }
}

/// Trait for converting a [`Value`] to a concrete Rust type.
pub trait FromValue: Sized {
    /// Attempts to convert a value reference to this type.
    fn from_value(value: &Value) -> Result<Self, SpecError>;
}

fn mismatch(expected: &str, value: &Value) -> SpecError {
    SpecError::Evaluation(format!("Expected {expected}, got {value:?}"))
}

impl FromValue for i64 {
    fn from_value(value: &Value) -> Result<Self, SpecError> {
        match value {
            Value::Int(i) => Ok(*i),
            _ => Err(mismatch("Int", value)),
        }
    }
}

impl FromValue for i32 {
    fn from_value(value: &Value) -> Result<Self, SpecError> {
        match value {
            Value::Int(i) => i32::try_from(*i)
                .map_err(|e| SpecError::Evaluation(format!("Int value out of i32 range: {e}"))),
            _ => Err(mismatch("Int", value)),
        }
    }
}

impl FromValue for f64 {
    fn from_value(value: &Value) -> Result<Self, SpecError> {
        match value {
            Value::Float(f) => Ok(*f),
            Value::Int(i) => Ok(*i as f64),
            _ => Err(mismatch("Float", value)),
        }
    }
}

impl FromValue for bool {
    fn from_value(value: &Value) -> Result<Self, SpecError> {
        match value {
            Value::Bool(b) => Ok(*b),
            _ => Err(mismatch("Bool", value)),
        }
    }
}

impl FromValue for String {
    fn from_value(value: &Value) -> Result<Self, SpecError> {
        match value {
            Value::String(s) => Ok(s.clone()),
            _ => Err(mismatch("String", value)),
        }
    }
}

impl FromValue for uuid::Uuid {
    fn from_value(value: &Value) -> Result<Self, SpecError> {
        match value {
            Value::Uuid(u) => Ok(*u),
            _ => Err(mismatch("Uuid", value)),
        }
    }
}

impl FromValue for chrono::NaiveDate {
    fn from_value(value: &Value) -> Result<Self, SpecError> {
        match value {
            Value::Date(d) => Ok(*d),
            _ => Err(mismatch("Date", value)),
        }
    }
}

impl FromValue for Value {
    fn from_value(value: &Value) -> Result<Self, SpecError> {
        Ok(value.clone())
    }
}

impl<T: FromValue> FromValue for Option<T> {
    fn from_value(value: &Value) -> Result<Self, SpecError> {
        match value {
            Value::Null => Ok(None),
            _ => T::from_value(value).map(Some),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_integers() {
        assert_eq!(Value::from(42_i32), Value::Int(42));
        assert_eq!(Value::from(42_i64), Value::Int(42));
        assert_eq!(Value::from(42_u32), Value::Int(42));
    }

    #[test]
    fn test_from_option() {
        assert_eq!(Value::from(Some(42_i64)), Value::Int(42));
        assert_eq!(Value::from(None::<i64>), Value::Null);
    }

    #[test]
    fn test_display_object() {
        let mut fields = BTreeMap::new();
        fields.insert("a".to_string(), Value::Int(1));
        fields.insert("b".to_string(), Value::from("x"));
        assert_eq!(Value::Object(fields).to_string(), "{a: 1, b: x}");
    }

    #[test]
    fn test_display_list() {
        let list = Value::List(vec![Value::Int(1), Value::Int(2), Value::Int(3)]);
        assert_eq!(list.to_string(), "[1, 2, 3]");
    }

    #[test]
    fn test_member_on_object_and_json() {
        let mut fields = BTreeMap::new();
        fields.insert("city".to_string(), Value::from("Oslo"));
        assert_eq!(Value::Object(fields).member("city"), Some(Value::from("Oslo")));

        let json = Value::Json(serde_json::json!({"zip": 1234, "tags": ["a"]}));
        assert_eq!(json.member("zip"), Some(Value::Int(1234)));
        assert!(matches!(json.member("tags"), Some(Value::Json(_))));
        assert_eq!(json.member("missing"), None);
        assert_eq!(Value::Int(1).member("x"), None);
    }

    #[test]
    fn test_loose_eq_numeric() {
        assert!(Value::Int(1).loose_eq(&Value::Float(1.0)));
        assert!(Value::Float(2.0).loose_eq(&Value::Int(2)));
        assert!(!Value::Int(1).loose_eq(&Value::from("1")));
    }

    #[test]
    fn test_compare() {
        assert_eq!(Value::Int(1).compare(&Value::Int(2)), Some(Ordering::Less));
        assert_eq!(Value::Int(3).compare(&Value::Float(2.5)), Some(Ordering::Greater));
        assert_eq!(Value::from("b").compare(&Value::from("a")), Some(Ordering::Greater));
        assert_eq!(Value::Null.compare(&Value::Int(1)), None);
        assert_eq!(Value::Int(1).compare(&Value::from("1")), None);
    }

    #[test]
    fn test_sort_cmp_nulls_first() {
        let mut values = vec![Value::Int(3), Value::Null, Value::Int(1)];
        values.sort_by(Value::sort_cmp);
        assert_eq!(values, vec![Value::Null, Value::Int(1), Value::Int(3)]);
    }

    #[test]
    fn test_group_key_widening() {
        let key = |v: Value| v.group_key().unwrap();
        assert_eq!(key(Value::Int(2)), key(Value::Float(2.0)));
        assert_ne!(key(Value::Int(2)), key(Value::from("2")));
        assert_ne!(key(Value::Int(2)), key(Value::Float(2.5)));
    }

    #[test]
    fn test_group_key_large_floats_stay_distinct() {
        let key = |v: Value| v.group_key().unwrap();
        assert_ne!(key(Value::Float(1e20)), key(Value::Float(5e20)));
        assert_ne!(key(Value::Float(1e20)), key(Value::Int(i64::MAX)));
        assert_eq!(key(Value::Float(1e20)), key(Value::Float(1e20)));
        assert_eq!(key(Value::Float(-9.0e18)), key(Value::Int(-9_000_000_000_000_000_000)));
    }

    #[test]
    fn test_group_key_lists_are_structural() {
        let key = |v: Value| v.group_key().unwrap();
        let joined = Value::List(vec![Value::from("a, b")]);
        let split = Value::List(vec![Value::from("a"), Value::from("b")]);
        assert_eq!(joined.to_string(), split.to_string());
        assert_ne!(key(joined), key(split));
    }

    #[test]
    fn test_from_value_conversions() {
        assert_eq!(i64::from_value(&Value::Int(7)).unwrap(), 7);
        assert_eq!(f64::from_value(&Value::Int(7)).unwrap(), 7.0);
        assert_eq!(String::from_value(&Value::from("x")).unwrap(), "x");
        assert_eq!(Option::<i64>::from_value(&Value::Null).unwrap(), None);
        assert!(i32::from_value(&Value::Int(i64::MAX)).is_err());
        assert!(bool::from_value(&Value::Int(1)).is_err());
    }
}
