//! Decoded cell values.
//!
//! A [`Value`] mirrors the shape of the [`ColumnSchema`](crate::ColumnSchema)
//! it was decoded under. It carries no names and no delimiters: the schema and
//! the value are always walked together, index by index.
//!
//! | Column kind | Value |
//! |---|---|
//! | Simple | `Scalar(text)` |
//! | Array | `List(elements)` |
//! | Structured | `Nested(one value per component)` |
//! | ArrayStructured | `Nested(one Nested per element)` |
//!
//! ## Examples
//!
//! ```rust
//! use serde_csvpp::{parse_header, decode_cell, Value};
//!
//! let geo = parse_header("geo(lat^lon)").unwrap();
//! let value = decode_cell(&geo, "34.05^-118.24");
//!
//! assert_eq!(
//!     value,
//!     Value::Nested(vec![Value::from("34.05"), Value::from("-118.24")])
//! );
//! assert_eq!(value.get(1).and_then(Value::as_str), Some("-118.24"));
//! ```

use crate::header::FieldKind;
use serde::{Serialize, Serializer};
use std::fmt;

/// One decoded cell.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Value {
    Scalar(String),
    List(Vec<String>),
    Nested(Vec<Value>),
}

/// One decoded data row, positionally aligned with the header schemas.
pub type Record = Vec<Value>;

impl Default for Value {
    fn default() -> Self {
        Value::Scalar(String::new())
    }
}

impl Value {
    /// The value an empty cell decodes to under a column of `kind`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use serde_csvpp::{FieldKind, Value};
    ///
    /// assert_eq!(Value::empty(FieldKind::Array), Value::List(vec![]));
    /// assert_eq!(Value::empty(FieldKind::Structured), Value::Nested(vec![]));
    /// ```
    #[must_use]
    pub fn empty(kind: FieldKind) -> Value {
        match kind {
            FieldKind::Simple => Value::Scalar(String::new()),
            FieldKind::Array => Value::List(Vec::new()),
            FieldKind::Structured | FieldKind::ArrayStructured => Value::Nested(Vec::new()),
        }
    }

    /// Returns `true` if the value is a scalar.
    #[inline]
    #[must_use]
    pub const fn is_scalar(&self) -> bool {
        matches!(self, Value::Scalar(_))
    }

    /// Returns `true` if the value is a list of strings.
    #[inline]
    #[must_use]
    pub const fn is_list(&self) -> bool {
        matches!(self, Value::List(_))
    }

    /// Returns `true` if the value is a nested sequence.
    #[inline]
    #[must_use]
    pub const fn is_nested(&self) -> bool {
        matches!(self, Value::Nested(_))
    }

    /// Returns `true` for the empty string, the empty list, and the empty nested sequence.
    ///
    /// These are exactly the values an empty cell decodes to.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use serde_csvpp::Value;
    ///
    /// assert!(Value::default().is_empty());
    /// assert!(Value::List(vec![]).is_empty());
    /// assert!(!Value::List(vec![String::new()]).is_empty());
    /// ```
    #[must_use]
    pub fn is_empty(&self) -> bool {
        match self {
            Value::Scalar(s) => s.is_empty(),
            Value::List(items) => items.is_empty(),
            Value::Nested(items) => items.is_empty(),
        }
    }

    /// If the value is a scalar, returns its text. Otherwise returns `None`.
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Scalar(s) => Some(s),
            _ => None,
        }
    }

    /// If the value is a list, returns its elements. Otherwise returns `None`.
    #[inline]
    #[must_use]
    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    /// If the value is nested, returns its children. Otherwise returns `None`.
    #[inline]
    #[must_use]
    pub fn as_nested(&self) -> Option<&[Value]> {
        match self {
            Value::Nested(items) => Some(items),
            _ => None,
        }
    }

    /// Returns the `index`-th child of a nested value.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Value> {
        self.as_nested().and_then(|items| items.get(index))
    }

    /// Number of elements. A scalar counts as one.
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Value::Scalar(_) => 1,
            Value::List(items) => items.len(),
            Value::Nested(items) => items.len(),
        }
    }

    /// Consumes the value and returns its scalar text, if it is one.
    #[must_use]
    pub fn into_string(self) -> Option<String> {
        match self {
            Value::Scalar(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Scalar(s) => f.write_str(s),
            Value::List(items) => write!(f, "[{}]", items.join(",")),
            Value::Nested(items) => {
                f.write_str("(")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    item.fmt(f)?;
                }
                f.write_str(")")
            }
        }
    }
}

/// Schema-less serialization: scalars as strings, lists and nested values as sequences.
///
/// Use [`crate::convert::record_to_json`] to get objects keyed by column and
/// component names instead.
impl Serialize for Value {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Value::Scalar(s) => serializer.serialize_str(s),
            Value::List(items) => serializer.collect_seq(items),
            Value::Nested(items) => serializer.collect_seq(items),
        }
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Scalar(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Scalar(value.to_string())
    }
}

impl From<Vec<String>> for Value {
    fn from(value: Vec<String>) -> Self {
        Value::List(value)
    }
}

impl From<Vec<&str>> for Value {
    fn from(value: Vec<&str>) -> Self {
        Value::List(value.into_iter().map(str::to_string).collect())
    }
}

impl From<Vec<Value>> for Value {
    fn from(value: Vec<Value>) -> Self {
        Value::Nested(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_conversions() {
        assert_eq!(Value::from("a"), Value::Scalar("a".to_string()));
        assert_eq!(
            Value::from(vec!["a", "b"]),
            Value::List(vec!["a".to_string(), "b".to_string()])
        );
        assert_eq!(
            Value::from(vec![Value::from("x")]),
            Value::Nested(vec![Value::Scalar("x".to_string())])
        );
    }

    #[test]
    fn test_accessors() {
        let nested = Value::Nested(vec![Value::from("a"), Value::from(vec!["b", "c"])]);
        assert!(nested.is_nested());
        assert_eq!(nested.len(), 2);
        assert_eq!(nested.get(0).and_then(Value::as_str), Some("a"));
        assert_eq!(nested.get(1).and_then(Value::as_list).map(<[String]>::len), Some(2));
        assert!(nested.get(2).is_none());
        assert!(Value::from("a").get(0).is_none());
        assert_eq!(Value::from("z").into_string(), Some("z".to_string()));
    }

    #[test]
    fn test_display() {
        let value = Value::Nested(vec![
            Value::Nested(vec![Value::from("home"), Value::from("1 Main")]),
            Value::from(vec!["x"]),
        ]);
        assert_eq!(value.to_string(), "((home,1 Main),[x])");
    }

    #[test]
    fn test_empty_values() {
        assert!(Value::Scalar(String::new()).is_empty());
        assert!(Value::Nested(vec![]).is_empty());
        assert!(!Value::Nested(vec![Value::default()]).is_empty());
    }
}
