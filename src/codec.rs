//! Schema-driven cell codec.
//!
//! [`decode_cell`] splits one raw cell into a [`Value`] tree following the
//! delimiters of its [`ColumnSchema`]; [`encode_cell`] joins a tree back into
//! text. Both recurse over the component list, so their depth is bounded by
//! the schema depth the header parser already limited.
//!
//! The codec is a splitter, not a validator. It never fails:
//!
//! - an empty cell under an array or structured column decodes to an empty list,
//! - surplus components decode as plain scalars,
//! - missing components just give a shorter list,
//! - a value whose shape does not match its schema is encoded best effort.
//!
//! ## Examples
//!
//! ```rust
//! use serde_csvpp::{decode_cell, encode_cell, parse_header, Value};
//!
//! let address = parse_header("address[](type^street)").unwrap();
//! let value = decode_cell(&address, "home^123 Main~work^456 Oak");
//!
//! assert_eq!(
//!     value,
//!     Value::Nested(vec![
//!         Value::Nested(vec![Value::from("home"), Value::from("123 Main")]),
//!         Value::Nested(vec![Value::from("work"), Value::from("456 Oak")]),
//!     ])
//! );
//! assert_eq!(encode_cell(&address, &value), "home^123 Main~work^456 Oak");
//! ```

use crate::header::{
    split_at_depth_zero, ColumnSchema, FieldKind, DEFAULT_ARRAY_DELIMITER,
    DEFAULT_COMPONENT_DELIMITER,
};
use crate::value::{Record, Value};

/// Decodes one cell under its column schema.
#[must_use]
pub fn decode_cell(schema: &ColumnSchema, text: &str) -> Value {
    match schema.kind {
        FieldKind::Simple => Value::Scalar(text.to_string()),
        FieldKind::Array => Value::List(split_elements(text, schema.array_delimiter)),
        FieldKind::Structured => decode_components(schema, text),
        FieldKind::ArrayStructured => {
            if text.is_empty() {
                return Value::Nested(Vec::new());
            }
            Value::Nested(
                text.split(schema.array_delimiter)
                    .map(|element| decode_components(schema, element))
                    .collect(),
            )
        }
    }
}

/// Decodes a whole row. Cells beyond the known headers decode as scalars.
///
/// # Examples
///
/// ```rust
/// use serde_csvpp::{decode_record, parse_header, Value};
///
/// let headers = vec![parse_header("name").unwrap(), parse_header("phone[]").unwrap()];
/// let record = decode_record(&headers, &["Alice", "", "extra"]);
///
/// assert_eq!(
///     record,
///     vec![Value::from("Alice"), Value::List(vec![]), Value::from("extra")]
/// );
/// ```
#[must_use]
pub fn decode_record<S: AsRef<str>>(headers: &[ColumnSchema], cells: &[S]) -> Record {
    cells
        .iter()
        .enumerate()
        .map(|(i, cell)| match headers.get(i) {
            Some(schema) => decode_cell(schema, cell.as_ref()),
            None => Value::Scalar(cell.as_ref().to_string()),
        })
        .collect()
}

/// Encodes one value under its column schema. The exact inverse of [`decode_cell`]
/// on canonical text.
#[must_use]
pub fn encode_cell(schema: &ColumnSchema, value: &Value) -> String {
    match (schema.kind, value) {
        (FieldKind::Simple, Value::Scalar(s)) => s.clone(),
        (FieldKind::Array, Value::List(items)) => join(items, schema.array_delimiter),
        (FieldKind::Structured, Value::Nested(parts)) => encode_components(schema, parts),
        (FieldKind::ArrayStructured, Value::Nested(elements)) => {
            let encoded: Vec<String> = elements
                .iter()
                .map(|element| match element {
                    Value::Nested(parts) => encode_components(schema, parts),
                    other => encode_unschemed(other),
                })
                .collect();
            join(&encoded, schema.array_delimiter)
        }
        (FieldKind::Array, Value::Nested(elements)) => {
            let encoded: Vec<String> = elements.iter().map(encode_unschemed).collect();
            join(&encoded, schema.array_delimiter)
        }
        (_, other) => encode_unschemed(other),
    }
}

/// Encodes a whole row. Values beyond the known headers are encoded without a schema.
#[must_use]
pub fn encode_record(headers: &[ColumnSchema], record: &[Value]) -> Vec<String> {
    record
        .iter()
        .enumerate()
        .map(|(i, value)| match headers.get(i) {
            Some(schema) => encode_cell(schema, value),
            None => encode_unschemed(value),
        })
        .collect()
}

fn split_elements(text: &str, delimiter: char) -> Vec<String> {
    if text.is_empty() {
        return Vec::new();
    }
    text.split(delimiter).map(str::to_string).collect()
}

/// Decodes one structured element against `schema.components`.
fn decode_components(schema: &ColumnSchema, text: &str) -> Value {
    let parts = split_at_depth_zero(text, schema.component_delimiter);
    Value::Nested(
        parts
            .into_iter()
            .enumerate()
            .map(|(i, part)| match schema.components.get(i) {
                Some(component) => decode_cell(component, part),
                None => Value::Scalar(part.to_string()),
            })
            .collect(),
    )
}

fn encode_components(schema: &ColumnSchema, parts: &[Value]) -> String {
    let encoded: Vec<String> = parts
        .iter()
        .enumerate()
        .map(|(i, part)| match schema.components.get(i) {
            Some(component) => encode_cell(component, part),
            None => encode_unschemed(part),
        })
        .collect();
    join(&encoded, schema.component_delimiter)
}

/// Encoding used when no schema matches the value's shape.
fn encode_unschemed(value: &Value) -> String {
    match value {
        Value::Scalar(s) => s.clone(),
        Value::List(items) => join(items, DEFAULT_ARRAY_DELIMITER),
        Value::Nested(parts) => {
            let encoded: Vec<String> = parts.iter().map(encode_unschemed).collect();
            join(&encoded, DEFAULT_COMPONENT_DELIMITER)
        }
    }
}

fn join(items: &[String], delimiter: char) -> String {
    let mut buf = [0u8; 4];
    items.join(delimiter.encode_utf8(&mut buf))
}
