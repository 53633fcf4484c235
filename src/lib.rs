//! # serde_csvpp
//!
//! A reader, writer and Serde binding for CSV++, the CSV dialect whose header
//! cells describe arrays and nested structures.
//!
//! ## What is CSV++?
//!
//! CSV++ keeps every file a valid CSV file. The header row declares, per
//! column, how a cell is split further:
//!
//! ```text
//! name,phone[],geo(lat^lon),address[](type^street)
//! Alice,555-1234~555-5678,34.05^-118.24,home^1 Main~work^2 Oak
//! ```
//!
//! `phone` is an array split on `~`, `geo` a structure split on `^`, and
//! `address` an array of structures. See [`format`] for the full grammar.
//!
//! ## Key Features
//!
//! - **Header grammar**: parse and format column declarations, with custom
//!   delimiters and nesting up to a configurable depth
//! - **Cell codec**: schema-driven split and join that never fails on odd data
//! - **Streaming**: record-at-a-time [`Reader`] and [`Writer`] over the `csv` crate
//! - **Serde Compatible**: bind rows to `#[derive(Deserialize)]` structs and back
//! - **Conversion**: project records to JSON or YAML ([`convert`])
//!
//! ## Quick Start
//!
//! ```toml
//! [dependencies]
//! serde_csvpp = "0.1"
//! serde = { version = "1.0", features = ["derive"] }
//! ```
//!
//! ### Records
//!
//! ```rust
//! use serde_csvpp::{Reader, Value};
//!
//! let data = "name,geo(lat^lon)\nLA,34.05^-118.24\n";
//! let mut reader = Reader::from_reader(data.as_bytes());
//!
//! for record in reader.records() {
//!     let record = record.unwrap();
//!     assert_eq!(record[1].get(0), Some(&Value::from("34.05")));
//! }
//! ```
//!
//! ### Serde
//!
//! ```rust
//! use serde::{Deserialize, Serialize};
//! use serde_csvpp::{from_str, to_string};
//!
//! #[derive(Serialize, Deserialize, Debug, PartialEq)]
//! struct Geo { lat: f64, lon: f64 }
//!
//! #[derive(Serialize, Deserialize, Debug, PartialEq)]
//! struct Place { name: String, tags: Vec<String>, geo: Geo }
//!
//! let places = vec![Place {
//!     name: "LA".to_string(),
//!     tags: vec!["west".to_string(), "coast".to_string()],
//!     geo: Geo { lat: 34.05, lon: -118.24 },
//! }];
//!
//! let text = to_string(&places).unwrap();
//! assert_eq!(text, "name,tags[],geo(lat^lon)\nLA,west~coast,34.05^-118.24\n");
//!
//! let back: Vec<Place> = from_str(&text).unwrap();
//! assert_eq!(back, places);
//! ```
//!
//! ## Logging
//!
//! Lifecycle events (header parsed, header written, end of input) are emitted
//! at `debug` level and per-row events at `trace` level through [`tracing`].
//! Install any subscriber to see them.
//!
//! ## Examples
//!
//! See the `demos/` directory:
//!
//! - **`simple.rs`** - reading and writing records
//! - **`nested_fields.rs`** - structured and array-structured columns
//! - **`dynamic_values.rs`** - working with [`Value`] directly
//! - **`custom_options.rs`** - delimiters, comments and depth limits
//! - **`json_export.rs`** - converting CSV++ to JSON and YAML
//!
//! Run any example with: `cargo run --example <name>`

pub mod codec;
pub mod convert;
pub mod de;
pub mod error;
pub mod format;
pub mod header;
pub mod options;
pub mod reader;
pub mod ser;
pub mod value;
pub mod writer;

pub use codec::{decode_cell, decode_record, encode_cell, encode_record};
pub use error::{DelimiterKind, Error, GrammarError, Result, RowErrorKind};
pub use header::{
    format_header, parse_header, parse_header_row, parse_header_with_depth,
    split_at_depth_zero, ColumnSchema, FieldKind, DEFAULT_ARRAY_DELIMITER,
    DEFAULT_COMPONENT_DELIMITER, DEFAULT_MAX_NESTING_DEPTH, DELIMITER_PROGRESSION,
};
pub use options::{ReaderOptions, Terminator, WriterOptions};
pub use reader::Reader;
pub use value::{Record, Value};
pub use writer::Writer;

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::io;

/// Serialize a slice of rows to a CSV++ string, inferring the headers from
/// the rows.
///
/// # Examples
///
/// ```rust
/// use serde::Serialize;
/// use serde_csvpp::to_string;
///
/// #[derive(Serialize)]
/// struct Person { name: String, phone: Vec<String> }
///
/// let people = vec![Person { name: "Alice".into(), phone: vec!["1".into(), "2".into()] }];
/// assert_eq!(to_string(&people).unwrap(), "name,phone[]\nAlice,1~2\n");
/// ```
///
/// # Errors
///
/// Returns an error if headers cannot be inferred from the rows or a row
/// does not fit them.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_string<T: Serialize>(rows: &[T]) -> Result<String> {
    let mut buf = Vec::new();
    to_writer(&mut buf, rows)?;
    String::from_utf8(buf).map_err(|e| Error::custom(e.to_string()))
}

/// Serialize a slice of rows to a writer, inferring the headers from all of
/// the rows. An empty slice writes nothing.
///
/// # Errors
///
/// Returns an error if headers cannot be inferred, a row does not fit them,
/// or writing fails.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_writer<W, T>(writer: W, rows: &[T]) -> Result<()>
where
    W: io::Write,
    T: Serialize,
{
    if rows.is_empty() {
        return Ok(());
    }
    let headers = ser::infer_headers_from_rows(rows)?;
    to_writer_with_headers(writer, headers, rows)
}

/// Serialize a slice of rows under explicit headers.
///
/// Fields are matched to columns and components by name. The header row is
/// written even when `rows` is empty.
///
/// # Examples
///
/// ```rust
/// use serde::Serialize;
/// use serde_csvpp::{parse_header, to_writer_with_headers};
///
/// #[derive(Serialize)]
/// struct Geo { lat: f64, lon: f64 }
///
/// #[derive(Serialize)]
/// struct Place { name: String, geo: Geo }
///
/// let headers = vec![parse_header("geo;(lon;lat)").unwrap(), parse_header("name").unwrap()];
/// let places = vec![Place { name: "LA".into(), geo: Geo { lat: 34.0, lon: -118.5 } }];
///
/// let mut buf = Vec::new();
/// to_writer_with_headers(&mut buf, headers, &places).unwrap();
/// assert_eq!(String::from_utf8(buf).unwrap(), "geo;(lon;lat),name\n-118.5;34,LA\n");
/// ```
///
/// # Errors
///
/// Returns [`Error::NoHeader`] for an empty header list, a binding error if a
/// row does not fit the headers, or an I/O error.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_writer_with_headers<W, T>(writer: W, headers: Vec<ColumnSchema>, rows: &[T]) -> Result<()>
where
    W: io::Write,
    T: Serialize,
{
    let mut writer = Writer::from_writer(writer);
    writer.set_headers(headers);
    writer.write_header()?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()
}

/// Deserialize every row of a CSV++ string.
///
/// # Examples
///
/// ```rust
/// use serde::Deserialize;
/// use serde_csvpp::from_str;
///
/// #[derive(Deserialize, PartialEq, Debug)]
/// struct Person { name: String, phone: Vec<String> }
///
/// let people: Vec<Person> = from_str("name,phone[]\nAlice,1~2\n").unwrap();
/// assert_eq!(people[0].phone, vec!["1", "2"]);
/// ```
///
/// # Errors
///
/// Returns an error if the header is missing or invalid, a row is malformed,
/// or a row cannot be bound to `T`. Row errors carry their line number.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn from_str<T: DeserializeOwned>(s: &str) -> Result<Vec<T>> {
    from_reader(s.as_bytes())
}

/// Deserialize every row read from an I/O stream.
///
/// # Errors
///
/// See [`from_str`]; I/O failures are reported as [`Error::Io`].
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn from_reader<R, T>(reader: R) -> Result<Vec<T>>
where
    R: io::Read,
    T: DeserializeOwned,
{
    from_reader_with_options(reader, ReaderOptions::default())
}

/// Deserialize every row read from an I/O stream with custom reader options.
///
/// # Examples
///
/// ```rust
/// use serde::Deserialize;
/// use serde_csvpp::{from_reader_with_options, ReaderOptions};
///
/// #[derive(Deserialize)]
/// struct Row { id: u32, tags: Vec<String> }
///
/// let data = "id;tags[]\n7;a~b\n";
/// let rows: Vec<Row> =
///     from_reader_with_options(data.as_bytes(), ReaderOptions::new().with_delimiter(b';')).unwrap();
/// assert_eq!(rows[0].id, 7);
/// ```
///
/// # Errors
///
/// See [`from_str`].
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn from_reader_with_options<R, T>(reader: R, options: ReaderOptions) -> Result<Vec<T>>
where
    R: io::Read,
    T: DeserializeOwned,
{
    Reader::with_options(reader, options).deserialize().collect()
}

/// Deserialize every row from bytes of CSV++ text.
///
/// # Errors
///
/// See [`from_str`]; invalid UTF-8 is reported as a row error.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn from_slice<T: DeserializeOwned>(v: &[u8]) -> Result<Vec<T>> {
    from_reader(v)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Serialize, Deserialize, Debug, PartialEq)]
    struct Address {
        kind: String,
        street: String,
    }

    #[derive(Serialize, Deserialize, Debug, PartialEq)]
    struct User {
        id: u32,
        name: String,
        active: bool,
        tags: Vec<String>,
        address: Vec<Address>,
        nickname: Option<String>,
    }

    fn users() -> Vec<User> {
        vec![
            User {
                id: 1,
                name: "Alice".to_string(),
                active: true,
                tags: vec!["admin".to_string(), "user".to_string()],
                address: vec![
                    Address {
                        kind: "home".to_string(),
                        street: "1 Main".to_string(),
                    },
                    Address {
                        kind: "work".to_string(),
                        street: "2 Oak".to_string(),
                    },
                ],
                nickname: Some("Al".to_string()),
            },
            User {
                id: 2,
                name: "Bob".to_string(),
                active: false,
                tags: vec![],
                address: vec![],
                nickname: None,
            },
        ]
    }

    #[test]
    fn test_serialize_deserialize_users() {
        let text = to_string(&users()).unwrap();
        assert_eq!(
            text,
            "id,name,active,tags[],address[](kind^street),nickname\n\
             1,Alice,true,admin~user,home^1 Main~work^2 Oak,Al\n\
             2,Bob,false,,,\n"
        );
        let back: Vec<User> = from_str(&text).unwrap();
        assert_eq!(back, users());
    }

    #[test]
    fn test_empty_slice_writes_nothing() {
        let empty: Vec<User> = Vec::new();
        assert_eq!(to_string(&empty).unwrap(), "");
    }

    #[test]
    fn test_explicit_headers_written_for_empty_slice() {
        let empty: Vec<User> = Vec::new();
        let mut buf = Vec::new();
        to_writer_with_headers(&mut buf, vec![parse_header("id").unwrap()], &empty).unwrap();
        assert_eq!(buf, b"id\n");
    }

    #[test]
    fn test_from_slice() {
        let rows: Vec<(String, Vec<u8>)> = from_slice(b"a,b[]\nx,1~2\n").unwrap();
        assert_eq!(rows, vec![("x".to_string(), vec![1, 2])]);
    }

    #[test]
    fn test_row_error_carries_line() {
        let err = from_str::<(u8, u8)>("a,b\n1,2\n3\n").unwrap_err();
        assert_eq!(err.line(), Some(3));
    }
}
