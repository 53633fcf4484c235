//! JSON and YAML projections of CSV++ records.
//!
//! Every record becomes an object keyed by column name, in header order:
//!
//! | Column kind | JSON |
//! |---|---|
//! | Simple | string |
//! | Array | array of strings |
//! | Structured | object keyed by component name |
//! | ArrayStructured | array of such objects |
//!
//! Only cells that have a header (and components that have a schema) are
//! kept; surplus values are dropped.
//!
//! ## Examples
//!
//! ```rust
//! use serde_csvpp::{convert, Reader};
//!
//! let data = "name,geo(lat^lon)\nLA,34.05^-118.24\n";
//! let mut reader = Reader::from_reader(data.as_bytes());
//! let headers = reader.headers().unwrap().to_vec();
//! let records = reader.read_all().unwrap();
//!
//! let json = convert::to_json(&headers, &records).unwrap();
//! assert_eq!(json, r#"[{"name":"LA","geo":{"lat":"34.05","lon":"-118.24"}}]"#);
//! ```

use crate::header::{ColumnSchema, FieldKind};
use crate::value::Value;
use crate::{Error, Result};
use serde_json::{Map, Value as JsonValue};
use std::io;
use tracing::debug;

/// Converts one record into a JSON object keyed by column name.
#[must_use]
pub fn record_to_json(headers: &[ColumnSchema], record: &[Value]) -> Map<String, JsonValue> {
    headers
        .iter()
        .zip(record)
        .map(|(schema, value)| (schema.name.clone(), cell_to_json(schema, value)))
        .collect()
}

fn cell_to_json(schema: &ColumnSchema, value: &Value) -> JsonValue {
    match (schema.kind, value) {
        (_, Value::Scalar(s)) => JsonValue::String(s.clone()),
        (_, Value::List(items)) => {
            JsonValue::Array(items.iter().cloned().map(JsonValue::String).collect())
        }
        (FieldKind::ArrayStructured, Value::Nested(elements)) => JsonValue::Array(
            elements
                .iter()
                .map(|element| match element {
                    Value::Nested(parts) => {
                        JsonValue::Object(record_to_json(&schema.components, parts))
                    }
                    other => cell_to_json(&ColumnSchema::simple(""), other),
                })
                .collect(),
        ),
        (FieldKind::Structured, Value::Nested(parts)) => {
            JsonValue::Object(record_to_json(&schema.components, parts))
        }
        (FieldKind::Simple | FieldKind::Array, Value::Nested(parts)) => JsonValue::Array(
            parts
                .iter()
                .map(|part| cell_to_json(&ColumnSchema::simple(""), part))
                .collect(),
        ),
    }
}

/// Streams records as one JSON array.
///
/// `[` is written with the first record. [`JsonArrayWriter::close`] writes
/// the closing `]`, or `[]` when nothing was written.
pub struct JsonArrayWriter<W: io::Write> {
    wtr: W,
    headers: Vec<ColumnSchema>,
    started: bool,
    closed: bool,
    count: usize,
}

impl<W: io::Write> JsonArrayWriter<W> {
    pub fn new(wtr: W, headers: Vec<ColumnSchema>) -> Self {
        JsonArrayWriter {
            wtr,
            headers,
            started: false,
            closed: false,
            count: 0,
        }
    }

    /// Appends one record to the array.
    ///
    /// # Errors
    ///
    /// Fails after [`JsonArrayWriter::close`], or on an I/O error.
    pub fn write(&mut self, record: &[Value]) -> Result<()> {
        if self.closed {
            return Err(Error::io("write to a closed JSON array writer"));
        }
        self.wtr.write_all(if self.started { b"," } else { b"[" })?;
        self.started = true;

        let object = JsonValue::Object(record_to_json(&self.headers, record));
        serde_json::to_writer(&mut self.wtr, &object).map_err(Error::custom)?;
        self.count += 1;
        Ok(())
    }

    /// Terminates the array and flushes. Closing twice is a no-op.
    pub fn close(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        if !self.started {
            self.wtr.write_all(b"[")?;
        }
        self.wtr.write_all(b"]")?;
        self.wtr.flush()?;
        debug!(records = self.count, "closed JSON array");
        Ok(())
    }

    pub fn into_inner(self) -> W {
        self.wtr
    }
}

/// Collects records and writes them as one YAML sequence on close.
pub struct YamlArrayWriter<W: io::Write> {
    wtr: W,
    headers: Vec<ColumnSchema>,
    records: Vec<JsonValue>,
    closed: bool,
}

impl<W: io::Write> YamlArrayWriter<W> {
    pub fn new(wtr: W, headers: Vec<ColumnSchema>) -> Self {
        YamlArrayWriter {
            wtr,
            headers,
            records: Vec::new(),
            closed: false,
        }
    }

    /// Buffers one record.
    ///
    /// # Errors
    ///
    /// Fails after [`YamlArrayWriter::close`].
    pub fn write(&mut self, record: &[Value]) -> Result<()> {
        if self.closed {
            return Err(Error::io("write to a closed YAML array writer"));
        }
        self.records
            .push(JsonValue::Object(record_to_json(&self.headers, record)));
        Ok(())
    }

    /// Writes the buffered sequence. Closing twice is a no-op.
    pub fn close(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        serde_yaml::to_writer(&mut self.wtr, &self.records).map_err(Error::custom)?;
        self.wtr.flush()?;
        debug!(records = self.records.len(), "wrote YAML sequence");
        Ok(())
    }

    pub fn into_inner(self) -> W {
        self.wtr
    }
}

/// Renders records as a compact JSON array.
pub fn to_json(headers: &[ColumnSchema], records: &[Vec<Value>]) -> Result<String> {
    let mut writer = JsonArrayWriter::new(Vec::new(), headers.to_vec());
    for record in records {
        writer.write(record)?;
    }
    writer.close()?;
    String::from_utf8(writer.into_inner()).map_err(Error::custom)
}

/// Renders records as a YAML sequence of mappings.
pub fn to_yaml(headers: &[ColumnSchema], records: &[Vec<Value>]) -> Result<String> {
    let mut writer = YamlArrayWriter::new(Vec::new(), headers.to_vec());
    for record in records {
        writer.write(record)?;
    }
    writer.close()?;
    String::from_utf8(writer.into_inner()).map_err(Error::custom)
}
