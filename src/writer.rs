//! Streaming CSV++ writer.
//!
//! A [`Writer`] holds the column schemas, formats them into the header row
//! once, and encodes every record against them.
//!
//! ## Examples
//!
//! ```rust
//! use serde_csvpp::{parse_header, Value, Writer};
//!
//! let mut writer = Writer::from_writer(Vec::new());
//! writer.set_headers(vec![
//!     parse_header("name").unwrap(),
//!     parse_header("geo(lat^lon)").unwrap(),
//! ]);
//! writer
//!     .write_record(&[
//!         Value::from("LA"),
//!         Value::Nested(vec![Value::from("34.05"), Value::from("-118.24")]),
//!     ])
//!     .unwrap();
//!
//! let text = String::from_utf8(writer.into_inner().unwrap()).unwrap();
//! assert_eq!(text, "name,geo(lat^lon)\nLA,34.05^-118.24\n");
//! ```

use crate::codec::encode_record;
use crate::header::ColumnSchema;
use crate::options::WriterOptions;
use crate::value::Value;
use crate::{Error, Result};
use serde::Serialize;
use std::io;
use tracing::{debug, trace, warn};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum State {
    HeaderPending,
    Streaming,
}

/// Writes CSV++ records to any [`io::Write`].
pub struct Writer<W: io::Write> {
    csv: csv::Writer<W>,
    headers: Vec<ColumnSchema>,
    state: State,
    line: u64,
}

impl<W: io::Write> Writer<W> {
    /// Creates a writer with default options.
    pub fn from_writer(wtr: W) -> Self {
        Self::with_options(wtr, WriterOptions::default())
    }

    /// Creates a writer with the given options.
    pub fn with_options(wtr: W, options: WriterOptions) -> Self {
        Writer {
            csv: options.builder().from_writer(wtr),
            headers: Vec::new(),
            state: State::HeaderPending,
            line: 0,
        }
    }

    /// Replaces the column schemas.
    ///
    /// Ignored once the header row has been written, so records always match
    /// the header already in the output.
    pub fn set_headers(&mut self, headers: Vec<ColumnSchema>) {
        if self.state == State::Streaming {
            warn!(
                columns = headers.len(),
                "ignoring new headers after the header row was written"
            );
            return;
        }
        self.headers = headers;
    }

    pub fn headers(&self) -> &[ColumnSchema] {
        &self.headers
    }

    /// Writes the header row. Later calls do nothing.
    ///
    /// # Errors
    ///
    /// [`Error::NoHeader`] when no headers were set, or an I/O error.
    pub fn write_header(&mut self) -> Result<()> {
        if self.state == State::Streaming {
            return Ok(());
        }
        if self.headers.is_empty() {
            return Err(Error::NoHeader);
        }
        let cells: Vec<String> = self.headers.iter().map(ToString::to_string).collect();
        self.write_row(&cells)?;
        self.state = State::Streaming;
        debug!(columns = self.headers.len(), "wrote CSV++ header row");
        Ok(())
    }

    /// Encodes and writes one record, writing the header first if needed.
    ///
    /// # Errors
    ///
    /// Header errors from [`Writer::write_header`], a field count different
    /// from the header's, or an I/O error.
    pub fn write_record(&mut self, record: &[Value]) -> Result<()> {
        self.write_header()?;
        let cells = encode_record(&self.headers, record);
        self.write_row(&cells)?;
        trace!(line = self.line, fields = cells.len(), "wrote record");
        Ok(())
    }

    /// Writes the header, every record, and flushes.
    ///
    /// The header is written even when `records` is empty.
    pub fn write_all<I>(&mut self, records: I) -> Result<()>
    where
        I: IntoIterator,
        I::Item: AsRef<[Value]>,
    {
        self.write_header()?;
        for record in records {
            self.write_record(record.as_ref())?;
        }
        self.flush()
    }

    /// Binds `value` to the headers through serde and writes it.
    ///
    /// When no headers were set they are inferred from `value`; see
    /// [`crate::ser::infer_headers`].
    pub fn serialize<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        if self.headers.is_empty() {
            self.headers = crate::ser::infer_headers(value)?;
            debug!(columns = self.headers.len(), "inferred CSV++ headers");
        }
        let record = crate::ser::to_record(value, &self.headers)?;
        self.write_record(&record)
    }

    pub fn flush(&mut self) -> Result<()> {
        self.csv.flush()?;
        Ok(())
    }

    /// Flushes and returns the underlying sink.
    pub fn into_inner(self) -> Result<W> {
        self.csv
            .into_inner()
            .map_err(|err| Error::io(&err.error().to_string()))
    }

    fn write_row(&mut self, cells: &[String]) -> Result<()> {
        self.csv
            .write_record(cells)
            .map_err(|err| Error::from_csv(err, self.line + 1))?;
        self.line += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RowErrorKind;
    use crate::header::parse_header;
    use crate::options::Terminator;

    fn headers(texts: &[&str]) -> Vec<ColumnSchema> {
        texts.iter().map(|t| parse_header(t).unwrap()).collect()
    }

    fn output(writer: Writer<Vec<u8>>) -> String {
        String::from_utf8(writer.into_inner().unwrap()).unwrap()
    }

    #[test]
    fn test_no_headers() {
        let mut writer = Writer::from_writer(Vec::new());
        assert!(matches!(writer.write_header(), Err(Error::NoHeader)));
        assert!(matches!(
            writer.write_record(&[Value::from("a")]),
            Err(Error::NoHeader)
        ));
    }

    #[test]
    fn test_header_written_once() {
        let mut writer = Writer::from_writer(Vec::new());
        writer.set_headers(headers(&["name", "tags[|]"]));
        writer.write_header().unwrap();
        writer.write_header().unwrap();
        writer
            .write_record(&[Value::from("a"), Value::from(vec!["x", "y"])])
            .unwrap();
        assert_eq!(output(writer), "name,tags[|]\na,x|y\n");
    }

    #[test]
    fn test_headers_fixed_after_header_row() {
        let mut writer = Writer::from_writer(Vec::new());
        writer.set_headers(headers(&["geo(lat^lon)"]));
        writer
            .write_record(&[Value::Nested(vec![Value::from("1"), Value::from("2")])])
            .unwrap();

        writer.set_headers(headers(&["geo;(lat;lon)"]));
        assert_eq!(writer.headers()[0].component_delimiter, '^');
        writer
            .write_record(&[Value::Nested(vec![Value::from("3"), Value::from("4")])])
            .unwrap();
        assert_eq!(output(writer), "geo(lat^lon)\n1^2\n3^4\n");
    }

    #[test]
    fn test_write_all_empty_still_writes_header() {
        let mut writer = Writer::from_writer(Vec::new());
        writer.set_headers(headers(&["geo(lat^lon)"]));
        writer.write_all(Vec::<Vec<Value>>::new()).unwrap();
        assert_eq!(output(writer), "geo(lat^lon)\n");
    }

    #[test]
    fn test_quotes_cells_containing_field_delimiter() {
        let mut writer = Writer::from_writer(Vec::new());
        writer.set_headers(headers(&["name"]));
        writer.write_record(&[Value::from("Smith, J")]).unwrap();
        assert_eq!(output(writer), "name\n\"Smith, J\"\n");
    }

    #[test]
    fn test_field_count_mismatch() {
        let mut writer = Writer::from_writer(Vec::new());
        writer.set_headers(headers(&["a", "b"]));
        let err = writer.write_record(&[Value::from("1")]).unwrap_err();
        assert!(matches!(
            err,
            Error::Row {
                kind: RowErrorKind::FieldCount {
                    expected: 2,
                    found: 1
                },
                ..
            }
        ));
    }

    #[test]
    fn test_options() {
        let options = WriterOptions::new()
            .with_delimiter(b';')
            .with_terminator(Terminator::CrLf);
        let mut writer = Writer::with_options(Vec::new(), options);
        writer.set_headers(headers(&["a", "b[]"]));
        writer
            .write_record(&[Value::from("1"), Value::from(vec!["x", "y"])])
            .unwrap();
        assert_eq!(output(writer), "a;b[]\r\n1;x~y\r\n");
    }
}
