//! Streaming CSV++ reader.
//!
//! A [`Reader`] wraps a `csv` tokenizer. The first row it sees is parsed as
//! the header; every later row is decoded against those schemas. A header
//! that fails to parse poisons the reader: every later call returns the same
//! error.
//!
//! ## Examples
//!
//! ```rust
//! use serde_csvpp::{Reader, Value};
//!
//! let data = "name,phone[]\nAlice,555-1234~555-5678\n";
//! let mut reader = Reader::from_reader(data.as_bytes());
//!
//! assert_eq!(reader.headers().unwrap()[1].name, "phone");
//!
//! let record = reader.read_record().unwrap().unwrap();
//! assert_eq!(record[1], Value::from(vec!["555-1234", "555-5678"]));
//! assert!(reader.read_record().unwrap().is_none());
//! ```

use crate::codec::decode_record;
use crate::header::{parse_header_row_at, ColumnSchema};
use crate::options::ReaderOptions;
use crate::value::Record;
use crate::{Error, Result};
use serde::de::DeserializeOwned;
use std::io;
use std::marker::PhantomData;
use tracing::{debug, trace};

enum State {
    HeaderPending,
    Streaming(Vec<ColumnSchema>),
    Poisoned(Error),
}

/// Reads CSV++ records from any [`io::Read`].
pub struct Reader<R> {
    csv: csv::Reader<R>,
    options: ReaderOptions,
    state: State,
    record: csv::StringRecord,
    line: u64,
}

impl<R: io::Read> Reader<R> {
    /// Creates a reader with default options.
    pub fn from_reader(rdr: R) -> Self {
        Self::with_options(rdr, ReaderOptions::default())
    }

    /// Creates a reader with the given options.
    pub fn with_options(rdr: R, options: ReaderOptions) -> Self {
        Reader {
            csv: options.builder().from_reader(rdr),
            options,
            state: State::HeaderPending,
            record: csv::StringRecord::new(),
            line: 0,
        }
    }

    pub fn options(&self) -> &ReaderOptions {
        &self.options
    }

    /// Line of the last row read, 0 before the first.
    pub fn line(&self) -> u64 {
        self.line
    }

    /// Returns the column schemas, reading and parsing the header row on first call.
    ///
    /// # Errors
    ///
    /// [`Error::NoHeader`] on empty input, or a row error on line 1 naming the
    /// first column that failed to parse.
    pub fn headers(&mut self) -> Result<&[ColumnSchema]> {
        self.ensure_headers()?;
        match &self.state {
            State::Streaming(headers) => Ok(headers),
            State::Poisoned(err) => Err(err.clone()),
            State::HeaderPending => Err(Error::NoHeader),
        }
    }

    /// Reads and decodes the next data row. Returns `Ok(None)` at end of input.
    ///
    /// # Errors
    ///
    /// Header errors (see [`Reader::headers`]), tokenizer failures, and rows
    /// whose field count differs from the header's.
    pub fn read_record(&mut self) -> Result<Option<Record>> {
        self.ensure_headers()?;
        let headers = match &self.state {
            State::Streaming(headers) => headers,
            State::Poisoned(err) => return Err(err.clone()),
            State::HeaderPending => return Err(Error::NoHeader),
        };

        match self.csv.read_record(&mut self.record) {
            Ok(true) => {}
            Ok(false) => {
                debug!(line = self.line, "reached end of CSV++ input");
                return Ok(None);
            }
            Err(err) => return Err(Error::from_csv(err, self.line + 1)),
        }
        self.line = self
            .record
            .position()
            .map_or(self.line + 1, csv::Position::line);

        let cells: Vec<&str> = self.record.iter().collect();
        let record = decode_record(headers, cells.as_slice());
        trace!(line = self.line, fields = record.len(), "decoded record");
        Ok(Some(record))
    }

    /// Iterates over the remaining records.
    ///
    /// Iteration ends after a header error, since no later row can be decoded.
    pub fn records(&mut self) -> RecordsIter<'_, R> {
        RecordsIter {
            reader: self,
            done: false,
        }
    }

    /// Reads every remaining record, stopping at the first error.
    pub fn read_all(&mut self) -> Result<Vec<Record>> {
        self.records().collect()
    }

    /// Iterates over the remaining records, binding each to `T` through serde.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use serde::Deserialize;
    /// use serde_csvpp::Reader;
    ///
    /// #[derive(Deserialize)]
    /// struct Geo { lat: f64, lon: f64 }
    ///
    /// #[derive(Deserialize)]
    /// struct Place { name: String, geo: Geo }
    ///
    /// let data = "name,geo(lat^lon)\nLA,34.05^-118.24\n";
    /// let mut reader = Reader::from_reader(data.as_bytes());
    /// let places: Vec<Place> = reader.deserialize().collect::<Result<_, _>>().unwrap();
    ///
    /// assert_eq!(places[0].name, "LA");
    /// assert_eq!(places[0].geo.lon, -118.24);
    /// ```
    pub fn deserialize<T: DeserializeOwned>(&mut self) -> DeserializeRecordsIter<'_, R, T> {
        DeserializeRecordsIter {
            reader: self,
            done: false,
            _marker: PhantomData,
        }
    }

    /// Consumes the reader and returns the underlying source.
    pub fn into_inner(self) -> R {
        self.csv.into_inner()
    }

    fn is_poisoned(&self) -> bool {
        matches!(self.state, State::Poisoned(_))
    }

    fn ensure_headers(&mut self) -> Result<()> {
        if matches!(self.state, State::HeaderPending) {
            self.state = match self.read_header_row() {
                Ok(headers) => State::Streaming(headers),
                Err(err) => {
                    debug!(error = %err, "CSV++ header rejected");
                    State::Poisoned(err)
                }
            };
        }
        match &self.state {
            State::Poisoned(err) => Err(err.clone()),
            _ => Ok(()),
        }
    }

    fn read_header_row(&mut self) -> Result<Vec<ColumnSchema>> {
        match self.csv.read_record(&mut self.record) {
            Ok(true) => {}
            Ok(false) => return Err(Error::NoHeader),
            Err(err) => return Err(Error::from_csv(err, 1)),
        }
        self.line = self.record.position().map_or(1, csv::Position::line);

        let cells: Vec<&str> = self.record.iter().collect();
        let max_depth = self.options.effective_max_depth();
        let headers = parse_header_row_at(self.line, cells.as_slice(), max_depth)?;
        debug!(
            columns = headers.len(),
            max_depth,
            line = self.line,
            "parsed CSV++ header row"
        );
        Ok(headers)
    }
}

/// Iterator returned by [`Reader::records`].
pub struct RecordsIter<'r, R> {
    reader: &'r mut Reader<R>,
    done: bool,
}

impl<R: io::Read> Iterator for RecordsIter<'_, R> {
    type Item = Result<Record>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.reader.read_record() {
            Ok(Some(record)) => Some(Ok(record)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(err) => {
                self.done = self.reader.is_poisoned();
                Some(Err(err))
            }
        }
    }
}

/// Iterator returned by [`Reader::deserialize`].
pub struct DeserializeRecordsIter<'r, R, T> {
    reader: &'r mut Reader<R>,
    done: bool,
    _marker: PhantomData<T>,
}

impl<R: io::Read, T: DeserializeOwned> Iterator for DeserializeRecordsIter<'_, R, T> {
    type Item = Result<T>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.reader.read_record() {
            Ok(Some(record)) => match &self.reader.state {
                State::Streaming(headers) => Some(crate::de::from_record(headers, record)),
                _ => Some(Err(Error::NoHeader)),
            },
            Ok(None) => {
                self.done = true;
                None
            }
            Err(err) => {
                self.done = self.reader.is_poisoned();
                Some(Err(err))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RowErrorKind;
    use crate::value::Value;
    use crate::GrammarError;

    fn reader(data: &str) -> Reader<&[u8]> {
        Reader::from_reader(data.as_bytes())
    }

    #[test]
    fn test_empty_input_has_no_header() {
        let mut rdr = reader("");
        assert!(matches!(rdr.headers(), Err(Error::NoHeader)));
        assert!(matches!(rdr.read_record(), Err(Error::NoHeader)));
    }

    #[test]
    fn test_header_only_input() {
        let mut rdr = reader("name,geo(lat^lon)\n");
        assert_eq!(rdr.headers().unwrap().len(), 2);
        assert!(rdr.read_record().unwrap().is_none());
        assert!(rdr.read_all().unwrap().is_empty());
    }

    #[test]
    fn test_read_all_rows() {
        let mut rdr = reader("name,address[](type^street)\nAlice,home^1 Main~work^2 Oak\nBob,\n");
        let records = rdr.read_all().unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1], vec![Value::from("Bob"), Value::Nested(vec![])]);
        assert_eq!(rdr.line(), 3);
    }

    #[test]
    fn test_bad_header_poisons_reader() {
        let mut rdr = reader("name,geo(lat^lon\nAlice,1^2\n");
        let err = rdr.headers().unwrap_err();
        assert!(matches!(
            err,
            Error::Row {
                line: 1,
                column: Some(2),
                kind: RowErrorKind::Grammar(GrammarError::UnmatchedParen),
                ..
            }
        ));
        assert_eq!(rdr.read_record().unwrap_err().grammar(), Some(&GrammarError::UnmatchedParen));

        let results: Vec<_> = rdr.records().collect();
        assert_eq!(results.len(), 1);
        assert!(results[0].is_err());
    }

    #[test]
    fn test_field_count_mismatch() {
        let mut rdr = reader("a,b\n1,2\n3\n");
        assert!(rdr.read_record().unwrap().is_some());
        let err = rdr.read_record().unwrap_err();
        assert!(matches!(
            err,
            Error::Row {
                line: 3,
                kind: RowErrorKind::FieldCount {
                    expected: 2,
                    found: 1
                },
                ..
            }
        ));
    }

    #[test]
    fn test_options_are_applied() {
        let data = "# comment\nname;tags[]\nAlice;a~b\n";
        let options = ReaderOptions::new().with_delimiter(b';').with_comment(b'#');
        let mut rdr = Reader::with_options(data.as_bytes(), options);
        let records = rdr.read_all().unwrap();
        assert_eq!(records, vec![vec![Value::from("Alice"), Value::from(vec!["a", "b"])]]);
    }

    #[test]
    fn test_depth_limit_from_options() {
        let data = "a(b(c))\nx\n";
        let options = ReaderOptions::new().with_max_nesting_depth(1);
        let mut rdr = Reader::with_options(data.as_bytes(), options);
        assert!(matches!(
            rdr.headers().unwrap_err().grammar(),
            Some(GrammarError::NestingTooDeep { .. })
        ));

        let mut rdr = Reader::with_options(data.as_bytes(), ReaderOptions::new());
        assert!(rdr.headers().is_ok());
    }

    #[test]
    fn test_quoted_cells_keep_delimiters() {
        let mut rdr = reader("name,tags[]\n\"Smith, J\",\"a,b~c\"\n");
        let record = rdr.read_record().unwrap().unwrap();
        assert_eq!(record[0], Value::from("Smith, J"));
        assert_eq!(record[1], Value::from(vec!["a,b", "c"]));
    }
}
