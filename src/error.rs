//! Error types for CSV++ reading, writing and binding.
//!
//! Errors fall into three groups:
//!
//! - **Grammar errors** ([`GrammarError`]): a header cell does not follow the
//!   CSV++ column grammar. A single bad column poisons the whole stream, since
//!   no data row can be interpreted without a complete schema set.
//! - **Row errors** ([`Error::Row`]): the tokenizer failed, a row had the wrong
//!   number of fields, or a header cell was rejected. These carry the 1-based
//!   line number and, when known, the 1-based column index and column name.
//! - **Binding errors** ([`Error::TypeMismatch`], [`Error::Custom`]): a decoded
//!   value could not be mapped onto a Rust type through serde.
//!
//! The cell codec itself never fails; see [`crate::codec`].
//!
//! ## Examples
//!
//! ```rust
//! use serde_csvpp::{parse_header, GrammarError};
//!
//! let err = parse_header("geo()").unwrap_err();
//! assert_eq!(err, GrammarError::EmptyComponentList);
//! ```

use std::fmt;
use thiserror::Error;

/// Which delimiter a [`GrammarError::MultiCharDelimiter`] refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DelimiterKind {
    Array,
    Component,
}

impl fmt::Display for DelimiterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DelimiterKind::Array => f.write_str("array"),
            DelimiterKind::Component => f.write_str("component"),
        }
    }
}

/// A header cell that does not match the column grammar.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GrammarError {
    /// The cell is empty or starts with a character outside `[A-Za-z0-9_-]`.
    #[error("invalid column header: name is required")]
    MissingName,

    /// `[` without a closing `]`.
    #[error("invalid column header: missing closing bracket ']'")]
    UnclosedBracket,

    /// A custom delimiter longer than one character.
    #[error("invalid column header: {kind} delimiter must be a single character")]
    MultiCharDelimiter { kind: DelimiterKind },

    /// `(` without a matching `)`.
    #[error("invalid column header: missing closing parenthesis ')'")]
    UnmatchedParen,

    /// `()` with nothing inside.
    #[error("invalid column header: component list is empty")]
    EmptyComponentList,

    /// Component lists nested deeper than the configured limit.
    #[error("nesting level exceeds limit: depth {depth} exceeds max {max}")]
    NestingTooDeep { depth: usize, max: usize },

    /// Input left over after a complete field.
    #[error("invalid column header: unexpected characters {rest:?} after closing parenthesis")]
    TrailingCharacters { rest: String },
}

/// The cause of an [`Error::Row`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RowErrorKind {
    #[error(transparent)]
    Grammar(#[from] GrammarError),

    /// The underlying CSV tokenizer rejected the row.
    #[error("{0}")]
    Csv(String),

    /// The row has a different number of fields than the header.
    #[error("wrong number of fields: expected {expected}, found {found}")]
    FieldCount { expected: usize, found: usize },
}

/// Every error the crate can return.
#[derive(Debug, Clone, Error)]
pub enum Error {
    /// IO error during reading or writing
    #[error("IO error: {0}")]
    Io(String),

    /// The input has no header row, or a writer has no headers to write.
    #[error("header record is required")]
    NoHeader,

    /// A header cell passed to [`crate::parse_header`] directly was rejected.
    #[error(transparent)]
    Grammar(#[from] GrammarError),

    /// A row-level failure, tagged with its position.
    #[error("line {line}{}: {kind}", location(.column, .field))]
    Row {
        line: u64,
        column: Option<usize>,
        field: Option<String>,
        #[source]
        kind: RowErrorKind,
    },

    /// A decoded value did not fit the Rust type it was bound to.
    #[error("type mismatch in field {field:?}: expected {expected}, found {found:?}")]
    TypeMismatch {
        field: String,
        expected: String,
        found: String,
    },

    /// Custom error
    #[error("Error: {0}")]
    Custom(String),
}

fn location(column: &Option<usize>, field: &Option<String>) -> String {
    match (column, field) {
        (Some(col), Some(name)) => format!(", column {} (field {:?})", col, name),
        (Some(col), None) => format!(", column {}", col),
        (None, Some(name)) => format!(" (field {:?})", name),
        (None, None) => String::new(),
    }
}

impl Error {
    /// Creates a row error with only a line number.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use serde_csvpp::{Error, RowErrorKind};
    ///
    /// let err = Error::row(3, RowErrorKind::Csv("bad quote".to_string()));
    /// assert_eq!(err.to_string(), "line 3: bad quote");
    /// ```
    pub fn row(line: u64, kind: RowErrorKind) -> Self {
        Error::Row {
            line,
            column: None,
            field: None,
            kind,
        }
    }

    /// Creates a row error pinned to a column, and to a field name when one is known.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use serde_csvpp::{Error, GrammarError};
    ///
    /// let err = Error::row_at(1, 2, None, GrammarError::UnmatchedParen.into());
    /// assert!(err.to_string().starts_with("line 1, column 2:"));
    ///
    /// let err = Error::row_at(4, 3, Some("geo"), GrammarError::MissingName.into());
    /// assert!(err.to_string().contains("(field \"geo\")"));
    /// ```
    pub fn row_at(line: u64, column: usize, field: Option<&str>, kind: RowErrorKind) -> Self {
        Error::Row {
            line,
            column: Some(column),
            field: field.map(str::to_string),
            kind,
        }
    }

    /// Creates a type mismatch error for the serde binding layer.
    pub fn type_mismatch(field: &str, expected: &str, found: &str) -> Self {
        Error::TypeMismatch {
            field: field.to_string(),
            expected: expected.to_string(),
            found: found.to_string(),
        }
    }

    /// Creates a custom error with a display message.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use serde_csvpp::Error;
    ///
    /// let err = Error::custom("something went wrong");
    /// assert!(err.to_string().contains("something went wrong"));
    /// ```
    pub fn custom<T: fmt::Display>(msg: T) -> Self {
        Error::Custom(msg.to_string())
    }

    /// Creates an I/O error for reading/writing failures.
    pub fn io(msg: &str) -> Self {
        Error::Io(msg.to_string())
    }

    /// Returns the line number for row errors.
    #[must_use]
    pub fn line(&self) -> Option<u64> {
        match self {
            Error::Row { line, .. } => Some(*line),
            _ => None,
        }
    }

    /// Returns the grammar error behind this error, if any.
    #[must_use]
    pub fn grammar(&self) -> Option<&GrammarError> {
        match self {
            Error::Grammar(err) => Some(err),
            Error::Row {
                kind: RowErrorKind::Grammar(err),
                ..
            } => Some(err),
            _ => None,
        }
    }
}

impl Error {
    /// Maps a `csv` tokenizer error onto a row error. `line` is used when the
    /// tokenizer did not record a position.
    pub(crate) fn from_csv(err: csv::Error, line: u64) -> Self {
        let line = err.position().map_or(line, csv::Position::line);
        match err.kind() {
            csv::ErrorKind::Io(io) => Error::Io(io.to_string()),
            csv::ErrorKind::UnequalLengths {
                expected_len, len, ..
            } => Error::row(
                line,
                RowErrorKind::FieldCount {
                    expected: *expected_len as usize,
                    found: *len as usize,
                },
            ),
            _ => Error::row(line, RowErrorKind::Csv(err.to_string())),
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err.to_string())
    }
}

impl serde::ser::Error for Error {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        Error::Custom(msg.to_string())
    }
}

impl serde::de::Error for Error {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        Error::Custom(msg.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
