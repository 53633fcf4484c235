//! Configuration for CSV++ readers and writers.
//!
//! - [`ReaderOptions`]: field delimiter, comments, trimming, quoting and the
//!   nesting-depth limit applied to the header row
//! - [`WriterOptions`]: field delimiter and line terminator
//!
//! ## Examples
//!
//! ```rust
//! use serde_csvpp::{ReaderOptions, Terminator, WriterOptions};
//!
//! let reader = ReaderOptions::new()
//!     .with_delimiter(b';')
//!     .with_max_nesting_depth(4);
//! assert_eq!(reader.effective_max_depth(), 4);
//!
//! let writer = WriterOptions::new().with_terminator(Terminator::CrLf);
//! assert_eq!(writer.terminator.as_str(), "\r\n");
//! ```

use crate::header::DEFAULT_MAX_NESTING_DEPTH;

/// Line terminator emitted by a writer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Terminator {
    #[default]
    Lf,
    CrLf,
}

impl Terminator {
    /// Returns the string representation of this terminator.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Terminator::Lf => "\n",
            Terminator::CrLf => "\r\n",
        }
    }

    pub(crate) fn to_csv(self) -> csv::Terminator {
        match self {
            Terminator::Lf => csv::Terminator::Any(b'\n'),
            Terminator::CrLf => csv::Terminator::CRLF,
        }
    }
}

/// Options for [`crate::Reader`].
///
/// The tokenizer-level settings are handed to the underlying `csv` reader;
/// `max_nesting_depth` bounds the header grammar.
#[derive(Clone, Debug)]
pub struct ReaderOptions {
    pub delimiter: u8,
    pub comment: Option<u8>,
    pub trim: bool,
    pub quoting: bool,
    /// Zero selects [`DEFAULT_MAX_NESTING_DEPTH`].
    pub max_nesting_depth: usize,
}

impl Default for ReaderOptions {
    fn default() -> Self {
        ReaderOptions {
            delimiter: b',',
            comment: None,
            trim: false,
            quoting: true,
            max_nesting_depth: DEFAULT_MAX_NESTING_DEPTH,
        }
    }
}

impl ReaderOptions {
    /// Creates default options: comma separated, no comments, depth limit 10.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use serde_csvpp::ReaderOptions;
    ///
    /// let options = ReaderOptions::new();
    /// assert_eq!(options.delimiter, b',');
    /// assert_eq!(options.max_nesting_depth, 10);
    /// ```
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the field delimiter.
    #[must_use]
    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Lines starting with `comment` are skipped by the tokenizer.
    #[must_use]
    pub fn with_comment(mut self, comment: u8) -> Self {
        self.comment = Some(comment);
        self
    }

    /// Trims surrounding whitespace from every field, header cells included.
    #[must_use]
    pub fn with_trim(mut self, trim: bool) -> Self {
        self.trim = trim;
        self
    }

    /// Disables quote handling so `"` is read as a literal character.
    #[must_use]
    pub fn with_quoting(mut self, quoting: bool) -> Self {
        self.quoting = quoting;
        self
    }

    /// Sets the maximum component nesting depth accepted in the header.
    #[must_use]
    pub fn with_max_nesting_depth(mut self, depth: usize) -> Self {
        self.max_nesting_depth = depth;
        self
    }

    /// The depth limit actually enforced.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use serde_csvpp::ReaderOptions;
    ///
    /// let options = ReaderOptions::new().with_max_nesting_depth(0);
    /// assert_eq!(options.effective_max_depth(), 10);
    /// ```
    #[must_use]
    pub fn effective_max_depth(&self) -> usize {
        if self.max_nesting_depth == 0 {
            DEFAULT_MAX_NESTING_DEPTH
        } else {
            self.max_nesting_depth
        }
    }

    pub(crate) fn builder(&self) -> csv::ReaderBuilder {
        let mut builder = csv::ReaderBuilder::new();
        builder
            .has_headers(false)
            .flexible(false)
            .delimiter(self.delimiter)
            .comment(self.comment)
            .quoting(self.quoting)
            .trim(if self.trim {
                csv::Trim::All
            } else {
                csv::Trim::None
            });
        builder
    }
}

/// Options for [`crate::Writer`].
#[derive(Clone, Debug)]
pub struct WriterOptions {
    pub delimiter: u8,
    pub terminator: Terminator,
}

impl Default for WriterOptions {
    fn default() -> Self {
        WriterOptions {
            delimiter: b',',
            terminator: Terminator::default(),
        }
    }
}

impl WriterOptions {
    /// Creates default options: comma separated, `\n` line endings.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use serde_csvpp::{Terminator, WriterOptions};
    ///
    /// let options = WriterOptions::new();
    /// assert_eq!(options.delimiter, b',');
    /// assert_eq!(options.terminator, Terminator::Lf);
    /// ```
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the field delimiter.
    #[must_use]
    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Sets the line terminator.
    #[must_use]
    pub fn with_terminator(mut self, terminator: Terminator) -> Self {
        self.terminator = terminator;
        self
    }

    pub(crate) fn builder(&self) -> csv::WriterBuilder {
        let mut builder = csv::WriterBuilder::new();
        builder
            .has_headers(false)
            .delimiter(self.delimiter)
            .terminator(self.terminator.to_csv());
        builder
    }
}
