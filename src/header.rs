//! Column header grammar.
//!
//! Every cell of the first row declares one column: its name and its shape.
//! This module turns such a cell into a [`ColumnSchema`] tree and renders a
//! tree back into canonical header text.
//!
//! ```text
//! field          = name [ array-part ] [ struct-part ]
//! name           = 1*( ALPHA / DIGIT / "_" / "-" )
//! array-part     = "[" [ 1CHAR ] "]"
//! struct-part    = [ 1CHAR ] "(" component-list ")"
//! component-list = field *( component-delim field )
//! ```
//!
//! ## Examples
//!
//! ```rust
//! use serde_csvpp::{format_header, parse_header, FieldKind};
//!
//! let schema = parse_header("address[|];(street;city)").unwrap();
//! assert_eq!(schema.kind, FieldKind::ArrayStructured);
//! assert_eq!(schema.array_delimiter, '|');
//! assert_eq!(schema.component_delimiter, ';');
//! assert_eq!(schema.components.len(), 2);
//!
//! assert_eq!(format_header(&schema), "address[|];(street;city)");
//! ```

use crate::error::{DelimiterKind, Error, GrammarError, Result};
use std::fmt;
use std::str::FromStr;

/// Separator between array elements unless the header overrides it.
pub const DEFAULT_ARRAY_DELIMITER: char = '~';

/// Separator between components unless the header overrides it.
pub const DEFAULT_COMPONENT_DELIMITER: char = '^';

/// Maximum component nesting accepted by default.
pub const DEFAULT_MAX_NESTING_DEPTH: usize = 10;

/// Conventional delimiters for successive nesting levels.
///
/// Level 1 uses `~`, level 2 `^`, level 3 `;`, level 4 `:`. Nothing enforces
/// this; the serde writer uses it when it has to invent headers.
pub const DELIMITER_PROGRESSION: [char; 4] = ['~', '^', ';', ':'];

/// The shape of a column.
///
/// Determined entirely by which of the array brackets and the component
/// parentheses appear in the header cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FieldKind {
    /// `name`
    Simple,
    /// `name[]` or `name[d]`
    Array,
    /// `name(a^b)` or `name;(a;b)`
    Structured,
    /// `name[](a^b)` with any combination of custom delimiters
    ArrayStructured,
}

impl FieldKind {
    /// Returns `true` if cells of this kind are split by an array delimiter.
    #[inline]
    #[must_use]
    pub const fn has_array(&self) -> bool {
        matches!(self, FieldKind::Array | FieldKind::ArrayStructured)
    }

    /// Returns `true` if this kind carries a component list.
    #[inline]
    #[must_use]
    pub const fn has_components(&self) -> bool {
        matches!(self, FieldKind::Structured | FieldKind::ArrayStructured)
    }

    const fn from_parts(array: bool, components: bool) -> Self {
        match (array, components) {
            (false, false) => FieldKind::Simple,
            (true, false) => FieldKind::Array,
            (false, true) => FieldKind::Structured,
            (true, true) => FieldKind::ArrayStructured,
        }
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldKind::Simple => f.write_str("SimpleField"),
            FieldKind::Array => f.write_str("ArrayField"),
            FieldKind::Structured => f.write_str("StructuredField"),
            FieldKind::ArrayStructured => f.write_str("ArrayStructuredField"),
        }
    }
}

/// The parsed declaration of one column.
///
/// Immutable once parsed and shared by every data row of a stream. The
/// delimiters not used by `kind` keep their defaults, so two schemas parsed
/// from equivalent header text compare equal.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ColumnSchema {
    pub name: String,
    pub kind: FieldKind,
    pub array_delimiter: char,
    pub component_delimiter: char,
    pub components: Vec<ColumnSchema>,
}

impl ColumnSchema {
    /// A plain text column.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use serde_csvpp::{ColumnSchema, FieldKind};
    ///
    /// let schema = ColumnSchema::simple("name");
    /// assert_eq!(schema.kind, FieldKind::Simple);
    /// assert_eq!(schema.to_string(), "name");
    /// ```
    #[must_use]
    pub fn simple(name: impl Into<String>) -> Self {
        ColumnSchema {
            name: name.into(),
            kind: FieldKind::Simple,
            array_delimiter: DEFAULT_ARRAY_DELIMITER,
            component_delimiter: DEFAULT_COMPONENT_DELIMITER,
            components: Vec::new(),
        }
    }

    /// An array column with the default `~` delimiter.
    #[must_use]
    pub fn array(name: impl Into<String>) -> Self {
        ColumnSchema {
            kind: FieldKind::Array,
            ..Self::simple(name)
        }
    }

    /// A structured column with the default `^` delimiter.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use serde_csvpp::ColumnSchema;
    ///
    /// let geo = ColumnSchema::structured(
    ///     "geo",
    ///     vec![ColumnSchema::simple("lat"), ColumnSchema::simple("lon")],
    /// );
    /// assert_eq!(geo.to_string(), "geo(lat^lon)");
    /// ```
    #[must_use]
    pub fn structured(name: impl Into<String>, components: Vec<ColumnSchema>) -> Self {
        ColumnSchema {
            kind: FieldKind::Structured,
            components,
            ..Self::simple(name)
        }
    }

    /// An array of structured values with both default delimiters.
    #[must_use]
    pub fn array_structured(name: impl Into<String>, components: Vec<ColumnSchema>) -> Self {
        ColumnSchema {
            kind: FieldKind::ArrayStructured,
            components,
            ..Self::simple(name)
        }
    }

    /// Overrides the array delimiter.
    #[must_use]
    pub fn with_array_delimiter(mut self, delimiter: char) -> Self {
        self.array_delimiter = delimiter;
        self
    }

    /// Overrides the component delimiter.
    #[must_use]
    pub fn with_component_delimiter(mut self, delimiter: char) -> Self {
        self.component_delimiter = delimiter;
        self
    }

    /// Looks up a direct component by name.
    #[must_use]
    pub fn component(&self, name: &str) -> Option<&ColumnSchema> {
        self.components.iter().find(|c| c.name == name)
    }

    /// Component nesting depth: 0 for leaf columns, 1 + the deepest component otherwise.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use serde_csvpp::parse_header;
    ///
    /// assert_eq!(parse_header("tags[]").unwrap().depth(), 0);
    /// assert_eq!(parse_header("a(b(c(d)))").unwrap().depth(), 3);
    /// ```
    #[must_use]
    pub fn depth(&self) -> usize {
        self.components
            .iter()
            .map(|c| c.depth() + 1)
            .max()
            .unwrap_or(0)
    }
}

impl fmt::Display for ColumnSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)?;

        if self.kind.has_array() {
            f.write_str("[")?;
            if self.array_delimiter != DEFAULT_ARRAY_DELIMITER {
                write!(f, "{}", self.array_delimiter)?;
            }
            f.write_str("]")?;
        }

        if self.kind.has_components() {
            if self.component_delimiter != DEFAULT_COMPONENT_DELIMITER {
                write!(f, "{}", self.component_delimiter)?;
            }
            f.write_str("(")?;
            for (i, component) in self.components.iter().enumerate() {
                if i > 0 {
                    write!(f, "{}", self.component_delimiter)?;
                }
                component.fmt(f)?;
            }
            f.write_str(")")?;
        }

        Ok(())
    }
}

impl FromStr for ColumnSchema {
    type Err = GrammarError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        parse_header(s)
    }
}

/// Parses one header cell with the default depth limit.
///
/// # Examples
///
/// ```rust
/// use serde_csvpp::{parse_header, FieldKind};
///
/// let tags = parse_header("tags[]").unwrap();
/// assert_eq!(tags.kind, FieldKind::Array);
/// assert_eq!(tags.array_delimiter, '~');
///
/// assert!(parse_header("").is_err());
/// assert!(parse_header("geo()").is_err());
/// ```
///
/// # Errors
///
/// Returns a [`GrammarError`] describing the first violation found.
pub fn parse_header(text: &str) -> std::result::Result<ColumnSchema, GrammarError> {
    parse_header_with_depth(text, 0, DEFAULT_MAX_NESTING_DEPTH)
}

/// Parses one header cell located `depth` component levels deep.
///
/// This is the single recursion entry point of the grammar: the depth check
/// runs before anything else, so hostile input cannot recurse past `max_depth`.
///
/// # Examples
///
/// ```rust
/// use serde_csvpp::{parse_header_with_depth, GrammarError};
///
/// assert!(parse_header_with_depth("a(b(c(d)))", 0, 3).is_ok());
/// assert_eq!(
///     parse_header_with_depth("a(b(c(d)))", 0, 2),
///     Err(GrammarError::NestingTooDeep { depth: 3, max: 2 })
/// );
/// ```
///
/// # Errors
///
/// Returns a [`GrammarError`] describing the first violation found.
pub fn parse_header_with_depth(
    text: &str,
    depth: usize,
    max_depth: usize,
) -> std::result::Result<ColumnSchema, GrammarError> {
    if depth > max_depth {
        return Err(GrammarError::NestingTooDeep {
            depth,
            max: max_depth,
        });
    }

    let (name, mut rest) = split_name(text)?;
    let mut schema = ColumnSchema::simple(name);

    let has_array = rest.starts_with('[');
    if has_array {
        let (delimiter, after) = parse_array_part(rest)?;
        schema.array_delimiter = delimiter;
        rest = after;
    }

    let has_components = !rest.is_empty();
    if has_components {
        let (delimiter, components) = parse_struct_part(rest, depth, max_depth)?;
        schema.component_delimiter = delimiter;
        schema.components = components;
    }

    schema.kind = FieldKind::from_parts(has_array, has_components);
    Ok(schema)
}

/// Renders a schema as canonical header text.
///
/// Default delimiters are omitted, so `parse_header(&format_header(s))`
/// reproduces `s`.
#[must_use]
pub fn format_header(schema: &ColumnSchema) -> String {
    schema.to_string()
}

/// Parses a whole header row.
///
/// # Errors
///
/// [`Error::NoHeader`] for an empty row, otherwise an [`Error::Row`] on line 1
/// naming the 1-based column of the first invalid cell.
pub fn parse_header_row<S: AsRef<str>>(cells: &[S], max_depth: usize) -> Result<Vec<ColumnSchema>> {
    parse_header_row_at(1, cells, max_depth)
}

pub(crate) fn parse_header_row_at<S: AsRef<str>>(
    line: u64,
    cells: &[S],
    max_depth: usize,
) -> Result<Vec<ColumnSchema>> {
    if cells.is_empty() {
        return Err(Error::NoHeader);
    }

    cells
        .iter()
        .enumerate()
        .map(|(i, cell)| {
            let cell = cell.as_ref();
            parse_header_with_depth(cell, 0, max_depth)
                .map_err(|err| Error::row_at(line, i + 1, declared_name(cell), err.into()))
        })
        .collect()
}

/// Splits `text` on `delimiter`, ignoring delimiters nested inside parentheses.
///
/// Empty parts are preserved, including leading and trailing ones. An empty
/// input yields no parts at all. A stray `)` never drives the depth below zero.
///
/// # Examples
///
/// ```rust
/// use serde_csvpp::split_at_depth_zero;
///
/// assert_eq!(split_at_depth_zero("a^b(c^d)^e", '^'), vec!["a", "b(c^d)", "e"]);
/// assert_eq!(split_at_depth_zero("a^^b", '^'), vec!["a", "", "b"]);
/// assert!(split_at_depth_zero("", '^').is_empty());
/// ```
#[must_use]
pub fn split_at_depth_zero(text: &str, delimiter: char) -> Vec<&str> {
    if text.is_empty() {
        return Vec::new();
    }

    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;

    for (i, ch) in text.char_indices() {
        match ch {
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            c if c == delimiter && depth == 0 => {
                parts.push(&text[start..i]);
                start = i + c.len_utf8();
            }
            _ => {}
        }
    }
    parts.push(&text[start..]);

    parts
}

/// The name a header cell starts with, if any.
fn declared_name(cell: &str) -> Option<&str> {
    split_name(cell).ok().map(|(name, _)| name)
}

#[inline]
fn is_name_char(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || ch == '_' || ch == '-'
}

fn split_name(text: &str) -> std::result::Result<(&str, &str), GrammarError> {
    let end = text
        .char_indices()
        .find(|&(_, ch)| !is_name_char(ch))
        .map_or(text.len(), |(i, _)| i);

    if end == 0 {
        return Err(GrammarError::MissingName);
    }
    Ok(text.split_at(end))
}

/// Returns exactly one char, or `None` for anything longer.
fn single_char(raw: &str) -> Option<char> {
    let mut chars = raw.chars();
    match (chars.next(), chars.next()) {
        (Some(ch), None) => Some(ch),
        _ => None,
    }
}

fn parse_array_part(text: &str) -> std::result::Result<(char, &str), GrammarError> {
    let inner = &text[1..];
    let close = inner.find(']').ok_or(GrammarError::UnclosedBracket)?;
    let raw = &inner[..close];
    let rest = &inner[close + 1..];

    let delimiter = if raw.is_empty() {
        DEFAULT_ARRAY_DELIMITER
    } else {
        single_char(raw).ok_or(GrammarError::MultiCharDelimiter {
            kind: DelimiterKind::Array,
        })?
    };
    Ok((delimiter, rest))
}

fn parse_struct_part(
    text: &str,
    depth: usize,
    max_depth: usize,
) -> std::result::Result<(char, Vec<ColumnSchema>), GrammarError> {
    let open = text.find('(').ok_or_else(|| GrammarError::TrailingCharacters {
        rest: text.to_string(),
    })?;

    let prefix = &text[..open];
    let delimiter = if prefix.is_empty() {
        DEFAULT_COMPONENT_DELIMITER
    } else {
        single_char(prefix).ok_or(GrammarError::MultiCharDelimiter {
            kind: DelimiterKind::Component,
        })?
    };

    let body = &text[open + 1..];
    let close = find_closing_paren(body).ok_or(GrammarError::UnmatchedParen)?;
    let inner = &body[..close];
    let rest = &body[close + 1..];
    if !rest.is_empty() {
        return Err(GrammarError::TrailingCharacters {
            rest: rest.to_string(),
        });
    }

    let mut parts = split_at_depth_zero(inner, delimiter);
    // A trailing delimiter closes the list without adding a component.
    if parts.last() == Some(&"") {
        parts.pop();
    }
    if parts.iter().all(|part| part.is_empty()) {
        return Err(GrammarError::EmptyComponentList);
    }

    let components = parts
        .into_iter()
        .map(|part| parse_header_with_depth(part, depth + 1, max_depth))
        .collect::<std::result::Result<Vec<_>, _>>()?;

    Ok((delimiter, components))
}

/// Byte index of the `)` closing an already-consumed `(`.
fn find_closing_paren(text: &str) -> Option<usize> {
    let mut depth = 1usize;
    for (i, ch) in text.char_indices() {
        match ch {
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RowErrorKind;

    fn simple(name: &str) -> ColumnSchema {
        ColumnSchema::simple(name)
    }

    #[test]
    fn test_simple_names() {
        for input in ["name", "first_name", "first-name", "field123"] {
            let schema = parse_header(input).unwrap();
            assert_eq!(schema, simple(input));
        }
    }

    #[test]
    fn test_array_fields() {
        let schema = parse_header("phone[]").unwrap();
        assert_eq!(schema.kind, FieldKind::Array);
        assert_eq!(schema.array_delimiter, '~');

        let schema = parse_header("phone[|]").unwrap();
        assert_eq!(schema.kind, FieldKind::Array);
        assert_eq!(schema.array_delimiter, '|');
    }

    #[test]
    fn test_structured_fields() {
        let schema = parse_header("geo(lat^lon)").unwrap();
        assert_eq!(
            schema,
            ColumnSchema::structured("geo", vec![simple("lat"), simple("lon")])
        );

        let schema = parse_header("geo;(lat;lon)").unwrap();
        assert_eq!(schema.kind, FieldKind::Structured);
        assert_eq!(schema.component_delimiter, ';');
        assert_eq!(schema.components, vec![simple("lat"), simple("lon")]);
    }

    #[test]
    fn test_array_structured_fields() {
        let schema = parse_header("address[](type^street)").unwrap();
        assert_eq!(
            schema,
            ColumnSchema::array_structured("address", vec![simple("type"), simple("street")])
        );

        let schema = parse_header("address[|];(type;street)").unwrap();
        assert_eq!(schema.kind, FieldKind::ArrayStructured);
        assert_eq!(schema.array_delimiter, '|');
        assert_eq!(schema.component_delimiter, ';');
    }

    #[test]
    fn test_nested_components() {
        let schema = parse_header("person(name^addr;(city;zip)^tags[])").unwrap();
        assert_eq!(schema.components.len(), 3);
        let addr = schema.component("addr").unwrap();
        assert_eq!(addr.kind, FieldKind::Structured);
        assert_eq!(addr.component_delimiter, ';');
        assert_eq!(schema.component("tags").unwrap().kind, FieldKind::Array);
    }

    #[test]
    fn test_grammar_errors() {
        assert_eq!(parse_header(""), Err(GrammarError::MissingName));
        assert_eq!(parse_header("[name]"), Err(GrammarError::MissingName));
        assert_eq!(parse_header("phone["), Err(GrammarError::UnclosedBracket));
        assert_eq!(
            parse_header("phone[||]"),
            Err(GrammarError::MultiCharDelimiter {
                kind: DelimiterKind::Array
            })
        );
        assert_eq!(
            parse_header("geo;;(lat;;lon)"),
            Err(GrammarError::MultiCharDelimiter {
                kind: DelimiterKind::Component
            })
        );
        assert_eq!(parse_header("geo(lat^lon"), Err(GrammarError::UnmatchedParen));
        assert_eq!(parse_header("geo()"), Err(GrammarError::EmptyComponentList));
        assert_eq!(parse_header("geo(^)"), Err(GrammarError::EmptyComponentList));
        assert_eq!(
            parse_header("geo(lat)x"),
            Err(GrammarError::TrailingCharacters {
                rest: "x".to_string()
            })
        );
        assert_eq!(
            parse_header("na me"),
            Err(GrammarError::TrailingCharacters {
                rest: " me".to_string()
            })
        );
    }

    #[test]
    fn test_non_ascii_name_stops_scan() {
        assert_eq!(parse_header("名前"), Err(GrammarError::MissingName));
        assert!(matches!(
            parse_header("nameé"),
            Err(GrammarError::TrailingCharacters { .. })
        ));
        // A non-ASCII component delimiter is still a single character.
        let schema = parse_header("geo→(a→b)").unwrap();
        assert_eq!(schema.component_delimiter, '→');
        assert_eq!(schema.components.len(), 2);
    }

    #[test]
    fn test_trailing_component_delimiter_is_dropped() {
        let schema = parse_header("geo(lat^)").unwrap();
        assert_eq!(schema.components, vec![ColumnSchema::simple("lat")]);
        assert_eq!(format_header(&schema), "geo(lat)");

        let schema = parse_header("geo;(lat;lon;)").unwrap();
        assert_eq!(schema.components.len(), 2);
    }

    #[test]
    fn test_leading_or_inner_empty_component_is_missing_name() {
        assert_eq!(parse_header("geo(^lat)"), Err(GrammarError::MissingName));
        assert_eq!(parse_header("geo(lat^^lon)"), Err(GrammarError::MissingName));
        assert_eq!(parse_header("geo(lat^^)"), Err(GrammarError::MissingName));
        assert_eq!(parse_header("geo(^)"), Err(GrammarError::EmptyComponentList));
    }

    #[test]
    fn test_depth_limit() {
        assert!(parse_header_with_depth("a(b(c))", 0, 2).is_ok());
        assert_eq!(
            parse_header_with_depth("a(b(c(d)))", 0, 2),
            Err(GrammarError::NestingTooDeep { depth: 3, max: 2 })
        );
        assert!(parse_header_with_depth("a(b(c(d)))", 0, 3).is_ok());
        // Arrays alone never count as nesting.
        assert!(parse_header_with_depth("a[]", 0, 0).is_ok());
        assert!(parse_header_with_depth("a[](b)", 0, 0).is_err());
    }

    #[test]
    fn test_split_at_depth_zero() {
        assert_eq!(split_at_depth_zero("a^b^c", '^'), vec!["a", "b", "c"]);
        assert_eq!(split_at_depth_zero("a", '^'), vec!["a"]);
        assert!(split_at_depth_zero("", '^').is_empty());
        assert_eq!(
            split_at_depth_zero("a^nested(b^c)^d", '^'),
            vec!["a", "nested(b^c)", "d"]
        );
        assert_eq!(
            split_at_depth_zero("a^outer(inner(x^y)^z)^b", '^'),
            vec!["a", "outer(inner(x^y)^z)", "b"]
        );
        assert_eq!(split_at_depth_zero("^a^", '^'), vec!["", "a", ""]);
        assert_eq!(split_at_depth_zero("x)^y", '^'), vec!["x)", "y"]);
        assert_eq!(split_at_depth_zero("é→ü", '→'), vec!["é", "ü"]);
    }

    #[test]
    fn test_format_header() {
        for input in [
            "name",
            "tags[]",
            "tags[|]",
            "geo(lat^lon)",
            "geo;(lat;lon)",
            "address[](type^street)",
            "address[|];(street;city)",
            "a(b(c(d)))",
        ] {
            let schema = parse_header(input).unwrap();
            assert_eq!(format_header(&schema), input);
        }
    }

    #[test]
    fn test_header_row() {
        let headers = parse_header_row(&["name", "phone[]", "geo(lat^lon)"], 10).unwrap();
        assert_eq!(headers.len(), 3);

        let empty: [&str; 0] = [];
        assert!(matches!(parse_header_row(&empty, 10), Err(Error::NoHeader)));

        let err = parse_header_row(&["name", "geo("], 10).unwrap_err();
        match err {
            Error::Row {
                line,
                column,
                field,
                kind,
            } => {
                assert_eq!(line, 1);
                assert_eq!(column, Some(2));
                assert_eq!(field.as_deref(), Some("geo"));
                assert_eq!(kind, RowErrorKind::Grammar(GrammarError::UnmatchedParen));
            }
            other => panic!("Expected row error, got {:?}", other),
        }
    }
}
