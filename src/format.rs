//! CSV++ Format Reference
//!
//! This module documents the CSV++ format as implemented by this library.
//!
//! # Overview
//!
//! CSV++ is ordinary CSV (RFC 4180) whose header cells declare how each
//! column's cells are to be split. A plain CSV file is a valid CSV++ file in
//! which every column is simple. The field delimiter, quoting and line
//! endings are handled by the CSV layer; everything below operates on one
//! already-unquoted cell.
//!
//! # Column Headers
//!
//! ```text
//! field        = name [ array-part ] [ struct-part ]
//! name         = 1*( ALPHA / DIGIT / "_" / "-" )
//! array-part   = "[" [ delimiter ] "]"
//! struct-part  = [ delimiter ] "(" component-list ")"
//! component-list = field *( component-delimiter field )
//! delimiter    = any single character
//! ```
//!
//! Four kinds of columns follow from which parts are present:
//!
//! | Header | Kind | Cell |
//! |---|---|---|
//! | `name` | Simple | `Alice` |
//! | `phone[]` | Array | `555-1234~555-5678` |
//! | `geo(lat^lon)` | Structured | `34.05^-118.24` |
//! | `address[](type^street)` | ArrayStructured | `home^1 Main~work^2 Oak` |
//!
//! **Rules**:
//! - The name ends at the first character outside `[A-Za-z0-9_-]`.
//! - The array delimiter defaults to `~`, the component delimiter to `^`.
//! - A custom delimiter is written inside the brackets (`tags[|]`) or directly
//!   before the parenthesis (`geo;(lat;lon)`), and must be exactly one character.
//! - Components are themselves fields, so they may carry their own array and
//!   struct parts: `person(name^addr;(city;zip))`.
//! - The component list is split only where parentheses are balanced, so a
//!   nested component's delimiter never splits its parent.
//!
//! ## Nesting Depth
//!
//! A top-level column has depth 0; each component list adds one. Parsing
//! fails once a component would sit deeper than the limit, 10 by default.
//!
//! ## Canonical Form
//!
//! Formatting a parsed header omits delimiters equal to their defaults, so
//! `phone[~]` formats as `phone[]` and `geo^(lat^lon)` as `geo(lat^lon)`.
//! Parsing the canonical form yields the same schema.
//!
//! # Cells
//!
//! | Kind | Empty cell | Non-empty cell |
//! |---|---|---|
//! | Simple | `""` | the text, verbatim |
//! | Array | no elements | split on the array delimiter |
//! | Structured | no components | split on the component delimiter |
//! | ArrayStructured | no elements | split on the array delimiter, each element split as Structured |
//!
//! Empty elements are kept: `a~~b` has three elements, the middle one empty.
//!
//! ## Cardinality
//!
//! The number of components in a cell is not checked against the header.
//! Extra components are kept as plain text, missing ones are simply absent.
//!
//! # Choosing Delimiters
//!
//! Nested delimiters must differ from every enclosing one. The conventional
//! progression is `~`, `^`, `;`, `:`, which is also what header inference
//! uses when serializing Rust values:
//!
//! ```text
//! name,address[](type^street^geo:(lat:lon))
//! Alice,home^1 Main^34.05:-118.24~work^2 Oak^40.71:-74.00
//! ```
//!
//! # Limitations
//!
//! - **Escaping**: there is no escape for a delimiter inside a value; pick
//!   delimiters that cannot occur in the data.
//! - **Types**: every leaf is text. Numbers and booleans are parsed only when
//!   binding to Rust types.
//! - **Arrays of arrays**: an array element is a leaf or a structure, never
//!   another array at the same level.
//!
//! # Conformance
//!
//! This implementation follows the IETF draft `draft-mscaldas-csvpp-01`.

// This module contains only documentation; no implementation code
