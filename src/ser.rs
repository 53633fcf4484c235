//! Serde serialization into CSV++ records.
//!
//! A Rust value is first serialized into a small intermediate tree (text,
//! sequences, ordered maps) and then bound to the column schemas by name:
//!
//! - a struct or map becomes one row, its fields matched to columns by name,
//! - a nested struct fills a structured column, its fields matched to components by name,
//! - a `Vec` of leaves fills an array column,
//! - a `Vec` of structs fills an array-structured column,
//! - `None` and missing fields become empty cells.
//!
//! Leaves are written as text: numbers and booleans use their `Display` form.
//!
//! ## Inferring headers
//!
//! When no headers are given, [`infer_headers`] derives them from one value.
//! Delimiters follow the conventional progression: top-level columns use `~`
//! and `^`, components one level down use `;` and `:`.
//!
//! ```rust
//! use serde::Serialize;
//! use serde_csvpp::ser::infer_headers;
//!
//! #[derive(Serialize)]
//! struct Geo { lat: f64, lon: f64 }
//!
//! #[derive(Serialize)]
//! struct Place { name: String, tags: Vec<String>, geo: Geo }
//!
//! let place = Place {
//!     name: "HQ".to_string(),
//!     tags: vec!["main".to_string()],
//!     geo: Geo { lat: 1.5, lon: 2.5 },
//! };
//! let headers = infer_headers(&place).unwrap();
//! let text: Vec<String> = headers.iter().map(|h| h.to_string()).collect();
//! assert_eq!(text, vec!["name", "tags[]", "geo(lat^lon)"]);
//! ```

use crate::header::{ColumnSchema, FieldKind, DELIMITER_PROGRESSION};
use crate::value::{Record, Value};
use crate::{Error, Result};
use indexmap::IndexMap;
use serde::{ser, Serialize};

/// Serialized form of a Rust value, before it meets a schema.
#[derive(Clone, Debug, PartialEq)]
pub(crate) enum Node {
    Null,
    Text(String),
    Seq(Vec<Node>),
    Map(IndexMap<String, Node>),
}

impl Node {
    fn describe(&self) -> &'static str {
        match self {
            Node::Null => "nothing",
            Node::Text(_) => "a scalar",
            Node::Seq(_) => "a sequence",
            Node::Map(_) => "a struct or map",
        }
    }
}

/// Binds one serializable value to a row under `headers`.
///
/// # Examples
///
/// ```rust
/// use serde::Serialize;
/// use serde_csvpp::{parse_header, ser::to_record, Value};
///
/// #[derive(Serialize)]
/// struct Person { name: String, phone: Vec<String> }
///
/// let headers = vec![parse_header("name").unwrap(), parse_header("phone[]").unwrap()];
/// let person = Person { name: "Alice".into(), phone: vec!["555-1234".into()] };
///
/// let record = to_record(&person, &headers).unwrap();
/// assert_eq!(record, vec![Value::from("Alice"), Value::from(vec!["555-1234"])]);
/// ```
///
/// # Errors
///
/// Fails when the value is not a struct, map or tuple, or when a field's
/// shape cannot fill its column.
pub fn to_record<T>(value: &T, headers: &[ColumnSchema]) -> Result<Record>
where
    T: ?Sized + Serialize,
{
    match to_node(value)? {
        Node::Map(map) => headers
            .iter()
            .map(|schema| bind(schema, map.get(&schema.name).unwrap_or(&Node::Null)))
            .collect(),
        Node::Seq(items) => headers
            .iter()
            .zip(items.iter().chain(std::iter::repeat(&Node::Null)))
            .map(|(schema, node)| bind(schema, node))
            .collect(),
        other => Err(Error::custom(format!(
            "a row must serialize from a struct, map or tuple, found {}",
            other.describe()
        ))),
    }
}

/// Derives column schemas from the shape of one serializable value.
///
/// # Errors
///
/// Fails for values that are not structs or maps, for empty nested structs,
/// for sequences of sequences, and for structures nested deeper than the
/// delimiter progression allows.
pub fn infer_headers<T>(value: &T) -> Result<Vec<ColumnSchema>>
where
    T: ?Sized + Serialize,
{
    headers_from_shape(to_node(value)?)
}

/// Derives column schemas from every row at once.
///
/// Shapes are merged across rows before inference, so an empty `Vec` or a
/// `None` in one row does not hide the struct another row carries there.
/// Columns appear in the order their fields are first seen.
///
/// # Examples
///
/// ```rust
/// use serde::Serialize;
/// use serde_csvpp::ser::infer_headers_from_rows;
///
/// #[derive(Serialize)]
/// struct Stop { label: String }
///
/// #[derive(Serialize)]
/// struct Route { stops: Vec<Stop> }
///
/// let routes = vec![
///     Route { stops: vec![] },
///     Route { stops: vec![Stop { label: "A".to_string() }] },
/// ];
/// let headers = infer_headers_from_rows(&routes).unwrap();
/// assert_eq!(headers[0].to_string(), "stops[](label)");
/// ```
///
/// # Errors
///
/// The same failures as [`infer_headers`], for the merged shape.
pub fn infer_headers_from_rows<T: Serialize>(rows: &[T]) -> Result<Vec<ColumnSchema>> {
    let mut shape = Node::Null;
    for row in rows {
        shape = merge_shape(shape, to_node(row)?);
    }
    headers_from_shape(shape)
}

/// Folds `next` into `acc`, keeping the most specific shape seen.
///
/// Maps take the union of their keys and sequences collapse to one
/// representative element. On conflicting shapes the earlier one wins and
/// binding reports the mismatch.
fn merge_shape(acc: Node, next: Node) -> Node {
    match (acc, next) {
        (acc, Node::Null) => acc,
        (Node::Seq(acc), Node::Seq(next)) => {
            let item = acc.into_iter().chain(next).fold(Node::Null, merge_shape);
            match item {
                Node::Null => Node::Seq(Vec::new()),
                item => Node::Seq(vec![item]),
            }
        }
        (Node::Null | Node::Text(_), next @ Node::Seq(_)) => merge_shape(Node::Seq(Vec::new()), next),
        (Node::Map(mut acc), Node::Map(next)) => {
            for (key, node) in next {
                let slot = acc.entry(key).or_insert(Node::Null);
                let prev = std::mem::replace(slot, Node::Null);
                *slot = merge_shape(prev, node);
            }
            Node::Map(acc)
        }
        (Node::Null | Node::Text(_), next @ Node::Map(_)) => {
            merge_shape(Node::Map(IndexMap::new()), next)
        }
        (Node::Null, next) => next,
        (acc, _) => acc,
    }
}

fn headers_from_shape(shape: Node) -> Result<Vec<ColumnSchema>> {
    match shape {
        Node::Map(map) => map
            .iter()
            .map(|(name, node)| infer_schema(name, node, 0))
            .collect(),
        other => Err(Error::custom(format!(
            "headers can only be inferred from a struct or map, found {}",
            other.describe()
        ))),
    }
}

fn infer_schema(name: &str, node: &Node, level: usize) -> Result<ColumnSchema> {
    match node {
        Node::Null | Node::Text(_) => Ok(ColumnSchema::simple(name)),
        Node::Seq(items) => match items.iter().find(|item| !matches!(item, Node::Null)) {
            Some(Node::Map(fields)) => Ok(ColumnSchema::array_structured(
                name,
                infer_components(name, fields, level)?,
            )
            .with_array_delimiter(delimiter_at(name, level, 0)?)
            .with_component_delimiter(delimiter_at(name, level, 1)?)),
            Some(Node::Seq(_)) => Err(Error::custom(format!(
                "field {:?}: sequences of sequences have no CSV++ representation",
                name
            ))),
            _ => Ok(ColumnSchema::array(name).with_array_delimiter(delimiter_at(name, level, 0)?)),
        },
        Node::Map(fields) => Ok(ColumnSchema::structured(
            name,
            infer_components(name, fields, level)?,
        )
        .with_component_delimiter(delimiter_at(name, level, 1)?)),
    }
}

fn infer_components(
    name: &str,
    fields: &IndexMap<String, Node>,
    level: usize,
) -> Result<Vec<ColumnSchema>> {
    if fields.is_empty() {
        return Err(Error::custom(format!(
            "field {:?}: cannot infer components of an empty struct",
            name
        )));
    }
    fields
        .iter()
        .map(|(child, node)| infer_schema(child, node, level + 1))
        .collect()
}

/// Array (`slot` 0) or component (`slot` 1) delimiter for a nesting level.
fn delimiter_at(name: &str, level: usize, slot: usize) -> Result<char> {
    DELIMITER_PROGRESSION
        .get(level * 2 + slot)
        .copied()
        .ok_or_else(|| {
            Error::custom(format!(
                "field {:?}: nested too deep to infer delimiters, pass explicit headers",
                name
            ))
        })
}

fn mismatch(schema: &ColumnSchema, node: &Node) -> Error {
    Error::type_mismatch(&schema.name, &schema.kind.to_string(), node.describe())
}

fn bind(schema: &ColumnSchema, node: &Node) -> Result<Value> {
    match (schema.kind, node) {
        (kind, Node::Null) => Ok(Value::empty(kind)),
        (FieldKind::Simple, Node::Text(s)) => Ok(Value::Scalar(s.clone())),
        (FieldKind::Array, Node::Text(s)) => Ok(Value::List(vec![s.clone()])),
        (FieldKind::Array, Node::Seq(items)) => items
            .iter()
            .map(|item| match item {
                Node::Null => Ok(String::new()),
                Node::Text(s) => Ok(s.clone()),
                other => Err(mismatch(schema, other)),
            })
            .collect::<Result<Vec<_>>>()
            .map(Value::List),
        (FieldKind::Structured, Node::Map(_) | Node::Seq(_)) => bind_components(schema, node),
        (FieldKind::ArrayStructured, Node::Seq(items)) => items
            .iter()
            .map(|item| match item {
                Node::Null => Ok(Value::Nested(Vec::new())),
                Node::Text(_) => Err(mismatch(schema, item)),
                other => bind_components(schema, other),
            })
            .collect::<Result<Vec<_>>>()
            .map(Value::Nested),
        (FieldKind::ArrayStructured, Node::Map(_)) => {
            Ok(Value::Nested(vec![bind_components(schema, node)?]))
        }
        (_, other) => Err(mismatch(schema, other)),
    }
}

/// Fills `schema.components` from a struct (by name) or a tuple (by position).
fn bind_components(schema: &ColumnSchema, node: &Node) -> Result<Value> {
    let parts = match node {
        Node::Map(fields) => schema
            .components
            .iter()
            .map(|c| bind(c, fields.get(&c.name).unwrap_or(&Node::Null)))
            .collect::<Result<Vec<_>>>()?,
        Node::Seq(items) => schema
            .components
            .iter()
            .zip(items.iter().chain(std::iter::repeat(&Node::Null)))
            .map(|(c, item)| bind(c, item))
            .collect::<Result<Vec<_>>>()?,
        other => return Err(mismatch(schema, other)),
    };
    Ok(Value::Nested(parts))
}

pub(crate) fn to_node<T: Serialize + ?Sized>(value: &T) -> Result<Node> {
    value.serialize(NodeSerializer)
}

/// Serializer producing the intermediate [`Node`] tree.
pub(crate) struct NodeSerializer;

pub(crate) struct SerializeVec {
    vec: Vec<Node>,
}

pub(crate) struct SerializeMap {
    map: IndexMap<String, Node>,
    current_key: Option<String>,
}

impl ser::Serializer for NodeSerializer {
    type Ok = Node;
    type Error = Error;

    type SerializeSeq = SerializeVec;
    type SerializeTuple = SerializeVec;
    type SerializeTupleStruct = SerializeVec;
    type SerializeTupleVariant = ser::Impossible<Node, Error>;
    type SerializeMap = SerializeMap;
    type SerializeStruct = SerializeMap;
    type SerializeStructVariant = ser::Impossible<Node, Error>;

    fn serialize_bool(self, v: bool) -> Result<Node> {
        Ok(Node::Text(v.to_string()))
    }

    fn serialize_i8(self, v: i8) -> Result<Node> {
        self.serialize_i64(v as i64)
    }

    fn serialize_i16(self, v: i16) -> Result<Node> {
        self.serialize_i64(v as i64)
    }

    fn serialize_i32(self, v: i32) -> Result<Node> {
        self.serialize_i64(v as i64)
    }

    fn serialize_i64(self, v: i64) -> Result<Node> {
        Ok(Node::Text(v.to_string()))
    }

    fn serialize_i128(self, v: i128) -> Result<Node> {
        Ok(Node::Text(v.to_string()))
    }

    fn serialize_u8(self, v: u8) -> Result<Node> {
        self.serialize_u64(v as u64)
    }

    fn serialize_u16(self, v: u16) -> Result<Node> {
        self.serialize_u64(v as u64)
    }

    fn serialize_u32(self, v: u32) -> Result<Node> {
        self.serialize_u64(v as u64)
    }

    fn serialize_u64(self, v: u64) -> Result<Node> {
        Ok(Node::Text(v.to_string()))
    }

    fn serialize_u128(self, v: u128) -> Result<Node> {
        Ok(Node::Text(v.to_string()))
    }

    fn serialize_f32(self, v: f32) -> Result<Node> {
        Ok(Node::Text(v.to_string()))
    }

    fn serialize_f64(self, v: f64) -> Result<Node> {
        Ok(Node::Text(v.to_string()))
    }

    fn serialize_char(self, v: char) -> Result<Node> {
        Ok(Node::Text(v.to_string()))
    }

    fn serialize_str(self, v: &str) -> Result<Node> {
        Ok(Node::Text(v.to_string()))
    }

    fn serialize_bytes(self, v: &[u8]) -> Result<Node> {
        Ok(Node::Seq(
            v.iter().map(|b| Node::Text(b.to_string())).collect(),
        ))
    }

    fn serialize_none(self) -> Result<Node> {
        Ok(Node::Null)
    }

    fn serialize_some<T>(self, value: &T) -> Result<Node>
    where
        T: ?Sized + Serialize,
    {
        value.serialize(self)
    }

    fn serialize_unit(self) -> Result<Node> {
        Ok(Node::Null)
    }

    fn serialize_unit_struct(self, _name: &'static str) -> Result<Node> {
        Ok(Node::Null)
    }

    fn serialize_unit_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
    ) -> Result<Node> {
        Ok(Node::Text(variant.to_string()))
    }

    fn serialize_newtype_struct<T>(self, _name: &'static str, value: &T) -> Result<Node>
    where
        T: ?Sized + Serialize,
    {
        value.serialize(self)
    }

    fn serialize_newtype_variant<T>(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        _value: &T,
    ) -> Result<Node>
    where
        T: ?Sized + Serialize,
    {
        Err(Error::custom(format!(
            "enum variant {} carries data and has no CSV++ representation",
            variant
        )))
    }

    fn serialize_seq(self, len: Option<usize>) -> Result<SerializeVec> {
        Ok(SerializeVec::new(len.unwrap_or(0)))
    }

    fn serialize_tuple(self, len: usize) -> Result<SerializeVec> {
        Ok(SerializeVec::new(len))
    }

    fn serialize_tuple_struct(self, _name: &'static str, len: usize) -> Result<SerializeVec> {
        Ok(SerializeVec::new(len))
    }

    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeTupleVariant> {
        Err(Error::custom(format!(
            "tuple variant {} has no CSV++ representation",
            variant
        )))
    }

    fn serialize_map(self, len: Option<usize>) -> Result<SerializeMap> {
        Ok(SerializeMap::new(len.unwrap_or(0)))
    }

    fn serialize_struct(self, _name: &'static str, len: usize) -> Result<SerializeMap> {
        Ok(SerializeMap::new(len))
    }

    fn serialize_struct_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeStructVariant> {
        Err(Error::custom(format!(
            "struct variant {} has no CSV++ representation",
            variant
        )))
    }
}

impl SerializeVec {
    fn new(capacity: usize) -> Self {
        SerializeVec {
            vec: Vec::with_capacity(capacity),
        }
    }
}

impl SerializeMap {
    fn new(capacity: usize) -> Self {
        SerializeMap {
            map: IndexMap::with_capacity(capacity),
            current_key: None,
        }
    }
}

impl ser::SerializeSeq for SerializeVec {
    type Ok = Node;
    type Error = Error;

    fn serialize_element<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.vec.push(to_node(value)?);
        Ok(())
    }

    fn end(self) -> Result<Node> {
        Ok(Node::Seq(self.vec))
    }
}

impl ser::SerializeTuple for SerializeVec {
    type Ok = Node;
    type Error = Error;

    fn serialize_element<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.vec.push(to_node(value)?);
        Ok(())
    }

    fn end(self) -> Result<Node> {
        Ok(Node::Seq(self.vec))
    }
}

impl ser::SerializeTupleStruct for SerializeVec {
    type Ok = Node;
    type Error = Error;

    fn serialize_field<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.vec.push(to_node(value)?);
        Ok(())
    }

    fn end(self) -> Result<Node> {
        Ok(Node::Seq(self.vec))
    }
}

impl ser::SerializeMap for SerializeMap {
    type Ok = Node;
    type Error = Error;

    fn serialize_key<T>(&mut self, key: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        match to_node(key)? {
            Node::Text(s) => {
                self.current_key = Some(s);
                Ok(())
            }
            _ => Err(Error::custom("Map keys must be strings")),
        }
    }

    fn serialize_value<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        let key = self
            .current_key
            .take()
            .ok_or_else(|| Error::custom("serialize_value called without serialize_key"))?;
        self.map.insert(key, to_node(value)?);
        Ok(())
    }

    fn end(self) -> Result<Node> {
        Ok(Node::Map(self.map))
    }
}

impl ser::SerializeStruct for SerializeMap {
    type Ok = Node;
    type Error = Error;

    fn serialize_field<T>(&mut self, key: &'static str, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.map.insert(key.to_string(), to_node(value)?);
        Ok(())
    }

    fn skip_field(&mut self, _key: &'static str) -> Result<()> {
        Ok(())
    }

    fn end(self) -> Result<Node> {
        Ok(Node::Map(self.map))
    }
}
