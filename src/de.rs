//! Serde deserialization from CSV++ records.
//!
//! Each decoded record is walked together with its column schemas:
//!
//! - a row deserializes as a map keyed by column name (or as a tuple, by position),
//! - a structured cell deserializes as a map keyed by component name,
//! - an array cell deserializes as a sequence of strings,
//! - an array-structured cell deserializes as a sequence of component maps.
//!
//! Leaves are text and are parsed on demand into the target type. An empty
//! leaf gives the zero value (`0`, `false`, `""`), an empty cell gives `None`
//! for `Option` fields, and missing trailing components are treated as empty.
//!
//! ## Usage
//!
//! ```rust
//! use serde::Deserialize;
//! use serde_csvpp::from_str;
//!
//! #[derive(Deserialize, Debug, PartialEq)]
//! struct Address { kind: String, street: String }
//!
//! #[derive(Deserialize, Debug, PartialEq)]
//! struct Person {
//!     name: String,
//!     age: u32,
//!     phone: Vec<String>,
//!     address: Vec<Address>,
//! }
//!
//! let data = "name,age,phone[],address[](kind^street)\n\
//!             Alice,30,555-1234~555-5678,home^1 Main~work^2 Oak\n\
//!             Bob,,,\n";
//!
//! let people: Vec<Person> = from_str(data).unwrap();
//! assert_eq!(people[0].address[1].street, "2 Oak");
//! assert_eq!(people[1].age, 0);
//! assert!(people[1].phone.is_empty());
//! ```

use crate::header::{ColumnSchema, FieldKind};
use crate::value::{Record, Value};
use crate::{Error, Result};
use serde::de::{self, DeserializeOwned, IntoDeserializer};
use serde::forward_to_deserialize_any;

/// Binds one decoded record to `T`.
///
/// # Examples
///
/// ```rust
/// use serde_csvpp::{de::from_record, parse_header, Value};
///
/// let headers = vec![parse_header("id").unwrap(), parse_header("tags[]").unwrap()];
/// let record = vec![Value::from("7"), Value::from(vec!["a", "b"])];
///
/// let (id, tags): (u8, Vec<String>) = from_record(&headers, record).unwrap();
/// assert_eq!(id, 7);
/// assert_eq!(tags, vec!["a", "b"]);
/// ```
pub fn from_record<T: DeserializeOwned>(headers: &[ColumnSchema], record: Record) -> Result<T> {
    T::deserialize(RecordDeserializer { headers, record })
}

struct RecordDeserializer<'a> {
    headers: &'a [ColumnSchema],
    record: Record,
}

impl<'a> RecordDeserializer<'a> {
    fn into_cells(self) -> Vec<CellDeserializer<'a>> {
        let mut values = self.record.into_iter();
        self.headers
            .iter()
            .map(|schema| CellDeserializer {
                field: &schema.name,
                shape: Shape::Column(schema),
                value: values.next().unwrap_or_else(|| Value::empty(schema.kind)),
            })
            .collect()
    }
}

impl<'de, 'a> de::Deserializer<'de> for RecordDeserializer<'a> {
    type Error = Error;

    fn deserialize_any<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        visitor.visit_map(CellMap::new(self.into_cells()))
    }

    fn deserialize_seq<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        visitor.visit_seq(CellSeq::new(self.into_cells()))
    }

    fn deserialize_tuple<V>(self, _len: usize, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        self.deserialize_seq(visitor)
    }

    fn deserialize_tuple_struct<V>(
        self,
        _name: &'static str,
        _len: usize,
        visitor: V,
    ) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        self.deserialize_seq(visitor)
    }

    fn deserialize_newtype_struct<V>(self, _name: &'static str, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        visitor.visit_newtype_struct(self)
    }

    forward_to_deserialize_any! {
        bool i8 i16 i32 i64 i128 u8 u16 u32 u64 u128 f32 f64 char str string
        bytes byte_buf option unit unit_struct map struct enum
        identifier ignored_any
    }
}

/// How a cell's value relates to the schema it was decoded under.
#[derive(Clone, Copy)]
enum Shape<'a> {
    /// A column or component, decoded under its own kind.
    Column(&'a ColumnSchema),
    /// One element of an array-structured column: a value per component.
    Element(&'a ColumnSchema),
    /// A list element, or a value with no schema.
    Leaf,
}

struct CellDeserializer<'a> {
    field: &'a str,
    shape: Shape<'a>,
    value: Value,
}

enum Layout<'a> {
    Scalar(String),
    Leaves(Vec<String>),
    Components(&'a ColumnSchema, Vec<Value>),
    Elements(&'a ColumnSchema, Vec<Value>),
    Positional(Vec<Value>),
}

impl<'a> CellDeserializer<'a> {
    fn leaf(field: &'a str, text: String) -> Self {
        CellDeserializer {
            field,
            shape: Shape::Leaf,
            value: Value::Scalar(text),
        }
    }

    fn layout(self) -> Layout<'a> {
        match (self.shape, self.value) {
            (_, Value::Scalar(s)) => Layout::Scalar(s),
            (_, Value::List(items)) => Layout::Leaves(items),
            (Shape::Element(schema), Value::Nested(parts)) => Layout::Components(schema, parts),
            (Shape::Column(schema), Value::Nested(parts)) => match schema.kind {
                FieldKind::Structured => Layout::Components(schema, parts),
                FieldKind::ArrayStructured => Layout::Elements(schema, parts),
                FieldKind::Simple | FieldKind::Array => Layout::Positional(parts),
            },
            (Shape::Leaf, Value::Nested(parts)) => Layout::Positional(parts),
        }
    }

    fn mismatch(&self, expected: &str) -> Error {
        Error::type_mismatch(self.field, expected, &self.value.to_string())
    }

    fn into_scalar(self, expected: &str) -> Result<String> {
        match self.value {
            Value::Scalar(s) => Ok(s),
            _ => Err(self.mismatch(expected)),
        }
    }

    fn components(schema: &'a ColumnSchema, parts: Vec<Value>) -> Vec<CellDeserializer<'a>> {
        let mut values = parts.into_iter();
        schema
            .components
            .iter()
            .map(|component| CellDeserializer {
                field: &component.name,
                shape: Shape::Column(component),
                value: values
                    .next()
                    .unwrap_or_else(|| Value::empty(component.kind)),
            })
            .collect()
    }

    fn elements(schema: &'a ColumnSchema, elements: Vec<Value>) -> Vec<CellDeserializer<'a>> {
        elements
            .into_iter()
            .map(|value| CellDeserializer {
                field: &schema.name,
                shape: Shape::Element(schema),
                value,
            })
            .collect()
    }

    fn positional(field: &'a str, parts: Vec<Value>) -> Vec<CellDeserializer<'a>> {
        parts
            .into_iter()
            .map(|value| CellDeserializer {
                field,
                shape: Shape::Leaf,
                value,
            })
            .collect()
    }

    fn leaves(field: &'a str, items: Vec<String>) -> Vec<CellDeserializer<'a>> {
        items
            .into_iter()
            .map(|text| CellDeserializer::leaf(field, text))
            .collect()
    }
}

macro_rules! deserialize_number {
    ($method:ident, $visit:ident, $ty:ty) => {
        fn $method<V>(self, visitor: V) -> Result<V::Value>
        where
            V: de::Visitor<'de>,
        {
            let field = self.field;
            let text = self.into_scalar(stringify!($ty))?;
            if text.is_empty() {
                return visitor.$visit(<$ty>::default());
            }
            match text.parse::<$ty>() {
                Ok(n) => visitor.$visit(n),
                Err(_) => Err(Error::type_mismatch(field, stringify!($ty), &text)),
            }
        }
    };
}

impl<'de, 'a> de::Deserializer<'de> for CellDeserializer<'a> {
    type Error = Error;

    fn deserialize_any<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        let field = self.field;
        match self.layout() {
            Layout::Scalar(s) => visitor.visit_string(s),
            Layout::Leaves(items) => visitor.visit_seq(CellSeq::new(Self::leaves(field, items))),
            Layout::Components(schema, parts) => {
                visitor.visit_map(CellMap::new(Self::components(schema, parts)))
            }
            Layout::Elements(schema, elements) => {
                visitor.visit_seq(CellSeq::new(Self::elements(schema, elements)))
            }
            Layout::Positional(parts) => {
                visitor.visit_seq(CellSeq::new(Self::positional(field, parts)))
            }
        }
    }

    fn deserialize_bool<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        let field = self.field;
        let text = self.into_scalar("bool")?;
        match text.as_str() {
            "" | "0" | "f" | "F" | "false" | "False" | "FALSE" => visitor.visit_bool(false),
            "1" | "t" | "T" | "true" | "True" | "TRUE" => visitor.visit_bool(true),
            _ => Err(Error::type_mismatch(field, "bool", &text)),
        }
    }

    deserialize_number!(deserialize_i8, visit_i8, i8);
    deserialize_number!(deserialize_i16, visit_i16, i16);
    deserialize_number!(deserialize_i32, visit_i32, i32);
    deserialize_number!(deserialize_i64, visit_i64, i64);
    deserialize_number!(deserialize_i128, visit_i128, i128);
    deserialize_number!(deserialize_u8, visit_u8, u8);
    deserialize_number!(deserialize_u16, visit_u16, u16);
    deserialize_number!(deserialize_u32, visit_u32, u32);
    deserialize_number!(deserialize_u64, visit_u64, u64);
    deserialize_number!(deserialize_u128, visit_u128, u128);
    deserialize_number!(deserialize_f32, visit_f32, f32);
    deserialize_number!(deserialize_f64, visit_f64, f64);

    fn deserialize_char<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        let field = self.field;
        let text = self.into_scalar("char")?;
        let mut chars = text.chars();
        match (chars.next(), chars.next()) {
            (Some(ch), None) => visitor.visit_char(ch),
            _ => Err(Error::type_mismatch(field, "char", &text)),
        }
    }

    fn deserialize_str<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        self.deserialize_string(visitor)
    }

    fn deserialize_string<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        visitor.visit_string(self.into_scalar("string")?)
    }

    fn deserialize_bytes<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        self.deserialize_byte_buf(visitor)
    }

    fn deserialize_byte_buf<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        visitor.visit_byte_buf(self.into_scalar("bytes")?.into_bytes())
    }

    fn deserialize_option<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        if self.value.is_empty() {
            visitor.visit_none()
        } else {
            visitor.visit_some(self)
        }
    }

    fn deserialize_unit<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        visitor.visit_unit()
    }

    fn deserialize_unit_struct<V>(self, _name: &'static str, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        visitor.visit_unit()
    }

    fn deserialize_newtype_struct<V>(self, _name: &'static str, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        visitor.visit_newtype_struct(self)
    }

    fn deserialize_seq<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        let field = self.field;
        match self.layout() {
            Layout::Scalar(s) if s.is_empty() => visitor.visit_seq(CellSeq::new(Vec::new())),
            Layout::Scalar(s) => Err(Error::type_mismatch(field, "sequence", &s)),
            Layout::Leaves(items) => visitor.visit_seq(CellSeq::new(Self::leaves(field, items))),
            Layout::Elements(schema, elements) => {
                visitor.visit_seq(CellSeq::new(Self::elements(schema, elements)))
            }
            Layout::Components(schema, parts) => {
                visitor.visit_seq(CellSeq::new(Self::components(schema, parts)))
            }
            Layout::Positional(parts) => {
                visitor.visit_seq(CellSeq::new(Self::positional(field, parts)))
            }
        }
    }

    fn deserialize_tuple<V>(self, _len: usize, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        self.deserialize_seq(visitor)
    }

    fn deserialize_tuple_struct<V>(
        self,
        _name: &'static str,
        _len: usize,
        visitor: V,
    ) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        self.deserialize_seq(visitor)
    }

    fn deserialize_map<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        let field = self.field;
        match self.layout() {
            Layout::Components(schema, parts) => {
                visitor.visit_map(CellMap::new(Self::components(schema, parts)))
            }
            Layout::Scalar(s) => Err(Error::type_mismatch(field, "struct", &s)),
            Layout::Leaves(items) => Err(Error::type_mismatch(field, "struct", &items.join(","))),
            Layout::Elements(..) | Layout::Positional(_) => {
                Err(Error::type_mismatch(field, "struct", "a sequence"))
            }
        }
    }

    fn deserialize_struct<V>(
        self,
        _name: &'static str,
        _fields: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        self.deserialize_map(visitor)
    }

    fn deserialize_enum<V>(
        self,
        _name: &'static str,
        _variants: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        let variant: de::value::StringDeserializer<Error> =
            self.into_scalar("enum variant")?.into_deserializer();
        visitor.visit_enum(variant)
    }

    fn deserialize_identifier<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        self.deserialize_string(visitor)
    }

    fn deserialize_ignored_any<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        visitor.visit_unit()
    }
}

struct CellSeq<'a> {
    cells: std::vec::IntoIter<CellDeserializer<'a>>,
}

impl<'a> CellSeq<'a> {
    fn new(cells: Vec<CellDeserializer<'a>>) -> Self {
        CellSeq {
            cells: cells.into_iter(),
        }
    }
}

impl<'de, 'a> de::SeqAccess<'de> for CellSeq<'a> {
    type Error = Error;

    fn next_element_seed<T>(&mut self, seed: T) -> Result<Option<T::Value>>
    where
        T: de::DeserializeSeed<'de>,
    {
        match self.cells.next() {
            Some(cell) => seed.deserialize(cell).map(Some),
            None => Ok(None),
        }
    }

    fn size_hint(&self) -> Option<usize> {
        Some(self.cells.len())
    }
}

/// Map over named cells: the key is the column or component name.
struct CellMap<'a> {
    cells: std::vec::IntoIter<CellDeserializer<'a>>,
    pending: Option<CellDeserializer<'a>>,
}

impl<'a> CellMap<'a> {
    fn new(cells: Vec<CellDeserializer<'a>>) -> Self {
        CellMap {
            cells: cells.into_iter(),
            pending: None,
        }
    }
}

impl<'de, 'a> de::MapAccess<'de> for CellMap<'a> {
    type Error = Error;

    fn next_key_seed<K>(&mut self, seed: K) -> Result<Option<K::Value>>
    where
        K: de::DeserializeSeed<'de>,
    {
        match self.cells.next() {
            Some(cell) => {
                let key: de::value::StrDeserializer<'_, Error> = cell.field.into_deserializer();
                let key = seed.deserialize(key)?;
                self.pending = Some(cell);
                Ok(Some(key))
            }
            None => Ok(None),
        }
    }

    fn next_value_seed<V>(&mut self, seed: V) -> Result<V::Value>
    where
        V: de::DeserializeSeed<'de>,
    {
        match self.pending.take() {
            Some(cell) => seed.deserialize(cell),
            None => Err(Error::custom("next_value_seed called before next_key_seed")),
        }
    }

    fn size_hint(&self) -> Option<usize> {
        Some(self.cells.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::from_str;
    use crate::header::parse_header;
    use serde::Deserialize;
    use std::collections::BTreeMap;

    fn headers(texts: &[&str]) -> Vec<ColumnSchema> {
        texts.iter().map(|t| parse_header(t).unwrap()).collect()
    }

    #[derive(Deserialize, Debug, PartialEq)]
    struct Geo {
        lat: f64,
        lon: f64,
    }

    #[derive(Deserialize, Debug, PartialEq)]
    struct Place {
        name: String,
        geo: Geo,
        note: Option<String>,
    }

    #[test]
    fn test_struct_by_name() {
        let h = headers(&["geo(lat^lon)", "name", "note"]);
        let record = vec![
            Value::Nested(vec![Value::from("34.05"), Value::from("-118.24")]),
            Value::from("LA"),
            Value::from(""),
        ];
        let place: Place = from_record(&h, record).unwrap();
        assert_eq!(
            place,
            Place {
                name: "LA".to_string(),
                geo: Geo {
                    lat: 34.05,
                    lon: -118.24
                },
                note: None,
            }
        );
    }

    #[test]
    fn test_empty_cells_give_zero_values() {
        #[derive(Deserialize, Debug, PartialEq)]
        struct Row {
            count: u32,
            ok: bool,
            tags: Vec<String>,
            geo: Geo,
            maybe: Option<Geo>,
        }
        let row: Row = from_str::<Row>("count,ok,tags[],geo(lat^lon),maybe(lat^lon)\n,,,,\n")
            .unwrap()
            .remove(0);
        assert_eq!(
            row,
            Row {
                count: 0,
                ok: false,
                tags: vec![],
                geo: Geo { lat: 0.0, lon: 0.0 },
                maybe: None,
            }
        );
    }

    #[test]
    fn test_missing_components_are_empty() {
        let h = headers(&["geo(lat^lon)"]);
        let record = vec![Value::Nested(vec![Value::from("1.5")])];
        let (geo,): (Geo,) = from_record(&h, record).unwrap();
        assert_eq!(geo, Geo { lat: 1.5, lon: 0.0 });
    }

    #[test]
    fn test_array_structured_to_vec_of_structs() {
        #[derive(Deserialize, Debug, PartialEq)]
        struct Address {
            kind: String,
            street: String,
        }
        let rows: Vec<BTreeMap<String, Vec<Address>>> =
            from_str("address[](kind^street)\nhome^1 Main~work^2 Oak\n").unwrap();
        let addresses = &rows[0]["address"];
        assert_eq!(addresses.len(), 2);
        assert_eq!(addresses[1].kind, "work");
    }

    #[test]
    fn test_numbers_parse_or_mismatch() {
        let h = headers(&["n"]);
        let (n,): (i64,) = from_record(&h, vec![Value::from("-42")]).unwrap();
        assert_eq!(n, -42);

        let err = from_record::<(u8,)>(&h, vec![Value::from("300")]).unwrap_err();
        assert!(matches!(err, Error::TypeMismatch { ref field, .. } if field == "n"));
    }

    #[test]
    fn test_bool_spellings() {
        let h = headers(&["a", "b", "c"]);
        let record = vec![Value::from("1"), Value::from("False"), Value::from("TRUE")];
        let flags: (bool, bool, bool) = from_record(&h, record).unwrap();
        assert_eq!(flags, (true, false, true));
    }

    #[test]
    fn test_unit_enum_from_scalar() {
        #[derive(Deserialize, Debug, PartialEq)]
        enum Status {
            Active,
            Retired,
        }
        let h = headers(&["status"]);
        let (status,): (Status,) = from_record(&h, vec![Value::from("Retired")]).unwrap();
        assert_eq!(status, Status::Retired);
    }

    #[test]
    fn test_untyped_map_view() {
        let rows: Vec<BTreeMap<String, Vec<String>>> = from_str("tags[|]\na|b\n").unwrap();
        assert_eq!(rows[0]["tags"], vec!["a", "b"]);
    }

    #[test]
    fn test_scalar_into_struct_is_mismatch() {
        let h = headers(&["geo"]);
        let err = from_record::<(Geo,)>(&h, vec![Value::from("1^2")]).unwrap_err();
        assert!(matches!(err, Error::TypeMismatch { .. }));
    }
}
