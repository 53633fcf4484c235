//! Property-based tests for the header grammar and the cell codec.
//!
//! Schemas are generated with per-level delimiters so that no nested
//! delimiter collides with an enclosing one, which is the precondition for
//! both round trips.

use proptest::prelude::*;
use serde_csvpp::{
    decode_cell, encode_cell, format_header, parse_header, parse_header_with_depth,
    split_at_depth_zero, ColumnSchema, FieldKind, Value,
};

const MAX_LEVEL: usize = 3;
const ARRAY_DELIMITERS: [[char; 2]; 4] = [['~', '|'], ['#', '+'], ['%', '*'], ['@', '$']];
const COMPONENT_DELIMITERS: [[char; 2]; 4] = [['^', '&'], [';', '!'], [':', '='], ['<', '>']];

fn name() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9_][a-zA-Z0-9_-]{0,5}"
}

fn leaf() -> impl Strategy<Value = String> {
    "[a-z0-9 .]{0,4}"
}

fn schema_at(level: usize) -> BoxedStrategy<ColumnSchema> {
    let array_delimiter = prop::sample::select(ARRAY_DELIMITERS[level].to_vec());
    let component_delimiter = prop::sample::select(COMPONENT_DELIMITERS[level].to_vec());

    let simple = name().prop_map(ColumnSchema::simple);
    let array = (name(), array_delimiter.clone())
        .prop_map(|(n, d)| ColumnSchema::array(n).with_array_delimiter(d));

    if level == MAX_LEVEL {
        return prop_oneof![simple, array].boxed();
    }

    let components = prop::collection::vec(schema_at(level + 1), 1..4);
    let structured = (name(), component_delimiter.clone(), components.clone()).prop_map(
        |(n, c, comps)| ColumnSchema::structured(n, comps).with_component_delimiter(c),
    );
    let array_structured = (name(), array_delimiter, component_delimiter, components).prop_map(
        |(n, a, c, comps)| {
            ColumnSchema::array_structured(n, comps)
                .with_array_delimiter(a)
                .with_component_delimiter(c)
        },
    );

    prop_oneof![
        3 => simple,
        2 => array,
        2 => structured,
        1 => array_structured,
    ]
    .boxed()
}

fn components_value(schema: &ColumnSchema) -> BoxedStrategy<Value> {
    schema
        .components
        .iter()
        .map(value_for)
        .collect::<Vec<_>>()
        .prop_map(Value::Nested)
        .boxed()
}

fn value_for(schema: &ColumnSchema) -> BoxedStrategy<Value> {
    match schema.kind {
        FieldKind::Simple => leaf().prop_map(Value::Scalar).boxed(),
        FieldKind::Array => prop::collection::vec(leaf(), 0..4)
            .prop_map(Value::List)
            .boxed(),
        FieldKind::Structured => components_value(schema),
        FieldKind::ArrayStructured => prop::collection::vec(components_value(schema), 0..3)
            .prop_map(Value::Nested)
            .boxed(),
    }
}

fn schema_and_text() -> impl Strategy<Value = (ColumnSchema, String)> {
    schema_at(0).prop_flat_map(|schema| {
        let text = value_for(&schema);
        (Just(schema.clone()), text.prop_map(move |v| encode_cell(&schema, &v)))
    })
}

fn nested_header(depth: usize) -> String {
    let mut text = "x".to_string();
    for _ in 0..depth {
        text = format!("x({})", text);
    }
    text
}

proptest! {
    #[test]
    fn prop_format_then_parse_preserves_schema(schema in schema_at(0)) {
        let text = format_header(&schema);
        prop_assert_eq!(parse_header(&text), Ok(schema));
    }

    #[test]
    fn prop_parse_then_format_is_canonical(schema in schema_at(0)) {
        let text = format_header(&schema);
        let reparsed = parse_header(&text).unwrap();
        prop_assert_eq!(format_header(&reparsed), text);
    }

    #[test]
    fn prop_codec_is_idempotent_on_canonical_text((schema, text) in schema_and_text()) {
        let decoded = decode_cell(&schema, &text);
        prop_assert_eq!(encode_cell(&schema, &decoded), text);
    }

    #[test]
    fn prop_depth_limit_is_exact(depth in 0usize..12) {
        let text = nested_header(depth);
        prop_assert!(parse_header_with_depth(&text, 0, depth).is_ok());
        let deeper = nested_header(depth + 1);
        prop_assert!(parse_header_with_depth(&deeper, 0, depth).is_err());
    }

    #[test]
    fn prop_split_then_join_restores_text(text in "[ab^()]{0,16}") {
        let parts = split_at_depth_zero(&text, '^');
        prop_assert_eq!(parts.join("^"), text);
    }

    #[test]
    fn prop_parse_never_panics(text in "\\PC{0,24}") {
        let _ = parse_header(&text);
    }

    #[test]
    fn prop_decode_never_panics(schema in schema_at(0), text in "[a-z~^;|()]{0,24}") {
        let _ = decode_cell(&schema, &text);
    }
}
