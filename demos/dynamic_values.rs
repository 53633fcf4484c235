//! Working with decoded Values and schemas directly.
//!
//! Run with: cargo run --example dynamic_values

use serde_csvpp::{ColumnSchema, FieldKind, Reader, Value, Writer};
use std::error::Error;

fn describe(schema: &ColumnSchema, value: &Value, indent: usize) {
    let pad = " ".repeat(indent);
    match (schema.kind, value) {
        (FieldKind::Simple, Value::Scalar(s)) => println!("{}{} = {:?}", pad, schema.name, s),
        (FieldKind::Array, Value::List(items)) => println!("{}{} = {:?}", pad, schema.name, items),
        (FieldKind::Structured, Value::Nested(parts)) => {
            println!("{}{}:", pad, schema.name);
            for (component, part) in schema.components.iter().zip(parts) {
                describe(component, part, indent + 2);
            }
        }
        (FieldKind::ArrayStructured, Value::Nested(elements)) => {
            println!("{}{}: {} element(s)", pad, schema.name, elements.len());
            for element in elements {
                if let Value::Nested(parts) = element {
                    for (component, part) in schema.components.iter().zip(parts) {
                        describe(component, part, indent + 2);
                    }
                }
            }
        }
        (_, other) => println!("{}{} = {} (unexpected shape)", pad, schema.name, other),
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let data = "id,tags[],geo(lat^lon),address[](type^street)\n\
                1,a~b~c,34.05^-118.24,home^1 Main~work^2 Oak\n";

    let mut reader = Reader::from_reader(data.as_bytes());
    let headers = reader.headers()?.to_vec();

    println!("Columns:");
    for header in &headers {
        println!("  {:<24} {}", header.to_string(), header.kind);
    }

    let mut records = reader.read_all()?;
    println!("\nRecord 1:");
    for (schema, value) in headers.iter().zip(&records[0]) {
        describe(schema, value, 2);
    }

    // Edit the record in place: add a tag and drop the work address
    if let Value::List(tags) = &mut records[0][1] {
        tags.push("d".to_string());
    }
    if let Value::Nested(addresses) = &mut records[0][3] {
        addresses.truncate(1);
    }

    let mut writer = Writer::from_writer(Vec::new());
    writer.set_headers(headers);
    writer.write_all(&records)?;
    println!("\nEdited:\n{}", String::from_utf8(writer.into_inner()?)?);

    Ok(())
}
