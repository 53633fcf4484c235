//! Structured and array-structured columns.
//!
//! Run with: cargo run --example nested_fields

use serde::{Deserialize, Serialize};
use serde_csvpp::{from_str, parse_header, to_writer_with_headers};
use std::error::Error;

#[derive(Debug, Serialize, Deserialize, PartialEq)]
struct Geo {
    lat: f64,
    lon: f64,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
struct Address {
    #[serde(rename = "type")]
    kind: String,
    street: String,
    geo: Option<Geo>,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
struct Contact {
    name: String,
    phone: Vec<String>,
    address: Vec<Address>,
}

fn main() -> Result<(), Box<dyn Error>> {
    let data = "\
name,phone[],address[](type^street^geo;(lat;lon))
Alice,555-1234~555-5678,home^123 Main^34.05;-118.24~work^456 Oak^
Bob,,
";

    let contacts: Vec<Contact> = from_str(data)?;
    for contact in &contacts {
        println!("{}: {} phone(s)", contact.name, contact.phone.len());
        for address in &contact.address {
            match &address.geo {
                Some(geo) => println!("  {} at {} ({}, {})", address.kind, address.street, geo.lat, geo.lon),
                None => println!("  {} at {}", address.kind, address.street),
            }
        }
    }

    // Same data, different delimiters and column order
    let headers = vec![
        parse_header("name")?,
        parse_header("address[|];(street;type;geo:(lat:lon))")?,
        parse_header("phone[|]")?,
    ];
    let mut buf = Vec::new();
    to_writer_with_headers(&mut buf, headers, &contacts)?;
    let rewritten = String::from_utf8(buf)?;
    println!("\nRewritten:\n{}", rewritten);

    let back: Vec<Contact> = from_str(&rewritten)?;
    assert_eq!(back, contacts);
    println!("✓ Nested fields survive a delimiter change");

    Ok(())
}
