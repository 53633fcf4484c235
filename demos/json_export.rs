//! Converting CSV++ records to JSON and YAML.
//!
//! Run with: cargo run --example json_export

use serde_csvpp::convert::{to_yaml, JsonArrayWriter};
use serde_csvpp::Reader;
use std::error::Error;
use std::io;

fn main() -> Result<(), Box<dyn Error>> {
    let data = "name,phone[],geo(lat^lon),address[](type^street)\n\
                Alice,555-1234~555-5678,34.05^-118.24,home^1 Main~work^2 Oak\n\
                Bob,,,\n";

    let mut reader = Reader::from_reader(data.as_bytes());
    let headers = reader.headers()?.to_vec();

    // Stream records straight to stdout as a JSON array
    let stdout = io::stdout();
    let mut json = JsonArrayWriter::new(stdout.lock(), headers.clone());
    let mut records = Vec::new();
    for record in reader.records() {
        let record = record?;
        json.write(&record)?;
        records.push(record);
    }
    json.close()?;
    println!("\n");

    println!("{}", to_yaml(&headers, &records)?);

    Ok(())
}
