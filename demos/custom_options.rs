//! Customizing readers and writers with ReaderOptions and WriterOptions.
//!
//! Run with: RUST_LOG=debug cargo run --example custom_options

use serde_csvpp::{Reader, ReaderOptions, Terminator, Writer, WriterOptions};
use std::error::Error;
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    // Semicolon separated, with comments and padded cells
    let data = "\
# exported 2024-01-01
id ; tags[|] ; geo(lat^lon)
1  ; a|b     ; 1.5^2.5
";
    let options = ReaderOptions::new()
        .with_delimiter(b';')
        .with_comment(b'#')
        .with_trim(true);
    let mut reader = Reader::with_options(data.as_bytes(), options);
    let headers = reader.headers()?.to_vec();
    let records = reader.read_all()?;
    println!("Read {} record(s) with {} column(s)", records.len(), headers.len());

    // Tab separated, CRLF line endings
    let options = WriterOptions::new()
        .with_delimiter(b'\t')
        .with_terminator(Terminator::CrLf);
    let mut writer = Writer::with_options(Vec::new(), options);
    writer.set_headers(headers);
    writer.write_all(&records)?;
    println!("{:?}", String::from_utf8(writer.into_inner()?)?);

    // A tight nesting limit rejects deep headers up front
    let deep = "a(b(c(d)))\nx\n";
    let mut reader = Reader::with_options(
        deep.as_bytes(),
        ReaderOptions::new().with_max_nesting_depth(2),
    );
    match reader.headers() {
        Ok(_) => println!("accepted"),
        Err(err) => println!("rejected: {}", err),
    }

    Ok(())
}
