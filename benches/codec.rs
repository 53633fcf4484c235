use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use serde::{Deserialize, Serialize};
use serde_csvpp::{decode_cell, encode_cell, from_str, parse_header, to_string, Reader};

#[derive(Serialize, Deserialize, Clone)]
struct Address {
    kind: String,
    street: String,
}

#[derive(Serialize, Deserialize, Clone)]
struct Geo {
    lat: f64,
    lon: f64,
}

#[derive(Serialize, Deserialize, Clone)]
struct Person {
    id: u32,
    name: String,
    phone: Vec<String>,
    geo: Geo,
    address: Vec<Address>,
}

fn person(id: u32) -> Person {
    Person {
        id,
        name: format!("Person {}", id),
        phone: vec![format!("555-{:04}", id), "555-0000".to_string()],
        geo: Geo {
            lat: 34.0522 + id as f64,
            lon: -118.2437,
        },
        address: vec![
            Address {
                kind: "home".to_string(),
                street: format!("{} Main", id),
            },
            Address {
                kind: "work".to_string(),
                street: "456 Oak".to_string(),
            },
        ],
    }
}

fn benchmark_parse_header(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse_header");

    for header in [
        "name",
        "phone[]",
        "geo(lat^lon)",
        "address[](type^street^geo;(lat;lon))",
        "a(b(c(d(e(f(g(h(i(j)))))))))",
    ] {
        group.bench_with_input(BenchmarkId::from_parameter(header), header, |b, h| {
            b.iter(|| parse_header(black_box(h)))
        });
    }

    group.finish();
}

fn benchmark_decode_cell(c: &mut Criterion) {
    let schema = parse_header("address[](type^street^geo;(lat;lon))").unwrap();
    let cell = "home^123 Main^34.05;-118.24~work^456 Oak^40.71;-74.00";

    c.bench_function("decode_array_structured_cell", |b| {
        b.iter(|| decode_cell(black_box(&schema), black_box(cell)))
    });

    let value = decode_cell(&schema, cell);
    c.bench_function("encode_array_structured_cell", |b| {
        b.iter(|| encode_cell(black_box(&schema), black_box(&value)))
    });
}

fn benchmark_read_records(c: &mut Criterion) {
    let mut group = c.benchmark_group("read_records");

    for size in [10, 100, 1000].iter() {
        let people: Vec<Person> = (0..*size).map(person).collect();
        let text = to_string(&people).unwrap();

        group.bench_with_input(BenchmarkId::from_parameter(size), &text, |b, text| {
            b.iter(|| {
                let mut reader = Reader::from_reader(black_box(text.as_bytes()));
                reader.read_all().unwrap()
            })
        });
    }

    group.finish();
}

fn benchmark_serde(c: &mut Criterion) {
    let mut group = c.benchmark_group("serde");

    for size in [10, 100, 1000].iter() {
        let people: Vec<Person> = (0..*size).map(person).collect();
        let text = to_string(&people).unwrap();

        group.bench_with_input(BenchmarkId::new("serialize", size), &people, |b, people| {
            b.iter(|| to_string(black_box(people)))
        });
        group.bench_with_input(BenchmarkId::new("deserialize", size), &text, |b, text| {
            b.iter(|| from_str::<Person>(black_box(text)))
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    benchmark_parse_header,
    benchmark_decode_cell,
    benchmark_read_records,
    benchmark_serde
);
criterion_main!(benches);
