use criterion::{black_box, criterion_group, criterion_main, Criterion};
use kjson::{decode, encode, parse, stringify, WriteOptions};

const DOCUMENT: &str = r#"{
    // an order with one of every literal kind
    id: 550e8400-e29b-41d4-a716-446655440000,
    created: 2025-01-15T10:30:00.123456789Z,
    ttl: PT15M,
    total: 99.99m,
    sequence: 123456789012345678901234567890n,
    flags: [true, false, null],
    customer: {
        name: 'Ada "the analyst" Lovelace',
        tags: [`vip`, "repeat", 'priority'],
    },
    lines: [
        {sku: "A-1", qty: 2, price: 12.50m},
        {sku: "B-7", qty: 1, price: 74.99m},
    ],
}"#;

fn benchmark(c: &mut Criterion) {
    c.bench_function("parse", |b| {
        b.iter(|| parse(black_box(DOCUMENT)).expect("valid document"));
    });

    let value = parse(DOCUMENT).expect("valid document");
    let options = WriteOptions::default();
    c.bench_function("stringify", |b| {
        b.iter(|| stringify(black_box(&value), &options));
    });

    c.bench_function("encode", |b| b.iter(|| encode(black_box(&value))));

    let bytes = encode(&value);
    c.bench_function("decode", |b| {
        b.iter(|| decode(black_box(&bytes)).expect("valid bytes"));
    });
}

criterion_group!(benches, benchmark);
criterion_main!(benches);
