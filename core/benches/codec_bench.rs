//! Criterion benchmarks for encode, decode and skip.
//!
//! Run with: cargo bench

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use objcodec_core::prelude::*;

fn sample_value(width: usize) -> Value {
    Value::List(
        (0..width)
            .map(|i| {
                Value::Map(vec![
                    (Value::from("id"), Value::Long(i as i64)),
                    (Value::from("name"), Value::from(format!("entry-{i}"))),
                    (Value::from("tags"), Value::List(vec![Value::Int(1), Value::Null, Value::Bool(true)])),
                ])
            })
            .collect(),
    )
}

fn bench_codec(c: &mut Criterion) {
    let mut group = c.benchmark_group("codec");

    for width in [16usize, 256, 4096] {
        let value = sample_value(width);
        let mut meter = Unmetered::default();
        let bytes = encode_value(&value, &mut meter).expect("encode sample");
        group.throughput(Throughput::Bytes(bytes.len() as u64));

        group.bench_function(format!("encode_{}", width), |b| {
            b.iter(|| {
                let mut meter = Unmetered::default();
                encode_value(black_box(&value), &mut meter).expect("encode")
            });
        });

        group.bench_function(format!("decode_{}", width), |b| {
            b.iter(|| {
                let mut meter = Unmetered::default();
                decode_value(black_box(&bytes), &mut meter).expect("decode")
            });
        });

        group.bench_function(format!("skip_{}", width), |b| {
            b.iter(|| {
                let mut meter = Unmetered::default();
                let mut dec = Decoder::new(black_box(&bytes), &mut meter);
                dec.skip().expect("skip");
                dec.finish().expect("finish")
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_codec);
criterion_main!(benches);
