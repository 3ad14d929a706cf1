//! Classification throughput over one payload of each event kind.

#![allow(missing_docs)]

#[path = "../tests/common/webhooks.rs"]
mod webhooks;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use gitman::classify;
use gitman::services::classify_bytes;

fn bench_classify(c: &mut Criterion) {
    let mut group = c.benchmark_group("classify");
    group.throughput(Throughput::Elements(1));

    for (name, payload) in webhooks::all_events() {
        group.bench_with_input(BenchmarkId::new("value", name), &payload, |b, payload| {
            b.iter(|| classify(black_box(payload)));
        });
    }
    group.finish();
}

fn bench_classify_bytes(c: &mut Criterion) {
    let raw: Vec<(&str, Vec<u8>)> = webhooks::all_events()
        .into_iter()
        .map(|(name, payload)| (name, serde_json::to_vec(&payload).unwrap_or_default()))
        .collect();
    let total: usize = raw.iter().map(|(_, bytes)| bytes.len()).sum();

    let mut group = c.benchmark_group("classify_bytes");
    group.throughput(Throughput::Bytes(total as u64));
    group.bench_function("all_kinds", |b| {
        b.iter(|| {
            for (_, bytes) in &raw {
                let _ = black_box(classify_bytes(black_box(bytes)));
            }
        });
    });
    group.finish();
}

criterion_group!(benches, bench_classify, bench_classify_bytes);
criterion_main!(benches);
