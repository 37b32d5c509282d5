use std::collections::BTreeMap;

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use pod_usage_ranker::parsing::parse_quantity;
use pod_usage_ranker::{rank, PodRef, Quantity, UsageRecord};

fn quantity_parsing_benchmark(c: &mut Criterion) {
    let test_values = vec![
        ("cpu", "100m"),
        ("cpu", "1"),
        ("cpu", "2.5"),
        ("cpu", "1000000000n"),
        ("cpu", "1000000u"),
        ("memory", "1Ki"),
        ("memory", "512Mi"),
        ("memory", "2.5Gi"),
        ("memory", "1G"),
        ("nvidia.com/gpu", "1"),
    ];

    c.bench_function("parse_quantity", |b| {
        b.iter(|| {
            for (dim, value) in &test_values {
                black_box(parse_quantity(black_box(*dim), black_box(*value)));
            }
        })
    });
}

fn ranking_benchmark(c: &mut Criterion) {
    // Coarse values so most records tie on cpu and fall through to memory.
    let records: Vec<UsageRecord> = (0..5_000)
        .map(|i: i64| {
            let mut usage = BTreeMap::new();
            usage.insert("cpu".to_string(), Quantity::millicores((i * 7919) % 50));
            usage.insert("memory".to_string(), Quantity::bytes((i * 104_729) % 1_000));
            UsageRecord::new(PodRef::new(format!("ns-{}", i % 20), format!("pod-{}", i)), usage)
        })
        .collect();
    let dimensions = vec!["cpu".to_string(), "memory".to_string()];

    c.bench_function("rank_5000_two_dimensions", |b| {
        b.iter(|| black_box(rank(black_box(&records), black_box(&dimensions))))
    });
}

criterion_group!(benches, quantity_parsing_benchmark, ranking_benchmark);
criterion_main!(benches);
