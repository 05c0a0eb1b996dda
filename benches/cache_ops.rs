//! Benchmarks for the result cache
//!
//! This benchmark measures:
//! - Key derivation over short and long inputs
//! - Hit path latency
//! - Insert latency with the expiry sweep armed

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use prompt_tune::cache::{CacheKey, ResultCache};

fn bench_key_derivation(c: &mut Criterion) {
    let mut group = c.benchmark_group("cache_key");
    for size in [64usize, 1024, 16 * 1024] {
        let description = "x".repeat(size);
        group.throughput(Throughput::Bytes(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &description, |b, d| {
            b.iter(|| CacheKey::derive(black_box(d), black_box("context"), "claude-haiku"))
        });
    }
    group.finish();
}

fn bench_get_hit(c: &mut Criterion) {
    let cache: ResultCache<String> = ResultCache::with_ttl_minutes(30);
    for i in 0..1000 {
        cache.set(&format!("prompt {i}"), "", "claude-haiku", format!("result {i}"));
    }
    c.bench_function("cache_get_hit", |b| {
        b.iter(|| cache.get(black_box("prompt 500"), "", "claude-haiku"))
    });
    c.bench_function("cache_get_miss", |b| {
        b.iter(|| cache.get(black_box("absent"), "", "claude-haiku"))
    });
}

fn bench_set(c: &mut Criterion) {
    let cache: ResultCache<String> = ResultCache::with_ttl_minutes(30).with_cleanup_threshold(100);
    let mut i = 0u64;
    c.bench_function("cache_set_over_threshold", |b| {
        b.iter(|| {
            i += 1;
            cache.set(&format!("prompt {}", i % 500), "", "claude-haiku", "r".to_string())
        })
    });
}

criterion_group!(benches, bench_key_derivation, bench_get_hit, bench_set);
criterion_main!(benches);
