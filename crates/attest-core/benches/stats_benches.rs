//! Criterion benchmarks for the score statistics hot path.
//!
//! Covers: mean, dispersion, and the integer square root, plus a full
//! append-and-recompute pass over a maximally full record.

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use attest_core::constants::MAX_ASSESSORS;
use attest_core::stats::{dispersion, isqrt, mean};
use attest_core::types::{AssessmentRecord, ParticipantId};

fn full_scores() -> Vec<u32> {
    (0..MAX_ASSESSORS as u32).map(|i| 40 + i * 3).collect()
}

fn bench_mean(c: &mut Criterion) {
    let scores = full_scores();
    c.bench_function("stats_mean", |b| b.iter(|| mean(black_box(&scores))));
}

fn bench_dispersion(c: &mut Criterion) {
    let scores = full_scores();
    let m = mean(&scores);
    c.bench_function("stats_dispersion", |b| {
        b.iter(|| dispersion(black_box(&scores), black_box(m)))
    });
}

fn bench_isqrt(c: &mut Criterion) {
    c.bench_function("stats_isqrt", |b| b.iter(|| isqrt(black_box(999_983))));
}

fn bench_record_fill(c: &mut Criterion) {
    c.bench_function("record_fill_to_capacity", |b| {
        b.iter(|| {
            let mut rec = AssessmentRecord::open(0, ParticipantId([0xFF; 32]), 1);
            for i in 0..MAX_ASSESSORS as u8 {
                rec.record_score(ParticipantId([i; 32]), 40 + i as u32, MAX_ASSESSORS)
                    .unwrap();
            }
            black_box(rec)
        })
    });
}

criterion_group!(benches, bench_mean, bench_dispersion, bench_isqrt, bench_record_fill);
criterion_main!(benches);
