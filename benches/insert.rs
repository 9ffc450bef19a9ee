//! Throughput benchmark for the hot insertion path, mirroring the pack's
//! `sezkp-ffts` benchmark layout (`harness = false`, manual `main`).

use bwtrope::{Rope, RopeConfig, Symbol};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

fn insert_n_runs(n: u64) -> Rope {
    let mut rope = Rope::new(RopeConfig::default());
    let mut len = 0u64;
    let mut lcg: u64 = 0x9E3779B97F4A7C15;
    for _ in 0..n {
        lcg = lcg.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
        let x = if len == 0 { 0 } else { lcg % (len + 1) };
        let sym = Symbol::new((lcg % 5 + 1) as u8);
        rope.insert_run(black_box(x), sym, 1);
        len += 1;
    }
    rope
}

fn bench_insert_run(c: &mut Criterion) {
    let mut group = c.benchmark_group("insert_run");
    for n in [1_000u64, 10_000, 100_000] {
        group.bench_with_input(BenchmarkId::from_parameter(n), &n, |b, &n| {
            b.iter(|| insert_n_runs(black_box(n)));
        });
    }
    group.finish();
}

criterion_group!(benches, bench_insert_run);
criterion_main!(benches);
