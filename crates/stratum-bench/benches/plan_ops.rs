//! Criterion benchmarks for buffer planning over operator chains.

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, Criterion};
use stratum_arena::Planner;
use stratum_bench::mlp_chain;
use stratum_ops::BufferPlan;

fn bench_plan_mlp_64(c: &mut Criterion) {
    let ops = mlp_chain(64, 32, 512).unwrap();
    c.bench_function("plan_mlp_64_layers", |b| {
        b.iter(|| {
            let mut planner = Planner::default();
            let plan = BufferPlan::build(black_box(&ops), &mut planner).unwrap();
            black_box(plan.stats().peak)
        });
    });
}

fn bench_plan_mlp_1k(c: &mut Criterion) {
    let ops = mlp_chain(1_000, 8, 64).unwrap();
    c.bench_function("plan_mlp_1k_layers", |b| {
        b.iter(|| {
            let mut planner = Planner::default();
            let plan = BufferPlan::build(black_box(&ops), &mut planner).unwrap();
            black_box(plan.len())
        });
    });
}

criterion_group!(benches, bench_plan_mlp_64, bench_plan_mlp_1k);
criterion_main!(benches);
