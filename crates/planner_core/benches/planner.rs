//! Planner benchmarks for planner_core.
//!
//! Run with: `cargo bench -p planner_core`

// Benchmark binaries don't need docs on macro-generated functions
#![allow(missing_docs)]

use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};

use planner_core::data::standard::*;
use planner_core::goal::Goal;
use planner_core::race::Race;
use planner_test_utils::fixtures;

/// Engine operations the search leans on: cloning a branch and gathering.
pub fn engine_benchmark(c: &mut Criterion) {
    let opening = fixtures::terran_opening();

    c.bench_function("world_clone", |b| b.iter(|| black_box(opening.clone())));

    c.bench_function("train_eight_workers", |b| {
        b.iter_batched(
            || opening.clone(),
            |mut world| {
                for _ in 0..8 {
                    let _ = world.produce_unit(SCV);
                }
                black_box(world.frame())
            },
            BatchSize::SmallInput,
        );
    });
}

/// One planning cycle from the opening, per race.
pub fn planning_cycle_benchmark(c: &mut Criterion) {
    let cases = [
        (Race::Terran, Goal::new().with_units(MARINE, 4)),
        (Race::Protoss, Goal::new().with_units(ZEALOT, 2)),
        (Race::Zerg, Goal::new().with_units(ZERGLING, 6)),
    ];

    let mut group = c.benchmark_group("planning_cycle");
    for (race, goal) in cases {
        let snapshot = fixtures::opening(race);
        group.bench_function(race.display_name(), |b| {
            b.iter_batched(
                || fixtures::planner(race, goal.clone()),
                |mut planner| black_box(planner.run_cycle(&snapshot)),
                BatchSize::SmallInput,
            );
        });
    }
    group.finish();
}

criterion_group!(benches, engine_benchmark, planning_cycle_benchmark);
criterion_main!(benches);
