//! Attainment logger benchmarks
//!
//! Ingestion cost of both loggers and cost of the statistics computed from
//! them, on random-search runs over a sphere function.
//!
//! Toyota Way: Genchi Genbutsu (measure, don't guess)
//!
//! Run with: cargo bench --bench attainment

use attainment_db::eaf::{self, Eaf, Levels};
use attainment_db::eah::{stat, Eah};
use attainment_db::{LogInfo, Logger, OptimizationType, ProblemMeta};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const DIMENSION: usize = 5;
const SAMPLES: u64 = 10_000;

/// Objective values of a random search on the sphere, one per evaluation.
fn random_search(rng: &mut StdRng, samples: u64) -> Vec<(u64, f64)> {
    (1..=samples)
        .map(|evals| {
            let y: f64 = (0..DIMENSION)
                .map(|_| rng.gen_range(-5.0..5.0f64).powi(2))
                .sum();
            (evals, y)
        })
        .collect()
}

fn dataset(runs: usize) -> Vec<Vec<(u64, f64)>> {
    let mut rng = StdRng::seed_from_u64(42);
    (0..runs).map(|_| random_search(&mut rng, SAMPLES)).collect()
}

fn problem() -> ProblemMeta {
    ProblemMeta::new(1, DIMENSION as i32, 1, OptimizationType::Minimization)
}

fn feed<L: Logger>(logger: &mut L, runs: &[Vec<(u64, f64)>]) {
    for run in runs {
        logger.track_problem(&problem());
        for &(evals, y) in run {
            logger.log(&LogInfo::new(evals, y, 0.0));
        }
    }
}

/// Benchmark EAH and EAF ingestion
fn bench_ingestion(c: &mut Criterion) {
    let mut group = c.benchmark_group("ingestion");
    for nb_runs in [10, 50] {
        let data = dataset(nb_runs);
        group.bench_with_input(BenchmarkId::new("eah", nb_runs), &data, |b, data| {
            b.iter(|| {
                let mut logger = Eah::new(0.0, 125.0, 50, 0, SAMPLES, 50).unwrap();
                feed(&mut logger, black_box(data));
                logger
            });
        });
        group.bench_with_input(BenchmarkId::new("eaf", nb_runs), &data, |b, data| {
            b.iter(|| {
                let mut logger = Eaf::new();
                feed(&mut logger, black_box(data));
                logger
            });
        });
    }
    group.finish();
}

/// Benchmark the levels sweep over every attainment level
fn bench_levels(c: &mut Criterion) {
    let mut group = c.benchmark_group("eaf_levels");
    for nb_runs in [10, 50, 200] {
        let mut logger = Eaf::new();
        feed(&mut logger, &dataset(nb_runs));
        group.bench_with_input(BenchmarkId::new("all_levels", nb_runs), &logger, |b, logger| {
            b.iter(|| {
                Levels::new(OptimizationType::Minimization)
                    .compute(black_box(logger))
                    .unwrap()
            });
        });
        group.bench_with_input(BenchmarkId::new("volume", nb_runs), &logger, |b, logger| {
            b.iter(|| {
                let levels = eaf::levels(OptimizationType::Minimization, black_box(logger), vec![])
                    .unwrap();
                eaf::stat::volume(OptimizationType::Minimization, &levels).unwrap()
            });
        });
    }
    group.finish();
}

/// Benchmark EAH histogram and under-curve volume
fn bench_histogram(c: &mut Criterion) {
    let mut group = c.benchmark_group("eah_statistics");
    for buckets in [20, 100] {
        let mut logger = Eah::new(0.0, 125.0, buckets, 0, SAMPLES, buckets).unwrap();
        feed(&mut logger, &dataset(50));
        group.bench_with_input(BenchmarkId::new("histogram", buckets), &logger, |b, logger| {
            b.iter(|| stat::histogram(black_box(logger)).unwrap());
        });
        group.bench_with_input(BenchmarkId::new("under_curve", buckets), &logger, |b, logger| {
            b.iter(|| stat::under_curve::volume(black_box(logger)).unwrap());
        });
    }
    group.finish();
}

criterion_group!(benches, bench_ingestion, bench_levels, bench_histogram);
criterion_main!(benches);
