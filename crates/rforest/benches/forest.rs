//! Benchmarks: tree induction, forest build and scoring on synthetic data.

mod common;

use common::criterion_config::default_criterion;

use rforest::testing::synthetic_samples;
use rforest::{
    ForestConfig, Interrupt, Parallelism, Predictor, RandomForestTrainer, TreeParams,
};

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};

const N_SAMPLES: usize = 5_000;
const N_FEATURES: usize = 200;

fn config(tree_count: usize, parallelism: Parallelism) -> ForestConfig {
    ForestConfig::builder()
        .features_count(N_FEATURES)
        .tree_count(tree_count)
        .one_sample_size(1_000)
        .tree(TreeParams::with_depth(10))
        .parallelism(parallelism)
        .build()
        .expect("valid bench config")
}

fn bench_build_tree(c: &mut Criterion) {
    let samples = synthetic_samples(N_SAMPLES, N_FEATURES, 42);
    let trainer = RandomForestTrainer::new(config(1, Parallelism::Sequential));

    let mut group = c.benchmark_group("component/train/build_tree");
    group.throughput(Throughput::Elements(1_000));
    group.bench_function("depth10", |b| {
        b.iter(|| black_box(trainer.build_tree(black_box(&samples), 0)))
    });
    group.finish();
}

fn bench_train_threads(c: &mut Criterion) {
    let samples = synthetic_samples(N_SAMPLES, N_FEATURES, 42);
    let interrupt = Interrupt::new();

    let mut group = c.benchmark_group("feature/train/thread_scaling");
    for n_threads in [0, 1, 2, 4] {
        let trainer = RandomForestTrainer::new(config(16, Parallelism::from_threads(n_threads)));
        group.bench_with_input(
            BenchmarkId::new("train", n_threads),
            &samples,
            |b, samples| b.iter(|| black_box(trainer.train(black_box(samples), &interrupt))),
        );
    }
    group.finish();
}

fn bench_score(c: &mut Criterion) {
    let samples = synthetic_samples(N_SAMPLES, N_FEATURES, 42);
    let interrupt = Interrupt::new();
    let forest = RandomForestTrainer::new(config(16, Parallelism::Sequential))
        .train(&samples, &interrupt)
        .expect("bench forest trains")
        .forest;

    let mut group = c.benchmark_group("component/predict/score");
    group.throughput(Throughput::Elements((N_SAMPLES * forest.n_trees()) as u64));
    for n_threads in [0, 4] {
        let predictor = Predictor::new(&forest, Parallelism::from_threads(n_threads));
        group.bench_with_input(
            BenchmarkId::new("score", n_threads),
            &samples,
            |b, samples| b.iter(|| black_box(predictor.score(black_box(samples), &interrupt))),
        );
    }
    group.finish();
}

criterion_group! {
    name = benches;
    config = default_criterion();
    targets = bench_build_tree, bench_train_threads, bench_score
}
criterion_main!(benches);
