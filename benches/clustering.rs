use clue::cluster::{backend, Clue, Domain, ExecutionConfig, PointSet};
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rand::prelude::*;

fn synthetic(n: usize, n_blobs: usize, seed: u64) -> PointSet {
    let mut rng = StdRng::seed_from_u64(seed);
    let centres: Vec<[f32; 2]> = (0..n_blobs)
        .map(|_| [rng.random::<f32>() * 100.0, rng.random::<f32>() * 100.0])
        .collect();
    let rows: Vec<Vec<f32>> = (0..n)
        .map(|i| {
            let c = centres[i % n_blobs];
            vec![
                c[0] + rng.random::<f32>() * 2.0 - 1.0,
                c[1] + rng.random::<f32>() * 2.0 - 1.0,
            ]
        })
        .collect();
    PointSet::from_rows_unweighted(&rows).unwrap()
}

fn bench_clue(c: &mut Criterion) {
    let mut group = c.benchmark_group("clue");

    let points = synthetic(20_000, 40, 42);
    let domain = Domain::unbounded(2);
    let clue = Clue::new(0.3, 5.0, 0.6);

    group.bench_function("serial_n20000_d2", |b| {
        b.iter(|| clue.cluster(black_box(&points), &domain).unwrap())
    });

    let config = ExecutionConfig::default();
    let parallel = backend::create("parallel", &config);
    if let Ok(parallel) = parallel {
        group.bench_function("parallel_n20000_d2", |b| {
            b.iter(|| {
                clue.cluster_with(black_box(&points), &domain, parallel.as_ref())
                    .unwrap()
            })
        });
    }

    group.finish();
}

criterion_group!(benches, bench_clue);
criterion_main!(benches);
