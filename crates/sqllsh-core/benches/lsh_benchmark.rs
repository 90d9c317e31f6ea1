//! SQLite-backed index benchmarks.
//!
//! Measures:
//! - Batch insert of random signatures for 128, 256 and 512 hash values
//! - Band index construction
//! - Candidate query on an indexed table

use std::time::{Duration, Instant};

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use sqllsh_core::{LshConfig, SqlLsh};
use tempfile::TempDir;
use tokio::runtime::Runtime;

/// (k, l) shapes: 2x64, 4x64 and 8x64 hash values per signature.
const SHAPES: [(usize, usize); 3] = [(2, 64), (4, 64), (8, 64)];

const BATCH: usize = 1_000;

fn random_signatures(n: usize, len: usize) -> Vec<Vec<u64>> {
    let mut rng = StdRng::seed_from_u64(1);
    (0..n)
        .map(|_| (0..len).map(|_| rng.gen::<u64>()).collect())
        .collect()
}

async fn fresh_index(k: usize, l: usize) -> (SqlLsh, TempDir) {
    let dir = TempDir::new().expect("tempdir");
    let config = LshConfig {
        database_url: format!("sqlite://{}?mode=rwc", dir.path().join("bench.db").display()),
        ..LshConfig::default()
    };
    let pool = config.connect().await.expect("connect");
    let lsh = SqlLsh::sqlite(k, l, "lshtable", pool)
        .await
        .expect("create");
    (lsh, dir)
}

fn bench_batch_insert(c: &mut Criterion) {
    let rt = Runtime::new().expect("runtime");
    let mut group = c.benchmark_group("batch_insert");
    group.sample_size(10);
    group.throughput(Throughput::Elements(BATCH as u64));

    for (k, l) in SHAPES {
        let signatures = random_signatures(BATCH, k * l);
        let ids: Vec<i64> = (0..).take(BATCH).collect();
        let (signatures, ids) = (&signatures, &ids);

        group.bench_with_input(
            BenchmarkId::from_parameter(k * l),
            &(k, l),
            |b, &(k, l)| {
                b.to_async(&rt).iter_custom(|iters| async move {
                    let mut total = Duration::ZERO;
                    for _ in 0..iters {
                        let (lsh, _dir) = fresh_index(k, l).await;
                        let start = Instant::now();
                        lsh.batch_insert(ids, signatures).await.expect("batch");
                        total += start.elapsed();
                    }
                    total
                });
            },
        );
    }
    group.finish();
}

fn bench_index(c: &mut Criterion) {
    let rt = Runtime::new().expect("runtime");
    let mut group = c.benchmark_group("index");
    group.sample_size(10);

    for (k, l) in SHAPES {
        let signatures = random_signatures(BATCH, k * l);
        let ids: Vec<i64> = (0..).take(BATCH).collect();
        let (signatures, ids) = (&signatures, &ids);

        group.bench_with_input(
            BenchmarkId::from_parameter(k * l),
            &(k, l),
            |b, &(k, l)| {
                b.to_async(&rt).iter_custom(|iters| async move {
                    let mut total = Duration::ZERO;
                    for _ in 0..iters {
                        let (lsh, _dir) = fresh_index(k, l).await;
                        lsh.batch_insert(ids, signatures).await.expect("batch");
                        let start = Instant::now();
                        lsh.index().await.expect("index");
                        total += start.elapsed();
                    }
                    total
                });
            },
        );
    }
    group.finish();
}

fn bench_query(c: &mut Criterion) {
    let rt = Runtime::new().expect("runtime");
    let mut group = c.benchmark_group("query");

    for (k, l) in SHAPES {
        let signatures = random_signatures(BATCH, k * l);
        let ids: Vec<i64> = (0..).take(BATCH).collect();
        let (lsh, _dir) = rt.block_on(async {
            let (lsh, dir) = fresh_index(k, l).await;
            lsh.batch_insert(&ids, &signatures).await.expect("batch");
            lsh.index().await.expect("index");
            (lsh, dir)
        });

        group.bench_with_input(BenchmarkId::from_parameter(k * l), &lsh, |b, lsh| {
            let mut next = 0usize;
            b.to_async(&rt).iter(|| {
                let probe = &signatures[next % BATCH];
                next += 1;
                async move {
                    lsh.query(probe)
                        .expect("query")
                        .try_collect_vec()
                        .await
                        .expect("drain")
                }
            });
        });
    }
    group.finish();
}

criterion_group!(benches, bench_batch_insert, bench_index, bench_query);
criterion_main!(benches);
