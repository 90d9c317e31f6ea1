//! Shared helpers for integration tests.

#![allow(dead_code)]

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use sqllsh_core::{LshConfig, SqlLsh};
use sqlx::AnyPool;
use tempfile::TempDir;

/// Opens a pool on a fresh file-backed SQLite database.
pub async fn sqlite_pool() -> (AnyPool, TempDir) {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let config = LshConfig {
        database_url: format!("sqlite://{}?mode=rwc", dir.path().join("lsh.db").display()),
        ..LshConfig::default()
    };
    let pool = config.connect().await.expect("Failed to connect");
    (pool, dir)
}

/// SQLite-backed index with the given parameters on table `lshtable`.
pub async fn sqlite_lsh(k: usize, l: usize) -> (SqlLsh, TempDir) {
    let (pool, dir) = sqlite_pool().await;
    let lsh = SqlLsh::sqlite(k, l, "lshtable", pool)
        .await
        .expect("Failed to create index");
    (lsh, dir)
}

/// Deterministic random signatures over the full `u64` range.
pub fn random_signatures(n: usize, len: usize) -> Vec<Vec<u64>> {
    let mut rng = StdRng::seed_from_u64(1);
    (0..n)
        .map(|_| (0..len).map(|_| rng.gen::<u64>()).collect())
        .collect()
}
