//! PostgreSQL integration test.
//!
//! Runs only when `SQLLSH_TEST_POSTGRES_URL` points at a database the test
//! may create and drop tables in, e.g.
//! `SQLLSH_TEST_POSTGRES_URL=postgres://postgres@localhost/sqllsh cargo test`.

mod common;

use common::random_signatures;
use sqllsh_core::{Entry, Error, LshConfig, SqlLsh};

fn postgres_url() -> Option<String> {
    std::env::var("SQLLSH_TEST_POSTGRES_URL").ok()
}

#[tokio::test]
async fn test_postgres_lifecycle() {
    let Some(url) = postgres_url() else {
        eprintln!("SQLLSH_TEST_POSTGRES_URL not set, skipping");
        return;
    };
    let config = LshConfig {
        database_url: url,
        ..LshConfig::default()
    };
    let pool = config.connect().await.expect("connect");
    let table = format!("sqllsh_test_{}", std::process::id());

    let lsh = SqlLsh::postgres(2, 2, table.clone(), pool.clone())
        .await
        .expect("create");
    assert!(lsh.scan().try_collect_vec().await.expect("scan").is_empty());

    let signatures = random_signatures(10, 4);
    let ids: Vec<i64> = (0..10).collect();
    lsh.batch_insert(&ids, &signatures).await.expect("batch");
    lsh.index().await.expect("index");
    assert!(matches!(lsh.index().await, Err(Error::Storage(_))));

    for (id, signature) in ids.iter().zip(&signatures) {
        let found = lsh
            .query(signature)
            .expect("query")
            .try_collect_vec()
            .await
            .expect("drain");
        assert!(found.contains(id), "id {id}");
    }

    lsh.insert(100, &[0, 1, 2, 3]).await.expect("insert");
    let found = lsh
        .query(&[0, 1, 9, 9])
        .expect("query")
        .try_collect_vec()
        .await
        .expect("drain");
    assert!(found.contains(&100));

    let mut entries = lsh.scan().try_collect_vec().await.expect("scan");
    entries.sort_by_key(|e| e.id);
    assert_eq!(entries.len(), 11);
    assert_eq!(entries[10], Entry::new(100, [0, 1, 2, 3]));

    sqlx::query(&format!("DROP TABLE {table}"))
        .execute(&pool)
        .await
        .expect("drop table");
}
