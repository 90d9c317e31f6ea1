//! The LSH index façade.
//!
//! Inside the database an index is one table: each signature is a row and
//! each hash function's value is a column. Candidate retrieval checks hash-key
//! collisions with `AND` inside a band and `OR` across bands. [`SqlLsh::index`]
//! adds one multi-column B-tree per band to speed that lookup up.

use std::sync::Arc;

use sqlx::any::{AnyArguments, AnyRow};
use sqlx::query::Query;
use sqlx::{Any, AnyPool, Executor, Row, Transaction};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::dialect::Dialect;
use crate::error::{Error, Result};
use crate::params::LshParams;
use crate::signature::{from_column, to_column, Entry, Signature};
use crate::statement::Statements;
use crate::stream::{spawn_rows, RowStream};

/// On-disk LSH index stored in a relational table.
///
/// Cloning is cheap: clones share the pool and the statement set.
#[derive(Debug, Clone)]
pub struct SqlLsh {
    params: LshParams,
    table: Arc<str>,
    pool: AnyPool,
    dialect: Dialect,
    statements: Arc<Statements>,
    insert_sql: Arc<str>,
    query_sql: Arc<str>,
    scan_sql: Arc<str>,
}

impl SqlLsh {
    /// Creates the index table and prepares its statements, including the
    /// per-band `CREATE INDEX` statements.
    ///
    /// Table creation runs in its own transaction. A table that already exists
    /// is an error; use [`SqlLsh::open`] to attach to one. The pool stays
    /// owned by the caller.
    ///
    /// # Errors
    ///
    /// `Error::CreateTable` if the DDL fails, `Error::Prepare` if a statement
    /// does not prepare.
    pub async fn new(
        params: LshParams,
        table: impl Into<String>,
        pool: AnyPool,
        dialect: Dialect,
    ) -> Result<Self> {
        let lsh = Self::build(params, table.into(), pool, dialect);
        lsh.create_table().await?;
        lsh.prepare().await?;
        lsh.prepare_indexes().await?;
        info!(
            table = %lsh.table,
            k = params.k(),
            l = params.l(),
            dialect = lsh.dialect.name(),
            "Created LSH index"
        );
        Ok(lsh)
    }

    /// Attaches to an index table created earlier with the same parameters.
    ///
    /// Index statements are not prepared here: the band indexes may already
    /// exist, and the backend rejects a `CREATE INDEX` on a taken name.
    ///
    /// # Errors
    ///
    /// `Error::Prepare` if the table is missing or its columns do not match.
    pub async fn open(
        params: LshParams,
        table: impl Into<String>,
        pool: AnyPool,
        dialect: Dialect,
    ) -> Result<Self> {
        let lsh = Self::build(params, table.into(), pool, dialect);
        lsh.prepare().await?;
        debug!(table = %lsh.table, "Opened LSH index");
        Ok(lsh)
    }

    /// [`SqlLsh::new`] with the SQLite dialect.
    pub async fn sqlite(k: usize, l: usize, table: impl Into<String>, pool: AnyPool) -> Result<Self> {
        Self::new(LshParams::new(k, l)?, table, pool, Dialect::sqlite()).await
    }

    /// [`SqlLsh::new`] with the PostgreSQL dialect.
    pub async fn postgres(
        k: usize,
        l: usize,
        table: impl Into<String>,
        pool: AnyPool,
    ) -> Result<Self> {
        Self::new(LshParams::new(k, l)?, table, pool, Dialect::postgres()).await
    }

    fn build(params: LshParams, table: String, pool: AnyPool, dialect: Dialect) -> Self {
        let statements = Statements::build(params, &table, &dialect);
        Self {
            params,
            insert_sql: Arc::from(statements.insert.as_str()),
            query_sql: Arc::from(statements.query.as_str()),
            scan_sql: Arc::from(statements.scan.as_str()),
            statements: Arc::new(statements),
            table: Arc::from(table),
            pool,
            dialect,
        }
    }

    async fn create_table(&self) -> Result<()> {
        let wrap = |source| Error::CreateTable {
            table: self.table.to_string(),
            source,
        };
        debug!(sql = %self.statements.create_table, "Creating table");
        let mut tx = self.pool.begin().await.map_err(wrap)?;
        let created = sqlx::query(&self.statements.create_table)
            .persistent(false)
            .execute(&mut *tx)
            .await;
        if let Err(err) = created {
            return Err(wrap(abort(tx, err).await));
        }
        tx.commit().await.map_err(wrap)
    }

    async fn prepare(&self) -> Result<()> {
        for (statement, sql) in [
            ("insert", &self.insert_sql),
            ("query", &self.query_sql),
            ("scan", &self.scan_sql),
        ] {
            self.pool
                .prepare(sql.as_ref())
                .await
                .map_err(|source| Error::Prepare { statement, source })?;
        }
        Ok(())
    }

    async fn prepare_indexes(&self) -> Result<()> {
        for sql in &self.statements.create_indexes {
            self.pool
                .prepare(sql.as_str())
                .await
                .map_err(|source| Error::Prepare {
                    statement: "index",
                    source,
                })?;
        }
        Ok(())
    }

    /// LSH parameters.
    #[must_use]
    pub fn params(&self) -> LshParams {
        self.params
    }

    /// Table name.
    #[must_use]
    pub fn table(&self) -> &str {
        &self.table
    }

    /// SQL dialect.
    #[must_use]
    pub fn dialect(&self) -> &Dialect {
        &self.dialect
    }

    /// Generated SQL.
    #[must_use]
    pub fn statements(&self) -> &Statements {
        &self.statements
    }

    /// Builds one B-tree index per band, all in one transaction.
    ///
    /// Improves query performance. Calling it twice fails: the backend rejects
    /// the duplicate `ht_<i>` index and nothing from the second call is kept.
    pub async fn index(&self) -> Result<()> {
        let mut tx = self.pool.begin().await?;
        for sql in &self.statements.create_indexes {
            debug!(sql = %sql, "Creating band index");
            let created = sqlx::query(sql).persistent(false).execute(&mut *tx).await;
            if let Err(err) = created {
                return Err(abort(tx, err).await.into());
            }
        }
        tx.commit().await?;
        info!(table = %self.table, bands = self.params.l(), "Built band indexes");
        Ok(())
    }

    /// Inserts one signature under `id`.
    ///
    /// # Errors
    ///
    /// `Error::SignatureSize` if the signature is not `k * l` long (storage is
    /// not touched); `Error::Storage` for constraint violations such as a
    /// duplicate id.
    pub async fn insert(&self, id: i64, signature: &[u64]) -> Result<()> {
        self.params.check_signature(signature)?;
        let mut tx = self.pool.begin().await?;
        let inserted = bind_row(&self.insert_sql, id, signature)
            .execute(&mut *tx)
            .await;
        if let Err(err) = inserted {
            return Err(abort(tx, err).await.into());
        }
        tx.commit().await?;
        Ok(())
    }

    /// Inserts `signatures[i]` under `ids[i]`, all or nothing.
    ///
    /// Every signature is length-checked before the transaction starts. An
    /// empty batch is a no-op.
    pub async fn batch_insert<S>(&self, ids: &[i64], signatures: &[S]) -> Result<()>
    where
        S: AsRef<[u64]>,
    {
        if ids.len() != signatures.len() {
            return Err(Error::CountMismatch {
                ids: ids.len(),
                signatures: signatures.len(),
            });
        }
        for signature in signatures {
            self.params.check_signature(signature.as_ref())?;
        }
        if ids.is_empty() {
            return Ok(());
        }

        let mut tx = self.pool.begin().await?;
        for (&id, signature) in ids.iter().zip(signatures) {
            let inserted = bind_row(&self.insert_sql, id, signature.as_ref())
                .execute(&mut *tx)
                .await;
            if let Err(err) = inserted {
                debug!(table = %self.table, id, "Batch insert failed, rolling back");
                return Err(abort(tx, err).await.into());
            }
        }
        tx.commit().await?;
        debug!(table = %self.table, rows = ids.len(), "Batch inserted");
        Ok(())
    }

    /// [`SqlLsh::batch_insert`] over entries.
    pub async fn insert_entries(&self, entries: &[Entry]) -> Result<()> {
        let ids: Vec<i64> = entries.iter().map(|e| e.id).collect();
        let signatures: Vec<&Signature> = entries.iter().map(|e| &e.signature).collect();
        self.batch_insert(&ids, &signatures).await
    }

    /// Ids of every stored signature sharing at least one band with `signature`.
    ///
    /// Rows are fetched on a task spawned on the current tokio runtime. Each
    /// id is yielded once (`SELECT DISTINCT`).
    ///
    /// # Errors
    ///
    /// `Error::SignatureSize` immediately; storage errors arrive through the
    /// stream and end it.
    pub fn query(&self, signature: &[u64]) -> Result<RowStream<i64>> {
        self.params.check_signature(signature)?;
        let params = signature.iter().copied().map(to_column).collect();
        Ok(spawn_rows(
            self.pool.clone(),
            Arc::clone(&self.query_sql),
            params,
            |row| decode_i64(row, 0),
        ))
    }

    /// Forwards [`SqlLsh::query`] results into `sink`, returning how many ids
    /// were delivered. Stops early if the receiving side is closed.
    pub async fn query_into(&self, signature: &[u64], sink: &mpsc::Sender<i64>) -> Result<usize> {
        forward(self.query(signature)?, sink).await
    }

    /// Every entry in the table, fetched on a spawned task like [`SqlLsh::query`].
    pub fn scan(&self) -> RowStream<Entry> {
        let width = self.params.signature_len();
        spawn_rows(
            self.pool.clone(),
            Arc::clone(&self.scan_sql),
            Vec::new(),
            move |row| decode_entry(row, width),
        )
    }

    /// Forwards [`SqlLsh::scan`] results into `sink`.
    pub async fn scan_into(&self, sink: &mpsc::Sender<Entry>) -> Result<usize> {
        forward(self.scan(), sink).await
    }
}

/// Rolls `tx` back and returns `err`. A failed rollback is only logged.
async fn abort(tx: Transaction<'_, Any>, err: sqlx::Error) -> sqlx::Error {
    if let Err(rollback) = tx.rollback().await {
        warn!(error = %rollback, "Rollback failed");
    }
    err
}

fn bind_row<'q>(sql: &'q str, id: i64, signature: &[u64]) -> Query<'q, Any, AnyArguments<'q>> {
    let mut query = sqlx::query(sql).bind(id);
    for &value in signature {
        query = query.bind(to_column(value));
    }
    query
}

fn decode_i64(row: &AnyRow, column: usize) -> Result<i64> {
    row.try_get::<i64, _>(column)
        .map_err(|source| Error::Decode { column, source })
}

fn decode_entry(row: &AnyRow, width: usize) -> Result<Entry> {
    let id = decode_i64(row, 0)?;
    let signature = (1..=width)
        .map(|column| decode_i64(row, column).map(from_column))
        .collect::<Result<Signature>>()?;
    Ok(Entry { id, signature })
}

async fn forward<T>(mut stream: RowStream<T>, sink: &mpsc::Sender<T>) -> Result<usize> {
    let mut delivered = 0;
    while let Some(item) = stream.next().await {
        if sink.send(item?).await.is_err() {
            break;
        }
        delivered += 1;
    }
    Ok(delivered)
}
