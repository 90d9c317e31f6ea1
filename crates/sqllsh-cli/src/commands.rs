//! Subcommand handlers.

use std::io::{self, BufWriter, Write};
use std::path::Path;

use anyhow::{bail, Context, Result};
use sqllsh_core::{Entry, LshConfig, SqlLsh, Statements};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tracing::info;

/// Prints every statement the index would run.
pub fn schema(config: &LshConfig) -> Result<()> {
    let statements = Statements::build(config.params()?, &config.table, &config.dialect()?);
    let mut out = io::stdout().lock();
    writeln!(out, "{};", statements.create_table)?;
    for sql in &statements.create_indexes {
        writeln!(out, "{sql};")?;
    }
    writeln!(out, "{};", statements.insert)?;
    writeln!(out, "{};", statements.query)?;
    writeln!(out, "{};", statements.scan)?;
    Ok(())
}

pub async fn create(config: &LshConfig, build_index: bool) -> Result<()> {
    let pool = config.connect().await.context("Failed to connect")?;
    let lsh = SqlLsh::new(config.params()?, config.table.as_str(), pool, config.dialect()?)
        .await
        .with_context(|| format!("Failed to create index table '{}'", config.table))?;
    if build_index {
        index(&lsh).await?;
    }
    Ok(())
}

pub async fn index(lsh: &SqlLsh) -> Result<()> {
    lsh.index()
        .await
        .with_context(|| format!("Failed to build band indexes on '{}'", lsh.table()))
}

/// Reads JSON-lines entries and inserts them `batch_size` at a time.
///
/// Each batch is its own transaction: a failure keeps earlier batches.
pub async fn insert(lsh: &SqlLsh, file: Option<&Path>, batch_size: usize) -> Result<()> {
    if batch_size == 0 {
        bail!("batch size must be at least 1");
    }
    let reader: Box<dyn AsyncBufRead + Unpin + Send> = match file {
        Some(path) => Box::new(BufReader::new(
            tokio::fs::File::open(path)
                .await
                .with_context(|| format!("Failed to open {}", path.display()))?,
        )),
        None => Box::new(BufReader::new(tokio::io::stdin())),
    };

    let mut lines = reader.lines();
    let mut batch = Vec::with_capacity(batch_size);
    let mut total = 0usize;
    let mut number = 0usize;
    while let Some(line) = lines.next_line().await? {
        number += 1;
        if line.trim().is_empty() {
            continue;
        }
        let entry: Entry = serde_json::from_str(&line)
            .with_context(|| format!("Invalid entry on line {number}"))?;
        batch.push(entry);
        if batch.len() == batch_size {
            total += flush(lsh, &mut batch, total).await?;
        }
    }
    if !batch.is_empty() {
        total += flush(lsh, &mut batch, total).await?;
    }
    info!(table = lsh.table(), entries = total, "Inserted entries");
    Ok(())
}

async fn flush(lsh: &SqlLsh, batch: &mut Vec<Entry>, committed: usize) -> Result<usize> {
    lsh.insert_entries(batch).await.with_context(|| {
        format!("Failed to insert batch after {committed} committed entries")
    })?;
    let inserted = batch.len();
    batch.clear();
    Ok(inserted)
}

pub async fn query(lsh: &SqlLsh, signature: &[u64]) -> Result<()> {
    let mut stream = lsh.query(signature)?;
    let mut out = BufWriter::new(io::stdout().lock());
    while let Some(id) = stream.next().await {
        writeln!(out, "{}", id?)?;
    }
    out.flush()?;
    Ok(())
}

pub async fn scan(lsh: &SqlLsh) -> Result<()> {
    let mut stream = lsh.scan();
    let mut out = BufWriter::new(io::stdout().lock());
    while let Some(entry) = stream.next().await {
        serde_json::to_writer(&mut out, &entry?)?;
        writeln!(out)?;
    }
    out.flush()?;
    Ok(())
}
