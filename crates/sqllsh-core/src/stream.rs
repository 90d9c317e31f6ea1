//! Lazy result sequences backed by a producer task.
//!
//! A query or scan runs on its own tokio task and pushes decoded rows into a
//! bounded channel. The consumer drains a [`RowStream`]; rows are produced
//! while earlier ones are being consumed. The first error ends the sequence.
//! Dropping the stream stops the producer at its next send.

use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use futures::{Stream, TryStreamExt};
use sqlx::any::AnyRow;
use sqlx::AnyPool;
use tokio::sync::mpsc;
use tracing::debug;

use crate::error::{Error, Result};

/// Rows buffered between the producer task and the consumer.
const STREAM_BUFFER: usize = 256;

/// Finite, single-pass sequence of decoded rows.
#[derive(Debug)]
pub struct RowStream<T> {
    rx: mpsc::Receiver<Result<T>>,
}

impl<T> RowStream<T> {
    /// Waits for the next row. `None` once the sequence is exhausted.
    pub async fn next(&mut self) -> Option<Result<T>> {
        self.rx.recv().await
    }

    /// Drains the sequence, stopping at the first error.
    pub async fn try_collect_vec(mut self) -> Result<Vec<T>> {
        let mut items = Vec::new();
        while let Some(item) = self.rx.recv().await {
            items.push(item?);
        }
        Ok(items)
    }
}

impl<T> Stream for RowStream<T> {
    type Item = Result<T>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.get_mut().rx.poll_recv(cx)
    }
}

/// Runs `sql` with `params` bound in order on a new task, decoding each row.
pub(crate) fn spawn_rows<T, F>(
    pool: AnyPool,
    sql: Arc<str>,
    params: Vec<i64>,
    decode: F,
) -> RowStream<T>
where
    T: Send + 'static,
    F: Fn(&AnyRow) -> Result<T> + Send + 'static,
{
    let (tx, rx) = mpsc::channel(STREAM_BUFFER);
    tokio::spawn(async move {
        let mut query = sqlx::query(&sql);
        for value in params {
            query = query.bind(value);
        }
        let mut rows = query.fetch(&pool);
        let mut produced = 0usize;
        loop {
            let item = match rows.try_next().await {
                Ok(Some(row)) => decode(&row),
                Ok(None) => break,
                Err(err) => Err(Error::Storage(err)),
            };
            let failed = item.is_err();
            if tx.send(item).await.is_err() {
                debug!(produced, "Row consumer dropped, stopping producer");
                return;
            }
            if failed {
                return;
            }
            produced += 1;
        }
        debug!(produced, "Row producer finished");
    });
    RowStream { rx }
}
