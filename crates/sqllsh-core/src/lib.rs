//! # sqllsh
//!
//! On-disk locality-sensitive hashing index stored in SQLite or PostgreSQL.
//!
//! sqllsh does not implement any hash family (MinHash, random hyperplane,
//! p-stable projection, ...). Callers hash their data and hand over the
//! resulting signatures together with the `k` and `l` parameters:
//!
//! - `k`: hash values that form one hash key (band width)
//! - `l`: number of hash tables (bands)
//!
//! Each signature becomes a row of `k * l` `BIGINT` columns. A query returns
//! every id whose stored signature equals the probe on all `k` columns of at
//! least one band. See chapter 3 of *Mining of Massive Datasets* for the
//! banding technique.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use sqllsh_core::{LshConfig, SqlLsh};
//!
//! # async fn example() -> sqllsh_core::Result<()> {
//! let config = LshConfig::default();
//! let pool = config.connect().await?;
//! let lsh = SqlLsh::sqlite(2, 2, "lshtable", pool).await?;
//!
//! lsh.insert(1, &[0, 1, 2, 3]).await?;
//! lsh.index().await?;
//!
//! // Band 0 (0, 1) collides with entry 1.
//! let ids = lsh.query(&[0, 1, 9, 9])?.try_collect_vec().await?;
//! assert_eq!(ids, vec![1]);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![cfg_attr(test, allow(clippy::uninlined_format_args, clippy::manual_assert))]

pub mod config;
pub mod dialect;
pub mod error;
pub mod lsh;
pub mod params;
pub mod schema;
pub mod signature;
pub mod statement;
pub mod stream;

pub use config::LshConfig;
pub use dialect::{Dialect, DialectKind};
pub use error::{Error, Result};
pub use lsh::SqlLsh;
pub use params::LshParams;
pub use signature::{Entry, Signature};
pub use statement::Statements;
pub use stream::RowStream;
