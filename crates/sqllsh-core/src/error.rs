//! Error types for sqllsh.

use thiserror::Error;

/// LSH index error types.
#[derive(Error, Debug)]
pub enum Error {
    /// Invalid LSH parameters (k or l).
    #[error("Invalid parameters: {0}")]
    InvalidParams(String),

    /// Signature length does not equal k * l.
    #[error("Signature size mismatch: expected {expected} hash values, got {actual}")]
    SignatureSize {
        /// Expected length (k * l).
        expected: usize,
        /// Provided length.
        actual: usize,
    },

    /// Number of ids and signatures differ in a batch insert.
    #[error("Number of signatures and ids mismatch: {ids} ids, {signatures} signatures")]
    CountMismatch {
        /// Number of ids supplied.
        ids: usize,
        /// Number of signatures supplied.
        signatures: usize,
    },

    /// Creating the index table failed.
    #[error("Failed to create table '{table}': {source}")]
    CreateTable {
        /// Table name.
        table: String,
        /// Underlying storage error.
        #[source]
        source: sqlx::Error,
    },

    /// Preparing one of the generated statements failed.
    #[error("Failed to prepare {statement} statement: {source}")]
    Prepare {
        /// Which statement (insert, query, scan).
        statement: &'static str,
        /// Underlying storage error.
        #[source]
        source: sqlx::Error,
    },

    /// Error surfaced by the database, propagated unchanged.
    #[error("Storage error: {0}")]
    Storage(#[from] sqlx::Error),

    /// A stored value did not have the expected shape.
    #[error("Failed to decode column {column}: {source}")]
    Decode {
        /// Zero-based column position in the result row.
        column: usize,
        /// Underlying decode error.
        #[source]
        source: sqlx::Error,
    },

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Result type alias for LSH index operations.
pub type Result<T> = std::result::Result<T, Error>;

impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Self::Config(err.to_string())
    }
}
