//! Parameterized DML generation.
//!
//! The collision query is the classic banding test: a stored row is a
//! candidate if it equals the probe on all `k` columns of at least one of
//! the `l` bands.
//!
//! ```text
//! SELECT DISTINCT id FROM t WHERE (hv_0=? AND hv_1=?) OR (hv_2=? AND hv_3=?)
//! ```

use crate::dialect::Dialect;
use crate::params::{column_name, LshParams, ID_COLUMN};
use crate::schema;

/// `INSERT` with `k * l + 1` parameters: id first, then hash values.
#[must_use]
pub fn insert(params: LshParams, table: &str, dialect: &Dialect) -> String {
    let placeholders = (0..=params.signature_len())
        .map(|i| dialect.placeholder(i))
        .collect::<Vec<_>>()
        .join(", ");
    format!("INSERT INTO {table} VALUES ({placeholders})")
}

/// Band-disjunction `SELECT DISTINCT id` with `k * l` parameters in signature order.
#[must_use]
pub fn query(params: LshParams, table: &str, dialect: &Dialect) -> String {
    let bands = (0..params.l())
        .map(|band| {
            let predicates = params
                .band(band)
                .map(|i| format!("{}={}", column_name(i), dialect.placeholder(i)))
                .collect::<Vec<_>>()
                .join(" AND ");
            format!("({predicates})")
        })
        .collect::<Vec<_>>()
        .join(" OR ");
    format!("SELECT DISTINCT {ID_COLUMN} FROM {table} WHERE {bands}")
}

/// Unconditional `SELECT *`: id then every hash-value column.
#[must_use]
pub fn scan_all(table: &str) -> String {
    format!("SELECT * FROM {table}")
}

/// Every statement an index needs, built once at construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Statements {
    /// `CREATE TABLE`.
    pub create_table: String,
    /// One `CREATE INDEX` per band.
    pub create_indexes: Vec<String>,
    /// Single-row `INSERT`.
    pub insert: String,
    /// Band-disjunction `SELECT`.
    pub query: String,
    /// Full-table `SELECT`.
    pub scan: String,
}

impl Statements {
    /// Builds the full statement set.
    #[must_use]
    pub fn build(params: LshParams, table: &str, dialect: &Dialect) -> Self {
        Self {
            create_table: schema::create_table(params, table),
            create_indexes: schema::create_indexes(params, table, dialect),
            insert: insert(params, table, dialect),
            query: query(params, table, dialect),
            scan: scan_all(table),
        }
    }
}
