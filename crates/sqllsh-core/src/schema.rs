//! DDL generation: the index table and one composite index per band.

use crate::dialect::Dialect;
use crate::params::{column_name, index_name, LshParams, ID_COLUMN};

/// SQL type of the identifier and hash-value columns.
const COLUMN_TYPE: &str = "BIGINT";

/// `CREATE TABLE` for an index with `k * l` hash-value columns.
///
/// Layout: `id` primary key, then `hv_0 .. hv_{k*l-1}`.
#[must_use]
pub fn create_table(params: LshParams, table: &str) -> String {
    let mut columns = Vec::with_capacity(params.signature_len() + 1);
    columns.push(format!("{ID_COLUMN} {COLUMN_TYPE} PRIMARY KEY"));
    columns.extend((0..params.signature_len()).map(|i| format!("{} {COLUMN_TYPE}", column_name(i))));
    format!("CREATE TABLE {table} ({})", columns.join(", "))
}

/// `CREATE INDEX ht_<band>` over the `k` columns of `band`.
#[must_use]
pub fn create_index(band: usize, params: LshParams, table: &str, dialect: &Dialect) -> String {
    let columns = params
        .band(band)
        .map(column_name)
        .collect::<Vec<_>>()
        .join(",");
    dialect.create_index(&index_name(band), table, &columns)
}

/// All `l` band indexes, in band order.
#[must_use]
pub fn create_indexes(params: LshParams, table: &str, dialect: &Dialect) -> Vec<String> {
    (0..params.l())
        .map(|band| create_index(band, params, table, dialect))
        .collect()
}
