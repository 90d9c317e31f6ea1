//! LSH parameters and the column layout derived from them.

use std::ops::Range;

use crate::error::{Error, Result};

/// Name of the identifier column.
pub const ID_COLUMN: &str = "id";

/// LSH parameters: `k` hash values per key, `l` hash tables.
///
/// The `k * l` hash-value columns are split into `l` contiguous bands of `k`
/// columns; band `i` covers positions `[i * k, i * k + k)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LshParams {
    k: usize,
    l: usize,
}

impl LshParams {
    /// Creates validated parameters.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidParams` if `k` or `l` is zero, or if `k * l`
    /// overflows.
    pub fn new(k: usize, l: usize) -> Result<Self> {
        if k == 0 {
            return Err(Error::InvalidParams("k must be at least 1".to_string()));
        }
        if l == 0 {
            return Err(Error::InvalidParams("l must be at least 1".to_string()));
        }
        if k.checked_mul(l).is_none() {
            return Err(Error::InvalidParams(format!("k * l overflows ({k} * {l})")));
        }
        Ok(Self { k, l })
    }

    /// Number of hash values per key.
    #[must_use]
    pub fn k(&self) -> usize {
        self.k
    }

    /// Number of hash tables.
    #[must_use]
    pub fn l(&self) -> usize {
        self.l
    }

    /// Signature length, `k * l`.
    #[must_use]
    pub fn signature_len(&self) -> usize {
        self.k * self.l
    }

    /// Column positions covered by band `band`.
    #[must_use]
    pub fn band(&self, band: usize) -> Range<usize> {
        band * self.k..(band + 1) * self.k
    }

    /// Checks that `signature` has exactly `k * l` values.
    pub fn check_signature(&self, signature: &[u64]) -> Result<()> {
        let expected = self.signature_len();
        if signature.len() != expected {
            return Err(Error::SignatureSize {
                expected,
                actual: signature.len(),
            });
        }
        Ok(())
    }
}

/// Name of the hash-value column at `position`.
#[must_use]
pub fn column_name(position: usize) -> String {
    format!("hv_{position}")
}

/// Name of the composite index over band `band`.
#[must_use]
pub fn index_name(band: usize) -> String {
    format!("ht_{band}")
}
