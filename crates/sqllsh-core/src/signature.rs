//! Signatures and stored entries.

use std::ops::Deref;

use serde::{Deserialize, Serialize};

/// Precomputed hash values, one per locality-sensitive hash function.
///
/// The index never computes these; it only stores and compares them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Signature(Vec<u64>);

impl Signature {
    /// Wraps a list of hash values.
    #[must_use]
    pub fn new(values: Vec<u64>) -> Self {
        Self(values)
    }

    /// Consumes the signature, returning its hash values.
    #[must_use]
    pub fn into_inner(self) -> Vec<u64> {
        self.0
    }
}

impl Deref for Signature {
    type Target = [u64];

    fn deref(&self) -> &[u64] {
        &self.0
    }
}

impl AsRef<[u64]> for Signature {
    fn as_ref(&self) -> &[u64] {
        &self.0
    }
}

impl From<Vec<u64>> for Signature {
    fn from(values: Vec<u64>) -> Self {
        Self(values)
    }
}

impl<const N: usize> From<[u64; N]> for Signature {
    fn from(values: [u64; N]) -> Self {
        Self(values.to_vec())
    }
}

impl FromIterator<u64> for Signature {
    fn from_iter<I: IntoIterator<Item = u64>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// A stored row: caller-assigned id and its signature.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    /// Primary key.
    pub id: i64,
    /// Hash values.
    pub signature: Signature,
}

impl Entry {
    /// Creates an entry.
    #[must_use]
    pub fn new(id: i64, signature: impl Into<Signature>) -> Self {
        Self {
            id,
            signature: signature.into(),
        }
    }
}

/// Bit-preserving `u64` -> `BIGINT`. Values above `i64::MAX` are stored negative.
#[inline]
pub(crate) fn to_column(value: u64) -> i64 {
    i64::from_ne_bytes(value.to_ne_bytes())
}

/// Inverse of [`to_column`].
#[inline]
pub(crate) fn from_column(value: i64) -> u64 {
    u64::from_ne_bytes(value.to_ne_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_mapping_preserves_full_range() {
        for value in [0, 1, u64::MAX / 2, u64::MAX / 2 + 1, u64::MAX] {
            assert_eq!(from_column(to_column(value)), value);
        }
        assert_eq!(to_column(u64::MAX), -1);
    }

    #[test]
    fn test_entry_json_shape() {
        let entry = Entry::new(7, [1, 2, 3, 4]);
        let json = serde_json::to_string(&entry).unwrap();
        assert_eq!(json, r#"{"id":7,"signature":[1,2,3,4]}"#);
    }

    #[test]
    fn test_signature_derefs_to_slice() {
        let sig: Signature = vec![5, 6].into();
        assert_eq!(sig.len(), 2);
        assert_eq!(&sig[..], &[5, 6]);
    }
}
