//! Composite row keys and per-origin scan bounds.
//!
//! A row key is `fingerprint(origin) || fingerprint(target)`, 32 bytes with no
//! delimiter. Every key for one origin shares the same 16-byte prefix, so the
//! keys of an origin form one contiguous range in a bytewise-sorted store.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{RelationError, Result};
use crate::fingerprint::{fingerprint, Fingerprint, FINGERPRINT_LEN};

/// Width in bytes of every composite row key.
pub const ROW_KEY_LEN: usize = 2 * FINGERPRINT_LEN;

/// Fixed-width composite key identifying one directed edge.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct RowKey(pub [u8; ROW_KEY_LEN]);

impl RowKey {
    /// Joins an origin and a target fingerprint.
    pub fn from_parts(origin: Fingerprint, target: Fingerprint) -> Self {
        let mut buf = [0u8; ROW_KEY_LEN];
        buf[..FINGERPRINT_LEN].copy_from_slice(origin.as_bytes());
        buf[FINGERPRINT_LEN..].copy_from_slice(target.as_bytes());
        RowKey(buf)
    }

    /// Origin half of the key.
    pub fn origin(&self) -> Fingerprint {
        let mut arr = [0u8; FINGERPRINT_LEN];
        arr.copy_from_slice(&self.0[..FINGERPRINT_LEN]);
        Fingerprint(arr)
    }

    /// Target half of the key.
    pub fn target(&self) -> Fingerprint {
        let mut arr = [0u8; FINGERPRINT_LEN];
        arr.copy_from_slice(&self.0[FINGERPRINT_LEN..]);
        Fingerprint(arr)
    }

    /// Borrows the key bytes.
    pub fn as_bytes(&self) -> &[u8; ROW_KEY_LEN] {
        &self.0
    }
}

impl AsRef<[u8]> for RowKey {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Debug for RowKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RowKey({}:{})", self.origin(), self.target())
    }
}

/// Single-identifier key: just `fingerprint(a)`, the lower bound of `a`'s range.
pub fn encode_origin_key(a: &str) -> Fingerprint {
    fingerprint(a)
}

/// Composite key `fingerprint(a) || fingerprint(b)`.
pub fn encode_key(a: &str, b: &str) -> RowKey {
    RowKey::from_parts(fingerprint(a), fingerprint(b))
}

/// Splits a composite key at the fingerprint boundary.
pub fn decode_key(key: &[u8]) -> Result<(Fingerprint, Fingerprint)> {
    if key.len() != ROW_KEY_LEN {
        return Err(RelationError::MalformedKey {
            expected: ROW_KEY_LEN,
            actual: key.len(),
        });
    }
    let mut origin = [0u8; FINGERPRINT_LEN];
    let mut target = [0u8; FINGERPRINT_LEN];
    origin.copy_from_slice(&key[..FINGERPRINT_LEN]);
    target.copy_from_slice(&key[FINGERPRINT_LEN..]);
    Ok((Fingerprint(origin), Fingerprint(target)))
}

/// Legacy scan bounds for every edge leaving `a`.
///
/// `upper` is `lower` with only its last byte incremented, wrapping modulo
/// 256. This is an approximation of a prefix scan: when `fingerprint(a)` ends
/// in `0xFF` the upper bound wraps to `0x00`, sorts *below* the lower bound,
/// and an exclusive-upper scan over it comes back empty.
pub fn scan_bounds_for_origin(a: &str) -> (Fingerprint, Fingerprint) {
    last_byte_bounds(fingerprint(a))
}

/// Legacy bounds computed from an already-known fingerprint.
pub fn last_byte_bounds(lower: Fingerprint) -> (Fingerprint, Fingerprint) {
    let mut upper = lower;
    upper.0[FINGERPRINT_LEN - 1] = upper.0[FINGERPRINT_LEN - 1].wrapping_add(1);
    (lower, upper)
}

/// Exact prefix-scan bounds for every edge leaving `a`.
///
/// The upper bound is the shortest byte string greater than every key that
/// starts with `fingerprint(a)`: the last non-`0xFF` byte is incremented and
/// everything after it dropped. `None` means the range runs to the end of the
/// index, which only happens for an all-`0xFF` fingerprint.
pub fn prefix_bounds_for_origin(a: &str) -> (Fingerprint, Option<Vec<u8>>) {
    let lower = fingerprint(a);
    (lower, prefix_successor(lower.as_bytes()))
}

/// Smallest byte string sorting after every string that starts with `prefix`.
pub fn prefix_successor(prefix: &[u8]) -> Option<Vec<u8>> {
    let cut = prefix.iter().rposition(|&b| b != 0xFF)?;
    let mut upper = prefix[..=cut].to_vec();
    upper[cut] += 1;
    Some(upper)
}

/// How the upper bound of an origin scan is derived.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BoundMode {
    /// Carry-propagating prefix successor; exact for every fingerprint.
    #[default]
    Prefix,
    /// Historical last-byte increment; empty scans for fingerprints ending in `0xFF`.
    LastByte,
}

/// Byte range of one origin's edges. `upper` is exclusive; `None` is unbounded.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ScanBounds {
    /// Inclusive lower bound.
    pub lower: Vec<u8>,
    /// Exclusive upper bound.
    pub upper: Option<Vec<u8>>,
}

impl ScanBounds {
    /// Computes the bounds of `origin`'s range under `mode`.
    pub fn for_origin(origin: &str, mode: BoundMode) -> Self {
        match mode {
            BoundMode::Prefix => {
                let (lower, upper) = prefix_bounds_for_origin(origin);
                ScanBounds {
                    lower: lower.as_bytes().to_vec(),
                    upper,
                }
            }
            BoundMode::LastByte => {
                let (lower, upper) = scan_bounds_for_origin(origin);
                ScanBounds {
                    lower: lower.as_bytes().to_vec(),
                    upper: Some(upper.as_bytes().to_vec()),
                }
            }
        }
    }

    /// Returns `true` if `key` falls inside `[lower, upper)`.
    pub fn contains(&self, key: &[u8]) -> bool {
        key >= self.lower.as_slice()
            && self
                .upper
                .as_deref()
                .map_or(true, |upper| key < upper)
    }

    /// Returns `true` if no key can satisfy the bounds.
    pub fn is_empty(&self) -> bool {
        matches!(&self.upper, Some(upper) if upper.as_slice() <= self.lower.as_slice())
    }
}
