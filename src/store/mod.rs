//! Collaborator interface: a sorted, range-scannable key-value store.
//!
//! The relation indexes never own bytes; they issue point writes, point reads
//! and bounded range scans against an implementation of [`KvStore`] handed to
//! every call.

use std::collections::BTreeMap;
use std::io;

use thiserror::Error;

mod memory;

pub use memory::MemStore;

/// Named attribute values stored alongside a row key.
pub type Attributes = BTreeMap<String, Vec<u8>>;

/// Lazy sequence of scanned rows. An `Err` item ends the scan.
pub type ScanIter<'a> = Box<dyn Iterator<Item = Result<ScanRow, StoreError>> + Send + 'a>;

/// Failures reported by a collaborator store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The store handle has been closed.
    #[error("store is closed")]
    Closed,
    /// I/O failure reaching the store.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    /// The call exceeded the client's deadline.
    #[error("store call timed out")]
    Timeout,
    /// The call was cancelled by the client.
    #[error("store call cancelled")]
    Cancelled,
    /// Backend-specific failure.
    #[error("backend error: {0}")]
    Backend(String),
}

/// One row returned by a range scan.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ScanRow {
    /// Row key.
    pub key: Vec<u8>,
    /// Projected attributes; only the requested columns are present.
    pub attributes: Attributes,
}

/// Range scan request.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ScanSpec {
    /// Inclusive lower key.
    pub lower: Vec<u8>,
    /// Exclusive upper key; `None` scans to the end of the index.
    pub upper: Option<Vec<u8>>,
    /// Attribute projection; empty returns every attribute.
    pub columns: Vec<String>,
    /// Rows the store may fetch per round-trip.
    pub batch_size: usize,
}

impl ScanSpec {
    /// Creates a scan over `[lower, upper)` returning all attributes.
    pub fn new(lower: Vec<u8>, upper: Option<Vec<u8>>) -> Self {
        Self {
            lower,
            upper,
            columns: Vec::new(),
            batch_size: 256,
        }
    }

    /// Restricts the scan to the named attributes.
    pub fn columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.columns = columns.into_iter().map(Into::into).collect();
        self
    }

    /// Sets the per-round-trip batch size.
    pub fn batch_size(mut self, rows: usize) -> Self {
        self.batch_size = rows.max(1);
        self
    }

    /// Returns `true` when the upper bound does not exceed the lower bound.
    pub fn is_empty_range(&self) -> bool {
        matches!(&self.upper, Some(upper) if upper.as_slice() <= self.lower.as_slice())
    }

    /// Keeps only the projected attributes of `attributes`.
    pub fn project(&self, attributes: &Attributes) -> Attributes {
        if self.columns.is_empty() {
            return attributes.clone();
        }
        self.columns
            .iter()
            .filter_map(|col| attributes.get(col).map(|v| (col.clone(), v.clone())))
            .collect()
    }
}

/// Sorted key-value store with named indexes.
///
/// Keys are compared bytewise. Writes to the same key are last-write-wins.
/// Implementations may be shared across threads; the relation layer holds no
/// lock of its own.
pub trait KvStore: Send + Sync {
    /// Writes (or overwrites) the attributes stored under `key`.
    fn put(&self, index: &str, key: &[u8], attributes: &Attributes) -> Result<(), StoreError>;

    /// Reads the latest attributes stored under `key`.
    fn get(&self, index: &str, key: &[u8]) -> Result<Option<Attributes>, StoreError>;

    /// Opens a lazy ascending scan over `spec`'s key range.
    fn scan(&self, index: &str, spec: ScanSpec) -> Result<ScanIter<'_>, StoreError>;
}

impl<T: KvStore + ?Sized> KvStore for &T {
    fn put(&self, index: &str, key: &[u8], attributes: &Attributes) -> Result<(), StoreError> {
        (**self).put(index, key, attributes)
    }

    fn get(&self, index: &str, key: &[u8]) -> Result<Option<Attributes>, StoreError> {
        (**self).get(index, key)
    }

    fn scan(&self, index: &str, spec: ScanSpec) -> Result<ScanIter<'_>, StoreError> {
        (**self).scan(index, spec)
    }
}

impl<T: KvStore + ?Sized> KvStore for std::sync::Arc<T> {
    fn put(&self, index: &str, key: &[u8], attributes: &Attributes) -> Result<(), StoreError> {
        (**self).put(index, key, attributes)
    }

    fn get(&self, index: &str, key: &[u8]) -> Result<Option<Attributes>, StoreError> {
        (**self).get(index, key)
    }

    fn scan(&self, index: &str, spec: ScanSpec) -> Result<ScanIter<'_>, StoreError> {
        (**self).scan(index, spec)
    }
}
