use std::collections::{BTreeMap, HashMap, VecDeque};
use std::ops::Bound;
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::RwLock;
use tracing::trace;

use super::{Attributes, KvStore, ScanIter, ScanRow, ScanSpec, StoreError};

type Index = BTreeMap<Vec<u8>, Attributes>;

/// In-process sorted store keeping one ordered map per index.
///
/// Indexes are created on first write. Scans are lazy and batched: the map is
/// locked only while a batch is copied out, never between two pulls, so
/// writers are not blocked by slow consumers. A scan sees writes that land
/// after its last yielded key.
#[derive(Default)]
pub struct MemStore {
    indexes: RwLock<HashMap<String, Index>>,
    closed: AtomicBool,
}

impl MemStore {
    /// Creates an empty, open store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent call fail with [`StoreError::Closed`].
    pub fn close(&self) {
        self.closed.store(true, Ordering::Release);
    }

    /// Re-opens a closed store. Stored rows are kept.
    pub fn reopen(&self) {
        self.closed.store(false, Ordering::Release);
    }

    /// Returns `true` while the store rejects calls.
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    /// Number of rows held by `index`.
    pub fn len(&self, index: &str) -> usize {
        self.indexes.read().get(index).map_or(0, BTreeMap::len)
    }

    /// Returns `true` if `index` holds no rows.
    pub fn is_empty(&self, index: &str) -> bool {
        self.len(index) == 0
    }

    /// Names of every index written so far, sorted.
    pub fn index_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.indexes.read().keys().cloned().collect();
        names.sort_unstable();
        names
    }

    fn ensure_open(&self) -> Result<(), StoreError> {
        if self.is_closed() {
            return Err(StoreError::Closed);
        }
        Ok(())
    }
}

impl KvStore for MemStore {
    fn put(&self, index: &str, key: &[u8], attributes: &Attributes) -> Result<(), StoreError> {
        self.ensure_open()?;
        let mut indexes = self.indexes.write();
        indexes
            .entry(index.to_string())
            .or_default()
            .insert(key.to_vec(), attributes.clone());
        Ok(())
    }

    fn get(&self, index: &str, key: &[u8]) -> Result<Option<Attributes>, StoreError> {
        self.ensure_open()?;
        let indexes = self.indexes.read();
        Ok(indexes.get(index).and_then(|map| map.get(key)).cloned())
    }

    fn scan(&self, index: &str, spec: ScanSpec) -> Result<ScanIter<'_>, StoreError> {
        self.ensure_open()?;
        let resume = Bound::Included(spec.lower.clone());
        let exhausted = spec.is_empty_range();
        Ok(Box::new(MemScan {
            store: self,
            index: index.to_string(),
            spec,
            resume,
            buffer: VecDeque::new(),
            exhausted,
            failed: false,
        }))
    }
}

struct MemScan<'a> {
    store: &'a MemStore,
    index: String,
    spec: ScanSpec,
    resume: Bound<Vec<u8>>,
    buffer: VecDeque<ScanRow>,
    exhausted: bool,
    failed: bool,
}

impl MemScan<'_> {
    fn fill(&mut self) -> Result<(), StoreError> {
        self.store.ensure_open()?;
        let indexes = self.store.indexes.read();
        let Some(map) = indexes.get(&self.index) else {
            self.exhausted = true;
            return Ok(());
        };
        let start = match &self.resume {
            Bound::Included(key) => Bound::Included(key.as_slice()),
            Bound::Excluded(key) => Bound::Excluded(key.as_slice()),
            Bound::Unbounded => Bound::Unbounded,
        };
        if let (Some(upper), Bound::Included(key) | Bound::Excluded(key)) =
            (self.spec.upper.as_deref(), start)
        {
            if key >= upper {
                self.exhausted = true;
                return Ok(());
            }
        }
        let end = match self.spec.upper.as_deref() {
            Some(upper) => Bound::Excluded(upper),
            None => Bound::Unbounded,
        };
        let batch = self.spec.batch_size.max(1);
        for (key, attributes) in map.range::<[u8], _>((start, end)).take(batch) {
            self.buffer.push_back(ScanRow {
                key: key.clone(),
                attributes: self.spec.project(attributes),
            });
        }
        trace!(
            index = %self.index,
            rows = self.buffer.len(),
            "store.memory.scan_batch"
        );
        if self.buffer.len() < batch {
            self.exhausted = true;
        }
        if let Some(last) = self.buffer.back() {
            self.resume = Bound::Excluded(last.key.clone());
        }
        Ok(())
    }
}

impl Iterator for MemScan<'_> {
    type Item = Result<ScanRow, StoreError>;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(row) = self.buffer.pop_front() {
            return Some(Ok(row));
        }
        if self.exhausted || self.failed {
            return None;
        }
        match self.fill() {
            Ok(()) => self.buffer.pop_front().map(Ok),
            Err(err) => {
                self.failed = true;
                Some(Err(err))
            }
        }
    }
}
