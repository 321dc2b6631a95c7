//! Forward and reverse adjacency indexes sharing one row-key scheme.
//!
//! Both indexes key an edge by `fingerprint(origin) || fingerprint(target)` and
//! store the literal identifiers as two attributes. The indexes are
//! independent: writing a forward edge does not write the reverse one. Use
//! [`RelationStore::follow`] to write both views of a follow.
//!
//! The store handle is passed into every call and never retained; a
//! [`RelationStore`] itself holds only options and a metrics sink, so it can be
//! shared freely across threads.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::error::{RelationError, Result};
use crate::keys::{self, BoundMode, ScanBounds};
use crate::metrics::{default_metrics, RelationMetrics};
use crate::options::RelationOptions;
use crate::record::{Direction, Relation};
use crate::store::{Attributes, KvStore, ScanIter, ScanSpec};

/// Edge writes, neighbor listings and neighbor counts over both indexes.
#[derive(Clone)]
pub struct RelationStore {
    options: RelationOptions,
    metrics: Arc<dyn RelationMetrics>,
}

impl RelationStore {
    /// Creates a store using `options` and no-op metrics.
    ///
    /// Fails with [`RelationError::InvalidOptions`] when the options do not
    /// validate, e.g. when both directions name the same index.
    pub fn new(options: RelationOptions) -> Result<Self> {
        options.validate()?;
        Ok(Self {
            options,
            metrics: default_metrics(),
        })
    }

    /// Replaces the metrics sink.
    pub fn with_metrics(mut self, metrics: Arc<dyn RelationMetrics>) -> Self {
        self.metrics = metrics;
        self
    }

    /// Options in effect.
    pub fn options(&self) -> &RelationOptions {
        &self.options
    }

    /// Writes the edge `origin -> target` into the `direction` index.
    ///
    /// One point write, no read-before-write. Re-adding an existing edge
    /// overwrites it with identical attributes.
    pub fn add_edge<S>(&self, kv: &S, direction: Direction, origin: &str, target: &str) -> Result<()>
    where
        S: KvStore + ?Sized,
    {
        let index = self.options.index_name(direction);
        let key = keys::encode_key(origin, target);
        let mut attributes = Attributes::new();
        attributes.insert(self.options.origin_attr.clone(), origin.as_bytes().to_vec());
        attributes.insert(self.options.target_attr.clone(), target.as_bytes().to_vec());
        if let Err(err) = kv.put(index, key.as_ref(), &attributes) {
            self.metrics.store_failure(direction);
            warn!(index, origin, target, error = %err, "relations.add_edge.failed");
            return Err(err.into());
        }
        self.metrics.edge_written(direction);
        debug!(index, origin, target, "relations.add_edge");
        Ok(())
    }

    /// Reads the single edge `origin -> target` from the `direction` index.
    pub fn get_edge<S>(
        &self,
        kv: &S,
        direction: Direction,
        origin: &str,
        target: &str,
    ) -> Result<Option<Relation>>
    where
        S: KvStore + ?Sized,
    {
        let index = self.options.index_name(direction);
        let key = keys::encode_key(origin, target);
        let attributes = kv.get(index, key.as_ref()).map_err(|err| {
            self.metrics.store_failure(direction);
            RelationError::from(err)
        })?;
        let Some(attributes) = attributes else {
            return Ok(None);
        };
        let stored_origin = read_attr(&attributes, &self.options.origin_attr, "origin attribute")?;
        let stored_target = read_attr(&attributes, &self.options.target_attr, "target attribute")?;
        Ok(Some(Relation::new(direction, stored_origin, stored_target)))
    }

    /// Lazily lists every edge leaving `origin` in the `direction` index.
    ///
    /// One bounded range scan projected onto the target attribute. Records
    /// come back in ascending `fingerprint(target)` order. Dropping the
    /// iterator early has no side effects; a store failure mid-scan is
    /// yielded once as an `Err` and ends the sequence.
    pub fn list_neighbors<'a, S>(
        &self,
        kv: &'a S,
        direction: Direction,
        origin: &str,
    ) -> Result<NeighborIter<'a>>
    where
        S: KvStore + ?Sized,
    {
        let rows = self.open_scan(kv, direction, origin, true)?;
        self.metrics.neighbor_scan(direction);
        Ok(NeighborIter {
            rows,
            direction,
            origin: origin.to_string(),
            target_attr: self.options.target_attr.clone(),
            metrics: Arc::clone(&self.metrics),
            done: false,
        })
    }

    /// Counts the edges leaving `origin` by enumerating the scan.
    ///
    /// O(degree) per call; nothing is cached, so the result always agrees
    /// with a [`RelationStore::list_neighbors`] over the same store state.
    pub fn count_neighbors<S>(&self, kv: &S, direction: Direction, origin: &str) -> Result<u64>
    where
        S: KvStore + ?Sized,
    {
        let rows = self.open_scan(kv, direction, origin, false)?;
        let mut count = 0u64;
        for row in rows {
            let row = row.map_err(|err| {
                self.metrics.store_failure(direction);
                warn!(direction = %direction, origin, error = %err, "relations.scan.failed");
                RelationError::from(err)
            })?;
            keys::decode_key(&row.key)?;
            count += 1;
        }
        self.metrics.neighbor_count(direction, count);
        debug!(direction = %direction, origin, count, "relations.count");
        Ok(count)
    }

    /// Records that `follower` follows `followee` in the forward index.
    pub fn add_follows<S>(&self, kv: &S, follower: &str, followee: &str) -> Result<()>
    where
        S: KvStore + ?Sized,
    {
        self.add_edge(kv, Direction::Forward, follower, followee)
    }

    /// Records that `followee` is followed by `follower` in the reverse index.
    pub fn add_followed_by<S>(&self, kv: &S, followee: &str, follower: &str) -> Result<()>
    where
        S: KvStore + ?Sized,
    {
        self.add_edge(kv, Direction::Reverse, followee, follower)
    }

    /// Writes both views of a follow: forward `follower -> followee`, then
    /// reverse `followee <- follower`.
    ///
    /// The two writes are independent. If the reverse write fails the forward
    /// edge stays written; re-issuing the call is safe.
    pub fn follow<S>(&self, kv: &S, follower: &str, followee: &str) -> Result<()>
    where
        S: KvStore + ?Sized,
    {
        self.add_follows(kv, follower, followee)?;
        self.add_followed_by(kv, followee, follower)
    }

    /// Lists who `user` follows.
    pub fn list_follows<'a, S>(&self, kv: &'a S, user: &str) -> Result<NeighborIter<'a>>
    where
        S: KvStore + ?Sized,
    {
        self.list_neighbors(kv, Direction::Forward, user)
    }

    /// Lists who follows `user`.
    pub fn list_followed_by<'a, S>(&self, kv: &'a S, user: &str) -> Result<NeighborIter<'a>>
    where
        S: KvStore + ?Sized,
    {
        self.list_neighbors(kv, Direction::Reverse, user)
    }

    /// Number of users `user` follows.
    pub fn count_follows<S>(&self, kv: &S, user: &str) -> Result<u64>
    where
        S: KvStore + ?Sized,
    {
        self.count_neighbors(kv, Direction::Forward, user)
    }

    /// Number of users following `user`, scanned from the reverse index.
    pub fn count_followed_by<S>(&self, kv: &S, user: &str) -> Result<u64>
    where
        S: KvStore + ?Sized,
    {
        self.count_neighbors(kv, Direction::Reverse, user)
    }

    fn open_scan<'a, S>(
        &self,
        kv: &'a S,
        direction: Direction,
        origin: &str,
        project_target: bool,
    ) -> Result<ScanIter<'a>>
    where
        S: KvStore + ?Sized,
    {
        let index = self.options.index_name(direction);
        let bounds = ScanBounds::for_origin(origin, self.options.bound_mode);
        if self.options.bound_mode == BoundMode::LastByte && bounds.is_empty() {
            warn!(
                index,
                origin,
                lower = %hex::encode(&bounds.lower),
                "relations.scan.bounds_wrapped"
            );
        }
        let columns = if project_target {
            vec![self.options.target_attr.clone()]
        } else {
            Vec::new()
        };
        let spec = ScanSpec::new(bounds.lower, bounds.upper)
            .columns(columns)
            .batch_size(self.options.scan_batch_size);
        debug!(index, origin, "relations.scan.open");
        kv.scan(index, spec).map_err(|err| {
            self.metrics.store_failure(direction);
            warn!(index, origin, error = %err, "relations.scan.failed");
            RelationError::from(err)
        })
    }
}

impl Default for RelationStore {
    fn default() -> Self {
        Self {
            options: RelationOptions::default(),
            metrics: default_metrics(),
        }
    }
}

/// Lazy sequence of [`Relation`]s for one origin.
///
/// Yields at most one error; after it, or after the last row, `next` returns
/// `None`.
pub struct NeighborIter<'a> {
    rows: ScanIter<'a>,
    direction: Direction,
    origin: String,
    target_attr: String,
    metrics: Arc<dyn RelationMetrics>,
    done: bool,
}

impl NeighborIter<'_> {
    /// Index the records are read from.
    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Origin the scan is bounded to.
    pub fn origin(&self) -> &str {
        &self.origin
    }

    fn decode(&self, key: &[u8], attributes: &Attributes) -> Result<Relation> {
        keys::decode_key(key)?;
        let target = read_attr(attributes, &self.target_attr, "target attribute")?;
        Ok(Relation::new(self.direction, self.origin.clone(), target))
    }
}

impl Iterator for NeighborIter<'_> {
    type Item = Result<Relation>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let item = match self.rows.next()? {
            Ok(row) => self.decode(&row.key, &row.attributes),
            Err(err) => {
                self.metrics.store_failure(self.direction);
                warn!(
                    direction = %self.direction,
                    origin = %self.origin,
                    error = %err,
                    "relations.scan.failed"
                );
                Err(RelationError::from(err))
            }
        };
        if item.is_err() {
            self.done = true;
        }
        Some(item)
    }
}

fn read_attr(attributes: &Attributes, name: &str, what: &'static str) -> Result<String> {
    let bytes = attributes
        .get(name)
        .ok_or(RelationError::MalformedRecord(what))?;
    String::from_utf8(bytes.clone()).map_err(|_| RelationError::MalformedRecord(what))
}
