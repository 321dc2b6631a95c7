//! Follows/followed-by adjacency indexes over a sorted key-value store.
//!
//! Every directed edge is stored under a fixed-width 32-byte row key made of
//! two 16-byte identifier fingerprints, origin first. Because the store sorts
//! keys bytewise, all edges leaving one origin sit in a single contiguous key
//! range, so listing or counting neighbors is one bounded range scan.
//!
//! ```rust
//! use followgraph::{Direction, MemStore, RelationOptions, RelationStore};
//!
//! # fn main() -> followgraph::Result<()> {
//! let kv = MemStore::new();
//! let relations = RelationStore::new(RelationOptions::default())?;
//!
//! relations.add_edge(&kv, Direction::Forward, "alice", "bob")?;
//! relations.add_edge(&kv, Direction::Forward, "alice", "carol")?;
//!
//! let targets = relations
//!     .list_neighbors(&kv, Direction::Forward, "alice")?
//!     .map(|rel| rel.map(|rel| rel.target))
//!     .collect::<followgraph::Result<Vec<_>>>()?;
//! assert_eq!(targets, ["bob", "carol"]);
//! assert_eq!(relations.count_neighbors(&kv, Direction::Forward, "alice")?, 2);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

pub mod error;
pub mod fingerprint;
pub mod keys;
pub mod logging;
pub mod metrics;
pub mod options;
pub mod record;
pub mod relations;
pub mod store;

pub use error::{RelationError, Result};
pub use fingerprint::{fingerprint, Fingerprint, FINGERPRINT_LEN};
pub use keys::{BoundMode, RowKey, ScanBounds, ROW_KEY_LEN};
pub use logging::{init_logging, DEFAULT_LOG_FILTER};
pub use metrics::{default_metrics, CounterMetrics, NoopMetrics, RelationMetrics};
pub use options::{ConfigError, RelationOptions};
pub use record::{Direction, Relation};
pub use relations::{NeighborIter, RelationStore};
pub use store::{Attributes, KvStore, MemStore, ScanIter, ScanRow, ScanSpec, StoreError};
