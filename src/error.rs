//! Error types for relation operations.

use thiserror::Error;

use crate::options::ConfigError;
use crate::store::StoreError;

/// Result alias used by every relation operation.
pub type Result<T> = std::result::Result<T, RelationError>;

/// Failures surfaced by the relation indexes.
#[derive(Debug, Error)]
pub enum RelationError {
    /// The collaborator store could not serve the call.
    #[error("store unavailable: {0}")]
    StoreUnavailable(#[from] StoreError),
    /// A row key did not have the fixed composite width.
    #[error("malformed row key: expected {expected} bytes, found {actual}")]
    MalformedKey {
        /// Width the codec produces.
        expected: usize,
        /// Width that was supplied.
        actual: usize,
    },
    /// A stored row lacked an identifier attribute or held invalid UTF-8.
    #[error("malformed relation record: {0}")]
    MalformedRecord(&'static str),
    /// The store was configured with options that fail validation.
    #[error("invalid relation options: {0}")]
    InvalidOptions(#[from] ConfigError),
}

impl RelationError {
    /// Returns `true` when the failure came from the collaborator store.
    pub fn is_store_unavailable(&self) -> bool {
        matches!(self, RelationError::StoreUnavailable(_))
    }
}
