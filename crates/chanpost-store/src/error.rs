//! Store errors.

use chanpost_protocols::JobId;
use thiserror::Error;

/// Schedule and config store error types.
#[derive(Debug, Error)]
pub enum StoreError {
    /// No job with the given id in the current collection.
    #[error("no scheduled job with id {0}")]
    NotFound(JobId),

    /// Underlying file read/write failure.
    #[error("store io: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed persisted data.
    #[error("store decode: {0}")]
    Decode(#[from] serde_json::Error),
}
