//! Dispatcher errors.

use chanpost_protocols::JobId;
use chanpost_store::StoreError;
use thiserror::Error;

/// Dispatcher error types.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// A timer for this job is already armed. One job never has two
    /// concurrently armed timers.
    #[error("job {0} already has an armed timer")]
    AlreadyArmed(JobId),

    /// Store failure while arming.
    #[error(transparent)]
    Store(#[from] StoreError),
}
