//! Input validation errors.

use thiserror::Error;

/// Errors raised while validating operator input, before anything is
/// scheduled. Callers re-prompt; nothing reaches the store or dispatcher.
#[derive(Debug, Error)]
pub enum ScheduleError {
    /// Malformed time-of-day.
    #[error("invalid time of day '{0}': expected 24h HH:MM")]
    InvalidTimeOfDay(String),

    /// Malformed UTC offset.
    #[error("invalid zone offset '{0}': expected +HH:MM or -HH:MM")]
    InvalidZone(String),

    /// A job must carry at least one content item.
    #[error("job content is empty")]
    EmptyContent,

    /// No target channel given and no default configured.
    #[error("no target channel given and no default configured")]
    NoChannel,
}
