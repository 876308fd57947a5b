//! Job definition - one scheduled delivery of a content sequence.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::content::ContentItem;
use crate::error::ScheduleError;
use crate::time::TimeOfDay;

/// Stable job identity, assigned by the store in insertion order starting
/// at 1. Printed to and typed by the operator for cancel-by-id.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct JobId(pub u64);

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Whether a job fires once or re-arms every day after firing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recurrence {
    /// Fires once, then retires.
    Once,
    /// Re-arms for the next day after every fire, until cancelled.
    Daily,
}

impl Recurrence {
    pub fn is_daily(&self) -> bool {
        matches!(self, Recurrence::Daily)
    }

    pub fn from_daily_flag(daily: bool) -> Self {
        if daily {
            Recurrence::Daily
        } else {
            Recurrence::Once
        }
    }
}

/// A scheduled delivery of a content sequence to a channel at a time-of-day.
///
/// Content and time are immutable once scheduled; the only mutation is
/// removal. The next-fire instant is derived state and never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Job {
    /// Stable identity.
    pub id: JobId,
    /// Target channel identifier (e.g. "@mychannel" or "-100...").
    pub channel: String,
    /// Ordered content sequence; never empty.
    pub content: Vec<ContentItem>,
    /// Wall-clock fire time in the configured zone.
    pub time: TimeOfDay,
    /// Recurrence, persisted as the `daily` flag.
    #[serde(rename = "daily", with = "daily_flag")]
    pub recurrence: Recurrence,
}

mod daily_flag {
    use serde::{Deserialize, Deserializer, Serializer};

    use super::Recurrence;

    pub fn serialize<S: Serializer>(r: &Recurrence, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_bool(r.is_daily())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Recurrence, D::Error> {
        Ok(Recurrence::from_daily_flag(bool::deserialize(d)?))
    }
}

/// A job as submitted by the command surface, before the store assigns an
/// identity.
#[derive(Debug, Clone)]
pub struct NewJob {
    pub channel: String,
    pub content: Vec<ContentItem>,
    pub time: TimeOfDay,
    pub recurrence: Recurrence,
}

impl NewJob {
    /// Validate and build a job submission.
    ///
    /// Rejects an empty content sequence; everything else was validated
    /// when the individual fields were parsed.
    pub fn new(
        channel: impl Into<String>,
        content: Vec<ContentItem>,
        time: TimeOfDay,
        recurrence: Recurrence,
    ) -> Result<Self, ScheduleError> {
        if content.is_empty() {
            return Err(ScheduleError::EmptyContent);
        }
        Ok(Self {
            channel: channel.into(),
            content,
            time,
            recurrence,
        })
    }

    /// Attach the store-assigned identity.
    pub fn into_job(self, id: JobId) -> Job {
        Job {
            id,
            channel: self.channel,
            content: self.content,
            time: self.time,
            recurrence: self.recurrence,
        }
    }
}
