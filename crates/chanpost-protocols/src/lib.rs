//! # Chanpost Protocols
//!
//! Shared definitions for the chanpost scheduling core.
//! Contains the data model and the delivery contract - no engine code.
//!
//! ## Core Types
//!
//! - [`Job`] - one scheduled delivery of a content sequence to a channel
//! - [`ContentItem`] - one unit of payload (text, media reference, poll)
//! - [`TimeOfDay`] / [`Zone`] - wall-clock fire time and the fixed offset
//!   it is interpreted in
//! - [`DeliveryAdapter`] - trait the actual message transport implements

pub mod content;
pub mod delivery;
pub mod error;
pub mod job;
pub mod time;

pub use content::ContentItem;
pub use delivery::{DeliveryAck, DeliveryAdapter, DeliveryError};
pub use error::ScheduleError;
pub use job::{Job, JobId, NewJob, Recurrence};
pub use time::{TimeOfDay, Zone};
