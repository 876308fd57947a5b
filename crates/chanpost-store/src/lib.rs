//! # Chanpost Store
//!
//! Durable state for the chanpost scheduling core.
//!
//! ## Features
//!
//! - Schedule store: ordered registry of pending send-jobs, JSON on disk,
//!   full rewrite on every mutation
//! - Config store: the default target channel, persisted on set
//! - Soft-fail loading: missing or corrupt files start empty instead of
//!   aborting the process

pub mod config;
pub mod error;
pub mod schedule;

pub use config::ConfigStore;
pub use error::StoreError;
pub use schedule::{FileScheduleStore, MemoryScheduleStore, ScheduleStore};
