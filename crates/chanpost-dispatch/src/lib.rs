//! # Chanpost Dispatch
//!
//! Timer engine for the chanpost scheduling core.
//!
//! ## Features
//!
//! - One armed timer per scheduled job, tokio timers only
//! - Explicit timer lifecycle: armed -> fired -> (rearmed | retired)
//! - Store-checked firing: a cancelled job's elapse is a no-op
//! - Sequential per-job delivery, log-and-continue on item failure

pub mod dispatcher;
pub mod error;
pub mod resolve;

pub use dispatcher::{Dispatcher, JobTimer, TimerState};
pub use error::DispatchError;
pub use resolve::{delay_until_next_fire, resolve_next_fire};
