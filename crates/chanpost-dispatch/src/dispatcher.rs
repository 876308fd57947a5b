//! Job dispatcher - arms one timer per job and fires deliveries.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU8, AtomicU64, Ordering};
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use chanpost_protocols::{DeliveryAdapter, Job, JobId, Zone};
use chanpost_store::ScheduleStore;

use crate::error::DispatchError;
use crate::resolve::delay_until_next_fire;

/// Flat re-arm period for daily jobs.
///
/// Deliberately now+24h rather than re-resolving the wall-clock time: with
/// a fixed-offset zone the two are identical, and the period stays exact
/// across restarts of the same process day.
const REARM_PERIOD: Duration = Duration::from_secs(24 * 60 * 60);

/// Timer lifecycle states for one job.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum TimerState {
    /// Waiting for the next fire instant.
    Armed = 0,
    /// Delivery in progress.
    Fired = 1,
    /// Daily job armed for the next day.
    Rearmed = 2,
    /// Done; no further fires.
    Retired = 3,
    /// Cancelled before firing.
    Cancelled = 4,
}

impl TimerState {
    fn from_u8(value: u8) -> Self {
        match value {
            0 => TimerState::Armed,
            1 => TimerState::Fired,
            2 => TimerState::Rearmed,
            3 => TimerState::Retired,
            _ => TimerState::Cancelled,
        }
    }
}

/// Handle for one job's timer.
///
/// Holds only the job id, never the record: when the timer elapses the
/// current store state is looked up again, so a removed job's elapse is a
/// no-op (this closes the race between cancellation and an in-flight
/// timer).
pub struct JobTimer {
    id: JobId,
    valid: AtomicBool,
    state: AtomicU8,
    fire_count: AtomicU64,
}

impl JobTimer {
    fn new(id: JobId) -> Self {
        Self {
            id,
            valid: AtomicBool::new(true),
            state: AtomicU8::new(TimerState::Armed as u8),
            fire_count: AtomicU64::new(0),
        }
    }

    /// The job this timer fires.
    pub fn id(&self) -> JobId {
        self.id
    }

    /// Whether the timer is still live (not cancelled).
    pub fn is_valid(&self) -> bool {
        self.valid.load(Ordering::SeqCst)
    }

    /// Current lifecycle state.
    pub fn state(&self) -> TimerState {
        TimerState::from_u8(self.state.load(Ordering::SeqCst))
    }

    /// How many times this timer has fired.
    pub fn fire_count(&self) -> u64 {
        self.fire_count.load(Ordering::Relaxed)
    }

    fn cancel(&self) {
        self.valid.store(false, Ordering::SeqCst);
        self.state.store(TimerState::Cancelled as u8, Ordering::SeqCst);
    }

    fn set_state(&self, state: TimerState) {
        self.state.store(state as u8, Ordering::SeqCst);
    }

    fn record_fire(&self) {
        self.fire_count.fetch_add(1, Ordering::Relaxed);
    }
}

struct ArmedTimer {
    timer: Arc<JobTimer>,
    handle: JoinHandle<()>,
}

/// Single-process timer engine.
///
/// One dispatcher owns all armed timers; no two timers for the same job
/// are ever concurrently armed. Distinct jobs' timers may fire and
/// deliver concurrently; deliveries touch only read-only job content.
pub struct Dispatcher {
    store: Arc<dyn ScheduleStore>,
    delivery: Arc<dyn DeliveryAdapter>,
    zone: Zone,
    timers: RwLock<HashMap<JobId, ArmedTimer>>,
}

impl Dispatcher {
    /// Create a dispatcher over the given store and transport.
    pub fn new(
        store: Arc<dyn ScheduleStore>,
        delivery: Arc<dyn DeliveryAdapter>,
        zone: Zone,
    ) -> Arc<Self> {
        Arc::new(Self {
            store,
            delivery,
            zone,
            timers: RwLock::new(HashMap::new()),
        })
    }

    /// Arm a timer for every job currently in the store.
    ///
    /// Next-fire is always recomputed from the persisted time-of-day; an
    /// absolute instant is never trusted across a restart, since the
    /// process may have been down arbitrarily long.
    pub async fn arm_all(self: &Arc<Self>) -> Result<usize, DispatchError> {
        let jobs = self.store.list().await?;
        let now = Utc::now();
        let count = jobs.len();
        for job in &jobs {
            self.arm_from(job, now).await?;
        }
        info!("Armed {} scheduled job(s)", count);
        Ok(count)
    }

    /// Arm a timer for one job, resolving against the current clock.
    pub async fn arm(self: &Arc<Self>, job: &Job) -> Result<Arc<JobTimer>, DispatchError> {
        self.arm_from(job, Utc::now()).await
    }

    /// Arm a timer for one job, resolving against an explicit `now`.
    ///
    /// Lets batch arming share a single clock reading and makes timing
    /// deterministic under a paused test clock.
    pub async fn arm_from(
        self: &Arc<Self>,
        job: &Job,
        now: DateTime<Utc>,
    ) -> Result<Arc<JobTimer>, DispatchError> {
        let mut timers = self.timers.write().await;
        if timers.contains_key(&job.id) {
            return Err(DispatchError::AlreadyArmed(job.id));
        }

        let timer = Arc::new(JobTimer::new(job.id));
        let delay = delay_until_next_fire(job.time, self.zone, now);
        debug!(
            "Job {} armed for {} {}, first fire in {:?}",
            job.id, job.time, self.zone, delay
        );

        let dispatcher = Arc::clone(self);
        let task_timer = Arc::clone(&timer);
        let handle = tokio::spawn(async move {
            dispatcher.run_timer(task_timer, delay).await;
        });

        timers.insert(job.id, ArmedTimer {
            timer: Arc::clone(&timer),
            handle,
        });
        Ok(timer)
    }

    /// Timer body: sleep, fire, then either re-arm or retire.
    ///
    /// Re-arming is an explicit transition inside this loop, not a timer
    /// that reschedules itself; the fire completes fully before the rearm
    /// decision, so one job never has two armed timers.
    async fn run_timer(self: Arc<Self>, timer: Arc<JobTimer>, first_delay: Duration) {
        let mut delay = first_delay;
        loop {
            tokio::time::sleep(delay).await;

            if !timer.is_valid() {
                return;
            }

            // The store is the source of truth at fire time.
            let job = match self.store.get(timer.id()).await {
                Ok(Some(job)) => job,
                Ok(None) => {
                    debug!("Job {} no longer in store, elapse is a no-op", timer.id());
                    timer.set_state(TimerState::Retired);
                    self.forget(timer.id()).await;
                    return;
                }
                Err(e) => {
                    warn!("Store lookup for job {} failed: {}", timer.id(), e);
                    timer.set_state(TimerState::Retired);
                    self.forget(timer.id()).await;
                    return;
                }
            };

            timer.set_state(TimerState::Fired);
            timer.record_fire();
            self.deliver(&job).await;

            if job.recurrence.is_daily() {
                timer.set_state(TimerState::Rearmed);
                delay = REARM_PERIOD;
                debug!("Job {} re-armed for +24h", job.id);
            } else {
                timer.set_state(TimerState::Retired);
                if let Err(e) = self.store.remove(job.id).await {
                    warn!("Failed to retire job {} from store: {}", job.id, e);
                }
                self.forget(job.id).await;
                info!("Job {} fired once and retired", job.id);
                return;
            }
        }
    }

    /// Deliver the job's content sequence sequentially, in declared order.
    ///
    /// Item N+1 is not sent until item N's attempt completes; a failed
    /// item is logged and does not abort the items after it.
    async fn deliver(&self, job: &Job) {
        info!(
            "Job {} firing: {} item(s) to {}",
            job.id,
            job.content.len(),
            job.channel
        );
        for (index, item) in job.content.iter().enumerate() {
            match self.delivery.send(&job.channel, item).await {
                Ok(ack) => {
                    let msg_id = ack
                        .message_id
                        .map(|m| format!(" as {m}"))
                        .unwrap_or_default();
                    debug!(
                        "Job {} item {} ({}) delivered{}",
                        job.id,
                        index,
                        item.kind(),
                        msg_id
                    );
                }
                Err(e) => {
                    error!(
                        "Job {} item {} ({}) failed: {}",
                        job.id,
                        index,
                        item.kind(),
                        e
                    );
                }
            }
        }
    }

    /// Cancel a job's armed timer, if any. A pending elapse for the id
    /// must not deliver. Returns whether a timer was live.
    pub async fn cancel(&self, id: JobId) -> bool {
        let mut timers = self.timers.write().await;
        match timers.remove(&id) {
            Some(armed) => {
                armed.timer.cancel();
                armed.handle.abort();
                debug!("Job {} timer cancelled", id);
                true
            }
            None => false,
        }
    }

    /// Cancel every armed timer.
    pub async fn cancel_all(&self) {
        let mut timers = self.timers.write().await;
        let count = timers.len();
        for (_, armed) in timers.drain() {
            armed.timer.cancel();
            armed.handle.abort();
        }
        info!("Cancelled {} timer(s)", count);
    }

    /// Whether the job currently has a live timer.
    pub async fn is_armed(&self, id: JobId) -> bool {
        self.timers.read().await.contains_key(&id)
    }

    /// Number of live timers.
    pub async fn armed_count(&self) -> usize {
        self.timers.read().await.len()
    }

    async fn forget(&self, id: JobId) {
        self.timers.write().await.remove(&id);
    }
}

#[cfg(test)]
#[path = "dispatcher_tests.rs"]
mod tests;
