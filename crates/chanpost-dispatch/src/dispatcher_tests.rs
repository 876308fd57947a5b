use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use tokio::sync::Mutex;

use chanpost_protocols::{
    ContentItem, DeliveryAck, DeliveryAdapter, DeliveryError, Job, JobId, NewJob, Recurrence,
    TimeOfDay, Zone,
};
use chanpost_store::{MemoryScheduleStore, ScheduleStore};

use super::{Dispatcher, TimerState};
use crate::error::DispatchError;

/// Records every (channel, kind) send attempt it accepts.
struct RecordingDelivery {
    sent: Mutex<Vec<(String, String)>>,
}

impl RecordingDelivery {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            sent: Mutex::new(Vec::new()),
        })
    }

    async fn sent(&self) -> Vec<(String, String)> {
        self.sent.lock().await.clone()
    }
}

#[async_trait]
impl DeliveryAdapter for RecordingDelivery {
    async fn send(
        &self,
        channel: &str,
        item: &ContentItem,
    ) -> Result<DeliveryAck, DeliveryError> {
        self.sent
            .lock()
            .await
            .push((channel.to_string(), item.kind().to_string()));
        Ok(DeliveryAck::default())
    }
}

/// Rejects one content kind, accepts everything else.
struct RejectKindDelivery {
    rejected_kind: &'static str,
    sent: Mutex<Vec<String>>,
}

#[async_trait]
impl DeliveryAdapter for RejectKindDelivery {
    async fn send(
        &self,
        channel: &str,
        item: &ContentItem,
    ) -> Result<DeliveryAck, DeliveryError> {
        if item.kind() == self.rejected_kind {
            return Err(DeliveryError::Rejected {
                channel: channel.to_string(),
                kind: item.kind(),
                reason: "unsupported".to_string(),
            });
        }
        self.sent.lock().await.push(item.kind().to_string());
        Ok(DeliveryAck::default())
    }
}

// 08:30 IST. A 09:00 job armed from here fires in 30 minutes.
fn base_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 1, 3, 0, 0).unwrap()
}

fn nine_am() -> TimeOfDay {
    TimeOfDay::new(9, 0).unwrap()
}

async fn schedule(
    store: &MemoryScheduleStore,
    content: Vec<ContentItem>,
    daily: bool,
) -> Job {
    let id = store
        .add(
            NewJob::new(
                "@chan",
                content,
                nine_am(),
                Recurrence::from_daily_flag(daily),
            )
            .unwrap(),
        )
        .await
        .unwrap();
    store.get(id).await.unwrap().unwrap()
}

#[tokio::test(start_paused = true)]
async fn test_one_shot_fires_once_and_retires() {
    let store = Arc::new(MemoryScheduleStore::new());
    let delivery = RecordingDelivery::new();
    let dispatcher = Dispatcher::new(store.clone(), delivery.clone(), Zone::ist());

    let job = schedule(&store, vec![ContentItem::text("hi")], false).await;
    let timer = dispatcher.arm_from(&job, base_now()).await.unwrap();
    assert_eq!(timer.state(), TimerState::Armed);

    tokio::time::sleep(Duration::from_secs(30 * 60 + 1)).await;

    assert_eq!(delivery.sent().await, [("@chan".into(), "text".into())]);
    assert_eq!(timer.fire_count(), 1);
    assert_eq!(timer.state(), TimerState::Retired);
    assert!(!dispatcher.is_armed(job.id).await);
    // One-shot jobs leave the store after firing.
    assert!(store.get(job.id).await.unwrap().is_none());

    // Nothing else fires later.
    tokio::time::sleep(Duration::from_secs(48 * 60 * 60)).await;
    assert_eq!(timer.fire_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_daily_job_rearms_every_24h() {
    let store = Arc::new(MemoryScheduleStore::new());
    let delivery = RecordingDelivery::new();
    let dispatcher = Dispatcher::new(store.clone(), delivery.clone(), Zone::ist());

    let job = schedule(&store, vec![ContentItem::text("daily")], true).await;
    let timer = dispatcher.arm_from(&job, base_now()).await.unwrap();

    tokio::time::sleep(Duration::from_secs(30 * 60 + 1)).await;
    assert_eq!(timer.fire_count(), 1);
    assert_eq!(timer.state(), TimerState::Rearmed);

    tokio::time::sleep(Duration::from_secs(24 * 60 * 60)).await;
    assert_eq!(timer.fire_count(), 2);

    tokio::time::sleep(Duration::from_secs(24 * 60 * 60)).await;
    assert_eq!(timer.fire_count(), 3);

    // Daily jobs stay armed and stored.
    assert!(dispatcher.is_armed(job.id).await);
    assert!(store.get(job.id).await.unwrap().is_some());
    assert_eq!(delivery.sent().await.len(), 3);
}

#[tokio::test(start_paused = true)]
async fn test_cancel_prevents_pending_fire() {
    let store = Arc::new(MemoryScheduleStore::new());
    let delivery = RecordingDelivery::new();
    let dispatcher = Dispatcher::new(store.clone(), delivery.clone(), Zone::ist());

    let job = schedule(&store, vec![ContentItem::text("never")], true).await;
    let timer = dispatcher.arm_from(&job, base_now()).await.unwrap();

    assert!(dispatcher.cancel(job.id).await);
    assert_eq!(timer.state(), TimerState::Cancelled);
    assert!(!timer.is_valid());

    tokio::time::sleep(Duration::from_secs(2 * 60 * 60)).await;
    assert!(delivery.sent().await.is_empty());
    assert_eq!(timer.fire_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_cancel_unknown_job_is_false() {
    let store = Arc::new(MemoryScheduleStore::new());
    let dispatcher = Dispatcher::new(store, RecordingDelivery::new(), Zone::ist());
    assert!(!dispatcher.cancel(JobId(42)).await);
}

#[tokio::test(start_paused = true)]
async fn test_removed_job_elapse_is_noop() {
    let store = Arc::new(MemoryScheduleStore::new());
    let delivery = RecordingDelivery::new();
    let dispatcher = Dispatcher::new(store.clone(), delivery.clone(), Zone::ist());

    let job = schedule(&store, vec![ContentItem::text("gone")], false).await;
    let timer = dispatcher.arm_from(&job, base_now()).await.unwrap();

    // Removed behind the dispatcher's back; the timer still elapses but
    // must not deliver.
    store.remove(job.id).await.unwrap();

    tokio::time::sleep(Duration::from_secs(2 * 60 * 60)).await;
    assert!(delivery.sent().await.is_empty());
    assert_eq!(timer.fire_count(), 0);
    assert_eq!(timer.state(), TimerState::Retired);
    assert!(!dispatcher.is_armed(job.id).await);
}

#[tokio::test(start_paused = true)]
async fn test_failed_item_does_not_abort_sequence() {
    let store = Arc::new(MemoryScheduleStore::new());
    let delivery = Arc::new(RejectKindDelivery {
        rejected_kind: "photo",
        sent: Mutex::new(Vec::new()),
    });
    let dispatcher = Dispatcher::new(store.clone(), delivery.clone(), Zone::ist());

    let content = vec![
        ContentItem::text("first"),
        ContentItem::photo("file-1", None),
        ContentItem::text("last"),
    ];
    let job = schedule(&store, content, false).await;
    let timer = dispatcher.arm_from(&job, base_now()).await.unwrap();

    tokio::time::sleep(Duration::from_secs(30 * 60 + 1)).await;

    // The middle item failed; the items around it were still attempted
    // in order.
    assert_eq!(*delivery.sent.lock().await, ["text", "text"]);
    assert_eq!(timer.fire_count(), 1);
    assert_eq!(timer.state(), TimerState::Retired);
}

#[tokio::test(start_paused = true)]
async fn test_arming_twice_is_rejected() {
    let store = Arc::new(MemoryScheduleStore::new());
    let dispatcher = Dispatcher::new(store.clone(), RecordingDelivery::new(), Zone::ist());

    let job = schedule(&store, vec![ContentItem::text("once")], true).await;
    dispatcher.arm_from(&job, base_now()).await.unwrap();

    let result = dispatcher.arm_from(&job, base_now()).await;
    assert!(matches!(result, Err(DispatchError::AlreadyArmed(id)) if id == job.id));
    assert_eq!(dispatcher.armed_count().await, 1);
}

#[tokio::test(start_paused = true)]
async fn test_arm_all_arms_every_stored_job() {
    let store = Arc::new(MemoryScheduleStore::new());
    let delivery = RecordingDelivery::new();
    let dispatcher = Dispatcher::new(store.clone(), delivery.clone(), Zone::ist());

    for text in ["a", "b", "c"] {
        schedule(&store, vec![ContentItem::text(text)], false).await;
    }

    let armed = dispatcher.arm_all().await.unwrap();
    assert_eq!(armed, 3);
    assert_eq!(dispatcher.armed_count().await, 3);

    // First fire lands within 24h of arming regardless of wall time.
    tokio::time::sleep(Duration::from_secs(25 * 60 * 60)).await;
    assert_eq!(delivery.sent().await.len(), 3);
    assert!(store.list().await.unwrap().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_cancel_all_stops_everything() {
    let store = Arc::new(MemoryScheduleStore::new());
    let delivery = RecordingDelivery::new();
    let dispatcher = Dispatcher::new(store.clone(), delivery.clone(), Zone::ist());

    for text in ["a", "b"] {
        let job = schedule(&store, vec![ContentItem::text(text)], true).await;
        dispatcher.arm_from(&job, base_now()).await.unwrap();
    }
    assert_eq!(dispatcher.armed_count().await, 2);

    dispatcher.cancel_all().await;
    assert_eq!(dispatcher.armed_count().await, 0);

    tokio::time::sleep(Duration::from_secs(24 * 60 * 60)).await;
    assert!(delivery.sent().await.is_empty());
}
