//! Schedule store - the durable registry of pending send-jobs.

use std::path::PathBuf;

use async_trait::async_trait;
use tokio::fs;
use tokio::sync::RwLock;
use tracing::{debug, warn};

use chanpost_protocols::{Job, JobId, NewJob};

use crate::error::StoreError;

/// Durable mapping from job identity to job record.
///
/// The store owns all job records exclusively. The dispatcher holds only
/// job ids and looks the record up again when a timer fires, so a removed
/// job's elapse becomes a no-op.
#[async_trait]
pub trait ScheduleStore: Send + Sync {
    /// Append a fully-populated job, assign the next identity, persist,
    /// and return the identity for confirmation messaging.
    async fn add(&self, job: NewJob) -> Result<JobId, StoreError>;

    /// Look up a job by identity.
    async fn get(&self, id: JobId) -> Result<Option<Job>, StoreError>;

    /// Remove by identity, persist, and return the removed record for
    /// user feedback.
    async fn remove(&self, id: JobId) -> Result<Job, StoreError>;

    /// All jobs in insertion order (display order, not execution order).
    async fn list(&self) -> Result<Vec<Job>, StoreError>;

    /// Empty the collection and persist.
    async fn clear(&self) -> Result<(), StoreError>;
}

/// In-memory collection shared by both store implementations.
struct Jobs {
    jobs: Vec<Job>,
    next_id: u64,
}

impl Jobs {
    fn from_records(jobs: Vec<Job>) -> Self {
        let next_id = jobs.iter().map(|j| j.id.0).max().unwrap_or(0) + 1;
        Self { jobs, next_id }
    }

    fn insert(&mut self, new: NewJob) -> JobId {
        let id = JobId(self.next_id);
        self.next_id += 1;
        self.jobs.push(new.into_job(id));
        id
    }

    fn take(&mut self, id: JobId) -> Result<Job, StoreError> {
        let index = self
            .jobs
            .iter()
            .position(|j| j.id == id)
            .ok_or(StoreError::NotFound(id))?;
        Ok(self.jobs.remove(index))
    }
}

/// In-memory schedule store. Same contract as the file store, no disk;
/// used by dispatcher tests and embedders that manage persistence
/// themselves.
pub struct MemoryScheduleStore {
    inner: RwLock<Jobs>,
}

impl MemoryScheduleStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Jobs::from_records(Vec::new())),
        }
    }
}

impl Default for MemoryScheduleStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ScheduleStore for MemoryScheduleStore {
    async fn add(&self, job: NewJob) -> Result<JobId, StoreError> {
        Ok(self.inner.write().await.insert(job))
    }

    async fn get(&self, id: JobId) -> Result<Option<Job>, StoreError> {
        Ok(self.inner.read().await.jobs.iter().find(|j| j.id == id).cloned())
    }

    async fn remove(&self, id: JobId) -> Result<Job, StoreError> {
        self.inner.write().await.take(id)
    }

    async fn list(&self) -> Result<Vec<Job>, StoreError> {
        Ok(self.inner.read().await.jobs.clone())
    }

    async fn clear(&self) -> Result<(), StoreError> {
        self.inner.write().await.jobs.clear();
        Ok(())
    }
}

/// File-backed schedule store.
///
/// The whole collection lives in one JSON file, rewritten in full on every
/// mutation. At tens of jobs that is cheap, and a successful write always
/// reflects the complete current state.
pub struct FileScheduleStore {
    path: PathBuf,
    inner: RwLock<Jobs>,
}

impl FileScheduleStore {
    /// Open the store, reading any persisted collection.
    ///
    /// Fails soft: a missing or corrupt file starts the store empty rather
    /// than aborting.
    pub async fn load(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }

        let jobs = match fs::read_to_string(&path).await {
            Ok(content) => match serde_json::from_str::<Vec<Job>>(&content) {
                Ok(jobs) => jobs,
                Err(e) => {
                    warn!("Corrupt schedule file {:?}, starting empty: {}", path, e);
                    Vec::new()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Vec::new(),
            Err(e) => {
                warn!("Failed to read schedule file {:?}, starting empty: {}", path, e);
                Vec::new()
            }
        };

        debug!("Loaded {} scheduled job(s) from {:?}", jobs.len(), path);

        Ok(Self {
            path,
            inner: RwLock::new(Jobs::from_records(jobs)),
        })
    }

    /// Rewrite the full collection.
    ///
    /// Best-effort: a failed write is logged and the in-memory state stays
    /// authoritative until the next successful write.
    async fn persist(&self, jobs: &[Job]) {
        match serde_json::to_string_pretty(jobs) {
            Ok(content) => {
                if let Err(e) = fs::write(&self.path, content).await {
                    warn!("Failed to write schedule file {:?}: {}", self.path, e);
                }
            }
            Err(e) => warn!("Failed to encode schedule: {}", e),
        }
    }
}

#[async_trait]
impl ScheduleStore for FileScheduleStore {
    async fn add(&self, job: NewJob) -> Result<JobId, StoreError> {
        let mut inner = self.inner.write().await;
        let id = inner.insert(job);
        self.persist(&inner.jobs).await;
        debug!("Scheduled job {} persisted", id);
        Ok(id)
    }

    async fn get(&self, id: JobId) -> Result<Option<Job>, StoreError> {
        Ok(self.inner.read().await.jobs.iter().find(|j| j.id == id).cloned())
    }

    async fn remove(&self, id: JobId) -> Result<Job, StoreError> {
        let mut inner = self.inner.write().await;
        let job = inner.take(id)?;
        self.persist(&inner.jobs).await;
        debug!("Removed job {} from schedule", id);
        Ok(job)
    }

    async fn list(&self) -> Result<Vec<Job>, StoreError> {
        Ok(self.inner.read().await.jobs.clone())
    }

    async fn clear(&self) -> Result<(), StoreError> {
        let mut inner = self.inner.write().await;
        inner.jobs.clear();
        self.persist(&inner.jobs).await;
        debug!("Schedule cleared");
        Ok(())
    }
}
