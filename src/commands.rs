//! Command surface - the operations behind each CLI subcommand.

use std::sync::Arc;

use thiserror::Error;
use tracing::info;

use chanpost_dispatch::Dispatcher;
use chanpost_protocols::{ContentItem, Job, JobId, NewJob, ScheduleError, TimeOfDay};
use chanpost_store::{ConfigStore, ScheduleStore, StoreError};

/// Command surface errors, formatted for the operator.
#[derive(Debug, Error)]
pub(crate) enum CommandError {
    #[error(transparent)]
    Schedule(#[from] ScheduleError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Dispatch(#[from] chanpost_dispatch::DispatchError),

    #[error("a poll needs at least 2 options, got {0}")]
    PollTooFewOptions(usize),
}

/// A validated add request: one job per requested time.
pub(crate) struct AddRequest {
    pub channel: Option<String>,
    pub content: Vec<ContentItem>,
    pub times: Vec<TimeOfDay>,
    pub daily: bool,
}

/// Ties the stores and the (optional) live dispatcher behind the CLI
/// verbs. Without a dispatcher, mutations touch only persistent state;
/// the scheduler process picks them up at its next start.
pub(crate) struct CommandSurface {
    store: Arc<dyn ScheduleStore>,
    config: Arc<ConfigStore>,
    dispatcher: Option<Arc<Dispatcher>>,
}

impl CommandSurface {
    pub fn new(
        store: Arc<dyn ScheduleStore>,
        config: Arc<ConfigStore>,
        dispatcher: Option<Arc<Dispatcher>>,
    ) -> Self {
        Self {
            store,
            config,
            dispatcher,
        }
    }

    /// Set the default target channel.
    pub async fn set_channel(&self, channel: &str) {
        self.config.set_channel(channel).await;
        info!("Default channel set to {}", channel);
    }

    /// Schedule the request's content at each requested time.
    ///
    /// The channel falls back to the configured default; with neither,
    /// the request is rejected rather than stored half-formed.
    pub async fn add(&self, request: AddRequest) -> Result<Vec<Job>, CommandError> {
        let channel = match request.channel {
            Some(channel) => channel,
            None => self
                .config
                .channel()
                .await
                .ok_or(ScheduleError::NoChannel)?,
        };

        let mut jobs = Vec::with_capacity(request.times.len());
        for time in request.times {
            let new_job = NewJob::new(
                channel.clone(),
                request.content.clone(),
                time,
                chanpost_protocols::Recurrence::from_daily_flag(request.daily),
            )?;
            let id = self.store.add(new_job).await?;
            // The stored record is definitive, not our submission.
            if let Some(job) = self.store.get(id).await? {
                if let Some(dispatcher) = &self.dispatcher {
                    dispatcher.arm(&job).await?;
                }
                jobs.push(job);
            }
        }
        Ok(jobs)
    }

    /// All pending jobs in insertion order.
    pub async fn list(&self) -> Result<Vec<Job>, CommandError> {
        Ok(self.store.list().await?)
    }

    /// Cancel one job: disarm its timer (if live) and remove the record.
    pub async fn cancel(&self, id: JobId) -> Result<Job, CommandError> {
        if let Some(dispatcher) = &self.dispatcher {
            dispatcher.cancel(id).await;
        }
        Ok(self.store.remove(id).await?)
    }

    /// Cancel every pending job; returns how many were dropped.
    pub async fn cancel_all(&self) -> Result<usize, CommandError> {
        if let Some(dispatcher) = &self.dispatcher {
            dispatcher.cancel_all().await;
        }
        let count = self.store.list().await?.len();
        self.store.clear().await?;
        info!("Cancelled {} job(s)", count);
        Ok(count)
    }
}

/// Assemble the content sequence from the add flags, in a stable order:
/// texts, then photos, then the poll.
pub(crate) fn build_content(
    texts: Vec<String>,
    photos: Vec<String>,
    caption: Option<String>,
    poll: Option<String>,
    options: Vec<String>,
    public_votes: bool,
    multiple_answers: bool,
) -> Result<Vec<ContentItem>, CommandError> {
    let mut content = Vec::new();
    for text in texts {
        content.push(ContentItem::text(text));
    }
    for file_id in photos {
        content.push(ContentItem::photo(file_id, caption.clone()));
    }
    if let Some(question) = poll {
        if options.len() < 2 {
            return Err(CommandError::PollTooFewOptions(options.len()));
        }
        content.push(ContentItem::Poll {
            question,
            options,
            is_anonymous: !public_votes,
            allows_multiple_answers: multiple_answers,
        });
    }
    if content.is_empty() {
        return Err(ScheduleError::EmptyContent.into());
    }
    Ok(content)
}
