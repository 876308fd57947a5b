//! Adapter types and utility functions for chanpost.

use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use tracing::info;

use chanpost_protocols::{ContentItem, DeliveryAck, DeliveryAdapter, DeliveryError};

/// Get the .chanpost state directory path.
pub(crate) fn chanpost_dir() -> PathBuf {
    dirs::home_dir()
        .map(|h| h.join(".chanpost"))
        .unwrap_or_else(|| PathBuf::from(".chanpost"))
}

/// Delivery adapter that logs each send instead of talking to a platform.
///
/// Stands in wherever a real transport is not wired up; the dispatcher
/// only sees the `DeliveryAdapter` contract, so swapping in a platform
/// client is a construction-time change.
pub(crate) struct LogDelivery {
    sequence: AtomicU64,
}

impl LogDelivery {
    pub fn new() -> Self {
        Self {
            sequence: AtomicU64::new(1),
        }
    }
}

#[async_trait]
impl DeliveryAdapter for LogDelivery {
    async fn send(
        &self,
        channel: &str,
        item: &ContentItem,
    ) -> Result<DeliveryAck, DeliveryError> {
        let seq = self.sequence.fetch_add(1, Ordering::Relaxed);
        match item {
            ContentItem::Text { text } => {
                info!("[{}] {} text: {}", seq, channel, text);
            }
            ContentItem::Poll { question, options, .. } => {
                info!(
                    "[{}] {} poll: {} ({} option(s))",
                    seq,
                    channel,
                    question,
                    options.len()
                );
            }
            other => {
                info!("[{}] {} {}", seq, channel, other.kind());
            }
        }
        Ok(DeliveryAck {
            message_id: Some(seq.to_string()),
        })
    }
}
