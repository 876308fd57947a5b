//! Delivery contract - how a fired job's content reaches the channel.

use async_trait::async_trait;
use thiserror::Error;

use crate::content::ContentItem;

/// Transport failure sending one content item.
///
/// The dispatcher logs these and moves on to the next item; a failed send
/// never aborts the rest of the job or the process.
#[derive(Debug, Error)]
pub enum DeliveryError {
    /// The transport rejected the item.
    #[error("transport rejected {kind} for {channel}: {reason}")]
    Rejected {
        channel: String,
        kind: &'static str,
        reason: String,
    },

    /// The send did not complete within the adapter's own deadline.
    #[error("send to {channel} timed out after {seconds}s")]
    Timeout { channel: String, seconds: u64 },

    /// Connection-level failure.
    #[error("transport unavailable: {0}")]
    Unavailable(String),
}

/// Acknowledgement for one delivered item.
#[derive(Debug, Clone, Default)]
pub struct DeliveryAck {
    /// Transport-assigned message id, when the transport reports one.
    pub message_id: Option<String>,
}

/// Adapter over the actual message transport.
///
/// Implementations send exactly one item per call and own their per-call
/// timeout; the dispatcher never bounds or retries a send.
#[async_trait]
pub trait DeliveryAdapter: Send + Sync {
    /// Send one content item to the channel.
    async fn send(&self, channel: &str, item: &ContentItem)
        -> Result<DeliveryAck, DeliveryError>;
}
