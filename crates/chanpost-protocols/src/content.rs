//! Content items - the closed set of payload kinds a job can deliver.

use serde::{Deserialize, Serialize};

/// One unit of payload to deliver to a channel.
///
/// The set of kinds is closed and known at design time; the serde tag
/// matches the persisted `kind` field. Media kinds are all "transport file
/// id plus optional caption"; only the tag differs on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ContentItem {
    /// Plain text message.
    Text { text: String },
    /// Photo by transport file id.
    Photo {
        file_id: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        caption: Option<String>,
    },
    /// Video by transport file id.
    Video {
        file_id: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        caption: Option<String>,
    },
    /// Animation (GIF) by transport file id.
    Animation {
        file_id: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        caption: Option<String>,
    },
    /// Document by transport file id.
    Document {
        file_id: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        caption: Option<String>,
    },
    /// Sticker by transport file id. Stickers carry no caption.
    Sticker { file_id: String },
    /// Poll with question, options, and flags.
    Poll {
        question: String,
        options: Vec<String>,
        #[serde(default)]
        is_anonymous: bool,
        #[serde(default)]
        allows_multiple_answers: bool,
    },
}

impl ContentItem {
    /// Plain text item.
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text { text: text.into() }
    }

    /// Photo item with an optional caption.
    pub fn photo(file_id: impl Into<String>, caption: Option<String>) -> Self {
        Self::Photo {
            file_id: file_id.into(),
            caption,
        }
    }

    /// The kind tag, for list output and logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Text { .. } => "text",
            Self::Photo { .. } => "photo",
            Self::Video { .. } => "video",
            Self::Animation { .. } => "animation",
            Self::Document { .. } => "document",
            Self::Sticker { .. } => "sticker",
            Self::Poll { .. } => "poll",
        }
    }
}
