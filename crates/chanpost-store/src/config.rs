//! Process-wide configuration - the default target channel.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tokio::fs;
use tokio::sync::RwLock;
use tracing::{debug, warn};

use crate::error::StoreError;

/// Persisted shape: a single `{ "channel": ... }` record.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct ConfigRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    channel: Option<String>,
}

/// Holder for the default target channel.
///
/// Loaded once at startup and written through on every set; never re-read
/// from disk mid-run. The command surface reads it to skip channel
/// prompting when a default is already configured.
pub struct ConfigStore {
    path: PathBuf,
    inner: RwLock<ConfigRecord>,
}

impl ConfigStore {
    /// Open the config store, reading any persisted record.
    ///
    /// Missing or corrupt data degrades to an unset channel.
    pub async fn load(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }

        let record = match fs::read_to_string(&path).await {
            Ok(content) => match serde_json::from_str::<ConfigRecord>(&content) {
                Ok(record) => record,
                Err(e) => {
                    warn!("Corrupt config file {:?}, starting unset: {}", path, e);
                    ConfigRecord::default()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => ConfigRecord::default(),
            Err(e) => {
                warn!("Failed to read config file {:?}, starting unset: {}", path, e);
                ConfigRecord::default()
            }
        };

        Ok(Self {
            path,
            inner: RwLock::new(record),
        })
    }

    /// The configured default channel, if any.
    pub async fn channel(&self) -> Option<String> {
        self.inner.read().await.channel.clone()
    }

    /// Set the default channel; persists immediately, best-effort.
    pub async fn set_channel(&self, channel: impl Into<String>) {
        let mut inner = self.inner.write().await;
        inner.channel = Some(channel.into());

        match serde_json::to_string_pretty(&*inner) {
            Ok(content) => {
                if let Err(e) = fs::write(&self.path, content).await {
                    warn!("Failed to write config file {:?}: {}", self.path, e);
                }
            }
            Err(e) => warn!("Failed to encode config: {}", e),
        }
        debug!("Default channel updated");
    }
}
