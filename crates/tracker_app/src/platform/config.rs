use std::fs;
use std::io::ErrorKind;
use std::path::Path;
use std::time::Duration;

use anyhow::Context;
use serde::{Deserialize, Serialize};
use tracker_core::{CollectionRefreshPolicy, PollSettings};
use tracker_engine::ClientSettings;

use super::logging::LogDestination;

pub(crate) const DEFAULT_CONFIG_FILE: &str = "tracker.ron";

/// Settings read from the RON config file. Every field is optional.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct AppConfig {
    pub base_url: String,
    pub auth_token: Option<String>,
    pub connect_timeout_secs: u64,
    pub request_timeout_secs: u64,
    pub poll_interval_ms: u64,
    pub poll_jitter_ms: u64,
    pub collection_interval_ms: u64,
    pub auto_refresh: bool,
    pub log_level: String,
    pub log_destination: LogDestination,
}

impl Default for AppConfig {
    fn default() -> Self {
        let client = ClientSettings::default();
        let poll = PollSettings::default();
        let collection = CollectionRefreshPolicy::default();
        Self {
            base_url: client.base_url,
            auth_token: client.auth_token,
            connect_timeout_secs: client.connect_timeout.as_secs(),
            request_timeout_secs: client.request_timeout.as_secs(),
            poll_interval_ms: millis(poll.interval),
            poll_jitter_ms: millis(poll.jitter),
            collection_interval_ms: millis(collection.interval),
            auto_refresh: collection.auto_refresh,
            log_level: "info".to_string(),
            log_destination: LogDestination::default(),
        }
    }
}

impl AppConfig {
    pub fn client_settings(&self) -> ClientSettings {
        ClientSettings {
            base_url: self.base_url.clone(),
            auth_token: self.auth_token.clone(),
            connect_timeout: Duration::from_secs(self.connect_timeout_secs),
            request_timeout: Duration::from_secs(self.request_timeout_secs),
        }
    }

    pub fn poll_settings(&self) -> PollSettings {
        PollSettings {
            interval: Duration::from_millis(self.poll_interval_ms),
            jitter: Duration::from_millis(self.poll_jitter_ms),
        }
    }

    /// Zero intervals would refetch without pause.
    fn validate(&self) -> anyhow::Result<()> {
        anyhow::ensure!(self.poll_interval_ms > 0, "poll_interval_ms must be positive");
        anyhow::ensure!(
            self.collection_interval_ms > 0,
            "collection_interval_ms must be positive"
        );
        Ok(())
    }

    pub fn refresh_policy(&self) -> CollectionRefreshPolicy {
        CollectionRefreshPolicy {
            interval: Duration::from_millis(self.collection_interval_ms),
            auto_refresh: self.auto_refresh,
        }
    }
}

/// Reads `path`. A missing file yields the defaults; a malformed one is an error.
pub(crate) fn load(path: &Path) -> anyhow::Result<AppConfig> {
    let content = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(err) if err.kind() == ErrorKind::NotFound => return Ok(AppConfig::default()),
        Err(err) => {
            return Err(err).with_context(|| format!("failed to read config from {path:?}"));
        }
    };
    let config: AppConfig =
        ron::from_str(&content).with_context(|| format!("failed to parse config from {path:?}"))?;
    config
        .validate()
        .with_context(|| format!("invalid config in {path:?}"))?;
    Ok(config)
}

fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}
