//! Sync configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Settings that shape normalization and notification handling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Base URL for part downloads, used for injected inline images.
    pub download_url_base: String,
    /// Whether a sequence gap marks the sync report as needing a full refetch.
    pub resync_on_gap: bool,
    /// Id of the mailbox root folder.
    pub folder_root_id: String,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            download_url_base: mailstate_mime::DEFAULT_DOWNLOAD_URL_BASE.to_string(),
            resync_on_gap: true,
            folder_root_id: "1".to_string(),
        }
    }
}

impl SyncConfig {
    /// Loads settings from a JSON file. A missing file yields the defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed, or
    /// if it names an empty root folder id.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!("No settings at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        let raw = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Writes settings as pretty-printed JSON, creating parent directories.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, serde_json::to_string_pretty(self)?)?;
        tracing::info!("Settings saved to {}", path.display());
        Ok(())
    }

    fn validate(&self) -> Result<()> {
        if self.folder_root_id.trim().is_empty() {
            return Err(Error::Config("folder_root_id must not be empty".into()));
        }
        Ok(())
    }
}
