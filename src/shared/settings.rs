use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs;

use crate::shared::errors::{EngineError, EngineResult};

/// History size used when the configured value is missing or not positive
pub const DEFAULT_MAX_HISTORY_ITEMS: usize = 50;

/// User-facing engine settings, persisted as JSON in the platform config dir
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EngineSettings {
    #[serde(default = "default_max_history_items")]
    pub max_history_items: i64,
}

fn default_max_history_items() -> i64 {
    DEFAULT_MAX_HISTORY_ITEMS as i64
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            max_history_items: default_max_history_items(),
        }
    }
}

/// Apply the history limit rule: non-positive values fall back to the default
pub fn effective_history_limit(max_history_items: i64) -> usize {
    if max_history_items > 0 {
        usize::try_from(max_history_items).unwrap_or(usize::MAX)
    } else {
        DEFAULT_MAX_HISTORY_ITEMS
    }
}

impl EngineSettings {
    pub fn effective_history_limit(&self) -> usize {
        effective_history_limit(self.max_history_items)
    }

    pub fn get_settings_path() -> EngineResult<PathBuf> {
        ProjectDirs::from("com", "cliptrail", "cliptrail")
            .map(|dirs| dirs.config_dir().join("settings.json"))
            .ok_or_else(|| EngineError::Config("Failed to determine config directory".to_string()))
    }

    pub async fn load() -> EngineResult<Self> {
        let path = Self::get_settings_path()?;
        Self::load_from(&path).await
    }

    /// Load settings from `path`, writing defaults out if the file does not exist
    pub async fn load_from(path: &Path) -> EngineResult<Self> {
        if !path.exists() {
            let settings = Self::default();
            settings.save_to(path).await?;
            return Ok(settings);
        }

        let content = fs::read_to_string(path).await?;
        Ok(serde_json::from_str(&content)?)
    }

    pub async fn save_to(&self, path: &Path) -> EngineResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }

        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content).await?;
        Ok(())
    }
}
