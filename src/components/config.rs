use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::{NotificationError, NotificationResult, OperatingMode, Platform};

/// Queue manager configuration
///
/// Loadable from JSON; every field is optional and falls back to its default:
///
/// ```json
/// { "mode": "QUEUE | CLEAR_ON_FOREGROUNDING", "auto_badging": false,
///   "persistence_path": "save/notifications.bin", "platform": "Android" }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NotificationsConfig {
    pub mode: OperatingMode,
    /// Number badges automatically when none are set explicitly
    pub auto_badging: bool,
    /// File the default serializer saves pending notifications to
    pub persistence_path: PathBuf,
    pub platform: Platform,
}

impl Default for NotificationsConfig {
    fn default() -> Self {
        Self {
            mode: OperatingMode::default(),
            auto_badging: true,
            persistence_path: PathBuf::from("notifications.bin"),
            platform: Platform::current(),
        }
    }
}

impl NotificationsConfig {
    pub fn from_json_str(json: &str) -> NotificationResult<Self> {
        serde_json::from_str(json).map_err(|e| NotificationError::Config {
            message: e.to_string(),
        })
    }

    pub fn from_path(path: impl AsRef<Path>) -> NotificationResult<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| NotificationError::Config {
            message: format!("failed to read {}: {}", path.display(), e),
        })?;
        Self::from_json_str(&json)
    }

    pub fn with_mode(mut self, mode: OperatingMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_auto_badging(mut self, auto_badging: bool) -> Self {
        self.auto_badging = auto_badging;
        self
    }

    pub fn with_persistence_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.persistence_path = path.into();
        self
    }

    pub fn with_platform(mut self, platform: Platform) -> Self {
        self.platform = platform;
        self
    }
}
