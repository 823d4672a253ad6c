// Cross-platform notification channel description
// Maps onto Android notification channels; iOS has no equivalent and ignores it

use serde::{Deserialize, Serialize};

/// Display style for a channel, matching Android importance levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[derive(Default)]
pub enum NotificationStyle {
    /// Not shown in the status bar
    None = 0,
    /// Shown without sound
    NoSound = 2,
    /// Plays sound
    Default = 3,
    /// Also shows a heads-up popup
    #[default]
    Popup = 4,
}

impl NotificationStyle {
    pub fn importance(&self) -> i32 {
        *self as i32
    }
}

/// Lock screen visibility
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[derive(Default)]
pub enum PrivacyMode {
    /// Hidden on secure lock screens
    Secret = -1,
    /// Icon only on secure lock screens
    Private = 0,
    /// Shown on all lock screens
    #[default]
    Public = 1,
}

impl PrivacyMode {
    pub fn visibility(&self) -> i32 {
        *self as i32
    }
}

/// Channel configuration handed to the platform at initialization
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelDescriptor {
    pub id: String,
    pub name: String,
    pub description: String,
    #[serde(default = "default_true")]
    pub shows_badge: bool,
    #[serde(default)]
    pub show_lights: bool,
    #[serde(default = "default_true")]
    pub vibrates: bool,
    #[serde(default)]
    pub high_priority: bool,
    #[serde(default)]
    pub style: NotificationStyle,
    #[serde(default)]
    pub privacy: PrivacyMode,
    /// Custom vibration pattern in milliseconds, platform default when absent
    #[serde(default)]
    pub vibration_pattern: Option<Vec<i32>>,
}

fn default_true() -> bool {
    true
}

impl ChannelDescriptor {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: description.into(),
            shows_badge: true,
            show_lights: false,
            vibrates: true,
            high_priority: false,
            style: NotificationStyle::Popup,
            privacy: PrivacyMode::Public,
            vibration_pattern: None,
        }
    }

    pub fn with_style(mut self, style: NotificationStyle) -> Self {
        self.style = style;
        self
    }

    pub fn with_privacy(mut self, privacy: PrivacyMode) -> Self {
        self.privacy = privacy;
        self
    }

    pub fn with_badge(mut self, shows_badge: bool) -> Self {
        self.shows_badge = shows_badge;
        self
    }

    pub fn with_lights(mut self, show_lights: bool) -> Self {
        self.show_lights = show_lights;
        self
    }

    pub fn with_vibration(mut self, vibrates: bool) -> Self {
        self.vibrates = vibrates;
        self
    }

    pub fn with_high_priority(mut self, high_priority: bool) -> Self {
        self.high_priority = high_priority;
        self
    }

    pub fn with_vibration_pattern(mut self, pattern: impl IntoIterator<Item = i64>) -> Self {
        self.vibration_pattern = Some(
            pattern
                .into_iter()
                .map(|millis| millis.clamp(0, i32::MAX as i64) as i32)
                .collect(),
        );
        self
    }
}
