use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::NotificationId;

/// A single local notification: content, delivery time, identity and badge
///
/// Records are created by a [`NotificationPlatform`](super::NotificationPlatform) so that
/// platform defaults (such as the Android default channel) are filled in.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NotificationRecord {
    /// Assigned by the platform on schedule when absent
    pub id: Option<NotificationId>,
    pub title: String,
    pub body: String,
    pub subtitle: String,
    /// Platform channel (Android) or thread/category (iOS) identifier
    pub group: String,
    /// Arbitrary payload handed back when the notification is opened
    pub data: String,
    pub badge_number: Option<i32>,
    /// Local wall-clock delivery time
    pub delivery_time: Option<NaiveDateTime>,
    /// True once handed to the platform service
    pub scheduled: bool,
}

impl NotificationRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_id(mut self, id: impl Into<NotificationId>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = body.into();
        self
    }

    pub fn with_subtitle(mut self, subtitle: impl Into<String>) -> Self {
        self.subtitle = subtitle.into();
        self
    }

    pub fn with_group(mut self, group: impl Into<String>) -> Self {
        self.group = group.into();
        self
    }

    pub fn with_data(mut self, data: impl Into<String>) -> Self {
        self.data = data.into();
        self
    }

    pub fn with_badge_number(mut self, badge_number: i32) -> Self {
        self.badge_number = Some(badge_number);
        self
    }

    pub fn with_delivery_time(mut self, delivery_time: NaiveDateTime) -> Self {
        self.delivery_time = Some(delivery_time);
        self
    }

    /// Whether the delivery time lies strictly after `now`
    pub fn is_due_after(&self, now: NaiveDateTime) -> bool {
        self.delivery_time.is_some_and(|time| time > now)
    }
}
