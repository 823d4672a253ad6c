use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::{NotificationId, NotificationRecord};

/// A notification accepted by the queue manager but not yet known to be delivered
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingNotification {
    pub notification: NotificationRecord,
    /// Re-arm this notification after the OS queue is cleared on foregrounding
    pub reschedule: bool,
}

impl PendingNotification {
    pub fn new(notification: NotificationRecord) -> Self {
        Self {
            notification,
            reschedule: false,
        }
    }

    pub fn id(&self) -> Option<NotificationId> {
        self.notification.id
    }

    pub fn delivery_time(&self) -> Option<NaiveDateTime> {
        self.notification.delivery_time
    }

    pub fn is_scheduled(&self) -> bool {
        self.notification.scheduled
    }

    /// Eligible for persistence when the OS queue is cleared on foregrounding
    pub(crate) fn survives_clearing(&self) -> bool {
        self.reschedule && self.notification.scheduled && self.notification.delivery_time.is_some()
    }
}

impl From<NotificationRecord> for PendingNotification {
    fn from(notification: NotificationRecord) -> Self {
        Self::new(notification)
    }
}
