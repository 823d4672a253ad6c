// Notification queueing components
// Records, operating modes, channels, persistence and the queue manager that ties them together

use serde::{Deserialize, Serialize};

pub mod channel;
pub mod clock;
pub mod config;
pub mod manager;
pub mod mode;
pub mod pending;
pub mod platform;
pub mod record;
pub mod serializer;

pub use channel::{ChannelDescriptor, NotificationStyle, PrivacyMode};
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::NotificationsConfig;
pub use manager::{MINIMUM_NOTIFICATION_TIME, NotificationEvent, NotificationQueueManager};
pub use mode::OperatingMode;
pub use pending::PendingNotification;
pub use platform::{AuthorizationState, NotificationPlatform, Platform, PermissionFuture};
pub use record::NotificationRecord;
pub use serializer::{
    BinarySerializer, FORMAT_VERSION, PendingNotificationsSerializer, SerializerError,
    read_records, write_records,
};

/// Integer notification identifier as understood by the mobile notification centers
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NotificationId(i32);

impl NotificationId {
    pub const fn new(id: i32) -> Self {
        Self(id)
    }

    pub const fn get(&self) -> i32 {
        self.0
    }
}

impl From<i32> for NotificationId {
    fn from(id: i32) -> Self {
        Self(id)
    }
}

impl From<NotificationId> for i32 {
    fn from(id: NotificationId) -> Self {
        id.0
    }
}

impl std::fmt::Display for NotificationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for NotificationId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.trim().parse()?))
    }
}

/// Error types for the notification manager and its collaborators
#[derive(Debug, thiserror::Error)]
pub enum NotificationError {
    /// Operation is not valid in the current manager or platform state
    #[error("Invalid operation {operation}: {message}")]
    InvalidOperation {
        operation: &'static str,
        message: String,
    },
    /// Platform-specific scheduling or delivery error
    #[error("Platform error on {platform}: {message} (code: {error_code:?})")]
    PlatformError {
        platform: String,
        error_code: Option<i32>,
        message: String,
    },
    /// No notification with this id is known to the platform
    #[error("Notification {id} not found")]
    NotFound { id: NotificationId },
    /// Reading or writing the persisted pending set failed
    #[error("Persistence error: {0}")]
    Persistence(#[from] SerializerError),
    /// Configuration could not be loaded
    #[error("Configuration error: {message}")]
    Config { message: String },
}

impl NotificationError {
    pub(crate) fn not_initialized(operation: &'static str) -> Self {
        NotificationError::InvalidOperation {
            operation,
            message: "the notification manager has not been initialized".to_string(),
        }
    }

    /// Check if this error is a programming error rather than an environmental failure
    pub fn is_invalid_operation(&self) -> bool {
        matches!(self, NotificationError::InvalidOperation { .. })
    }
}

/// Type alias for notification results
pub type NotificationResult<T> = Result<T, NotificationError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn notification_id_parses_and_displays() {
        let id: NotificationId = " 42 ".parse().unwrap();
        assert_eq!(id, NotificationId::new(42));
        assert_eq!(id.to_string(), "42");
        assert_eq!(i32::from(id), 42);
    }

    #[test]
    fn invalid_operation_is_flagged() {
        let err = NotificationError::not_initialized("schedule_notification");
        assert!(err.is_invalid_operation());
        assert!(err.to_string().contains("schedule_notification"));

        let err = NotificationError::NotFound { id: 3.into() };
        assert!(!err.is_invalid_operation());
    }
}
