// Platform notification service contract
// One implementation per build target, selected when the manager is constructed

use std::future::Future;
use std::pin::Pin;
use std::time::SystemTime;

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc::UnboundedReceiver;

use super::{ChannelDescriptor, NotificationId, NotificationRecord, NotificationResult};

/// Supported notification platforms
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[derive(Default)]
pub enum Platform {
    /// Android with notification channels
    Android,
    /// iOS with UserNotifications and an application badge
    IOs,
    /// No OS notification center (editor, desktop and tests)
    #[default]
    Headless,
}

impl Platform {
    pub fn name(&self) -> &'static str {
        match self {
            Platform::Android => "Android",
            Platform::IOs => "iOS",
            Platform::Headless => "Headless",
        }
    }

    pub fn is_mobile(&self) -> bool {
        matches!(self, Platform::Android | Platform::IOs)
    }

    /// Whether notifications must be routed through a registered channel
    pub fn uses_channels(&self) -> bool {
        matches!(self, Platform::Android)
    }

    /// Whether the OS keeps an application badge that is cleared when foregrounding
    pub fn clears_badge_on_foreground(&self) -> bool {
        matches!(self, Platform::IOs)
    }

    /// Platform for the current build target
    pub fn current() -> Self {
        if cfg!(target_os = "android") {
            Platform::Android
        } else if cfg!(target_os = "ios") {
            Platform::IOs
        } else {
            Platform::Headless
        }
    }
}

/// Result of the one-shot notification permission request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[derive(Default)]
pub enum AuthorizationState {
    /// Not yet requested
    #[default]
    NotRequested,
    /// User granted permission
    Authorized { granted_at: SystemTime },
    /// User denied permission
    Denied {
        denied_at: SystemTime,
        can_retry: bool,
    },
    /// Provisional authorization (iOS quiet delivery)
    Provisional { granted_at: SystemTime },
}

impl AuthorizationState {
    pub fn is_authorized(&self) -> bool {
        matches!(
            self,
            AuthorizationState::Authorized { .. } | AuthorizationState::Provisional { .. }
        )
    }

    pub fn can_request(&self) -> bool {
        match self {
            AuthorizationState::NotRequested => true,
            AuthorizationState::Denied { can_retry, .. } => *can_retry,
            _ => false,
        }
    }
}

/// Boxed future returned by [`NotificationPlatform::request_notification_permission`]
pub type PermissionFuture<'a> =
    Pin<Box<dyn Future<Output = NotificationResult<AuthorizationState>> + Send + 'a>>;

/// Capability set of an OS notification service as consumed by the queue manager
pub trait NotificationPlatform: Send {
    fn platform(&self) -> Platform;

    /// Create a record with platform defaults filled in
    fn create_notification(&self) -> NotificationRecord;

    /// Hand a notification to the OS, assigning an id when it has none
    fn schedule_notification(&mut self, notification: &mut NotificationRecord)
    -> NotificationResult<()>;

    /// Cancel a scheduled notification; unknown ids are ignored
    fn cancel_notification(&mut self, id: NotificationId);

    /// Remove a displayed notification; unknown ids are ignored
    fn dismiss_notification(&mut self, id: NotificationId);

    fn cancel_all_scheduled_notifications(&mut self);

    fn dismiss_all_displayed_notifications(&mut self);

    /// The notification the user last opened the application from
    fn get_last_notification(&self) -> Option<NotificationRecord>;

    fn on_foreground(&mut self);

    fn on_background(&mut self);

    /// Stream of notifications delivered by the OS while the application runs
    fn subscribe_received(&mut self) -> UnboundedReceiver<NotificationRecord>;

    /// Register display channels; platforms without channels ignore them
    fn register_channels(&mut self, _channels: &[ChannelDescriptor]) -> NotificationResult<()> {
        Ok(())
    }

    /// Whether the user currently allows notifications, for the whole application or one channel
    ///
    /// Platforms that cannot tell report `true`.
    fn are_notifications_enabled(&self, _channel_id: Option<&str>) -> bool {
        true
    }

    /// Ask the user for permission to post notifications
    fn request_notification_permission(&mut self) -> PermissionFuture<'_>;
}
