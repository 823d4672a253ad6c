// Simulated OS notification center
// Behaves like the Android/iOS notification centers closely enough to drive the queue manager
// without a device: ids, channels, app badge, delivery and the received event stream

use std::sync::Arc;
use std::time::SystemTime;

use chrono::NaiveDateTime;
use parking_lot::Mutex;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use crate::components::platform::PermissionFuture;
use crate::components::{
    AuthorizationState, ChannelDescriptor, NotificationError, NotificationId, NotificationPlatform,
    NotificationRecord, NotificationResult, Platform,
};

/// Answer the simulated user gives to the permission prompt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PermissionAnswer {
    #[default]
    Grant,
    Provisional,
    Deny,
}

#[derive(Debug, Default)]
struct SimulatedState {
    next_id: i32,
    scheduled: Vec<NotificationRecord>,
    displayed: Vec<NotificationRecord>,
    schedule_log: Vec<NotificationRecord>,
    cancelled: Vec<NotificationId>,
    cancel_all_calls: usize,
    dismiss_all_calls: usize,
    channels: Vec<ChannelDescriptor>,
    default_channel: Option<String>,
    app_badge: i32,
    last_responded: Option<NotificationRecord>,
    receivers: Vec<UnboundedSender<NotificationRecord>>,
    permission: PermissionAnswer,
    permission_requests: usize,
    permission_denied: bool,
    notifications_enabled: bool,
    disabled_channels: Vec<String>,
    foreground: bool,
    fail_scheduling: bool,
}

/// Cloneable handle to a simulated notification center
///
/// Clones share state, so a host can keep one handle while the manager owns another.
#[derive(Debug, Clone)]
pub struct SimulatedPlatform {
    platform: Platform,
    state: Arc<Mutex<SimulatedState>>,
}

impl Default for SimulatedPlatform {
    fn default() -> Self {
        Self::new(Platform::Headless)
    }
}

impl SimulatedPlatform {
    pub fn new(platform: Platform) -> Self {
        Self {
            platform,
            state: Arc::new(Mutex::new(SimulatedState {
                next_id: 1,
                foreground: true,
                notifications_enabled: true,
                ..SimulatedState::default()
            })),
        }
    }

    pub fn with_permission(self, answer: PermissionAnswer) -> Self {
        self.state.lock().permission = answer;
        self
    }

    /// Make every following schedule call fail
    pub fn set_fail_scheduling(&self, fail: bool) {
        self.state.lock().fail_scheduling = fail;
    }

    /// Notifications currently waiting for their delivery time
    pub fn scheduled(&self) -> Vec<NotificationRecord> {
        self.state.lock().scheduled.clone()
    }

    /// Notifications currently shown to the user
    pub fn displayed(&self) -> Vec<NotificationRecord> {
        self.state.lock().displayed.clone()
    }

    /// Every record as it was handed to the platform, in call order
    pub fn schedule_log(&self) -> Vec<NotificationRecord> {
        self.state.lock().schedule_log.clone()
    }

    /// Ids passed to cancel calls, including unknown ones
    pub fn cancelled_ids(&self) -> Vec<NotificationId> {
        self.state.lock().cancelled.clone()
    }

    pub fn cancel_all_calls(&self) -> usize {
        self.state.lock().cancel_all_calls
    }

    pub fn dismiss_all_calls(&self) -> usize {
        self.state.lock().dismiss_all_calls
    }

    pub fn channels(&self) -> Vec<ChannelDescriptor> {
        self.state.lock().channels.clone()
    }

    pub fn default_channel(&self) -> Option<String> {
        self.state.lock().default_channel.clone()
    }

    pub fn app_badge(&self) -> i32 {
        self.state.lock().app_badge
    }

    pub fn set_app_badge(&self, badge: i32) {
        self.state.lock().app_badge = badge;
    }

    /// Simulate the user switching notifications off or on in the system settings
    pub fn set_notifications_enabled(&self, enabled: bool) {
        self.state.lock().notifications_enabled = enabled;
    }

    /// Simulate the user muting or unmuting one channel
    pub fn set_channel_enabled(&self, channel_id: impl Into<String>, enabled: bool) {
        let channel_id = channel_id.into();
        let mut state = self.state.lock();
        state.disabled_channels.retain(|id| *id != channel_id);
        if !enabled {
            state.disabled_channels.push(channel_id);
        }
    }

    pub fn permission_requests(&self) -> usize {
        self.state.lock().permission_requests
    }

    pub fn is_foreground(&self) -> bool {
        self.state.lock().foreground
    }

    /// Deliver every scheduled notification due at `now`, returning how many were shown
    pub fn deliver_due(&self, now: NaiveDateTime) -> usize {
        let mut state = self.state.lock();

        let (due, waiting): (Vec<_>, Vec<_>) = std::mem::take(&mut state.scheduled)
            .into_iter()
            .partition(|record| record.delivery_time.is_none_or(|time| time <= now));
        state.scheduled = waiting;

        for record in &due {
            if let Some(badge) = record.badge_number {
                state.app_badge = badge;
            }
            state.receivers.retain(|sender| sender.send(record.clone()).is_ok());
            tracing::debug!(
                platform = self.platform.name(),
                id = ?record.id,
                title = %record.title,
                "Simulated notification displayed"
            );
        }

        let delivered = due.len();
        state.displayed.extend(due);
        delivered
    }

    /// Simulate the user opening the application from a displayed notification
    pub fn respond(&self, id: NotificationId) -> NotificationResult<()> {
        let mut state = self.state.lock();
        let index = state
            .displayed
            .iter()
            .position(|record| record.id == Some(id))
            .ok_or(NotificationError::NotFound { id })?;
        let record = state.displayed.remove(index);
        state.last_responded = Some(record);
        Ok(())
    }

    fn platform_error(&self, message: impl Into<String>) -> NotificationError {
        NotificationError::PlatformError {
            platform: self.platform.name().to_string(),
            error_code: None,
            message: message.into(),
        }
    }
}

impl NotificationPlatform for SimulatedPlatform {
    fn platform(&self) -> Platform {
        self.platform
    }

    fn create_notification(&self) -> NotificationRecord {
        let mut record = NotificationRecord::new();
        if self.platform.uses_channels()
            && let Some(channel) = self.default_channel()
        {
            record.group = channel;
        }
        record
    }

    fn schedule_notification(
        &mut self,
        notification: &mut NotificationRecord,
    ) -> NotificationResult<()> {
        let mut state = self.state.lock();
        if state.fail_scheduling {
            return Err(self.platform_error("notification center rejected the request"));
        }

        if self.platform.uses_channels() {
            if notification.group.is_empty() {
                notification.group = state
                    .default_channel
                    .clone()
                    .ok_or_else(|| self.platform_error("no notification channel registered"))?;
            } else if !state.channels.iter().any(|c| c.id == notification.group) {
                return Err(self.platform_error(format!(
                    "unknown notification channel '{}'",
                    notification.group
                )));
            }
        }

        let id = match notification.id {
            Some(id) => id,
            None => {
                let id = NotificationId::new(state.next_id);
                state.next_id += 1;
                notification.id = Some(id);
                id
            },
        };

        // An explicit id replaces whatever was scheduled under it
        state.scheduled.retain(|record| record.id != Some(id));

        let mut stored = notification.clone();
        stored.scheduled = true;
        state.schedule_log.push(stored.clone());
        state.scheduled.push(stored);
        Ok(())
    }

    fn cancel_notification(&mut self, id: NotificationId) {
        let mut state = self.state.lock();
        state.cancelled.push(id);
        state.scheduled.retain(|record| record.id != Some(id));
    }

    fn dismiss_notification(&mut self, id: NotificationId) {
        self.state
            .lock()
            .displayed
            .retain(|record| record.id != Some(id));
    }

    fn cancel_all_scheduled_notifications(&mut self) {
        let mut state = self.state.lock();
        state.cancel_all_calls += 1;
        state.scheduled.clear();
    }

    fn dismiss_all_displayed_notifications(&mut self) {
        let mut state = self.state.lock();
        state.dismiss_all_calls += 1;
        state.displayed.clear();
    }

    fn get_last_notification(&self) -> Option<NotificationRecord> {
        self.state.lock().last_responded.clone()
    }

    fn on_foreground(&mut self) {
        let mut state = self.state.lock();
        state.foreground = true;
        if self.platform.clears_badge_on_foreground() {
            state.app_badge = 0;
        }
    }

    fn on_background(&mut self) {
        self.state.lock().foreground = false;
    }

    fn subscribe_received(&mut self) -> UnboundedReceiver<NotificationRecord> {
        let (sender, receiver) = mpsc::unbounded_channel();
        self.state.lock().receivers.push(sender);
        receiver
    }

    fn register_channels(&mut self, channels: &[ChannelDescriptor]) -> NotificationResult<()> {
        if !self.platform.uses_channels() {
            return Ok(());
        }
        if channels.is_empty() {
            return Err(NotificationError::InvalidOperation {
                operation: "register_channels",
                message: format!("{} requires at least one channel", self.platform.name()),
            });
        }

        let mut state = self.state.lock();
        for channel in channels {
            state.channels.retain(|existing| existing.id != channel.id);
            state.channels.push(channel.clone());
        }
        if state.default_channel.is_none() {
            state.default_channel = Some(channels[0].id.clone());
        }
        Ok(())
    }

    fn are_notifications_enabled(&self, channel_id: Option<&str>) -> bool {
        let state = self.state.lock();
        if state.permission_denied || !state.notifications_enabled {
            return false;
        }
        // Unknown channels report the application-wide setting
        channel_id.is_none_or(|id| !state.disabled_channels.iter().any(|disabled| disabled == id))
    }

    fn request_notification_permission(&mut self) -> PermissionFuture<'_> {
        let platform = self.platform;
        let answer = {
            let mut state = self.state.lock();
            state.permission_requests += 1;
            state.permission_denied = platform.is_mobile() && state.permission == PermissionAnswer::Deny;
            state.permission
        };

        Box::pin(async move {
            if !platform.is_mobile() {
                return Ok(AuthorizationState::Authorized {
                    granted_at: SystemTime::now(),
                });
            }

            Ok(match answer {
                PermissionAnswer::Grant => AuthorizationState::Authorized {
                    granted_at: SystemTime::now(),
                },
                PermissionAnswer::Provisional => AuthorizationState::Provisional {
                    granted_at: SystemTime::now(),
                },
                PermissionAnswer::Deny => AuthorizationState::Denied {
                    denied_at: SystemTime::now(),
                    can_retry: false,
                },
            })
        })
    }
}
