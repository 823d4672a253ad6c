//! Queueing notification manager
//!
//! Decides whether notifications go to the platform immediately or wait in memory until
//! the application is backgrounded, numbers badges, persists what must survive a restart
//! and reconciles delivered and expired notifications. The host drives it through
//! [`NotificationQueueManager::on_focus_changed`] and a per-frame
//! [`NotificationQueueManager::tick`].

use std::sync::Arc;
use std::time::Duration;

use chrono::TimeDelta;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use super::{
    AuthorizationState, BinarySerializer, ChannelDescriptor, Clock, NotificationError,
    NotificationId, NotificationPlatform, NotificationRecord, NotificationResult,
    NotificationsConfig, OperatingMode, PendingNotification, PendingNotificationsSerializer,
    SystemClock,
};
use crate::backends::PlatformBackendFactory;

/// Unscheduled notifications due sooner than this after backgrounding are dropped
pub const MINIMUM_NOTIFICATION_TIME: Duration = Duration::from_secs(2);

/// Outcome reported to listeners, at most once per pending notification
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotificationEvent {
    /// The platform delivered the notification while the application was in the foreground
    Delivered(PendingNotification),
    /// The delivery time passed while the notification was still held by the manager
    Expired(PendingNotification),
}

impl NotificationEvent {
    pub fn pending(&self) -> &PendingNotification {
        match self {
            NotificationEvent::Delivered(pending) | NotificationEvent::Expired(pending) => pending,
        }
    }
}

pub struct NotificationQueueManager {
    platform: Box<dyn NotificationPlatform>,
    serializer: Option<Box<dyn PendingNotificationsSerializer>>,
    clock: Arc<dyn Clock>,
    config: NotificationsConfig,
    auto_badging: bool,
    pending: Vec<PendingNotification>,
    in_foreground: bool,
    initialized: bool,
    received: Option<UnboundedReceiver<NotificationRecord>>,
    listeners: Vec<UnboundedSender<NotificationEvent>>,
    next_synthetic_id: Option<i32>,
    authorization: AuthorizationState,
}

impl NotificationQueueManager {
    pub fn new(platform: Box<dyn NotificationPlatform>, config: NotificationsConfig) -> Self {
        Self::with_clock(platform, config, SystemClock)
    }

    /// Build the backend for `config.platform` through the backend factory
    pub fn from_config(config: NotificationsConfig) -> Self {
        let platform = PlatformBackendFactory::create_backend(config.platform);
        Self::new(platform, config)
    }

    pub fn with_clock(
        platform: Box<dyn NotificationPlatform>,
        config: NotificationsConfig,
        clock: impl Clock + 'static,
    ) -> Self {
        Self {
            platform,
            serializer: None,
            clock: Arc::new(clock),
            auto_badging: config.auto_badging,
            config,
            pending: Vec::new(),
            in_foreground: true,
            initialized: false,
            received: None,
            listeners: Vec::new(),
            next_synthetic_id: None,
            authorization: AuthorizationState::default(),
        }
    }

    /// Replace the default file serializer; only possible before initialization
    pub fn set_serializer(
        &mut self,
        serializer: impl PendingNotificationsSerializer + 'static,
    ) -> NotificationResult<()> {
        if self.initialized {
            return Err(NotificationError::InvalidOperation {
                operation: "set_serializer",
                message: "the serializer must be set before initialization".to_string(),
            });
        }
        self.serializer = Some(Box::new(serializer));
        Ok(())
    }

    /// Connect to the platform, request permission and restore persisted notifications
    ///
    /// Must be called exactly once before any other operation.
    pub async fn initialize(&mut self, channels: &[ChannelDescriptor]) -> NotificationResult<()> {
        if self.initialized {
            return Err(NotificationError::InvalidOperation {
                operation: "initialize",
                message: "the notification manager is already initialized".to_string(),
            });
        }

        self.platform.register_channels(channels)?;
        self.received = Some(self.platform.subscribe_received());

        let permission = self.platform.request_notification_permission().await;
        match permission {
            Ok(state) => {
                if !state.is_authorized() {
                    tracing::warn!(
                        platform = self.platform.platform().name(),
                        state = ?state,
                        "Notification permission not granted"
                    );
                }
                self.authorization = state;
            },
            Err(e) => {
                tracing::warn!(
                    platform = self.platform.platform().name(),
                    error = %e,
                    "Notification permission request failed"
                );
            },
        }

        if self.serializer.is_none() {
            self.serializer = Some(Box::new(BinarySerializer::new(
                self.config.persistence_path.clone(),
            )));
        }

        self.initialized = true;
        self.in_foreground = true;
        tracing::info!(
            platform = self.platform.platform().name(),
            mode = %self.config.mode.to_text(),
            channels = channels.len(),
            "Notification manager initialized"
        );

        self.on_foregrounding();
        Ok(())
    }

    pub fn create_notification(&self) -> NotificationResult<NotificationRecord> {
        self.require_initialized("create_notification")?;
        Ok(self.platform.create_notification())
    }

    /// Schedule a notification, or hold it until backgrounding in queue mode
    ///
    /// Passing `None` is not an error and yields `Ok(None)`. The returned pending entry may be
    /// flagged for rescheduling.
    pub fn schedule_notification(
        &mut self,
        notification: impl Into<Option<NotificationRecord>>,
    ) -> NotificationResult<Option<&mut PendingNotification>> {
        self.require_initialized("schedule_notification")?;
        let Some(record) = notification.into() else {
            return Ok(None);
        };
        self.schedule_record(record).map(Some)
    }

    /// Cancel a notification at the platform and forget it locally
    pub fn cancel_notification(&mut self, id: NotificationId) -> NotificationResult<()> {
        self.require_initialized("cancel_notification")?;
        self.platform.cancel_notification(id);

        if let Some(index) = self.pending.iter().position(|p| p.id() == Some(id)) {
            self.pending.remove(index);
            tracing::debug!(id = %id, "Cancelled pending notification");
        }
        Ok(())
    }

    pub fn cancel_all_notifications(&mut self) -> NotificationResult<()> {
        self.require_initialized("cancel_all_notifications")?;
        self.platform.cancel_all_scheduled_notifications();
        self.pending.clear();
        Ok(())
    }

    pub fn dismiss_notification(&mut self, id: NotificationId) -> NotificationResult<()> {
        self.require_initialized("dismiss_notification")?;
        self.platform.dismiss_notification(id);
        Ok(())
    }

    pub fn dismiss_all_notifications(&mut self) -> NotificationResult<()> {
        self.require_initialized("dismiss_all_notifications")?;
        self.platform.dismiss_all_displayed_notifications();
        Ok(())
    }

    /// The notification the application was last opened from, if any
    pub fn get_last_notification(&self) -> NotificationResult<Option<NotificationRecord>> {
        self.require_initialized("get_last_notification")?;
        Ok(self.platform.get_last_notification())
    }

    /// Whether the user currently allows notifications, optionally for a single channel
    ///
    /// Reflects the system settings, which can change at any time after the initial permission
    /// request.
    pub fn are_notifications_enabled(&self, channel_id: Option<&str>) -> NotificationResult<bool> {
        self.require_initialized("are_notifications_enabled")?;
        Ok(self.platform.are_notifications_enabled(channel_id))
    }

    /// Per-frame update: reconcile received notifications, then expire overdue ones
    pub fn tick(&mut self) -> NotificationResult<()> {
        self.require_initialized("tick")?;
        self.drain_received();

        if !self.config.mode.queues() || self.pending.is_empty() {
            return Ok(());
        }

        let now = self.clock.now();
        let (expired, remaining): (Vec<_>, Vec<_>) = std::mem::take(&mut self.pending)
            .into_iter()
            .partition(|p| p.delivery_time().is_some_and(|time| time < now));
        self.pending = remaining;

        for pending in expired {
            tracing::debug!(id = ?pending.id(), title = %pending.notification.title, "Notification expired");
            self.emit(NotificationEvent::Expired(pending));
        }
        Ok(())
    }

    /// Application focus changed; `true` when the application came to the foreground
    pub fn on_focus_changed(&mut self, has_focus: bool) -> NotificationResult<()> {
        self.require_initialized("on_focus_changed")?;
        // Settle deliveries against the state they arrived in
        self.drain_received();
        self.in_foreground = has_focus;

        if has_focus {
            tracing::info!(platform = self.platform.platform().name(), "Application foregrounded");
            self.on_foregrounding();
        } else {
            tracing::info!(
                platform = self.platform.platform().name(),
                pending = self.pending.len(),
                "Application backgrounded"
            );
            self.on_backgrounding();
        }
        Ok(())
    }

    /// Report a notification the platform delivered
    ///
    /// [`tick`](Self::tick) forwards everything from the platform stream here; hosts with their own
    /// delivery callback may call it directly.
    pub fn on_notification_received(&mut self, notification: NotificationRecord) -> NotificationResult<()> {
        self.require_initialized("on_notification_received")?;
        self.handle_received(notification);
        Ok(())
    }

    /// Register a listener for delivered and expired notifications
    pub fn subscribe(&mut self) -> UnboundedReceiver<NotificationEvent> {
        let (sender, receiver) = mpsc::unbounded_channel();
        self.listeners.push(sender);
        receiver
    }

    pub fn pending_notifications(&self) -> &[PendingNotification] {
        &self.pending
    }

    pub fn pending_notification_mut(&mut self, id: NotificationId) -> Option<&mut PendingNotification> {
        self.pending.iter_mut().find(|p| p.id() == Some(id))
    }

    pub fn mode(&self) -> OperatingMode {
        self.config.mode
    }

    pub fn auto_badging(&self) -> bool {
        self.auto_badging
    }

    pub fn set_auto_badging(&mut self, auto_badging: bool) {
        self.auto_badging = auto_badging;
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub fn is_in_foreground(&self) -> bool {
        self.in_foreground
    }

    pub fn authorization_state(&self) -> &AuthorizationState {
        &self.authorization
    }

    pub fn platform(&self) -> &dyn NotificationPlatform {
        self.platform.as_ref()
    }

    fn require_initialized(&self, operation: &'static str) -> NotificationResult<()> {
        if self.initialized {
            Ok(())
        } else {
            Err(NotificationError::not_initialized(operation))
        }
    }

    fn schedule_record(
        &mut self,
        mut record: NotificationRecord,
    ) -> NotificationResult<&mut PendingNotification> {
        if !self.config.mode.queues() || record.delivery_time.is_none() {
            self.platform.schedule_notification(&mut record)?;
            record.scheduled = true;
            tracing::debug!(id = ?record.id, title = %record.title, "Notification scheduled");
        } else {
            if record.id.is_none() {
                record.id = Some(self.allocate_synthetic_id());
            }
            tracing::debug!(
                id = ?record.id,
                title = %record.title,
                delivery_time = ?record.delivery_time,
                "Notification queued"
            );
        }

        let index = self.pending.len();
        self.pending.push(PendingNotification::new(record));
        Ok(&mut self.pending[index])
    }

    /// Ids for queued notifications, only used to find them again in the pending list
    fn allocate_synthetic_id(&mut self) -> NotificationId {
        let mut candidate = self.next_synthetic_id.unwrap_or_else(|| {
            let seed = (self.clock.now().and_utc().timestamp_millis() & 0x3FFF_FFFF) as i32;
            seed.max(1)
        });
        while self
            .pending
            .iter()
            .any(|p| p.id() == Some(NotificationId::new(candidate)))
        {
            candidate = next_synthetic(candidate);
        }

        self.next_synthetic_id = Some(next_synthetic(candidate));
        NotificationId::new(candidate)
    }

    fn on_foregrounding(&mut self) {
        self.pending.clear();
        self.platform.on_foreground();

        let loaded = self.load_pending();
        let now = self.clock.now();

        if self.config.mode.clears_on_foregrounding() {
            self.platform.cancel_all_scheduled_notifications();

            if !self.config.mode.reschedules_after_clearing() {
                return;
            }
            for record in loaded.into_iter().flatten() {
                if !record.is_due_after(now) {
                    tracing::debug!(id = ?record.id, "Dropped stale saved notification");
                    continue;
                }
                match self.schedule_record(record) {
                    Ok(pending) => pending.reschedule = true,
                    Err(e) => tracing::warn!(error = %e, "Failed to reschedule saved notification"),
                }
            }
        } else {
            for mut record in loaded.into_iter().flatten() {
                if !record.is_due_after(now) {
                    tracing::debug!(id = ?record.id, "Dropped stale saved notification");
                    continue;
                }
                // Never cancelled at the OS, so it is still scheduled there
                record.scheduled = true;
                self.pending.push(PendingNotification::new(record));
            }
        }

        tracing::debug!(pending = self.pending.len(), "Pending notifications restored");
    }

    fn on_backgrounding(&mut self) {
        self.platform.on_background();
        if !self.config.mode.queues() {
            return;
        }

        let now = self.clock.now();
        let grace = TimeDelta::from_std(MINIMUM_NOTIFICATION_TIME).unwrap_or(TimeDelta::zero());

        self.pending.retain(|pending| {
            let too_soon = !pending.is_scheduled()
                && pending
                    .delivery_time()
                    .is_some_and(|time| time - now < grace);
            if too_soon {
                tracing::debug!(id = ?pending.id(), "Dropped notification too close to delivery");
            }
            !too_soon
        });

        // All-or-nothing: any explicit badge disables numbering for the whole set
        let auto_badged =
            self.auto_badging && self.pending.iter().all(|p| p.notification.badge_number.is_none());
        if auto_badged {
            self.pending
                .sort_by_key(|p| (p.delivery_time().is_none(), p.delivery_time()));
            let mut badge = 1;
            for pending in self.pending.iter_mut().filter(|p| !p.is_scheduled()) {
                pending.notification.badge_number = Some(badge);
                badge += 1;
            }
        }

        for pending in self.pending.iter_mut().filter(|p| !p.is_scheduled()) {
            match self.platform.schedule_notification(&mut pending.notification) {
                Ok(()) => {
                    pending.notification.scheduled = true;
                    tracing::debug!(
                        id = ?pending.id(),
                        badge = ?pending.notification.badge_number,
                        "Queued notification scheduled"
                    );
                },
                Err(e) => {
                    tracing::warn!(id = ?pending.id(), error = %e, "Failed to schedule queued notification");
                },
            }
        }

        // Badges only matter at delivery; a later session renumbers them
        if auto_badged {
            for pending in &mut self.pending {
                pending.notification.badge_number = None;
            }
        }

        self.save_pending();
    }

    fn save_pending(&self) {
        let Some(serializer) = &self.serializer else {
            return;
        };

        let clears = self.config.mode.clears_on_foregrounding();
        let to_save: Vec<&PendingNotification> = self
            .pending
            .iter()
            .filter(|p| if clears { p.survives_clearing() } else { p.is_scheduled() })
            .collect();

        if let Err(e) = serializer.serialize(&to_save) {
            tracing::warn!(error = %e, "Failed to save pending notifications");
        }
    }

    fn load_pending(&self) -> Option<Vec<NotificationRecord>> {
        let serializer = self.serializer.as_ref()?;
        match serializer.deserialize(self.platform.as_ref()) {
            Ok(records) => records,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to load saved notifications");
                None
            },
        }
    }

    fn drain_received(&mut self) {
        let mut received = Vec::new();
        if let Some(receiver) = self.received.as_mut() {
            while let Ok(record) = receiver.try_recv() {
                received.push(record);
            }
        }
        for record in received {
            self.handle_received(record);
        }
    }

    fn handle_received(&mut self, notification: NotificationRecord) {
        if !self.in_foreground {
            tracing::debug!(id = ?notification.id, "Ignoring notification received in background");
            return;
        }
        let Some(id) = notification.id else {
            return;
        };

        if let Some(index) = self.pending.iter().position(|p| p.id() == Some(id)) {
            let pending = self.pending.remove(index);
            tracing::debug!(id = %id, title = %pending.notification.title, "Notification delivered");
            self.emit(NotificationEvent::Delivered(pending));
        }
    }

    fn emit(&mut self, event: NotificationEvent) {
        self.listeners
            .retain(|listener| listener.send(event.clone()).is_ok());
    }
}

fn next_synthetic(id: i32) -> i32 {
    if id == i32::MAX { 1 } else { id + 1 }
}
