//! Tests for components/platform.rs and the simulated backend

use chrono::{NaiveDate, TimeDelta};
use game_notifications::backends::{PermissionAnswer, PlatformBackendFactory, SimulatedPlatform};
use game_notifications::components::{
    AuthorizationState, ChannelDescriptor, NotificationPlatform, NotificationRecord, Platform,
};

#[test]
fn test_platform_traits() {
    assert!(Platform::Android.uses_channels());
    assert!(!Platform::IOs.uses_channels());
    assert!(Platform::IOs.clears_badge_on_foreground());
    assert!(!Platform::Headless.is_mobile());
    assert_eq!(Platform::IOs.name(), "iOS");
    assert_eq!(Platform::default(), Platform::Headless);
}

#[test]
fn test_authorization_state() {
    assert!(AuthorizationState::NotRequested.can_request());
    assert!(!AuthorizationState::NotRequested.is_authorized());
    let provisional = AuthorizationState::Provisional {
        granted_at: std::time::SystemTime::now(),
    };
    assert!(provisional.is_authorized());
}

#[test]
fn test_provisional_permission() {
    let mut platform = SimulatedPlatform::new(Platform::IOs).with_permission(PermissionAnswer::Provisional);
    let state = tokio_test::block_on(platform.request_notification_permission()).unwrap();
    assert!(matches!(state, AuthorizationState::Provisional { .. }));
    assert_eq!(platform.permission_requests(), 1);
}

#[test]
fn test_factory_backend_schedules() {
    let mut backend = PlatformBackendFactory::create_backend(Platform::Android);
    backend
        .register_channels(&[ChannelDescriptor::new("game", "Game", "Game updates")])
        .unwrap();

    let mut record = backend.create_notification().with_title("From factory");
    backend.schedule_notification(&mut record).unwrap();
    assert!(record.id.is_some());
    assert_eq!(record.group, "game");
}

#[test]
fn test_cancel_and_dismiss() {
    let now = NaiveDate::from_ymd_opt(2025, 3, 3)
        .and_then(|d| d.and_hms_opt(10, 0, 0))
        .unwrap();
    let mut platform = SimulatedPlatform::default();
    let mut receiver = platform.subscribe_received();

    let mut shown = NotificationRecord::new().with_title("shown");
    let mut waiting = NotificationRecord::new().with_delivery_time(now + TimeDelta::hours(1));
    platform.schedule_notification(&mut shown).unwrap();
    platform.schedule_notification(&mut waiting).unwrap();

    assert_eq!(platform.deliver_due(now), 1);
    assert_eq!(receiver.try_recv().unwrap().title, "shown");

    platform.cancel_notification(waiting.id.unwrap());
    assert!(platform.scheduled().is_empty());

    platform.dismiss_notification(shown.id.unwrap());
    assert!(platform.displayed().is_empty());

    platform.on_background();
    assert!(!platform.is_foreground());
    platform.on_foreground();
    assert!(platform.is_foreground());
}
