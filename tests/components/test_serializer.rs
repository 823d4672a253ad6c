//! Tests for components/serializer.rs

use chrono::{NaiveDate, TimeDelta};
use game_notifications::backends::SimulatedPlatform;
use game_notifications::components::{
    BinarySerializer, NotificationError, NotificationRecord, PendingNotification,
    PendingNotificationsSerializer, SerializerError,
};

fn record(id: i32, minutes: i64) -> NotificationRecord {
    let base = NaiveDate::from_ymd_opt(2025, 1, 10)
        .and_then(|d| d.and_hms_opt(8, 0, 0))
        .unwrap();
    NotificationRecord::new()
        .with_id(id)
        .with_title(format!("Delivery {id}"))
        .with_body("Your order has arrived")
        .with_group("deliveries")
        .with_data(format!("order={id}"))
        .with_delivery_time(base + TimeDelta::minutes(minutes))
}

#[test]
fn test_missing_file_means_no_saved_state() {
    let dir = tempfile::tempdir().unwrap();
    let serializer = BinarySerializer::new(dir.path().join("never-written.bin"));
    let platform = SimulatedPlatform::default();
    assert_eq!(serializer.deserialize(&platform).unwrap(), None);
}

#[test]
fn test_file_round_trip_creates_parent_directories() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("profile").join("slot1").join("notifications.bin");
    let serializer = BinarySerializer::new(&path);
    assert_eq!(serializer.path(), path.as_path());

    let mut first = PendingNotification::new(record(1, 15));
    first.notification.scheduled = true;
    let second = PendingNotification::new(record(2, 45).with_badge_number(2));
    serializer.serialize(&[&first, &second]).unwrap();
    assert!(path.exists());

    let platform = SimulatedPlatform::default();
    let restored = serializer.deserialize(&platform).unwrap().unwrap();
    let mut expected_first = first.notification.clone();
    expected_first.scheduled = false;
    assert_eq!(restored, vec![expected_first, second.notification.clone()]);
    assert!(restored.iter().all(|r| !r.scheduled));
}

#[test]
fn test_serialize_replaces_previous_contents() {
    let dir = tempfile::tempdir().unwrap();
    let serializer = BinarySerializer::new(dir.path().join("notifications.bin"));
    let platform = SimulatedPlatform::default();

    let pending = PendingNotification::new(record(7, 5));
    serializer.serialize(&[&pending]).unwrap();
    serializer.serialize(&[]).unwrap();

    assert_eq!(serializer.deserialize(&platform).unwrap(), Some(Vec::new()));
}

#[test]
fn test_newer_file_version_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("notifications.bin");
    std::fs::write(&path, [2u8, 0, 0, 0, 0]).unwrap();

    let err = BinarySerializer::new(&path)
        .deserialize(&SimulatedPlatform::default())
        .unwrap_err();
    assert!(matches!(
        err,
        NotificationError::Persistence(SerializerError::UnsupportedVersion { found: 2, .. })
    ));
}

#[test]
fn test_unwritable_path_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    // The target is an existing directory, so the write must fail
    let serializer = BinarySerializer::new(dir.path());
    let pending = PendingNotification::new(record(1, 5));
    assert!(matches!(
        serializer.serialize(&[&pending]),
        Err(NotificationError::Persistence(SerializerError::Io(_)))
    ));
}
