//! Tests for components/mod.rs

use game_notifications::components::{NotificationError, NotificationId, SerializerError};

#[test]
fn test_notification_id_conversions() {
    let id = NotificationId::from(17);
    assert_eq!(id.get(), 17);
    assert_eq!(i32::from(id), 17);
    assert_eq!("17".parse::<NotificationId>().unwrap(), id);
    assert!("seventeen".parse::<NotificationId>().is_err());
}

#[test]
fn test_notification_id_serializes_as_plain_integer() {
    let json = serde_json::to_string(&NotificationId::new(-3)).unwrap();
    assert_eq!(json, "-3");
    let back: NotificationId = serde_json::from_str(&json).unwrap();
    assert_eq!(back, NotificationId::new(-3));
}

#[test]
fn test_error_display() {
    let err = NotificationError::PlatformError {
        platform: "Android".to_string(),
        error_code: Some(5),
        message: "channel missing".to_string(),
    };
    let text = err.to_string();
    assert!(text.contains("Android"));
    assert!(text.contains("channel missing"));
    assert!(!err.is_invalid_operation());

    let err = NotificationError::from(SerializerError::UnsupportedVersion {
        found: 9,
        supported: 1,
    });
    assert!(matches!(err, NotificationError::Persistence(_)));
}
