//! Tests for components/channel.rs

use game_notifications::components::{ChannelDescriptor, NotificationStyle, PrivacyMode};

#[test]
fn test_channel_defaults() {
    let channel = ChannelDescriptor::new("game", "Game", "Harvest updates");
    assert!(channel.shows_badge);
    assert!(!channel.show_lights);
    assert!(channel.vibrates);
    assert!(!channel.high_priority);
    assert_eq!(channel.style, NotificationStyle::Popup);
    assert_eq!(channel.privacy, PrivacyMode::Public);
    assert_eq!(channel.vibration_pattern, None);
}

#[test]
fn test_channel_from_json() {
    let channel: ChannelDescriptor = serde_json::from_str(
        r#"{"id": "news", "name": "News", "description": "Announcements",
            "style": "NoSound", "privacy": "Secret", "vibration_pattern": [0, 250, 250, 250]}"#,
    )
    .unwrap();
    assert_eq!(channel.style.importance(), 2);
    assert_eq!(channel.privacy.visibility(), -1);
    assert!(channel.shows_badge);
    assert_eq!(channel.vibration_pattern, Some(vec![0, 250, 250, 250]));
}
