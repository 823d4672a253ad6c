//! Tests for components/mode.rs

use game_notifications::components::OperatingMode;

#[test]
fn test_mode_helpers() {
    assert!(!OperatingMode::NO_QUEUE.queues());
    assert!(OperatingMode::QUEUE.queues());
    assert!(!OperatingMode::QUEUE.clears_on_foregrounding());
    assert!(OperatingMode::QUEUE_AND_CLEAR.clears_on_foregrounding());
    assert!(!OperatingMode::QUEUE_AND_CLEAR.reschedules_after_clearing());
    assert!(OperatingMode::QUEUE_CLEAR_AND_RESCHEDULE.reschedules_after_clearing());
}

#[test]
fn test_reschedule_requires_clearing() {
    let mode = OperatingMode::QUEUE | OperatingMode::RESCHEDULE_AFTER_CLEARING;
    assert!(!mode.reschedules_after_clearing());
}

#[test]
fn test_mode_text() {
    let mode = OperatingMode::parse("QUEUE | CLEAR_ON_FOREGROUNDING").unwrap();
    assert_eq!(mode, OperatingMode::QUEUE_AND_CLEAR);
    assert_eq!(OperatingMode::parse(&mode.to_text()), Some(mode));
    assert!(OperatingMode::parse("SOMETIMES").is_none());
}

#[test]
fn test_mode_json() {
    let json = serde_json::to_string(&OperatingMode::QUEUE).unwrap();
    let back: OperatingMode = serde_json::from_str(&json).unwrap();
    assert_eq!(back, OperatingMode::QUEUE);
}
