//! Example: Idle game deliveries
//!
//! Buying an item schedules a "delivery arrived" notification that is held until the game
//! loses focus. A simulated clock then skips ahead so the notification center delivers it,
//! and the player reopens the game from the notification.
//!
//! Run with: cargo run --example idle_delivery

use chrono::{NaiveDate, TimeDelta};
use game_notifications::*;

struct Item {
    title: &'static str,
    description: &'static str,
    minutes: i64,
}

const SHOP: [Item; 2] = [
    Item {
        title: "Copper ore",
        description: "Your copper ore has been mined",
        minutes: 5,
    },
    Item {
        title: "Steel beams",
        description: "Your steel beams are ready",
        minutes: 12,
    },
];

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    let save_dir = tempfile::tempdir()?;
    let config = NotificationsConfig::default()
        .with_platform(Platform::Android)
        .with_persistence_path(save_dir.path().join("notifications.bin"));

    let start = NaiveDate::from_ymd_opt(2025, 4, 1)
        .and_then(|d| d.and_hms_opt(20, 0, 0))
        .ok_or_else(|| anyhow::anyhow!("invalid start time"))?;
    let clock = ManualClock::new(start);
    let device = SimulatedPlatform::new(Platform::Android);

    let mut manager =
        NotificationQueueManager::with_clock(Box::new(device.clone()), config, clock.clone());
    let mut events = manager.subscribe();

    manager
        .initialize(&[
            ChannelDescriptor::new("deliveries", "Deliveries", "Items arriving in your warehouse"),
            ChannelDescriptor::new("news", "News", "Game announcements")
                .with_style(NotificationStyle::Default),
        ])
        .await?;

    println!(
        "Delivery notifications enabled: {}",
        manager.are_notifications_enabled(Some("deliveries"))?
    );

    // Buy everything in the shop
    let mut orders = Vec::new();
    for item in &SHOP {
        let notification = manager
            .create_notification()?
            .with_title(item.title)
            .with_body(item.description)
            .with_data(format!("item={}", item.title))
            .with_delivery_time(clock.now() + TimeDelta::minutes(item.minutes));
        if let Some(id) = manager.schedule_notification(notification)?.and_then(|p| p.id()) {
            orders.push(id);
        }
    }

    // Orders must survive the notification tray being cleared when the player returns
    for id in &orders {
        if let Some(pending) = manager.pending_notification_mut(*id) {
            pending.reschedule = true;
        }
    }
    println!(
        "Bought {} items, {} notification(s) held by the manager, {} at the device",
        SHOP.len(),
        manager.pending_notifications().len(),
        device.scheduled().len()
    );

    // Player leaves the game
    manager.on_focus_changed(false)?;
    println!("Backgrounded: {} notification(s) at the device", device.scheduled().len());

    clock.advance(TimeDelta::minutes(6));
    let shown = device.deliver_due(clock.now());
    println!("Six minutes later the device shows {shown} notification(s)");

    if let Some(first) = device.displayed().first().and_then(|record| record.id) {
        device.respond(first)?;
    }

    // Player taps the notification and the game returns to the foreground
    manager.on_focus_changed(true)?;
    manager.tick()?;

    if let Some(last) = manager.get_last_notification()? {
        println!("Opened from \"{}\" ({})", last.title, last.data);
    }
    for pending in manager.pending_notifications() {
        println!(
            "Still pending: {} at {:?} (reschedule: {})",
            pending.notification.title,
            pending.delivery_time(),
            pending.reschedule
        );
    }

    while let Ok(event) = events.try_recv() {
        println!("Event: {event:?}");
    }

    Ok(())
}
