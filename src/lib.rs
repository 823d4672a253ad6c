//! Local notification queueing for games
//!
//! A [`NotificationQueueManager`] sits between game code and the device notification center.
//! In queue mode notifications are held in memory while the game is in the foreground and only
//! handed to the OS when the game is backgrounded, so players are not interrupted mid-session.
//! On return the manager cancels or reinstates what the OS holds, restores persisted
//! notifications and reports which ones were delivered or expired.
//!
//! ```no_run
//! use chrono::{Local, TimeDelta};
//! use game_notifications::*;
//!
//! # async fn run() -> NotificationResult<()> {
//! let mut manager = NotificationQueueManager::from_config(NotificationsConfig::default());
//! manager
//!     .initialize(&[ChannelDescriptor::new("game", "Game", "Game updates")])
//!     .await?;
//!
//! let notification = manager
//!     .create_notification()?
//!     .with_title("Your crops are ready")
//!     .with_delivery_time(Local::now().naive_local() + TimeDelta::hours(2));
//! manager.schedule_notification(notification)?;
//!
//! // Each frame
//! manager.tick()?;
//! // When the window loses focus
//! manager.on_focus_changed(false)?;
//! # Ok(())
//! # }
//! ```

pub mod backends;
pub mod components;

pub use backends::*;
pub use components::*;
