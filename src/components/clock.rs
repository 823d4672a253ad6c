use std::sync::Arc;

use chrono::{Local, NaiveDateTime, TimeDelta};
use parking_lot::Mutex;

/// Source of local wall-clock time for delivery decisions
pub trait Clock: Send + Sync {
    fn now(&self) -> NaiveDateTime;
}

/// Local time of the host machine
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

/// Manually advanced clock shared between a manager and its driver
#[derive(Debug, Clone)]
pub struct ManualClock(Arc<Mutex<NaiveDateTime>>);

impl ManualClock {
    pub fn new(start: NaiveDateTime) -> Self {
        Self(Arc::new(Mutex::new(start)))
    }

    pub fn set(&self, now: NaiveDateTime) {
        *self.0.lock() = now;
    }

    pub fn advance(&self, delta: TimeDelta) {
        let mut now = self.0.lock();
        *now += delta;
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new(SystemClock.now())
    }
}

impl Clock for ManualClock {
    fn now(&self) -> NaiveDateTime {
        *self.0.lock()
    }
}
