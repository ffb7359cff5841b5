//! Where the scheduler gets "now" from.

use std::cell::Cell;

use chrono::{NaiveTime, Timelike};

/// Source of the current time of day, in whole seconds.
pub trait ClockSource {
    fn now(&self) -> NaiveTime;
}

/// The local wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalClock;

impl ClockSource for LocalClock {
    fn now(&self) -> NaiveTime {
        truncate_to_seconds(chrono::Local::now().naive_local().time())
    }
}

/// A clock that only moves when told to.
///
/// Used to drive the scheduler deterministically, e.g. in tests.
#[derive(Debug, Clone)]
pub struct FixedClock {
    now: Cell<NaiveTime>,
}

impl FixedClock {
    #[must_use]
    pub fn new(now: NaiveTime) -> Self {
        Self {
            now: Cell::new(truncate_to_seconds(now)),
        }
    }

    pub fn set(&self, now: NaiveTime) {
        self.now.set(truncate_to_seconds(now));
    }

    /// Moves the clock forward, wrapping at midnight like a wall clock would.
    pub fn advance(&self, secs: i64) {
        self.now.set(self.now.get() + chrono::Duration::seconds(secs));
    }
}

impl ClockSource for FixedClock {
    fn now(&self) -> NaiveTime {
        self.now.get()
    }
}

impl<C: ClockSource + ?Sized> ClockSource for &C {
    fn now(&self) -> NaiveTime {
        (**self).now()
    }
}

fn truncate_to_seconds(time: NaiveTime) -> NaiveTime {
    // a leap second shows up as nanosecond >= 1_000_000_000, zeroing it is fine
    time.with_nanosecond(0).unwrap_or(time)
}
