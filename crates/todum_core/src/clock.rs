//! Time sources for classification and grouping.
//!
//! # Responsibility
//! - Keep wall-clock reads out of pure grouping/overdue logic.
//! - Let tests pin "now" to a fixed instant and zone.

use chrono::{DateTime, Local, TimeDelta, TimeZone};
use std::sync::{Arc, Mutex, PoisonError};

/// Source of the current instant in a calendar time zone.
///
/// The zone decides which calendar day "today" is during grouping.
pub trait Clock {
    type Tz: TimeZone;

    fn now(&self) -> DateTime<Self::Tz>;
}

/// Wall clock in the process-local time zone.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    type Tz = Local;

    fn now(&self) -> DateTime<Local> {
        Local::now()
    }
}

/// Manually driven clock.
///
/// Clones share the same instant, so a test can keep one handle after moving
/// another into a board.
#[derive(Debug, Clone)]
pub struct FixedClock<Tz: TimeZone> {
    now: Arc<Mutex<DateTime<Tz>>>,
}

impl<Tz: TimeZone> FixedClock<Tz> {
    pub fn new(now: DateTime<Tz>) -> Self {
        Self {
            now: Arc::new(Mutex::new(now)),
        }
    }

    /// Moves the clock to `now`.
    pub fn set(&self, now: DateTime<Tz>) {
        *self.now.lock().unwrap_or_else(PoisonError::into_inner) = now;
    }

    /// Moves the clock forward by `delta`.
    pub fn advance(&self, delta: TimeDelta) {
        let mut guard = self.now.lock().unwrap_or_else(PoisonError::into_inner);
        *guard = guard.clone() + delta;
    }
}

impl<Tz: TimeZone> Clock for FixedClock<Tz> {
    type Tz = Tz;

    fn now(&self) -> DateTime<Tz> {
        self.now
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[cfg(test)]
mod tests {
    use super::{Clock, FixedClock};
    use chrono::{TimeDelta, TimeZone, Utc};

    #[test]
    fn fixed_clock_handles_share_time() {
        let start = Utc.with_ymd_and_hms(2026, 1, 5, 9, 0, 0).unwrap();
        let clock = FixedClock::new(start);
        let handle = clock.clone();

        handle.advance(TimeDelta::minutes(30));
        assert_eq!(clock.now(), start + TimeDelta::minutes(30));

        handle.set(start);
        assert_eq!(clock.now(), start);
    }
}
