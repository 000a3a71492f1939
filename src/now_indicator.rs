//! Current-time marker ("now line") for the guide.
//!
//! The marker position depends only on the wall clock, so it is recomputed
//! on a fixed coarse cadence rather than on scroll or fetch events. Time is
//! read through the [`Clock`] capability so tests can pin it.

use chrono::{DateTime, Duration, Utc};
use std::sync::Mutex;

use crate::time_axis::{TimeAxis, TimeWindow};

/// Source of the current instant.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Reads the system wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Manually driven clock for tests and replays.
#[derive(Debug)]
pub struct FixedClock {
    now: Mutex<DateTime<Utc>>,
}

impl FixedClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self { now: Mutex::new(now) }
    }

    pub fn set(&self, now: DateTime<Utc>) {
        if let Ok(mut guard) = self.now.lock() {
            *guard = now;
        }
    }

    pub fn advance(&self, by: Duration) {
        if let Ok(mut guard) = self.now.lock() {
            *guard += by;
        }
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        match self.now.lock() {
            Ok(guard) => *guard,
            Err(poisoned) => *poisoned.into_inner(),
        }
    }
}

/// Position of the now line.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct NowIndicator {
    pub offset_px: f32,
    /// `window.start <= now < window.end`
    pub visible: bool,
}

/// Computes the now line for `now` against `axis`.
pub fn position(axis: &TimeAxis, now: DateTime<Utc>) -> NowIndicator {
    NowIndicator {
        offset_px: axis.offset_of(now),
        visible: axis.is_visible(now),
    }
}

/// Recomputes the now line at most once per cadence.
#[derive(Debug, Clone)]
pub struct NowIndicatorTracker {
    cadence: Duration,
    last_tick: Option<DateTime<Utc>>,
    last_window: Option<TimeWindow>,
    current: NowIndicator,
}

impl NowIndicatorTracker {
    pub fn new(cadence: Duration) -> Self {
        Self {
            cadence: cadence.max(Duration::seconds(1)),
            last_tick: None,
            last_window: None,
            current: NowIndicator::default(),
        }
    }

    pub fn current(&self) -> NowIndicator {
        self.current
    }

    /// Forces a recompute on the next `tick`.
    pub fn invalidate(&mut self) {
        self.last_tick = None;
    }

    /// Recomputes when the cadence has elapsed or the window changed.
    ///
    /// Returns the new indicator when a recompute happened.
    pub fn tick(&mut self, axis: &TimeAxis, now: DateTime<Utc>) -> Option<NowIndicator> {
        let window_changed = self.last_window != Some(axis.window());
        let due = match self.last_tick {
            None => true,
            Some(last) => now - last >= self.cadence || now < last,
        };

        if !due && !window_changed {
            return None;
        }

        self.current = position(axis, now);
        self.last_tick = Some(now);
        self.last_window = Some(axis.window());
        Some(self.current)
    }

    /// Time left until the next scheduled recompute.
    pub fn next_tick_in(&self, now: DateTime<Utc>) -> Duration {
        match self.last_tick {
            None => Duration::zero(),
            Some(last) => (self.cadence - (now - last)).max(Duration::zero()),
        }
    }
}

impl Default for NowIndicatorTracker {
    fn default() -> Self {
        Self::new(Duration::seconds(60))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time_axis::PixelDensity;
    use chrono::TimeZone;

    fn at(h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, h, m, 0).unwrap()
    }

    fn axis_from(start: DateTime<Utc>) -> TimeAxis {
        TimeAxis::new(TimeWindow::from_hours(start, 4).unwrap(), PixelDensity::new(4, 1), 30)
    }

    #[test]
    fn test_position_visibility_is_half_open() {
        let a = axis_from(at(10, 0));
        assert!(position(&a, at(10, 0)).visible);
        assert!(position(&a, at(13, 59)).visible);
        assert!(!position(&a, at(14, 0)).visible);
        assert!(!position(&a, at(9, 59)).visible);
        assert_eq!(position(&a, at(11, 15)).offset_px, 300.0);
    }

    #[test]
    fn test_tracker_respects_cadence() {
        let a = axis_from(at(10, 0));
        let mut tracker = NowIndicatorTracker::new(Duration::seconds(60));

        assert!(tracker.tick(&a, at(10, 0)).is_some());
        assert!(tracker.tick(&a, at(10, 0) + Duration::seconds(30)).is_none());
        assert_eq!(tracker.next_tick_in(at(10, 0) + Duration::seconds(30)), Duration::seconds(30));

        let updated = tracker.tick(&a, at(10, 1)).unwrap();
        assert_eq!(updated.offset_px, 4.0);
    }

    #[test]
    fn test_tracker_recomputes_on_window_change() {
        let mut tracker = NowIndicatorTracker::default();
        let now = at(10, 30);
        tracker.tick(&axis_from(at(10, 0)), now);
        assert!(tracker.current().visible);

        let moved = tracker.tick(&axis_from(at(14, 0)), now).unwrap();
        assert!(!moved.visible);
    }

    #[test]
    fn test_fixed_clock_advances() {
        let clock = FixedClock::new(at(10, 0));
        clock.advance(Duration::minutes(5));
        assert_eq!(clock.now(), at(10, 5));
        clock.set(at(9, 0));
        assert_eq!(clock.now(), at(9, 0));
    }
}
