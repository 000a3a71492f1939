//! Time axis model: wall-clock instants to horizontal pixel offsets.
//!
//! This module provides:
//! - `TimeWindow`, the half-open span of time the guide renders
//! - `PixelDensity`, a rational pixels-per-minute constant
//! - `TimeAxis`, converting instants to offsets and producing slot ticks
//!
//! All arithmetic runs on integer milliseconds; only the final pixel value is
//! a float.

use chrono::{DateTime, Duration, FixedOffset, Offset, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::error::GuideError;

const MILLIS_PER_MINUTE: i64 = 60_000;

/// Half-open time span `[start, end)` with `end > start`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimeWindow {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl TimeWindow {
    /// Creates a window, rejecting empty or inverted spans.
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self, GuideError> {
        if end <= start {
            return Err(GuideError::InvalidWindow { start, end });
        }
        Ok(Self { start, end })
    }

    /// Creates a window of `hours` starting at `start`.
    pub fn from_hours(start: DateTime<Utc>, hours: u32) -> Result<Self, GuideError> {
        let hours = i64::from(hours);
        let end = add_hours(start, hours).ok_or(GuideError::WindowOutOfRange { start, hours })?;
        Self::new(start, end)
    }

    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    pub fn end(&self) -> DateTime<Utc> {
        self.end
    }

    pub fn duration(&self) -> Duration {
        self.end - self.start
    }

    /// Window membership: `start <= instant < end`.
    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        self.start <= instant && instant < self.end
    }

    /// True when `[start, end)` overlaps this window.
    pub fn intersects(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> bool {
        end > self.start && start < self.end
    }

    /// Same length, moved by `hours` (negative moves back).
    pub fn shifted_hours(&self, hours: i64) -> Result<Self, GuideError> {
        let out_of_range = || GuideError::WindowOutOfRange {
            start: self.start,
            hours,
        };
        Ok(Self {
            start: add_hours(self.start, hours).ok_or_else(out_of_range)?,
            end: add_hours(self.end, hours).ok_or_else(out_of_range)?,
        })
    }
}

fn add_hours(instant: DateTime<Utc>, hours: i64) -> Option<DateTime<Utc>> {
    instant.checked_add_signed(Duration::try_hours(hours)?)
}

/// Pixels per minute as `numerator / denominator`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PixelDensity {
    pub numerator: u32,
    pub denominator: u32,
}

impl Default for PixelDensity {
    fn default() -> Self {
        Self {
            numerator: 4,
            denominator: 1,
        }
    }
}

impl PixelDensity {
    pub fn new(numerator: u32, denominator: u32) -> Self {
        Self {
            numerator,
            denominator,
        }
    }

    /// Converts a signed millisecond span to pixels.
    pub fn millis_to_px(&self, millis: i64) -> f32 {
        if self.denominator == 0 {
            return 0.0;
        }
        let scaled = i128::from(millis) * i128::from(self.numerator);
        let divisor = i128::from(MILLIS_PER_MINUTE) * i128::from(self.denominator);
        (scaled as f64 / divisor as f64) as f32
    }

    /// Converts a pixel span back to milliseconds (truncating).
    pub fn px_to_millis(&self, px: f32) -> i64 {
        if self.numerator == 0 {
            return 0;
        }
        let millis = f64::from(px) * (MILLIS_PER_MINUTE as f64) * f64::from(self.denominator)
            / f64::from(self.numerator);
        millis as i64
    }
}

/// A single time-axis tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Slot {
    /// Boundary instant where the slot begins
    pub start: DateTime<Utc>,
    /// Offset of the boundary from the window start (negative for a slot
    /// that begins before the window)
    pub offset_px: f32,
    pub width_px: f32,
    /// Whether the boundary falls on a full hour in the axis' time zone
    pub is_hour: bool,
}

/// Maps instants inside (and outside) a `TimeWindow` to pixel offsets.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeAxis {
    window: TimeWindow,
    density: PixelDensity,
    slot_minutes: u32,
    utc_offset: FixedOffset,
}

impl TimeAxis {
    pub fn new(window: TimeWindow, density: PixelDensity, slot_minutes: u32) -> Self {
        Self {
            window,
            density,
            slot_minutes: slot_minutes.max(1),
            utc_offset: Utc.fix(),
        }
    }

    /// Sets the zone used for slot alignment and hour detection.
    pub fn with_utc_offset(mut self, offset: FixedOffset) -> Self {
        self.utc_offset = offset;
        self
    }

    pub fn window(&self) -> TimeWindow {
        self.window
    }

    pub fn density(&self) -> PixelDensity {
        self.density
    }

    pub fn slot_minutes(&self) -> u32 {
        self.slot_minutes
    }

    pub fn utc_offset(&self) -> FixedOffset {
        self.utc_offset
    }

    /// `(instant - window.start)` in minutes times the density.
    ///
    /// Defined outside the window too; callers clip.
    pub fn offset_of(&self, instant: DateTime<Utc>) -> f32 {
        let millis = (instant - self.window.start).num_milliseconds();
        self.density.millis_to_px(millis)
    }

    /// Inverse of `offset_of`, used for pointer hit-testing.
    pub fn instant_at(&self, offset_px: f32) -> DateTime<Utc> {
        let millis = self.density.px_to_millis(offset_px);
        match self.window.start.checked_add_signed(Duration::milliseconds(millis)) {
            Some(instant) => instant,
            None if millis < 0 => self.window.start,
            None => self.window.end,
        }
    }

    pub fn is_visible(&self, instant: DateTime<Utc>) -> bool {
        self.window.contains(instant)
    }

    /// Pixel width of the whole window.
    pub fn total_width(&self) -> f32 {
        self.offset_of(self.window.end)
    }

    pub fn slot_width(&self) -> f32 {
        self.density
            .millis_to_px(i64::from(self.slot_minutes) * MILLIS_PER_MINUTE)
    }

    /// Lazily yields the slot boundaries covering the window.
    ///
    /// The first boundary is the window start floored to the slot interval in
    /// the axis' time zone, so it may sit slightly before the window.
    pub fn slots(&self) -> SlotIter {
        let slot_millis = i64::from(self.slot_minutes) * MILLIS_PER_MINUTE;
        let offset_millis = i64::from(self.utc_offset.local_minus_utc()) * 1000;
        let local_start = self.window.start.timestamp_millis() + offset_millis;
        let aligned = local_start - local_start.rem_euclid(slot_millis) - offset_millis;

        SlotIter {
            axis: *self,
            next_millis: aligned,
            slot_millis,
            offset_millis,
        }
    }
}

/// Iterator over the slot ticks of a `TimeAxis`.
pub struct SlotIter {
    axis: TimeAxis,
    next_millis: i64,
    slot_millis: i64,
    offset_millis: i64,
}

impl Iterator for SlotIter {
    type Item = Slot;

    fn next(&mut self) -> Option<Slot> {
        let start = Utc.timestamp_millis_opt(self.next_millis).single()?;
        if start >= self.axis.window.end {
            return None;
        }
        self.next_millis += self.slot_millis;

        let local_millis = start.timestamp_millis() + self.offset_millis;
        Some(Slot {
            start,
            offset_px: self.axis.offset_of(start),
            width_px: self.axis.slot_width(),
            is_hour: local_millis.rem_euclid(60 * MILLIS_PER_MINUTE) == 0,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, h, m, 0).unwrap()
    }

    fn axis(start: DateTime<Utc>, end: DateTime<Utc>) -> TimeAxis {
        TimeAxis::new(TimeWindow::new(start, end).unwrap(), PixelDensity::new(4, 1), 30)
    }

    #[test]
    fn test_window_rejects_inverted_span() {
        assert!(TimeWindow::new(at(10, 0), at(10, 0)).is_err());
        assert!(TimeWindow::new(at(11, 0), at(10, 0)).is_err());
        assert!(TimeWindow::new(at(10, 0), at(10, 1)).is_ok());
    }

    #[test]
    fn test_window_arithmetic_past_calendar_end_is_an_error() {
        let late = DateTime::<Utc>::MAX_UTC - Duration::hours(2);
        assert!(matches!(
            TimeWindow::from_hours(late, 4),
            Err(GuideError::WindowOutOfRange { hours: 4, .. })
        ));

        let window = TimeWindow::from_hours(at(10, 0), 4).unwrap();
        assert_eq!(window.shifted_hours(-4).unwrap().start(), at(6, 0));
        assert!(window.shifted_hours(i64::MAX).is_err());
        assert!(window.shifted_hours(i64::MIN).is_err());
    }

    #[test]
    fn test_window_contains_is_half_open() {
        let w = TimeWindow::new(at(10, 0), at(14, 0)).unwrap();
        assert!(w.contains(at(10, 0)));
        assert!(w.contains(at(13, 59)));
        assert!(!w.contains(at(14, 0)));
        assert!(!w.contains(at(9, 59)));
    }

    #[test]
    fn test_offset_of_inside_and_outside_window() {
        let a = axis(at(10, 0), at(14, 0));
        assert_eq!(a.offset_of(at(10, 0)), 0.0);
        assert_eq!(a.offset_of(at(10, 30)), 120.0);
        assert_eq!(a.offset_of(at(9, 30)), -120.0);
        assert_eq!(a.total_width(), 960.0);
    }

    #[test]
    fn test_rational_density() {
        let w = TimeWindow::new(at(10, 0), at(11, 0)).unwrap();
        let a = TimeAxis::new(w, PixelDensity::new(5, 2), 30);
        assert_eq!(a.offset_of(at(10, 30)), 75.0);
        assert_eq!(a.slot_width(), 75.0);
    }

    #[test]
    fn test_instant_at_inverts_offset() {
        let a = axis(at(10, 0), at(14, 0));
        assert_eq!(a.instant_at(120.0), at(10, 30));
    }

    #[test]
    fn test_slots_cover_window_with_hour_marks() {
        let a = axis(at(10, 0), at(12, 0));
        let slots: Vec<Slot> = a.slots().collect();
        assert_eq!(slots.len(), 4);
        assert_eq!(slots[0].start, at(10, 0));
        assert_eq!(slots[3].start, at(11, 30));
        assert_eq!(
            slots.iter().map(|s| s.is_hour).collect::<Vec<_>>(),
            vec![true, false, true, false]
        );
        assert_eq!(slots[1].offset_px, 120.0);
    }

    #[test]
    fn test_slots_floor_unaligned_start() {
        let a = axis(at(10, 10), at(11, 0));
        let slots: Vec<Slot> = a.slots().collect();
        assert_eq!(slots[0].start, at(10, 0));
        assert!(slots[0].offset_px < 0.0);
        assert_eq!(slots.len(), 2);
    }

    #[test]
    fn test_hour_detection_respects_utc_offset() {
        let offset = FixedOffset::east_opt(30 * 60).unwrap();
        let a = axis(at(10, 0), at(11, 0)).with_utc_offset(offset);
        let slots: Vec<Slot> = a.slots().collect();
        assert!(!slots[0].is_hour);
        assert!(slots[1].is_hour);
    }
}
