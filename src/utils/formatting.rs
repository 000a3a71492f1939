//! Text formatting for times, windows and durations in the guide viewer.

use chrono::{DateTime, FixedOffset, Utc};
use guidegrid::TimeWindow;

/// Formats an instant as a 24-hour clock time in `offset`.
///
/// ```ignore
/// assert_eq!(format_time(instant, utc), "09:30");
/// ```
pub fn format_time(instant: DateTime<Utc>, offset: FixedOffset) -> String {
    instant.with_timezone(&offset).format("%H:%M").to_string()
}

/// Formats a program's airing span, e.g. "09:30 - 10:15".
pub fn format_span(start: DateTime<Utc>, end: DateTime<Utc>, offset: FixedOffset) -> String {
    format!("{} - {}", format_time(start, offset), format_time(end, offset))
}

/// Formats a guide window, e.g. "Mon 01 Jan 10:00 - 14:00".
///
/// The end date is repeated when the window crosses midnight.
pub fn format_window(window: TimeWindow, offset: FixedOffset) -> String {
    let start = window.start().with_timezone(&offset);
    let end = window.end().with_timezone(&offset);
    if start.date_naive() == end.date_naive() {
        format!("{} - {}", start.format("%a %d %b %H:%M"), end.format("%H:%M"))
    } else {
        format!("{} - {}", start.format("%a %d %b %H:%M"), end.format("%a %d %b %H:%M"))
    }
}

/// Formats a length in minutes as "45m", "2h" or "1h 30m".
pub fn format_duration_minutes(minutes: i64) -> String {
    let minutes = minutes.max(0);
    match (minutes / 60, minutes % 60) {
        (0, m) => format!("{}m", m),
        (h, 0) => format!("{}h", h),
        (h, m) => format!("{}h {}m", h, m),
    }
}
