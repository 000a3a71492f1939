//! Utility modules for the guide viewer.

pub mod formatting;

pub use formatting::{format_duration_minutes, format_span, format_time, format_window};
