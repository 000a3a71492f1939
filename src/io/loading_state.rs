//! Asynchronous guide file loading state.

use std::time::Instant;

/// Holds the state of an async guide file load.
///
/// Only this progress record is shared; results come through a channel.
/// Wrapped in an `Arc<Mutex<>>` so the loading thread can clear it.
#[derive(Debug, Default)]
pub struct LoadingState {
    /// True while a load is running
    pub in_progress: bool,
    /// When the load started
    pub started: Option<Instant>,
}

impl LoadingState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin(&mut self) {
        self.in_progress = true;
        self.started = Some(Instant::now());
    }

    pub fn finish(&mut self) {
        self.in_progress = false;
        self.started = None;
    }

    /// Seconds since the running load started.
    pub fn elapsed_secs(&self) -> f32 {
        self.started.map(|t| t.elapsed().as_secs_f32()).unwrap_or(0.0)
    }
}
