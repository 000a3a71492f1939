//! Background execution of guide fetches.
//!
//! The controller only queues `FetchRequest`s; this worker runs each one on
//! its own thread against the backend and hands the outcomes back through a
//! channel. Completions may arrive in any order; the controller's tokens
//! and generations sort out which ones still apply.

use eframe::egui;
use guidegrid::{FetchOutcome, FetchRequest, GuideBackend};
use std::sync::mpsc::{channel, Receiver, Sender};
use std::sync::Arc;
use std::thread;

pub struct FetchWorker {
    sender: Sender<FetchOutcome>,
    receiver: Receiver<FetchOutcome>,
    in_flight: usize,
}

impl FetchWorker {
    pub fn new() -> Self {
        let (sender, receiver) = channel();
        Self {
            sender,
            receiver,
            in_flight: 0,
        }
    }

    /// Number of fetches started but not yet polled.
    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    /// Runs `request` on a background thread.
    pub fn dispatch(
        &mut self,
        backend: Arc<dyn GuideBackend>,
        request: FetchRequest,
        ctx: &egui::Context,
    ) {
        tracing::debug!(?request, "dispatching fetch");
        let sender = self.sender.clone();
        let ctx_handle = ctx.clone();
        self.in_flight += 1;

        thread::spawn(move || {
            let outcome = request.execute(&*backend);
            let _ = sender.send(outcome);
            ctx_handle.request_repaint();
        });
    }

    /// Drains the outcomes that have arrived since the last poll.
    pub fn poll(&mut self) -> Vec<FetchOutcome> {
        let outcomes: Vec<FetchOutcome> = self.receiver.try_iter().collect();
        self.in_flight = self.in_flight.saturating_sub(outcomes.len());
        outcomes
    }
}

impl Default for FetchWorker {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use guidegrid::{SyntheticGuide, TimeWindow};
    use std::time::{Duration, Instant};

    fn poll_until(worker: &mut FetchWorker, count: usize) -> Vec<FetchOutcome> {
        let deadline = Instant::now() + Duration::from_secs(10);
        let mut outcomes = Vec::new();
        while outcomes.len() < count && Instant::now() < deadline {
            outcomes.extend(worker.poll());
            thread::sleep(Duration::from_millis(5));
        }
        outcomes
    }

    #[test]
    fn test_dispatch_returns_every_outcome() {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 10, 0, 0).unwrap();
        let backend: Arc<dyn GuideBackend> =
            Arc::new(SyntheticGuide::with_config(start, 8, 6, 1).generate().into_backend());
        let ctx = egui::Context::default();
        let mut worker = FetchWorker::new();

        let window = TimeWindow::from_hours(start, 4).unwrap();
        worker.dispatch(backend.clone(), FetchRequest::Channels { token: 1 }, &ctx);
        worker.dispatch(backend.clone(), FetchRequest::Guide { generation: 3, window }, &ctx);
        worker.dispatch(backend, FetchRequest::Recordings { token: 2 }, &ctx);
        assert_eq!(worker.in_flight(), 3);

        let outcomes = poll_until(&mut worker, 3);
        assert_eq!(outcomes.len(), 3);
        assert_eq!(worker.in_flight(), 0);
        assert!(outcomes
            .iter()
            .any(|o| matches!(o, FetchOutcome::Guide { generation: 3, result: Ok(_), .. })));
        assert!(outcomes.iter().any(|o| {
            matches!(o, FetchOutcome::Channels { token: 1, result: Ok(c) } if c.len() == 8)
        }));
    }

    #[test]
    fn test_poll_when_idle_is_empty() {
        let mut worker = FetchWorker::new();
        assert!(worker.poll().is_empty());
    }
}
