//! Application-level coordination and workflow management.
//!
//! Handles guide loading, running the controller's queued fetches, and the
//! user actions that need the backend (recordings and EPG mapping).

use chrono::NaiveDate;
use guidegrid::{ChannelId, GuideBackend, ProgramId};
use std::path::PathBuf;
use std::sync::Arc;

use crate::app::app_state::GuideSourceLabel;
use crate::app::AppState;
use crate::io::{AsyncLoader, FetchWorker, LoadResult};

/// Window navigation requested from the toolbar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Navigation {
    PreviousWindow,
    NextWindow,
    Now,
    Date(NaiveDate),
}

/// Coordinates application-level operations and workflows.
pub struct ApplicationCoordinator;

impl ApplicationCoordinator {
    // ===== Loading =====

    /// Starts loading a guide file in the background.
    pub fn open_file(
        state: &mut AppState,
        loader: &mut AsyncLoader,
        path: PathBuf,
        ctx: &egui::Context,
    ) {
        state.reset_source();
        loader.start_file_load(path, ctx);
    }

    /// Generates a synthetic guide and serves it right away.
    pub fn open_synthetic(state: &mut AppState, loader: &mut AsyncLoader) {
        let guide = loader.load_synthetic_guide();
        state.install_backend(guide.into_backend(), GuideSourceLabel::Synthetic);
    }

    /// Applies a finished file load. Returns true when one completed.
    pub fn check_loading_completion(state: &mut AppState, loader: &mut AsyncLoader) -> bool {
        match loader.check_completion() {
            LoadResult::Success { guide, path } => {
                let source =
                    path.map(GuideSourceLabel::File).unwrap_or(GuideSourceLabel::Synthetic);
                state.install_backend(guide.into_backend(), source);
                true
            }
            LoadResult::Error(error_msg) => {
                tracing::error!("guide load failed: {}", error_msg);
                state.error_message = Some(format!("Error loading guide: {}", error_msg));
                true
            }
            LoadResult::None => false,
        }
    }

    // ===== Fetches =====

    /// Runs the controller's queued fetches on the worker.
    ///
    /// Without a backend the requests are dropped; the next install reloads.
    pub fn dispatch_fetches(
        state: &mut AppState,
        worker: &mut FetchWorker,
        ctx: &egui::Context,
    ) -> usize {
        let requests = state.guide.take_pending_requests();
        let Some(backend) = state.backend() else {
            return 0;
        };
        let backend: Arc<dyn GuideBackend> = backend.clone();

        let count = requests.len();
        for request in requests {
            worker.dispatch(Arc::clone(&backend), request, ctx);
        }
        count
    }

    /// Applies arrived fetch outcomes. Returns true when any took effect.
    pub fn poll_fetches(state: &mut AppState, worker: &mut FetchWorker) -> bool {
        let mut applied = false;
        for outcome in worker.poll() {
            applied |= state.guide.apply(outcome);
        }
        applied
    }

    pub fn retry(state: &mut AppState) {
        state.guide.retry();
    }

    // ===== Navigation =====

    pub fn navigate(state: &mut AppState, navigation: Navigation) {
        let result = match navigation {
            Navigation::PreviousWindow => state.guide.previous_window(),
            Navigation::NextWindow => state.guide.next_window(),
            Navigation::Now => state.guide.jump_to_now(),
            Navigation::Date(date) => state.guide.jump_to_date(date),
        };
        if let Err(e) = result {
            state.error_message = Some(e.to_string());
        }
    }

    // ===== Program actions =====

    /// Selects the clicked program; clicking the selection again clears it.
    pub fn handle_program_clicked(
        state: &mut AppState,
        channel_id: ChannelId,
        program_id: ProgramId,
    ) {
        if state.guide.selection() == Some((channel_id, program_id)) {
            state.guide.clear_selection();
            return;
        }
        match state.guide.select_program(channel_id, program_id) {
            // A row clicked at the viewport edge is pulled fully into view
            Ok(_) => {
                state.guide.scroll_to_channel(channel_id);
            }
            Err(e) => tracing::warn!("selection failed: {}", e),
        }
    }

    pub fn schedule_recording(
        state: &mut AppState,
        channel_id: ChannelId,
        program_id: ProgramId,
        series: bool,
    ) {
        let Some(backend) = state.backend().cloned() else {
            return;
        };
        // Failures are surfaced through the controller's mutation error
        let _ = state.guide.schedule_recording(&*backend, channel_id, program_id, series);
    }

    pub fn cancel_recording(state: &mut AppState, channel_id: ChannelId, program_id: ProgramId) {
        let Some(backend) = state.backend().cloned() else {
            return;
        };
        let _ = state.guide.cancel_recording(&*backend, channel_id, program_id);
    }

    // ===== EPG mapping =====

    /// Opens the mapping dialog for a channel with its candidates loaded.
    pub fn open_mapping(state: &mut AppState, channel_id: ChannelId) {
        let Some(backend) = state.backend().cloned() else {
            return;
        };
        match state.guide.mapping_candidates(&*backend, channel_id) {
            Ok(candidates) => state.mapping.open(channel_id, candidates),
            Err(e) => state.error_message = Some(e.to_string()),
        }
    }

    pub fn map_channel(
        state: &mut AppState,
        channel_id: ChannelId,
        epg_source_id: i64,
        epg_channel_id: &str,
    ) {
        let Some(backend) = state.backend().cloned() else {
            return;
        };
        if state
            .guide
            .map_channel(&*backend, channel_id, epg_source_id, epg_channel_id)
            .is_ok()
        {
            state.mapping.close();
        }
    }

    pub fn unmap_channel(state: &mut AppState, channel_id: ChannelId) {
        let Some(backend) = state.backend().cloned() else {
            return;
        };
        if state.guide.unmap_channel(&*backend, channel_id).is_ok() {
            state.mapping.close();
        }
    }
}
