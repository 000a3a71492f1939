//! Program guide viewer GUI application
//!
//! An interactive time-grid program guide built on egui:
//! - Channel sidebar, time header and program body kept in scroll lockstep
//! - Virtualized rows, so guides with thousands of channels stay smooth
//! - Window navigation (previous/next, now, jump to date) with background fetches
//! - Channel filters by group, source, search text and missing EPG data
//! - Recording scheduling and EPG channel mapping
//! - Multiple themes with persistent preferences

#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

use eframe::egui;
use guidegrid::{FilterCriteria, GuideConfig, GuideError, SystemClock};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

mod utils;
mod presentation;
mod io;
mod app;
mod rendering;
mod ui;
mod state;

use app::{AppState, ApplicationCoordinator, SettingsCoordinator, ThemeCoordinator};
use io::{AsyncLoader, FetchWorker};
use ui::panel_manager::{PanelInteraction, PanelManager};

const SIDEBAR_WIDTH_KEY: &str = "sidebar_width";
const FILTER_CRITERIA_KEY: &str = "filter_criteria";

fn main() -> eframe::Result {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Optional guide file to open on startup
    let initial_file = std::env::args().nth(1).map(PathBuf::from);

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 800.0])
            .with_title("Program Guide"),
        ..Default::default()
    };

    eframe::run_native(
        "Program Guide",
        options,
        Box::new(move |cc| Ok(Box::new(GuideViewerApp::new(cc, initial_file)?))),
    )
}

/// The guide viewer application.
///
/// Delegates to coordinators:
/// - `ApplicationCoordinator` handles loading, fetches and user actions
/// - `ThemeCoordinator` handles theme persistence and application
/// - `PanelManager` handles panel layout and rendering
struct GuideViewerApp {
    state: AppState,
    /// Background guide file loader
    loader: AsyncLoader,
    /// Background fetch runner
    worker: FetchWorker,
    /// File to load on the first frame
    pending_file_load: Option<PathBuf>,
}

impl GuideViewerApp {
    /// Creates the viewer with config from disk and preferences from storage.
    fn new(
        cc: &eframe::CreationContext,
        initial_file: Option<PathBuf>,
    ) -> Result<Self, GuideError> {
        let mut config = GuideConfig::load_or_default();
        let saved_width =
            SettingsCoordinator::try_load_setting::<f32>(cc.storage, SIDEBAR_WIDTH_KEY);
        if let Some(width) = saved_width {
            config.sidebar_width_px = width;
        }

        let theme_name = ThemeCoordinator::load_theme_from_storage(cc.storage);
        let mut state = AppState::new(config, Arc::new(SystemClock), theme_name)?;

        let criteria: FilterCriteria =
            SettingsCoordinator::load_setting(cc.storage, FILTER_CRITERIA_KEY);
        state.guide.set_criteria(criteria);

        Ok(Self {
            state,
            loader: AsyncLoader::new(),
            worker: FetchWorker::new(),
            pending_file_load: initial_file,
        })
    }

    fn save_preferences(&self, storage: &mut dyn eframe::Storage) {
        ThemeCoordinator::save_theme_to_storage(storage, self.state.theme.current_theme_name());
        let sidebar_width = self.state.layout.sidebar_width();
        SettingsCoordinator::save_setting(storage, SIDEBAR_WIDTH_KEY, &sidebar_width);
        let criteria = self.state.guide.criteria();
        SettingsCoordinator::save_setting(storage, FILTER_CRITERIA_KEY, criteria);
    }

    /// Handles panel interactions by delegating to ApplicationCoordinator.
    fn handle_panel_interaction(&mut self, interaction: PanelInteraction, ctx: &egui::Context) {
        let state = &mut self.state;
        match interaction {
            PanelInteraction::OpenFileRequested(path) => {
                ApplicationCoordinator::open_file(state, &mut self.loader, path, ctx);
            }
            PanelInteraction::OpenSyntheticRequested => {
                ApplicationCoordinator::open_synthetic(state, &mut self.loader);
            }
            PanelInteraction::Navigate(navigation) => {
                ApplicationCoordinator::navigate(state, navigation);
            }
            PanelInteraction::ProgramClicked { channel_id, program_id } => {
                ApplicationCoordinator::handle_program_clicked(state, channel_id, program_id);
            }
            PanelInteraction::SelectionCleared => state.guide.clear_selection(),
            PanelInteraction::ScheduleRequested { channel_id, program_id, series } => {
                ApplicationCoordinator::schedule_recording(state, channel_id, program_id, series);
            }
            PanelInteraction::CancelRequested { channel_id, program_id } => {
                ApplicationCoordinator::cancel_recording(state, channel_id, program_id);
            }
            PanelInteraction::MutationErrorDismissed => state.guide.clear_mutation_error(),
            PanelInteraction::MappingRequested { channel_id } => {
                ApplicationCoordinator::open_mapping(state, channel_id);
            }
            PanelInteraction::MapRequested { channel_id, epg_source_id, epg_channel_id } => {
                ApplicationCoordinator::map_channel(
                    state,
                    channel_id,
                    epg_source_id,
                    &epg_channel_id,
                );
            }
            PanelInteraction::UnmapRequested { channel_id } => {
                ApplicationCoordinator::unmap_channel(state, channel_id);
            }
            PanelInteraction::MappingClosed => state.mapping.close(),
            PanelInteraction::RetryRequested => ApplicationCoordinator::retry(state),
        }
    }
}

impl eframe::App for GuideViewerApp {
    fn save(&mut self, storage: &mut dyn eframe::Storage) {
        self.save_preferences(storage);
    }

    /// Main update loop:
    /// 1. Pick up finished loads and fetches
    /// 2. Advance the now line
    /// 3. Apply the theme and render all panels
    /// 4. Handle interactions, then start whatever fetches they queued
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        ApplicationCoordinator::check_loading_completion(&mut self.state, &mut self.loader);
        ApplicationCoordinator::poll_fetches(&mut self.state, &mut self.worker);
        self.state.guide.tick();

        ThemeCoordinator::apply_current_theme(ctx, &self.state);

        if let Some(path) = self.pending_file_load.take() {
            ApplicationCoordinator::open_file(&mut self.state, &mut self.loader, path, ctx);
        }

        let interaction =
            PanelManager::render_all_panels(ctx, &mut self.state, &self.loader, &self.worker);
        if let Some(interaction) = interaction {
            self.handle_panel_interaction(interaction, ctx);
        }

        ApplicationCoordinator::dispatch_fetches(&mut self.state, &mut self.worker, ctx);

        // Wake up again when the now line is due to move
        ctx.request_repaint_after(self.state.guide.next_tick_in());
    }
}
