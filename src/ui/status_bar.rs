//! Status bar UI rendering
//!
//! Shows where the guide came from, channel and program counts, and fetch
//! activity.

use eframe::egui;
use egui::RichText;

use crate::app::AppState;
use crate::io::FetchWorker;

/// Renders the status bar at the bottom of the window
pub fn render_status_bar(ui: &mut egui::Ui, state: &AppState, worker: &FetchWorker) {
    let colors = state.theme.colors();

    ui.horizontal(|ui| {
        let Some(source) = state.source() else {
            ui.label(RichText::new("No guide loaded").strong());
            return;
        };
        ui.label(RichText::new(source.to_string()).strong());
        ui.label(RichText::new("|").strong());

        let guide = &state.guide;
        ui.label(format!("Channels: {} / {}", guide.filtered_len(), guide.channels().len()));
        ui.label(RichText::new("|").strong());
        ui.label(format!("Programs: {}", guide.guide().program_count()));
        ui.label(RichText::new("|").strong());
        ui.label(format!("Recordings: {}", guide.recording_index().len()));

        let unmapped = guide.unmapped_counts().total;
        if unmapped > 0 {
            ui.label(RichText::new("|").strong());
            ui.label(RichText::new(format!("No EPG: {}", unmapped)).color(colors.warning));
        }

        if !guide.criteria().is_empty() {
            ui.label(RichText::new("|").strong());
            ui.label(RichText::new("Filtered").color(colors.scheduled));
        }

        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            if worker.in_flight() > 0 || guide.is_loading() {
                ui.spinner();
                ui.label(format!("Fetching ({})", worker.in_flight()));
            }
        });
    });
}
