//! Header panel UI rendering
//!
//! The toolbar: guide source buttons, window navigation, date jump, channel
//! filters and the theme selector.

use eframe::egui;
use guidegrid::Selection;
use std::path::PathBuf;

use crate::app::{AppState, Navigation};
use crate::utils::format_window;

/// Result of user interaction with the header panel
pub enum HeaderInteraction {
    /// User picked a guide file
    OpenFileRequested(PathBuf),
    /// User asked for a generated guide
    OpenSyntheticRequested,
    Navigate(Navigation),
}

/// Renders the toolbar
///
/// Filter and theme changes are applied to `state` directly; everything
/// that needs the loader or backend is returned as an interaction.
pub fn render_header(ui: &mut egui::Ui, state: &mut AppState) -> Option<HeaderInteraction> {
    let mut interaction = None;

    ui.horizontal(|ui| {
        if ui.button("📁 Open Guide").clicked() {
            let mut dialog = rfd::FileDialog::new()
                .add_filter("Guide Files", &["json"])
                .add_filter("All Files", &["*"]);

            if let Ok(cwd) = std::env::current_dir() {
                dialog = dialog.set_directory(cwd);
            }

            if let Some(path) = dialog.pick_file() {
                interaction = Some(HeaderInteraction::OpenFileRequested(path));
            }
        }

        if ui.button("🔮 Synthetic Guide").clicked() {
            interaction = Some(HeaderInteraction::OpenSyntheticRequested);
        }

        ui.separator();

        if state.backend().is_some() {
            if let Some(navigation) = render_navigation(ui, state) {
                interaction = Some(HeaderInteraction::Navigate(navigation));
            }
            ui.separator();
            render_filters(ui, state);
        }

        // Push theme selector to the right
        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            let mut current_theme = state.theme.current_theme_name().to_string();
            egui::ComboBox::from_id_salt("theme_selector")
                .selected_text(&current_theme)
                .show_ui(ui, |ui| {
                    for theme_name in state.theme.theme_manager().list_themes() {
                        ui.selectable_value(&mut current_theme, theme_name.to_string(), theme_name);
                    }
                });

            if current_theme != state.theme.current_theme_name() {
                state.theme.set_theme(current_theme);
                ui.ctx().request_repaint();
            }

            ui.label("Theme:");
        });
    });

    if let Some(err) = &state.error_message {
        ui.colored_label(state.theme.colors().error, err);
    }

    interaction
}

fn render_navigation(ui: &mut egui::Ui, state: &mut AppState) -> Option<Navigation> {
    let mut navigation = None;
    let hours = state.guide.config().window_hours;

    if ui.button("◀").on_hover_text(format!("Previous {} hours", hours)).clicked() {
        navigation = Some(Navigation::PreviousWindow);
    }
    if ui.button("Now").clicked() {
        navigation = Some(Navigation::Now);
    }
    if ui.button("▶").on_hover_text(format!("Next {} hours", hours)).clicked() {
        navigation = Some(Navigation::NextWindow);
    }

    ui.label(format_window(state.guide.window(), state.guide.axis().utc_offset()));

    let response = egui::TextEdit::singleline(state.layout.date_text_mut())
        .hint_text("YYYY-MM-DD")
        .desired_width(90.0)
        .show(ui)
        .response;
    let enter_pressed = ui.input(|i| i.key_pressed(egui::Key::Enter));
    let go = ui.button("Go").clicked();
    if (response.lost_focus() && enter_pressed) || go {
        match state.layout.parsed_date() {
            Some(date) => navigation = Some(Navigation::Date(date)),
            None => {
                state.error_message = Some(format!("Invalid date: {}", state.layout.date_text()));
            }
        }
    }

    navigation
}

fn render_filters(ui: &mut egui::Ui, state: &mut AppState) {
    let criteria = state.guide.criteria().clone();
    let unmapped = state.guide.unmapped_counts();

    let mut group = criteria.group.clone();
    egui::ComboBox::from_id_salt("group_filter")
        .selected_text(format!("Group: {}", group.label()))
        .show_ui(ui, |ui| {
            ui.selectable_value(&mut group, Selection::All, "All");
            for name in state.guide.groups() {
                let count = unmapped.for_group(&name);
                let text = if count > 0 {
                    format!("{} ({} unmapped)", name, count)
                } else {
                    name.clone()
                };
                ui.selectable_value(&mut group, Selection::Only(name), text);
            }
        });
    if group != criteria.group {
        state.guide.set_group(group);
    }

    let mut source = criteria.source.clone();
    egui::ComboBox::from_id_salt("source_filter")
        .selected_text(format!("Source: {}", source.label()))
        .show_ui(ui, |ui| {
            ui.selectable_value(&mut source, Selection::All, "All");
            for name in state.guide.sources() {
                ui.selectable_value(&mut source, Selection::Only(name.clone()), name);
            }
        });
    if source != criteria.source {
        state.guide.set_source(source);
    }

    let mut search = criteria.search.clone();
    if egui::TextEdit::singleline(&mut search)
        .hint_text("Search channels")
        .desired_width(140.0)
        .show(ui)
        .response
        .changed()
    {
        state.guide.set_search(search);
    }

    let mut unmapped_only = criteria.unmapped_only;
    let label = format!("No EPG only ({})", unmapped.total);
    if ui.checkbox(&mut unmapped_only, label).changed() {
        state.guide.set_unmapped_only(unmapped_only);
    }
}
