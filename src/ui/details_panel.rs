//! Details panel UI rendering
//!
//! Shows the selected program with its airing time, flags, recording state
//! and the recording actions available for it.

use chrono::FixedOffset;
use eframe::egui;
use egui::{RichText, ScrollArea};
use guidegrid::{ChannelId, ProgramAction, ProgramDetail, ProgramId, RecordingStatus, ThemeColors};

use crate::app::AppState;
use crate::presentation::color_mapping;
use crate::utils::{format_duration_minutes, format_span};

/// Result of user interaction with the details panel
pub enum DetailsInteraction {
    ScheduleRequested {
        channel_id: ChannelId,
        program_id: ProgramId,
        series: bool,
    },
    CancelRequested {
        channel_id: ChannelId,
        program_id: ProgramId,
    },
    SelectionCleared,
    MutationErrorDismissed,
}

/// Renders the details panel for the selected program
pub fn render_details_panel(
    ui: &mut egui::Ui,
    state: &AppState,
    colors: &ThemeColors,
) -> Option<DetailsInteraction> {
    let mut interaction = None;

    if let Some(error) = state.guide.mutation_error() {
        ui.horizontal(|ui| {
            ui.colored_label(colors.error, error.to_string());
            if ui.small_button("Dismiss").clicked() {
                interaction = Some(DetailsInteraction::MutationErrorDismissed);
            }
        });
        ui.separator();
    }

    let Some(detail) = state.guide.selected_detail() else {
        ui.label(RichText::new("Select a program to see its details").color(colors.text_dim));
        return interaction;
    };
    let offset = state.guide.axis().utc_offset();

    ui.horizontal(|ui| {
        ui.label(RichText::new(&detail.program.title).strong().size(16.0));
        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            if ui.small_button("✖").clicked() {
                interaction = Some(DetailsInteraction::SelectionCleared);
            }
        });
    });

    ScrollArea::vertical()
        .id_salt("details_scroll_area")
        .auto_shrink([false, false])
        .show(ui, |ui| {
            render_summary(ui, &detail, offset, colors);
            ui.add_space(6.0);
            if let Some(action) = render_actions(ui, &detail) {
                interaction = Some(action);
            }
        });

    interaction
}

fn render_summary(
    ui: &mut egui::Ui,
    detail: &ProgramDetail,
    offset: FixedOffset,
    colors: &ThemeColors,
) {
    let program = &detail.program;

    if let Some(subtitle) = &program.subtitle {
        ui.label(RichText::new(subtitle).italics());
    }
    ui.horizontal_wrapped(|ui| {
        ui.label(format!("{} {}", detail.channel.number, detail.channel.name));
        ui.label(RichText::new("|").color(colors.text_dim));
        ui.label(format!(
            "{} ({})",
            format_span(program.start, program.end, offset),
            format_duration_minutes(program.duration_minutes())
        ));
        if let Some(category) = &program.category {
            ui.label(RichText::new("|").color(colors.text_dim));
            ui.colored_label(color_mapping::category_color(Some(category), colors), category);
        }
        if detail.airing {
            ui.colored_label(colors.cell_airing, "ON NOW");
        }
        if program.flags.is_live {
            ui.colored_label(colors.live, "LIVE");
        }
        if program.flags.is_new {
            ui.colored_label(colors.new, "NEW");
        }
        if program.flags.is_premiere {
            ui.colored_label(colors.new, "PREMIERE");
        }
        if program.flags.is_finale {
            ui.colored_label(colors.warning, "FINALE");
        }
    });

    if let Some(recording) = detail.recording {
        let label = match recording.status {
            RecordingStatus::Recording => "Recording now",
            RecordingStatus::Scheduled if recording.series => "Series recording scheduled",
            RecordingStatus::Scheduled => "Recording scheduled",
            RecordingStatus::Completed => "Recorded",
            RecordingStatus::Failed => "Recording failed",
            RecordingStatus::Cancelled => "Recording cancelled",
        };
        ui.colored_label(color_mapping::recording_color(recording.status, colors), label);
    }

    if let Some(description) = &program.description {
        ui.add_space(4.0);
        ui.label(description);
    }
}

fn render_actions(ui: &mut egui::Ui, detail: &ProgramDetail) -> Option<DetailsInteraction> {
    let channel_id = detail.channel.id;
    let program_id = detail.program.id;
    let mut interaction = None;

    ui.horizontal(|ui| {
        for action in &detail.actions {
            let clicked = match action {
                ProgramAction::Schedule => ui.button("⏺ Record").clicked(),
                ProgramAction::ScheduleSeries => ui.button("⏺ Record series").clicked(),
                ProgramAction::Cancel { .. } => ui.button("⏹ Cancel recording").clicked(),
            };
            if !clicked {
                continue;
            }
            interaction = Some(match action {
                ProgramAction::Schedule => DetailsInteraction::ScheduleRequested {
                    channel_id,
                    program_id,
                    series: false,
                },
                ProgramAction::ScheduleSeries => DetailsInteraction::ScheduleRequested {
                    channel_id,
                    program_id,
                    series: true,
                },
                ProgramAction::Cancel { .. } => {
                    DetailsInteraction::CancelRequested { channel_id, program_id }
                }
            });
        }
        if detail.actions.is_empty() && !detail.upcoming {
            ui.weak("Recording actions are only available for upcoming programs");
        }
    });

    interaction
}
