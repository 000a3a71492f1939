//! EPG mapping dialog
//!
//! Lists the EPG channels a guide channel can be mapped to. Mapping or
//! unmapping refetches the guide so the channel's row updates.

use eframe::egui;
use egui::{RichText, ScrollArea};
use guidegrid::{ChannelId, ThemeColors};

use crate::app::AppState;

/// Result of user interaction with the mapping dialog
pub enum MappingInteraction {
    MapRequested {
        channel_id: ChannelId,
        epg_source_id: i64,
        epg_channel_id: String,
    },
    UnmapRequested { channel_id: ChannelId },
    Closed,
}

/// Renders the mapping dialog when it is open
pub fn render_mapping_window(
    ctx: &egui::Context,
    state: &mut AppState,
    colors: &ThemeColors,
) -> Option<MappingInteraction> {
    let channel_id = state.mapping.channel_id()?;
    let channel = state.guide.channels().iter().find(|c| c.id == channel_id)?.clone();
    let mut interaction = None;
    let mut open = true;

    egui::Window::new(format!("Map EPG: {} {}", channel.number, channel.name))
        .id(egui::Id::new("mapping_window"))
        .open(&mut open)
        .collapsible(false)
        .default_width(360.0)
        .show(ctx, |ui| {
            if channel.epg_mapped {
                ui.horizontal(|ui| {
                    ui.label(format!("Mapped to {}", channel.channel_id));
                    if ui.button("Unmap").clicked() {
                        interaction = Some(MappingInteraction::UnmapRequested { channel_id });
                    }
                });
            } else {
                ui.colored_label(colors.warning, "This channel has no EPG mapping");
            }
            if let Some(error) = state.guide.mutation_error() {
                ui.colored_label(colors.error, error.to_string());
            }
            ui.separator();

            ui.horizontal(|ui| {
                ui.label("Search:");
                ui.text_edit_singleline(state.mapping.search_mut());
            });

            let total = state.mapping.candidate_count();
            ScrollArea::vertical()
                .id_salt("mapping_candidates")
                .max_height(320.0)
                .show(ui, |ui| {
                    let mut shown = 0;
                    for candidate in state.mapping.visible_candidates() {
                        shown += 1;
                        ui.horizontal(|ui| {
                            if ui.button("Map").clicked() {
                                interaction = Some(MappingInteraction::MapRequested {
                                    channel_id,
                                    epg_source_id: candidate.epg_source_id,
                                    epg_channel_id: candidate.epg_channel_id.clone(),
                                });
                            }
                            ui.label(&candidate.name);
                            let id = RichText::new(&candidate.epg_channel_id)
                                .color(colors.text_dim)
                                .monospace();
                            ui.label(id);
                        });
                    }
                    if shown == 0 {
                        let text = if total == 0 {
                            "No EPG channels available"
                        } else {
                            "No matches"
                        };
                        ui.label(RichText::new(text).color(colors.text_dim));
                    }
                });
        });

    if !open {
        interaction = Some(MappingInteraction::Closed);
    }
    interaction
}
