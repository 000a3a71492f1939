//! Panel orchestration and layout management.
//!
//! Lays out the header, status bar, details panel, guide grid and mapping
//! dialog, and funnels their interactions into one result for the app.

use crate::app::{AppState, Navigation};
use crate::io::{AsyncLoader, FetchWorker};
use crate::ui::details_panel::{self, DetailsInteraction};
use crate::ui::guide_panel::{self, GuidePanelInteraction};
use crate::ui::header::{self, HeaderInteraction};
use crate::ui::mapping_panel::{self, MappingInteraction};
use crate::ui::status_bar;
use guidegrid::{ChannelId, ProgramId};

/// Result of panel interactions that need to be handled by the application coordinator.
pub enum PanelInteraction {
    OpenFileRequested(std::path::PathBuf),
    OpenSyntheticRequested,
    Navigate(Navigation),
    ProgramClicked {
        channel_id: ChannelId,
        program_id: ProgramId,
    },
    SelectionCleared,
    ScheduleRequested {
        channel_id: ChannelId,
        program_id: ProgramId,
        series: bool,
    },
    CancelRequested {
        channel_id: ChannelId,
        program_id: ProgramId,
    },
    MutationErrorDismissed,
    MappingRequested {
        channel_id: ChannelId,
    },
    MapRequested {
        channel_id: ChannelId,
        epg_source_id: i64,
        epg_channel_id: String,
    },
    UnmapRequested {
        channel_id: ChannelId,
    },
    MappingClosed,
    RetryRequested,
}

/// Manages the layout and rendering of all UI panels.
pub struct PanelManager;

impl PanelManager {
    /// Renders all panels. Called from `eframe::App::update()`.
    pub fn render_all_panels(
        ctx: &egui::Context,
        state: &mut AppState,
        loader: &AsyncLoader,
        worker: &FetchWorker,
    ) -> Option<PanelInteraction> {
        let mut interaction: Option<PanelInteraction> = None;
        let colors = state.theme.colors().clone();

        egui::TopBottomPanel::top("header").show(ctx, |ui| {
            if let Some(header_interaction) = header::render_header(ui, state) {
                interaction = Some(match header_interaction {
                    HeaderInteraction::OpenFileRequested(path) => {
                        PanelInteraction::OpenFileRequested(path)
                    }
                    HeaderInteraction::OpenSyntheticRequested => {
                        PanelInteraction::OpenSyntheticRequested
                    }
                    HeaderInteraction::Navigate(navigation) => {
                        PanelInteraction::Navigate(navigation)
                    }
                });
            }
        });

        egui::TopBottomPanel::bottom("status_panel").show(ctx, |ui| {
            status_bar::render_status_bar(ui, state, worker);
        });

        egui::TopBottomPanel::bottom("details_panel")
            .default_height(ctx.content_rect().height() * state.layout.details_ratio())
            .resizable(true)
            .show(ctx, |ui| {
                egui::Frame::default().inner_margin(4.0).show(ui, |ui| {
                    let details_interaction =
                        details_panel::render_details_panel(ui, state, &colors);
                    if let Some(details_interaction) = details_interaction {
                        interaction = Some(match details_interaction {
                            DetailsInteraction::ScheduleRequested {
                                channel_id,
                                program_id,
                                series,
                            } => PanelInteraction::ScheduleRequested {
                                channel_id,
                                program_id,
                                series,
                            },
                            DetailsInteraction::CancelRequested { channel_id, program_id } => {
                                PanelInteraction::CancelRequested { channel_id, program_id }
                            }
                            DetailsInteraction::SelectionCleared => {
                                PanelInteraction::SelectionCleared
                            }
                            DetailsInteraction::MutationErrorDismissed => {
                                PanelInteraction::MutationErrorDismissed
                            }
                        });
                    }
                });
            });

        let guide_frame = egui::Frame::default()
            .inner_margin(egui::Margin::same(4))
            .fill(ctx.style().visuals.panel_fill);

        egui::CentralPanel::default().frame(guide_frame).show(ctx, |ui| {
            let guide_interaction =
                guide_panel::render_guide_panel(ui, ctx, state, loader, &colors);
            if let Some(guide_interaction) = guide_interaction {
                interaction = Some(match guide_interaction {
                    GuidePanelInteraction::ProgramClicked { channel_id, program_id } => {
                        PanelInteraction::ProgramClicked { channel_id, program_id }
                    }
                    GuidePanelInteraction::MappingRequested { channel_id } => {
                        PanelInteraction::MappingRequested { channel_id }
                    }
                    GuidePanelInteraction::RetryRequested => PanelInteraction::RetryRequested,
                });
            }
        });

        let mapping_interaction = mapping_panel::render_mapping_window(ctx, state, &colors);
        if let Some(mapping_interaction) = mapping_interaction {
            interaction = Some(match mapping_interaction {
                MappingInteraction::MapRequested {
                    channel_id,
                    epg_source_id,
                    epg_channel_id,
                } => PanelInteraction::MapRequested {
                    channel_id,
                    epg_source_id,
                    epg_channel_id,
                },
                MappingInteraction::UnmapRequested { channel_id } => {
                    PanelInteraction::UnmapRequested { channel_id }
                }
                MappingInteraction::Closed => PanelInteraction::MappingClosed,
            });
        }

        interaction
    }
}
