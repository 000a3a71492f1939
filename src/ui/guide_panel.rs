//! Guide panel UI rendering
//!
//! Lays out the three scroll surfaces of the guide (time header, channel
//! sidebar and program body) and feeds their scroll offsets back into the
//! controller, which keeps them in lockstep. Only the rows in the
//! controller's visible range are drawn; padding stands in for the rest.

use egui::scroll_area::ScrollBarVisibility;
use egui::{RichText, ScrollArea};
use guidegrid::{ChannelId, GuideFrame, GuideStatus, ProgramId, ScrollOffset, ThemeColors};

use crate::app::AppState;
use crate::io::AsyncLoader;
use crate::rendering::{guide_overlays, program_cell_renderer, time_axis_renderer};
use crate::utils::{format_duration_minutes, format_span};

/// Result of guide panel interactions that need to be handled by the application.
pub enum GuidePanelInteraction {
    ProgramClicked {
        channel_id: ChannelId,
        program_id: ProgramId,
    },
    /// Open the EPG mapping dialog for a channel
    MappingRequested { channel_id: ChannelId },
    RetryRequested,
}

/// Scroll offsets the surfaces reported this frame.
struct SurfaceOffsets {
    /// Body offset every surface was drawn at
    shown: ScrollOffset,
    header_x: f32,
    sidebar_y: f32,
    body: ScrollOffset,
}

/// Renders the guide grid, or the placeholder for the current status.
pub fn render_guide_panel(
    ui: &mut egui::Ui,
    ctx: &egui::Context,
    state: &mut AppState,
    loader: &AsyncLoader,
    colors: &ThemeColors,
) -> Option<GuidePanelInteraction> {
    if loader.is_loading() {
        let message = format!("Loading guide file... {:.1}s", loader.elapsed_secs());
        render_loading_indicator(ui, &message);
        ctx.request_repaint_after(std::time::Duration::from_millis(100));
        return None;
    }

    match state.guide.status() {
        GuideStatus::Idle => {
            ui.centered_and_justified(|ui| {
                ui.label("No guide loaded - open a guide file or generate a synthetic guide");
            });
            return None;
        }
        GuideStatus::Loading => {
            render_loading_indicator(ui, "Loading channels...");
            return None;
        }
        GuideStatus::Error(message) => return render_error(ui, &message, colors),
        GuideStatus::NoChannels => {
            let text = if state.guide.channels().is_empty() {
                "No channels"
            } else {
                "No channels match the current filters"
            };
            ui.centered_and_justified(|ui| {
                ui.label(RichText::new(text).color(colors.text_dim));
            });
            return None;
        }
        GuideStatus::Ready => {}
    }

    let sidebar_width = state.layout.sidebar_width();
    let header_height = state.guide.config().header_height_px;
    let full = ui.available_rect_before_wrap();
    let body_size = egui::vec2(
        (full.width() - sidebar_width).max(0.0),
        (full.height() - header_height).max(0.0),
    );
    state.guide.set_viewport(body_size.x, body_size.y);

    let corner_rect = egui::Rect::from_min_size(full.min, egui::vec2(sidebar_width, header_height));
    let header_rect = egui::Rect::from_min_size(
        full.min + egui::vec2(sidebar_width, 0.0),
        egui::vec2(body_size.x, header_height),
    );
    let sidebar_rect = egui::Rect::from_min_size(
        full.min + egui::vec2(0.0, header_height),
        egui::vec2(sidebar_width, body_size.y),
    );
    let body_rect =
        egui::Rect::from_min_size(full.min + egui::vec2(sidebar_width, header_height), body_size);
    ui.allocate_rect(full, egui::Sense::hover());

    let mut interaction = None;
    let mut clicked_at: Option<egui::Vec2> = None;

    let offsets = {
        let frame = state.guide.frame();
        render_corner(ui, corner_rect, state, colors);

        let header_x = render_header(ui, header_rect, &frame, state, colors);
        let (sidebar_y, sidebar_interaction) =
            render_sidebar(ui, sidebar_rect, &frame, state, colors);
        interaction = interaction.or(sidebar_interaction);
        let body = render_body(ui, ctx, body_rect, &frame, state, colors, &mut clicked_at);

        SurfaceOffsets {
            shown: frame.scroll,
            header_x,
            sidebar_y,
            body,
        }
    };

    if let Some(position) = clicked_at {
        if let Some((channel_id, program_id)) = state.guide.program_at(position.x, position.y) {
            interaction = Some(GuidePanelInteraction::ProgramClicked { channel_id, program_id });
        }
    }

    // Only the surface the user actually scrolled differs from `shown`
    let changed = state.guide.reconcile_scroll(
        offsets.shown,
        offsets.header_x,
        offsets.sidebar_y,
        offsets.body,
    );
    if changed {
        ctx.request_repaint();
    }

    interaction
}

fn render_corner(ui: &mut egui::Ui, rect: egui::Rect, state: &AppState, colors: &ThemeColors) {
    let painter = ui.painter_at(rect);
    painter.rect_filled(rect, 0.0, colors.extreme_background);
    painter.text(
        rect.left_center() + egui::vec2(8.0, 0.0),
        egui::Align2::LEFT_CENTER,
        format!("{} channels", state.guide.filtered_len()),
        egui::FontId::proportional(12.0),
        colors.text_dim,
    );
}

/// Time axis header, horizontal only. Returns its scroll offset.
fn render_header(
    ui: &mut egui::Ui,
    rect: egui::Rect,
    frame: &GuideFrame<'_>,
    state: &AppState,
    colors: &ThemeColors,
) -> f32 {
    let mut child = ui.new_child(egui::UiBuilder::new().max_rect(rect));
    let output = ScrollArea::horizontal()
        .id_salt("guide_header")
        .scroll_bar_visibility(ScrollBarVisibility::AlwaysHidden)
        .horizontal_scroll_offset(state.guide.scroll().header_x())
        .auto_shrink([false, false])
        .show(&mut child, |ui| {
            let (content_rect, _) = ui.allocate_exact_size(
                egui::vec2(frame.content_width, rect.height()),
                egui::Sense::hover(),
            );
            let painter = ui.painter();
            let offset = frame.axis.utc_offset();
            let slots = &frame.slots;
            time_axis_renderer::render_time_axis(painter, content_rect, slots, offset, colors);
            if frame.now.visible {
                let x = content_rect.left() + frame.now.offset_px;
                guide_overlays::render_now_marker(painter, content_rect, x, colors);
            }
        });
    output.state.offset.x
}

/// Channel sidebar, vertical only. Returns its scroll offset.
fn render_sidebar(
    ui: &mut egui::Ui,
    rect: egui::Rect,
    frame: &GuideFrame<'_>,
    state: &AppState,
    colors: &ThemeColors,
) -> (f32, Option<GuidePanelInteraction>) {
    let mut interaction = None;
    let mut child = ui.new_child(egui::UiBuilder::new().max_rect(rect));
    let output = ScrollArea::vertical()
        .id_salt("guide_sidebar")
        .scroll_bar_visibility(ScrollBarVisibility::AlwaysHidden)
        .vertical_scroll_offset(state.guide.scroll().sidebar_y())
        .auto_shrink([false, false])
        .show(&mut child, |ui| {
            ui.spacing_mut().item_spacing = egui::Vec2::ZERO;

            if frame.top_padding > 0.0 {
                ui.add_space(frame.top_padding);
            }

            for row in &frame.rows {
                let row_size = egui::vec2(rect.width(), frame.row_height);
                let (row_rect, response) = ui.allocate_exact_size(row_size, egui::Sense::click());
                let has_epg = state.guide.has_epg_data(row.channel);
                render_channel_row(ui.painter(), row_rect, row.index, row.channel, has_epg, colors);

                let channel_id = row.channel.id;
                if response.clicked() && !has_epg {
                    interaction = Some(GuidePanelInteraction::MappingRequested { channel_id });
                }
                response.context_menu(|ui| {
                    if ui.button("Map EPG channel...").clicked() {
                        interaction = Some(GuidePanelInteraction::MappingRequested { channel_id });
                        ui.close();
                    }
                });
            }

            if frame.bottom_padding > 0.0 {
                ui.add_space(frame.bottom_padding);
            }
        });
    (output.state.offset.y, interaction)
}

fn render_channel_row(
    painter: &egui::Painter,
    rect: egui::Rect,
    index: usize,
    channel: &guidegrid::Channel,
    has_epg: bool,
    colors: &ThemeColors,
) {
    let fill = if index % 2 == 0 { colors.panel_background } else { colors.row_stripe };
    painter.rect_filled(rect, 0.0, fill);
    let divider = egui::Stroke::new(1.0, colors.slot_line);
    painter.line_segment([rect.left_bottom(), rect.right_bottom()], divider);

    let left = rect.left() + 8.0;
    painter.text(
        egui::pos2(left, rect.top() + 8.0),
        egui::Align2::LEFT_TOP,
        &channel.number,
        egui::FontId::monospace(12.0),
        colors.text_dim,
    );
    let name_font = egui::FontId::proportional(13.0);
    let name_width = rect.width() - 56.0;
    let name =
        program_cell_renderer::truncate_to_width(painter, &channel.name, name_width, &name_font);
    painter.text(
        egui::pos2(left + 40.0, rect.top() + 8.0),
        egui::Align2::LEFT_TOP,
        name,
        name_font,
        colors.text,
    );
    painter.text(
        egui::pos2(left + 40.0, rect.top() + 26.0),
        egui::Align2::LEFT_TOP,
        &channel.group,
        egui::FontId::proportional(11.0),
        colors.text_dim,
    );

    if !has_epg {
        painter.text(
            egui::pos2(left + 40.0, rect.bottom() - 8.0),
            egui::Align2::LEFT_BOTTOM,
            "No EPG - click to map",
            egui::FontId::proportional(11.0),
            colors.warning,
        );
    }
}

/// Program body, both axes. Returns its scroll offset.
fn render_body(
    ui: &mut egui::Ui,
    ctx: &egui::Context,
    rect: egui::Rect,
    frame: &GuideFrame<'_>,
    state: &AppState,
    colors: &ThemeColors,
    clicked_at: &mut Option<egui::Vec2>,
) -> ScrollOffset {
    let offset = frame.axis.utc_offset();
    let mut child = ui.new_child(egui::UiBuilder::new().max_rect(rect));
    let output = ScrollArea::both()
        .id_salt("guide_body")
        .scroll_offset(egui::vec2(frame.scroll.x, frame.scroll.y))
        .auto_shrink([false, false])
        .show(&mut child, |ui| {
            let (content_rect, response) = ui.allocate_exact_size(
                egui::vec2(frame.content_width, frame.content_height),
                egui::Sense::click(),
            );
            let painter = ui.painter();

            for row in &frame.rows {
                let row_rect = egui::Rect::from_min_size(
                    content_rect.min + egui::vec2(0.0, row.top_px),
                    egui::vec2(frame.content_width, frame.row_height),
                );
                if row.index % 2 == 1 {
                    painter.rect_filled(row_rect, 0.0, colors.row_stripe);
                }
            }
            time_axis_renderer::render_slot_grid(painter, content_rect, &frame.slots, colors);
            for row in &frame.rows {
                let row_rect = egui::Rect::from_min_size(
                    content_rect.min + egui::vec2(0.0, row.top_px),
                    egui::vec2(frame.content_width, frame.row_height),
                );
                program_cell_renderer::render_row(painter, row_rect, &row.cells, offset, colors);
            }

            if response.clicked() {
                *clicked_at = response.interact_pointer_pos().map(|pos| pos - content_rect.min);
            }

            let hovered = response
                .hover_pos()
                .map(|pos| pos - content_rect.min)
                .and_then(|pos| state.guide.program_at(pos.x, pos.y))
                .and_then(|(channel_id, program_id)| {
                    state.guide.program_detail(channel_id, program_id).ok()
                });
            if let Some(detail) = hovered {
                response.on_hover_ui_at_pointer(|ui| {
                    let program = &detail.program;
                    ui.label(RichText::new(&program.title).strong());
                    if let Some(subtitle) = &program.subtitle {
                        ui.label(subtitle);
                    }
                    ui.label(format!(
                        "{} ({})",
                        format_span(program.start, program.end, offset),
                        format_duration_minutes(program.duration_minutes())
                    ));
                    ui.label(RichText::new(&detail.channel.name).color(colors.text_dim));
                });
            }
        });

    if frame.now.visible {
        let x = output.inner_rect.left() + frame.now.offset_px - output.state.offset.x;
        guide_overlays::render_now_line(ctx, output.inner_rect, x, colors);
    }

    ScrollOffset::new(output.state.offset.x, output.state.offset.y)
}

fn render_error(
    ui: &mut egui::Ui,
    message: &str,
    colors: &ThemeColors,
) -> Option<GuidePanelInteraction> {
    let mut interaction = None;
    ui.vertical_centered(|ui| {
        ui.add_space(ui.available_height() * 0.3);
        ui.label(RichText::new(message).color(colors.error));
        ui.add_space(8.0);
        if ui.button("Retry").clicked() {
            interaction = Some(GuidePanelInteraction::RetryRequested);
        }
    });
    interaction
}

fn render_loading_indicator(ui: &mut egui::Ui, text: &str) {
    ui.vertical_centered(|ui| {
        ui.add_space(ui.available_height() * 0.3);
        ui.spinner();
        ui.label(text);
    });
}
