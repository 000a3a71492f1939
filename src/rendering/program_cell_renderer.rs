//! Program cell rendering
//!
//! Paints one guide row: its program cells with title, airing time and
//! badges, or the placeholder shown when the row has nothing to lay out.

use chrono::FixedOffset;
use eframe::egui;
use guidegrid::{with_alpha, GuideCell, RowCells, ThemeColors};

use crate::presentation::color_mapping;
use crate::utils::format_span;

const CELL_GAP: f32 = 1.0;
const CELL_ROUNDING: f32 = 3.0;
const STRIPE_WIDTH: f32 = 3.0;
const TEXT_PADDING: f32 = 6.0;
/// Cells narrower than this get no text
const MIN_TEXT_WIDTH: f32 = 24.0;

/// Renders a guide row's content.
///
/// # Arguments
/// * `painter` - Painter clipped to the visible body
/// * `row_rect` - Row rect; its left edge is x = 0 of the time axis
/// * `cells` - Laid-out row content
/// * `offset` - Zone the airing times are shown in
/// * `colors` - Color palette for the current theme
pub fn render_row(
    painter: &egui::Painter,
    row_rect: egui::Rect,
    cells: &RowCells<'_>,
    offset: FixedOffset,
    colors: &ThemeColors,
) {
    match cells {
        RowCells::Programs(cells) => {
            let clip = painter.clip_rect();
            for cell in cells {
                let rect = cell_rect(row_rect, cell);
                if rect.right() < clip.left() || rect.left() > clip.right() {
                    continue;
                }
                render_cell(painter, rect, cell, offset, colors);
            }
        }
        RowCells::Pending => {
            let rect = row_rect.shrink2(egui::vec2(0.0, CELL_GAP * 4.0));
            painter.rect_filled(rect, CELL_ROUNDING, with_alpha(colors.placeholder, 40));
        }
        RowCells::NoProgramsInWindow => {
            render_placeholder(painter, row_rect, "No programs in this window", colors);
        }
        RowCells::NoGuideData => render_placeholder(painter, row_rect, "No guide data", colors),
    }
}

/// Screen rect of a cell within its row.
pub fn cell_rect(row_rect: egui::Rect, cell: &GuideCell<'_>) -> egui::Rect {
    egui::Rect::from_min_size(
        egui::pos2(row_rect.left() + cell.cell.start_offset_px, row_rect.top() + CELL_GAP),
        egui::vec2(
            (cell.cell.width_px - CELL_GAP).max(1.0),
            row_rect.height() - CELL_GAP * 2.0,
        ),
    )
}

fn render_cell(
    painter: &egui::Painter,
    rect: egui::Rect,
    cell: &GuideCell<'_>,
    offset: FixedOffset,
    colors: &ThemeColors,
) {
    let program = cell.cell.program;

    painter.rect_filled(rect, CELL_ROUNDING, color_mapping::cell_fill(cell.airing, colors));
    let border = if cell.selected {
        egui::Stroke::new(2.0, colors.now_line)
    } else {
        egui::Stroke::new(1.0, colors.cell_border)
    };
    painter.rect_stroke(rect, CELL_ROUNDING, border, egui::StrokeKind::Inside);

    if !cell.cell.clipped_start {
        let stripe_size = egui::vec2(STRIPE_WIDTH.min(rect.width()), rect.height());
        let stripe = egui::Rect::from_min_size(rect.min, stripe_size);
        let stripe_color = color_mapping::category_color(program.category.as_deref(), colors);
        painter.rect_filled(stripe, CELL_ROUNDING, stripe_color);
    }

    if let Some(recording) = cell.recording {
        let center = egui::pos2(rect.right() - 8.0, rect.top() + 8.0);
        let dot = color_mapping::recording_color(recording.status, colors);
        painter.circle_filled(center, 4.0, dot);
        if recording.series {
            painter.circle_stroke(center, 6.0, egui::Stroke::new(1.0, dot));
        }
    }

    if rect.width() < MIN_TEXT_WIDTH {
        return;
    }

    // Keep the title readable when the cell starts before the visible area
    let clip = painter.clip_rect();
    let text_left = rect.left().max(clip.left()) + TEXT_PADDING;
    let badge_width = if cell.recording.is_some() { 14.0 } else { 0.0 };
    let text_width = rect.right() - text_left - TEXT_PADDING - badge_width;
    if text_width <= 0.0 {
        return;
    }

    let prefix = if cell.cell.clipped_start { "‹ " } else { "" };
    let title_font = egui::FontId::proportional(13.0);
    let title = format!("{}{}", prefix, program.title);
    let title = truncate_to_width(painter, &title, text_width, &title_font);
    painter.text(
        egui::pos2(text_left, rect.top() + TEXT_PADDING),
        egui::Align2::LEFT_TOP,
        title,
        title_font,
        colors.text,
    );

    let detail_font = egui::FontId::proportional(11.0);
    let mut detail = format_span(program.start, program.end, offset);
    if program.flags.is_live {
        detail.push_str("  LIVE");
    }
    if program.flags.is_new {
        detail.push_str("  NEW");
    }
    if program.flags.is_premiere {
        detail.push_str("  PREMIERE");
    }
    if program.flags.is_finale {
        detail.push_str("  FINALE");
    }
    let detail = truncate_to_width(painter, &detail, text_width, &detail_font);
    painter.text(
        egui::pos2(text_left, rect.top() + TEXT_PADDING + 18.0),
        egui::Align2::LEFT_TOP,
        detail,
        detail_font,
        if program.flags.is_live { colors.live } else { colors.text_dim },
    );

    if let Some(subtitle) = program.subtitle.as_deref() {
        if rect.height() > 60.0 {
            let font = egui::FontId::proportional(11.0);
            painter.text(
                egui::pos2(text_left, rect.top() + TEXT_PADDING + 34.0),
                egui::Align2::LEFT_TOP,
                truncate_to_width(painter, subtitle, text_width, &font),
                font,
                colors.text_dim,
            );
        }
    }
}

fn render_placeholder(
    painter: &egui::Painter,
    row_rect: egui::Rect,
    text: &str,
    colors: &ThemeColors,
) {
    let clip = painter.clip_rect();
    let x = row_rect.left().max(clip.left()) + TEXT_PADDING * 2.0;
    painter.text(
        egui::pos2(x, row_rect.center().y),
        egui::Align2::LEFT_CENTER,
        text,
        egui::FontId::proportional(12.0),
        colors.placeholder,
    );
}

/// Shortens `text` with ".." until it fits `max_width`.
pub fn truncate_to_width(
    painter: &egui::Painter,
    text: &str,
    max_width: f32,
    font_id: &egui::FontId,
) -> String {
    let width_of = |s: String| {
        painter
            .layout_no_wrap(s, font_id.clone(), egui::Color32::WHITE)
            .size()
            .x
    };

    if width_of(text.to_string()) <= max_width {
        return text.to_string();
    }
    let available = max_width - width_of("..".to_string());
    if available <= 0.0 {
        return String::new();
    }

    // Binary search the longest fitting prefix
    let chars: Vec<char> = text.chars().collect();
    let (mut low, mut high) = (0, chars.len());
    while low < high {
        let mid = (low + high + 1) / 2;
        if width_of(chars[..mid].iter().collect()) <= available {
            low = mid;
        } else {
            high = mid - 1;
        }
    }

    let mut result: String = chars[..low].iter().collect();
    result.push_str("..");
    result
}
