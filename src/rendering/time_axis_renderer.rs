//! Time axis rendering
//!
//! Draws slot tick marks and time labels in the guide header, and the
//! matching vertical grid lines behind the program cells.

use chrono::FixedOffset;
use eframe::egui;
use guidegrid::{Slot, ThemeColors};

use crate::utils::format_time;

/// Renders the time axis header.
///
/// # Arguments
/// * `painter` - Painter clipped to the visible header
/// * `content_rect` - Full header content rect; x = 0 of the axis is its left edge
/// * `slots` - Slots of the current window
/// * `offset` - Zone the labels are shown in
/// * `colors` - Color palette for the current theme
pub fn render_time_axis(
    painter: &egui::Painter,
    content_rect: egui::Rect,
    slots: &[Slot],
    offset: FixedOffset,
    colors: &ThemeColors,
) {
    painter.rect_filled(content_rect, 0.0, colors.extreme_background);

    let clip = painter.clip_rect();
    for slot in slots {
        let x = content_rect.left() + slot.offset_px;
        if x + slot.width_px < clip.left() || x > clip.right() {
            continue;
        }

        let (tick_height, stroke) = if slot.is_hour {
            (content_rect.height(), egui::Stroke::new(1.5, colors.hour_line))
        } else {
            (content_rect.height() * 0.4, egui::Stroke::new(1.0, colors.slot_line))
        };
        painter.line_segment(
            [
                egui::pos2(x, content_rect.bottom() - tick_height),
                egui::pos2(x, content_rect.bottom()),
            ],
            stroke,
        );

        let (font, color) = if slot.is_hour {
            (egui::FontId::proportional(13.0), colors.text)
        } else {
            (egui::FontId::proportional(11.0), colors.text_dim)
        };
        painter.text(
            egui::pos2(x + 4.0, content_rect.center().y),
            egui::Align2::LEFT_CENTER,
            format_time(slot.start, offset),
            font,
            color,
        );
    }

    painter.line_segment(
        [content_rect.left_bottom(), content_rect.right_bottom()],
        egui::Stroke::new(1.0, colors.border),
    );
}

/// Draws the slot grid lines behind the program rows.
///
/// # Arguments
/// * `painter` - Painter clipped to the visible body
/// * `content_rect` - Body content rect spanning all rows
/// * `slots` - Slots of the current window
/// * `colors` - Color palette for the current theme
pub fn render_slot_grid(
    painter: &egui::Painter,
    content_rect: egui::Rect,
    slots: &[Slot],
    colors: &ThemeColors,
) {
    let clip = painter.clip_rect();
    let top = clip.top().max(content_rect.top());
    let bottom = clip.bottom().min(content_rect.bottom());

    for slot in slots {
        let x = content_rect.left() + slot.offset_px;
        if x < clip.left() || x > clip.right() {
            continue;
        }
        let color = if slot.is_hour { colors.hour_line } else { colors.slot_line };
        let stroke = egui::Stroke::new(1.0, color);
        painter.line_segment([egui::pos2(x, top), egui::pos2(x, bottom)], stroke);
    }
}
