//! Guide overlays: the now line over the program body and its marker in
//! the time header.

use eframe::egui;
use guidegrid::ThemeColors;

/// Draws the vertical now line across the visible body.
///
/// # Arguments
/// * `ctx` - The egui context, for a painter on top of the cells
/// * `clip_rect` - Visible body area
/// * `x` - Screen x of the current time
/// * `colors` - Color palette for the current theme
pub fn render_now_line(ctx: &egui::Context, clip_rect: egui::Rect, x: f32, colors: &ThemeColors) {
    if x < clip_rect.left() || x > clip_rect.right() {
        return;
    }
    let painter = ctx.debug_painter().with_clip_rect(clip_rect);
    painter.line_segment(
        [egui::pos2(x, clip_rect.top()), egui::pos2(x, clip_rect.bottom())],
        egui::Stroke::new(2.0, colors.now_line),
    );
}

/// Draws a downward marker in the header above the now line.
pub fn render_now_marker(
    painter: &egui::Painter,
    header_rect: egui::Rect,
    x: f32,
    colors: &ThemeColors,
) {
    if x < header_rect.left() || x > header_rect.right() {
        return;
    }
    let size = 6.0;
    let bottom = header_rect.bottom();
    painter.add(egui::Shape::convex_polygon(
        vec![
            egui::pos2(x - size, bottom - size * 1.5),
            egui::pos2(x + size, bottom - size * 1.5),
            egui::pos2(x, bottom),
        ],
        colors.now_line,
        egui::Stroke::NONE,
    ));
}
