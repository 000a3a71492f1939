//! Color mapping for program cells and recording badges.
//!
//! Category accents are deterministic: the same category always gets the
//! same stripe color within a theme.

use egui::Color32;
use guidegrid::{RecordingStatus, ThemeColors};

/// Accent stripe color for a program category.
pub fn category_color(category: Option<&str>, colors: &ThemeColors) -> Color32 {
    let Some(category) = category else {
        return colors.cell_border;
    };
    match category.to_lowercase().as_str() {
        c if c.contains("news") => colors.scheduled,
        c if c.contains("sport") => colors.live,
        c if c.contains("movie") || c.contains("film") => colors.recording,
        c if c.contains("kid") || c.contains("child") => colors.new,
        c if c.contains("doc") => colors.warning,
        _ => colors.text_dim,
    }
}

/// Badge color for a recording on the grid.
pub fn recording_color(status: RecordingStatus, colors: &ThemeColors) -> Color32 {
    match status {
        RecordingStatus::Recording => colors.recording,
        RecordingStatus::Scheduled => colors.scheduled,
        RecordingStatus::Completed => colors.new,
        RecordingStatus::Failed | RecordingStatus::Cancelled => colors.text_dim,
    }
}

/// Cell fill: airing programs stand out from the rest.
pub fn cell_fill(airing: bool, colors: &ThemeColors) -> Color32 {
    if airing {
        colors.cell_airing
    } else {
        colors.cell
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use guidegrid::ThemeManager;

    #[test]
    fn test_category_matching_is_case_insensitive() {
        let manager = ThemeManager::new();
        let colors = &manager.theme_or_default("Dark").colors;
        assert_eq!(category_color(Some("SPORTS"), colors), colors.live);
        assert_eq!(category_color(Some("Feature Film"), colors), colors.recording);
        assert_eq!(category_color(None, colors), colors.cell_border);
    }

    #[test]
    fn test_recording_badges() {
        let manager = ThemeManager::new();
        let colors = &manager.theme_or_default("Light").colors;
        assert_eq!(recording_color(RecordingStatus::Recording, colors), colors.recording);
        assert_eq!(recording_color(RecordingStatus::Scheduled, colors), colors.scheduled);
    }
}
