//! UI layout state management.
//!
//! Sizes of the resizable guide regions plus the text buffer behind the
//! date-jump field.

use serde::{Deserialize, Serialize};

const MIN_SIDEBAR_WIDTH: f32 = 120.0;
const MAX_SIDEBAR_WIDTH: f32 = 480.0;

/// State related to UI layout and sizing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayoutState {
    /// Width of the channel sidebar in pixels
    sidebar_width: f32,
    /// Fraction of the window height given to the details panel
    details_ratio: f32,
    /// Text buffer for the date-jump field (YYYY-MM-DD)
    #[serde(skip)]
    date_text: String,
}

impl Default for LayoutState {
    fn default() -> Self {
        Self::new(180.0)
    }
}

impl LayoutState {
    pub fn new(sidebar_width: f32) -> Self {
        Self {
            sidebar_width: sidebar_width.clamp(MIN_SIDEBAR_WIDTH, MAX_SIDEBAR_WIDTH),
            details_ratio: 0.25,
            date_text: String::new(),
        }
    }

    // ===== Layout Queries =====

    pub fn sidebar_width(&self) -> f32 {
        self.sidebar_width
    }

    pub fn details_ratio(&self) -> f32 {
        self.details_ratio
    }

    // ===== Layout Mutations =====

    /// Sets the sidebar width, clamped to a usable range.
    pub fn set_sidebar_width(&mut self, width: f32) {
        self.sidebar_width = width.clamp(MIN_SIDEBAR_WIDTH, MAX_SIDEBAR_WIDTH);
    }

    // ===== Date Text Input Accessors =====

    pub fn date_text(&self) -> &str {
        &self.date_text
    }

    pub fn date_text_mut(&mut self) -> &mut String {
        &mut self.date_text
    }

    /// Parses the date-jump field.
    pub fn parsed_date(&self) -> Option<chrono::NaiveDate> {
        chrono::NaiveDate::parse_from_str(self.date_text.trim(), "%Y-%m-%d").ok()
    }
}
