//! Theme and styling state management.

use guidegrid::theme::DEFAULT_THEME;
use guidegrid::{ThemeColors, ThemeManager};

/// State related to visual theme and styling.
///
/// Responsibilities:
/// - Owning the built-in themes
/// - Tracking the current theme selection
pub struct ThemeState {
    theme_manager: ThemeManager,
    current_theme_name: String,
}

impl std::fmt::Debug for ThemeState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ThemeState")
            .field("current_theme_name", &self.current_theme_name)
            .finish_non_exhaustive()
    }
}

impl Default for ThemeState {
    fn default() -> Self {
        Self::new()
    }
}

impl ThemeState {
    pub fn new() -> Self {
        Self::with_theme(DEFAULT_THEME.to_string())
    }

    /// Creates a theme state with a stored theme name. Unknown names fall
    /// back to the default theme.
    pub fn with_theme(theme_name: String) -> Self {
        let theme_manager = ThemeManager::new();
        let current_theme_name = if theme_manager.get_theme(&theme_name).is_some() {
            theme_name
        } else {
            DEFAULT_THEME.to_string()
        };
        Self {
            theme_manager,
            current_theme_name,
        }
    }

    // ===== Theme Queries =====

    pub fn theme_manager(&self) -> &ThemeManager {
        &self.theme_manager
    }

    pub fn current_theme_name(&self) -> &str {
        &self.current_theme_name
    }

    /// Palette of the current theme.
    pub fn colors(&self) -> &ThemeColors {
        &self.theme_manager.theme_or_default(&self.current_theme_name).colors
    }

    // ===== Theme Mutations =====

    pub fn set_theme(&mut self, theme_name: String) {
        self.current_theme_name = theme_name;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_stored_theme_falls_back() {
        let state = ThemeState::with_theme("Solarized".to_string());
        assert_eq!(state.current_theme_name(), DEFAULT_THEME);
    }

    #[test]
    fn test_stored_theme_is_kept() {
        let state = ThemeState::with_theme("Dracula".to_string());
        assert_eq!(state.current_theme_name(), "Dracula");
        assert_eq!(state.colors(), &state.theme_manager().get_theme("Dracula").unwrap().colors);
    }
}
