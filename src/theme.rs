//! Color themes for the guide.
//!
//! A theme is a palette of semantic guide colors (cells, now line, recording
//! badges, grid lines) plus the base colors applied to egui's visuals.
//!
//! ```
//! use guidegrid::theme::ThemeManager;
//!
//! let manager = ThemeManager::new();
//! let dracula = manager.get_theme("Dracula").unwrap();
//! println!("now line: {:?}", dracula.colors.now_line);
//! ```

use egui::Color32;

pub const DEFAULT_THEME: &str = "Dark";

#[derive(Debug, Clone, PartialEq)]
pub struct ThemeColors {
    pub background: Color32,
    pub panel_background: Color32,
    pub extreme_background: Color32,

    pub text: Color32,
    pub text_dim: Color32,
    pub selection: Color32,
    pub hover: Color32,
    pub border: Color32,

    // Grid
    pub hour_line: Color32,
    pub slot_line: Color32,
    pub row_stripe: Color32,
    pub placeholder: Color32,

    // Program cells
    pub cell: Color32,
    pub cell_airing: Color32,
    pub cell_border: Color32,
    pub now_line: Color32,

    // Badges
    pub scheduled: Color32,
    pub recording: Color32,
    pub live: Color32,
    pub new: Color32,

    pub error: Color32,
    pub warning: Color32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Theme {
    pub name: String,
    pub description: String,
    pub colors: ThemeColors,
}

/// All built-in themes, in menu order.
pub struct ThemeManager {
    themes: Vec<Theme>,
}

impl ThemeManager {
    pub fn new() -> Self {
        Self {
            themes: vec![light_theme(), dark_theme(), dracula_theme(), one_dark_pro_theme()],
        }
    }

    pub fn get_theme(&self, name: &str) -> Option<&Theme> {
        self.themes.iter().find(|t| t.name == name)
    }

    /// Looks up `name`, falling back to the default theme.
    pub fn theme_or_default(&self, name: &str) -> &Theme {
        self.get_theme(name)
            .or_else(|| self.get_theme(DEFAULT_THEME))
            .unwrap_or(&self.themes[0])
    }

    pub fn list_themes(&self) -> Vec<&str> {
        self.themes.iter().map(|t| t.name.as_str()).collect()
    }

    /// Applies a theme's base colors to egui visuals.
    pub fn apply_theme(&self, theme: &Theme, visuals: &mut egui::Visuals) {
        let colors = &theme.colors;

        visuals.panel_fill = colors.panel_background;
        visuals.window_fill = colors.panel_background;
        visuals.extreme_bg_color = colors.extreme_background;
        visuals.faint_bg_color = colors.row_stripe;
        visuals.override_text_color = Some(colors.text);

        visuals.selection.bg_fill = colors.selection;
        visuals.selection.stroke.color = colors.now_line;

        visuals.widgets.noninteractive.bg_fill = colors.panel_background;
        visuals.widgets.inactive.bg_fill = colors.hover;
        visuals.widgets.hovered.bg_fill = colors.hover;
        visuals.widgets.active.bg_fill = colors.selection;

        visuals.error_fg_color = colors.error;
        visuals.warn_fg_color = colors.warning;
    }
}

impl Default for ThemeManager {
    fn default() -> Self {
        Self::new()
    }
}

fn light_theme() -> Theme {
    Theme {
        name: "Light".to_string(),
        description: "Light background, egui default accents".to_string(),
        colors: ThemeColors {
            background: Color32::from_rgb(248, 248, 248),
            panel_background: Color32::from_rgb(242, 242, 242),
            extreme_background: Color32::from_rgb(255, 255, 255),
            text: Color32::from_rgb(20, 20, 20),
            text_dim: Color32::from_rgb(120, 120, 120),
            selection: Color32::from_rgb(180, 200, 255),
            hover: Color32::from_rgb(220, 220, 220),
            border: Color32::from_rgb(170, 170, 170),
            hour_line: Color32::from_rgb(150, 150, 150),
            slot_line: Color32::from_rgb(210, 210, 210),
            row_stripe: Color32::from_rgb(236, 236, 236),
            placeholder: Color32::from_rgb(150, 150, 150),
            cell: Color32::from_rgb(225, 232, 245),
            cell_airing: Color32::from_rgb(200, 225, 200),
            cell_border: Color32::from_rgb(160, 170, 190),
            now_line: Color32::from_rgb(220, 40, 40),
            scheduled: Color32::from_rgb(40, 100, 200),
            recording: Color32::from_rgb(200, 40, 40),
            live: Color32::from_rgb(230, 120, 20),
            new: Color32::from_rgb(40, 160, 40),
            error: Color32::from_rgb(200, 40, 40),
            warning: Color32::from_rgb(230, 120, 20),
        },
    }
}

fn dark_theme() -> Theme {
    Theme {
        name: "Dark".to_string(),
        description: "Dark background, egui default accents".to_string(),
        colors: ThemeColors {
            background: Color32::from_rgb(39, 39, 39),
            panel_background: Color32::from_rgb(32, 32, 32),
            extreme_background: Color32::from_rgb(16, 16, 16),
            text: Color32::from_rgb(235, 235, 235),
            text_dim: Color32::from_rgb(160, 160, 160),
            selection: Color32::from_rgb(50, 80, 120),
            hover: Color32::from_rgb(70, 70, 70),
            border: Color32::from_rgb(90, 90, 90),
            hour_line: Color32::from_rgb(110, 110, 110),
            slot_line: Color32::from_rgb(60, 60, 60),
            row_stripe: Color32::from_rgb(44, 44, 44),
            placeholder: Color32::from_rgb(120, 120, 120),
            cell: Color32::from_rgb(52, 60, 74),
            cell_airing: Color32::from_rgb(46, 84, 66),
            cell_border: Color32::from_rgb(80, 90, 110),
            now_line: Color32::from_rgb(231, 76, 60),
            scheduled: Color32::from_rgb(52, 152, 219),
            recording: Color32::from_rgb(231, 76, 60),
            live: Color32::from_rgb(243, 156, 18),
            new: Color32::from_rgb(46, 204, 113),
            error: Color32::from_rgb(231, 76, 60),
            warning: Color32::from_rgb(241, 196, 15),
        },
    }
}

/// Palette from https://draculatheme.com/spec
fn dracula_theme() -> Theme {
    Theme {
        name: "Dracula".to_string(),
        description: "Dracula color palette".to_string(),
        colors: ThemeColors {
            background: hex_to_color32("#282a36"),
            panel_background: hex_to_color32("#282a36"),
            extreme_background: hex_to_color32("#21222c"),
            text: hex_to_color32("#f8f8f2"),
            text_dim: hex_to_color32("#6272a4"),
            selection: hex_to_color32("#44475a"),
            hover: hex_to_color32("#44475a"),
            border: hex_to_color32("#6272a4"),
            hour_line: hex_to_color32("#6272a4"),
            slot_line: hex_to_color32("#343746"),
            row_stripe: hex_to_color32("#2c2e3b"),
            placeholder: hex_to_color32("#6272a4"),
            cell: hex_to_color32("#383a4a"),
            cell_airing: hex_to_color32("#3b4a45"),
            cell_border: hex_to_color32("#515470"),
            now_line: hex_to_color32("#ff5555"),
            scheduled: hex_to_color32("#8be9fd"),
            recording: hex_to_color32("#ff5555"),
            live: hex_to_color32("#ffb86c"),
            new: hex_to_color32("#50fa7b"),
            error: hex_to_color32("#ff5555"),
            warning: hex_to_color32("#f1fa8c"),
        },
    }
}

/// Palette from https://github.com/Binaryify/OneDark-Pro
fn one_dark_pro_theme() -> Theme {
    Theme {
        name: "One Dark Pro".to_string(),
        description: "One Dark Pro color palette".to_string(),
        colors: ThemeColors {
            background: hex_to_color32("#282c34"),
            panel_background: hex_to_color32("#282c34"),
            extreme_background: hex_to_color32("#21252b"),
            text: hex_to_color32("#abb2bf"),
            text_dim: hex_to_color32("#5c6370"),
            selection: hex_to_color32("#4b5263"),
            hover: hex_to_color32("#4b5263"),
            border: hex_to_color32("#5c6370"),
            hour_line: hex_to_color32("#5c6370"),
            slot_line: hex_to_color32("#333842"),
            row_stripe: hex_to_color32("#2c313a"),
            placeholder: hex_to_color32("#5c6370"),
            cell: hex_to_color32("#353b45"),
            cell_airing: hex_to_color32("#34413a"),
            cell_border: hex_to_color32("#4b5263"),
            now_line: hex_to_color32("#e06c75"),
            scheduled: hex_to_color32("#61afef"),
            recording: hex_to_color32("#e06c75"),
            live: hex_to_color32("#d19a66"),
            new: hex_to_color32("#98c379"),
            error: hex_to_color32("#e06c75"),
            warning: hex_to_color32("#e5c07b"),
        },
    }
}

/// Converts "#rrggbb" to a color; anything else is black.
pub fn hex_to_color32(hex: &str) -> Color32 {
    let hex = hex.trim_start_matches('#');
    if hex.len() != 6 {
        return Color32::BLACK;
    }
    let channel = |range: std::ops::Range<usize>| {
        hex.get(range)
            .and_then(|s| u8::from_str_radix(s, 16).ok())
            .unwrap_or(0)
    };
    Color32::from_rgb(channel(0..2), channel(2..4), channel(4..6))
}

/// Scales brightness (1.0 = unchanged).
pub fn adjust_brightness(color: Color32, factor: f32) -> Color32 {
    let scale = |c: u8| (c as f32 * factor).clamp(0.0, 255.0) as u8;
    Color32::from_rgb(scale(color.r()), scale(color.g()), scale(color.b()))
}

pub fn with_alpha(color: Color32, alpha: u8) -> Color32 {
    Color32::from_rgba_unmultiplied(color.r(), color.g(), color.b(), alpha)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_themes_listed_in_order() {
        let manager = ThemeManager::new();
        assert_eq!(manager.list_themes(), vec!["Light", "Dark", "Dracula", "One Dark Pro"]);
    }

    #[test]
    fn test_unknown_theme_falls_back_to_default() {
        let manager = ThemeManager::new();
        assert_eq!(manager.theme_or_default("Solarized").name, DEFAULT_THEME);
    }

    #[test]
    fn test_hex_parsing() {
        assert_eq!(hex_to_color32("#ff5555"), Color32::from_rgb(255, 85, 85));
        assert_eq!(hex_to_color32("zz"), Color32::BLACK);
    }

    #[test]
    fn test_adjust_brightness_saturates() {
        let c = adjust_brightness(Color32::from_rgb(200, 100, 0), 2.0);
        assert_eq!(c, Color32::from_rgb(255, 200, 0));
    }
}
