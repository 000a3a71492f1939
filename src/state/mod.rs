//! State management modules for the guide viewer.
//!
//! Guide data, window, filters and scrolling live in the library's
//! `GuideController`; these hold the viewer-only state around it:
//! - Theme state (theme manager, current theme)
//! - Layout state (sidebar width, date field)
//! - Mapping state (EPG mapping dialog)

mod theme_state;
mod layout_state;
mod mapping_state;

pub use theme_state::ThemeState;
pub use layout_state::LayoutState;
pub use mapping_state::MappingState;
