//! Application-level modules for the guide viewer.
//!
//! Holds the centralized state and the coordinators that act on it.

mod app_state;
mod application_coordinator;
mod theme_coordinator;
mod settings_coordinator;

pub use app_state::{AppState, GuideSourceLabel};
pub use application_coordinator::{ApplicationCoordinator, Navigation};
pub use theme_coordinator::ThemeCoordinator;
pub use settings_coordinator::SettingsCoordinator;
