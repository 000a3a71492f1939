//! UI panel rendering subsystem
//!
//! - Header panel (guide source, navigation, filters, theme selector)
//! - Guide panel (time header, channel sidebar, program body)
//! - Details panel (selected program and recording actions)
//! - Mapping panel (EPG mapping dialog)
//! - Status bar (guide source and counts)
//! - Panel manager (panel orchestration and layout)

pub mod header;
pub mod guide_panel;
pub mod details_panel;
pub mod mapping_panel;
pub mod status_bar;
pub mod panel_manager;
