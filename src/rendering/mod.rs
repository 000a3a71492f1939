//! Rendering subsystem for drawing the guide grid
//!
//! - Time axis rendering (slot labels, grid lines)
//! - Program cell rendering (cells, badges, row placeholders)
//! - Guide overlays (now line)

pub mod time_axis_renderer;
pub mod program_cell_renderer;
pub mod guide_overlays;
