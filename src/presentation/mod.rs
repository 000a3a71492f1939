//! Presentation layer: visual styling kept apart from guide logic.

pub mod color_mapping;
