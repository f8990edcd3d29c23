//! Terminal UI components.
//!
//! This module contains all UI-related code including:
//! - [`render`]: Window layout, file browser and the three panes
//! - [`style`]: Theming and the rich editor surface

pub mod style;

mod overlays;
mod render;
mod status;

pub use overlays::prompt_rect;
pub use render::{Regions, list_window_start, regions, render};

pub const SIDEBAR_WIDTH_PERCENT: u16 = 22;
