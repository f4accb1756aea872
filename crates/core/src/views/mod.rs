//! Pure projections of editor state into render commands.

pub mod canvas;
pub mod cards;

pub use canvas::{CanvasScene, render_canvas};
pub use cards::{CardLayoutMode, CardMetrics, TimelineContent, grid_columns, layout_cards, render_timeline};
