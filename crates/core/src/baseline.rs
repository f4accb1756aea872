//! The horizontal reference line ("timeline-Y") free-canvas connectors
//! align to.

use crate::grid::GridSize;
use crate::model::PlacedNode;

/// Distance the baseline keeps from the top and bottom board edges.
pub const BASELINE_MARGIN: f64 = 20.0;

/// Resting position, as a fraction of board height, when fewer than two
/// nodes exist.
pub const DEFAULT_BASELINE_RATIO: f64 = 0.65;

/// Compute a baseline from nodes already sorted by center-x.
///
/// Only the leftmost and rightmost node decide the result, so inserting
/// nodes mid-sequence does not move the line.
pub fn compute_baseline(sorted: &[PlacedNode<'_>], board_height: f64, grid: GridSize) -> f64 {
    match (sorted.first(), sorted.last()) {
        (Some(left), Some(right)) if sorted.len() >= 2 => {
            grid.snap((left.center.y + right.center.y) / 2.0)
        }
        _ => grid.snap(board_height * DEFAULT_BASELINE_RATIO),
    }
}

/// Clamp a baseline into `[margin, board_height - margin]`.
///
/// On boards shorter than two margins the lower bound wins.
pub fn clamp_baseline(y: f64, board_height: f64, margin: f64) -> f64 {
    let hi = board_height - margin;
    if hi < margin {
        return margin;
    }
    y.clamp(margin, hi)
}

/// The per-canvas baseline. `None` means "not yet established".
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Baseline {
    y: Option<f64>,
}

impl Baseline {
    pub fn value(&self) -> Option<f64> {
        self.y
    }

    pub fn is_established(&self) -> bool {
        self.y.is_some()
    }

    pub fn set(&mut self, y: Option<f64>) {
        self.y = y.filter(|v| v.is_finite());
    }

    pub fn reset(&mut self) {
        self.y = None;
    }

    /// Recompute from the node extremes. No-op (returns false) with fewer
    /// than two nodes.
    pub fn recompute(&mut self, sorted: &[PlacedNode<'_>], board_height: f64, grid: GridSize) -> bool {
        if sorted.len() < 2 {
            return false;
        }
        self.y = Some(compute_baseline(sorted, board_height, grid));
        true
    }

    /// Establish the baseline if it is still unset and at least two nodes exist.
    pub fn establish(&mut self, sorted: &[PlacedNode<'_>], board_height: f64, grid: GridSize) {
        if self.y.is_none() {
            self.recompute(sorted, board_height, grid);
        }
    }

    /// The baseline to draw with: the stored value, or a computed one.
    pub fn resolve(&self, sorted: &[PlacedNode<'_>], board_height: f64, grid: GridSize) -> f64 {
        self.y
            .unwrap_or_else(|| compute_baseline(sorted, board_height, grid))
    }
}

/// A manual baseline drag, captured on pointer-down.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BaselineDrag {
    start_value: f64,
    start_client_y: f64,
}

impl BaselineDrag {
    pub fn begin(current: f64, client_y: f64) -> Self {
        Self {
            start_value: current,
            start_client_y: client_y,
        }
    }

    /// Baseline for the pointer at `client_y`: moved by the pointer delta,
    /// snapped when `snap` is given, then clamped.
    pub fn position(&self, client_y: f64, snap: Option<GridSize>, board_height: f64, margin: f64) -> f64 {
        let mut y = self.start_value + (client_y - self.start_client_y);
        if let Some(grid) = snap {
            y = grid.snap(y);
        }
        clamp_baseline(y, board_height, margin)
    }
}
