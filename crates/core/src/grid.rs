use serde::{Deserialize, Serialize};

/// Grid sizes offered by the editor's grid selector.
pub const GRID_CHOICES: [f64; 4] = [10.0, 20.0, 30.0, 40.0];

/// Grid size used when nothing (or nothing sensible) is configured.
pub const DEFAULT_GRID: f64 = 20.0;

/// Quantize `value` to the nearest multiple of `grid`.
///
/// A non-positive or non-finite grid leaves the value untouched.
pub fn snap(value: f64, grid: f64) -> f64 {
    if !(grid.is_finite() && grid > 0.0) {
        return value;
    }
    (value / grid).round() * grid
}

/// The snapping quantum, in CSS pixels. Always positive and finite.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "f64", into = "f64")]
pub struct GridSize(f64);

impl GridSize {
    pub fn new(px: f64) -> Option<Self> {
        (px.is_finite() && px > 0.0).then_some(Self(px))
    }

    /// Parse selector input such as `"30"`. Anything that is not one of
    /// [`GRID_CHOICES`] becomes 20.
    pub fn parse_lossy(input: &str) -> Self {
        input
            .trim()
            .parse::<i64>()
            .ok()
            .map(|v| v as f64)
            .filter(|px| GRID_CHOICES.contains(px))
            .and_then(Self::new)
            .unwrap_or_default()
    }

    pub fn px(self) -> f64 {
        self.0
    }

    pub fn snap(self, value: f64) -> f64 {
        snap(value, self.0)
    }

    /// Whole grid cells between two coordinates, rounded.
    pub fn units_between(self, from: f64, to: f64) -> i64 {
        ((to - from) / self.0).round() as i64
    }
}

impl Default for GridSize {
    fn default() -> Self {
        Self(DEFAULT_GRID)
    }
}

impl From<f64> for GridSize {
    fn from(px: f64) -> Self {
        Self::new(px).unwrap_or_default()
    }
}

impl From<GridSize> for f64 {
    fn from(g: GridSize) -> Self {
        g.0
    }
}
