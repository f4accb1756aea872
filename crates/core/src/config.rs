//! Editor settings.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tijdlijn_protocol::Size;

use crate::baseline::BASELINE_MARGIN;
use crate::colors::DEFAULT_RECENT_LIMIT;
use crate::grid::GridSize;
use crate::views::CardMetrics;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed config: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Every field has a default, so a partial file only overrides what it names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    pub grid: GridSize,
    pub snap: bool,
    /// Baseline distance from the top and bottom board edges.
    pub margin: f64,
    pub board: Size,
    pub autosave_delay_ms: u64,
    pub recent_colors_limit: usize,
    pub device_pixel_ratio: f64,
    pub card_width: f64,
    pub card_height: f64,
    pub card_gap: f64,
}

impl Default for EditorConfig {
    fn default() -> Self {
        let cards = CardMetrics::default();
        Self {
            grid: GridSize::default(),
            snap: true,
            margin: BASELINE_MARGIN,
            board: Size::new(1200.0, 600.0),
            autosave_delay_ms: 250,
            recent_colors_limit: DEFAULT_RECENT_LIMIT,
            device_pixel_ratio: 1.0,
            card_width: cards.width,
            card_height: cards.height,
            card_gap: cards.gap,
        }
    }
}

impl EditorConfig {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load from `path`. A missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(text) => Self::from_json(&text),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "no config file, using defaults");
                Ok(Self::default())
            }
            Err(source) => Err(ConfigError::Read {
                path: path.display().to_string(),
                source,
            }),
        }
    }

    pub fn autosave_delay(&self) -> Duration {
        Duration::from_millis(self.autosave_delay_ms)
    }

    pub fn card_metrics(&self) -> CardMetrics {
        CardMetrics {
            width: self.card_width,
            height: self.card_height,
            gap: self.card_gap,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_file_keeps_other_defaults() {
        let cfg = EditorConfig::from_json(r#"{"grid": 40, "snap": false}"#).unwrap();
        assert_eq!(cfg.grid.px(), 40.0);
        assert!(!cfg.snap);
        assert_eq!(cfg.margin, 20.0);
        assert_eq!(cfg.autosave_delay(), Duration::from_millis(250));
        assert_eq!(cfg.card_metrics(), CardMetrics::default());
    }

    #[test]
    fn unusable_grid_falls_back() {
        let cfg = EditorConfig::from_json(r#"{"grid": -5}"#).unwrap();
        assert_eq!(cfg.grid.px(), 20.0);
    }

    #[test]
    fn malformed_file_is_an_error() {
        assert!(matches!(
            EditorConfig::from_json("{\"grid\": "),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn missing_file_uses_defaults() {
        let cfg = EditorConfig::load(Path::new("/definitely/not/here/tijdlijn.json")).unwrap();
        assert_eq!(cfg, EditorConfig::default());
    }
}
