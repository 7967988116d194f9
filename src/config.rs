use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::model::LayoutMode;

/// Geometry constants for the auto-layout algorithm.
///
/// The footprint of a node along the hierarchy axis is estimated from its
/// label length (`chars * per_char_width + label_padding`, floored per
/// orientation); lane spacing is a fixed step per orientation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    pub margin: f64,
    pub per_char_width: f64,
    pub label_padding: f64,
    pub horizontal_floor: f64,
    pub vertical_floor: f64,
    pub horizontal_gutter: f64,
    pub vertical_gutter: f64,
    pub horizontal_lane_step: f64,
    pub vertical_lane_step: f64,
    /// Band width assumed for a depth with no measured nodes.
    pub default_band: f64,
    /// Vertical stacking step for nodes unreachable from any root.
    pub fallback_step: f64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            margin: 40.0,
            per_char_width: 8.5,
            label_padding: 40.0,
            horizontal_floor: 140.0,
            vertical_floor: 120.0,
            horizontal_gutter: 80.0,
            vertical_gutter: 100.0,
            horizontal_lane_step: 90.0,
            vertical_lane_step: 150.0,
            default_band: 120.0,
            fallback_step: 60.0,
        }
    }
}

impl LayoutConfig {
    pub fn footprint_floor(&self, mode: LayoutMode) -> f64 {
        match mode {
            LayoutMode::Horizontal => self.horizontal_floor,
            LayoutMode::Vertical => self.vertical_floor,
        }
    }

    pub fn gutter(&self, mode: LayoutMode) -> f64 {
        match mode {
            LayoutMode::Horizontal => self.horizontal_gutter,
            LayoutMode::Vertical => self.vertical_gutter,
        }
    }

    pub fn lane_step(&self, mode: LayoutMode) -> f64 {
        match mode {
            LayoutMode::Horizontal => self.horizontal_lane_step,
            LayoutMode::Vertical => self.vertical_lane_step,
        }
    }
}

/// Timing of the persistence service.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Quiet period after a routine mutation before the full state flushes.
    pub debounce_ms: u64,
    /// Indicator window opened by an immediate rename flush.
    pub rename_indicator_ms: u64,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            debounce_ms: 500,
            rename_indicator_ms: 200,
        }
    }
}

impl SyncConfig {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn rename_indicator(&self) -> Duration {
        Duration::from_millis(self.rename_indicator_ms)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub layout: LayoutConfig,
    pub sync: SyncConfig,
}

/// Loads a JSON config file over the built-in defaults. Missing keys keep
/// their defaults; no path means pure defaults.
pub fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    let Some(path) = path else {
        return Ok(Config::default());
    };
    let contents = std::fs::read_to_string(path)?;
    let config: Config = serde_json::from_str(&contents)?;
    Ok(config)
}
