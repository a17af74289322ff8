use std::io;
use std::path::Path;

use serde::{Deserialize, Serialize};
use strata_core::DepthThresholds;
use strata_renderer::RenderStyle;
use thiserror::Error;

/// Slider bounds for the sequence playback speed.
pub const MIN_ANIMATION_SPEED_MS: f64 = 500.0;
pub const MAX_ANIMATION_SPEED_MS: f64 = 5000.0;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Malformed config: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// Editor settings. Every field has a default, so a config file only needs
/// the keys it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EditorConfig {
    /// Size of the visible canvas in pixels; used to center jumps.
    pub canvas_width: f64,
    pub canvas_height: f64,
    pub thresholds: DepthThresholds,
    /// Zoom multiplier for one wheel notch or button press inward.
    pub zoom_in_factor: f64,
    /// Zoom multiplier for one wheel notch or button press outward.
    pub zoom_out_factor: f64,
    /// Duration of a single bookmark jump.
    pub transition_ms: f64,
    /// Per-step duration of sequence playback.
    pub animation_speed_ms: f64,
    /// Pause between arriving at one sequence step and leaving for the next.
    pub sequence_dwell_ms: f64,
    pub style: RenderStyle,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            canvas_width: 1280.0,
            canvas_height: 720.0,
            thresholds: DepthThresholds::default(),
            zoom_in_factor: 1.1,
            zoom_out_factor: 0.9,
            transition_ms: 1000.0,
            animation_speed_ms: 1000.0,
            sequence_dwell_ms: 100.0,
            style: RenderStyle::default(),
        }
    }
}

impl EditorConfig {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path.as_ref())?;
        let config = Self::from_json(&json)?;
        log::info!("Loaded config from {}", path.as_ref().display());
        Ok(config)
    }

    /// Range checks that JSON typing alone cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = [
            ("canvasWidth", self.canvas_width),
            ("canvasHeight", self.canvas_height),
            ("thresholds.zoomIn", self.thresholds.zoom_in),
            ("thresholds.zoomOut", self.thresholds.zoom_out),
            ("zoomInFactor", self.zoom_in_factor),
            ("zoomOutFactor", self.zoom_out_factor),
        ];
        for (key, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(ConfigError::Invalid(format!("{} must be positive, got {}", key, value)));
            }
        }

        let durations = [
            ("transitionMs", self.transition_ms),
            ("animationSpeedMs", self.animation_speed_ms),
            ("sequenceDwellMs", self.sequence_dwell_ms),
        ];
        for (key, value) in durations {
            if !(value.is_finite() && value >= 0.0) {
                return Err(ConfigError::Invalid(format!("{} must not be negative, got {}", key, value)));
            }
        }

        if self.thresholds.zoom_out >= self.thresholds.zoom_in {
            return Err(ConfigError::Invalid(format!(
                "thresholds.zoomOut ({}) must be below thresholds.zoomIn ({})",
                self.thresholds.zoom_out, self.thresholds.zoom_in
            )));
        }
        Ok(())
    }

    pub fn with_canvas_size(mut self, width: f64, height: f64) -> Self {
        self.canvas_width = width;
        self.canvas_height = height;
        self
    }
}
