// src/config.rs - Every tunable of the pipeline in one record
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AirWriterConfig {
    pub canvas: CanvasConfig,
    pub pinch: PinchConfig,
    pub smoothing: SmoothingConfig,
    pub stroke: StrokeConfig,
    pub brush: BrushConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CanvasConfig {
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PinchConfig {
    pub threshold: f64,              // thumb-index distance, normalized landmark units
    pub hysteresis_ratio: f64,       // dead band as a fraction of the threshold
    pub fast_rate: f64,              // distance change per second that counts as fast
    pub fast_hysteresis_scale: f64,
    pub slow_hysteresis_scale: f64,
    pub release_margin: f64,         // fraction of the band used on release
    pub press_frames: u32,
    pub release_frames: u32,
    pub distance_history: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SmoothingConfig {
    pub base_factor: f64,
    pub fast_velocity: f64,          // px/s
    pub slow_velocity: f64,          // px/s
    pub fast_multiplier: f64,
    pub fast_cap: f64,
    pub slow_multiplier: f64,
    pub point_history: usize,
    pub velocity_history: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StrokeConfig {
    pub min_distance: f64,           // px, anything closer is jitter
    pub interpolation_threshold: f64,
    pub step_length: f64,
    pub max_steps: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BrushConfig {
    pub size: f32,
    pub min_size: f32,
    pub max_size: f32,
    pub color: String,
    pub cursor_color: String,
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
        }
    }
}

impl Default for PinchConfig {
    fn default() -> Self {
        Self {
            threshold: 0.055,
            hysteresis_ratio: 0.3,
            fast_rate: 0.5,
            fast_hysteresis_scale: 1.2,
            slow_hysteresis_scale: 0.8,
            release_margin: 0.7,
            press_frames: 2,
            release_frames: 1,
            distance_history: 5,
        }
    }
}

impl Default for SmoothingConfig {
    fn default() -> Self {
        Self {
            base_factor: 0.2,
            fast_velocity: 200.0,
            slow_velocity: 50.0,
            fast_multiplier: 0.5,
            fast_cap: 0.35,
            slow_multiplier: 1.5,
            point_history: 8,
            velocity_history: 3,
        }
    }
}

impl Default for StrokeConfig {
    fn default() -> Self {
        Self {
            min_distance: 0.5,
            interpolation_threshold: 15.0,
            step_length: 8.0,
            max_steps: 30,
        }
    }
}

impl Default for BrushConfig {
    fn default() -> Self {
        Self {
            size: 5.0,
            min_size: 1.0,
            max_size: 20.0,
            color: "#667eea".to_string(),
            cursor_color: "#ffffff".to_string(),
        }
    }
}

impl AirWriterConfig {
    /// Read a JSON config. Missing sections and fields fall back to defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        let config: Self = serde_json::from_str(&text)
            .with_context(|| format!("Invalid config JSON in {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        positive("canvas.width", self.canvas.width as f64)?;
        positive("canvas.height", self.canvas.height as f64)?;
        self.pinch.validate()?;
        self.smoothing.validate()?;
        self.stroke.validate()?;
        self.brush.validate()
    }
}

impl PinchConfig {
    /// Half-width of the dead band around the threshold before velocity scaling.
    pub fn hysteresis(&self) -> f64 {
        self.threshold * self.hysteresis_ratio
    }

    fn validate(&self) -> Result<(), ConfigError> {
        positive("pinch.threshold", self.threshold)?;
        positive("pinch.hysteresis_ratio", self.hysteresis_ratio)?;
        positive("pinch.fast_rate", self.fast_rate)?;
        positive("pinch.press_frames", self.press_frames as f64)?;
        positive("pinch.release_frames", self.release_frames as f64)?;
        window("pinch.distance_history", self.distance_history)
    }
}

impl SmoothingConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        unit("smoothing.base_factor", self.base_factor)?;
        unit("smoothing.fast_cap", self.fast_cap)?;
        positive("smoothing.fast_multiplier", self.fast_multiplier)?;
        positive("smoothing.slow_multiplier", self.slow_multiplier)?;
        unit("smoothing.base_factor * slow_multiplier", self.base_factor * self.slow_multiplier)?;
        if self.slow_velocity >= self.fast_velocity {
            return Err(ConfigError::VelocityBands {
                slow: self.slow_velocity,
                fast: self.fast_velocity,
            });
        }
        window("smoothing.point_history", self.point_history)?;
        window("smoothing.velocity_history", self.velocity_history)
    }
}

impl StrokeConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        positive("stroke.min_distance", self.min_distance)?;
        positive("stroke.interpolation_threshold", self.interpolation_threshold)?;
        positive("stroke.step_length", self.step_length)?;
        positive("stroke.max_steps", self.max_steps as f64)
    }
}

impl BrushConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if !(self.min_size..=self.max_size).contains(&self.size) {
            return Err(ConfigError::BrushSize {
                size: self.size,
                min: self.min_size,
                max: self.max_size,
            });
        }
        crate::canvas::parse_hex_color(&self.color)?;
        crate::canvas::parse_hex_color(&self.cursor_color)?;
        Ok(())
    }
}

fn positive(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value > 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::NotPositive { field, value })
    }
}

fn unit(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value > 0.0 && value < 1.0 {
        Ok(())
    } else {
        Err(ConfigError::OutOfUnitRange { field, value })
    }
}

fn window(field: &'static str, len: usize) -> Result<(), ConfigError> {
    if len == 0 {
        Err(ConfigError::EmptyWindow { field })
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert_eq!(AirWriterConfig::default().validate(), Ok(()));
        assert!((PinchConfig::default().hysteresis() - 0.0165).abs() < 1e-12);
    }

    #[test]
    fn partial_json_fills_defaults() {
        let config: AirWriterConfig =
            serde_json::from_str(r#"{ "pinch": { "threshold": 0.06 }, "canvas": { "width": 640 } }"#).unwrap();
        assert_eq!(config.pinch.threshold, 0.06);
        assert_eq!(config.pinch.press_frames, 2);
        assert_eq!(config.canvas.width, 640);
        assert_eq!(config.canvas.height, 720);
        assert_eq!(config.smoothing, SmoothingConfig::default());
    }

    #[test]
    fn rejects_bad_values() {
        let mut config = AirWriterConfig::default();
        config.smoothing.base_factor = 1.5;
        assert!(matches!(config.validate(), Err(ConfigError::OutOfUnitRange { .. })));

        let mut config = AirWriterConfig::default();
        config.smoothing.slow_velocity = 300.0;
        assert!(matches!(config.validate(), Err(ConfigError::VelocityBands { .. })));

        let mut config = AirWriterConfig::default();
        config.stroke.step_length = 0.0;
        assert!(matches!(config.validate(), Err(ConfigError::NotPositive { field: "stroke.step_length", .. })));

        let mut config = AirWriterConfig::default();
        config.pinch.distance_history = 0;
        assert!(matches!(config.validate(), Err(ConfigError::EmptyWindow { .. })));

        let mut config = AirWriterConfig::default();
        config.brush.color = "blue".into();
        assert!(matches!(config.validate(), Err(ConfigError::Color(_))));

        let mut config = AirWriterConfig::default();
        config.brush.size = 40.0;
        assert!(matches!(config.validate(), Err(ConfigError::BrushSize { .. })));
    }
}
