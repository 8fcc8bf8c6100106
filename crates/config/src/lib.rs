//! Shared configuration for the cleaning checklist
//!
//! This crate provides the single source of truth for signature pad tuning,
//! resize debouncing, theme defaults, camera constraints, and notice timing
//! shared by the signature, form, and web crates.

use serde::{Deserialize, Serialize};

/// Minimum stroke width in logical pixels
pub const DEFAULT_MIN_WIDTH: f32 = 0.5;

/// Maximum stroke width in logical pixels
pub const DEFAULT_MAX_WIDTH: f32 = 2.5;

/// Points closer than this to the previous point are dropped
pub const DEFAULT_MIN_DISTANCE: f32 = 5.0;

/// Minimum interval between accepted input points (~60 Hz)
pub const DEFAULT_THROTTLE_MS: u32 = 16;

/// Weight of the newest velocity sample in the velocity filter
pub const DEFAULT_VELOCITY_FILTER_WEIGHT: f32 = 0.7;

/// Quiet period before a burst of resize events triggers a redraw
pub const DEFAULT_RESIZE_DEBOUNCE_MS: u32 = 250;

/// How long a toast notice stays visible
pub const DEFAULT_NOTICE_DISPLAY_MS: u32 = 3000;

/// Default pen color
pub const DEFAULT_PEN_COLOR: &str = "#000000";

/// Pen color the toggle switches to
pub const ALTERNATE_PEN_COLOR: &str = "#0000FF";

/// Background painted under the signature
pub const DEFAULT_BACKGROUND: &str = "rgb(255, 255, 255)";

/// Errors raised while loading configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to parse configuration: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid pad widths: min {min} must be positive and not exceed max {max}")]
    InvalidWidths { min: f32, max: f32 },

    #[error("Velocity filter weight {0} must be within 0..=1")]
    InvalidFilterWeight(f32),
}

/// Tuning for the freehand signature pad
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PadConfig {
    /// Width at high velocity
    pub min_width: f32,
    /// Width at rest
    pub max_width: f32,
    /// Radius of a single tap; `None` means (min + max) / 2
    pub dot_size: Option<f32>,
    pub min_distance: f32,
    pub throttle_ms: u32,
    pub velocity_filter_weight: f32,
    /// CSS color string painted on clear
    pub background: String,
    /// The two colors the pen toggles between, default first
    pub pen_colors: [String; 2],
}

impl Default for PadConfig {
    fn default() -> Self {
        Self {
            min_width: DEFAULT_MIN_WIDTH,
            max_width: DEFAULT_MAX_WIDTH,
            dot_size: None,
            min_distance: DEFAULT_MIN_DISTANCE,
            throttle_ms: DEFAULT_THROTTLE_MS,
            velocity_filter_weight: DEFAULT_VELOCITY_FILTER_WEIGHT,
            background: DEFAULT_BACKGROUND.to_string(),
            pen_colors: [
                DEFAULT_PEN_COLOR.to_string(),
                ALTERNATE_PEN_COLOR.to_string(),
            ],
        }
    }
}

impl PadConfig {
    /// Radius used for single-point strokes
    pub fn effective_dot_size(&self) -> f32 {
        match self.dot_size {
            Some(size) if size > 0.0 => size,
            _ => (self.min_width + self.max_width) / 2.0,
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.min_width <= 0.0 || self.min_width > self.max_width {
            return Err(ConfigError::InvalidWidths {
                min: self.min_width,
                max: self.max_width,
            });
        }
        if !(0.0..=1.0).contains(&self.velocity_filter_weight) {
            return Err(ConfigError::InvalidFilterWeight(self.velocity_filter_weight));
        }
        Ok(())
    }
}

/// Resize handling for the signature canvas
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ResizeConfig {
    pub debounce_ms: u32,
}

impl Default for ResizeConfig {
    fn default() -> Self {
        Self {
            debounce_ms: DEFAULT_RESIZE_DEBOUNCE_MS,
        }
    }
}

/// Theme colors applied when nothing has been saved yet
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ThemeDefaults {
    pub bg_color: String,
    pub primary_color: String,
    pub text_color: String,
}

impl Default for ThemeDefaults {
    fn default() -> Self {
        Self {
            bg_color: "#f5f5f5".to_string(),
            primary_color: "#3b82f6".to_string(),
            text_color: "#1a1a1a".to_string(),
        }
    }
}

/// Which camera to ask the device for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FacingMode {
    /// Rear camera
    #[default]
    Environment,
    /// Front camera
    User,
}

/// Media constraints for photo capture
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CameraConfig {
    pub facing_mode: FacingMode,
    pub ideal_width: u32,
    pub ideal_height: u32,
    /// JPEG quality 1..=100 for captured frames
    pub jpeg_quality: u8,
    pub audio: bool,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            facing_mode: FacingMode::Environment,
            ideal_width: 1920,
            ideal_height: 1080,
            jpeg_quality: 90,
            audio: false,
        }
    }
}

/// Toast notice timing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct NoticeConfig {
    pub display_ms: u32,
}

impl Default for NoticeConfig {
    fn default() -> Self {
        Self {
            display_ms: DEFAULT_NOTICE_DISPLAY_MS,
        }
    }
}

/// Complete application configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AppConfig {
    pub pad: PadConfig,
    pub resize: ResizeConfig,
    pub theme: ThemeDefaults,
    pub camera: CameraConfig,
    pub notice: NoticeConfig,
}

impl AppConfig {
    /// Parse a (possibly partial) JSON document; missing fields use defaults
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.pad.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.pad.min_width, DEFAULT_MIN_WIDTH);
        assert_eq!(config.pad.max_width, DEFAULT_MAX_WIDTH);
        assert_eq!(config.resize.debounce_ms, 250);
        assert_eq!(config.camera.jpeg_quality, 90);
        assert_eq!(config.pad.pen_colors[1], "#0000FF");
    }

    #[test]
    fn test_effective_dot_size() {
        let mut pad = PadConfig::default();
        assert!((pad.effective_dot_size() - 1.5).abs() < 0.001);

        pad.dot_size = Some(4.0);
        assert_eq!(pad.effective_dot_size(), 4.0);

        pad.dot_size = Some(0.0);
        assert!((pad.effective_dot_size() - 1.5).abs() < 0.001);
    }

    #[test]
    fn test_partial_json() {
        let config = AppConfig::from_json(r#"{"resize": {"debounceMs": 100}, "pad": {"maxWidth": 4.0}}"#)
            .unwrap();
        assert_eq!(config.resize.debounce_ms, 100);
        assert_eq!(config.pad.max_width, 4.0);
        assert_eq!(config.pad.min_width, DEFAULT_MIN_WIDTH);
        assert_eq!(config.theme, ThemeDefaults::default());
    }

    #[test]
    fn test_invalid_widths_rejected() {
        let result = AppConfig::from_json(r#"{"pad": {"minWidth": 3.0, "maxWidth": 1.0}}"#);
        assert!(matches!(result, Err(ConfigError::InvalidWidths { .. })));
    }

    #[test]
    fn test_camera_constraints_serialize() {
        let json = serde_json::to_value(CameraConfig::default()).unwrap();
        assert_eq!(json["facingMode"], "environment");
        assert_eq!(json["idealWidth"], 1920);
    }
}
