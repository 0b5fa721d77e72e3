//! Startup configuration.
//!
//! Every tunable has a default; a TOML file overrides any subset of them.
//! The loaded config is validated once and never changes afterwards.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::cursor::MapperConfig;
use crate::tracking::GestureConfig;

/// What drives the pointer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PointerSource {
    /// Index fingertip.
    #[default]
    Hand,
    /// Calibrated eye gaze; gestures still click, drag and scroll.
    Gaze,
}

impl PointerSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Hand => "hand",
            Self::Gaze => "gaze",
        }
    }
}

/// All tunables.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    // Capture
    pub camera_index: u32,
    pub frame_width: u32,
    pub frame_height: u32,

    // Hand detector thresholds
    pub hand_min_detection_confidence: f64,
    pub hand_min_tracking_confidence: f64,

    // Mapping
    pub cursor_sensitivity_x: f64,
    pub cursor_sensitivity_y: f64,
    pub invert_x: bool,
    pub invert_y: bool,
    pub max_cursor_step_px: i32,
    pub pen_active_margin_x: f64,
    pub pen_active_margin_y: f64,
    pub screen_width: u32,
    pub screen_height: u32,

    // Smoothing
    pub smoothing_alpha: f64,
    pub moving_average_window: usize,
    pub gaze_alpha: f64,

    // Gestures
    pub pinch_threshold: f64,
    pub gesture_hold_seconds: f64,
    pub click_cooldown_seconds: f64,
    pub scroll_gain: f64,

    pub pointer_source: PointerSource,
    pub calibration_path: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            camera_index: 0,
            frame_width: 1280,
            frame_height: 720,
            hand_min_detection_confidence: 0.6,
            hand_min_tracking_confidence: 0.5,
            cursor_sensitivity_x: 1.05,
            cursor_sensitivity_y: 1.0,
            invert_x: false,
            invert_y: false,
            max_cursor_step_px: 45,
            pen_active_margin_x: 0.15,
            pen_active_margin_y: 0.18,
            screen_width: 1920,
            screen_height: 1080,
            smoothing_alpha: 0.18,
            moving_average_window: 6,
            gaze_alpha: 0.22,
            pinch_threshold: 0.055,
            gesture_hold_seconds: 0.22,
            click_cooldown_seconds: 0.45,
            scroll_gain: 65.0,
            pointer_source: PointerSource::Hand,
            calibration_path: PathBuf::from("calibration.json"),
        }
    }
}

fn check_alpha(name: &str, alpha: f64) -> Result<()> {
    if !(alpha > 0.0 && alpha <= 1.0) {
        anyhow::bail!("{} must be in (0, 1], got {}", name, alpha);
    }
    Ok(())
}

fn check_non_negative(name: &str, value: f64) -> Result<()> {
    if !(value >= 0.0) {
        anyhow::bail!("{} must be non-negative, got {}", name, value);
    }
    Ok(())
}

impl Config {
    /// Load and validate a TOML config file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: Config = toml::from_str(&content).context("Failed to parse config file")?;
        config.validate()?;
        Ok(config)
    }

    /// Load `path` when given, otherwise fall back to the defaults.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(p) => Self::load(p),
            None => Ok(Self::default()),
        }
    }

    /// Reject values that would leave the pipeline meaningless.
    pub fn validate(&self) -> Result<()> {
        if self.screen_width == 0 || self.screen_height == 0 {
            anyhow::bail!(
                "Invalid screen size: {}x{}",
                self.screen_width,
                self.screen_height
            );
        }
        if self.frame_width == 0 || self.frame_height == 0 {
            anyhow::bail!(
                "Invalid frame size: {}x{}",
                self.frame_width,
                self.frame_height
            );
        }
        if self.moving_average_window == 0 {
            anyhow::bail!("moving_average_window must be at least 1");
        }
        if self.max_cursor_step_px <= 0 {
            anyhow::bail!(
                "max_cursor_step_px must be positive, got {}",
                self.max_cursor_step_px
            );
        }

        check_alpha("smoothing_alpha", self.smoothing_alpha)?;
        check_alpha("gaze_alpha", self.gaze_alpha)?;

        for (name, value) in [
            ("pinch_threshold", self.pinch_threshold),
            ("gesture_hold_seconds", self.gesture_hold_seconds),
            ("click_cooldown_seconds", self.click_cooldown_seconds),
            ("hand_min_detection_confidence", self.hand_min_detection_confidence),
            ("hand_min_tracking_confidence", self.hand_min_tracking_confidence),
            ("cursor_sensitivity_x", self.cursor_sensitivity_x),
            ("cursor_sensitivity_y", self.cursor_sensitivity_y),
        ] {
            check_non_negative(name, value)?;
        }
        if !self.scroll_gain.is_finite() {
            anyhow::bail!("scroll_gain must be finite, got {}", self.scroll_gain);
        }
        Ok(())
    }

    pub fn gesture_config(&self) -> GestureConfig {
        GestureConfig {
            pinch_threshold: self.pinch_threshold,
            hold_seconds: self.gesture_hold_seconds,
            click_cooldown_seconds: self.click_cooldown_seconds,
            scroll_gain: self.scroll_gain,
        }
    }

    pub fn mapper_config(&self) -> MapperConfig {
        MapperConfig {
            screen_width: self.screen_width,
            screen_height: self.screen_height,
            sensitivity_x: self.cursor_sensitivity_x,
            sensitivity_y: self.cursor_sensitivity_y,
            invert_x: self.invert_x,
            invert_y: self.invert_y,
            active_margin_x: self.pen_active_margin_x,
            active_margin_y: self.pen_active_margin_y,
        }
    }

    /// Generate s-expression for the active configuration.
    pub fn sexp(&self) -> String {
        format!(
            "(:source {} :screen ({} {}) :frame ({} {}) :sensitivity ({:.2} {:.2}) :invert ({} {}) :max-step {} :alpha {:.2} :window {} :gaze-alpha {:.2})",
            self.pointer_source.as_str(),
            self.screen_width,
            self.screen_height,
            self.frame_width,
            self.frame_height,
            self.cursor_sensitivity_x,
            self.cursor_sensitivity_y,
            if self.invert_x { "t" } else { "nil" },
            if self.invert_y { "t" } else { "nil" },
            self.max_cursor_step_px,
            self.smoothing_alpha,
            self.moving_average_window,
            self.gaze_alpha,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_config(text: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(text.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_defaults_validate() {
        let config = Config::default();
        config.validate().unwrap();
        assert_eq!(config.pointer_source, PointerSource::Hand);
        assert_eq!(config.max_cursor_step_px, 45);
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let file = write_config(
            r#"
screen_width = 2560
screen_height = 1440
invert_x = true
pointer_source = "gaze"
"#,
        );
        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.screen_width, 2560);
        assert!(config.invert_x);
        assert_eq!(config.pointer_source, PointerSource::Gaze);
        assert_eq!(config.pinch_threshold, 0.055);
        assert_eq!(config.calibration_path, PathBuf::from("calibration.json"));
    }

    #[test]
    fn test_missing_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = Config::load(&dir.path().join("absent.toml")).unwrap_err();
        assert!(err.to_string().contains("Failed to read config file"));
    }

    #[test]
    fn test_bad_toml_is_error() {
        let file = write_config("screen_width = \"wide\"");
        let err = Config::load(file.path()).unwrap_err();
        assert!(err.to_string().contains("Failed to parse config file"));
    }

    #[test]
    fn test_validation_rejects() {
        let cases: [(&str, fn(&mut Config)); 7] = [
            ("screen", |c| c.screen_width = 0),
            ("window", |c| c.moving_average_window = 0),
            ("alpha", |c| c.smoothing_alpha = 0.0),
            ("alpha high", |c| c.gaze_alpha = 1.5),
            ("threshold", |c| c.pinch_threshold = -0.1),
            ("hold", |c| c.gesture_hold_seconds = f64::NAN),
            ("step", |c| c.max_cursor_step_px = 0),
        ];
        for (label, mutate) in cases {
            let mut config = Config::default();
            mutate(&mut config);
            assert!(config.validate().is_err(), "{label} should be rejected");
        }
    }

    #[test]
    fn test_alpha_of_one_is_allowed() {
        let config = Config {
            smoothing_alpha: 1.0,
            ..Config::default()
        };
        config.validate().unwrap();
    }

    #[test]
    fn test_component_configs() {
        let config = Config {
            pen_active_margin_x: 0.2,
            gesture_hold_seconds: 0.3,
            ..Config::default()
        };
        assert_eq!(config.mapper_config().active_margin_x, 0.2);
        assert_eq!(config.gesture_config().hold_seconds, 0.3);
        assert!(config.sexp().starts_with("(:source hand"));
    }
}
