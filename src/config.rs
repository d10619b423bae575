use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::error::{LaneError, Result};

/// All tuning constants of the detector. Every section falls back to its
/// defaults when missing from a config file.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DetectorConfig {
    pub preprocessing: PreprocessingConfig,
    pub mask: MaskConfig,
    pub hough: HoughConfig,
    pub classifier: ClassifierConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PreprocessingConfig {
    /// Side of the Gaussian kernel; odd. Sigma is derived from it.
    pub blur_kernel: u32,
    pub canny_low: f32,
    pub canny_high: f32,
}

impl Default for PreprocessingConfig {
    fn default() -> Self {
        Self {
            blur_kernel: 5,
            canny_low: 50.0,
            canny_high: 150.0,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MaskConfig {
    /// x of the top-left corner of the trapezoid before skew
    pub top_left_x: i32,
    /// x of the top-right corner of the trapezoid before skew
    pub top_right_x: i32,
    /// Height of the side shoulders above the bottom row
    pub shoulder_rise: i32,
    /// Pixels per unit of normalized turn skew
    pub skew_scale: f64,
}

impl Default for MaskConfig {
    fn default() -> Self {
        Self {
            top_left_x: 210,
            top_right_x: 430,
            shoulder_rise: 150,
            skew_scale: 75.0,
        }
    }
}

/// Finest accepted distance resolution of the accumulator
pub const MIN_RHO: f64 = 0.1;
/// Finest accepted angular resolution of the accumulator (about 0.06 deg)
pub const MIN_THETA: f64 = 1e-3;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HoughConfig {
    /// Distance resolution of the accumulator in pixels
    pub rho: f64,
    /// Angular resolution of the accumulator in radians
    pub theta: f64,
    /// Votes needed before a line is walked
    pub threshold: u32,
    pub min_line_length: i32,
    pub max_line_gap: i32,
    /// Seed for the edge-pixel visiting order
    pub seed: u64,
}

impl Default for HoughConfig {
    fn default() -> Self {
        Self {
            rho: 2.0,
            theta: std::f64::consts::PI / 180.0,
            threshold: 100,
            min_line_length: 40,
            max_line_gap: 5,
            seed: 0x1a2e,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    /// Lines with |slope| <= this are treated as horizontal and dropped
    pub horizontal_slope_limit: f64,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            horizontal_slope_limit: 0.35,
        }
    }
}

impl DetectorConfig {
    /// Load a YAML config file and validate it
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config: DetectorConfig = serde_yaml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let p = &self.preprocessing;
        if p.blur_kernel < 3 || p.blur_kernel % 2 == 0 {
            return Err(LaneError::InvalidConfig(format!(
                "blur_kernel must be odd and at least 3, got {}",
                p.blur_kernel
            )));
        }
        if p.canny_low > p.canny_high {
            return Err(LaneError::InvalidConfig(format!(
                "canny_low ({}) exceeds canny_high ({})",
                p.canny_low, p.canny_high
            )));
        }

        let h = &self.hough;
        if !(h.rho >= MIN_RHO) {
            return Err(LaneError::InvalidConfig(format!(
                "hough rho must be at least {}, got {}",
                MIN_RHO, h.rho
            )));
        }
        if !(h.theta >= MIN_THETA && h.theta <= std::f64::consts::PI) {
            return Err(LaneError::InvalidConfig(format!(
                "hough theta must lie in [{}, pi], got {}",
                MIN_THETA, h.theta
            )));
        }
        if h.threshold == 0 {
            return Err(LaneError::InvalidConfig("hough threshold must be at least 1".into()));
        }
        if h.min_line_length < 0 || h.max_line_gap < 0 {
            return Err(LaneError::InvalidConfig(
                "hough min_line_length and max_line_gap must not be negative".into(),
            ));
        }

        if !(self.classifier.horizontal_slope_limit >= 0.0) {
            return Err(LaneError::InvalidConfig(
                "horizontal_slope_limit must not be negative".into(),
            ));
        }

        Ok(())
    }
}
