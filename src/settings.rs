//! Analysis settings
//!
//! Settings are read-only for the duration of an analysis. Key names follow the
//! configuration files produced for the acquisition rig, including the keys with
//! spaces (`"remove short bouts"`, `"join bouts"`).

use crate::error::AnalysisError;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default number of reference frames a trace is resampled to
pub const DEFAULT_REC_POINTS: usize = 9000;

/// Top-level settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Sampling rate of the reference time series (Hz)
    pub fs: f64,
    /// Whisking detection parameters
    pub whisking: WhiskingSettings,
}

/// Whisking detection parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WhiskingSettings {
    /// Gaussian kernel width (frames)
    pub sigma: f64,
    /// Threshold as a percentage of the normalized range, 0-100
    pub percentile: f64,
    /// Drop bouts shorter than `whisk_min_duration`
    #[serde(rename = "remove short bouts")]
    pub remove_short_bouts: bool,
    /// Minimum bout duration (seconds)
    pub whisk_min_duration: f64,
    /// Bridge gaps shorter than `whisk_max_inter_bout`
    #[serde(rename = "join bouts")]
    pub join_bouts: bool,
    /// Maximum gap between bouts that gets bridged (seconds)
    pub whisk_max_inter_bout: f64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            fs: 30.0,
            whisking: WhiskingSettings::default(),
        }
    }
}

impl Default for WhiskingSettings {
    fn default() -> Self {
        Self {
            sigma: 4.0,
            percentile: 20.0,
            remove_short_bouts: true,
            whisk_min_duration: 0.5,
            join_bouts: true,
            whisk_max_inter_bout: 0.5,
        }
    }
}

impl Settings {
    /// Parse and validate settings from JSON
    pub fn from_json(json: &str) -> Result<Self, AnalysisError> {
        let settings: Settings = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Read, parse and validate a settings file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, AnalysisError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Serialize settings to pretty JSON
    pub fn to_json(&self) -> Result<String, AnalysisError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Check that every value is usable by the pipeline
    pub fn validate(&self) -> Result<(), AnalysisError> {
        if !self.fs.is_finite() || self.fs <= 0.0 {
            return Err(AnalysisError::InvalidSettings(format!(
                "fs must be a positive number, got {}",
                self.fs
            )));
        }

        let w = &self.whisking;
        if !w.sigma.is_finite() || w.sigma < 0.0 {
            return Err(AnalysisError::InvalidSettings(format!(
                "whisking.sigma must be >= 0, got {}",
                w.sigma
            )));
        }
        if !(0.0..=100.0).contains(&w.percentile) {
            return Err(AnalysisError::InvalidSettings(format!(
                "whisking.percentile must be within 0-100, got {}",
                w.percentile
            )));
        }
        for (name, value) in [
            ("whisk_min_duration", w.whisk_min_duration),
            ("whisk_max_inter_bout", w.whisk_max_inter_bout),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(AnalysisError::InvalidSettings(format!(
                    "whisking.{} must be >= 0 seconds, got {}",
                    name, value
                )));
            }
        }

        Ok(())
    }

    /// Threshold on the normalized 0-1 scale
    pub fn threshold(&self) -> f64 {
        self.whisking.percentile / 100.0
    }
}

/// Reject a zero-length resampling target
pub fn validate_rec_points(rec_points: usize) -> Result<(), AnalysisError> {
    if rec_points == 0 {
        return Err(AnalysisError::InvalidSettings(
            "rec_points must be at least 1".to_string(),
        ));
    }
    Ok(())
}
