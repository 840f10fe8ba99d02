//! JSON motion adapter
//!
//! Reads a motion-tracking export of the form
//! `{"motion": [[...], [...], ...], ...}` where each entry of `motion` is one
//! channel. Channel 1 holds the whisker-pad motion energy.

use serde_json::Value;
use std::path::Path;
use tracing::{debug, warn};

use super::MotionFileAdapter;
use crate::error::AnalysisError;

/// Key of the motion channel list
pub const MOTION_KEY: &str = "motion";

/// Index of the whisker channel within `motion`
pub const MOTION_CHANNEL: usize = 1;

/// Adapter for JSON exports of the motion-tracking tool
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonMotionAdapter;

impl JsonMotionAdapter {
    /// Extract the whisker trace from an export held in memory
    pub fn parse(&self, raw_json: &str) -> Result<Option<Vec<f64>>, AnalysisError> {
        let payload: Value = serde_json::from_str(raw_json)?;

        let object = payload.as_object().ok_or_else(|| {
            AnalysisError::ParseError("top level must be an object".to_string())
        })?;

        let motion = match object.get(MOTION_KEY) {
            Some(motion) => motion,
            None => {
                warn!(key = MOTION_KEY, "no motion entry in file");
                return Ok(None);
            }
        };

        let channel = motion
            .get(MOTION_CHANNEL)
            .and_then(Value::as_array)
            .ok_or(AnalysisError::MissingChannel(MOTION_CHANNEL))?;

        let trace = channel
            .iter()
            .map(Value::as_f64)
            .collect::<Option<Vec<f64>>>()
            .ok_or(AnalysisError::MissingChannel(MOTION_CHANNEL))?;

        if trace.is_empty() {
            return Err(AnalysisError::MissingChannel(MOTION_CHANNEL));
        }

        debug!(frames = trace.len(), "loaded motion trace");
        Ok(Some(trace))
    }
}

impl MotionFileAdapter for JsonMotionAdapter {
    fn load(&self, path: &Path) -> Result<Option<Vec<f64>>, AnalysisError> {
        let raw_json = std::fs::read_to_string(path)?;
        self.parse(&raw_json)
    }
}
