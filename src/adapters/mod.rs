//! Motion file adapters
//!
//! This module provides adapters that read the output of the motion-tracking
//! tool and extract the raw whisker trace.

mod json;

pub use json::{JsonMotionAdapter, MOTION_CHANNEL, MOTION_KEY};

use crate::error::AnalysisError;
use std::path::Path;

/// Trait for motion file adapters
pub trait MotionFileAdapter {
    /// Load the raw whisker trace from `path`.
    ///
    /// Returns `Ok(None)` when the file holds no motion entry at all.
    fn load(&self, path: &Path) -> Result<Option<Vec<f64>>, AnalysisError>;
}
