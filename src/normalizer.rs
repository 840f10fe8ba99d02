//! Trace normalization and thresholding
//!
//! - Min-max scaling of the filtered trace to 0-1
//! - Flat traces map to all zeros
//! - Binary whisking trace from a fractional threshold

use tracing::warn;

use crate::types::BinaryTrace;

/// Normalizer for filtered whisking traces
pub struct Normalizer;

impl Normalizer {
    /// Rescale `trace` so its minimum maps to 0 and its maximum to 1.
    ///
    /// A flat trace has no range to scale by and yields all zeros.
    pub fn min_max(trace: &[f64]) -> Vec<f64> {
        let (min, max) = trace
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
                (lo.min(v), hi.max(v))
            });

        let range = max - min;
        if trace.is_empty() || range.is_nan() || range <= 0.0 {
            if !trace.is_empty() {
                warn!(frames = trace.len(), "flat trace, normalizing to zeros");
            }
            return vec![0.0; trace.len()];
        }

        trace.iter().map(|v| (v - min) / range).collect()
    }

    /// 1 where `normalized` exceeds `threshold`, 0 elsewhere
    pub fn threshold(normalized: &[f64], threshold: f64) -> BinaryTrace {
        normalized
            .iter()
            .map(|&v| u8::from(v > threshold))
            .collect()
    }
}
