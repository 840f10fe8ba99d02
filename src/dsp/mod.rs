//! Numeric backend
//!
//! The pipeline only needs two signal-processing primitives: band-limited
//! resampling and Gaussian smoothing. They sit behind `NumericBackend` so the
//! bout logic can be exercised with a stand-in backend.

mod gaussian;
mod resample;

pub use gaussian::{gaussian_filter1d, gaussian_kernel1d, DEFAULT_TRUNCATE};
pub use resample::resample;

use crate::error::AnalysisError;

/// Trait for the array primitives the pipeline depends on
pub trait NumericBackend {
    /// Resample `signal` to exactly `num` samples in the Fourier domain
    fn resample(&self, signal: &[f64], num: usize) -> Result<Vec<f64>, AnalysisError>;

    /// Smooth `signal` with a Gaussian kernel of width `sigma` (samples)
    fn gaussian_filter1d(&self, signal: &[f64], sigma: f64) -> Vec<f64>;
}

/// Default backend built on `rustfft`
#[derive(Debug, Clone, Copy, Default)]
pub struct RustFftBackend;

impl NumericBackend for RustFftBackend {
    fn resample(&self, signal: &[f64], num: usize) -> Result<Vec<f64>, AnalysisError> {
        resample(signal, num)
    }

    fn gaussian_filter1d(&self, signal: &[f64], sigma: f64) -> Vec<f64> {
        gaussian_filter1d(signal, sigma, DEFAULT_TRUNCATE)
    }
}
