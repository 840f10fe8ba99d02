//! Fourier-domain resampling
//!
//! The spectrum of the input is truncated (downsampling) or zero-padded
//! (upsampling) to the target length and transformed back. An even number of
//! retained bins has its Nyquist component split or folded so the output stays
//! real.

use num_complex::Complex64;
use rustfft::FftPlanner;

use crate::error::AnalysisError;

/// Resample `signal` to `num` samples.
///
/// The output covers the same duration as the input, with sample spacing
/// scaled by `len / num`. Returns an empty vector for `num == 0`.
pub fn resample(signal: &[f64], num: usize) -> Result<Vec<f64>, AnalysisError> {
    let nx = signal.len();
    if nx == 0 {
        return Err(AnalysisError::EmptyTrace(
            "cannot resample an empty signal".to_string(),
        ));
    }
    if num == 0 {
        return Ok(Vec::new());
    }

    let mut planner = FftPlanner::<f64>::new();

    let mut spectrum: Vec<Complex64> = signal.iter().map(|&s| Complex64::new(s, 0.0)).collect();
    planner.plan_fft_forward(nx).process(&mut spectrum);

    let mut resized = vec![Complex64::new(0.0, 0.0); num];
    let n = num.min(nx);
    let nyq = n / 2 + 1;

    // Positive frequencies, including Nyquist when n is even
    resized[..nyq].copy_from_slice(&spectrum[..nyq]);

    // Negative frequencies
    if n > 2 {
        let neg = n - nyq;
        resized[num - neg..].copy_from_slice(&spectrum[nx - neg..]);
    }

    if n % 2 == 0 {
        let half = n / 2;
        if num < nx {
            // Fold the -N/2 component onto +N/2
            resized[num - half] += spectrum[nx - half];
        } else if nx < num {
            // Split +N/2 evenly between +N/2 and -N/2
            resized[half] *= 0.5;
            resized[num - half] = resized[half];
        }
    }

    planner.plan_fft_inverse(num).process(&mut resized);

    // rustfft leaves the inverse unnormalized: 1/num, then the num/nx gain
    let scale = 1.0 / nx as f64;
    Ok(resized.iter().map(|c| c.re * scale).collect())
}
