//! One-dimensional Gaussian smoothing

/// Kernel half-width in standard deviations
pub const DEFAULT_TRUNCATE: f64 = 4.0;

/// Normalized Gaussian kernel of length `2 * radius + 1`
pub fn gaussian_kernel1d(sigma: f64, radius: usize) -> Vec<f64> {
    let r = radius as isize;
    let denom = 2.0 * sigma * sigma;
    let mut kernel: Vec<f64> = (-r..=r)
        .map(|x| (-((x * x) as f64) / denom).exp())
        .collect();
    let sum: f64 = kernel.iter().sum();
    for w in &mut kernel {
        *w /= sum;
    }
    kernel
}

/// Convolve `signal` with a Gaussian of width `sigma`.
///
/// The kernel extends `truncate` standard deviations on each side. Samples
/// outside the signal are taken from its half-sample symmetric reflection
/// (`d c b a | a b c d | d c b a`). A non-positive `sigma` returns the input.
/// The radius is capped at the signal length.
pub fn gaussian_filter1d(signal: &[f64], sigma: f64, truncate: f64) -> Vec<f64> {
    if signal.is_empty() || sigma <= 0.0 {
        return signal.to_vec();
    }

    let radius = ((truncate * sigma + 0.5) as usize).min(signal.len());
    let kernel = gaussian_kernel1d(sigma, radius);
    let n = signal.len() as isize;
    let r = radius as isize;

    (0..n)
        .map(|i| {
            kernel
                .iter()
                .zip(-r..=r)
                .map(|(w, offset)| w * signal[reflect_index(i + offset, n)])
                .sum::<f64>()
        })
        .collect()
}

/// Map any index onto `0..n` by repeated symmetric reflection
fn reflect_index(index: isize, n: isize) -> usize {
    let period = 2 * n;
    let m = index.rem_euclid(period);
    if m < n {
        m as usize
    } else {
        (period - 1 - m) as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kernel_is_normalized_and_symmetric() {
        let kernel = gaussian_kernel1d(2.0, 8);
        assert_eq!(kernel.len(), 17);
        assert!((kernel.iter().sum::<f64>() - 1.0).abs() < 1e-12);
        for i in 0..8 {
            assert!((kernel[i] - kernel[16 - i]).abs() < 1e-15);
        }
        assert!(kernel[8] > kernel[7]);
    }

    #[test]
    fn test_reflect_index() {
        let n = 4;
        let mapped: Vec<usize> = (-5..9).map(|i| reflect_index(i, n)).collect();
        assert_eq!(mapped, vec![3, 3, 2, 1, 0, 0, 1, 2, 3, 3, 2, 1, 0, 0]);
    }

    #[test]
    fn test_constant_signal_is_unchanged() {
        let signal = vec![3.0; 12];
        // Kernel far wider than the signal still sees only 3.0
        for v in gaussian_filter1d(&signal, 10.0, DEFAULT_TRUNCATE) {
            assert!((v - 3.0).abs() < 1e-12);
        }
    }

    #[test]
    fn test_preserves_length_and_sum_of_impulse() {
        let mut signal = vec![0.0; 41];
        signal[20] = 1.0;
        let out = gaussian_filter1d(&signal, 2.0, DEFAULT_TRUNCATE);

        assert_eq!(out.len(), 41);
        assert!((out.iter().sum::<f64>() - 1.0).abs() < 1e-12);
        assert!((out[19] - out[21]).abs() < 1e-15);
        assert!(out[20] < 1.0);
    }

    #[test]
    fn test_edge_uses_reflection() {
        // sigma 0.5 gives radius 2; index -1 reflects to 0 and -2 to 1
        let signal = vec![1.0, 0.0, 0.0, 0.0];
        let kernel = gaussian_kernel1d(0.5, 2);
        let out = gaussian_filter1d(&signal, 0.5, DEFAULT_TRUNCATE);
        assert!((out[0] - (kernel[1] + kernel[2])).abs() < 1e-12);
    }

    #[test]
    fn test_huge_sigma_keeps_signal_level() {
        let signal = vec![2.0; 6];
        let out = gaussian_filter1d(&signal, 1e20, DEFAULT_TRUNCATE);
        assert_eq!(out.len(), 6);
        for v in out {
            assert!((v - 2.0).abs() < 1e-12);
        }

        let out = gaussian_filter1d(&[0.0, 1.0, 0.0, 1.0], 1e20, DEFAULT_TRUNCATE);
        for v in out {
            assert!(v > 0.0 && v < 1.0);
        }
    }

    #[test]
    fn test_zero_sigma_is_identity() {
        let signal = vec![1.0, 5.0, 2.0];
        assert_eq!(gaussian_filter1d(&signal, 0.0, DEFAULT_TRUNCATE), signal);
    }
}
