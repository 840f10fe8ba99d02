//! Bout statistics
//!
//! Derives the summary scalars of a cleaned binary trace:
//! - Fraction of frames spent whisking
//! - Bout durations and start frames
//! - Mean and longest bout duration in seconds

use crate::binary::{calc_event_duration, change_points, count_active};
use crate::types::BoutStatistics;

/// Feature deriver for cleaned whisking traces
pub struct FeatureDeriver;

impl FeatureDeriver {
    /// Summarize `binary` sampled at `fs` Hz
    pub fn derive(binary: &[u8], fs: f64) -> BoutStatistics {
        let percentage_whisking = compute_percentage_whisking(binary);

        // A single change point means one state for the whole trace
        if change_points(binary).len() <= 1 {
            return BoutStatistics::NoBouts {
                percentage_whisking,
            };
        }

        let table = calc_event_duration(binary);
        debug_assert!(table
            .to_binary(binary.len())
            .iter()
            .zip(binary)
            .all(|(&rebuilt, &v)| rebuilt <= u8::from(v != 0)));
        if table.is_empty() {
            return BoutStatistics::NoBouts {
                percentage_whisking,
            };
        }
        let mean_duration_s = compute_mean_frames(&table.durations) / fs;
        let max_duration_s = table.durations.iter().copied().max().unwrap_or(0) as f64 / fs;

        BoutStatistics::Bouts {
            durations: table.durations,
            locations: table.locations,
            percentage_whisking,
            mean_duration_s,
            max_duration_s,
        }
    }
}

/// Fraction of frames with value 1
fn compute_percentage_whisking(binary: &[u8]) -> f64 {
    if binary.is_empty() {
        return 0.0;
    }
    count_active(binary) as f64 / binary.len() as f64
}

fn compute_mean_frames(durations: &[usize]) -> f64 {
    if durations.is_empty() {
        return 0.0;
    }
    durations.iter().sum::<usize>() as f64 / durations.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_two_bout_scenario() {
        let binary = [0, 0, 1, 1, 1, 0, 0, 1, 0, 0];
        let stats = FeatureDeriver::derive(&binary, 1.0);

        match stats {
            BoutStatistics::Bouts {
                durations,
                locations,
                percentage_whisking,
                mean_duration_s,
                max_duration_s,
            } => {
                assert_eq!(locations, vec![2, 7]);
                assert_eq!(durations, vec![3, 1]);
                assert!((percentage_whisking - 0.4).abs() < 1e-12);
                assert!((mean_duration_s - 2.0).abs() < 1e-12);
                assert!((max_duration_s - 3.0).abs() < 1e-12);
            }
            other => panic!("expected bouts, got {:?}", other),
        }
    }

    #[test]
    fn test_durations_scale_with_sampling_rate() {
        let binary = [0, 1, 1, 1, 1, 0, 0, 1, 1];
        let stats = FeatureDeriver::derive(&binary, 2.0);

        assert_eq!(stats.bout_count(), 2);
        if let BoutStatistics::Bouts {
            mean_duration_s,
            max_duration_s,
            ..
        } = stats
        {
            assert!((mean_duration_s - 1.5).abs() < 1e-12);
            assert!((max_duration_s - 2.0).abs() < 1e-12);
        }
    }

    #[test]
    fn test_uniform_zero_trace() {
        let stats = FeatureDeriver::derive(&[0, 0, 0, 0], 30.0);
        assert_eq!(
            stats,
            BoutStatistics::NoBouts {
                percentage_whisking: 0.0
            }
        );
    }

    #[test]
    fn test_leading_run_only_has_no_bouts() {
        let stats = FeatureDeriver::derive(&[1, 1, 0, 0], 1.0);
        assert_eq!(
            stats,
            BoutStatistics::NoBouts {
                percentage_whisking: 0.5
            }
        );
    }

    #[test]
    fn test_uniform_active_trace_reports_full_percentage() {
        let stats = FeatureDeriver::derive(&[1, 1, 1], 30.0);
        assert_eq!(
            stats,
            BoutStatistics::NoBouts {
                percentage_whisking: 1.0
            }
        );
    }
}
