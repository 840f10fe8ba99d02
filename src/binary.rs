//! Binary trace helpers
//!
//! Run-length scans over 0/1 traces: change points, bout extraction, removal of
//! short bouts and bridging of short gaps between bouts. Any non-zero value is
//! treated as "active".

use crate::error::AnalysisError;
use crate::types::{BinaryTrace, Bout, BoutTable};

/// A maximal run of equal values
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Run {
    active: bool,
    start: usize,
    len: usize,
}

fn runs(binary: &[u8]) -> Vec<Run> {
    let mut runs: Vec<Run> = Vec::new();
    for (i, &v) in binary.iter().enumerate() {
        let active = v != 0;
        match runs.last_mut() {
            Some(run) if run.active == active => run.len += 1,
            _ => runs.push(Run {
                active,
                start: i,
                len: 1,
            }),
        }
    }
    runs
}

/// Convert a duration in seconds to a (fractional) frame count
fn seconds_to_frames(fs: f64, seconds: f64) -> f64 {
    seconds * fs
}

/// Indices where the trace changes value.
///
/// Index 0 is always present, as if the trace were preceded by a value that
/// differs from every sample. A single entry means the trace is uniform.
pub fn change_points(binary: &[u8]) -> Vec<usize> {
    runs(binary).iter().map(|run| run.start).collect()
}

/// Durations and start frames of the runs of 1s, left to right.
///
/// A run that starts at frame 0 began before the recording did; its onset and
/// duration are unknown, so it is not reported.
pub fn calc_event_duration(binary: &[u8]) -> BoutTable {
    runs(binary)
        .into_iter()
        .filter(|run| run.active && run.start > 0)
        .map(|run| Bout {
            location: run.start,
            duration: run.len,
        })
        .collect()
}

/// Zero out every run of 1s shorter than `min_duration` seconds
pub fn remove_short_events(binary: &[u8], fs: f64, min_duration: f64) -> BinaryTrace {
    let min_frames = seconds_to_frames(fs, min_duration);
    let mut cleaned: BinaryTrace = binary.iter().map(|&v| u8::from(v != 0)).collect();

    for run in runs(binary) {
        if run.active && (run.len as f64) < min_frames {
            cleaned[run.start..run.start + run.len].fill(0);
        }
    }
    cleaned
}

/// Fill every run of 0s shorter than `max_gap` seconds that sits between two
/// runs of 1s. Leading and trailing 0s are left alone.
pub fn remove_short_interevent_periods(binary: &[u8], fs: f64, max_gap: f64) -> BinaryTrace {
    let max_frames = seconds_to_frames(fs, max_gap);
    let mut joined: BinaryTrace = binary.iter().map(|&v| u8::from(v != 0)).collect();

    let runs = runs(binary);
    let last = runs.len().saturating_sub(1);
    for (i, run) in runs.iter().enumerate() {
        let interior = i > 0 && i < last;
        if !run.active && interior && (run.len as f64) < max_frames {
            joined[run.start..run.start + run.len].fill(1);
        }
    }
    joined
}

/// Check that every sample is 0 or 1
pub fn validate_binary(binary: &[u8]) -> Result<(), AnalysisError> {
    match binary.iter().enumerate().find(|&(_, &v)| v > 1) {
        Some((index, &value)) => Err(AnalysisError::InvalidBinary { index, value }),
        None => Ok(()),
    }
}

/// Number of active frames
pub fn count_active(binary: &[u8]) -> usize {
    binary.iter().filter(|&&v| v != 0).count()
}
