//! Core types for the whisking pipeline
//!
//! This module defines the data structures that flow out of each stage of the
//! pipeline: binary traces, bouts, bout statistics and the tagged results of the
//! two entry operations.

use serde::{Deserialize, Serialize};

/// Thresholded trace, one 0/1 value per frame
pub type BinaryTrace = Vec<u8>;

/// A maximal contiguous run of whisking frames
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bout {
    /// Index of the first frame of the run
    pub location: usize,
    /// Run length in frames
    pub duration: usize,
}

impl Bout {
    /// Index one past the last frame of the run
    pub fn end(&self) -> usize {
        self.location + self.duration
    }
}

/// Bouts of a binary trace as two parallel columns, in left-to-right order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoutTable {
    /// Duration of each bout (frames)
    pub durations: Vec<usize>,
    /// Start frame of each bout
    pub locations: Vec<usize>,
}

impl BoutTable {
    pub fn len(&self) -> usize {
        self.durations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.durations.is_empty()
    }

    /// Iterate the table as `Bout` records
    pub fn bouts(&self) -> impl Iterator<Item = Bout> + '_ {
        self.locations
            .iter()
            .zip(self.durations.iter())
            .map(|(&location, &duration)| Bout { location, duration })
    }

    /// Rebuild a binary trace of `len` frames with 1 inside every bout
    pub fn to_binary(&self, len: usize) -> BinaryTrace {
        let mut binary = vec![0u8; len];
        for bout in self.bouts() {
            let end = bout.end().min(len);
            binary[bout.location.min(len)..end].fill(1);
        }
        binary
    }
}

impl FromIterator<Bout> for BoutTable {
    fn from_iter<I: IntoIterator<Item = Bout>>(iter: I) -> Self {
        let mut table = BoutTable::default();
        for bout in iter {
            table.durations.push(bout.duration);
            table.locations.push(bout.location);
        }
        table
    }
}

/// Summary of the cleaned binary trace
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum BoutStatistics {
    /// No bout could be reported: the cleaned trace holds a single state
    /// throughout, or its only whisking run starts at the first frame
    NoBouts {
        /// Fraction of frames whisking, 0-1
        percentage_whisking: f64,
    },
    /// At least one bout was found
    Bouts {
        /// Bout durations (frames)
        durations: Vec<usize>,
        /// Bout start frames
        locations: Vec<usize>,
        /// Fraction of frames whisking, 0-1
        percentage_whisking: f64,
        /// Mean bout duration (seconds)
        mean_duration_s: f64,
        /// Longest bout duration (seconds)
        max_duration_s: f64,
    },
}

impl BoutStatistics {
    pub fn percentage_whisking(&self) -> f64 {
        match self {
            BoutStatistics::NoBouts {
                percentage_whisking,
            }
            | BoutStatistics::Bouts {
                percentage_whisking,
                ..
            } => *percentage_whisking,
        }
    }

    /// Number of reported bouts
    pub fn bout_count(&self) -> usize {
        match self {
            BoutStatistics::NoBouts { .. } => 0,
            BoutStatistics::Bouts { durations, .. } => durations.len(),
        }
    }
}

/// Every intermediate trace of one analysed recording plus its statistics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WhiskingResult {
    /// Path of the motion-tracking output the trace was read from
    pub path_analysis_file: String,
    /// Raw motion trace as loaded
    pub original_trace: Vec<f64>,
    /// Trace resampled to the reference length
    pub resampled_trace: Vec<f64>,
    /// Gaussian-smoothed trace
    pub filtered_trace: Vec<f64>,
    /// Min-max normalized trace, 0-1
    pub normalized_trace: Vec<f64>,
    /// Thresholded trace before bout cleanup
    pub original_binary_whisking: BinaryTrace,
    /// Thresholded trace after short bouts are removed and gaps joined
    pub binary_whisking: BinaryTrace,
    /// Bout statistics of `binary_whisking`
    pub statistics: BoutStatistics,
}

/// Outcome of analysing one motion file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", content = "result", rename_all = "snake_case")]
pub enum WhiskingAnalysis {
    /// The file carried no `motion` entry
    NoData,
    /// The trace was analysed
    Analyzed(WhiskingResult),
}

impl WhiskingAnalysis {
    pub fn result(&self) -> Option<&WhiskingResult> {
        match self {
            WhiskingAnalysis::NoData => None,
            WhiskingAnalysis::Analyzed(result) => Some(result),
        }
    }

    pub fn into_result(self) -> Option<WhiskingResult> {
        match self {
            WhiskingAnalysis::NoData => None,
            WhiskingAnalysis::Analyzed(result) => Some(result),
        }
    }
}

/// Whisking bouts that do not overlap locomotion
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum IsolatedWhisking {
    /// No whisking frames remained after masking and cleanup
    NoBouts,
    /// Whisking frames remained. A run starting at frame 0 is kept in
    /// `binary` but not listed in the table.
    Bouts {
        /// Masked and cleaned binary trace
        binary: BinaryTrace,
        /// Bout durations (frames)
        durations: Vec<usize>,
        /// Bout start frames
        locations: Vec<usize>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_bout_table_to_binary() {
        let table = BoutTable {
            durations: vec![3, 1],
            locations: vec![2, 7],
        };
        assert_eq!(table.to_binary(10), vec![0, 0, 1, 1, 1, 0, 0, 1, 0, 0]);
    }

    #[test]
    fn test_bout_table_from_bouts() {
        let table: BoutTable = vec![
            Bout {
                location: 0,
                duration: 2,
            },
            Bout {
                location: 5,
                duration: 4,
            },
        ]
        .into_iter()
        .collect();

        assert_eq!(table.durations, vec![2, 4]);
        assert_eq!(table.locations, vec![0, 5]);
        assert_eq!(table.bouts().last().map(|b| b.end()), Some(9));
    }

    #[test]
    fn test_statistics_serialize_with_status_tag() {
        let stats = BoutStatistics::NoBouts {
            percentage_whisking: 0.0,
        };
        let json = serde_json::to_value(&stats).unwrap();
        assert_eq!(json["status"], "no_bouts");
        assert_eq!(stats.bout_count(), 0);

        let isolated = IsolatedWhisking::NoBouts;
        let json = serde_json::to_value(&isolated).unwrap();
        assert_eq!(json["status"], "no_bouts");
    }
}
