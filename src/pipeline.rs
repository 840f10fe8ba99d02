//! Pipeline orchestration
//!
//! This module provides the public API for whisking analysis. It runs a motion
//! trace through load → resample → filter → normalize → threshold → bout
//! cleanup → bout statistics, and separately isolates whisking bouts that do
//! not overlap locomotion.

use std::path::Path;

use tracing::{debug, info, warn};

use crate::adapters::{JsonMotionAdapter, MotionFileAdapter};
use crate::binary::{
    calc_event_duration, count_active, remove_short_events, remove_short_interevent_periods,
    validate_binary,
};
use crate::dsp::{NumericBackend, RustFftBackend};
use crate::error::AnalysisError;
use crate::features::FeatureDeriver;
use crate::normalizer::Normalizer;
use crate::settings::{validate_rec_points, Settings};
use crate::types::{BinaryTrace, IsolatedWhisking, WhiskingAnalysis, WhiskingResult};

/// Analyse the whisker trace stored in a motion-tracking export.
///
/// # Arguments
/// * `file_path` - JSON export of the motion-tracking tool
/// * `settings` - Sampling rate and whisking parameters
/// * `rec_points` - Number of reference frames to resample to (usually `DEFAULT_REC_POINTS`)
///
/// # Returns
/// `WhiskingAnalysis::NoData` when the file has no motion entry, otherwise
/// every intermediate trace and the bout statistics.
///
/// # Example
/// ```ignore
/// let analysis = process_whisking("session_proc.json", &Settings::default(), DEFAULT_REC_POINTS)?;
/// ```
pub fn process_whisking(
    file_path: impl AsRef<Path>,
    settings: &Settings,
    rec_points: usize,
) -> Result<WhiskingAnalysis, AnalysisError> {
    let processor = WhiskingProcessor::new(settings.clone())?;
    processor.process_file(file_path, rec_points)
}

/// Keep the whisking frames that do not coincide with locomotion.
///
/// # Arguments
/// * `binary_whisking` - Binary whisking trace
/// * `binary_locomotion` - Binary locomotion trace aligned frame for frame
/// * `settings` - Supplies `fs` and `whisking.whisk_min_duration`
pub fn whisking_only(
    binary_whisking: &[u8],
    binary_locomotion: &[u8],
    settings: &Settings,
) -> Result<IsolatedWhisking, AnalysisError> {
    let processor = WhiskingProcessor::new(settings.clone())?;
    processor.whisking_only(binary_whisking, binary_locomotion)
}

/// Reusable processor holding validated settings, a numeric backend and a
/// motion file adapter.
pub struct WhiskingProcessor {
    settings: Settings,
    backend: Box<dyn NumericBackend>,
    adapter: Box<dyn MotionFileAdapter>,
}

impl WhiskingProcessor {
    /// Create a processor with the default FFT backend and JSON adapter
    pub fn new(settings: Settings) -> Result<Self, AnalysisError> {
        Self::with_backend(settings, Box::new(RustFftBackend))
    }

    /// Create a processor with a specific numeric backend
    pub fn with_backend(
        settings: Settings,
        backend: Box<dyn NumericBackend>,
    ) -> Result<Self, AnalysisError> {
        settings.validate()?;
        if settings.whisking.join_bouts && !settings.whisking.remove_short_bouts {
            warn!("'join bouts' only applies together with 'remove short bouts'; bouts will not be joined");
        }
        Ok(Self {
            settings,
            backend,
            adapter: Box::new(JsonMotionAdapter),
        })
    }

    /// Replace the motion file adapter
    pub fn with_adapter(mut self, adapter: Box<dyn MotionFileAdapter>) -> Self {
        self.adapter = adapter;
        self
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Load a motion file and analyse its whisker trace
    pub fn process_file(
        &self,
        file_path: impl AsRef<Path>,
        rec_points: usize,
    ) -> Result<WhiskingAnalysis, AnalysisError> {
        let file_path = file_path.as_ref();
        validate_rec_points(rec_points)?;

        // Stage 1: Load the whisker channel
        let whisker_motion = match self.adapter.load(file_path)? {
            Some(trace) => trace,
            None => {
                info!(path = %file_path.display(), "no motion data");
                return Ok(WhiskingAnalysis::NoData);
            }
        };

        let result =
            self.process_trace(&file_path.display().to_string(), whisker_motion, rec_points)?;
        Ok(WhiskingAnalysis::Analyzed(result))
    }

    /// Analyse a whisker trace that is already in memory.
    ///
    /// `path_analysis_file` is recorded as-is in the result.
    pub fn process_trace(
        &self,
        path_analysis_file: &str,
        whisker_motion: Vec<f64>,
        rec_points: usize,
    ) -> Result<WhiskingResult, AnalysisError> {
        validate_rec_points(rec_points)?;
        if whisker_motion.is_empty() {
            return Err(AnalysisError::EmptyTrace(format!(
                "no motion samples in {}",
                path_analysis_file
            )));
        }
        let whisking = &self.settings.whisking;

        // Stage 2: Align to the reference frame count
        let len_rec = whisker_motion.len();
        let resampled_trace = if len_rec != rec_points {
            info!(from = len_rec, to = rec_points, "resampling whisker trace");
            self.backend.resample(&whisker_motion, rec_points)?
        } else {
            whisker_motion.clone()
        };

        // Stage 3: Smooth
        let filtered_trace = self
            .backend
            .gaussian_filter1d(&resampled_trace, whisking.sigma);

        // Stage 4: Normalize to 0-1
        let normalized_trace = Normalizer::min_max(&filtered_trace);

        // Stage 5: Threshold
        let original_binary_whisking =
            Normalizer::threshold(&normalized_trace, self.settings.threshold());

        // Stage 6: Drop short bouts, then bridge short gaps
        let binary_whisking = self.clean_bouts(&original_binary_whisking);

        // Stage 7: Bout statistics
        let statistics = FeatureDeriver::derive(&binary_whisking, self.settings.fs);
        debug!(
            frames = binary_whisking.len(),
            bouts = statistics.bout_count(),
            percentage = statistics.percentage_whisking(),
            "whisking analysed"
        );

        Ok(WhiskingResult {
            path_analysis_file: path_analysis_file.to_string(),
            original_trace: whisker_motion,
            resampled_trace,
            filtered_trace,
            normalized_trace,
            original_binary_whisking,
            binary_whisking,
            statistics,
        })
    }

    /// Keep whisking frames where locomotion is absent, drop short bouts and
    /// report what remains
    pub fn whisking_only(
        &self,
        binary_whisking: &[u8],
        binary_locomotion: &[u8],
    ) -> Result<IsolatedWhisking, AnalysisError> {
        if binary_whisking.len() != binary_locomotion.len() {
            return Err(AnalysisError::LengthMismatch {
                whisking: binary_whisking.len(),
                locomotion: binary_locomotion.len(),
            });
        }
        validate_binary(binary_whisking)?;
        validate_binary(binary_locomotion)?;

        let combined: BinaryTrace = binary_whisking
            .iter()
            .zip(binary_locomotion)
            .map(|(&w, &r)| u8::from(w == 1 && r == 0))
            .collect();

        let binary = remove_short_events(
            &combined,
            self.settings.fs,
            self.settings.whisking.whisk_min_duration,
        );

        if count_active(&binary) < 1 {
            debug!("no whisking outside locomotion");
            return Ok(IsolatedWhisking::NoBouts);
        }

        // A run starting at frame 0 stays in `binary` but has no table entry
        let table = calc_event_duration(&binary);
        Ok(IsolatedWhisking::Bouts {
            binary,
            durations: table.durations,
            locations: table.locations,
        })
    }

    fn clean_bouts(&self, binary: &[u8]) -> BinaryTrace {
        let whisking = &self.settings.whisking;
        if !whisking.remove_short_bouts {
            return binary.to_vec();
        }

        let cleaned = remove_short_events(binary, self.settings.fs, whisking.whisk_min_duration);
        if whisking.join_bouts {
            remove_short_interevent_periods(&cleaned, self.settings.fs, whisking.whisk_max_inter_bout)
        } else {
            cleaned
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::{WhiskingSettings, DEFAULT_REC_POINTS};
    use crate::types::BoutStatistics;
    use pretty_assertions::assert_eq;
    use std::cell::Cell;
    use std::io::Write;
    use std::rc::Rc;

    fn raw_settings(sigma: f64, percentile: f64) -> Settings {
        Settings {
            fs: 1.0,
            whisking: WhiskingSettings {
                sigma,
                percentile,
                remove_short_bouts: false,
                whisk_min_duration: 0.0,
                join_bouts: false,
                whisk_max_inter_bout: 0.0,
            },
        }
    }

    /// Backend that records resample calls and leaves traces untouched
    struct CountingBackend {
        resample_calls: Rc<Cell<usize>>,
    }

    impl NumericBackend for CountingBackend {
        fn resample(&self, signal: &[f64], num: usize) -> Result<Vec<f64>, AnalysisError> {
            self.resample_calls.set(self.resample_calls.get() + 1);
            let mut out = signal.to_vec();
            out.resize(num, 0.0);
            Ok(out)
        }

        fn gaussian_filter1d(&self, signal: &[f64], _sigma: f64) -> Vec<f64> {
            signal.to_vec()
        }
    }

    /// Adapter serving a fixed trace regardless of path
    struct FixedAdapter(Option<Vec<f64>>);

    impl MotionFileAdapter for FixedAdapter {
        fn load(&self, _path: &Path) -> Result<Option<Vec<f64>>, AnalysisError> {
            Ok(self.0.clone())
        }
    }

    fn write_export(json: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(json.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_two_bout_scenario() {
        let processor = WhiskingProcessor::new(raw_settings(0.0, 50.0)).unwrap();
        let trace = vec![0.0, 0.0, 5.0, 5.0, 5.0, 0.0, 0.0, 5.0, 0.0, 0.0];

        let result = processor.process_trace("memory", trace.clone(), 10).unwrap();

        assert_eq!(result.resampled_trace, trace);
        assert_eq!(
            result.binary_whisking,
            vec![0, 0, 1, 1, 1, 0, 0, 1, 0, 0]
        );
        assert_eq!(
            result.statistics,
            BoutStatistics::Bouts {
                durations: vec![3, 1],
                locations: vec![2, 7],
                percentage_whisking: 0.4,
                mean_duration_s: 2.0,
                max_duration_s: 3.0,
            }
        );
    }

    #[test]
    fn test_matching_length_skips_resampling() {
        let calls = Rc::new(Cell::new(0));
        let backend = CountingBackend {
            resample_calls: calls.clone(),
        };
        let processor =
            WhiskingProcessor::with_backend(raw_settings(2.0, 50.0), Box::new(backend)).unwrap();

        processor
            .process_trace("memory", vec![1.0, 2.0, 3.0], 3)
            .unwrap();
        assert_eq!(calls.get(), 0);

        let result = processor
            .process_trace("memory", vec![1.0, 2.0, 3.0], 5)
            .unwrap();
        assert_eq!(calls.get(), 1);
        assert_eq!(result.resampled_trace.len(), 5);
    }

    #[test]
    fn test_resampled_lengths_match_target() {
        let processor = WhiskingProcessor::new(Settings::default()).unwrap();
        let trace: Vec<f64> = (0..1200).map(|i| ((i as f64) * 0.05).sin().abs()).collect();

        for rec_points in [600, 1200, 2500] {
            let result = processor
                .process_trace("memory", trace.clone(), rec_points)
                .unwrap();
            assert_eq!(result.resampled_trace.len(), rec_points);
            assert_eq!(result.filtered_trace.len(), rec_points);
            assert_eq!(result.normalized_trace.len(), rec_points);
            assert_eq!(result.binary_whisking.len(), rec_points);
        }
    }

    #[test]
    fn test_normalized_trace_spans_unit_range() {
        let processor = WhiskingProcessor::new(Settings::default()).unwrap();
        let trace: Vec<f64> = (0..300).map(|i| ((i as f64) * 0.1).cos() * 10.0).collect();

        let result = processor.process_trace("memory", trace, 300).unwrap();
        let min = result
            .normalized_trace
            .iter()
            .cloned()
            .fold(f64::INFINITY, f64::min);
        let max = result
            .normalized_trace
            .iter()
            .cloned()
            .fold(f64::NEG_INFINITY, f64::max);
        assert!(min.abs() < 1e-9);
        assert!((max - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_flat_trace_reports_no_whisking() {
        let processor = WhiskingProcessor::new(Settings::default()).unwrap();
        let result = processor
            .process_trace("memory", vec![7.0; 90], 90)
            .unwrap();

        assert!(result.normalized_trace.iter().all(|&v| v == 0.0));
        assert_eq!(
            result.statistics,
            BoutStatistics::NoBouts {
                percentage_whisking: 0.0
            }
        );
    }

    #[test]
    fn test_short_bouts_removed_then_joined() {
        let mut settings = raw_settings(0.0, 50.0);
        settings.whisking.remove_short_bouts = true;
        settings.whisking.whisk_min_duration = 2.0;
        settings.whisking.join_bouts = true;
        settings.whisking.whisk_max_inter_bout = 3.0;
        let processor = WhiskingProcessor::new(settings).unwrap();

        // One-frame bout, then bouts separated by gaps of 2 and 3 frames
        let trace = vec![
            0.0, 1.0, 0.0, 1.0, 1.0, 0.0, 0.0, 1.0, 1.0, 0.0, 0.0, 0.0, 1.0, 1.0, 0.0,
        ];
        let result = processor.process_trace("memory", trace, 15).unwrap();

        assert_eq!(
            result.original_binary_whisking,
            vec![0, 1, 0, 1, 1, 0, 0, 1, 1, 0, 0, 0, 1, 1, 0]
        );
        assert_eq!(
            result.binary_whisking,
            vec![0, 0, 0, 1, 1, 1, 1, 1, 1, 0, 0, 0, 1, 1, 0]
        );
        assert_eq!(result.statistics.bout_count(), 2);
    }

    #[test]
    fn test_join_requires_remove_short_bouts() {
        let mut settings = raw_settings(0.0, 50.0);
        settings.whisking.join_bouts = true;
        settings.whisking.whisk_max_inter_bout = 10.0;
        let processor = WhiskingProcessor::new(settings).unwrap();

        let trace = vec![0.0, 1.0, 0.0, 1.0, 0.0];
        let result = processor.process_trace("memory", trace, 5).unwrap();
        assert_eq!(result.binary_whisking, result.original_binary_whisking);
    }

    #[test]
    fn test_process_file() {
        let file = write_export(r#"{"motion": [[], [0, 0, 4, 4, 4, 0, 0, 4, 0, 0]]}"#);

        let analysis = process_whisking(file.path(), &raw_settings(0.0, 50.0), 10).unwrap();
        let result = analysis.result().expect("analysed");

        assert_eq!(result.path_analysis_file, file.path().display().to_string());
        assert_eq!(result.original_trace.len(), 10);
        assert_eq!(result.statistics.bout_count(), 2);
    }

    #[test]
    fn test_custom_adapter_feeds_pipeline() {
        let trace = vec![0.0, 0.0, 4.0, 4.0, 4.0, 0.0, 0.0, 4.0, 0.0, 0.0];
        let processor = WhiskingProcessor::new(raw_settings(0.0, 50.0))
            .unwrap()
            .with_adapter(Box::new(FixedAdapter(Some(trace))));

        let analysis = processor.process_file("not-on-disk.json", 10).unwrap();
        let result = analysis.into_result().expect("analysed");
        assert_eq!(result.path_analysis_file, "not-on-disk.json");
        assert_eq!(result.binary_whisking, vec![0, 0, 1, 1, 1, 0, 0, 1, 0, 0]);

        let processor = WhiskingProcessor::new(Settings::default())
            .unwrap()
            .with_adapter(Box::new(FixedAdapter(None)));
        assert_eq!(
            processor.process_file("empty.json", 10).unwrap(),
            WhiskingAnalysis::NoData
        );
    }

    #[test]
    fn test_process_file_without_motion_is_no_data() {
        let file = write_export(r#"{"filenames": ["cam0.avi"]}"#);
        let analysis = process_whisking(file.path(), &Settings::default(), DEFAULT_REC_POINTS)
            .unwrap();
        assert_eq!(analysis, WhiskingAnalysis::NoData);
    }

    #[test]
    fn test_malformed_file_is_fatal() {
        let file = write_export("{ not json");
        let result = process_whisking(file.path(), &Settings::default(), DEFAULT_REC_POINTS);
        assert!(matches!(result, Err(AnalysisError::Json(_))));
    }

    #[test]
    fn test_invalid_settings_rejected() {
        let mut settings = Settings::default();
        settings.fs = -1.0;
        assert!(WhiskingProcessor::new(settings).is_err());

        let processor = WhiskingProcessor::new(Settings::default()).unwrap();
        assert!(processor.process_trace("memory", vec![1.0], 0).is_err());
        assert!(matches!(
            processor.process_trace("memory", vec![], 10),
            Err(AnalysisError::EmptyTrace(_))
        ));
    }

    #[test]
    fn test_whisking_only_scenario() {
        let result = whisking_only(&[1, 1, 0, 1, 1], &[0, 1, 0, 0, 0], &raw_settings(0.0, 50.0))
            .unwrap();

        assert_eq!(
            result,
            IsolatedWhisking::Bouts {
                binary: vec![1, 0, 0, 1, 1],
                durations: vec![2],
                locations: vec![3],
            }
        );
    }

    #[test]
    fn test_whisking_only_keeps_trace_when_only_run_is_leading() {
        let result = whisking_only(&[1, 1, 0, 0, 0], &[0, 0, 0, 0, 0], &raw_settings(0.0, 50.0))
            .unwrap();

        assert_eq!(
            result,
            IsolatedWhisking::Bouts {
                binary: vec![1, 1, 0, 0, 0],
                durations: vec![],
                locations: vec![],
            }
        );
    }

    #[test]
    fn test_whisking_only_during_locomotion_is_empty() {
        let result = whisking_only(&[0, 1, 1, 0], &[0, 1, 1, 1], &raw_settings(0.0, 50.0))
            .unwrap();
        assert_eq!(result, IsolatedWhisking::NoBouts);
    }

    #[test]
    fn test_whisking_only_applies_minimum_duration() {
        let mut settings = raw_settings(0.0, 50.0);
        settings.whisking.whisk_min_duration = 3.0;

        let result = whisking_only(
            &[0, 1, 1, 0, 1, 1, 1, 1],
            &[0, 0, 0, 0, 0, 0, 0, 0],
            &settings,
        )
        .unwrap();
        assert_eq!(
            result,
            IsolatedWhisking::Bouts {
                binary: vec![0, 0, 0, 0, 1, 1, 1, 1],
                durations: vec![4],
                locations: vec![4],
            }
        );
    }

    #[test]
    fn test_whisking_only_rejects_mismatched_inputs() {
        let settings = Settings::default();
        assert!(matches!(
            whisking_only(&[1, 0], &[0], &settings),
            Err(AnalysisError::LengthMismatch {
                whisking: 2,
                locomotion: 1
            })
        ));
        assert!(matches!(
            whisking_only(&[1, 3], &[0, 0], &settings),
            Err(AnalysisError::InvalidBinary { index: 1, value: 3 })
        ));
    }
}
