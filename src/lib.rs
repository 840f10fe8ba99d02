//! Whisking - whisking bout detection from whisker-motion traces
//!
//! Turns the whisker-pad motion energy exported by a video motion-tracking tool
//! into a binary whisking trace aligned to a reference time series, through a
//! deterministic pipeline: load → resample → Gaussian filter → min-max
//! normalization → threshold → bout cleanup → bout statistics.
//!
//! ## Modules
//!
//! - **Whisking pipeline**: `process_whisking` analyses one motion file
//! - **Whisking only**: `whisking_only` keeps bouts that do not overlap locomotion

pub mod adapters;
pub mod binary;
pub mod dsp;
pub mod error;
pub mod features;
pub mod normalizer;
pub mod pipeline;
pub mod settings;
pub mod types;

// FFI bindings for C interop (always available for cdylib/staticlib builds)
pub mod ffi;

pub use error::AnalysisError;
pub use pipeline::{process_whisking, whisking_only, WhiskingProcessor};
pub use settings::{Settings, WhiskingSettings, DEFAULT_REC_POINTS};
pub use types::{BoutStatistics, IsolatedWhisking, WhiskingAnalysis, WhiskingResult};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Producer name embedded in CLI summaries
pub const PRODUCER_NAME: &str = "whisking";
