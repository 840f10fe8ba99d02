//! Error types for whisking analysis

use thiserror::Error;

/// Errors that can occur while loading or analysing a whisking trace
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("Failed to read motion file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Failed to parse motion file: {0}")]
    ParseError(String),

    #[error("Motion channel {0} is missing or not numeric")]
    MissingChannel(usize),

    #[error("Trace is empty: {0}")]
    EmptyTrace(String),

    #[error("Invalid settings: {0}")]
    InvalidSettings(String),

    #[error("Trace lengths differ: whisking has {whisking} frames, locomotion has {locomotion}")]
    LengthMismatch { whisking: usize, locomotion: usize },

    #[error("Binary trace contains {value} at frame {index}; only 0 and 1 are allowed")]
    InvalidBinary { index: usize, value: u8 },
}
