//! Error types for har-capture
//!
//! Defines module-specific error types using thiserror for clear error propagation.
//!
//! Only configuration errors are fatal. Sensor, control and persistence
//! failures are reported and the tick loop keeps running.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for har-capture
#[derive(Error, Debug)]
pub enum Error {
    /// Errors from the shared library (config parsing, input parsing)
    #[error(transparent)]
    Common(#[from] har_common::Error),

    /// Configuration validation errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// File I/O errors
    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV reading errors (replay driver, dataset header check)
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Sensor read failure
    #[error("Sensor error: {0}")]
    Sensor(#[from] SensorError),

    /// A labeled window could not be written; the record is lost
    #[error("Failed to persist window to {path}: {reason}")]
    PersistenceWrite { path: PathBuf, reason: String },

    /// Pretrained model could not be loaded or is inconsistent
    #[error("Model error: {0}")]
    Model(String),

    /// JSON decoding errors (model file)
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Resampling requested for a window with no samples
    #[error("Cannot resample an empty capture window")]
    EmptyWindow,
}

/// Sensor driver failures
///
/// All variants are transient from the pipeline's point of view: the sample
/// source substitutes the last good reading.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SensorError {
    /// The driver reported a read failure
    #[error("read failed: {0}")]
    Read(String),

    /// The driver did not answer within its timeout
    #[error("read timed out")]
    Stalled,

    /// A finite source (replay) has no more data
    #[error("no more readings")]
    Exhausted,
}

/// Convenience Result type using har-capture Error
pub type Result<T> = std::result::Result<T, Error>;
