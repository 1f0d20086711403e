//! CSV dataset writer
//!
//! One row per labeled window:
//!
//! ```text
//! timestamp,label,ax_0,...,ax_{n-1},ay_0,...,gz_{n-1}
//! 2024-05-01T10:00:02.000Z,1,0.012,...
//! ```
//!
//! Axis blocks follow `[Ax, Ay, Az, Gx, Gy, Gz]`. The file is appended to
//! across sessions; the header is written only when the file is created, and
//! an existing header must match the configured window size.

use super::appender::{AppendTarget, CsvAppender};
use super::{Delivery, RecordSink};
use crate::capture::{Axis, LabeledWindow};
use crate::error::{Error, Result};
use chrono::SecondsFormat;
use std::fs::File;
use std::path::Path;
use tracing::debug;

/// Appending CSV sink for labeled windows
pub struct CsvSink<T = File> {
    appender: CsvAppender<T>,
    samples_per_window: usize,
    persist_skipped: bool,
}

impl CsvSink {
    /// Open (or create) the dataset file.
    ///
    /// # Errors
    /// - `Error::Config` if an existing file's header does not match
    /// - `Error::Io` if the directory or file cannot be created
    pub fn open<P: AsRef<Path>>(
        path: P,
        samples_per_window: usize,
        persist_skipped: bool,
    ) -> Result<Self> {
        let appender = CsvAppender::open(path.as_ref(), &Self::header(samples_per_window))?;
        Ok(Self::with_appender(appender, samples_per_window, persist_skipped))
    }

    /// Column names for windows of `samples_per_window` points
    pub fn header(samples_per_window: usize) -> Vec<String> {
        let mut columns = Vec::with_capacity(2 + Axis::ALL.len() * samples_per_window);
        columns.push("timestamp".to_string());
        columns.push("label".to_string());
        for axis in Axis::ALL {
            for i in 0..samples_per_window {
                columns.push(format!("{}_{}", axis.column_prefix(), i));
            }
        }
        columns
    }
}

impl<T: AppendTarget> CsvSink<T> {
    pub fn with_appender(
        appender: CsvAppender<T>,
        samples_per_window: usize,
        persist_skipped: bool,
    ) -> Self {
        Self {
            appender,
            samples_per_window,
            persist_skipped,
        }
    }

    pub fn path(&self) -> &Path {
        self.appender.path()
    }

    fn persistence_error(&self, reason: impl ToString) -> Error {
        Error::PersistenceWrite {
            path: self.path().to_path_buf(),
            reason: reason.to_string(),
        }
    }
}

impl<T: AppendTarget> RecordSink for CsvSink<T> {
    fn write(&mut self, record: &LabeledWindow) -> Result<Delivery> {
        if record.label.is_skip() && !self.persist_skipped {
            debug!("Skipped window not persisted");
            return Ok(Delivery::Discarded);
        }

        let n = record.window.samples_per_window();
        if n != self.samples_per_window {
            return Err(self.persistence_error(format!(
                "window has {} samples per axis, dataset expects {}",
                n, self.samples_per_window
            )));
        }

        let mut row = Vec::with_capacity(2 + Axis::ALL.len() * n);
        row.push(
            record
                .window
                .timestamp
                .to_rfc3339_opts(SecondsFormat::Millis, true),
        );
        row.push(record.label.to_string());
        for axis in Axis::ALL {
            row.extend(record.window.axis(axis).iter().map(|v| v.to_string()));
        }

        self.appender
            .append(&row)
            .map_err(|e| self.persistence_error(e))?;

        debug!("Wrote window labeled {} to {}", record.label, self.path().display());
        Ok(Delivery::Written)
    }

    fn flush(&mut self) -> Result<()> {
        self.appender.sync().map_err(|e| self.persistence_error(e))
    }
}
