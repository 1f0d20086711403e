//! Test doubles for the tick loop's collaborators
//!
//! Indicator and console doubles share their log through `Recorded`, so the
//! test keeps a handle after boxing the double into the loop.

use har_capture::capture::LabeledWindow;
use har_capture::error::{Error, Result, SensorError};
use har_capture::operator::{Console, Indication, Indicator, Notice};
use har_capture::output::{Delivery, RecordSink};
use har_capture::sensor::{Reading, SensorDriver};
use har_common::Rgb;
use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

/// Shared, clonable log of recorded items
#[derive(Debug)]
pub struct Recorded<T>(Arc<Mutex<Vec<T>>>);

impl<T> Clone for Recorded<T> {
    fn clone(&self) -> Self {
        Self(Arc::clone(&self.0))
    }
}

impl<T> Default for Recorded<T> {
    fn default() -> Self {
        Self(Arc::new(Mutex::new(Vec::new())))
    }
}

impl<T: Clone> Recorded<T> {
    pub fn push(&self, item: T) {
        self.0.lock().unwrap().push(item);
    }

    pub fn items(&self) -> Vec<T> {
        self.0.lock().unwrap().clone()
    }

    pub fn last(&self) -> Option<T> {
        self.0.lock().unwrap().last().cloned()
    }
}

// ============================================================================
// Sensor
// ============================================================================

/// Sensor driver answering from a script
///
/// After the script runs out it keeps returning `fallback` (or `Exhausted`
/// when there is none).
pub struct ScriptedDriver {
    script: VecDeque<std::result::Result<Reading, SensorError>>,
    fallback: Option<Reading>,
}

impl ScriptedDriver {
    /// Same reading on every read
    pub fn constant(reading: Reading) -> Self {
        Self {
            script: VecDeque::new(),
            fallback: Some(reading),
        }
    }

    pub fn scripted(script: Vec<std::result::Result<Reading, SensorError>>) -> Self {
        Self {
            script: script.into(),
            fallback: None,
        }
    }

    /// Every read fails
    pub fn dead() -> Self {
        Self::scripted(Vec::new())
    }
}

impl SensorDriver for ScriptedDriver {
    fn read_raw(&mut self) -> std::result::Result<Reading, SensorError> {
        match self.script.pop_front() {
            Some(result) => result,
            None => self.fallback.ok_or(SensorError::Exhausted),
        }
    }
}

// ============================================================================
// Sink
// ============================================================================

/// In-memory record sink
#[derive(Default)]
pub struct MemorySink {
    pub records: Vec<LabeledWindow>,
    pub flushes: usize,

    /// Fail every write with a persistence error
    pub fail_writes: bool,
}

impl MemorySink {
    pub fn failing() -> Self {
        Self {
            fail_writes: true,
            ..Self::default()
        }
    }
}

impl RecordSink for MemorySink {
    fn write(&mut self, record: &LabeledWindow) -> Result<Delivery> {
        if self.fail_writes {
            return Err(Error::PersistenceWrite {
                path: PathBuf::from("memory"),
                reason: "injected failure".to_string(),
            });
        }
        self.records.push(record.clone());
        Ok(Delivery::Written)
    }

    fn flush(&mut self) -> Result<()> {
        self.flushes += 1;
        Ok(())
    }
}

// ============================================================================
// Operator outputs
// ============================================================================

/// Indicator recording every change
#[derive(Clone, Default)]
pub struct RecordingIndicator {
    pub log: Recorded<Indication>,
}

impl Indicator for RecordingIndicator {
    fn show(&mut self, colour: Rgb) {
        self.log.push(Indication::Show(colour));
    }

    fn clear(&mut self) {
        self.log.push(Indication::Clear);
    }
}

/// Console recording every notice
#[derive(Clone, Default)]
pub struct RecordingConsole {
    pub log: Recorded<Notice>,
}

impl Console for RecordingConsole {
    fn notice(&mut self, notice: &Notice) {
        self.log.push(notice.clone());
    }
}
