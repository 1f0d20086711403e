//! Window emission and persistence
//!
//! The pipeline hands each `LabeledWindow` to the `WindowEmitter`, which
//! forwards it to a `RecordSink`. Delivery is attempted once: a failed write
//! is reported and the record is counted as lost.

mod appender;
mod csv_sink;
mod emitter;

pub use appender::{AppendTarget, CsvAppender};
pub use csv_sink::CsvSink;
pub use emitter::{EmitterStats, WindowEmitter};

use crate::capture::LabeledWindow;
use crate::error::Result;

/// What a sink did with a record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    /// Persisted (and flushed)
    Written,

    /// Deliberately not persisted, e.g. a skipped window
    Discarded,
}

/// Persistence collaborator, for labeled windows unless stated otherwise
pub trait RecordSink<R = LabeledWindow> {
    fn write(&mut self, record: &R) -> Result<Delivery>;

    fn flush(&mut self) -> Result<()>;
}

impl<R, S: RecordSink<R> + ?Sized> RecordSink<R> for Box<S> {
    fn write(&mut self, record: &R) -> Result<Delivery> {
        (**self).write(record)
    }

    fn flush(&mut self) -> Result<()> {
        (**self).flush()
    }
}

/// Sink that keeps nothing (inference mode)
#[derive(Debug, Default)]
pub struct NullSink;

impl RecordSink for NullSink {
    fn write(&mut self, _record: &LabeledWindow) -> Result<Delivery> {
        Ok(Delivery::Discarded)
    }

    fn flush(&mut self) -> Result<()> {
        Ok(())
    }
}
