//! Window emitter
//!
//! Hands each labeled window to the sink exactly once and keeps delivery
//! counts for the session summary. Failures are returned to the caller (so
//! the operator can be told) and logged; they never stop the tick loop.

use super::{Delivery, RecordSink};
use crate::capture::LabeledWindow;
use crate::error::Result;
use tracing::{debug, error};

/// Delivery counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EmitterStats {
    pub written: u64,
    pub discarded: u64,
    pub lost: u64,
}

pub struct WindowEmitter<S> {
    sink: S,
    stats: EmitterStats,
}

impl<S: RecordSink> WindowEmitter<S> {
    pub fn new(sink: S) -> Self {
        Self {
            sink,
            stats: EmitterStats::default(),
        }
    }

    /// Forward a record to the sink. No retry on failure.
    pub fn emit(&mut self, record: LabeledWindow) -> Result<Delivery> {
        match self.sink.write(&record) {
            Ok(delivery) => {
                match delivery {
                    Delivery::Written => self.stats.written += 1,
                    Delivery::Discarded => self.stats.discarded += 1,
                }
                debug!("Emitted window labeled {} ({:?})", record.label, delivery);
                Ok(delivery)
            }
            Err(e) => {
                self.stats.lost += 1;
                error!("Window labeled {} lost: {}", record.label, e);
                Err(e)
            }
        }
    }

    pub fn flush(&mut self) -> Result<()> {
        self.sink.flush()
    }

    pub fn stats(&self) -> EmitterStats {
        self.stats
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn into_sink(self) -> S {
        self.sink
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::ResampledWindow;
    use crate::error::Error;
    use chrono::Utc;
    use har_common::{ClassId, Label};
    use std::path::PathBuf;

    /// Sink failing every other write
    #[derive(Default)]
    struct FlakySink {
        calls: usize,
        written: Vec<Label>,
    }

    impl RecordSink for FlakySink {
        fn write(&mut self, record: &LabeledWindow) -> Result<Delivery> {
            self.calls += 1;
            if self.calls % 2 == 0 {
                return Err(Error::PersistenceWrite {
                    path: PathBuf::from("flaky.csv"),
                    reason: "disk full".to_string(),
                });
            }
            self.written.push(record.label);
            Ok(Delivery::Written)
        }

        fn flush(&mut self) -> Result<()> {
            Ok(())
        }
    }

    fn record(label: Label) -> LabeledWindow {
        LabeledWindow {
            window: ResampledWindow {
                timestamp: Utc::now(),
                sample_rate: 25.0,
                axes: std::array::from_fn(|_| vec![0.0; 4]),
            },
            label,
        }
    }

    #[test]
    fn test_failure_counts_as_lost_without_retry() {
        let mut emitter = WindowEmitter::new(FlakySink::default());

        assert!(emitter.emit(record(Label::Class(ClassId::Standing))).is_ok());
        assert!(emitter.emit(record(Label::Class(ClassId::Sitting))).is_err());
        assert!(emitter.emit(record(Label::Class(ClassId::Lying))).is_ok());

        let stats = emitter.stats();
        assert_eq!(stats.written, 2);
        assert_eq!(stats.lost, 1);
        assert_eq!(emitter.sink().calls, 3);
        assert_eq!(
            emitter.into_sink().written,
            vec![Label::Class(ClassId::Standing), Label::Class(ClassId::Lying)]
        );
    }
}
