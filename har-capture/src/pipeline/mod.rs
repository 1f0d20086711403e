//! Tick-driven capture pipeline
//!
//! **Architecture:**
//! ```text
//! TickLoop (one iteration per tick)
//!   ├─ ControlQueue::drain()        all pending events, arrival order
//!   ├─ SampleSource::poll(now)      fail-soft, never blocks the loop
//!   ├─ TickProcessor::process()     label state machine or inference
//!   └─ apply effects                indicator, operator notices, emitter
//! ```
//!
//! Processors are pure with respect to I/O: they return `Effect`s and the
//! loop performs them. This keeps the state machine testable without a
//! runtime, a sensor or a file system.

mod runner;
mod state;

pub use runner::{RunSummary, TickLoop};
pub use state::{Phase, PhaseKind, PipelineState};

use crate::capture::{LabeledWindow, RawSample};
use crate::operator::{Indication, Notice};
use chrono::{DateTime, Utc};
use har_common::ControlEvent;

/// Side effect requested by a processor
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    Indicate(Indication),
    Notice(Notice),
    Emit(LabeledWindow),
}

/// One step of the tick loop
pub trait TickProcessor {
    /// Effects to perform before the first tick (prompts, initial indicator)
    fn startup(&mut self) -> Vec<Effect> {
        Vec::new()
    }

    /// Handle one tick.
    ///
    /// `events` are the control events drained this tick, in arrival order.
    /// They are applied before `sample`, which was polled at `sample.t`.
    /// `wall` is the wall-clock time of the tick.
    fn process(
        &mut self,
        events: &[ControlEvent],
        sample: RawSample,
        wall: DateTime<Utc>,
    ) -> Vec<Effect>;

    /// Operator interrupt: drop any unfinished window without emitting it
    fn abort(&mut self) -> Vec<Effect>;
}
