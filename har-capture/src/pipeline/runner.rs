//! Tick loop
//!
//! The single scheduler of the capture process. Each iteration waits for the
//! next tick boundary, then runs drain → poll → process → apply. Missed ticks
//! are delayed rather than burst, so a slow sensor read lowers the effective
//! rate instead of producing back-to-back samples.
//!
//! Shutdown is observed once per tick. On shutdown the processor discards any
//! unfinished window, the indicator is cleared and the sink is flushed.

use super::{Effect, TickProcessor};
use crate::control::ControlQueue;
use crate::operator::{Console, Indicator, Notice};
use crate::output::{Delivery, EmitterStats, RecordSink, WindowEmitter};
use crate::sensor::{SampleSource, SensorDriver, SourceStats};
use har_common::time::{Clock, SystemClock};
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info};

/// Totals reported when the loop exits
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub ticks: u64,
    pub emitter: EmitterStats,
    pub sensor: SourceStats,
}

/// Cooperative tick loop driving one processor
pub struct TickLoop<D, P, S> {
    interval: Duration,
    source: SampleSource<D>,
    processor: P,
    emitter: WindowEmitter<S>,
    indicator: Box<dyn Indicator>,
    console: Box<dyn Console>,
    controls: ControlQueue,
    clock: SystemClock,

    /// Stop after this many ticks
    tick_limit: Option<u64>,
}

impl<D, P, S> TickLoop<D, P, S>
where
    D: SensorDriver,
    P: TickProcessor,
    S: RecordSink,
{
    pub fn new(
        interval: Duration,
        driver: D,
        processor: P,
        sink: S,
        indicator: Box<dyn Indicator>,
        console: Box<dyn Console>,
        controls: ControlQueue,
    ) -> Self {
        Self {
            interval,
            source: SampleSource::new(driver),
            processor,
            emitter: WindowEmitter::new(sink),
            indicator,
            console,
            controls,
            clock: SystemClock::new(),
            tick_limit: None,
        }
    }

    pub fn with_tick_limit(mut self, ticks: u64) -> Self {
        self.tick_limit = Some(ticks);
        self
    }

    /// Run until `shutdown` reads `true` or the tick limit is reached
    pub async fn run(mut self, shutdown: watch::Receiver<bool>) -> (RunSummary, P, S) {
        info!(
            "Tick loop starting: interval {:.1} ms",
            self.interval.as_secs_f64() * 1000.0
        );

        // Ticks are measured from here, not from construction
        self.clock = SystemClock::new();
        let mut interval = tokio::time::interval(self.interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let startup = self.processor.startup();
        self.apply(startup);

        let mut ticks = 0u64;
        loop {
            interval.tick().await;

            if *shutdown.borrow() {
                info!("Shutdown requested");
                break;
            }

            let now = self.clock.monotonic();
            let events = self.controls.drain();
            let sample = self.source.poll(now);
            let effects = self.processor.process(&events, sample, self.clock.wall());
            self.apply(effects);

            ticks += 1;
            if self.tick_limit.is_some_and(|limit| ticks >= limit) {
                debug!("Tick limit reached");
                break;
            }
        }

        let aborted = self.processor.abort();
        self.apply(aborted);
        self.indicator.clear();
        if let Err(e) = self.emitter.flush() {
            error!("Final flush failed: {}", e);
        }

        let summary = RunSummary {
            ticks,
            emitter: self.emitter.stats(),
            sensor: self.source.stats(),
        };
        info!(
            "Tick loop stopped after {} ticks: {} written, {} discarded, {} lost, {} stale samples",
            summary.ticks,
            summary.emitter.written,
            summary.emitter.discarded,
            summary.emitter.lost,
            summary.sensor.stale
        );

        (summary, self.processor, self.emitter.into_sink())
    }

    fn apply(&mut self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::Indicate(indication) => self.indicator.apply(indication),
                Effect::Notice(notice) => self.console.notice(&notice),
                Effect::Emit(record) => {
                    let label = record.label;
                    match self.emitter.emit(record) {
                        Ok(Delivery::Written) => self.console.notice(&Notice::Saved(label)),
                        Ok(Delivery::Discarded) => {}
                        Err(e) => self
                            .console
                            .notice(&Notice::PersistenceFailed(e.to_string())),
                    }
                }
            }
        }
    }
}
