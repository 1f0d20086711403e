//! Sample source adapter and sensor drivers
//!
//! A `SensorDriver` is the physical (or simulated) IMU: best-effort reads
//! that may fail or stall. `SampleSource` wraps a driver for the tick loop:
//! one `poll` per tick, always returning a timestamped sample.
//!
//! # Fail-soft reads
//!
//! When a read fails the source returns the last good reading restamped with
//! the current tick time, so the loop never aborts on a bad read. A failure
//! streak is logged once when it starts and once when it ends, not per tick.

mod replay;
mod simulated;

pub use replay::ReplayDriver;
pub use simulated::SimulatedImu;

use crate::capture::{RawSample, AXIS_COUNT};
use crate::error::SensorError;
use std::time::Duration;
use tracing::{info, warn};

/// Raw 6-axis reading `[ax, ay, az, gx, gy, gz]`
pub type Reading = [f64; AXIS_COUNT];

/// A 6-axis inertial sensor
pub trait SensorDriver {
    /// Read the current accelerometer and gyroscope values.
    ///
    /// Must return within one tick interval or a bounded timeout.
    fn read_raw(&mut self) -> Result<Reading, SensorError>;
}

impl<D: SensorDriver + ?Sized> SensorDriver for Box<D> {
    fn read_raw(&mut self) -> Result<Reading, SensorError> {
        (**self).read_raw()
    }
}

/// Counters describing sensor health over the session
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SourceStats {
    /// Successful reads
    pub reads: u64,

    /// Polls answered with a stale reading
    pub stale: u64,

    /// Failure streaks (each logged once)
    pub outages: u64,
}

/// Tick-driven adapter over a sensor driver
pub struct SampleSource<D> {
    driver: D,

    /// Last successful reading
    last: Option<Reading>,

    /// A failure streak is in progress
    failing: bool,

    stats: SourceStats,
}

impl<D: SensorDriver> SampleSource<D> {
    pub fn new(driver: D) -> Self {
        Self {
            driver,
            last: None,
            failing: false,
            stats: SourceStats::default(),
        }
    }

    /// Poll the driver once and stamp the reading with `now`.
    ///
    /// Never fails: a failed read yields the last good reading, or zeros if
    /// the sensor has never produced one.
    pub fn poll(&mut self, now: Duration) -> RawSample {
        match self.driver.read_raw() {
            Ok(reading) => {
                if self.failing {
                    info!(
                        "Sensor recovered after {} stale sample(s)",
                        self.stats.stale
                    );
                    self.failing = false;
                }
                self.stats.reads += 1;
                self.last = Some(reading);
                RawSample::new(now, reading)
            }
            Err(e) => {
                if !self.failing {
                    self.failing = true;
                    self.stats.outages += 1;
                    match self.last {
                        Some(_) => warn!("Sensor read failed ({}), reusing last reading", e),
                        None => warn!("Sensor read failed ({}) before any reading, using zeros", e),
                    }
                }
                self.stats.stale += 1;
                RawSample::new(now, self.last.unwrap_or([0.0; AXIS_COUNT]))
            }
        }
    }

    pub fn stats(&self) -> SourceStats {
        self.stats
    }

    /// Whether the most recent poll returned a stale reading
    pub fn is_degraded(&self) -> bool {
        self.failing
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;

    /// Driver answering from a script of results
    struct ScriptedDriver(VecDeque<Result<Reading, SensorError>>);

    impl SensorDriver for ScriptedDriver {
        fn read_raw(&mut self) -> Result<Reading, SensorError> {
            self.0.pop_front().unwrap_or(Err(SensorError::Exhausted))
        }
    }

    fn reading(v: f64) -> Reading {
        [v; AXIS_COUNT]
    }

    #[test]
    fn test_poll_stamps_with_tick_time() {
        let mut source = SampleSource::new(ScriptedDriver(VecDeque::from([Ok(reading(1.0))])));
        let sample = source.poll(Duration::from_millis(80));
        assert_eq!(sample.t, Duration::from_millis(80));
        assert_eq!(sample.values, reading(1.0));
        assert_eq!(source.stats().reads, 1);
    }

    #[test]
    fn test_failed_read_reuses_last_value() {
        let mut source = SampleSource::new(ScriptedDriver(VecDeque::from([
            Ok(reading(1.0)),
            Err(SensorError::Read("i2c nack".to_string())),
            Err(SensorError::Stalled),
            Ok(reading(2.0)),
        ])));

        assert_eq!(source.poll(Duration::from_millis(0)).values, reading(1.0));

        let stale = source.poll(Duration::from_millis(40));
        assert_eq!(stale.values, reading(1.0));
        assert_eq!(stale.t, Duration::from_millis(40));
        assert!(source.is_degraded());

        assert_eq!(source.poll(Duration::from_millis(80)).values, reading(1.0));
        assert_eq!(source.poll(Duration::from_millis(120)).values, reading(2.0));
        assert!(!source.is_degraded());

        let stats = source.stats();
        assert_eq!(stats.reads, 2);
        assert_eq!(stats.stale, 2);
        assert_eq!(stats.outages, 1);
    }

    #[test]
    fn test_failure_before_first_read_gives_zeros() {
        let mut source = SampleSource::new(ScriptedDriver(VecDeque::from([Err(SensorError::Stalled)])));
        let sample = source.poll(Duration::ZERO);
        assert_eq!(sample.values, [0.0; AXIS_COUNT]);
        assert_eq!(source.stats().outages, 1);
    }

    #[test]
    fn test_each_streak_counted_once() {
        let mut source = SampleSource::new(ScriptedDriver(VecDeque::from([
            Ok(reading(1.0)),
            Err(SensorError::Stalled),
            Err(SensorError::Stalled),
            Ok(reading(1.0)),
            Err(SensorError::Stalled),
        ])));
        for tick in 0..5 {
            source.poll(Duration::from_millis(tick * 40));
        }
        assert_eq!(source.stats().outages, 2);
        assert_eq!(source.stats().stale, 3);
    }

    #[test]
    fn test_boxed_driver() {
        let driver: Box<dyn SensorDriver> =
            Box::new(ScriptedDriver(VecDeque::from([Ok(reading(3.0))])));
        let mut source = SampleSource::new(driver);
        assert_eq!(source.poll(Duration::ZERO).values, reading(3.0));
    }
}
