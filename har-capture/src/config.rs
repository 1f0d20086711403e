//! Runtime settings for har-capture
//!
//! `TomlConfig` (from har-common) is the raw file form. `Settings` is the
//! validated form the pipeline runs on: derived quantities are computed once
//! and the control bindings are checked for conflicts, so the state machine
//! never has to resolve an ambiguous direction.

use crate::error::{Error, Result};
use har_common::config::{ClassBinding, TomlConfig};
use har_common::{ClassId, ClassMap, Direction, Rgb};
use std::path::PathBuf;
use std::time::Duration;

/// Highest accepted tick rate; keeps the tick interval at 1 ms or more
pub const MAX_SAMPLE_RATE_HZ: f64 = 1000.0;

/// Largest resampled window per axis
pub const MAX_SAMPLES_PER_WINDOW: usize = 100_000;

/// Largest simulated noise amplitude
pub const MAX_SENSOR_NOISE: f64 = 1000.0;

/// Directions that drive the capture/label protocol
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProtocolBindings {
    pub start: Direction,
    pub confirm: Direction,
    pub skip: Direction,
}

/// Validated runtime settings
#[derive(Debug, Clone)]
pub struct Settings {
    /// Nominal tick rate and resampling target rate (Hz)
    pub sample_rate: f64,

    /// Capture window length
    pub window_duration: Duration,

    /// `round(sample_rate * window_duration)`
    pub samples_per_window: usize,

    pub controls: ProtocolBindings,

    pub classes: ClassMap<ClassBinding>,

    /// Indicator colour while capturing
    pub capture_colour: Rgb,

    /// Dataset file
    pub output_path: PathBuf,

    /// Destination of `label` mode
    pub labelled_path: PathBuf,

    pub persist_skipped: bool,
}

impl Settings {
    /// Validate a loaded TOML configuration
    pub fn from_toml(config: &TomlConfig) -> Result<Self> {
        let sample_rate = config.sample_rate;
        if !sample_rate.is_finite() || sample_rate <= 0.0 {
            return Err(Error::Config(format!(
                "sample_rate must be a positive number of Hz, got {}",
                sample_rate
            )));
        }
        if sample_rate > MAX_SAMPLE_RATE_HZ {
            return Err(Error::Config(format!(
                "sample_rate {} Hz exceeds the maximum of {} Hz",
                sample_rate, MAX_SAMPLE_RATE_HZ
            )));
        }

        let window_secs = config.window_duration;
        if !window_secs.is_finite() || window_secs <= 0.0 {
            return Err(Error::Config(format!(
                "window_duration must be a positive number of seconds, got {}",
                window_secs
            )));
        }
        let window_duration = Duration::try_from_secs_f64(window_secs).map_err(|e| {
            Error::Config(format!("window_duration {} s is out of range: {}", window_secs, e))
        })?;

        let samples_per_window = samples_per_window(sample_rate, window_secs);
        if samples_per_window == 0 {
            return Err(Error::Config(format!(
                "{} Hz over {} s yields no samples per window",
                sample_rate, window_secs
            )));
        }
        if samples_per_window > MAX_SAMPLES_PER_WINDOW {
            return Err(Error::Config(format!(
                "{} Hz over {} s yields {} samples per window, more than {}",
                sample_rate, window_secs, samples_per_window, MAX_SAMPLES_PER_WINDOW
            )));
        }

        let noise = config.sensor.noise;
        if !noise.is_finite() || noise.abs() > MAX_SENSOR_NOISE {
            return Err(Error::Config(format!(
                "sensor.noise must be a finite amplitude up to {}, got {}",
                MAX_SENSOR_NOISE, noise
            )));
        }

        let controls = ProtocolBindings {
            start: config.controls.start,
            confirm: config.controls.confirm,
            skip: config.controls.skip,
        };
        validate_bindings(&controls, &config.classes)?;

        Ok(Self {
            sample_rate,
            window_duration,
            samples_per_window,
            controls,
            classes: config.classes.clone(),
            capture_colour: config.capture_colour,
            output_path: config.output_path(),
            labelled_path: config.labelled_path(),
            persist_skipped: config.persist_skipped,
        })
    }

    /// Interval between ticks (`1 / sample_rate`)
    pub fn tick_interval(&self) -> Duration {
        Duration::from_secs_f64(1.0 / self.sample_rate)
    }

    /// Class selected by a direction, if any
    pub fn class_for_direction(&self, direction: Direction) -> Option<ClassId> {
        self.classes
            .iter()
            .find(|(_, binding)| binding.direction == direction)
            .map(|(class, _)| class)
    }

    pub fn colour(&self, class: ClassId) -> Rgb {
        self.classes.get(class).colour
    }

    pub fn direction(&self, class: ClassId) -> Direction {
        self.classes.get(class).direction
    }
}

/// Number of grid points per window
pub fn samples_per_window(sample_rate: f64, window_secs: f64) -> usize {
    let n = (sample_rate * window_secs).round();
    if n.is_finite() && n > 0.0 {
        n as usize
    } else {
        0
    }
}

fn validate_bindings(controls: &ProtocolBindings, classes: &ClassMap<ClassBinding>) -> Result<()> {
    if controls.confirm == controls.skip {
        return Err(Error::Config(format!(
            "confirm and skip are both bound to '{}'",
            controls.confirm
        )));
    }

    let mut seen: Vec<(Direction, ClassId)> = Vec::with_capacity(ClassId::ALL.len());
    for (class, binding) in classes.iter() {
        let direction = binding.direction;
        if let Some((_, other)) = seen.iter().find(|(d, _)| *d == direction) {
            return Err(Error::Config(format!(
                "classes '{}' and '{}' are both bound to '{}'",
                other, class, direction
            )));
        }
        if direction == controls.confirm {
            return Err(Error::Config(format!(
                "class '{}' uses the confirm direction '{}'",
                class, direction
            )));
        }
        if direction == controls.skip {
            return Err(Error::Config(format!(
                "class '{}' uses the skip direction '{}'",
                class, direction
            )));
        }
        seen.push((direction, class));
    }

    Ok(())
}
