//! Simulated IMU
//!
//! Produces a plausible body-worn signal without hardware: gravity on the Z
//! axis (in g), a slow sway on the accelerometer, a slow rotation on the
//! gyroscope (in rad/s), plus seeded noise peaked around zero. Optional
//! periodic read failures exercise the fail-soft path of the sample source.

use super::{Reading, SensorDriver};
use crate::config::MAX_SENSOR_NOISE;
use crate::error::SensorError;
use har_common::config::SensorConfig;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::warn;

/// Nominal read rate used to advance the synthetic signal phase (Hz)
const SIGNAL_RATE_HZ: f64 = 25.0;

/// Sway frequency of the synthetic motion (Hz)
const SWAY_HZ: f64 = 0.5;

/// Deterministic synthetic IMU
pub struct SimulatedImu {
    rng: StdRng,
    noise: f64,
    dropout_every: u64,
    reads: u64,
}

impl SimulatedImu {
    /// An unusable `noise` (non-finite or above `MAX_SENSOR_NOISE`) disables
    /// noise; `Settings` rejects it from config
    pub fn new(seed: u64, noise: f64, dropout_every: u64) -> Self {
        let noise = if noise.is_finite() && noise.abs() <= MAX_SENSOR_NOISE {
            noise.abs()
        } else {
            warn!("Ignoring simulated noise amplitude {}", noise);
            0.0
        };
        Self {
            rng: StdRng::seed_from_u64(seed),
            noise,
            dropout_every,
            reads: 0,
        }
    }

    pub fn from_config(config: &SensorConfig) -> Self {
        Self::new(config.seed, config.noise, config.dropout_every)
    }

    fn jitter(&mut self) -> f64 {
        if self.noise > 0.0 {
            // Mean of two uniform draws: triangular, still within ±noise
            let a = self.rng.gen_range(-self.noise..=self.noise);
            let b = self.rng.gen_range(-self.noise..=self.noise);
            0.5 * (a + b)
        } else {
            0.0
        }
    }
}

impl SensorDriver for SimulatedImu {
    fn read_raw(&mut self) -> Result<Reading, SensorError> {
        self.reads += 1;
        if self.dropout_every > 0 && self.reads % self.dropout_every == 0 {
            return Err(SensorError::Read("simulated dropout".to_string()));
        }

        let phase = 2.0 * std::f64::consts::PI * SWAY_HZ * (self.reads as f64 / SIGNAL_RATE_HZ);
        let base = [
            0.05 * phase.sin(),
            0.05 * phase.cos(),
            1.0,
            0.2 * phase.cos(),
            0.1 * phase.sin(),
            0.0,
        ];

        let mut reading = [0.0; 6];
        for (out, value) in reading.iter_mut().zip(base) {
            *out = value + self.jitter();
        }
        Ok(reading)
    }
}
