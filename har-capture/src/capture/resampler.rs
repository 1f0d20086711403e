//! Uniform-grid resampling of capture windows
//!
//! Converts the irregular sample times of a capture window into exactly
//! `samples_per_window` evenly spaced values per axis.
//!
//! # Algorithm
//!
//! - Target grid: `t_i = i / target_rate` for `i in 0..samples_per_window`,
//!   relative to the window start.
//! - Each axis is interpolated independently, piecewise-linearly, using the
//!   recorded `(t, value)` pairs as control points.
//! - Grid points before the first or after the last recorded time take the
//!   nearest endpoint value (flat extrapolation).
//! - A window with a single sample is a constant fill of that sample.
//!
//! Resampling is a pure function of its inputs: identical inputs give
//! bit-identical outputs.

use super::types::{CaptureWindow, ResampledWindow, AXIS_COUNT};
use crate::config::samples_per_window;
use crate::error::{Error, Result};
use chrono::{DateTime, Utc};
use std::time::Duration;
use tracing::debug;

/// Linear-interpolation resampler for capture windows
pub struct Resampler;

impl Resampler {
    /// Resample a capture window onto a uniform grid.
    ///
    /// # Arguments
    /// - `window`: samples with times relative to the window start
    /// - `target_rate`: grid rate in Hz
    /// - `duration`: window length; the grid holds `round(target_rate * duration)` points
    /// - `timestamp`: wall-clock stamp carried into the result
    ///
    /// # Errors
    /// `Error::EmptyWindow` if the window holds no samples.
    pub fn resample(
        window: &CaptureWindow,
        target_rate: f64,
        duration: Duration,
        timestamp: DateTime<Utc>,
    ) -> Result<ResampledWindow> {
        if window.is_empty() {
            return Err(Error::EmptyWindow);
        }

        let n = samples_per_window(target_rate, duration.as_secs_f64());
        let grid = Self::grid(target_rate, n);

        let axes: [Vec<f64>; AXIS_COUNT] = if window.len() < 2 {
            debug!(
                "Degenerate window ({} sample), filling {} points with a constant",
                window.len(),
                n
            );
            let values = window.samples[0].values;
            std::array::from_fn(|axis| vec![values[axis]; n])
        } else {
            let times: Vec<f64> = window.samples.iter().map(|s| s.t.as_secs_f64()).collect();
            std::array::from_fn(|axis| {
                let values: Vec<f64> = window.samples.iter().map(|s| s.values[axis]).collect();
                grid.iter()
                    .map(|&t| Self::interpolate(t, &times, &values))
                    .collect()
            })
        };

        debug!(
            "Resampled {} raw samples to {} grid points at {}Hz",
            window.len(),
            n,
            target_rate
        );

        Ok(ResampledWindow {
            timestamp,
            sample_rate: target_rate,
            axes,
        })
    }

    /// Grid times `i / target_rate` for `i in 0..n`
    pub fn grid(target_rate: f64, n: usize) -> Vec<f64> {
        (0..n).map(|i| i as f64 / target_rate).collect()
    }

    /// Piecewise-linear interpolation with flat extrapolation.
    ///
    /// `times` must be non-decreasing and the same length as `values`, with at
    /// least one element. Repeated times are tolerated: the later point of a
    /// zero-width segment wins.
    pub fn interpolate(x: f64, times: &[f64], values: &[f64]) -> f64 {
        let last = times.len() - 1;
        if x <= times[0] {
            return values[0];
        }
        if x >= times[last] {
            return values[last];
        }

        // First control point strictly after x; in 1..=last given the checks above
        let hi = times.partition_point(|&t| t <= x);
        let lo = hi - 1;
        let span = times[hi] - times[lo];
        let slope = (values[hi] - values[lo]) / span;
        slope * (x - times[lo]) + values[lo]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::types::RawSample;
    use chrono::TimeZone;

    fn stamp() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
    }

    fn window(points: &[(f64, f64)]) -> CaptureWindow {
        CaptureWindow {
            start_t: Duration::ZERO,
            samples: points
                .iter()
                .map(|&(t, v)| RawSample::new(Duration::from_secs_f64(t), [v; AXIS_COUNT]))
                .collect(),
        }
    }

    #[test]
    fn test_linear_ramp_is_exact() {
        let w = window(&[(0.0, 0.0), (1.0, 10.0)]);
        let out = Resampler::resample(&w, 10.0, Duration::from_secs(1), stamp()).unwrap();

        let expected: Vec<f64> = (0..10).map(|i| i as f64).collect();
        for axis in &out.axes {
            assert_eq!(axis, &expected);
        }
    }

    #[test]
    fn test_grid_size_matches_rate_times_duration() {
        let w = window(&[(0.0, 1.0), (0.5, 2.0), (1.9, 3.0)]);
        for (rate, secs, n) in [(25.0, 2.0, 50), (50.0, 1.0, 50), (10.0, 0.35, 4), (100.0, 2.5, 250)] {
            let out = Resampler::resample(&w, rate, Duration::from_secs_f64(secs), stamp()).unwrap();
            for axis in &out.axes {
                assert_eq!(axis.len(), n, "rate={} secs={}", rate, secs);
            }
            assert_eq!(out.samples_per_window(), n);
        }
    }

    #[test]
    fn test_single_sample_constant_fill() {
        let w = CaptureWindow {
            start_t: Duration::from_secs(5),
            samples: vec![RawSample::new(
                Duration::from_millis(7),
                [0.1, -0.2, 0.98, 1.5, -2.5, 3.25],
            )],
        };
        let out = Resampler::resample(&w, 25.0, Duration::from_secs(2), stamp()).unwrap();

        for (axis, expected) in out.axes.iter().zip([0.1, -0.2, 0.98, 1.5, -2.5, 3.25]) {
            assert_eq!(axis.len(), 50);
            assert!(axis.iter().all(|&v| v == expected));
        }
    }

    #[test]
    fn test_empty_window_is_error() {
        let w = window(&[]);
        let result = Resampler::resample(&w, 25.0, Duration::from_secs(2), stamp());
        assert!(matches!(result, Err(Error::EmptyWindow)));
    }

    #[test]
    fn test_flat_extrapolation_at_both_ends() {
        // Control points cover only [0.25, 0.5]; grid runs 0.0..0.9
        let w = window(&[(0.25, 4.0), (0.5, 6.0)]);
        let out = Resampler::resample(&w, 10.0, Duration::from_secs(1), stamp()).unwrap();
        let ax = &out.axes[0];

        assert_eq!(ax[0], 4.0);
        assert_eq!(ax[1], 4.0);
        assert_eq!(ax[2], 4.0);
        assert!((ax[3] - 4.4).abs() < 1e-12);
        assert!((ax[4] - 5.2).abs() < 1e-12);
        assert_eq!(ax[5], 6.0);
        assert_eq!(ax[9], 6.0);
    }

    #[test]
    fn test_axes_are_independent() {
        let w = CaptureWindow {
            start_t: Duration::ZERO,
            samples: vec![
                RawSample::new(Duration::ZERO, [0.0, 10.0, 0.0, 0.0, 0.0, 0.0]),
                RawSample::new(Duration::from_secs(1), [1.0, 0.0, 0.0, 0.0, 0.0, -1.0]),
            ],
        };
        let out = Resampler::resample(&w, 2.0, Duration::from_secs(1), stamp()).unwrap();
        assert_eq!(out.axes[0], vec![0.0, 0.5]);
        assert_eq!(out.axes[1], vec![10.0, 5.0]);
        assert_eq!(out.axes[2], vec![0.0, 0.0]);
        assert_eq!(out.axes[5], vec![0.0, -0.5]);
    }

    #[test]
    fn test_deterministic() {
        let w = window(&[(0.013, 0.3), (0.061, -1.7), (0.099, 2.2), (0.17, 0.01), (0.41, 9.9)]);
        let a = Resampler::resample(&w, 25.0, Duration::from_millis(500), stamp()).unwrap();
        let b = Resampler::resample(&w, 25.0, Duration::from_millis(500), stamp()).unwrap();
        for (x, y) in a.axes.iter().zip(b.axes.iter()) {
            let xb: Vec<u64> = x.iter().map(|v| v.to_bits()).collect();
            let yb: Vec<u64> = y.iter().map(|v| v.to_bits()).collect();
            assert_eq!(xb, yb);
        }
    }

    #[test]
    fn test_interpolate_repeated_times() {
        let times = [0.0, 0.5, 0.5, 1.0];
        let values = [0.0, 1.0, 3.0, 3.0];
        assert_eq!(Resampler::interpolate(0.25, &times, &values), 0.5);
        assert_eq!(Resampler::interpolate(0.5, &times, &values), 3.0);
        assert_eq!(Resampler::interpolate(0.75, &times, &values), 3.0);
    }

    #[test]
    fn test_timestamp_and_rate_carried_through() {
        let w = window(&[(0.0, 1.0), (1.0, 2.0)]);
        let out = Resampler::resample(&w, 4.0, Duration::from_secs(1), stamp()).unwrap();
        assert_eq!(out.timestamp, stamp());
        assert_eq!(out.sample_rate, 4.0);
    }
}
