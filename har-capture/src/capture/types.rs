//! Core capture data types
//!
//! Defines the records that flow through the capture pipeline:
//! `RawSample` (one sensor poll) → `CaptureWindow` (samples between trigger
//! and deadline) → `ResampledWindow` (uniform grid) → `LabeledWindow`
//! (terminal record handed to the dataset writer).

use chrono::{DateTime, Utc};
use har_common::Label;
use std::time::Duration;

/// Number of inertial channels (3 accelerometer + 3 gyroscope)
pub const AXIS_COUNT: usize = 6;

/// Inertial channel, in dataset column order `[Ax, Ay, Az, Gx, Gy, Gz]`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    Ax,
    Ay,
    Az,
    Gx,
    Gy,
    Gz,
}

impl Axis {
    pub const ALL: [Axis; AXIS_COUNT] = [Axis::Ax, Axis::Ay, Axis::Az, Axis::Gx, Axis::Gy, Axis::Gz];

    /// Position in `RawSample::values` and `ResampledWindow::axes`
    pub fn index(self) -> usize {
        match self {
            Axis::Ax => 0,
            Axis::Ay => 1,
            Axis::Az => 2,
            Axis::Gx => 3,
            Axis::Gy => 4,
            Axis::Gz => 5,
        }
    }

    /// Column prefix in the dataset (`ax_0`, `ax_1`, ...)
    pub fn column_prefix(self) -> &'static str {
        match self {
            Axis::Ax => "ax",
            Axis::Ay => "ay",
            Axis::Az => "az",
            Axis::Gx => "gx",
            Axis::Gy => "gy",
            Axis::Gz => "gz",
        }
    }
}

/// A single timestamped 6-axis reading
///
/// `t` is a monotonic offset. From the sample source it is measured from the
/// clock origin; inside a drained `CaptureWindow` it is relative to the
/// window's `start_t`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RawSample {
    pub t: Duration,

    /// `[ax, ay, az, gx, gy, gz]`
    pub values: [f64; AXIS_COUNT],
}

impl RawSample {
    pub fn new(t: Duration, values: [f64; AXIS_COUNT]) -> Self {
        Self { t, values }
    }

    pub fn value(&self, axis: Axis) -> f64 {
        self.values[axis.index()]
    }
}

/// Samples recorded between a start trigger and the window deadline
///
/// Sample times are relative to `start_t` and in arrival order.
#[derive(Debug, Clone, PartialEq)]
pub struct CaptureWindow {
    /// Monotonic time the start trigger fired
    pub start_t: Duration,

    pub samples: Vec<RawSample>,
}

impl CaptureWindow {
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

/// A window on a uniform time grid
///
/// Every axis holds exactly `samples_per_window` values; value `i` belongs to
/// synthetic time `i / sample_rate` after the window start.
#[derive(Debug, Clone, PartialEq)]
pub struct ResampledWindow {
    /// Wall-clock time the window was completed
    pub timestamp: DateTime<Utc>,

    /// Grid rate (Hz)
    pub sample_rate: f64,

    /// One vector per axis, indexed by `Axis::index`
    pub axes: [Vec<f64>; AXIS_COUNT],
}

impl ResampledWindow {
    pub fn samples_per_window(&self) -> usize {
        self.axes[0].len()
    }

    pub fn axis(&self, axis: Axis) -> &[f64] {
        &self.axes[axis.index()]
    }
}

/// Terminal record: a resampled window and its final label
#[derive(Debug, Clone, PartialEq)]
pub struct LabeledWindow {
    pub window: ResampledWindow,
    pub label: Label,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_axis_order_matches_indices() {
        for (position, axis) in Axis::ALL.iter().enumerate() {
            assert_eq!(axis.index(), position);
        }
    }

    #[test]
    fn test_sample_value_lookup() {
        let sample = RawSample::new(Duration::ZERO, [1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        assert_eq!(sample.value(Axis::Az), 3.0);
        assert_eq!(sample.value(Axis::Gz), 6.0);
    }
}
