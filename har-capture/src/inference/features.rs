//! Window features and standardization
//!
//! A window is reduced along the time axis to one mean per channel, giving a
//! six-value vector in `[Ax, Ay, Az, Gx, Gy, Gz]` order.

use crate::capture::{ResampledWindow, AXIS_COUNT};
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// Per-channel window means
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeatureVector(pub [f64; AXIS_COUNT]);

impl FeatureVector {
    /// Mean of each axis over the window's grid points
    pub fn from_window(window: &ResampledWindow) -> Self {
        Self(std::array::from_fn(|axis| {
            let values = &window.axes[axis];
            if values.is_empty() {
                0.0
            } else {
                values.iter().sum::<f64>() / values.len() as f64
            }
        }))
    }

    /// Euclidean distance to another vector
    pub fn distance(&self, other: &[f64; AXIS_COUNT]) -> f64 {
        self.0
            .iter()
            .zip(other)
            .map(|(a, b)| (a - b) * (a - b))
            .sum::<f64>()
            .sqrt()
    }
}

/// Standardization fitted on the training data
///
/// Applied unchanged to every inference window; it is never refit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scaler {
    pub mean: [f64; AXIS_COUNT],
    pub scale: [f64; AXIS_COUNT],
}

impl Scaler {
    /// Scaler that leaves features unchanged
    pub fn identity() -> Self {
        Self {
            mean: [0.0; AXIS_COUNT],
            scale: [1.0; AXIS_COUNT],
        }
    }

    pub fn validate(&self) -> Result<()> {
        for (i, (&mean, &scale)) in self.mean.iter().zip(&self.scale).enumerate() {
            if !mean.is_finite() {
                return Err(Error::Model(format!("scaler mean[{}] is not finite", i)));
            }
            if !scale.is_finite() || scale == 0.0 {
                return Err(Error::Model(format!(
                    "scaler scale[{}] must be finite and non-zero, got {}",
                    i, scale
                )));
            }
        }
        Ok(())
    }

    /// `(x - mean) / scale` per channel
    pub fn transform(&self, features: &FeatureVector) -> FeatureVector {
        FeatureVector(std::array::from_fn(|i| {
            (features.0[i] - self.mean[i]) / self.scale[i]
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn test_means_reduce_time_axis() {
        let window = ResampledWindow {
            timestamp: Utc::now(),
            sample_rate: 2.0,
            axes: [
                vec![1.0, 3.0],
                vec![0.0, 0.0],
                vec![-1.0, 1.0],
                vec![2.0, 2.0],
                vec![10.0, 20.0],
                vec![0.5, 1.5],
            ],
        };
        let features = FeatureVector::from_window(&window);
        assert_eq!(features.0, [2.0, 0.0, 0.0, 2.0, 15.0, 1.0]);
    }

    #[test]
    fn test_transform_uses_fixed_parameters() {
        let scaler = Scaler {
            mean: [1.0; AXIS_COUNT],
            scale: [2.0; AXIS_COUNT],
        };
        let out = scaler.transform(&FeatureVector([5.0; AXIS_COUNT]));
        assert_eq!(out.0, [2.0; AXIS_COUNT]);

        // A second, different input does not change the parameters
        scaler.transform(&FeatureVector([100.0; AXIS_COUNT]));
        assert_eq!(scaler.transform(&FeatureVector([5.0; AXIS_COUNT])).0, [2.0; AXIS_COUNT]);
    }

    #[test]
    fn test_zero_scale_rejected() {
        let mut scaler = Scaler::identity();
        assert!(scaler.validate().is_ok());
        scaler.scale[4] = 0.0;
        let err = scaler.validate().unwrap_err();
        assert!(err.to_string().contains("scale[4]"));
    }

    #[test]
    fn test_distance() {
        let v = FeatureVector([3.0, 4.0, 0.0, 0.0, 0.0, 0.0]);
        assert_eq!(v.distance(&[0.0; AXIS_COUNT]), 5.0);
    }
}
