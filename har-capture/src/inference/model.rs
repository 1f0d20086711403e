//! Pretrained classifier
//!
//! The model file is JSON:
//!
//! ```json
//! {
//!   "scaler": { "mean": [6 floats], "scale": [6 floats] },
//!   "centroids": {
//!     "standing": [6 floats], "sitting": [...], "lying": [...], "turning_cw": [...]
//!   }
//! }
//! ```
//!
//! Centroids live in standardized feature space. A window is assigned the
//! class of the nearest centroid; ties go to the lower class id.

use super::features::{FeatureVector, Scaler};
use crate::capture::AXIS_COUNT;
use crate::error::{Error, Result};
use har_common::{ClassId, ClassMap};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

/// Maps a feature vector to a class
pub trait Classifier {
    fn classify(&self, features: &FeatureVector) -> ClassId;
}

/// Nearest-centroid classifier with a fixed scaler
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CentroidModel {
    pub scaler: Scaler,
    pub centroids: ClassMap<[f64; AXIS_COUNT]>,
}

impl CentroidModel {
    /// Load and validate a model file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let model = Self::from_json(&content)?;
        info!("Loaded classifier from {}", path.display());
        Ok(model)
    }

    pub fn from_json(content: &str) -> Result<Self> {
        let model: Self = serde_json::from_str(content)?;
        model.validate()?;
        Ok(model)
    }

    pub fn validate(&self) -> Result<()> {
        self.scaler.validate()?;
        for (class, centroid) in self.centroids.iter() {
            if centroid.iter().any(|v| !v.is_finite()) {
                return Err(Error::Model(format!("centroid for {} is not finite", class)));
            }
        }
        Ok(())
    }
}

impl Classifier for CentroidModel {
    fn classify(&self, features: &FeatureVector) -> ClassId {
        let standardized = self.scaler.transform(features);
        let mut best = ClassId::Standing;
        let mut best_distance = f64::INFINITY;
        for (class, centroid) in self.centroids.iter() {
            let distance = standardized.distance(centroid);
            if distance < best_distance {
                best = class;
                best_distance = distance;
            }
        }
        best
    }
}
