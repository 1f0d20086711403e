//! Inference mode
//!
//! Windows are captured back to back with no trigger. When a window expires
//! it is resampled, reduced to channel means, standardized with the model's
//! fixed scaler and classified; the predicted class colour goes to the
//! indicator. The next window starts on the tick that closed the previous one.

mod features;
mod model;

pub use features::{FeatureVector, Scaler};
pub use model::{CentroidModel, Classifier};

use crate::capture::{RawSample, Resampler, WindowBuffer};
use crate::config::Settings;
use crate::operator::{Indication, Notice};
use crate::pipeline::{Effect, TickProcessor};
use chrono::{DateTime, Utc};
use har_common::{ClassId, ControlEvent};
use tracing::{debug, info, warn};

/// Tick processor classifying consecutive windows
pub struct InferencePipeline<C> {
    settings: Settings,
    classifier: C,
    buffer: WindowBuffer,
    last: Option<ClassId>,
}

impl<C: Classifier> InferencePipeline<C> {
    pub fn new(settings: Settings, classifier: C) -> Self {
        let capacity = settings.samples_per_window + settings.samples_per_window / 4;
        Self {
            settings,
            classifier,
            buffer: WindowBuffer::with_capacity(capacity),
            last: None,
        }
    }

    /// Most recent prediction
    pub fn last_prediction(&self) -> Option<ClassId> {
        self.last
    }
}

impl<C: Classifier> TickProcessor for InferencePipeline<C> {
    fn process(
        &mut self,
        events: &[ControlEvent],
        sample: RawSample,
        wall: DateTime<Utc>,
    ) -> Vec<Effect> {
        if !events.is_empty() {
            debug!("Ignoring {} control event(s) in inference mode", events.len());
        }

        if !self.buffer.is_active() {
            self.buffer.start(sample.t);
        }
        self.buffer.push(sample);
        if !self
            .buffer
            .is_expired(sample.t, self.settings.window_duration)
        {
            return Vec::new();
        }

        let Some(captured) = self.buffer.drain() else {
            return Vec::new();
        };
        self.buffer.start(sample.t);

        let window = match Resampler::resample(
            &captured,
            self.settings.sample_rate,
            self.settings.window_duration,
            wall,
        ) {
            Ok(window) => window,
            Err(e) => {
                warn!("Skipping inference window: {}", e);
                return Vec::new();
            }
        };

        let features = FeatureVector::from_window(&window);
        let class = self.classifier.classify(&features);
        info!("Predicted {} from {} raw samples", class, captured.len());
        self.last = Some(class);

        vec![
            Effect::Indicate(Indication::Show(self.settings.colour(class))),
            Effect::Notice(Notice::Predicted(class)),
        ]
    }

    fn abort(&mut self) -> Vec<Effect> {
        self.buffer.clear();
        vec![Effect::Indicate(Indication::Clear)]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::AXIS_COUNT;
    use har_common::config::TomlConfig;
    use har_common::{Direction, Rgb};
    use std::time::Duration;

    /// Predicts lying whenever ax dominates, standing otherwise
    struct AxisRule;

    impl Classifier for AxisRule {
        fn classify(&self, features: &FeatureVector) -> ClassId {
            if features.0[0] > features.0[2] {
                ClassId::Lying
            } else {
                ClassId::Standing
            }
        }
    }

    fn settings() -> Settings {
        let config = TomlConfig {
            sample_rate: 10.0,
            window_duration: 1.0,
            ..TomlConfig::default()
        };
        Settings::from_toml(&config).unwrap()
    }

    fn upright(t_ms: u64) -> RawSample {
        let mut values = [0.0; AXIS_COUNT];
        values[2] = 1.0;
        RawSample::new(Duration::from_millis(t_ms), values)
    }

    fn flat(t_ms: u64) -> RawSample {
        let mut values = [0.0; AXIS_COUNT];
        values[0] = 1.0;
        RawSample::new(Duration::from_millis(t_ms), values)
    }

    #[test]
    fn test_back_to_back_windows_classified() {
        let mut pipeline = InferencePipeline::new(settings(), AxisRule);
        let mut predictions = Vec::new();

        for tick in 0..=20u64 {
            let sample = if tick <= 10 { upright(tick * 100) } else { flat(tick * 100) };
            for effect in pipeline.process(&[], sample, Utc::now()) {
                if let Effect::Indicate(Indication::Show(colour)) = effect {
                    predictions.push(colour);
                }
            }
        }

        assert_eq!(predictions, vec![Rgb::RED, Rgb::BLUE]);
        assert_eq!(pipeline.last_prediction(), Some(ClassId::Lying));
    }

    #[test]
    fn test_control_events_ignored() {
        let mut pipeline = InferencePipeline::new(settings(), AxisRule);
        let effects = pipeline.process(
            &[ControlEvent::pressed(Direction::Aux)],
            upright(0),
            Utc::now(),
        );
        assert!(effects.is_empty());
    }

    #[test]
    fn test_abort_clears_indicator() {
        let mut pipeline = InferencePipeline::new(settings(), AxisRule);
        pipeline.process(&[], upright(0), Utc::now());
        assert_eq!(pipeline.abort(), vec![Effect::Indicate(Indication::Clear)]);
    }
}
