//! Trigger/label state machine
//!
//! **Phases:**
//! ```text
//! Idle ──start──> Capturing ──deadline──> AwaitingLabelSelection
//!  ^                                        │  select: set pending (repeatable)
//!  │                                        │  confirm, nothing pending: no-op
//!  │                                        │  skip: emit Skip
//!  │                                        v  confirm, pending = c
//!  └──────────── emit c ──────── AwaitingLabelConfirmation
//! ```
//!
//! `AwaitingLabelConfirmation` is left in the same step it is entered; it
//! exists so the confirm action is one atomic transition. Skip is honored
//! only while a captured window awaits its label; in `Idle` and `Capturing`
//! there is nothing to skip.
//!
//! In the selection phase a pressed direction is matched against skip first,
//! then confirm, then the class bindings. Start is only meaningful in `Idle`,
//! so it may share a direction with confirm or with a class.

use super::{Effect, TickProcessor};
use crate::capture::{LabeledWindow, RawSample, ResampledWindow, Resampler, WindowBuffer};
use crate::config::Settings;
use crate::operator::{Indication, Notice};
use chrono::{DateTime, Utc};
use har_common::{ClassId, ControlEvent, Label};
use std::time::Duration;
use tracing::{debug, error, info};

/// Pipeline phase, owning whatever the phase needs
#[derive(Debug, Clone, PartialEq)]
pub enum Phase {
    Idle,

    /// Recording into the window buffer
    Capturing,

    AwaitingLabelSelection {
        window: ResampledWindow,
        pending: Option<ClassId>,
    },

    AwaitingLabelConfirmation {
        window: ResampledWindow,
        class: ClassId,
    },
}

/// Phase discriminant, for logging and assertions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhaseKind {
    Idle,
    Capturing,
    AwaitingLabelSelection,
    AwaitingLabelConfirmation,
}

impl Phase {
    pub fn kind(&self) -> PhaseKind {
        match self {
            Phase::Idle => PhaseKind::Idle,
            Phase::Capturing => PhaseKind::Capturing,
            Phase::AwaitingLabelSelection { .. } => PhaseKind::AwaitingLabelSelection,
            Phase::AwaitingLabelConfirmation { .. } => PhaseKind::AwaitingLabelConfirmation,
        }
    }
}

/// State carried from tick to tick by the capture pipeline
pub struct PipelineState {
    settings: Settings,
    phase: Phase,
    buffer: WindowBuffer,
}

impl PipelineState {
    pub fn new(settings: Settings) -> Self {
        // A little headroom over the nominal count absorbs tick jitter
        let capacity = settings.samples_per_window + settings.samples_per_window / 4;
        Self {
            settings,
            phase: Phase::Idle,
            buffer: WindowBuffer::with_capacity(capacity),
        }
    }

    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    pub fn kind(&self) -> PhaseKind {
        self.phase.kind()
    }

    /// Class currently selected but not yet confirmed
    pub fn pending(&self) -> Option<ClassId> {
        match &self.phase {
            Phase::AwaitingLabelSelection { pending, .. } => *pending,
            _ => None,
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Apply one control event at monotonic time `now`
    pub fn handle_event(&mut self, event: ControlEvent, now: Duration) -> Vec<Effect> {
        if !event.is_pressed() {
            return Vec::new();
        }
        let direction = event.direction;
        let controls = self.settings.controls;

        match self.phase.kind() {
            PhaseKind::Idle if direction == controls.start => self.start_capture(now),
            PhaseKind::Idle | PhaseKind::Capturing => {
                debug!("Ignoring '{}' while {:?}", direction, self.phase.kind());
                Vec::new()
            }
            PhaseKind::AwaitingLabelSelection | PhaseKind::AwaitingLabelConfirmation => {
                if direction == controls.skip {
                    self.skip()
                } else if direction == controls.confirm {
                    self.confirm()
                } else if let Some(class) = self.settings.class_for_direction(direction) {
                    self.select(class)
                } else {
                    debug!("Unmapped control '{}' while awaiting label", direction);
                    Vec::new()
                }
            }
        }
    }

    /// Advance by one polled sample.
    ///
    /// While capturing, the sample is recorded before the deadline check, so
    /// a sample landing exactly on the deadline belongs to the window.
    pub fn advance(&mut self, sample: RawSample, wall: DateTime<Utc>) -> Vec<Effect> {
        if !matches!(self.phase, Phase::Capturing) {
            return Vec::new();
        }

        self.buffer.push(sample);
        if !self
            .buffer
            .is_expired(sample.t, self.settings.window_duration)
        {
            return Vec::new();
        }

        let Some(captured) = self.buffer.drain() else {
            self.phase = Phase::Idle;
            return Vec::new();
        };

        let mut effects = vec![Effect::Indicate(Indication::Clear)];
        match Resampler::resample(
            &captured,
            self.settings.sample_rate,
            self.settings.window_duration,
            wall,
        ) {
            Ok(window) => {
                info!(
                    "Captured window: {} raw samples resampled to {}",
                    captured.len(),
                    window.samples_per_window()
                );
                self.phase = Phase::AwaitingLabelSelection {
                    window,
                    pending: None,
                };
                effects.push(Effect::Notice(self.label_prompt()));
            }
            Err(e) => {
                error!("Discarding captured window: {}", e);
                self.phase = Phase::Idle;
                effects.push(Effect::Notice(self.ready_notice()));
            }
        }
        effects
    }

    /// Drop any unfinished window and return to `Idle`
    pub fn abort(&mut self) -> Vec<Effect> {
        let previous = std::mem::replace(&mut self.phase, Phase::Idle);
        self.buffer.clear();
        match previous {
            Phase::Idle => Vec::new(),
            other => {
                info!("Aborted while {:?}; window discarded", other.kind());
                vec![
                    Effect::Indicate(Indication::Clear),
                    Effect::Notice(Notice::CaptureAborted),
                ]
            }
        }
    }

    /// Emit the window held in `AwaitingLabelConfirmation` and return to
    /// `Idle`. No-op in any other phase.
    pub fn complete_confirmation(&mut self) -> Vec<Effect> {
        match std::mem::replace(&mut self.phase, Phase::Idle) {
            Phase::AwaitingLabelConfirmation { window, class } => {
                info!("Window labeled {}", class);
                vec![
                    Effect::Indicate(Indication::Clear),
                    Effect::Notice(Notice::Labeled(class)),
                    Effect::Emit(LabeledWindow {
                        window,
                        label: Label::Class(class),
                    }),
                    Effect::Notice(self.ready_notice()),
                ]
            }
            other => {
                self.phase = other;
                Vec::new()
            }
        }
    }

    fn start_capture(&mut self, now: Duration) -> Vec<Effect> {
        self.buffer.start(now);
        self.phase = Phase::Capturing;
        info!("Capture started");
        vec![
            Effect::Indicate(Indication::Show(self.settings.capture_colour)),
            Effect::Notice(Notice::CaptureStarted {
                duration: self.settings.window_duration,
            }),
        ]
    }

    fn select(&mut self, class: ClassId) -> Vec<Effect> {
        if let Phase::AwaitingLabelSelection { pending, .. } = &mut self.phase {
            *pending = Some(class);
            debug!("Selected {}", class);
            vec![
                Effect::Indicate(Indication::Show(self.settings.colour(class))),
                Effect::Notice(Notice::Selected(class)),
            ]
        } else {
            Vec::new()
        }
    }

    fn confirm(&mut self) -> Vec<Effect> {
        match std::mem::replace(&mut self.phase, Phase::Idle) {
            Phase::AwaitingLabelSelection {
                window,
                pending: Some(class),
            } => {
                self.phase = Phase::AwaitingLabelConfirmation { window, class };
                self.complete_confirmation()
            }
            Phase::AwaitingLabelSelection {
                window,
                pending: None,
            } => {
                info!("Confirm pressed with nothing selected");
                self.phase = Phase::AwaitingLabelSelection {
                    window,
                    pending: None,
                };
                vec![Effect::Notice(Notice::NothingSelected)]
            }
            other => {
                self.phase = other;
                self.complete_confirmation()
            }
        }
    }

    fn skip(&mut self) -> Vec<Effect> {
        match std::mem::replace(&mut self.phase, Phase::Idle) {
            Phase::AwaitingLabelSelection { window, .. }
            | Phase::AwaitingLabelConfirmation { window, .. } => {
                info!("Window skipped");
                vec![
                    Effect::Indicate(Indication::Clear),
                    Effect::Notice(Notice::Skipped),
                    Effect::Emit(LabeledWindow {
                        window,
                        label: Label::Skip,
                    }),
                    Effect::Notice(self.ready_notice()),
                ]
            }
            other => {
                self.phase = other;
                Vec::new()
            }
        }
    }

    fn ready_notice(&self) -> Notice {
        Notice::Ready {
            start: self.settings.controls.start,
        }
    }

    fn label_prompt(&self) -> Notice {
        Notice::AwaitingLabel {
            options: self
                .settings
                .classes
                .iter()
                .map(|(class, binding)| (class, binding.direction))
                .collect(),
            confirm: self.settings.controls.confirm,
            skip: self.settings.controls.skip,
        }
    }
}

impl TickProcessor for PipelineState {
    fn startup(&mut self) -> Vec<Effect> {
        vec![Effect::Notice(self.ready_notice())]
    }

    fn process(
        &mut self,
        events: &[ControlEvent],
        sample: RawSample,
        wall: DateTime<Utc>,
    ) -> Vec<Effect> {
        let mut effects = Vec::new();
        for event in events {
            effects.extend(self.handle_event(*event, sample.t));
        }
        effects.extend(self.advance(sample, wall));
        effects
    }

    fn abort(&mut self) -> Vec<Effect> {
        PipelineState::abort(self)
    }
}
