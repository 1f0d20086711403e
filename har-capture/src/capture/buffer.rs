//! Capture window buffer
//!
//! Accumulates timestamped samples between a start trigger and the window
//! deadline. The buffer is owned by the tick loop's pipeline state; there is
//! no concurrent access.
//!
//! # Expiry
//!
//! A window is expired exactly when `now - start_t >= window_duration`. The
//! bound is closed, so the last in-window sample may land on
//! `t == start_t + duration`.

use super::types::{CaptureWindow, RawSample};
use std::time::Duration;
use tracing::trace;

/// Buffer for the in-progress capture window
#[derive(Debug, Default)]
pub struct WindowBuffer {
    /// Monotonic time of the start trigger; `None` while inactive
    start_t: Option<Duration>,

    samples: Vec<RawSample>,
}

impl WindowBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a buffer pre-sized for the expected number of samples
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            start_t: None,
            samples: Vec::with_capacity(capacity),
        }
    }

    /// Reset internal state and begin a window at `at`
    pub fn start(&mut self, at: Duration) {
        self.samples.clear();
        self.start_t = Some(at);
        trace!("Window started at {:?}", at);
    }

    /// Append a sample. No-op while no window is active.
    pub fn push(&mut self, sample: RawSample) {
        if self.start_t.is_some() {
            self.samples.push(sample);
        }
    }

    pub fn is_active(&self) -> bool {
        self.start_t.is_some()
    }

    pub fn start_t(&self) -> Option<Duration> {
        self.start_t
    }

    /// Number of samples recorded in the active window
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Whether the active window has reached its deadline.
    ///
    /// An inactive buffer is never expired.
    pub fn is_expired(&self, now: Duration, duration: Duration) -> bool {
        match self.start_t {
            Some(start_t) => now.saturating_sub(start_t) >= duration,
            None => false,
        }
    }

    /// Take the recorded window and deactivate the buffer.
    ///
    /// Sample times are rebased onto `start_t`; the first sample may sit
    /// slightly after zero because of scheduling jitter. Returns `None` when
    /// no window is active.
    pub fn drain(&mut self) -> Option<CaptureWindow> {
        let start_t = self.start_t.take()?;
        let samples = self
            .samples
            .drain(..)
            .map(|sample| RawSample::new(sample.t.saturating_sub(start_t), sample.values))
            .collect();

        Some(CaptureWindow { start_t, samples })
    }

    /// Discard the active window without producing anything
    pub fn clear(&mut self) {
        self.start_t = None;
        self.samples.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_at(ms: u64, value: f64) -> RawSample {
        RawSample::new(Duration::from_millis(ms), [value; 6])
    }

    #[test]
    fn test_push_without_start_is_noop() {
        let mut buffer = WindowBuffer::new();
        buffer.push(sample_at(0, 1.0));
        assert!(buffer.is_empty());
        assert!(!buffer.is_active());
        assert!(buffer.drain().is_none());
    }

    #[test]
    fn test_start_resets_previous_samples() {
        let mut buffer = WindowBuffer::with_capacity(4);
        buffer.start(Duration::ZERO);
        buffer.push(sample_at(10, 1.0));
        buffer.push(sample_at(20, 2.0));
        assert_eq!(buffer.len(), 2);

        buffer.start(Duration::from_millis(100));
        assert!(buffer.is_empty());
        assert_eq!(buffer.start_t(), Some(Duration::from_millis(100)));
    }

    #[test]
    fn test_expiry_bound_is_closed() {
        let mut buffer = WindowBuffer::new();
        let duration = Duration::from_secs(2);
        buffer.start(Duration::from_millis(500));

        assert!(!buffer.is_expired(Duration::from_millis(2499), duration));
        assert!(buffer.is_expired(Duration::from_millis(2500), duration));
        assert!(buffer.is_expired(Duration::from_millis(2600), duration));
    }

    #[test]
    fn test_inactive_buffer_never_expires() {
        let buffer = WindowBuffer::new();
        assert!(!buffer.is_expired(Duration::from_secs(100), Duration::from_secs(1)));
    }

    #[test]
    fn test_drain_rebases_on_start_not_first_sample() {
        let mut buffer = WindowBuffer::new();
        buffer.start(Duration::from_millis(1000));
        buffer.push(sample_at(1003, 1.0));
        buffer.push(sample_at(1045, 2.0));

        let window = buffer.drain().unwrap();
        assert_eq!(window.start_t, Duration::from_millis(1000));
        assert_eq!(window.samples[0].t, Duration::from_millis(3));
        assert_eq!(window.samples[1].t, Duration::from_millis(45));
        assert_eq!(window.samples[1].values, [2.0; 6]);

        assert!(!buffer.is_active());
        assert!(buffer.is_empty());
    }

    #[test]
    fn test_clear_discards_window() {
        let mut buffer = WindowBuffer::new();
        buffer.start(Duration::ZERO);
        buffer.push(sample_at(0, 1.0));
        buffer.clear();

        assert!(!buffer.is_active());
        assert!(buffer.drain().is_none());
    }
}
