//! Clock abstraction
//!
//! Samples are stamped with a monotonic offset from the clock's origin;
//! finished windows are stamped with wall-clock time for the dataset.
//! `SystemClock` reads tokio's clock, so paused tokio time in tests drives it
//! deterministically.

use chrono::{DateTime, Utc};
use std::time::Duration;

/// Source of monotonic and wall-clock time
pub trait Clock {
    /// Monotonic time elapsed since this clock's origin
    fn monotonic(&self) -> Duration;

    /// Current wall-clock time
    fn wall(&self) -> DateTime<Utc>;
}

/// Get current UTC timestamp
pub fn now() -> DateTime<Utc> {
    Utc::now()
}

/// Clock backed by `tokio::time::Instant` and the system wall clock
#[derive(Debug, Clone)]
pub struct SystemClock {
    origin: tokio::time::Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            origin: tokio::time::Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn monotonic(&self) -> Duration {
        self.origin.elapsed()
    }

    fn wall(&self) -> DateTime<Utc> {
        now()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_now_returns_valid_timestamp() {
        let timestamp = now();
        assert!(timestamp.timestamp() > 946_684_800); // 2000-01-01 00:00:00 UTC
    }

    #[tokio::test(start_paused = true)]
    async fn test_system_clock_follows_tokio_time() {
        let clock = SystemClock::new();
        tokio::time::sleep(Duration::from_millis(40)).await;
        assert_eq!(clock.monotonic(), Duration::from_millis(40));
        assert!(clock.wall() >= now() - chrono::Duration::seconds(1));
    }
}
