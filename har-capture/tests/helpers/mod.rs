//! Test helper modules for har-capture integration tests
//!
//! Provides reusable test infrastructure components:
//! - Test doubles: scripted sensor, in-memory sink, recording indicator and console
//! - Signals: jittered sample streams and settings builders

#![allow(dead_code)]

pub mod doubles;
pub mod signals;

// Re-export commonly used types
pub use doubles::{MemorySink, Recorded, RecordingConsole, RecordingIndicator, ScriptedDriver};
pub use signals::{jittered_times, settings, settings_with_output, tick_sample};
