//! # HAR Capture Library (har-capture)
//!
//! Windowed capture of 6-axis inertial data with operator labeling.
//!
//! **Purpose:** Sample an IMU at a fixed tick rate, capture fixed-duration
//! windows on a manual trigger, resample each window onto a uniform grid, and
//! attach an operator-confirmed class label before handing the record to the
//! dataset writer. An inference mode reuses the same windowing to classify
//! back-to-back windows with a pretrained model. A label mode walks a
//! previously recorded file and labels it row by row.
//!
//! **Architecture:** single-threaded cooperative tick loop
//!
//! ```text
//! SampleSource → WindowBuffer → (deadline) Resampler → label state machine → WindowEmitter
//! ```

pub mod capture;
pub mod config;
pub mod control;
pub mod error;
pub mod inference;
pub mod labelling;
pub mod operator;
pub mod output;
pub mod pipeline;
pub mod sensor;

pub use config::Settings;
pub use error::{Error, Result};
