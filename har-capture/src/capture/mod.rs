//! Window capture: sample records, the window buffer, and the resampler

pub mod buffer;
pub mod resampler;
pub mod types;

pub use buffer::WindowBuffer;
pub use resampler::Resampler;
pub use types::{Axis, CaptureWindow, LabeledWindow, RawSample, ResampledWindow, AXIS_COUNT};
