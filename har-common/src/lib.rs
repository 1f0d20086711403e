//! # HAR Common Library
//!
//! Shared code for the activity-recognition capture tools:
//! - Error type
//! - Static configuration (TOML file, resolution order, defaults)
//! - Clock abstraction for monotonic and wall-clock timestamps
//! - Control-event vocabulary (joystick directions and actions)
//! - Activity classes and their direction/colour mappings

pub mod classes;
pub mod config;
pub mod error;
pub mod events;
pub mod time;

pub use classes::{ClassId, ClassMap, Label, Rgb};
pub use error::{Error, Result};
pub use events::{Action, ControlEvent, Direction};
