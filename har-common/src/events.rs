//! Control-event vocabulary
//!
//! A control source (joystick, keyboard, test script) produces discrete
//! `(direction, action)` events. Only `Pressed` transitions carry meaning for
//! the capture pipeline; `Released` and `Held` are accepted and ignored so a
//! source can forward its raw event stream unchanged.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Discrete control direction
///
/// The first five mirror a five-way joystick. `Aux` is an extra button
/// (keyboard `x`, a second stick button) usually bound to skip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
    Middle,
    Aux,
}

impl Direction {
    /// All directions, in declaration order
    pub const ALL: [Direction; 6] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
        Direction::Middle,
        Direction::Aux,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Direction::Up => "up",
            Direction::Down => "down",
            Direction::Left => "left",
            Direction::Right => "right",
            Direction::Middle => "middle",
            Direction::Aux => "aux",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Direction {
    type Err = Error;

    /// Parse a direction name or its keyboard shortcut.
    ///
    /// An empty string maps to `Middle` so a bare Enter confirms.
    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "up" | "w" => Ok(Direction::Up),
            "down" | "s" => Ok(Direction::Down),
            "left" | "a" => Ok(Direction::Left),
            "right" | "d" => Ok(Direction::Right),
            "middle" | "m" | "enter" | "" => Ok(Direction::Middle),
            "aux" | "x" | "skip" => Ok(Direction::Aux),
            other => Err(Error::InvalidInput(format!("unknown direction '{}'", other))),
        }
    }
}

/// Action reported with a direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    Pressed,
    Released,
    Held,
}

/// One control event from the control-signal source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControlEvent {
    pub direction: Direction,
    pub action: Action,
}

impl ControlEvent {
    pub fn new(direction: Direction, action: Action) -> Self {
        Self { direction, action }
    }

    /// Shorthand for a `Pressed` event
    pub fn pressed(direction: Direction) -> Self {
        Self::new(direction, Action::Pressed)
    }

    pub fn is_pressed(&self) -> bool {
        self.action == Action::Pressed
    }
}
