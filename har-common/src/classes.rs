//! Activity classes and their mappings
//!
//! `ClassId` is exhaustive: every mapping from a class to a control direction
//! or an indicator colour is a total function, either a `match` or a
//! [`ClassMap`] with one field per class. Adding a class is a compile error
//! everywhere a mapping is missing.

use crate::events::Direction;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Activity label assigned by the operator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClassId {
    Standing,
    Sitting,
    Lying,
    TurningCw,
}

impl ClassId {
    /// All classes, ordered by numeric id
    pub const ALL: [ClassId; 4] = [
        ClassId::Standing,
        ClassId::Sitting,
        ClassId::Lying,
        ClassId::TurningCw,
    ];

    /// Numeric id written to the dataset
    pub fn id(self) -> u8 {
        match self {
            ClassId::Standing => 0,
            ClassId::Sitting => 1,
            ClassId::Lying => 2,
            ClassId::TurningCw => 3,
        }
    }

    pub fn from_id(id: u8) -> Option<Self> {
        Self::ALL.into_iter().find(|class| class.id() == id)
    }

    /// Short machine name (config keys, logs)
    pub fn name(self) -> &'static str {
        match self {
            ClassId::Standing => "standing",
            ClassId::Sitting => "sitting",
            ClassId::Lying => "lying",
            ClassId::TurningCw => "turning_cw",
        }
    }

    /// Operator-facing description
    pub fn description(self) -> &'static str {
        match self {
            ClassId::Standing => "Standing",
            ClassId::Sitting => "Sitting",
            ClassId::Lying => "Lying",
            ClassId::TurningCw => "Turn on spot (CW)",
        }
    }

    /// Built-in control direction used when no configuration overrides it
    pub fn default_direction(self) -> Direction {
        match self {
            ClassId::Standing => Direction::Up,
            ClassId::Sitting => Direction::Down,
            ClassId::Lying => Direction::Left,
            ClassId::TurningCw => Direction::Right,
        }
    }

    /// Built-in indicator colour used when no configuration overrides it
    pub fn default_colour(self) -> Rgb {
        match self {
            ClassId::Standing => Rgb::RED,
            ClassId::Sitting => Rgb::GREEN,
            ClassId::Lying => Rgb::BLUE,
            ClassId::TurningCw => Rgb::YELLOW,
        }
    }
}

impl fmt::Display for ClassId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Final label of a window: a class, or an explicit operator skip
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Label {
    Class(ClassId),
    Skip,
}

impl Label {
    pub fn class(self) -> Option<ClassId> {
        match self {
            Label::Class(class) => Some(class),
            Label::Skip => None,
        }
    }

    pub fn is_skip(self) -> bool {
        self == Label::Skip
    }
}

impl fmt::Display for Label {
    /// Dataset form: the integer class id, or `skip`
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Label::Class(class) => write!(f, "{}", class.id()),
            Label::Skip => f.write_str("skip"),
        }
    }
}

impl FromStr for Label {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("skip") {
            return Ok(Label::Skip);
        }
        s.parse::<u8>()
            .ok()
            .and_then(ClassId::from_id)
            .map(Label::Class)
            .ok_or_else(|| Error::InvalidInput(format!("unknown label '{}'", s)))
    }
}

/// Indicator colour
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Rgb(pub [u8; 3]);

impl Rgb {
    pub const OFF: Rgb = Rgb([0, 0, 0]);
    pub const RED: Rgb = Rgb([255, 0, 0]);
    pub const GREEN: Rgb = Rgb([0, 255, 0]);
    pub const BLUE: Rgb = Rgb([0, 0, 255]);
    pub const YELLOW: Rgb = Rgb([255, 255, 0]);

    pub fn r(self) -> u8 {
        self.0[0]
    }

    pub fn g(self) -> u8 {
        self.0[1]
    }

    pub fn b(self) -> u8 {
        self.0[2]
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r(), self.g(), self.b())
    }
}

/// One value per class
///
/// Deserializes from a table with exactly the four class keys; a missing
/// class is a load error rather than a silent gap.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ClassMap<T> {
    pub standing: T,
    pub sitting: T,
    pub lying: T,
    pub turning_cw: T,
}

impl<T> ClassMap<T> {
    pub fn from_fn(mut f: impl FnMut(ClassId) -> T) -> Self {
        Self {
            standing: f(ClassId::Standing),
            sitting: f(ClassId::Sitting),
            lying: f(ClassId::Lying),
            turning_cw: f(ClassId::TurningCw),
        }
    }

    pub fn get(&self, class: ClassId) -> &T {
        match class {
            ClassId::Standing => &self.standing,
            ClassId::Sitting => &self.sitting,
            ClassId::Lying => &self.lying,
            ClassId::TurningCw => &self.turning_cw,
        }
    }

    /// `(class, value)` pairs in class id order
    pub fn iter(&self) -> impl Iterator<Item = (ClassId, &T)> {
        ClassId::ALL.into_iter().map(move |class| (class, self.get(class)))
    }
}
