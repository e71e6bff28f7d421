//! Coarse 3x3 pitch zones for use as prior state keys.

use std::fmt;

use serde::{Serialize, Serializer};

use crate::event::Event;

/// Band along the pitch length, from the acting team's perspective.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Third {
    Defensive,
    Middle,
    Attacking,
}

/// Band across the pitch width.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Channel {
    Left,
    Center,
    Right,
}

impl Third {
    fn from_x(x: f64) -> Self {
        if x < 1.0 / 3.0 {
            Self::Defensive
        } else if x < 2.0 / 3.0 {
            Self::Middle
        } else {
            Self::Attacking
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Defensive => "def",
            Self::Middle => "mid",
            Self::Attacking => "att",
        }
    }
}

impl Channel {
    fn from_y(y: f64) -> Self {
        if y < 1.0 / 3.0 {
            Self::Left
        } else if y < 2.0 / 3.0 {
            Self::Center
        } else {
            Self::Right
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Center => "center",
            Self::Right => "right",
        }
    }
}

/// One of nine pitch zones, or `Unknown` when a coordinate is missing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PitchZone {
    Known { third: Third, channel: Channel },
    Unknown,
}

impl PitchZone {
    /// Zone for normalized coordinates.
    pub fn from_xy(x: Option<f64>, y: Option<f64>) -> Self {
        match (x, y) {
            (Some(x), Some(y)) => Self::Known {
                third: Third::from_x(x),
                channel: Channel::from_y(y),
            },
            _ => Self::Unknown,
        }
    }

    /// Zone where an event took place.
    pub fn of(event: &Event) -> Self {
        Self::from_xy(event.x(), event.y())
    }
}

impl fmt::Display for PitchZone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Known { third, channel } => write!(f, "{}_{}", third.as_str(), channel.as_str()),
            Self::Unknown => write!(f, "unknown"),
        }
    }
}

impl Serialize for PitchZone {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
