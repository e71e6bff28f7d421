//! Event type enum as the single source of truth for event type labels.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Canonical event-type labels.
///
/// The set is closed: there is no way to construct a label outside of these
/// ten. External vocabularies are folded into [`EventType::Other`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EventType {
    Pass,
    Shot,
    Foul,
    Turnover,
    Tackle,
    Dribble,
    Interception,
    Save,
    Clearance,
    Other,
}

impl EventType {
    /// All labels in canonical order.
    pub const ALL: [Self; 10] = [
        Self::Pass,
        Self::Shot,
        Self::Foul,
        Self::Turnover,
        Self::Tackle,
        Self::Dribble,
        Self::Interception,
        Self::Save,
        Self::Clearance,
        Self::Other,
    ];

    /// Number of labels (`K` in the prior estimator).
    pub const COUNT: usize = Self::ALL.len();

    /// Position of this label in [`EventType::ALL`].
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Upper-case label used on the wire.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pass => "PASS",
            Self::Shot => "SHOT",
            Self::Foul => "FOUL",
            Self::Turnover => "TURNOVER",
            Self::Tackle => "TACKLE",
            Self::Dribble => "DRIBBLE",
            Self::Interception => "INTERCEPTION",
            Self::Save => "SAVE",
            Self::Clearance => "CLEARANCE",
            Self::Other => "OTHER",
        }
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for EventType {
    type Err = UnknownEventType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|label| label.as_str() == s)
            .ok_or_else(|| UnknownEventType(s.to_string()))
    }
}

impl Serialize for EventType {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for EventType {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Error type for unknown event type strings.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown event type: {0}")]
pub struct UnknownEventType(pub String);
