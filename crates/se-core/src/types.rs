//! Core type definitions with validation.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::event_type::UnknownEventType;

/// Validation errors for event fields and identifiers.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ValidationError {
    /// The provided value was empty.
    #[error("{field} cannot be empty")]
    Empty { field: &'static str },

    /// A required field was not supplied.
    #[error("field '{field}' is required")]
    Missing { field: &'static str },

    /// Home and away must be different teams.
    #[error("home and away team are both '{team}'")]
    SameTeams { team: String },

    /// Match time must be a finite, non-negative number of seconds.
    #[error("match_time must be a finite number of seconds >= 0, got {value}")]
    InvalidMatchTime { value: f64 },

    /// A pitch coordinate fell outside the normalized range.
    #[error("{field} must be between 0.0 and 1.0, got {value}")]
    CoordinateOutOfRange { field: &'static str, value: f64 },

    /// The event type label is not one of the canonical labels.
    #[error(transparent)]
    UnknownEventType(#[from] UnknownEventType),
}

/// Checks a match time in seconds.
pub fn validate_match_time(value: f64) -> Result<f64, ValidationError> {
    if !value.is_finite() || value < 0.0 {
        return Err(ValidationError::InvalidMatchTime { value });
    }
    Ok(value)
}

/// Checks an optional normalized pitch coordinate.
pub fn validate_coordinate(
    field: &'static str,
    value: Option<f64>,
) -> Result<Option<f64>, ValidationError> {
    match value {
        Some(v) if v.is_nan() || !(0.0..=1.0).contains(&v) => {
            Err(ValidationError::CoordinateOutOfRange { field, value: v })
        }
        other => Ok(other),
    }
}

/// Checks that a required string field is present and non-blank.
pub fn validate_non_empty(field: &'static str, value: String) -> Result<String, ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::Empty { field });
    }
    Ok(value)
}

/// Generates a validated string ID newtype with common trait implementations.
macro_rules! define_string_id {
    (
        $(#[$meta:meta])*
        $name:ident, $field_name:literal
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(String);

        impl $name {
            /// Creates a new ID after validation.
            pub fn new(id: impl Into<String>) -> Result<Self, ValidationError> {
                let id = id.into();
                if id.is_empty() {
                    return Err(ValidationError::Empty { field: $field_name });
                }
                Ok(Self(id))
            }

            /// Returns the ID as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl TryFrom<String> for $name {
            type Error = ValidationError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl From<$name> for String {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

define_string_id!(
    /// A validated match identifier.
    ///
    /// Match IDs are chosen by whoever registers the match in a repository.
    MatchId, "match ID"
);

/// Generates an arena index newtype.
macro_rules! define_arena_id {
    (
        $(#[$meta:meta])*
        $name:ident, $prefix:literal
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(u32);

        impl $name {
            /// Wraps a raw numeric identifier.
            #[must_use]
            pub const fn new(raw: u32) -> Self {
                Self(raw)
            }

            /// Returns the raw numeric identifier.
            #[must_use]
            pub const fn get(self) -> u32 {
                self.0
            }

            pub(crate) const fn index(self) -> usize {
                self.0 as usize
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($prefix, "{}"), self.0)
            }
        }
    };
}

define_arena_id!(
    /// Stable handle for an event inside one match.
    ///
    /// IDs are never reused, even after the event is deleted.
    EventId, "#"
);

define_arena_id!(
    /// Possession number inside one match, starting at 1.
    PossessionId, ""
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn match_id_rejects_empty() {
        assert!(MatchId::new("").is_err());
        assert!(MatchId::new("demo").is_ok());
    }

    #[test]
    fn match_id_serde_rejects_empty() {
        let result: Result<MatchId, _> = serde_json::from_str("\"\"");
        assert!(result.is_err());
    }

    #[test]
    fn match_time_validation() {
        assert!(validate_match_time(0.0).is_ok());
        assert!(validate_match_time(5_700.5).is_ok());
        assert!(validate_match_time(-1.0).is_err());
        assert!(validate_match_time(f64::NAN).is_err());
        assert!(validate_match_time(f64::INFINITY).is_err());
    }

    #[test]
    fn coordinate_validation() {
        assert_eq!(validate_coordinate("x", None), Ok(None));
        assert_eq!(validate_coordinate("x", Some(1.0)), Ok(Some(1.0)));
        assert_eq!(
            validate_coordinate("y", Some(1.2)),
            Err(ValidationError::CoordinateOutOfRange {
                field: "y",
                value: 1.2
            })
        );
        assert!(validate_coordinate("x", Some(f64::NAN)).is_err());
    }

    #[test]
    fn blank_strings_are_rejected() {
        let err = validate_non_empty("team", "  ".to_string()).unwrap_err();
        assert_eq!(err.to_string(), "team cannot be empty");
    }

    #[test]
    fn arena_ids_display() {
        assert_eq!(EventId::new(7).to_string(), "#7");
        assert_eq!(PossessionId::new(3).to_string(), "3");
        assert_eq!(serde_json::to_string(&PossessionId::new(3)).unwrap(), "3");
    }
}
