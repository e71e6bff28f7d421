//! Match events and the inputs used to create or modify them.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::event_type::EventType;
use crate::types::{
    EventId, PossessionId, ValidationError, validate_coordinate, validate_match_time,
    validate_non_empty,
};

/// Open-ended event annotations (e.g. `is_goal`).
pub type Tags = BTreeMap<String, serde_json::Value>;

/// Tag marking a shot that produced a goal.
pub const GOAL_TAG: &str = "is_goal";

/// A single timestamped fact about a match.
///
/// Events are owned by a [`Match`](crate::Match) and only handed out by
/// shared reference; every change goes through
/// [`Match::update_event`](crate::Match::update_event) so the timeline
/// ordering stays intact.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Event {
    id: EventId,
    possession: PossessionId,
    /// Seconds from kickoff; added time pushes this past 5400.
    match_time: f64,
    event_type: EventType,
    team: String,
    player: Option<String>,
    description: Option<String>,
    x: Option<f64>,
    y: Option<f64>,
    tags: Tags,
}

impl Event {
    pub(crate) fn from_draft(id: EventId, possession: PossessionId, draft: EventDraft) -> Self {
        Self {
            id,
            possession,
            match_time: draft.match_time,
            event_type: draft.event_type,
            team: draft.team,
            player: draft.player,
            description: draft.description,
            x: draft.x,
            y: draft.y,
            tags: draft.tags,
        }
    }

    pub const fn id(&self) -> EventId {
        self.id
    }

    /// The possession this event belongs to.
    pub const fn possession(&self) -> PossessionId {
        self.possession
    }

    pub const fn match_time(&self) -> f64 {
        self.match_time
    }

    pub const fn event_type(&self) -> EventType {
        self.event_type
    }

    pub fn team(&self) -> &str {
        &self.team
    }

    pub fn player(&self) -> Option<&str> {
        self.player.as_deref()
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Normalized position along the pitch length.
    pub const fn x(&self) -> Option<f64> {
        self.x
    }

    /// Normalized position across the pitch width.
    pub const fn y(&self) -> Option<f64> {
        self.y
    }

    pub const fn tags(&self) -> &Tags {
        &self.tags
    }

    /// Returns true for a shot whose `is_goal` tag is truthy.
    pub fn is_goal(&self) -> bool {
        self.event_type == EventType::Shot && self.tags.get(GOAL_TAG).is_some_and(is_truthy)
    }

    /// Applies an already validated patch, returning whether `match_time` changed.
    pub(crate) fn apply(&mut self, patch: EventPatch) -> bool {
        let time_changed = patch
            .match_time
            .is_some_and(|t| t.total_cmp(&self.match_time).is_ne());
        if let Some(match_time) = patch.match_time {
            self.match_time = match_time;
        }
        if let Some(event_type) = patch.event_type {
            self.event_type = event_type;
        }
        if let Some(team) = patch.team {
            self.team = team;
        }
        if let Some(player) = patch.player {
            self.player = player;
        }
        if let Some(description) = patch.description {
            self.description = description;
        }
        if let Some(x) = patch.x {
            self.x = x;
        }
        if let Some(y) = patch.y {
            self.y = y;
        }
        if let Some(tags) = patch.tags {
            self.tags = tags;
        }
        time_changed
    }
}

/// Truthiness of a tag value: `false`, `null`, zero and empty values are false.
pub fn is_truthy(value: &serde_json::Value) -> bool {
    use serde_json::Value;

    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|v| v != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}

/// A validated event that has not been attached to a match yet.
#[derive(Debug, Clone, PartialEq)]
pub struct EventDraft {
    match_time: f64,
    event_type: EventType,
    team: String,
    player: Option<String>,
    description: Option<String>,
    x: Option<f64>,
    y: Option<f64>,
    tags: Tags,
}

impl EventDraft {
    /// Creates a draft with the required fields.
    pub fn new(
        match_time: f64,
        event_type: EventType,
        team: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        Ok(Self {
            match_time: validate_match_time(match_time)?,
            event_type,
            team: validate_non_empty("team", team.into())?,
            player: None,
            description: None,
            x: None,
            y: None,
            tags: Tags::new(),
        })
    }

    #[must_use]
    pub fn with_player(mut self, player: impl Into<String>) -> Self {
        self.player = Some(player.into());
        self
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets normalized pitch coordinates; either may be absent.
    pub fn with_location(mut self, x: Option<f64>, y: Option<f64>) -> Result<Self, ValidationError> {
        self.x = validate_coordinate("x", x)?;
        self.y = validate_coordinate("y", y)?;
        Ok(self)
    }

    #[must_use]
    pub fn with_tag(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.tags.insert(key.into(), value.into());
        self
    }

    #[must_use]
    pub fn with_tags(mut self, tags: Tags) -> Self {
        self.tags = tags;
        self
    }

    /// Shorthand for tagging a shot as a goal.
    #[must_use]
    pub fn goal(self) -> Self {
        self.with_tag(GOAL_TAG, true)
    }

    pub const fn match_time(&self) -> f64 {
        self.match_time
    }

    pub fn team(&self) -> &str {
        &self.team
    }
}

/// A partial update to an existing event.
///
/// Outer `None` leaves a field untouched. For optional fields, `Some(None)`
/// clears the value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EventPatch {
    pub match_time: Option<f64>,
    pub event_type: Option<EventType>,
    pub team: Option<String>,
    pub player: Option<Option<String>>,
    pub description: Option<Option<String>>,
    pub x: Option<Option<f64>>,
    pub y: Option<Option<f64>>,
    pub tags: Option<Tags>,
}

impl EventPatch {
    /// Validates every supplied field without applying anything.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if let Some(match_time) = self.match_time {
            validate_match_time(match_time)?;
        }
        if let Some(team) = &self.team {
            validate_non_empty("team", team.clone())?;
        }
        if let Some(x) = self.x {
            validate_coordinate("x", x)?;
        }
        if let Some(y) = self.y {
            validate_coordinate("y", y)?;
        }
        Ok(())
    }
}

/// An event as it arrives from an external producer, before validation.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EventInput {
    #[serde(default)]
    pub match_time: Option<f64>,
    #[serde(default)]
    pub event_type: Option<String>,
    #[serde(default)]
    pub team: Option<String>,
    /// Producer-side possession key; not a [`PossessionId`].
    #[serde(default)]
    pub possession_id: Option<i64>,
    #[serde(default)]
    pub player: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub x: Option<f64>,
    #[serde(default)]
    pub y: Option<f64>,
    #[serde(default)]
    pub tags: Option<Tags>,
}

impl EventInput {
    /// Checks required fields and value ranges, producing a draft.
    pub fn into_draft(self) -> Result<EventDraft, ValidationError> {
        let match_time = self
            .match_time
            .ok_or(ValidationError::Missing { field: "match_time" })?;
        let event_type = self
            .event_type
            .filter(|s| !s.is_empty())
            .ok_or(ValidationError::Missing { field: "event_type" })?
            .parse::<EventType>()?;
        let team = self
            .team
            .filter(|s| !s.is_empty())
            .ok_or(ValidationError::Missing { field: "team" })?;

        let mut draft = EventDraft::new(match_time, event_type, team)?
            .with_location(self.x, self.y)?
            .with_tags(self.tags.unwrap_or_default());
        draft.player = self.player;
        draft.description = self.description;
        Ok(draft)
    }
}
