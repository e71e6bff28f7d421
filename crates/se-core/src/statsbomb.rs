//! StatsBomb open-data event import.
//!
//! Reads the JSON array of a single-match StatsBomb events file and builds a
//! [`Match`]. Only timing, teams, possession, location, player, event type,
//! and shot outcome are used.
//!
//! Imports are all-or-nothing: the match is built completely before it is
//! handed back or registered, so a failure never exposes a partial match.

use std::collections::HashMap;

use serde::Deserialize;
use thiserror::Error;

use crate::event::EventDraft;
use crate::event_type::EventType;
use crate::matches::{Match, MatchError};
use crate::repository::{MatchRepository, RepositoryError, SharedMatch};
use crate::types::{MatchId, PossessionId, ValidationError};

/// Record types that are bookkeeping rather than play.
const SKIPPED_TYPES: [&str; 4] = ["Starting XI", "Half Start", "Half End", "Substitution"];

/// Import errors. Any of these aborts the whole import.
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// The records did not name exactly two teams.
    #[error("could not infer exactly two team names (found {found})")]
    TeamInference { found: usize },

    /// A pitch dimension was zero, negative, or not finite.
    #[error("{field} must be a finite number > 0, got {value}")]
    InvalidPitch { field: &'static str, value: f64 },

    /// A play record had no `minute` or `second`.
    #[error("record {index} is missing minute/second timing")]
    MissingTiming { index: usize },

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Match(#[from] MatchError),

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// Pitch convention of the source data.
#[derive(Debug, Clone, PartialEq)]
pub struct StatsBombConfig {
    /// Length of the pitch in source units. Default: 120.
    pub pitch_length: f64,
    /// Width of the pitch in source units. Default: 80.
    pub pitch_width: f64,
}

impl Default for StatsBombConfig {
    fn default() -> Self {
        Self {
            pitch_length: 120.0,
            pitch_width: 80.0,
        }
    }
}

impl StatsBombConfig {
    /// Checks that both dimensions can scale coordinates.
    pub fn validate(&self) -> Result<(), IngestError> {
        for (field, value) in [
            ("pitch_length", self.pitch_length),
            ("pitch_width", self.pitch_width),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(IngestError::InvalidPitch { field, value });
            }
        }
        Ok(())
    }
}

#[derive(Debug, Default, Deserialize)]
struct Named {
    #[serde(default)]
    name: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct ShotDetail {
    #[serde(default)]
    outcome: Option<Named>,
}

/// One raw StatsBomb event record.
#[derive(Debug, Default, Deserialize)]
pub struct StatsBombRecord {
    #[serde(default, rename = "type")]
    kind: Option<Named>,
    #[serde(default)]
    minute: Option<f64>,
    #[serde(default)]
    second: Option<f64>,
    #[serde(default)]
    team: Option<Named>,
    #[serde(default)]
    possession: Option<serde_json::Value>,
    #[serde(default)]
    possession_team: Option<Named>,
    #[serde(default)]
    location: Option<Vec<serde_json::Value>>,
    #[serde(default)]
    player: Option<Named>,
    #[serde(default)]
    shot: Option<ShotDetail>,
}

fn name_of(named: Option<&Named>) -> Option<&str> {
    named
        .and_then(|n| n.name.as_deref())
        .filter(|s| !s.is_empty())
}

impl StatsBombRecord {
    fn type_name(&self) -> Option<&str> {
        name_of(self.kind.as_ref())
    }

    fn team_name(&self) -> Option<&str> {
        name_of(self.team.as_ref())
    }

    fn outcome_name(&self) -> Option<&str> {
        name_of(self.shot.as_ref().and_then(|s| s.outcome.as_ref()))
    }

    /// Source `[x, y]` scaled to the unit square.
    fn normalized_location(&self, config: &StatsBombConfig) -> (Option<f64>, Option<f64>) {
        let Some(loc) = self.location.as_deref() else {
            return (None, None);
        };
        match (
            loc.first().and_then(serde_json::Value::as_f64),
            loc.get(1).and_then(serde_json::Value::as_f64),
        ) {
            (Some(x), Some(y)) => (
                Some((x / config.pitch_length).clamp(0.0, 1.0)),
                Some((y / config.pitch_width).clamp(0.0, 1.0)),
            ),
            _ => (None, None),
        }
    }
}

/// Parses a StatsBomb events file.
pub fn parse_records(json: &str) -> Result<Vec<StatsBombRecord>, IngestError> {
    Ok(serde_json::from_str(json)?)
}

/// Maps a StatsBomb `type.name` onto the canonical labels.
///
/// The mapping is approximate; anything unrecognized becomes `OTHER`.
pub fn map_event_type(statsbomb_type: &str) -> EventType {
    match statsbomb_type.to_lowercase().as_str() {
        "pass" => EventType::Pass,
        "shot" => EventType::Shot,
        "foul committed" | "foul won" => EventType::Foul,
        "dispossessed" | "miscontrol" => EventType::Turnover,
        "tackle" | "block" => EventType::Tackle,
        "clearance" => EventType::Clearance,
        "dribble" | "carry" => EventType::Dribble,
        "ball recovery" | "interception" => EventType::Interception,
        "goal keeper" | "goalkeeper" | "save" => EventType::Save,
        _ => EventType::Other,
    }
}

/// First two distinct team names, in order of appearance.
fn infer_team_names(records: &[StatsBombRecord]) -> Result<(String, String), IngestError> {
    let mut names: Vec<&str> = Vec::with_capacity(2);
    for name in records.iter().filter_map(StatsBombRecord::team_name) {
        if !names.contains(&name) {
            names.push(name);
            if names.len() == 2 {
                break;
            }
        }
    }
    match names.as_slice() {
        [home, away] => Ok(((*home).to_string(), (*away).to_string())),
        _ => Err(IngestError::TeamInference { found: names.len() }),
    }
}

/// Builds a match from parsed StatsBomb records.
pub fn match_from_records(
    records: &[StatsBombRecord],
    config: &StatsBombConfig,
) -> Result<Match, IngestError> {
    config.validate()?;
    let (home, away) = infer_team_names(records)?;
    let mut m = Match::new(home, away)?;
    let mut possessions: HashMap<i64, PossessionId> = HashMap::new();
    let mut skipped = 0usize;

    for (index, record) in records.iter().enumerate() {
        let Some(type_name) = record.type_name() else {
            skipped += 1;
            continue;
        };
        if SKIPPED_TYPES.contains(&type_name) {
            skipped += 1;
            continue;
        }
        let (Some(minute), Some(second)) = (record.minute, record.second) else {
            return Err(IngestError::MissingTiming { index });
        };
        let Some(team) = record.team_name() else {
            tracing::warn!(index, "skipping record without team");
            skipped += 1;
            continue;
        };

        let possession_team = name_of(record.possession_team.as_ref()).unwrap_or(team);
        let possession = match record.possession.as_ref().and_then(serde_json::Value::as_i64) {
            Some(key) => *possessions
                .entry(key)
                .or_insert_with(|| m.new_possession(possession_team)),
            None => m.new_possession(possession_team),
        };

        let event_type = map_event_type(type_name);
        let (x, y) = record.normalized_location(config);
        let mut draft = EventDraft::new(minute * 60.0 + second, event_type, team)?
            .with_location(x, y)?
            .with_description(type_name);
        if let Some(player) = name_of(record.player.as_ref()) {
            draft = draft.with_player(player);
        }
        if event_type == EventType::Shot && record.outcome_name() == Some("Goal") {
            draft = draft.goal().with_description("Goal");
        }

        m.add_event(possession, draft)?;
    }

    tracing::debug!(
        home = m.home_team(),
        away = m.away_team(),
        events = m.len(),
        possessions = m.possession_count(),
        skipped,
        "imported StatsBomb match"
    );
    Ok(m)
}

/// Builds a match and registers it under `id`.
///
/// Nothing is registered unless the whole import succeeds.
pub fn import_into<R: MatchRepository + ?Sized>(
    repo: &R,
    id: MatchId,
    records: &[StatsBombRecord],
    config: &StatsBombConfig,
) -> Result<SharedMatch, IngestError> {
    let m = match_from_records(records, config)?;
    Ok(repo.insert(id, m)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::repository::InMemoryRepository;

    const SAMPLE: &str = r#"[
        {"type": {"name": "Starting XI"}, "minute": 0, "second": 0,
         "team": {"name": "Spain"}},
        {"type": {"name": "Starting XI"}, "minute": 0, "second": 0,
         "team": {"name": "Italy"}},
        {"type": {"name": "Pass"}, "minute": 0, "second": 1, "possession": 2,
         "team": {"name": "Spain"}, "possession_team": {"name": "Spain"},
         "player": {"name": "Rodri"}, "location": [60.0, 40.0]},
        {"type": {"name": "Carry"}, "minute": 0, "second": 3, "possession": 2,
         "team": {"name": "Spain"}, "possession_team": {"name": "Spain"},
         "location": [70.0, 20.0]},
        {"type": {"name": "Shot"}, "minute": 0, "second": 9, "possession": 2,
         "team": {"name": "Spain"}, "possession_team": {"name": "Spain"},
         "location": [110.0, 38.0], "shot": {"outcome": {"name": "Goal"}}},
        {"type": {"name": "Pressure"}, "minute": 0, "second": 8, "possession": 2,
         "team": {"name": "Italy"}, "possession_team": {"name": "Spain"}},
        {"type": {"name": "Half End"}, "minute": 45, "second": 0,
         "team": {"name": "Spain"}},
        {"type": {"name": "Shot"}, "minute": 91, "second": 30, "possession": 7,
         "team": {"name": "Italy"}, "possession_team": {"name": "Italy"},
         "location": [130.0, 85.0], "shot": {"outcome": {"name": "Saved"}}},
        {"minute": 92, "second": 0, "team": {"name": "Italy"}}
    ]"#;

    fn import(json: &str) -> Result<Match, IngestError> {
        let records = parse_records(json)?;
        match_from_records(&records, &StatsBombConfig::default())
    }

    #[test]
    fn maps_statsbomb_types() {
        assert_eq!(map_event_type("Pass"), EventType::Pass);
        assert_eq!(map_event_type("Foul Won"), EventType::Foul);
        assert_eq!(map_event_type("Miscontrol"), EventType::Turnover);
        assert_eq!(map_event_type("Block"), EventType::Tackle);
        assert_eq!(map_event_type("Clearance"), EventType::Clearance);
        assert_eq!(map_event_type("Ball Recovery"), EventType::Interception);
        assert_eq!(map_event_type("Goal Keeper"), EventType::Save);
        assert_eq!(map_event_type("50/50"), EventType::Other);
        assert_eq!(map_event_type("Pressure"), EventType::Other);
    }

    #[test]
    fn imports_sample_match() {
        let m = import(SAMPLE).unwrap();
        assert_eq!((m.home_team(), m.away_team()), ("Spain", "Italy"));
        assert_eq!(m.len(), 5);
        // Possession 2 is shared; possession 7 is its own.
        assert_eq!(m.possession_count(), 2);

        let times: Vec<f64> = m.iter_events().map(|e| e.match_time()).collect();
        assert_eq!(times, vec![1.0, 3.0, 8.0, 9.0, 5_490.0]);

        let first = m.event_at(0).unwrap();
        assert_eq!(first.player(), Some("Rodri"));
        assert_eq!((first.x(), first.y()), (Some(0.5), Some(0.5)));
        assert_eq!(first.description(), Some("Pass"));

        let goals: Vec<&str> = m
            .goals_for_team("Spain")
            .filter_map(|e| e.description())
            .collect();
        assert_eq!(goals, vec!["Goal"]);
        assert_eq!(m.goals_for_team("Italy").count(), 0);
        assert_eq!(m.shots_for_team("Italy").count(), 1);
    }

    #[test]
    fn sample_match_summary() {
        let m = import(SAMPLE).unwrap();
        insta::assert_snapshot!(serde_json::to_string_pretty(&m.summary()).unwrap(), @r#"
        {
          "home_team": "Spain",
          "away_team": "Italy",
          "events": 5,
          "possessions": 2,
          "home": {
            "team": "Spain",
            "possessions": 1,
            "events": 3,
            "shots": 1,
            "goals": 1
          },
          "away": {
            "team": "Italy",
            "possessions": 1,
            "events": 2,
            "shots": 1,
            "goals": 0
          }
        }
        "#);
    }

    #[test]
    fn possession_team_comes_from_possession_field() {
        let m = import(SAMPLE).unwrap();
        let pressure = m.event_at(2).unwrap();
        assert_eq!(pressure.team(), "Italy");
        assert_eq!(pressure.event_type(), EventType::Other);
        let node = m.possession(pressure.possession()).unwrap();
        assert_eq!(node.team_in_possession(), "Spain");
    }

    #[test]
    fn locations_are_clamped_to_unit_square() {
        let m = import(SAMPLE).unwrap();
        let late_shot = m.event_at(4).unwrap();
        assert_eq!((late_shot.x(), late_shot.y()), (Some(1.0), Some(1.0)));
        assert_eq!(m.event_at(2).unwrap().x(), None);
    }

    #[test]
    fn custom_pitch_dimensions_scale_coordinates() {
        let records = parse_records(SAMPLE).unwrap();
        let config = StatsBombConfig {
            pitch_length: 240.0,
            pitch_width: 160.0,
        };
        let m = match_from_records(&records, &config).unwrap();
        let first = m.event_at(0).unwrap();
        assert_eq!((first.x(), first.y()), (Some(0.25), Some(0.25)));
    }

    #[test]
    fn degenerate_pitch_dimensions_are_rejected() {
        let records = parse_records(SAMPLE).unwrap();
        let config = StatsBombConfig {
            pitch_length: 0.0,
            pitch_width: -80.0,
        };
        let err = match_from_records(&records, &config).unwrap_err();
        assert_eq!(err.to_string(), "pitch_length must be a finite number > 0, got 0");

        let config = StatsBombConfig {
            pitch_width: f64::NAN,
            ..StatsBombConfig::default()
        };
        assert!(matches!(
            match_from_records(&records, &config),
            Err(IngestError::InvalidPitch {
                field: "pitch_width",
                ..
            })
        ));
    }

    #[test]
    fn single_team_fails_inference() {
        let json = r#"[{"type": {"name": "Pass"}, "minute": 0, "second": 1,
                        "team": {"name": "Spain"}}]"#;
        let err = import(json).unwrap_err();
        assert!(matches!(err, IngestError::TeamInference { found: 1 }));
    }

    #[test]
    fn missing_timing_fails_the_import() {
        let json = r#"[
            {"type": {"name": "Pass"}, "minute": 0, "second": 1, "team": {"name": "A"}},
            {"type": {"name": "Pass"}, "minute": 3, "team": {"name": "B"}}
        ]"#;
        let err = import(json).unwrap_err();
        assert_eq!(err.to_string(), "record 1 is missing minute/second timing");
    }

    #[test]
    fn records_without_possession_open_their_own() {
        let json = r#"[
            {"type": {"name": "Pass"}, "minute": 0, "second": 1, "team": {"name": "A"}},
            {"type": {"name": "Pass"}, "minute": 0, "second": 2, "team": {"name": "A"}},
            {"type": {"name": "Pass"}, "minute": 0, "second": 3, "team": {"name": "B"}}
        ]"#;
        let m = import(json).unwrap();
        assert_eq!(m.possession_count(), 3);
    }

    #[test]
    fn failed_import_registers_nothing() {
        let repo = InMemoryRepository::new();
        let id = MatchId::new("euro-final").unwrap();
        let bad = parse_records(r#"[{"type": {"name": "Pass"}, "team": {"name": "A"}}]"#).unwrap();
        assert!(import_into(&repo, id.clone(), &bad, &StatsBombConfig::default()).is_err());
        assert!(repo.get(&id).is_none());

        let good = parse_records(SAMPLE).unwrap();
        let shared = import_into(&repo, id.clone(), &good, &StatsBombConfig::default()).unwrap();
        assert_eq!(shared.lock().unwrap().len(), 5);
        assert_eq!(repo.ids(), vec![id]);
    }

    #[test]
    fn malformed_json_is_reported() {
        assert!(matches!(parse_records("{"), Err(IngestError::Json(_))));
    }
}
