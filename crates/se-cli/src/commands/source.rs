//! Loading the match a command operates on.

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::Args;
use rand::SeedableRng;
use rand::rngs::StdRng;

use se_core::statsbomb;
use se_core::synthetic::{self, SyntheticConfig};
use se_core::{EventDraft, EventInput, Match, PossessionId};

use crate::Config;

#[derive(Debug, Clone, Default, Args)]
pub struct SourceArgs {
    /// StatsBomb open-data events file (JSON array).
    #[arg(long, value_name = "FILE", conflicts_with_all = ["jsonl", "demo"])]
    pub statsbomb: Option<PathBuf>,

    /// JSON-lines file with one event per line.
    #[arg(long, value_name = "FILE", conflicts_with = "demo")]
    pub jsonl: Option<PathBuf>,

    /// Generate a synthetic match instead of reading a file.
    #[arg(long)]
    pub demo: bool,

    /// Random seed for --demo and for sampling.
    #[arg(long)]
    pub seed: Option<u64>,
}

impl SourceArgs {
    /// Seed from the command line, then from config.
    pub fn seed(&self, config: &Config) -> Option<u64> {
        self.seed.or(config.seed)
    }
}

pub fn rng(seed: Option<u64>) -> StdRng {
    seed.map_or_else(StdRng::from_entropy, StdRng::seed_from_u64)
}

/// Builds the match selected by `args`.
pub fn load(args: &SourceArgs, config: &Config) -> Result<Match> {
    if let Some(path) = &args.statsbomb {
        return load_statsbomb(path, config);
    }
    if let Some(path) = &args.jsonl {
        let file =
            File::open(path).with_context(|| format!("failed to open {}", path.display()))?;
        return parse_events(BufReader::new(file))
            .with_context(|| format!("failed to load {}", path.display()));
    }
    if args.demo {
        let mut rng = rng(args.seed(config));
        return synthetic::generate(&SyntheticConfig::default(), &mut rng)
            .context("failed to generate demo match");
    }
    bail!("no match source given; use --statsbomb FILE, --jsonl FILE, or --demo")
}

fn load_statsbomb(path: &Path, config: &Config) -> Result<Match> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let records = statsbomb::parse_records(&json)
        .with_context(|| format!("invalid StatsBomb file {}", path.display()))?;
    let m = statsbomb::match_from_records(&records, &config.statsbomb())
        .with_context(|| format!("failed to import {}", path.display()))?;
    Ok(m)
}

/// Reads one [`EventInput`] per line.
///
/// The first two teams seen become home and away. Lines sharing a
/// `possession_id` share a possession; lines without one each open their own.
pub fn parse_events<R: BufRead>(reader: R) -> Result<Match> {
    let mut drafts: Vec<(Option<i64>, EventDraft)> = Vec::new();
    for (idx, line) in reader.lines().enumerate() {
        let line = line.with_context(|| format!("failed to read line {}", idx + 1))?;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        let input: EventInput = serde_json::from_str(trimmed)
            .with_context(|| format!("invalid JSON on line {}", idx + 1))?;
        let key = input.possession_id;
        let draft = input
            .into_draft()
            .with_context(|| format!("invalid event on line {}", idx + 1))?;
        drafts.push((key, draft));
    }

    let mut teams: Vec<&str> = Vec::new();
    for (_, draft) in &drafts {
        if !teams.contains(&draft.team()) {
            teams.push(draft.team());
        }
    }
    let [home, away] = teams.as_slice() else {
        bail!("expected events from exactly two teams, found {}", teams.len());
    };
    let mut m = Match::new(*home, *away)?;

    let mut possessions: HashMap<i64, PossessionId> = HashMap::new();
    for (key, draft) in drafts {
        match key {
            Some(key) => {
                let possession = *possessions
                    .entry(key)
                    .or_insert_with(|| m.new_possession(draft.team()));
                m.add_event(possession, draft)?;
            }
            None => {
                m.add_event_in_new_possession(draft)?;
            }
        }
    }
    tracing::debug!(
        events = m.len(),
        possessions = m.possession_count(),
        "loaded event feed"
    );
    Ok(m)
}


#[cfg(test)]
mod tests {
    use super::*;

    use std::io::Cursor;

    use se_core::EventType;

    #[test]
    fn test_parse_events_groups_possessions() {
        let m = parse_events(Cursor::new(fixtures::FEED)).unwrap();
        assert_eq!(m.home_team(), "Home FC");
        assert_eq!(m.away_team(), "Away FC");
        assert_eq!(m.len(), 6);
        // Keys 1 and 2, plus one for the unkeyed save.
        assert_eq!(m.possession_count(), 3);
        assert_eq!(m.goals_for_team("Home FC").count(), 1);
        let last = m.last_possession().unwrap();
        assert_eq!(last.team_in_possession(), "Home FC");
        let saves: Vec<_> = m.possession_events(last.id()).unwrap().collect();
        assert_eq!(saves[0].event_type(), EventType::Save);
    }

    #[test]
    fn test_parse_events_reports_line_numbers() {
        let feed = "{\"match_time\": 1.0, \"event_type\": \"PASS\", \"team\": \"A\"}\n\n{\"match_time\": 2.0, \"team\": \"B\"}\n";
        let err = parse_events(Cursor::new(feed)).unwrap_err();
        assert_eq!(err.to_string(), "invalid event on line 3");
        assert_eq!(
            err.root_cause().to_string(),
            "field 'event_type' is required"
        );

        let err = parse_events(Cursor::new("not json\n")).unwrap_err();
        assert_eq!(err.to_string(), "invalid JSON on line 1");
    }

    #[test]
    fn test_parse_events_needs_two_teams() {
        let feed = "{\"match_time\": 1.0, \"event_type\": \"PASS\", \"team\": \"A\"}\n";
        let err = parse_events(Cursor::new(feed)).unwrap_err();
        assert_eq!(
            err.to_string(),
            "expected events from exactly two teams, found 1"
        );
    }

    #[test]
    fn test_load_without_source_fails() {
        let err = load(&SourceArgs::default(), &Config::default()).unwrap_err();
        assert!(err.to_string().contains("no match source given"));
    }

    #[test]
    fn test_load_demo_is_reproducible() {
        let args = SourceArgs {
            demo: true,
            seed: Some(9),
            ..SourceArgs::default()
        };
        let a = load(&args, &Config::default()).unwrap();
        let b = load(&args, &Config::default()).unwrap();
        assert_eq!(a.summary(), b.summary());
        assert!(!a.is_empty());
    }

    #[test]
    fn test_load_statsbomb_file() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("events.json");
        std::fs::write(
            &path,
            r#"[
                {"type": {"name": "Pass"}, "minute": 0, "second": 5, "team": {"name": "Spain"},
                 "possession": 1, "possession_team": {"name": "Spain"}, "location": [60.0, 40.0]},
                {"type": {"name": "Shot"}, "minute": 0, "second": 9, "team": {"name": "Spain"},
                 "possession": 1, "possession_team": {"name": "Spain"},
                 "shot": {"outcome": {"name": "Goal"}}},
                {"type": {"name": "Pass"}, "minute": 1, "second": 0, "team": {"name": "Italy"},
                 "possession": 2, "possession_team": {"name": "Italy"}}
            ]"#,
        )
        .unwrap();
        let args = SourceArgs {
            statsbomb: Some(path),
            ..SourceArgs::default()
        };
        let m = load(&args, &Config::default()).unwrap();
        assert_eq!(m.len(), 3);
        assert_eq!(m.goals_for_team("Spain").count(), 1);
        let first = m.event_at(0).unwrap();
        assert_eq!(first.x(), Some(0.5));

        let config = Config {
            pitch_length: 0.0,
            ..Config::default()
        };
        let err = load(&args, &config).unwrap_err();
        assert!(err.to_string().starts_with("failed to import"));
        assert_eq!(
            err.root_cause().to_string(),
            "pitch_length must be a finite number > 0, got 0"
        );
    }
}
