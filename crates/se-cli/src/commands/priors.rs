//! Priors command for per-state event-type distributions.

use std::io::Write;

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};

use se_core::{Event, Match, PitchZone, StateEventTypePriors};

use super::source::{self, SourceArgs};
use crate::Config;

/// How events are partitioned into game states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StateKey {
    /// The acting team.
    Team,
    /// The possession the event belongs to.
    Possession,
    /// The acting team and the pitch zone of the event.
    TeamZone,
}

impl StateKey {
    /// Renders the state of one event, e.g. `Home FC:att_center`.
    pub fn of(self, event: &Event) -> String {
        match self {
            Self::Team => event.team().to_string(),
            Self::Possession => event.possession().to_string(),
            Self::TeamZone => format!("{}:{}", event.team(), PitchZone::of(event)),
        }
    }
}

#[derive(Debug, Args)]
pub struct PriorsArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    /// State partition.
    #[arg(long, value_enum, default_value_t = StateKey::Team)]
    pub by: StateKey,

    /// Dirichlet smoothing; overrides the configured alpha.
    #[arg(long)]
    pub alpha: Option<f64>,
}

/// Fits one prior per state over every event of the match.
pub fn build(m: &Match, by: StateKey, alpha: f64) -> Result<StateEventTypePriors<String>> {
    StateEventTypePriors::from_events(m.iter_events(), |event| by.of(event), alpha)
        .context("invalid prior settings")
}

pub fn run<W: Write>(writer: &mut W, args: &PriorsArgs, config: &Config) -> Result<()> {
    let m = source::load(&args.source, config)?;
    let alpha = args.alpha.unwrap_or(config.alpha);
    let priors = build(&m, args.by, alpha)?;
    tracing::debug!(states = priors.len(), alpha, by = ?args.by, "fitted priors");

    writeln!(
        writer,
        "{}",
        serde_json::to_string_pretty(&priors.to_string_map())?
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::collections::BTreeMap;

    use crate::commands::source::fixtures;

    const TOLERANCE: f64 = 1e-9;

    type StateMap = BTreeMap<String, BTreeMap<String, f64>>;

    fn run_for(by: StateKey, alpha: Option<f64>) -> Result<StateMap> {
        let temp = tempfile::tempdir().unwrap();
        let args = PriorsArgs {
            source: fixtures::feed_source(&temp),
            by,
            alpha,
        };
        let mut output = Vec::new();
        run(&mut output, &args, &Config::default())?;
        Ok(serde_json::from_slice(&output).unwrap())
    }

    #[test]
    fn team_priors_smooth_counts() {
        let states = run_for(StateKey::Team, Some(1.0)).unwrap();
        assert_eq!(
            states.keys().collect::<Vec<_>>(),
            vec!["Away FC", "Home FC"]
        );

        // Home FC: PASS, DRIBBLE, SHOT, SAVE over 10 labels.
        let home = &states["Home FC"];
        assert!((home["PASS"] - 2.0 / 14.0).abs() < TOLERANCE);
        assert!((home["FOUL"] - 1.0 / 14.0).abs() < TOLERANCE);
        assert_eq!(home.len(), 10);
        for probs in states.values() {
            let total: f64 = probs.values().sum();
            assert!((total - 1.0).abs() < TOLERANCE);
        }
    }

    #[test]
    fn configured_alpha_is_the_default() {
        let states = run_for(StateKey::Team, None).unwrap();
        // Away FC: PASS, SHOT; alpha 0.5 gives 1.5 / 7.
        assert!((states["Away FC"]["SHOT"] - 1.5 / 7.0).abs() < TOLERANCE);
    }

    #[test]
    fn possession_and_zone_partitions() {
        let states = run_for(StateKey::Possession, None).unwrap();
        assert_eq!(states.keys().collect::<Vec<_>>(), vec!["1", "2", "3"]);

        let states = run_for(StateKey::TeamZone, None).unwrap();
        assert!(states.contains_key("Home FC:att_center"));
        assert!(states.contains_key("Away FC:def_right"));
        assert!(states.contains_key("Home FC:unknown"));
    }

    #[test]
    fn rejects_non_positive_alpha() {
        let err = run_for(StateKey::Team, Some(0.0)).unwrap_err();
        assert_eq!(err.to_string(), "invalid prior settings");
        assert_eq!(
            err.root_cause().to_string(),
            "alpha must be a finite number > 0, got 0"
        );
    }
}
