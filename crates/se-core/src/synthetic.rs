//! Synthetic match generation for demos and tests.
//!
//! Possessions alternate between the two teams with some persistence, each
//! holding a handful of events separated by exponential gaps. The output is
//! only meant to look plausible; nothing here is calibrated.

use rand::Rng;
use rand::distributions::WeightedIndex;
use rand_distr::{Distribution, Exp};
use thiserror::Error;

use crate::event::EventDraft;
use crate::event_type::EventType;
use crate::matches::{Match, MatchError};
use crate::types::ValidationError;

/// Relative frequency of each generated event type.
const TYPE_WEIGHTS: [(EventType, f64); 6] = [
    (EventType::Pass, 0.65),
    (EventType::Dribble, 0.10),
    (EventType::Tackle, 0.07),
    (EventType::Turnover, 0.08),
    (EventType::Foul, 0.05),
    (EventType::Shot, 0.05),
];

#[derive(Debug, Error)]
pub enum SyntheticError {
    #[error("invalid generator setting {field}: {reason}")]
    InvalidConfig { field: &'static str, reason: String },

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Match(#[from] MatchError),
}

/// Generator parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct SyntheticConfig {
    pub home_team: String,
    pub away_team: String,
    /// Regulation length in seconds. Default: 5400.
    pub duration_secs: f64,
    /// Mean gap between consecutive events. Default: 7 s.
    pub mean_gap_secs: f64,
    /// Events per possession, inclusive. Default: 3..=10.
    pub min_events: u32,
    pub max_events: u32,
    /// Chance the ball changes hands after a possession. Default: 0.4.
    pub switch_probability: f64,
    /// Chance a shot is scored. Default: 0.15.
    pub goal_probability: f64,
}

impl Default for SyntheticConfig {
    fn default() -> Self {
        Self {
            home_team: "Home FC".to_string(),
            away_team: "Away FC".to_string(),
            duration_secs: 90.0 * 60.0,
            mean_gap_secs: 7.0,
            min_events: 3,
            max_events: 10,
            switch_probability: 0.4,
            goal_probability: 0.15,
        }
    }
}

impl SyntheticConfig {
    fn validate(&self) -> Result<(), SyntheticError> {
        let invalid = |field, reason: &str| SyntheticError::InvalidConfig {
            field,
            reason: reason.to_string(),
        };
        if self.home_team == self.away_team {
            return Err(invalid("away_team", "must differ from home_team"));
        }
        if !self.duration_secs.is_finite() || self.duration_secs < 0.0 {
            return Err(invalid("duration_secs", "must be a finite number >= 0"));
        }
        if !self.mean_gap_secs.is_finite() || self.mean_gap_secs <= 0.0 {
            return Err(invalid("mean_gap_secs", "must be a finite number > 0"));
        }
        if self.min_events == 0 || self.min_events > self.max_events {
            return Err(invalid("min_events", "must be between 1 and max_events"));
        }
        for (field, p) in [
            ("switch_probability", self.switch_probability),
            ("goal_probability", self.goal_probability),
        ] {
            if !(0.0..=1.0).contains(&p) {
                return Err(invalid(field, "must be between 0 and 1"));
            }
        }
        Ok(())
    }
}

/// Generates a full match from `rng`.
///
/// The same config and seed always produce the same match.
pub fn generate<R: Rng + ?Sized>(
    config: &SyntheticConfig,
    rng: &mut R,
) -> Result<Match, SyntheticError> {
    config.validate()?;
    let gap = Exp::new(1.0 / config.mean_gap_secs).map_err(|e| SyntheticError::InvalidConfig {
        field: "mean_gap_secs",
        reason: e.to_string(),
    })?;
    let types = WeightedIndex::new(TYPE_WEIGHTS.iter().map(|(_, w)| *w)).map_err(|e| {
        SyntheticError::InvalidConfig {
            field: "type weights",
            reason: e.to_string(),
        }
    })?;

    let mut m = Match::new(config.home_team.clone(), config.away_team.clone())?;
    let mut attacking_home = true;
    let mut clock = 0.0;

    while clock < config.duration_secs {
        let team = if attacking_home {
            &config.home_team
        } else {
            &config.away_team
        };
        let possession = m.new_possession(team.as_str());
        let event_count = rng.gen_range(config.min_events..=config.max_events);

        for _ in 0..event_count {
            clock += gap.sample(rng);
            if clock > config.duration_secs {
                break;
            }
            let event_type = TYPE_WEIGHTS[types.sample(rng)].0;
            let mut draft = EventDraft::new(clock, event_type, team.as_str())?
                .with_location(Some(rng.r#gen()), Some(rng.r#gen()))?
                .with_description(title_case(event_type.as_str()));
            if event_type == EventType::Shot && rng.gen_bool(config.goal_probability) {
                draft = draft.goal().with_description("Goal!");
            }
            m.add_event(possession, draft)?;
        }

        if rng.gen_bool(config.switch_probability) {
            attacking_home = !attacking_home;
        }
    }

    tracing::debug!(
        events = m.len(),
        possessions = m.possession_count(),
        "generated synthetic match"
    );
    Ok(m)
}

fn title_case(label: &str) -> String {
    let mut chars = label.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use crate::event::Event;

    fn seeded(seed: u64) -> Match {
        let mut rng = StdRng::seed_from_u64(seed);
        generate(&SyntheticConfig::default(), &mut rng).unwrap()
    }

    #[test]
    fn same_seed_same_match() {
        let a: Vec<Event> = seeded(3).iter_events().cloned().collect();
        let b: Vec<Event> = seeded(3).iter_events().cloned().collect();
        assert_eq!(a, b);
    }

    #[test]
    fn events_stay_within_regulation_and_in_order() {
        let m = seeded(11);
        assert!(m.len() > 300, "only {} events", m.len());
        let times: Vec<f64> = m.iter_events().map(Event::match_time).collect();
        assert!(times.windows(2).all(|w| w[0] <= w[1]));
        assert!(times.iter().all(|t| (0.0..=5_400.0).contains(t)));
    }

    #[test]
    fn possessions_hold_at_most_max_events_of_one_team() {
        let m = seeded(5);
        for node in m.iter_possessions() {
            let events: Vec<&Event> = m.possession_events(node.id()).unwrap().collect();
            assert!(events.len() <= 10);
            assert!(events.iter().all(|e| e.team() == node.team_in_possession()));
        }
    }

    #[test]
    fn only_generated_types_appear() {
        let m = seeded(8);
        assert_eq!(
            m.events_by_type(&[EventType::Save, EventType::Clearance, EventType::Interception])
                .count(),
            0
        );
        assert!(m.goals_for_team("Home FC").all(|e| e.description() == Some("Goal!")));
    }

    #[test]
    fn invalid_settings_are_rejected() {
        let mut rng = StdRng::seed_from_u64(0);
        let config = SyntheticConfig {
            switch_probability: 1.5,
            ..SyntheticConfig::default()
        };
        let err = generate(&config, &mut rng).unwrap_err();
        assert!(err.to_string().contains("switch_probability"));

        let config = SyntheticConfig {
            min_events: 4,
            max_events: 2,
            ..SyntheticConfig::default()
        };
        assert!(generate(&config, &mut rng).is_err());

        let config = SyntheticConfig {
            away_team: "Home FC".to_string(),
            ..SyntheticConfig::default()
        };
        let err = generate(&config, &mut rng).unwrap_err();
        assert!(err.to_string().contains("must differ from home_team"));
    }

    #[test]
    fn title_case_labels() {
        assert_eq!(title_case("INTERCEPTION"), "Interception");
        assert_eq!(title_case(""), "");
    }
}
