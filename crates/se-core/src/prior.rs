//! Dirichlet-categorical priors over event types.
//!
//! [`EventTypePrior`] smooths observed label counts with a symmetric
//! Dirichlet concentration `alpha`:
//!
//! ```text
//! p(label) = (count[label] + alpha) / (sum(counts) + alpha * K)
//! ```
//!
//! `K` is fixed at [`EventType::COUNT`]. The label set is closed, so there is
//! no such thing as an unseen label growing the denominator; foreign
//! vocabularies are folded into [`EventType::Other`] before they get here.
//!
//! [`StateEventTypePriors`] keeps one independent prior per state key, where
//! the key is any projection of an event the caller chooses (team,
//! possession, pitch zone, or a tuple of those).

use std::collections::{BTreeMap, HashMap};
use std::fmt::Display;
use std::hash::Hash;

use rand::Rng;
use thiserror::Error;

use crate::event::Event;
use crate::event_type::EventType;

/// Errors from prior construction.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum PriorError {
    /// Concentration must be a finite positive number.
    #[error("alpha must be a finite number > 0, got {0}")]
    InvalidAlpha(f64),

    /// Histogram counts must be finite and non-negative.
    #[error("count for {label} must be a finite number >= 0, got {count}")]
    InvalidCount { label: EventType, count: f64 },
}

/// Anything that carries an event-type label.
///
/// This lets priors be fed from [`Event`]s or from plain label sequences.
pub trait LabelledEvent {
    fn event_type(&self) -> EventType;
}

impl LabelledEvent for Event {
    fn event_type(&self) -> EventType {
        Self::event_type(self)
    }
}

impl LabelledEvent for EventType {
    fn event_type(&self) -> EventType {
        *self
    }
}

impl<T: LabelledEvent + ?Sized> LabelledEvent for &T {
    fn event_type(&self) -> EventType {
        (**self).event_type()
    }
}

/// Smoothed categorical distribution over [`EventType`].
#[derive(Debug, Clone, PartialEq)]
pub struct EventTypePrior {
    alpha: f64,
    counts: [f64; EventType::COUNT],
}

impl EventTypePrior {
    /// Creates a prior with no observations.
    pub fn new(alpha: f64) -> Result<Self, PriorError> {
        if !alpha.is_finite() || alpha <= 0.0 {
            return Err(PriorError::InvalidAlpha(alpha));
        }
        Ok(Self {
            alpha,
            counts: [0.0; EventType::COUNT],
        })
    }

    /// Builds a prior and observes every event.
    pub fn from_events<I>(events: I, alpha: f64) -> Result<Self, PriorError>
    where
        I: IntoIterator,
        I::Item: LabelledEvent,
    {
        let mut prior = Self::new(alpha)?;
        prior.update_from_events(events);
        Ok(prior)
    }

    pub const fn alpha(&self) -> f64 {
        self.alpha
    }

    /// Observed count for one label, excluding alpha.
    pub const fn count(&self, label: EventType) -> f64 {
        self.counts[label.index()]
    }

    /// Sum of observed counts.
    pub fn total_count(&self) -> f64 {
        self.counts.iter().sum()
    }

    /// Total pseudo-count: `sum(counts) + alpha * K`.
    pub fn total_mass(&self) -> f64 {
        self.total_count() + self.alpha * Self::k()
    }

    /// Counts one observation per event.
    pub fn update_from_events<I>(&mut self, events: I)
    where
        I: IntoIterator,
        I::Item: LabelledEvent,
    {
        for event in events {
            self.counts[event.event_type().index()] += 1.0;
        }
    }

    /// Adds externally computed counts.
    ///
    /// The whole histogram is checked first; on error no count changes.
    pub fn update_from_histogram<I>(&mut self, histogram: I) -> Result<(), PriorError>
    where
        I: IntoIterator<Item = (EventType, f64)>,
    {
        let histogram: Vec<(EventType, f64)> = histogram.into_iter().collect();
        if let Some(&(label, count)) = histogram
            .iter()
            .find(|(_, count)| !count.is_finite() || *count < 0.0)
        {
            return Err(PriorError::InvalidCount { label, count });
        }
        for (label, count) in histogram {
            self.counts[label.index()] += count;
        }
        Ok(())
    }

    /// Posterior probability of a single label.
    pub fn posterior_prob(&self, label: EventType) -> f64 {
        let denom = self.total_mass();
        if denom <= 0.0 {
            return 1.0 / Self::k();
        }
        (self.count(label) + self.alpha) / denom
    }

    /// The full distribution, in canonical label order.
    ///
    /// One denominator is shared by every label so the values sum to 1.
    pub fn probs(&self) -> [(EventType, f64); EventType::COUNT] {
        let denom = self.total_mass();
        EventType::ALL.map(|label| {
            let p = if denom <= 0.0 {
                1.0 / Self::k()
            } else {
                (self.count(label) + self.alpha) / denom
            };
            (label, p)
        })
    }

    /// Natural-log probabilities, for scoring sequences.
    pub fn log_probs(&self) -> [(EventType, f64); EventType::COUNT] {
        self.probs().map(|(label, p)| (label, p.ln()))
    }

    /// Draws a label by inverse CDF over [`probs`](Self::probs).
    ///
    /// If rounding leaves the cumulative sum short of the draw, the last
    /// label is returned.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> EventType {
        let draw: f64 = rng.r#gen();
        let probs = self.probs();
        let mut acc = 0.0;
        for (label, p) in probs {
            acc += p;
            if draw <= acc {
                return label;
            }
        }
        probs[EventType::COUNT - 1].0
    }

    /// Label string to probability, sorted by label.
    pub fn to_map(&self) -> BTreeMap<String, f64> {
        self.probs()
            .into_iter()
            .map(|(label, p)| (label.to_string(), p))
            .collect()
    }

    #[expect(clippy::cast_precision_loss, reason = "K is 10")]
    fn k() -> f64 {
        EventType::COUNT as f64
    }
}

/// One [`EventTypePrior`] per state key.
#[derive(Debug, Clone)]
pub struct StateEventTypePriors<K> {
    alpha: f64,
    priors: HashMap<K, EventTypePrior>,
}

impl<K: Eq + Hash> StateEventTypePriors<K> {
    /// Creates an empty collection; every key's prior will use `alpha`.
    pub fn new(alpha: f64) -> Result<Self, PriorError> {
        // Validate once so lazily created priors cannot fail.
        EventTypePrior::new(alpha)?;
        Ok(Self {
            alpha,
            priors: HashMap::new(),
        })
    }

    /// Partitions `events` by `key_fn` and builds a prior per key.
    pub fn from_events<I, F>(events: I, key_fn: F, alpha: f64) -> Result<Self, PriorError>
    where
        I: IntoIterator,
        I::Item: LabelledEvent,
        F: FnMut(&I::Item) -> K,
    {
        let mut priors = Self::new(alpha)?;
        priors.update_from_events(events, key_fn);
        Ok(priors)
    }

    pub const fn alpha(&self) -> f64 {
        self.alpha
    }

    /// Routes each event to the prior for `key_fn(event)`.
    pub fn update_from_events<I, F>(&mut self, events: I, mut key_fn: F)
    where
        I: IntoIterator,
        I::Item: LabelledEvent,
        F: FnMut(&I::Item) -> K,
    {
        for event in events {
            let key = key_fn(&event);
            self.get_or_create(key).update_from_events([event]);
        }
    }

    /// The prior for `key`, if any event has been observed under it.
    pub fn get(&self, key: &K) -> Option<&EventTypePrior> {
        self.priors.get(key)
    }

    /// The prior for `key`, creating an empty one if needed.
    pub fn get_or_create(&mut self, key: K) -> &mut EventTypePrior {
        let alpha = self.alpha;
        self.priors.entry(key).or_insert_with(|| EventTypePrior {
            alpha,
            counts: [0.0; EventType::COUNT],
        })
    }

    pub fn len(&self) -> usize {
        self.priors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.priors.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.priors.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&K, &EventTypePrior)> {
        self.priors.iter()
    }

    /// Posterior distributions for every state.
    pub fn state_probs(&self) -> HashMap<&K, [(EventType, f64); EventType::COUNT]> {
        self.priors
            .iter()
            .map(|(key, prior)| (key, prior.probs()))
            .collect()
    }
}

impl<K: Eq + Hash + Display> StateEventTypePriors<K> {
    /// State (rendered with `Display`) to label to probability.
    pub fn to_string_map(&self) -> BTreeMap<String, BTreeMap<String, f64>> {
        self.priors
            .iter()
            .map(|(key, prior)| (key.to_string(), prior.to_map()))
            .collect()
    }
}
