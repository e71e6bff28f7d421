//! The match aggregate.
//!
//! A [`Match`] owns two arenas, one of possessions and one of events, and a
//! timeline of event ids sorted by `match_time`. Every structural change
//! goes through the methods here, which keep three linkages consistent:
//!
//! - the possession chain (creation order),
//! - each possession's event chain (insertion order),
//! - the match-wide timeline (non-decreasing `match_time`, ties in
//!   insertion order).
//!
//! # Timeline Ordering
//!
//! The timeline is sorted at all times. Changing an event's `match_time`
//! through [`Match::update_event`] moves it to the position a fresh
//! insertion would take, after any events with the same time. Range queries
//! rely on this to stop early.
//!
//! # Thread Safety
//!
//! `Match` has no interior locking. Concurrent writers must be serialized by
//! the caller, e.g. with the per-match mutex handed out by
//! [`MatchRepository`](crate::repository::MatchRepository).

use std::iter;

use serde::Serialize;
use thiserror::Error;

use crate::event::{Event, EventDraft, EventPatch};
use crate::event_type::EventType;
use crate::possession::PossessionNode;
use crate::types::{EventId, PossessionId, ValidationError, validate_non_empty};

/// Errors from match lookups and mutations.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum MatchError {
    /// No possession with this id exists in the match.
    #[error("possession {id} not found")]
    PossessionNotFound { id: PossessionId },

    /// The event id was never issued or the event was deleted.
    #[error("event {id} not found")]
    EventNotFound { id: EventId },

    /// Timeline position lookup outside `0..len`.
    #[error("event index {index} out of range (match has {len} events)")]
    EventIndexOutOfRange { index: i64, len: usize },

    /// The event arena ran out of ids.
    #[error("match cannot hold more events")]
    CapacityExceeded,

    /// A supplied field failed validation.
    #[error(transparent)]
    Validation(#[from] ValidationError),
}

#[derive(Debug, Clone)]
struct EventSlot {
    event: Event,
    prev: Option<EventId>,
    next: Option<EventId>,
}

/// All possessions and events of a single match.
#[derive(Debug, Clone)]
pub struct Match {
    home_team: String,
    away_team: String,
    /// Indexed by `PossessionId - 1`; possessions are never removed.
    possessions: Vec<PossessionNode>,
    first_possession: Option<PossessionId>,
    last_possession: Option<PossessionId>,
    /// Indexed by `EventId`; deleted events leave `None`.
    slots: Vec<Option<EventSlot>>,
    timeline: Vec<EventId>,
    next_possession_id: u32,
}

impl Match {
    /// Creates an empty match between two named teams.
    pub fn new(
        home_team: impl Into<String>,
        away_team: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        let home_team = validate_non_empty("home_team", home_team.into())?;
        let away_team = validate_non_empty("away_team", away_team.into())?;
        if home_team == away_team {
            return Err(ValidationError::SameTeams { team: home_team });
        }
        Ok(Self {
            home_team,
            away_team,
            possessions: Vec::new(),
            first_possession: None,
            last_possession: None,
            slots: Vec::new(),
            timeline: Vec::new(),
            next_possession_id: 1,
        })
    }

    pub fn home_team(&self) -> &str {
        &self.home_team
    }

    pub fn away_team(&self) -> &str {
        &self.away_team
    }

    /// Number of live events.
    pub fn len(&self) -> usize {
        self.timeline.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timeline.is_empty()
    }

    pub fn possession_count(&self) -> usize {
        self.possessions.len()
    }

    // ========== Possessions ==========

    /// Opens a new possession at the end of the chain.
    ///
    /// Every call allocates a fresh id, even for the team already in
    /// possession.
    pub fn new_possession(&mut self, team: impl Into<String>) -> PossessionId {
        let id = PossessionId::new(self.next_possession_id);
        self.next_possession_id += 1;

        let mut node = PossessionNode::new(id, team.into());
        node.prev = self.last_possession;
        match self.last_possession.and_then(|tail| self.possession_slot_mut(tail)) {
            Some(tail) => tail.next = Some(id),
            None => self.first_possession = Some(id),
        }
        self.last_possession = Some(id);

        tracing::debug!(possession = %id, team = node.team_in_possession(), "opened possession");
        self.possessions.push(node);
        id
    }

    /// Looks up a possession by id.
    pub fn possession(&self, id: PossessionId) -> Result<&PossessionNode, MatchError> {
        id.index()
            .checked_sub(1)
            .and_then(|i| self.possessions.get(i))
            .ok_or(MatchError::PossessionNotFound { id })
    }

    fn possession_slot_mut(&mut self, id: PossessionId) -> Option<&mut PossessionNode> {
        id.index()
            .checked_sub(1)
            .and_then(|i| self.possessions.get_mut(i))
    }

    pub fn first_possession(&self) -> Option<&PossessionNode> {
        self.first_possession.and_then(|id| self.possession(id).ok())
    }

    pub fn last_possession(&self) -> Option<&PossessionNode> {
        self.last_possession.and_then(|id| self.possession(id).ok())
    }

    /// Walks the possession chain from first to last.
    pub fn iter_possessions(&self) -> impl Iterator<Item = &PossessionNode> {
        iter::successors(self.first_possession(), move |node| {
            node.next.and_then(|id| self.possession(id).ok())
        })
    }

    /// Walks the possession chain from last to first.
    pub fn iter_possessions_rev(&self) -> impl Iterator<Item = &PossessionNode> {
        iter::successors(self.last_possession(), move |node| {
            node.prev.and_then(|id| self.possession(id).ok())
        })
    }

    /// Possessions where `team` had the ball, in chain order.
    pub fn possessions_for_team<'a>(
        &'a self,
        team: &'a str,
    ) -> impl Iterator<Item = &'a PossessionNode> + 'a {
        self.iter_possessions()
            .filter(move |node| node.team_in_possession() == team)
    }

    /// Events of one possession, following its chain from `first_event`.
    pub fn possession_events(
        &self,
        id: PossessionId,
    ) -> Result<impl Iterator<Item = &Event>, MatchError> {
        let node = self.possession(id)?;
        Ok(
            iter::successors(node.first_event.and_then(|e| self.slot(e)), move |slot| {
                slot.next.and_then(|e| self.slot(e))
            })
            .map(|slot| &slot.event),
        )
    }

    /// Events of one possession, following its chain back from `last_event`.
    pub fn possession_events_rev(
        &self,
        id: PossessionId,
    ) -> Result<impl Iterator<Item = &Event>, MatchError> {
        let node = self.possession(id)?;
        Ok(
            iter::successors(node.last_event.and_then(|e| self.slot(e)), move |slot| {
                slot.prev.and_then(|e| self.slot(e))
            })
            .map(|slot| &slot.event),
        )
    }

    // ========== Events ==========

    /// Appends an event to an existing possession and the timeline.
    ///
    /// The timeline insertion scans back from the tail, so in-order feeds
    /// cost O(1) and late arrivals cost the distance they move.
    pub fn add_event(
        &mut self,
        possession: PossessionId,
        draft: EventDraft,
    ) -> Result<EventId, MatchError> {
        let tail = self.possession(possession)?.last_event;
        let raw = u32::try_from(self.slots.len()).map_err(|_| MatchError::CapacityExceeded)?;
        let id = EventId::new(raw);
        let event = Event::from_draft(id, possession, draft);
        let match_time = event.match_time();

        if let Some(tail_slot) = tail.and_then(|t| self.slot_mut(t)) {
            tail_slot.next = Some(id);
        }
        self.slots.push(Some(EventSlot {
            event,
            prev: tail,
            next: None,
        }));
        if let Some(node) = self.possession_slot_mut(possession) {
            if node.first_event.is_none() {
                node.first_event = Some(id);
            }
            node.last_event = Some(id);
        }

        let moved = self.insert_into_timeline(id, match_time);
        tracing::trace!(event = %id, %possession, match_time, moved, "added event");
        Ok(id)
    }

    /// Opens a new possession for the draft's team and adds the event to it.
    pub fn add_event_in_new_possession(&mut self, draft: EventDraft) -> Result<EventId, MatchError> {
        let possession = self.new_possession(draft.team());
        self.add_event(possession, draft)
    }

    /// Looks up an event by its stable id.
    pub fn event(&self, id: EventId) -> Result<&Event, MatchError> {
        self.slot(id)
            .map(|slot| &slot.event)
            .ok_or(MatchError::EventNotFound { id })
    }

    /// Looks up an event by its position in the timeline.
    pub fn event_at(&self, index: i64) -> Result<&Event, MatchError> {
        usize::try_from(index)
            .ok()
            .and_then(|i| self.timeline.get(i))
            .and_then(|id| self.slot(*id))
            .map(|slot| &slot.event)
            .ok_or(MatchError::EventIndexOutOfRange {
                index,
                len: self.timeline.len(),
            })
    }

    /// All events in ascending `match_time` order.
    ///
    /// Call `.rev()` for descending order.
    pub fn iter_events(&self) -> impl DoubleEndedIterator<Item = &Event> {
        self.timeline
            .iter()
            .filter_map(move |id| self.slot(*id))
            .map(|slot| &slot.event)
    }

    /// All events in descending `match_time` order.
    pub fn iter_events_rev(&self) -> impl Iterator<Item = &Event> {
        self.iter_events().rev()
    }

    /// Events with `start <= match_time <= end`.
    pub fn events_in_time_range(&self, start: f64, end: f64) -> impl Iterator<Item = &Event> {
        let first = self
            .timeline
            .partition_point(|id| self.time_of(*id).is_some_and(|t| t < start));
        self.timeline[first..]
            .iter()
            .filter_map(move |id| self.slot(*id))
            .map(|slot| &slot.event)
            .take_while(move |event| event.match_time() <= end)
    }

    /// Events whose type is any of `types`, in time order.
    pub fn events_by_type<'a>(
        &'a self,
        types: &'a [EventType],
    ) -> impl Iterator<Item = &'a Event> + 'a {
        self.iter_events()
            .filter(move |event| types.contains(&event.event_type()))
    }

    pub fn shots_for_team<'a>(&'a self, team: &'a str) -> impl Iterator<Item = &'a Event> + 'a {
        self.events_by_type(&[EventType::Shot])
            .filter(move |event| event.team() == team)
    }

    /// Shots by `team` tagged with a truthy `is_goal`.
    pub fn goals_for_team<'a>(&'a self, team: &'a str) -> impl Iterator<Item = &'a Event> + 'a {
        self.shots_for_team(team).filter(|event| event.is_goal())
    }

    /// Applies a partial update to an event.
    ///
    /// The patch is validated in full before anything is written. A changed
    /// `match_time` repositions the event in the timeline; its place in the
    /// possession chain is unchanged.
    pub fn update_event(&mut self, id: EventId, patch: EventPatch) -> Result<&Event, MatchError> {
        patch.validate()?;
        let slot = self.slot_mut(id).ok_or(MatchError::EventNotFound { id })?;
        let time_changed = slot.event.apply(patch);
        let match_time = slot.event.match_time();

        if time_changed {
            self.remove_from_timeline(id);
            let moved = self.insert_into_timeline(id, match_time);
            tracing::debug!(event = %id, match_time, moved, "repositioned event");
        }
        self.event(id)
    }

    /// Removes an event from its possession and the timeline.
    ///
    /// The possession itself stays in the chain even if this was its only
    /// event.
    pub fn delete_event(&mut self, id: EventId) -> Result<Event, MatchError> {
        let slot = self
            .slots
            .get_mut(id.index())
            .and_then(Option::take)
            .ok_or(MatchError::EventNotFound { id })?;

        if let Some(prev) = slot.prev.and_then(|p| self.slot_mut(p)) {
            prev.next = slot.next;
        }
        if let Some(next) = slot.next.and_then(|n| self.slot_mut(n)) {
            next.prev = slot.prev;
        }
        if let Some(node) = self.possession_slot_mut(slot.event.possession()) {
            if node.first_event == Some(id) {
                node.first_event = slot.next;
            }
            if node.last_event == Some(id) {
                node.last_event = slot.prev;
            }
        }
        self.remove_from_timeline(id);

        tracing::debug!(event = %id, possession = %slot.event.possession(), "deleted event");
        Ok(slot.event)
    }

    /// Per-team counts for display.
    pub fn summary(&self) -> MatchSummary {
        MatchSummary {
            home_team: self.home_team.clone(),
            away_team: self.away_team.clone(),
            events: self.len(),
            possessions: self.possession_count(),
            home: self.team_summary(&self.home_team),
            away: self.team_summary(&self.away_team),
        }
    }

    fn team_summary(&self, team: &str) -> TeamSummary {
        TeamSummary {
            team: team.to_string(),
            possessions: self.possessions_for_team(team).count(),
            events: self.iter_events().filter(|e| e.team() == team).count(),
            shots: self.shots_for_team(team).count(),
            goals: self.goals_for_team(team).count(),
        }
    }

    // ========== Arena helpers ==========

    fn slot(&self, id: EventId) -> Option<&EventSlot> {
        self.slots.get(id.index()).and_then(Option::as_ref)
    }

    fn slot_mut(&mut self, id: EventId) -> Option<&mut EventSlot> {
        self.slots.get_mut(id.index()).and_then(Option::as_mut)
    }

    fn time_of(&self, id: EventId) -> Option<f64> {
        self.slot(id).map(|slot| slot.event.match_time())
    }

    /// Stable insertion from the tail. Returns how many events it moved past.
    fn insert_into_timeline(&mut self, id: EventId, match_time: f64) -> usize {
        let len = self.timeline.len();
        let mut idx = len;
        while idx > 0
            && self
                .time_of(self.timeline[idx - 1])
                .is_some_and(|t| t > match_time)
        {
            idx -= 1;
        }
        self.timeline.insert(idx, id);
        len - idx
    }

    fn remove_from_timeline(&mut self, id: EventId) {
        if let Some(pos) = self.timeline.iter().position(|e| *e == id) {
            self.timeline.remove(pos);
        }
    }
}

/// Event, possession, shot, and goal counts for one team.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TeamSummary {
    pub team: String,
    pub possessions: usize,
    pub events: usize,
    pub shots: usize,
    pub goals: usize,
}

/// Headline numbers for a match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MatchSummary {
    pub home_team: String,
    pub away_team: String,
    pub events: usize,
    pub possessions: usize,
    pub home: TeamSummary,
    pub away: TeamSummary,
}
