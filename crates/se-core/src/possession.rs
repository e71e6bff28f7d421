//! Possession nodes - ordered runs of events under one team's control.

use serde::Serialize;

use crate::types::{EventId, PossessionId};

/// One team's spell on the ball.
///
/// Possessions form a doubly linked chain in creation order, and each one
/// holds the head and tail of its own event chain. Links are ids into the
/// owning [`Match`](crate::Match) rather than references.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PossessionNode {
    id: PossessionId,
    team_in_possession: String,
    #[serde(skip)]
    pub(crate) prev: Option<PossessionId>,
    #[serde(skip)]
    pub(crate) next: Option<PossessionId>,
    #[serde(skip)]
    pub(crate) first_event: Option<EventId>,
    #[serde(skip)]
    pub(crate) last_event: Option<EventId>,
}

impl PossessionNode {
    pub(crate) const fn new(id: PossessionId, team_in_possession: String) -> Self {
        Self {
            id,
            team_in_possession,
            prev: None,
            next: None,
            first_event: None,
            last_event: None,
        }
    }

    pub const fn id(&self) -> PossessionId {
        self.id
    }

    pub fn team_in_possession(&self) -> &str {
        &self.team_in_possession
    }

    /// The possession created just before this one.
    pub const fn prev(&self) -> Option<PossessionId> {
        self.prev
    }

    /// The possession created just after this one.
    pub const fn next(&self) -> Option<PossessionId> {
        self.next
    }

    pub const fn first_event(&self) -> Option<EventId> {
        self.first_event
    }

    pub const fn last_event(&self) -> Option<EventId> {
        self.last_event
    }

    /// True once every event has been deleted (or none was ever added).
    pub const fn is_empty(&self) -> bool {
        self.first_event.is_none()
    }
}
