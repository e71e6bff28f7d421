//! Core domain logic for soccer match events.
//!
//! This crate contains the fundamental types and logic for:
//! - Match model: possessions and events with a time-ordered timeline
//! - Priors: Dirichlet-smoothed event-type distributions per game state
//! - Ingestion: StatsBomb open-data import and synthetic match generation
//! - Storage: the [`MatchRepository`] seam for hosting matches
//!
//! Nothing here is global. A [`Match`] is a plain value; sharing it between
//! threads is the job of whatever repository the caller injects.

pub mod event;
pub mod event_type;
pub mod matches;
pub mod possession;
pub mod prior;
pub mod repository;
pub mod statsbomb;
pub mod synthetic;
pub mod types;
pub mod zone;

pub use event::{Event, EventDraft, EventInput, EventPatch, Tags};
pub use event_type::{EventType, UnknownEventType};
pub use matches::{Match, MatchError, MatchSummary, TeamSummary};
pub use possession::PossessionNode;
pub use prior::{EventTypePrior, LabelledEvent, PriorError, StateEventTypePriors};
pub use repository::{InMemoryRepository, MatchRepository, RepositoryError, SharedMatch};
pub use types::{EventId, MatchId, PossessionId, ValidationError};
pub use zone::PitchZone;
