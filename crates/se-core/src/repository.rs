//! Match storage keyed by match id.
//!
//! The core never reaches for a global registry; whatever hosts it (a
//! server, a CLI session, a test) injects a [`MatchRepository`].
//!
//! # Thread Safety
//!
//! Each match is stored behind its own `Arc<Mutex<Match>>`, so writers to
//! one match are serialized while different matches can be edited in
//! parallel. The repository's own index sits behind a separate lock that is
//! only held for the map operation itself.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, PoisonError};

use thiserror::Error;
use uuid::Uuid;

use crate::matches::Match;
use crate::types::{MatchId, ValidationError};

/// A match shared between callers, one lock per match.
pub type SharedMatch = Arc<Mutex<Match>>;

/// Repository errors.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum RepositoryError {
    /// A match is already registered under this id.
    #[error("match '{0}' already exists")]
    AlreadyExists(MatchId),

    /// The generated or supplied id was rejected.
    #[error(transparent)]
    InvalidId(#[from] ValidationError),
}

/// Storage for fully built matches.
pub trait MatchRepository {
    /// Registers a match. Fails without side effects if the id is taken.
    fn insert(&self, id: MatchId, m: Match) -> Result<SharedMatch, RepositoryError>;

    fn get(&self, id: &MatchId) -> Option<SharedMatch>;

    /// Registered ids in sorted order.
    fn ids(&self) -> Vec<MatchId>;

    fn remove(&self, id: &MatchId) -> Option<SharedMatch>;

    /// Registers a match under a fresh random id.
    fn insert_new(&self, m: Match) -> Result<(MatchId, SharedMatch), RepositoryError> {
        let id = MatchId::new(Uuid::new_v4().to_string())?;
        let shared = self.insert(id.clone(), m)?;
        Ok((id, shared))
    }
}

/// Process-local repository.
#[derive(Debug, Default)]
pub struct InMemoryRepository {
    matches: Mutex<BTreeMap<MatchId, SharedMatch>>,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn index(&self) -> std::sync::MutexGuard<'_, BTreeMap<MatchId, SharedMatch>> {
        // The map is never left half-updated, so a poisoned lock is still usable.
        self.matches.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl MatchRepository for InMemoryRepository {
    fn insert(&self, id: MatchId, m: Match) -> Result<SharedMatch, RepositoryError> {
        let mut index = self.index();
        if index.contains_key(&id) {
            return Err(RepositoryError::AlreadyExists(id));
        }
        let shared = Arc::new(Mutex::new(m));
        tracing::debug!(match_id = %id, "registered match");
        index.insert(id, Arc::clone(&shared));
        Ok(shared)
    }

    fn get(&self, id: &MatchId) -> Option<SharedMatch> {
        self.index().get(id).cloned()
    }

    fn ids(&self) -> Vec<MatchId> {
        self.index().keys().cloned().collect()
    }

    fn remove(&self, id: &MatchId) -> Option<SharedMatch> {
        self.index().remove(id)
    }
}
