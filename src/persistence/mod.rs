//! Account persistence
//!
//! The hosted database sits behind [`Persistence`]. The game talks to it
//! through [`Store`], which skips calls without an identity and logs and
//! swallows every failure: storage problems never stop a run.
//!
//! Implementations:
//! - `MemoryStore`: in-process map, used natively and in tests
//! - `LocalStore`: browser LocalStorage (wasm only)

pub mod memory;
#[cfg(target_arch = "wasm32")]
pub mod local;

use serde::{Deserialize, Serialize};

pub use memory::MemoryStore;
#[cfg(target_arch = "wasm32")]
pub use local::LocalStore;

use crate::boosts::BoostInventory;
use crate::error::PersistenceError;
use crate::leaderboard::RankedScore;
use crate::progression::{Progression, TaskRecord};

/// Everything stored for one identity
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AccountRecord {
    pub high_score: u64,
    pub coins: u64,
    pub progression: Progression,
    pub boosts: BoostInventory,
    pub tasks: TaskRecord,
}

/// Remote storage for scores, currency and progression.
///
/// Implementations must return promptly; a network-backed store issues its
/// request and reports only local failures. Unknown identities read as
/// defaults.
pub trait Persistence {
    fn high_score(&self, identity: &str) -> Result<u64, PersistenceError>;
    fn set_high_score_if_higher(&mut self, identity: &str, score: u64) -> Result<(), PersistenceError>;

    fn coins(&self, identity: &str) -> Result<u64, PersistenceError>;
    fn set_coins(&mut self, identity: &str, amount: u64) -> Result<(), PersistenceError>;

    fn progression(&self, identity: &str) -> Result<Progression, PersistenceError>;
    fn set_progression(&mut self, identity: &str, progression: Progression) -> Result<(), PersistenceError>;

    fn boosts(&self, identity: &str) -> Result<BoostInventory, PersistenceError>;
    fn set_boosts(&mut self, identity: &str, boosts: &BoostInventory) -> Result<(), PersistenceError>;

    fn tasks(&self, identity: &str) -> Result<TaskRecord, PersistenceError>;
    fn set_tasks(&mut self, identity: &str, tasks: &TaskRecord) -> Result<(), PersistenceError>;

    /// All (identity, score) pairs, best first
    fn ranked_scores(&self) -> Result<Vec<RankedScore>, PersistenceError>;
}

/// Identity-bound, failure-tolerant front for a [`Persistence`] backend
pub struct Store {
    backend: Box<dyn Persistence>,
    identity: Option<String>,
}

impl Store {
    pub fn new(backend: Box<dyn Persistence>, identity: Option<String>) -> Self {
        Self { backend, identity }
    }

    pub fn identity(&self) -> Option<&str> {
        self.identity.as_deref()
    }

    /// Read a value, falling back on missing identity or failure
    pub fn read<T>(
        &self,
        what: &str,
        fallback: T,
        op: impl FnOnce(&dyn Persistence, &str) -> Result<T, PersistenceError>,
    ) -> T {
        let Some(identity) = self.identity.as_deref() else {
            log::debug!("No identity, skipping {} read", what);
            return fallback;
        };
        match op(self.backend.as_ref(), identity) {
            Ok(value) => value,
            Err(e) => {
                log::warn!("Failed to load {}: {}", what, e);
                fallback
            }
        }
    }

    /// Issue a write and forget it; failures are logged and dropped
    pub fn write(
        &mut self,
        what: &str,
        op: impl FnOnce(&mut dyn Persistence, &str) -> Result<(), PersistenceError>,
    ) {
        let Some(identity) = self.identity.as_deref() else {
            log::debug!("No identity, skipping {} write", what);
            return;
        };
        if let Err(e) = op(self.backend.as_mut(), identity) {
            log::warn!("Failed to save {}: {}", what, e);
        }
    }

    /// Load the full account, field by field, defaulting whatever fails
    pub fn load_account(&self) -> AccountRecord {
        AccountRecord {
            high_score: self.read("high score", 0, |p, id| p.high_score(id)),
            coins: self.read("coins", 0, |p, id| p.coins(id)),
            progression: self.read("progression", Progression::default(), |p, id| p.progression(id)),
            boosts: self.read("boosts", BoostInventory::default(), |p, id| p.boosts(id)),
            tasks: self.read("tasks", TaskRecord::default(), |p, id| p.tasks(id)),
        }
    }

    /// Fetch the leaderboard (does not need an identity)
    pub fn ranked_scores(&self) -> Option<Vec<RankedScore>> {
        match self.backend.ranked_scores() {
            Ok(scores) => Some(scores),
            Err(e) => {
                log::warn!("Failed to fetch leaderboard: {}", e);
                None
            }
        }
    }
}
