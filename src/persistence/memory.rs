//! In-process account store
//!
//! Clones share the same records, so a test can keep a handle for
//! inspection (and failure injection) after handing one to the game.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

use super::{AccountRecord, Persistence};
use crate::boosts::BoostInventory;
use crate::error::PersistenceError;
use crate::leaderboard::RankedScore;
use crate::progression::{Progression, TaskRecord};

#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    records: Rc<RefCell<HashMap<String, AccountRecord>>>,
    failing: Rc<Cell<bool>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every call fail with `Unavailable` until switched back
    pub fn set_failing(&self, failing: bool) {
        self.failing.set(failing);
    }

    /// Seed or overwrite a record directly
    pub fn insert(&self, identity: &str, record: AccountRecord) {
        self.records.borrow_mut().insert(identity.to_string(), record);
    }

    /// Copy of the record for an identity, if one was ever written
    pub fn record(&self, identity: &str) -> Option<AccountRecord> {
        self.records.borrow().get(identity).cloned()
    }

    /// Copy of all records
    pub fn snapshot(&self) -> HashMap<String, AccountRecord> {
        self.records.borrow().clone()
    }

    fn check(&self) -> Result<(), PersistenceError> {
        if self.failing.get() {
            return Err(PersistenceError::Unavailable("memory store set to fail".into()));
        }
        Ok(())
    }

    fn get<T>(&self, identity: &str, f: impl FnOnce(&AccountRecord) -> T) -> Result<T, PersistenceError> {
        self.check()?;
        let records = self.records.borrow();
        Ok(match records.get(identity) {
            Some(record) => f(record),
            None => f(&AccountRecord::default()),
        })
    }

    fn update(&mut self, identity: &str, f: impl FnOnce(&mut AccountRecord)) -> Result<(), PersistenceError> {
        self.check()?;
        let mut records = self.records.borrow_mut();
        f(records.entry(identity.to_string()).or_default());
        Ok(())
    }
}

impl Persistence for MemoryStore {
    fn high_score(&self, identity: &str) -> Result<u64, PersistenceError> {
        self.get(identity, |r| r.high_score)
    }

    fn set_high_score_if_higher(&mut self, identity: &str, score: u64) -> Result<(), PersistenceError> {
        self.update(identity, |r| r.high_score = r.high_score.max(score))
    }

    fn coins(&self, identity: &str) -> Result<u64, PersistenceError> {
        self.get(identity, |r| r.coins)
    }

    fn set_coins(&mut self, identity: &str, amount: u64) -> Result<(), PersistenceError> {
        self.update(identity, |r| r.coins = amount)
    }

    fn progression(&self, identity: &str) -> Result<Progression, PersistenceError> {
        self.get(identity, |r| r.progression)
    }

    fn set_progression(&mut self, identity: &str, progression: Progression) -> Result<(), PersistenceError> {
        self.update(identity, |r| r.progression = progression)
    }

    fn boosts(&self, identity: &str) -> Result<BoostInventory, PersistenceError> {
        self.get(identity, |r| r.boosts.clone())
    }

    fn set_boosts(&mut self, identity: &str, boosts: &BoostInventory) -> Result<(), PersistenceError> {
        self.update(identity, |r| r.boosts = boosts.clone())
    }

    fn tasks(&self, identity: &str) -> Result<TaskRecord, PersistenceError> {
        self.get(identity, |r| r.tasks.clone())
    }

    fn set_tasks(&mut self, identity: &str, tasks: &TaskRecord) -> Result<(), PersistenceError> {
        self.update(identity, |r| r.tasks = tasks.clone())
    }

    fn ranked_scores(&self) -> Result<Vec<RankedScore>, PersistenceError> {
        self.check()?;
        let mut entries: Vec<RankedScore> = self
            .records
            .borrow()
            .iter()
            .filter(|(_, r)| r.high_score > 0)
            .map(|(identity, r)| RankedScore {
                identity: identity.clone(),
                score: r.high_score,
            })
            .collect();
        // HashMap order is arbitrary; break ties by identity so ranks are stable
        entries.sort_by(|a, b| b.score.cmp(&a.score).then_with(|| a.identity.cmp(&b.identity)));
        Ok(entries)
    }
}
