//! Browser LocalStorage backend
//!
//! All accounts live in one JSON object under [`LocalStore::STORAGE_KEY`],
//! keyed by identity.

use std::collections::HashMap;

use web_sys::Storage;

use super::{AccountRecord, Persistence};
use crate::boosts::BoostInventory;
use crate::error::PersistenceError;
use crate::leaderboard::RankedScore;
use crate::progression::{Progression, TaskRecord};

type Accounts = HashMap<String, AccountRecord>;

#[derive(Debug, Default)]
pub struct LocalStore;

impl LocalStore {
    pub const STORAGE_KEY: &'static str = "endless_flyer_accounts";

    pub fn new() -> Self {
        Self
    }

    fn storage() -> Result<Storage, PersistenceError> {
        web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten()
            .ok_or_else(|| PersistenceError::Unavailable("LocalStorage not accessible".into()))
    }

    fn load_all() -> Result<Accounts, PersistenceError> {
        let storage = Self::storage()?;
        match storage.get_item(Self::STORAGE_KEY) {
            Ok(Some(json)) => Ok(serde_json::from_str(&json)?),
            Ok(None) => Ok(Accounts::new()),
            Err(_) => Err(PersistenceError::Unavailable("LocalStorage read rejected".into())),
        }
    }

    fn save_all(accounts: &Accounts) -> Result<(), PersistenceError> {
        let storage = Self::storage()?;
        let json = serde_json::to_string(accounts)?;
        storage
            .set_item(Self::STORAGE_KEY, &json)
            .map_err(|_| PersistenceError::Unavailable("LocalStorage write rejected (quota?)".into()))?;
        log::debug!("Accounts saved ({} entries)", accounts.len());
        Ok(())
    }

    fn get<T>(identity: &str, f: impl FnOnce(&AccountRecord) -> T) -> Result<T, PersistenceError> {
        let accounts = Self::load_all()?;
        Ok(match accounts.get(identity) {
            Some(record) => f(record),
            None => f(&AccountRecord::default()),
        })
    }

    fn update(identity: &str, f: impl FnOnce(&mut AccountRecord)) -> Result<(), PersistenceError> {
        let mut accounts = Self::load_all()?;
        f(accounts.entry(identity.to_string()).or_default());
        Self::save_all(&accounts)
    }
}

impl Persistence for LocalStore {
    fn high_score(&self, identity: &str) -> Result<u64, PersistenceError> {
        Self::get(identity, |r| r.high_score)
    }

    fn set_high_score_if_higher(&mut self, identity: &str, score: u64) -> Result<(), PersistenceError> {
        Self::update(identity, |r| r.high_score = r.high_score.max(score))
    }

    fn coins(&self, identity: &str) -> Result<u64, PersistenceError> {
        Self::get(identity, |r| r.coins)
    }

    fn set_coins(&mut self, identity: &str, amount: u64) -> Result<(), PersistenceError> {
        Self::update(identity, |r| r.coins = amount)
    }

    fn progression(&self, identity: &str) -> Result<Progression, PersistenceError> {
        Self::get(identity, |r| r.progression)
    }

    fn set_progression(&mut self, identity: &str, progression: Progression) -> Result<(), PersistenceError> {
        Self::update(identity, |r| r.progression = progression)
    }

    fn boosts(&self, identity: &str) -> Result<BoostInventory, PersistenceError> {
        Self::get(identity, |r| r.boosts.clone())
    }

    fn set_boosts(&mut self, identity: &str, boosts: &BoostInventory) -> Result<(), PersistenceError> {
        Self::update(identity, |r| r.boosts = boosts.clone())
    }

    fn tasks(&self, identity: &str) -> Result<TaskRecord, PersistenceError> {
        Self::get(identity, |r| r.tasks.clone())
    }

    fn set_tasks(&mut self, identity: &str, tasks: &TaskRecord) -> Result<(), PersistenceError> {
        Self::update(identity, |r| r.tasks = tasks.clone())
    }

    fn ranked_scores(&self) -> Result<Vec<RankedScore>, PersistenceError> {
        let mut entries: Vec<RankedScore> = Self::load_all()?
            .into_iter()
            .filter(|(_, r)| r.high_score > 0)
            .map(|(identity, r)| RankedScore {
                identity,
                score: r.high_score,
            })
            .collect();
        entries.sort_by(|a, b| b.score.cmp(&a.score).then_with(|| a.identity.cmp(&b.identity)));
        Ok(entries)
    }
}
