//! Purchasable boosts
//!
//! A boost is bought with coins, activated before a run, and consumed when
//! that run ends. Buying it again is the only way to reuse it.

use std::collections::BTreeSet;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::UnknownBoost;

/// Boost types
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BoostKind {
    Speed,
    Shield,
}

impl BoostKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            BoostKind::Speed => "speed",
            BoostKind::Shield => "shield",
        }
    }
}

impl FromStr for BoostKind {
    type Err = UnknownBoost;

    /// Case-insensitive
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "speed" => Ok(BoostKind::Speed),
            "shield" => Ok(BoostKind::Shield),
            _ => Err(UnknownBoost(s.to_string())),
        }
    }
}

/// Owned boosts and the one armed for the next run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoostInventory {
    pub owned: BTreeSet<BoostKind>,
    pub active: Option<BoostKind>,
}

impl BoostInventory {
    /// Buy a boost. Leaves everything untouched and returns false if `coins`
    /// cannot cover `price`; otherwise deducts it and adds the kind to the
    /// owned set (owning it twice is still owning it once).
    pub fn purchase(&mut self, kind: BoostKind, coins: &mut u64, price: u64) -> bool {
        if *coins < price {
            log::debug!("Cannot afford {} boost ({} < {})", kind.as_str(), coins, price);
            return false;
        }
        *coins -= price;
        self.owned.insert(kind);
        log::info!("Purchased {} boost, {} coins left", kind.as_str(), coins);
        true
    }

    /// Arm an owned boost; returns false if it is not owned
    pub fn activate(&mut self, kind: BoostKind) -> bool {
        if !self.owned.contains(&kind) {
            log::warn!("Tried to activate unowned {} boost", kind.as_str());
            return false;
        }
        self.active = Some(kind);
        true
    }

    pub fn deactivate(&mut self) {
        self.active = None;
    }

    /// Spend the active boost at the end of a run
    pub fn consume_active(&mut self) -> Option<BoostKind> {
        let kind = self.active.take()?;
        self.owned.remove(&kind);
        log::info!("Consumed {} boost", kind.as_str());
        Some(kind)
    }

    /// Invariant: the active boost is always owned
    pub fn is_consistent(&self) -> bool {
        self.active.is_none_or(|k| self.owned.contains(&k))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_purchase_insufficient_coins() {
        let mut inv = BoostInventory::default();
        let mut coins = 40;
        assert!(!inv.purchase(BoostKind::Speed, &mut coins, 50));
        assert_eq!(coins, 40);
        assert!(inv.owned.is_empty());
    }

    #[test]
    fn test_purchase_deducts_and_owns() {
        let mut inv = BoostInventory::default();
        let mut coins = 60;
        assert!(inv.purchase(BoostKind::Speed, &mut coins, 50));
        assert_eq!(coins, 10);
        assert!(inv.owned.contains(&BoostKind::Speed));
    }

    #[test]
    fn test_purchase_is_idempotent_on_ownership() {
        let mut inv = BoostInventory::default();
        let mut coins = 100;
        inv.purchase(BoostKind::Shield, &mut coins, 50);
        inv.purchase(BoostKind::Shield, &mut coins, 50);
        assert_eq!(coins, 0);
        assert_eq!(inv.owned.len(), 1);
    }

    #[test]
    fn test_activate_requires_ownership() {
        let mut inv = BoostInventory::default();
        assert!(!inv.activate(BoostKind::Shield));
        assert_eq!(inv.active, None);

        inv.owned.insert(BoostKind::Shield);
        assert!(inv.activate(BoostKind::Shield));
        assert_eq!(inv.active, Some(BoostKind::Shield));

        inv.deactivate();
        assert_eq!(inv.active, None);
        assert!(inv.owned.contains(&BoostKind::Shield));
    }

    #[test]
    fn test_consume_removes_active_only() {
        let mut inv = BoostInventory::default();
        inv.owned.insert(BoostKind::Speed);
        inv.owned.insert(BoostKind::Shield);
        inv.activate(BoostKind::Speed);

        assert_eq!(inv.consume_active(), Some(BoostKind::Speed));
        assert_eq!(inv.active, None);
        assert!(!inv.owned.contains(&BoostKind::Speed));
        assert!(inv.owned.contains(&BoostKind::Shield));
        assert!(inv.is_consistent());

        assert_eq!(inv.consume_active(), None);
    }

    #[test]
    fn test_serialized_names() {
        let json = serde_json::to_string(&BoostKind::Shield).unwrap();
        assert_eq!(json, "\"shield\"");
        assert_eq!("SPEED".parse::<BoostKind>(), Ok(BoostKind::Speed));
        assert_eq!("Shield".parse::<BoostKind>(), Ok(BoostKind::Shield));
        let err = "turbo".parse::<BoostKind>().unwrap_err();
        assert_eq!(err, UnknownBoost("turbo".into()));
        assert_eq!(err.to_string(), "Unknown boost kind `turbo`");
    }
}
