//! Leaderboard snapshots and rank polling
//!
//! The host fetches ranked scores from the persistence collaborator on its
//! own timer and hands each snapshot to the game; the core never waits on it.

use serde::{Deserialize, Serialize};

/// A single leaderboard row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankedScore {
    /// Opaque player identity (wallet address)
    pub identity: String,
    pub score: u64,
}

/// Leaderboard snapshot, sorted by score descending
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Leaderboard {
    pub entries: Vec<RankedScore>,
}

impl Leaderboard {
    /// Build a snapshot, sorting defensively in case the source did not
    pub fn new(mut entries: Vec<RankedScore>) -> Self {
        // Stable sort keeps the source order for ties
        entries.sort_by(|a, b| b.score.cmp(&a.score));
        Self { entries }
    }

    /// 1-indexed rank of an identity, None if it has no entry
    pub fn rank_of(&self, identity: &str) -> Option<usize> {
        self.entries
            .iter()
            .position(|e| e.identity == identity)
            .map(|i| i + 1)
    }
}

/// Decides when the host should fetch a fresh leaderboard
#[derive(Debug, Clone)]
pub struct RankPoller {
    interval_ms: f64,
    last_poll_ms: Option<f64>,
}

impl RankPoller {
    pub fn new(interval_ms: f64) -> Self {
        Self {
            interval_ms,
            last_poll_ms: None,
        }
    }

    /// True (and records the poll) if a refresh is due
    pub fn due(&mut self, now_ms: f64) -> bool {
        let due = self
            .last_poll_ms
            .map(|last| now_ms - last >= self.interval_ms)
            .unwrap_or(true);
        if due {
            self.last_poll_ms = Some(now_ms);
        }
        due
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn board() -> Leaderboard {
        Leaderboard::new(vec![
            RankedScore {
                identity: "carol".into(),
                score: 12,
            },
            RankedScore {
                identity: "alice".into(),
                score: 40,
            },
            RankedScore {
                identity: "bob".into(),
                score: 25,
            },
        ])
    }

    #[test]
    fn test_rank_of() {
        let lb = board();
        assert_eq!(lb.rank_of("alice"), Some(1));
        assert_eq!(lb.rank_of("bob"), Some(2));
        assert_eq!(lb.rank_of("carol"), Some(3));
        assert_eq!(lb.rank_of("dave"), None);
    }

    #[test]
    fn test_poller_interval() {
        let mut poller = RankPoller::new(5000.0);
        assert!(poller.due(0.0));
        assert!(!poller.due(4999.0));
        assert!(poller.due(5000.0));
        assert!(!poller.due(6000.0));
        assert!(poller.due(10_000.0));
    }
}
