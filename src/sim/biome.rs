//! Score-driven biome selection and crossfade timing
//!
//! The biome is a pure function of score; changing it crossfades over a
//! fixed wall-clock duration. Only one crossfade runs at a time, and if the
//! score moved on while one was running the next one chains immediately.

use serde::{Deserialize, Serialize};

/// World themes, in unlock order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Biome {
    Winter,
    Spring,
    Summer,
    NewYork,
    Yellowstone,
}

/// Minimum score for each biome, ascending
pub const BIOMES: [(Biome, u64); 5] = [
    (Biome::Winter, 0),
    (Biome::Spring, 2),
    (Biome::Summer, 4),
    (Biome::NewYork, 6),
    (Biome::Yellowstone, 8),
];

impl Biome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Biome::Winter => "Winter",
            Biome::Spring => "Spring",
            Biome::Summer => "Summer",
            Biome::NewYork => "New York",
            Biome::Yellowstone => "Yellowstone",
        }
    }
}

/// Highest-threshold biome whose minimum score is reached
pub fn biome_for(score: u64) -> Biome {
    BIOMES
        .iter()
        .rev()
        .find(|(_, min)| score >= *min)
        .map(|(b, _)| *b)
        .unwrap_or(Biome::Winter)
}

/// An in-flight crossfade
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transition {
    pub from: Biome,
    pub to: Biome,
    pub started_at_ms: f64,
}

/// Biome state machine: steady, or crossfading toward a new biome
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BiomeFsm {
    steady: Biome,
    transition: Option<Transition>,
    duration_ms: f64,
}

impl BiomeFsm {
    pub fn new(duration_ms: f64) -> Self {
        Self {
            steady: Biome::Winter,
            transition: None,
            duration_ms,
        }
    }

    /// Back to the first biome with no crossfade
    pub fn reset(&mut self) {
        self.steady = Biome::Winter;
        self.transition = None;
    }

    pub fn steady(&self) -> Biome {
        self.steady
    }

    pub fn transition(&self) -> Option<Transition> {
        self.transition
    }

    /// Biome to draw as the base layer (the `from` side while crossfading)
    pub fn current(&self) -> Biome {
        self.transition.map(|t| t.from).unwrap_or(self.steady)
    }

    /// Crossfade progress in [0, 1]; 0 when steady
    pub fn progress(&self, now_ms: f64) -> f32 {
        match self.transition {
            Some(t) => ((now_ms - t.started_at_ms) / self.duration_ms).clamp(0.0, 1.0) as f32,
            None => 0.0,
        }
    }

    /// React to the current score. Returns the transition started this call, if any.
    pub fn update(&mut self, score: u64, now_ms: f64) -> Option<Transition> {
        if let Some(t) = self.transition {
            if now_ms - t.started_at_ms < self.duration_ms {
                return None;
            }
            self.steady = t.to;
            self.transition = None;
            log::debug!("Biome settled on {}", t.to.as_str());
        }

        let target = biome_for(score);
        if target == self.steady {
            return None;
        }
        if target < self.steady {
            // Score went down (new session): snap without a crossfade
            self.steady = target;
            return None;
        }

        let t = Transition {
            from: self.steady,
            to: target,
            started_at_ms: now_ms,
        };
        self.transition = Some(t);
        log::debug!("Biome transition {} -> {}", t.from.as_str(), t.to.as_str());
        Some(t)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_biome_thresholds() {
        assert_eq!(biome_for(0), Biome::Winter);
        assert_eq!(biome_for(1), Biome::Winter);
        assert_eq!(biome_for(2), Biome::Spring);
        assert_eq!(biome_for(5), Biome::Summer);
        assert_eq!(biome_for(8), Biome::Yellowstone);
        assert_eq!(biome_for(10_000), Biome::Yellowstone);
        assert_eq!(biome_for(6), Biome::NewYork);
        assert_eq!(biome_for(7), Biome::NewYork);
    }

    #[test]
    fn test_transition_lifecycle() {
        let mut fsm = BiomeFsm::new(1000.0);
        assert_eq!(fsm.update(1, 0.0), None);

        let t = fsm.update(2, 100.0).unwrap();
        assert_eq!((t.from, t.to), (Biome::Winter, Biome::Spring));
        assert_eq!(fsm.current(), Biome::Winter);
        assert_eq!(fsm.progress(600.0), 0.5);

        // Still crossfading
        assert_eq!(fsm.update(2, 1099.0), None);
        assert!(fsm.transition().is_some());

        // Elapsed: commit, nothing further to chain
        assert_eq!(fsm.update(2, 1100.0), None);
        assert_eq!(fsm.steady(), Biome::Spring);
        assert!(fsm.transition().is_none());
        assert_eq!(fsm.progress(5000.0), 0.0);
    }

    #[test]
    fn test_no_new_transition_while_running() {
        let mut fsm = BiomeFsm::new(1000.0);
        fsm.update(2, 0.0);
        // Score jumps two thresholds mid-fade; target of the running fade is unchanged
        assert_eq!(fsm.update(6, 500.0), None);
        assert_eq!(fsm.transition().unwrap().to, Biome::Spring);
    }

    #[test]
    fn test_chains_when_score_moved_on() {
        let mut fsm = BiomeFsm::new(1000.0);
        fsm.update(2, 0.0);
        let chained = fsm.update(6, 1000.0).unwrap();
        assert_eq!(fsm.steady(), Biome::Spring);
        assert_eq!((chained.from, chained.to), (Biome::Spring, Biome::NewYork));
        assert_eq!(chained.started_at_ms, 1000.0);

        fsm.update(6, 2000.0);
        assert_eq!(fsm.steady(), Biome::NewYork);
        assert!(fsm.transition().is_none());
    }

    #[test]
    fn test_score_drop_snaps() {
        let mut fsm = BiomeFsm::new(1000.0);
        fsm.update(4, 0.0);
        fsm.update(4, 1000.0);
        assert_eq!(fsm.steady(), Biome::Summer);

        assert_eq!(fsm.update(0, 1500.0), None);
        assert_eq!(fsm.steady(), Biome::Winter);
    }

    proptest! {
        #[test]
        fn prop_biome_for_monotonic(a in 0u64..100, b in 0u64..100) {
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            prop_assert!(biome_for(lo) <= biome_for(hi));
            prop_assert_eq!(biome_for(a), biome_for(a));
        }

        #[test]
        fn prop_progress_bounded(start in 0.0f64..1e6, offset in -5000.0f64..5000.0) {
            let mut fsm = BiomeFsm::new(1000.0);
            fsm.update(2, start);
            let p = fsm.progress(start + offset);
            prop_assert!((0.0..=1.0).contains(&p));
            if offset >= 1001.0 {
                prop_assert_eq!(p, 1.0);
            }
            if offset <= -1.0 {
                prop_assert_eq!(p, 0.0);
            }
        }

        #[test]
        fn prop_progress_rises_monotonically(start in 0.0f64..1e6, a in 0.0f64..1000.0, b in 0.0f64..1000.0) {
            let mut fsm = BiomeFsm::new(1000.0);
            fsm.update(2, start);
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            prop_assert!(fsm.progress(start + lo) <= fsm.progress(start + hi));
        }
    }
}
