//! Score counting, high score tracking and rank gain
//!
//! A pipe scores once, the first tick its trailing edge is left of the
//! player. The per-pipe `scored` flag makes this independent of scroll speed.

use serde::{Deserialize, Serialize};

use super::state::SessionState;
use crate::consts::PLAYER_X;

/// Mark newly passed pipes and add them to the score; returns how many scored
pub fn score_passed_pipes(state: &mut SessionState) -> u32 {
    let pipe_width = state.viewport.pipe_width();
    let mut passed = 0;
    for pipe in state.pipes.iter_mut().filter(|p| !p.scored) {
        if pipe.x + pipe_width < PLAYER_X {
            pipe.scored = true;
            passed += 1;
        }
    }
    state.score += passed as u64;
    passed
}

/// Per-session score bookkeeping that outlives the tick
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScoreTracker {
    /// Best score on record (updated at session end)
    pub high_score: u64,
    /// Score of the previous session
    pub last_score: u64,
    /// High score as it stood when the current session started
    high_score_at_start: u64,
    /// One-shot flag for the new-high-score event
    beaten: bool,
    /// Leaderboard rank when the session started
    pub initial_rank: Option<usize>,
    /// Positions gained since the session started
    pub rank_gain: Option<usize>,
    /// Latest rank seen from any leaderboard refresh
    pub known_rank: Option<usize>,
}

impl ScoreTracker {
    pub fn new(high_score: u64) -> Self {
        Self {
            high_score,
            high_score_at_start: high_score,
            ..Default::default()
        }
    }

    /// Reset per-session fields at session start
    pub fn begin_session(&mut self) {
        self.high_score_at_start = self.high_score;
        self.beaten = false;
        self.initial_rank = self.known_rank;
        self.rank_gain = None;
    }

    /// Returns true exactly once per session, the first time `score` beats
    /// the high score recorded at session start
    pub fn check_new_high(&mut self, score: u64) -> bool {
        if !self.beaten && score > self.high_score_at_start {
            self.beaten = true;
            return true;
        }
        false
    }

    /// Record the final score; returns true if it is a new high score
    pub fn finish_session(&mut self, score: u64) -> bool {
        self.last_score = score;
        if score > self.high_score {
            self.high_score = score;
            true
        } else {
            false
        }
    }

    /// Apply a fresh rank. Gain is only recomputed while playing; returns the
    /// new gain when it changed. A first reading of zero is recorded without
    /// being reported.
    pub fn observe_rank(&mut self, rank: Option<usize>, playing: bool) -> Option<usize> {
        self.known_rank = rank;
        if !playing {
            return None;
        }
        let (Some(initial), Some(current)) = (self.initial_rank, rank) else {
            return None;
        };
        let gain = initial.saturating_sub(current);
        match self.rank_gain.replace(gain) {
            Some(previous) if previous == gain => None,
            None if gain == 0 => None,
            _ => Some(gain),
        }
    }
}
