//! Session state and core simulation types
//!
//! Everything a tick reads or writes lives here, owned by the orchestrator.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::tuning::Viewport;

/// Current phase of a play session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SessionPhase {
    /// No session started yet
    #[default]
    Idle,
    /// Active gameplay
    Playing,
    /// Run ended by a collision
    Ended,
}

/// The player's vertical body; horizontal position is fixed
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlayerBody {
    pub y: f32,
    pub velocity: f32,
}

impl PlayerBody {
    /// Player resting at the vertical center of the viewport
    pub fn centered(viewport: &Viewport) -> Self {
        Self {
            y: viewport.height / 2.0,
            velocity: 0.0,
        }
    }
}

/// A pipe pair with a gap
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pipe {
    pub id: u32,
    /// Left edge
    pub x: f32,
    /// Height of the top pipe (top of the gap)
    pub gap_top: f32,
    /// Already counted toward the score
    #[serde(default)]
    pub scored: bool,
}

/// A collectible coin
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Coin {
    pub id: u32,
    /// Top-left corner
    pub pos: Vec2,
    pub collected: bool,
}

/// Per-session counters feeding task progress
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionCounters {
    pub jumps: u32,
    pub seconds_played: u32,
    pub coins: u32,
}

/// Complete session state (deterministic given the spawn source)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionState {
    pub phase: SessionPhase,
    pub viewport: Viewport,
    /// Simulation tick counter
    pub time_ticks: u64,
    /// Wall-clock time the session started (ms)
    pub started_at_ms: f64,
    pub player: PlayerBody,
    /// Active pipes, oldest first
    pub pipes: Vec<Pipe>,
    /// Active coins, oldest first
    pub coins: Vec<Coin>,
    pub score: u64,
    pub counters: SessionCounters,
    /// Spawn totals for this session
    pub pipes_spawned: u32,
    pub coins_spawned: u32,
    /// Next entity ID
    next_id: u32,
}

impl SessionState {
    /// Create an idle state sized for the given viewport
    pub fn new(viewport: Viewport) -> Self {
        Self {
            phase: SessionPhase::Idle,
            viewport,
            time_ticks: 0,
            started_at_ms: 0.0,
            player: PlayerBody::centered(&viewport),
            pipes: Vec::new(),
            coins: Vec::new(),
            score: 0,
            counters: SessionCounters::default(),
            pipes_spawned: 0,
            coins_spawned: 0,
            next_id: 1,
        }
    }

    /// Reset everything session-scoped and enter Playing
    pub fn begin(&mut self, now_ms: f64) {
        *self = Self::new(self.viewport);
        self.phase = SessionPhase::Playing;
        self.started_at_ms = now_ms;
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    pub fn is_playing(&self) -> bool {
        self.phase == SessionPhase::Playing
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_begin_resets_session() {
        let mut state = SessionState::new(Viewport::default());
        state.score = 12;
        state.counters.jumps = 40;
        state.pipes.push(Pipe {
            id: 7,
            x: 10.0,
            gap_top: 100.0,
            scored: true,
        });

        state.begin(1234.0);
        assert_eq!(state.phase, SessionPhase::Playing);
        assert_eq!(state.score, 0);
        assert_eq!(state.counters, SessionCounters::default());
        assert!(state.pipes.is_empty());
        assert_eq!(state.player.y, 250.0);
        assert_eq!(state.started_at_ms, 1234.0);
        assert_eq!(state.next_entity_id(), 1);
    }
}
