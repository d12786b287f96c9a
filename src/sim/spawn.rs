//! Procedural pipe and coin generation
//!
//! Randomness is drawn through [`RandomSource`] so a run can be replayed from
//! a seed, or scripted exactly in tests.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::state::{Coin, Pipe, SessionState};
use crate::consts::*;

/// Source of uniform values in `[0, 1)`
pub trait RandomSource {
    fn next_unit(&mut self) -> f64;
}

impl RandomSource for Pcg32 {
    fn next_unit(&mut self) -> f64 {
        self.random::<f64>()
    }
}

/// Replays a fixed cycle of values (for reproducible scenarios)
#[derive(Debug, Clone)]
pub struct ScriptedSource {
    values: Vec<f64>,
    cursor: usize,
}

impl ScriptedSource {
    /// `values` must be non-empty; each is clamped into `[0, 1)`
    pub fn new(values: Vec<f64>) -> Self {
        assert!(!values.is_empty(), "scripted source needs at least one value");
        let values = values
            .into_iter()
            .map(|v| v.clamp(0.0, 1.0 - f64::EPSILON))
            .collect();
        Self { values, cursor: 0 }
    }
}

impl RandomSource for ScriptedSource {
    fn next_unit(&mut self) -> f64 {
        let v = self.values[self.cursor];
        self.cursor = (self.cursor + 1) % self.values.len();
        v
    }
}

/// What a single spawn step produced
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SpawnReport {
    pub pipe_spawned: bool,
    pub coin_spawned: bool,
}

/// Spawns, scrolls and retires pipes and coins
pub struct SpawnGenerator {
    source: Box<dyn RandomSource>,
    coin_chance: f64,
}

impl SpawnGenerator {
    /// Generator backed by a seeded PCG stream
    pub fn seeded(seed: u64, coin_chance: f64) -> Self {
        Self::with_source(Box::new(Pcg32::seed_from_u64(seed)), coin_chance)
    }

    pub fn with_source(source: Box<dyn RandomSource>, coin_chance: f64) -> Self {
        Self {
            source,
            coin_chance,
        }
    }

    /// Spawn when due, then scroll everything left. Retiring is a separate
    /// step so pipes can score before they are dropped.
    pub fn step(&mut self, state: &mut SessionState, scroll_speed: f32) -> SpawnReport {
        let report = self.maybe_spawn(state);
        advance(state, scroll_speed);
        report
    }

    /// Spawn a pipe at the right edge if none exists or the last one is far enough left
    pub fn maybe_spawn(&mut self, state: &mut SessionState) -> SpawnReport {
        let vp = state.viewport;
        let due = state
            .pipes
            .last()
            .map(|last| last.x < vp.spawn_distance())
            .unwrap_or(true);
        if !due {
            return SpawnReport::default();
        }

        // Gap range keeps a margin above and below so both pipes stay visible
        let gap_range = (vp.height - vp.pipe_gap() - 2.0 * PIPE_GAP_MARGIN).max(0.0);
        let gap_top = self.source.next_unit() as f32 * gap_range + PIPE_GAP_MARGIN;
        let id = state.next_entity_id();
        state.pipes.push(Pipe {
            id,
            x: vp.width,
            gap_top,
            scored: false,
        });
        state.pipes_spawned += 1;
        log::debug!("Spawned pipe {} with gap at {:.1}", id, gap_top);

        let mut report = SpawnReport {
            pipe_spawned: true,
            coin_spawned: false,
        };

        if self.source.next_unit() < self.coin_chance {
            let coin_range = (vp.height - 2.0 * COIN_MARGIN).max(0.0);
            let y = self.source.next_unit() as f32 * coin_range + COIN_MARGIN;
            let id = state.next_entity_id();
            state.coins.push(Coin {
                id,
                pos: Vec2::new(vp.width, y),
                collected: false,
            });
            state.coins_spawned += 1;
            report.coin_spawned = true;
        }

        report
    }
}

/// Scroll pipes and coins left
pub fn advance(state: &mut SessionState, scroll_speed: f32) {
    for pipe in &mut state.pipes {
        pipe.x -= scroll_speed;
    }
    for coin in &mut state.coins {
        coin.pos.x -= scroll_speed;
    }
}

/// Drop pipes and coins fully past the left edge, and collected coins
pub fn retire(state: &mut SessionState) {
    let pipe_width = state.viewport.pipe_width();
    state.pipes.retain(|p| p.x > -pipe_width);
    state.coins.retain(|c| c.pos.x > -COIN_SIZE && !c.collected);
}
