//! Fixed-step simulation tick
//!
//! Advances the session world by one frame: physics, spawning, collision,
//! scoring and coin pickups, and last retiring what scrolled off. Biome and progression updates are layered
//! on top by the orchestrator within the same call.

use super::collision;
use super::score::score_passed_pipes;
use super::spawn::{self, SpawnGenerator, SpawnReport};
use super::state::{SessionPhase, SessionState};
use crate::consts::PLAYER_X;
use crate::tuning::Tuning;

/// Input commands for a single tick
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Jump requested since the previous tick
    pub jump: bool,
}

/// What happened during one tick
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TickOutcome {
    pub jumped: bool,
    pub spawn: SpawnReport,
    /// The session ended this tick
    pub collided: bool,
    pub pipes_passed: u32,
    pub coins_collected: u32,
}

/// Advance the session by one tick
pub fn tick(
    state: &mut SessionState,
    spawner: &mut SpawnGenerator,
    tuning: &Tuning,
    input: &TickInput,
) -> TickOutcome {
    let mut outcome = TickOutcome::default();

    // Jumps outside Playing are dropped, as is everything else
    if state.phase != SessionPhase::Playing {
        return outcome;
    }

    state.time_ticks += 1;

    if input.jump {
        state.player.jump(tuning.jump_impulse);
        state.counters.jumps += 1;
        outcome.jumped = true;
    }
    state.player.tick(tuning.gravity);

    outcome.spawn = spawner.step(state, tuning.scroll_speed);

    if collision::check(&state.player, &state.pipes, &state.viewport) {
        state.phase = SessionPhase::Ended;
        outcome.collided = true;
        log::debug!(
            "Collision at tick {} (y = {:.1}, score {})",
            state.time_ticks,
            state.player.y,
            state.score
        );
        return outcome;
    }

    outcome.pipes_passed = score_passed_pipes(state);

    let vp = state.viewport;
    for coin in &mut state.coins {
        if collision::coin_overlaps(&state.player, coin, &vp) {
            coin.collected = true;
            outcome.coins_collected += 1;
        }
    }
    state.counters.coins += outcome.coins_collected;

    // Only after scoring, so a fast pipe still counts on the tick it leaves
    spawn::retire(state);

    outcome
}

/// Demo-mode pilot: jump when falling past the middle of the next gap
pub fn autopilot(state: &SessionState) -> bool {
    let vp = state.viewport;
    let size = vp.player_size();
    let target = state
        .pipes
        .iter()
        .find(|p| p.x + vp.pipe_width() >= PLAYER_X)
        .map(|p| p.gap_top + vp.pipe_gap() / 2.0)
        .unwrap_or(vp.height / 2.0);
    state.player.velocity >= 0.0 && state.player.y + size / 2.0 >= target
}
