//! Deterministic simulation module
//!
//! All per-tick gameplay logic lives here. This module must stay pure and deterministic:
//! - One tick per rendered frame, no real time except the biome crossfade clock
//! - Randomness only through an injected `RandomSource`
//! - No rendering, storage or platform dependencies

pub mod biome;
pub mod collision;
pub mod physics;
pub mod score;
pub mod spawn;
pub mod state;
pub mod tick;

pub use biome::{BIOMES, Biome, BiomeFsm, Transition, biome_for};
pub use collision::{Rect, check, coin_overlaps};
pub use score::{ScoreTracker, score_passed_pipes};
pub use spawn::{RandomSource, ScriptedSource, SpawnGenerator, SpawnReport};
pub use state::{Coin, Pipe, PlayerBody, SessionCounters, SessionPhase, SessionState};
pub use tick::{TickInput, TickOutcome, autopilot, tick};
