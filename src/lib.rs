//! Endless Flyer - simulation and progression core for a browser flyer game
//!
//! Core modules:
//! - `sim`: Deterministic simulation (physics, spawning, collisions, biomes, scoring)
//! - `game`: Session orchestrator and render snapshot
//! - `progression`: Task catalog, XP and levels
//! - `boosts`: Purchasable one-session modifiers
//! - `leaderboard`: Ranked score snapshots and rank polling
//! - `persistence`: Storage collaborator and its local implementations
//! - `platform`: Clocks and the browser frame loop
//! - `tuning`: Data-driven game balance and viewport sizing

pub mod boosts;
pub mod error;
pub mod game;
pub mod leaderboard;
pub mod persistence;
pub mod platform;
pub mod progression;
pub mod sim;
pub mod tuning;

pub use boosts::{BoostInventory, BoostKind};
pub use error::{PersistenceError, TuningError, UnknownBoost};
pub use game::{Game, GameEvent, Snapshot};
pub use leaderboard::{Leaderboard, RankPoller, RankedScore};
pub use tuning::{Tuning, Viewport};

/// Game configuration constants
pub mod consts {
    /// Horizontal position of the player's left edge
    pub const PLAYER_X: f32 = 100.0;
    /// Upper bound on the player sprite size
    pub const PLAYER_MAX_SIZE: f32 = 40.0;

    /// Pipe defaults (upper bounds, scaled down on small viewports)
    pub const PIPE_MAX_WIDTH: f32 = 60.0;
    pub const PIPE_MAX_GAP: f32 = 180.0;
    pub const PIPE_MAX_SPAWN_DISTANCE: f32 = 300.0;
    /// Vertical margin kept free above and below the gap range
    pub const PIPE_GAP_MARGIN: f32 = 50.0;

    /// Coin sprite size (square)
    pub const COIN_SIZE: f32 = 30.0;
    /// Vertical margin for coin placement
    pub const COIN_MARGIN: f32 = 40.0;

    /// XP needed for one level
    pub const XP_PER_LEVEL: u32 = 200;
    /// Number of simultaneously active tasks
    pub const ACTIVE_TASK_SLOTS: usize = 3;

    /// Desktop canvas size
    pub const DESKTOP_WIDTH: f32 = 600.0;
    pub const DESKTOP_HEIGHT: f32 = 500.0;
    /// Windows narrower than this use the mobile layout
    pub const MOBILE_BREAKPOINT: f32 = 768.0;
}
