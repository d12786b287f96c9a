//! Game balance and viewport sizing
//!
//! Persisted separately from account data in LocalStorage so balance can be
//! tweaked without a rebuild.

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::TuningError;

/// Canvas dimensions the simulation runs in
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: DESKTOP_WIDTH,
            height: DESKTOP_HEIGHT,
        }
    }
}

impl Viewport {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Pick the canvas size for a browser window (mobile layout below the breakpoint)
    pub fn for_window(window_width: f32, window_height: f32) -> Self {
        if window_width < MOBILE_BREAKPOINT {
            Self::new(window_width - 40.0, window_height - 200.0)
        } else {
            Self::default()
        }
    }

    /// Player sprite size (square)
    pub fn player_size(&self) -> f32 {
        PLAYER_MAX_SIZE.min(self.width * 0.067)
    }

    pub fn pipe_width(&self) -> f32 {
        PIPE_MAX_WIDTH.min(self.width * 0.1)
    }

    /// Vertical opening between the top and bottom pipe
    pub fn pipe_gap(&self) -> f32 {
        PIPE_MAX_GAP.min(self.height * 0.36)
    }

    /// A new pipe spawns once the previous one has scrolled left of this x
    pub fn spawn_distance(&self) -> f32 {
        PIPE_MAX_SPAWN_DISTANCE.min(self.width * 0.5)
    }

    /// Largest y the player may reach before touching the floor
    pub fn floor(&self) -> f32 {
        self.height - self.player_size()
    }
}

/// Data-driven gameplay constants
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    /// Downward acceleration per tick
    pub gravity: f32,
    /// Velocity set by a jump (negative is up)
    pub jump_impulse: f32,
    /// Horizontal pipe/coin movement per tick
    pub scroll_speed: f32,
    /// Chance that a pipe spawn also spawns a coin
    pub coin_chance: f64,
    /// Biome crossfade duration in milliseconds
    pub biome_transition_ms: f64,
    /// Interval between leaderboard refreshes
    pub rank_poll_ms: f64,
    /// Price of any boost, in coins
    pub boost_price: u64,
    /// Spawn RNG seed
    pub seed: u64,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            gravity: 0.4,
            jump_impulse: -6.0,
            scroll_speed: 2.0,
            coin_chance: 0.5,
            biome_transition_ms: 1000.0,
            rank_poll_ms: 5000.0,
            boost_price: 50,
            seed: 0x5eed_f1e5,
        }
    }
}

impl Tuning {
    /// Parse tuning from JSON; missing fields take their defaults
    pub fn from_json(json: &str) -> Result<Self, TuningError> {
        let tuning: Tuning = serde_json::from_str(json)?;
        tuning.validate()?;
        Ok(tuning)
    }

    /// Reject values the simulation cannot run with
    pub fn validate(&self) -> Result<(), TuningError> {
        if self.scroll_speed <= 0.0 {
            return Err(TuningError::Invalid {
                field: "scroll_speed",
                reason: format!("must be positive, got {}", self.scroll_speed),
            });
        }
        if !(0.0..=1.0).contains(&self.coin_chance) {
            return Err(TuningError::Invalid {
                field: "coin_chance",
                reason: format!("must be within [0, 1], got {}", self.coin_chance),
            });
        }
        if self.biome_transition_ms <= 0.0 {
            return Err(TuningError::Invalid {
                field: "biome_transition_ms",
                reason: format!("must be positive, got {}", self.biome_transition_ms),
            });
        }
        if self.jump_impulse >= 0.0 {
            return Err(TuningError::Invalid {
                field: "jump_impulse",
                reason: format!("must point upward (negative), got {}", self.jump_impulse),
            });
        }
        Ok(())
    }

    /// LocalStorage key
    #[allow(dead_code)]
    const STORAGE_KEY: &'static str = "endless_flyer_tuning";

    /// Load tuning from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY) {
                match Self::from_json(&json) {
                    Ok(tuning) => {
                        log::info!("Loaded tuning from LocalStorage");
                        return tuning;
                    }
                    Err(e) => log::warn!("Ignoring stored tuning: {}", e),
                }
            }
        }

        log::info!("Using default tuning");
        Self::default()
    }

    /// Native stub
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_desktop_viewport_sizes() {
        let vp = Viewport::default();
        assert_eq!(vp.player_size(), 40.0);
        assert_eq!(vp.pipe_width(), 60.0);
        assert_eq!(vp.pipe_gap(), 180.0);
        assert_eq!(vp.spawn_distance(), 300.0);
        assert_eq!(vp.floor(), 460.0);
    }

    #[test]
    fn test_mobile_viewport_scales_down() {
        let vp = Viewport::for_window(400.0, 800.0);
        assert_eq!(vp.width, 360.0);
        assert_eq!(vp.height, 600.0);
        assert!(vp.player_size() < PLAYER_MAX_SIZE);
        assert!((vp.pipe_width() - 36.0).abs() < 0.001);
        assert_eq!(vp.spawn_distance(), 180.0);

        // Wide windows keep the desktop canvas
        assert_eq!(Viewport::for_window(1920.0, 1080.0), Viewport::default());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let tuning = Tuning::from_json(r#"{ "gravity": 0.5 }"#).unwrap();
        assert_eq!(tuning.gravity, 0.5);
        assert_eq!(tuning.scroll_speed, 2.0);
        assert_eq!(tuning.boost_price, 50);
    }

    #[test]
    fn test_invalid_tuning_rejected() {
        assert!(matches!(
            Tuning::from_json(r#"{ "coin_chance": 1.5 }"#),
            Err(TuningError::Invalid { field: "coin_chance", .. })
        ));
        assert!(matches!(
            Tuning::from_json(r#"{ "scroll_speed": 0.0 }"#),
            Err(TuningError::Invalid { field: "scroll_speed", .. })
        ));
        assert!(matches!(Tuning::from_json("not json"), Err(TuningError::Parse(_))));
    }
}
