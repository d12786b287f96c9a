//! Collision detection for the player
//!
//! Everything is an axis-aligned rectangle: the player hitbox, the two
//! halves of each pipe, and coins.

use super::state::{Coin, Pipe, PlayerBody};
use crate::consts::{COIN_SIZE, PLAYER_X};
use crate::tuning::Viewport;

/// Axis-aligned rectangle (min inclusive, max exclusive for overlap tests)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub left: f32,
    pub right: f32,
    pub top: f32,
    pub bottom: f32,
}

impl Rect {
    pub fn new(left: f32, top: f32, width: f32, height: f32) -> Self {
        Self {
            left,
            right: left + width,
            top,
            bottom: top + height,
        }
    }

    /// Strict overlap; touching edges do not count
    pub fn overlaps(&self, other: &Rect) -> bool {
        self.right > other.left
            && self.left < other.right
            && self.bottom > other.top
            && self.top < other.bottom
    }
}

/// Player hitbox at its fixed horizontal position
pub fn player_rect(player: &PlayerBody, viewport: &Viewport) -> Rect {
    let size = viewport.player_size();
    Rect::new(PLAYER_X, player.y, size, size)
}

/// Top and bottom rectangles of a pipe
pub fn pipe_rects(pipe: &Pipe, viewport: &Viewport) -> (Rect, Rect) {
    let width = viewport.pipe_width();
    let bottom_top = pipe.gap_top + viewport.pipe_gap();
    (
        Rect::new(pipe.x, 0.0, width, pipe.gap_top),
        Rect::new(pipe.x, bottom_top, width, viewport.height - bottom_top),
    )
}

/// True if the player is out of bounds or touches any pipe
pub fn check(player: &PlayerBody, pipes: &[Pipe], viewport: &Viewport) -> bool {
    if player.y <= 0.0 || player.y >= viewport.floor() {
        return true;
    }

    let hitbox = player_rect(player, viewport);
    pipes.iter().any(|pipe| {
        let (top, bottom) = pipe_rects(pipe, viewport);
        hitbox.overlaps(&top) || hitbox.overlaps(&bottom)
    })
}

/// True if the player overlaps an uncollected coin
pub fn coin_overlaps(player: &PlayerBody, coin: &Coin, viewport: &Viewport) -> bool {
    if coin.collected {
        return false;
    }
    let coin_rect = Rect::new(coin.pos.x, coin.pos.y, COIN_SIZE, COIN_SIZE);
    player_rect(player, viewport).overlaps(&coin_rect)
}
