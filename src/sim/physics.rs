//! Vertical player physics

use super::state::PlayerBody;

impl PlayerBody {
    /// Advance one tick: gravity into velocity, then velocity into position.
    ///
    /// Position is never clamped; leaving the viewport is a collision.
    pub fn tick(&mut self, gravity: f32) {
        self.velocity += gravity;
        self.y += self.velocity;
    }

    /// Replace the current velocity with the jump impulse
    pub fn jump(&mut self, impulse: f32) {
        self.velocity = impulse;
    }
}
