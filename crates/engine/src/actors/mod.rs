mod enemy;
mod player;

pub use enemy::{Enemy, EnemyFate, ENEMY_SHOT_SPEED};
pub use player::{Player, PlayerState, PlayerStatus, DASH_TICKS, MAX_JUMPS};

use crate::math::{Rect, Vec2};

/// Collision box shared by the player and enemies.
pub const ACTOR_SIZE: Vec2 = Vec2::new(8.0, 15.0);
/// Sprites are drawn this far from the body's top-left corner.
pub const SPRITE_OFFSET: Vec2 = Vec2::new(-3.0, -3.0);

/// Read-only view of the player handed to enemy updates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlayerProbe {
    pub pos: Vec2,
    pub rect: Rect,
    pub dash_magnitude: u32,
}
