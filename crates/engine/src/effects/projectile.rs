use std::f32::consts::PI;

use rand::Rng;

use crate::events::SpawnEvent;
use crate::math::{Rect, Vec2};
use crate::tilemap::TileMap;

pub const PROJECTILE_LIFETIME: u32 = 360;
const WALL_SPARKS: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectileOutcome {
    Flying,
    HitWall,
    Expired,
    HitPlayer,
}

impl ProjectileOutcome {
    pub fn is_finished(self) -> bool {
        self != ProjectileOutcome::Flying
    }
}

/// Horizontal enemy bullet.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projectile {
    pub pos: Vec2,
    pub velocity: f32,
    pub timer: u32,
}

impl Projectile {
    pub fn new(pos: Vec2, velocity: f32) -> Self {
        Self {
            pos,
            velocity,
            timer: 0,
        }
    }

    /// `target` is the player rect when the player can currently be hurt.
    pub fn update<R: Rng + ?Sized>(
        &mut self,
        tiles: &TileMap,
        target: Option<Rect>,
        rng: &mut R,
        events: &mut Vec<SpawnEvent>,
    ) -> ProjectileOutcome {
        self.pos.x += self.velocity;
        self.timer += 1;

        if tiles.solid_at(self.pos).is_some() {
            let base = if self.velocity > 0.0 { PI } else { 0.0 };
            for _ in 0..WALL_SPARKS {
                events.push(SpawnEvent::Spark {
                    pos: self.pos,
                    angle: rng.random::<f32>() - 0.5 + base,
                    speed: 2.0 + rng.random::<f32>(),
                });
            }
            return ProjectileOutcome::HitWall;
        }
        if self.timer > PROJECTILE_LIFETIME {
            return ProjectileOutcome::Expired;
        }
        if target.is_some_and(|rect| rect.contains_point(self.pos)) {
            return ProjectileOutcome::HitPlayer;
        }
        ProjectileOutcome::Flying
    }
}
