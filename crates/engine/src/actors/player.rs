use rand::Rng;

use super::{PlayerProbe, ACTOR_SIZE};
use crate::animation::{Action, AnimationController, ClipSet};
use crate::assets::Sprite;
use crate::effects::ParticleKind;
use crate::events::{push_dust_ring, SpawnEvent};
use crate::math::Vec2;
use crate::physics::Body;
use crate::tilemap::TileMap;

pub const MAX_JUMPS: u32 = 2;
pub const DASH_TICKS: i32 = 60;

const JUMP_VELOCITY: f32 = -8.0;
const WALL_JUMP_VELOCITY: Vec2 = Vec2::new(6.0, -6.0);
const WALL_SLIDE_MAX_FALL: f32 = 0.5;
const WALL_SLIDE_AIR_TIME: u32 = 4;
const JUMP_STATE_AIR_TIME: u32 = 1;
const FALL_OUT_AIR_TIME: u32 = 120;
/// Countdown magnitude above which the dash moves the player.
const DASH_ACTIVE_ABOVE: i32 = 50;
const DASH_SPEED: f32 = 10.0;
const DASH_BURST_PARTICLES: usize = 20;
const AIR_DRAG: f32 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerState {
    Idle,
    Running,
    Jumping,
    WallSliding,
}

impl PlayerState {
    pub fn action(self) -> Action {
        match self {
            PlayerState::Idle => Action::Idle,
            PlayerState::Running => Action::Run,
            PlayerState::Jumping => Action::Jump,
            PlayerState::WallSliding => Action::WallSlide,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerStatus {
    Alive,
    /// Airborne long enough that the player must have left the level.
    FellOut,
}

#[derive(Debug, Clone)]
pub struct Player {
    pub body: Body,
    pub air_time: u32,
    pub jumps: u32,
    /// Signed dash countdown; the sign is the dash direction.
    pub dashing: i32,
    state: PlayerState,
    animation: AnimationController,
}

impl Player {
    pub fn new(pos: Vec2, clips: &ClipSet) -> Self {
        Self {
            body: Body::new(pos, ACTOR_SIZE),
            air_time: 0,
            jumps: MAX_JUMPS,
            dashing: 0,
            state: PlayerState::Idle,
            animation: AnimationController::new(clips),
        }
    }

    /// Puts the player back at a spawn point with no momentum.
    pub fn respawn(&mut self, pos: Vec2, clips: &ClipSet) {
        self.body = Body::new(pos, ACTOR_SIZE);
        self.air_time = 0;
        self.jumps = MAX_JUMPS;
        self.dashing = 0;
        self.state = PlayerState::Idle;
        self.animation = AnimationController::new(clips);
    }

    pub fn state(&self) -> PlayerState {
        self.state
    }

    pub fn is_wall_sliding(&self) -> bool {
        self.state == PlayerState::WallSliding
    }

    pub fn dash_magnitude(&self) -> u32 {
        self.dashing.unsigned_abs()
    }

    /// The player is drawn only outside the fast part of a dash.
    pub fn is_visible(&self) -> bool {
        self.dashing.abs() <= DASH_ACTIVE_ABOVE
    }

    pub fn current_image(&self) -> &Sprite {
        self.animation.current_image()
    }

    pub fn probe(&self) -> PlayerProbe {
        PlayerProbe {
            pos: self.body.pos,
            rect: self.body.rect(),
            dash_magnitude: self.dash_magnitude(),
        }
    }

    pub fn advance<R: Rng + ?Sized>(
        &mut self,
        tiles: &TileMap,
        clips: &ClipSet,
        movement: Vec2,
        rng: &mut R,
        events: &mut Vec<SpawnEvent>,
    ) -> PlayerStatus {
        self.body.step(tiles, movement);
        self.animation.update();

        self.air_time += 1;
        let status = if self.air_time > FALL_OUT_AIR_TIME {
            PlayerStatus::FellOut
        } else {
            PlayerStatus::Alive
        };
        if self.body.collisions.down {
            self.air_time = 0;
            self.jumps = MAX_JUMPS;
        }

        let collisions = self.body.collisions;
        self.state = if collisions.horizontal() && self.air_time > WALL_SLIDE_AIR_TIME {
            self.body.velocity.y = self.body.velocity.y.min(WALL_SLIDE_MAX_FALL);
            self.body.flip = collisions.left;
            PlayerState::WallSliding
        } else if self.air_time > JUMP_STATE_AIR_TIME {
            PlayerState::Jumping
        } else if movement.x != 0.0 && !collisions.horizontal() {
            PlayerState::Running
        } else {
            PlayerState::Idle
        };
        self.animation.set_action(self.state.action(), clips);

        if self.air_time > WALL_SLIDE_AIR_TIME && self.jumps == MAX_JUMPS {
            self.jumps -= 1;
        }

        self.advance_dash(rng, events);

        let vx = self.body.velocity.x;
        self.body.velocity.x = if vx > 0.0 {
            (vx - AIR_DRAG).max(0.0)
        } else {
            (vx + AIR_DRAG).min(0.0)
        };

        status
    }

    fn advance_dash<R: Rng + ?Sized>(&mut self, rng: &mut R, events: &mut Vec<SpawnEvent>) {
        let center = self.body.center();
        let magnitude = self.dashing.abs();
        if magnitude == DASH_TICKS || magnitude == DASH_ACTIVE_ABOVE {
            push_dust_ring(center, DASH_BURST_PARTICLES, rng, events);
        }

        self.dashing -= self.dashing.signum();

        if self.dashing.abs() > DASH_ACTIVE_ABOVE {
            let direction = self.dashing.signum() as f32;
            self.body.velocity.x = direction * DASH_SPEED;
            if self.dashing.abs() == DASH_ACTIVE_ABOVE + 1 {
                self.body.velocity.x *= 0.1;
            }
            events.push(SpawnEvent::Particle {
                kind: ParticleKind::Dust,
                pos: center,
                velocity: Vec2::new(direction * rng.random::<f32>() * 3.0, 0.0),
                frame: rng.random_range(0..=7),
            });
        }
    }

    /// Wall jumps push away from the wall when the player is still pressing
    /// into it; otherwise a regular jump is spent.
    pub fn jump(&mut self) -> bool {
        let facing_matches_intent = if self.body.flip {
            self.body.last_movement.x < 0.0
        } else {
            self.body.last_movement.x > 0.0
        };
        if self.is_wall_sliding() && facing_matches_intent {
            let away = if self.body.flip { 1.0 } else { -1.0 };
            self.body.velocity = Vec2::new(away * WALL_JUMP_VELOCITY.x, WALL_JUMP_VELOCITY.y);
            self.air_time = WALL_SLIDE_AIR_TIME + 1;
            self.jumps = self.jumps.saturating_sub(1);
            return true;
        }
        if self.jumps > 0 {
            self.body.velocity.y = JUMP_VELOCITY;
            self.jumps -= 1;
            self.air_time = WALL_SLIDE_AIR_TIME + 1;
            return true;
        }
        false
    }

    /// Starts a dash in the facing direction unless one is already running.
    pub fn dash(&mut self) -> bool {
        if self.dashing != 0 {
            return false;
        }
        self.dashing = if self.body.flip {
            -DASH_TICKS
        } else {
            DASH_TICKS
        };
        true
    }
}
