use std::f32::consts::PI;

use rand::Rng;

use super::{PlayerProbe, ACTOR_SIZE};
use crate::animation::{Action, AnimationController, ClipSet};
use crate::assets::Sprite;
use crate::events::{push_impact_burst, AudioCue, SpawnEvent};
use crate::math::Vec2;
use crate::physics::Body;
use crate::tilemap::TileMap;

pub const ENEMY_SHOT_SPEED: f32 = 1.5;

const WALK_SPEED: f32 = 0.5;
const WALK_CHANCE: f32 = 0.01;
const WALK_TICKS_MIN: u32 = 30;
const WALK_TICKS_MAX: u32 = 120;
/// Horizontal reach of the ledge probe and the muzzle from the body center.
const REACH: f32 = 7.0;
/// Ledge probe depth below the body's top edge.
const PROBE_DEPTH: f32 = 23.0;
const SIGHT_HEIGHT: f32 = 16.0;
const MUZZLE_SPARKS: usize = 4;
/// Dash countdown magnitude at which the player kills on contact.
const LETHAL_DASH: u32 = 50;
const KILL_SHAKE: f32 = 16.0;
/// Gap between the body center and the near edge of the gun sprite.
const GUN_OFFSET: f32 = 4.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnemyFate {
    Alive,
    Killed,
}

#[derive(Debug, Clone)]
pub struct Enemy {
    pub body: Body,
    /// Remaining ticks of the current patrol walk.
    pub walking: u32,
    animation: AnimationController,
}

impl Enemy {
    pub fn new(pos: Vec2, clips: &ClipSet) -> Self {
        Self {
            body: Body::new(pos, ACTOR_SIZE),
            walking: 0,
            animation: AnimationController::new(clips),
        }
    }

    pub fn current_image(&self) -> &Sprite {
        self.animation.current_image()
    }

    pub fn action(&self) -> Action {
        self.animation.action()
    }

    /// Top-left of the gun sprite, held on the facing side at body height.
    pub fn gun_position(&self, gun_width: u32) -> Vec2 {
        let center = self.body.center();
        let x = if self.body.flip {
            center.x - GUN_OFFSET - gun_width as f32
        } else {
            center.x + GUN_OFFSET
        };
        Vec2::new(x, center.y)
    }

    pub fn advance<R: Rng + ?Sized>(
        &mut self,
        tiles: &TileMap,
        clips: &ClipSet,
        player: &PlayerProbe,
        rng: &mut R,
        events: &mut Vec<SpawnEvent>,
    ) -> EnemyFate {
        let mut movement = Vec2::ZERO;
        if self.walking > 0 {
            let ahead = if self.body.flip { -REACH } else { REACH };
            let probe = Vec2::new(self.body.center().x + ahead, self.body.pos.y + PROBE_DEPTH);
            if tiles.solid_at(probe).is_some() {
                if self.body.collisions.horizontal() {
                    self.body.flip = !self.body.flip;
                } else {
                    movement.x = if self.body.flip { -WALK_SPEED } else { WALK_SPEED };
                }
            } else {
                self.body.flip = !self.body.flip;
            }
            self.walking -= 1;
            if self.walking == 0 {
                self.try_shoot(player, rng, events);
            }
        } else if rng.random::<f32>() < WALK_CHANCE {
            self.walking = rng.random_range(WALK_TICKS_MIN..=WALK_TICKS_MAX);
        }

        self.body.step(tiles, movement);
        self.animation.update();
        let action = if movement.x != 0.0 {
            Action::Run
        } else {
            Action::Idle
        };
        self.animation.set_action(action, clips);

        if player.dash_magnitude >= LETHAL_DASH && self.body.rect().overlaps(&player.rect) {
            let center = self.body.center();
            events.push(SpawnEvent::Shake(KILL_SHAKE));
            events.push(SpawnEvent::Cue(AudioCue::Hit));
            push_impact_burst(center, rng, events);
            for angle in [0.0, PI] {
                events.push(SpawnEvent::Spark {
                    pos: center,
                    angle,
                    speed: 5.0 + rng.random::<f32>(),
                });
            }
            return EnemyFate::Killed;
        }
        EnemyFate::Alive
    }

    fn try_shoot<R: Rng + ?Sized>(
        &self,
        player: &PlayerProbe,
        rng: &mut R,
        events: &mut Vec<SpawnEvent>,
    ) {
        let dx = player.pos.x - self.body.pos.x;
        let dy = player.pos.y - self.body.pos.y;
        if dy.abs() >= SIGHT_HEIGHT {
            return;
        }
        let facing_left = self.body.flip;
        if (facing_left && dx < 0.0) || (!facing_left && dx > 0.0) {
            let direction = if facing_left { -1.0 } else { 1.0 };
            let center = self.body.center();
            let muzzle = Vec2::new(center.x + direction * REACH, center.y);
            let spark_base = if facing_left { PI } else { 0.0 };
            events.push(SpawnEvent::Cue(AudioCue::Shoot));
            events.push(SpawnEvent::Projectile {
                pos: muzzle,
                velocity: direction * ENEMY_SHOT_SPEED,
            });
            for _ in 0..MUZZLE_SPARKS {
                events.push(SpawnEvent::Spark {
                    pos: muzzle,
                    angle: rng.random::<f32>() - 0.5 + spark_base,
                    speed: 2.0 + rng.random::<f32>(),
                });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animation::ActorType;
    use crate::assets::AssetRegistry;
    use crate::math::{GridPos, Rect};
    use crate::tilemap::{Tile, TileKind};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn clips() -> ClipSet {
        ClipSet::resolve(&AssetRegistry::placeholder(), ActorType::Enemy).expect("enemy clips")
    }

    /// Floor along y=10 for x in 0..6.
    fn ledge() -> TileMap {
        let mut map = TileMap::new(16);
        for x in 0..6 {
            map.insert(Tile::new(TileKind::Grass, 0, GridPos::new(x, 10)));
        }
        map
    }

    fn far_player() -> PlayerProbe {
        PlayerProbe {
            pos: Vec2::new(-500.0, -500.0),
            rect: Rect::new(-500.0, -500.0, 8.0, 15.0),
            dash_magnitude: 0,
        }
    }

    #[test]
    fn walks_forward_on_solid_ground() {
        let clips = clips();
        let map = ledge();
        let mut rng = StdRng::seed_from_u64(2);
        let mut events = Vec::new();
        let mut enemy = Enemy::new(Vec2::new(20.0, 145.0), &clips);
        enemy.walking = 10;

        enemy.advance(&map, &clips, &far_player(), &mut rng, &mut events);

        assert_eq!(enemy.body.pos.x, 20.5);
        assert_eq!(enemy.walking, 9);
        assert_eq!(enemy.action(), Action::Run);
    }

    #[test]
    fn turns_around_at_a_ledge() {
        let clips = clips();
        let map = ledge();
        let mut rng = StdRng::seed_from_u64(2);
        let mut events = Vec::new();
        // center x = 90, so the probe at x = 97 is past the last tile
        let mut enemy = Enemy::new(Vec2::new(86.0, 145.0), &clips);
        enemy.walking = 10;

        enemy.advance(&map, &clips, &far_player(), &mut rng, &mut events);

        assert!(enemy.body.flip);
        assert_eq!(enemy.body.pos.x, 86.0);
        assert_eq!(enemy.action(), Action::Idle);
    }

    #[test]
    fn shoots_at_a_player_in_front_when_walk_ends() {
        let clips = clips();
        let map = ledge();
        let mut rng = StdRng::seed_from_u64(2);
        let mut events = Vec::new();
        let mut enemy = Enemy::new(Vec2::new(20.0, 145.0), &clips);
        enemy.walking = 1;
        let player = PlayerProbe {
            pos: Vec2::new(70.0, 140.0),
            rect: Rect::new(70.0, 140.0, 8.0, 15.0),
            dash_magnitude: 0,
        };

        let fate = enemy.advance(&map, &clips, &player, &mut rng, &mut events);

        assert_eq!(fate, EnemyFate::Alive);
        assert_eq!(events[0], SpawnEvent::Cue(AudioCue::Shoot));
        assert_eq!(
            events[1],
            SpawnEvent::Projectile {
                pos: Vec2::new(31.0, 152.5),
                velocity: 1.5
            }
        );
        assert_eq!(events.len(), 2 + 4);
    }

    #[test]
    fn does_not_shoot_behind_or_out_of_sight() {
        let clips = clips();
        let map = ledge();
        let mut rng = StdRng::seed_from_u64(2);
        let mut events = Vec::new();
        for player_pos in [Vec2::new(0.0, 145.0), Vec2::new(70.0, 100.0)] {
            let mut enemy = Enemy::new(Vec2::new(20.0, 145.0), &clips);
            enemy.walking = 1;
            let player = PlayerProbe {
                pos: player_pos,
                rect: Rect::from_pos_size(player_pos, ACTOR_SIZE),
                dash_magnitude: 0,
            };
            enemy.advance(&map, &clips, &player, &mut rng, &mut events);
        }
        assert!(events.is_empty());
    }

    #[test]
    fn dashing_player_kills_on_contact() {
        let clips = clips();
        let map = ledge();
        let mut rng = StdRng::seed_from_u64(2);
        let mut events = Vec::new();
        let mut enemy = Enemy::new(Vec2::new(20.0, 145.0), &clips);
        let mut player = PlayerProbe {
            pos: Vec2::new(24.0, 145.0),
            rect: Rect::new(24.0, 145.0, 8.0, 15.0),
            dash_magnitude: 49,
        };

        assert_eq!(
            enemy.advance(&map, &clips, &player, &mut rng, &mut events),
            EnemyFate::Alive
        );

        player.dash_magnitude = 55;
        events.clear();
        assert_eq!(
            enemy.advance(&map, &clips, &player, &mut rng, &mut events),
            EnemyFate::Killed
        );
        assert!(events.contains(&SpawnEvent::Shake(16.0)));
        assert!(events.contains(&SpawnEvent::Cue(AudioCue::Hit)));
        let sparks = events
            .iter()
            .filter(|e| matches!(e, SpawnEvent::Spark { .. }))
            .count();
        assert_eq!(sparks, 32);
    }

    #[test]
    fn gun_sits_on_the_facing_side() {
        let clips = clips();
        let mut enemy = Enemy::new(Vec2::new(20.0, 145.0), &clips);
        assert_eq!(enemy.gun_position(7), Vec2::new(28.0, 152.5));
        enemy.body.flip = true;
        assert_eq!(enemy.gun_position(7), Vec2::new(13.0, 152.5));
    }
}
