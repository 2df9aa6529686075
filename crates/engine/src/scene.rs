use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use thiserror::Error;
use tracing::info;

use crate::actors::{Enemy, EnemyFate, Player, PlayerStatus};
use crate::animation::{ActorType, ClipSet};
use crate::assets::{AssetError, AssetRegistry};
use crate::effects::{
    Clouds, Particle, ParticleClips, ParticleKind, Projectile, ProjectileOutcome, Spark,
};
use crate::events::{push_impact_burst, AudioCue, SpawnEvent};
use crate::input::TickInput;
use crate::level::{LevelError, LevelFile};
use crate::math::{Rect, Vec2};
use crate::tilemap::{TileKind, TileMap};

const PLAYER_SPAWNER: (TileKind, u32) = (TileKind::Spawner, 0);
const ENEMY_SPAWNER: (TileKind, u32) = (TileKind::Spawner, 1);
const LEAF_TREE: (TileKind, u32) = (TileKind::LargeDecor, 2);

/// Iris radius is `(TRANSITION_SPAN - |transition|) * 8`; fully closed at the span.
pub const TRANSITION_SPAN: i32 = 30;
const DEATH_IRIS_DELAY: u32 = 10;
const DEATH_RELOAD_AFTER: u32 = 40;
const CAMERA_LAG: f32 = 30.0;
const HIT_SHAKE: f32 = 16.0;
/// The player is safe from projectiles while the dash countdown is at least this.
const DASH_INVULNERABLE: u32 = 50;
const LEAF_AREA_DIVISOR: f32 = 49_999.0;
const LEAF_VELOCITY: Vec2 = Vec2::new(-0.1, 0.3);
const LEAF_MAX_START_FRAME: u32 = 20;

#[derive(Debug, Clone)]
pub struct SceneConfig {
    pub display_width: u32,
    pub display_height: u32,
    pub seed: u64,
    pub cloud_count: usize,
    pub start_level: usize,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            display_width: 320,
            display_height: 240,
            seed: 0,
            cloud_count: 16,
            start_level: 0,
        }
    }
}

#[derive(Debug, Error)]
pub enum SceneError {
    #[error("at least one level is required")]
    NoLevels,
    #[error(transparent)]
    Asset(#[from] AssetError),
    #[error("level {index}: {source}")]
    Level {
        index: usize,
        #[source]
        source: LevelError,
    },
    #[error("level {index} has no player spawner")]
    MissingPlayerSpawn { index: usize },
}

/// What happened during one [`Scene::tick`], for the host to act on.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickReport {
    pub cues: Vec<AudioCue>,
    pub level_loaded: Option<usize>,
    pub player_died: bool,
}

/// Owns the whole simulation: tiles, actors, effect pools and the level
/// progression state machine.
pub struct Scene {
    config: SceneConfig,
    assets: AssetRegistry,
    maps: Vec<TileMap>,
    level: usize,
    tiles: TileMap,
    player_clips: ClipSet,
    enemy_clips: ClipSet,
    particle_clips: ParticleClips,
    player: Player,
    enemies: Vec<Enemy>,
    projectiles: Vec<Projectile>,
    particles: Vec<Particle>,
    sparks: Vec<Spark>,
    clouds: Clouds,
    leaf_spawners: Vec<Rect>,
    rng: StdRng,
    scroll: Vec2,
    screenshake: f32,
    shake_offset: Vec2,
    /// Ticks since the player died; 0 while alive.
    dead: u32,
    /// Negative while the iris opens after a load, positive while it closes.
    transition: i32,
    events: Vec<SpawnEvent>,
}

impl Scene {
    /// Validates every level up front so later level switches cannot fail.
    pub fn new(
        config: SceneConfig,
        levels: Vec<LevelFile>,
        assets: AssetRegistry,
    ) -> Result<Self, SceneError> {
        if levels.is_empty() {
            return Err(SceneError::NoLevels);
        }
        let player_clips = ClipSet::resolve(&assets, ActorType::Player)?;
        let enemy_clips = ClipSet::resolve(&assets, ActorType::Enemy)?;
        let particle_clips = ParticleClips::resolve(&assets)?;

        let mut maps = Vec::with_capacity(levels.len());
        for (index, level) in levels.iter().enumerate() {
            let mut map = level
                .to_tilemap()
                .map_err(|source| SceneError::Level { index, source })?;
            if map.extract(&[PLAYER_SPAWNER], true).is_empty() {
                return Err(SceneError::MissingPlayerSpawn { index });
            }
            maps.push(map);
        }

        let mut rng = StdRng::seed_from_u64(config.seed);
        let clouds = Clouds::new(
            config.cloud_count,
            assets.variants("clouds").len(),
            &mut rng,
        );
        let start = config.start_level.min(maps.len() - 1);
        let player = Player::new(Vec2::ZERO, &player_clips);

        let mut scene = Self {
            config,
            assets,
            maps,
            level: start,
            tiles: TileMap::default(),
            player_clips,
            enemy_clips,
            particle_clips,
            player,
            enemies: Vec::new(),
            projectiles: Vec::new(),
            particles: Vec::new(),
            sparks: Vec::new(),
            clouds,
            leaf_spawners: Vec::new(),
            rng,
            scroll: Vec2::ZERO,
            screenshake: 0.0,
            shake_offset: Vec2::ZERO,
            dead: 0,
            transition: 0,
            events: Vec::new(),
        };
        scene.load_level(start);
        Ok(scene)
    }

    /// Replaces the live level. Indices past the end load the last level.
    pub fn load_level(&mut self, index: usize) {
        let index = index.min(self.maps.len() - 1);
        self.level = index;
        self.tiles = self.maps[index].clone();

        self.leaf_spawners = self
            .tiles
            .extract(&[LEAF_TREE], true)
            .into_iter()
            .map(|tree| Rect::new(tree.pos.x + 4.0, tree.pos.y + 4.0, 23.0, 13.0))
            .collect();

        self.enemies.clear();
        for spawner in self.tiles.extract(&[PLAYER_SPAWNER, ENEMY_SPAWNER], false) {
            if spawner.variant == PLAYER_SPAWNER.1 {
                self.player.respawn(spawner.pos, &self.player_clips);
            } else {
                self.enemies.push(Enemy::new(spawner.pos, &self.enemy_clips));
            }
        }

        self.projectiles.clear();
        self.particles.clear();
        self.sparks.clear();
        self.events.clear();
        self.scroll = Vec2::ZERO;
        self.dead = 0;
        self.transition = -TRANSITION_SPAN;

        info!(
            level = index,
            enemies = self.enemies.len(),
            leaf_emitters = self.leaf_spawners.len(),
            "level_loaded"
        );
    }

    pub fn tick(&mut self, input: &TickInput) -> TickReport {
        let mut report = TickReport::default();

        if self.dead == 0 {
            if input.jump && self.player.jump() {
                report.cues.push(AudioCue::Jump);
            }
            if input.dash && self.player.dash() {
                report.cues.push(AudioCue::Dash);
            }
        }

        self.screenshake = (self.screenshake - 1.0).max(0.0);
        self.advance_transitions(&mut report);

        let center = self.player.body.center();
        self.scroll.x +=
            (center.x - self.config.display_width as f32 / 2.0 - self.scroll.x) / CAMERA_LAG;
        self.scroll.y +=
            (center.y - self.config.display_height as f32 / 2.0 - self.scroll.y) / CAMERA_LAG;

        self.emit_leaves();
        self.clouds.update();

        let probe = self.player.probe();
        let mut killed = 0;
        self.enemies.retain_mut(|enemy| {
            let fate = enemy.advance(
                &self.tiles,
                &self.enemy_clips,
                &probe,
                &mut self.rng,
                &mut self.events,
            );
            if fate == EnemyFate::Killed {
                killed += 1;
            }
            fate == EnemyFate::Alive
        });
        if killed > 0 {
            info!(
                level = self.level,
                killed,
                remaining = self.enemies.len(),
                "enemy_killed"
            );
        }
        self.drain_events(&mut report);

        if self.dead == 0 {
            let status = self.player.advance(
                &self.tiles,
                &self.player_clips,
                input.movement,
                &mut self.rng,
                &mut self.events,
            );
            if status == PlayerStatus::FellOut {
                self.kill_player("fell_out", &mut report);
            }
        }
        self.drain_events(&mut report);

        self.advance_projectiles(&mut report);
        self.drain_events(&mut report);

        self.sparks.retain_mut(|spark| !spark.update());
        self.particles.retain_mut(|particle| !particle.update());

        let shake = self.screenshake;
        self.shake_offset = Vec2::new(
            self.rng.random::<f32>() * shake - shake / 2.0,
            self.rng.random::<f32>() * shake - shake / 2.0,
        );

        report
    }

    fn advance_transitions(&mut self, report: &mut TickReport) {
        if self.enemies.is_empty() {
            self.transition += 1;
            if self.transition > TRANSITION_SPAN {
                let next = (self.level + 1).min(self.maps.len() - 1);
                info!(level = self.level, next, "level_cleared");
                self.load_level(next);
                report.level_loaded = Some(next);
            }
        }
        if self.transition < 0 {
            self.transition += 1;
        }
        if self.dead > 0 {
            self.dead += 1;
            if self.dead >= DEATH_IRIS_DELAY {
                self.transition = (self.transition + 1).min(TRANSITION_SPAN);
            }
            if self.dead > DEATH_RELOAD_AFTER {
                self.load_level(self.level);
                report.level_loaded = Some(self.level);
            }
        }
    }

    fn emit_leaves(&mut self) {
        for rect in &self.leaf_spawners {
            if self.rng.random::<f32>() * LEAF_AREA_DIVISOR < rect.w * rect.h {
                let pos = Vec2::new(
                    rect.x + self.rng.random::<f32>() * rect.w,
                    rect.y + self.rng.random::<f32>() * rect.h,
                );
                let frame = self.rng.random_range(0..=LEAF_MAX_START_FRAME);
                self.particles.push(Particle::spawn(
                    &self.particle_clips,
                    ParticleKind::Leaf,
                    pos,
                    LEAF_VELOCITY,
                    frame,
                ));
            }
        }
    }

    fn advance_projectiles(&mut self, report: &mut TickReport) {
        let mut vulnerable =
            self.dead == 0 && self.player.dash_magnitude() < DASH_INVULNERABLE;
        let player_rect = self.player.body.rect();
        let mut player_hit = false;
        self.projectiles.retain_mut(|projectile| {
            let target = vulnerable.then_some(player_rect);
            match projectile.update(&self.tiles, target, &mut self.rng, &mut self.events) {
                ProjectileOutcome::Flying => true,
                ProjectileOutcome::HitPlayer => {
                    vulnerable = false;
                    player_hit = true;
                    false
                }
                ProjectileOutcome::HitWall | ProjectileOutcome::Expired => false,
            }
        });
        if player_hit {
            push_impact_burst(self.player.body.center(), &mut self.rng, &mut self.events);
            self.events.push(SpawnEvent::Cue(AudioCue::Hit));
            self.kill_player("projectile", report);
        }
    }

    fn kill_player(&mut self, cause: &'static str, report: &mut TickReport) {
        if self.dead == 0 {
            self.screenshake = self.screenshake.max(HIT_SHAKE);
            report.player_died = true;
            info!(level = self.level, cause, "player_died");
        }
        self.dead += 1;
    }

    fn drain_events(&mut self, report: &mut TickReport) {
        let mut events = std::mem::take(&mut self.events);
        for event in events.drain(..) {
            match event {
                SpawnEvent::Particle {
                    kind,
                    pos,
                    velocity,
                    frame,
                } => self.particles.push(Particle::spawn(
                    &self.particle_clips,
                    kind,
                    pos,
                    velocity,
                    frame,
                )),
                SpawnEvent::Spark { pos, angle, speed } => {
                    self.sparks.push(Spark::new(pos, angle, speed))
                }
                SpawnEvent::Projectile { pos, velocity } => {
                    self.projectiles.push(Projectile::new(pos, velocity))
                }
                SpawnEvent::Shake(amount) => self.screenshake = self.screenshake.max(amount),
                SpawnEvent::Cue(cue) => report.cues.push(cue),
            }
        }
        self.events = events;
    }

    pub fn config(&self) -> &SceneConfig {
        &self.config
    }

    pub fn assets(&self) -> &AssetRegistry {
        &self.assets
    }

    pub fn level_index(&self) -> usize {
        self.level
    }

    pub fn level_count(&self) -> usize {
        self.maps.len()
    }

    pub fn tiles(&self) -> &TileMap {
        &self.tiles
    }

    pub fn player(&self) -> &Player {
        &self.player
    }

    pub fn is_player_dead(&self) -> bool {
        self.dead > 0
    }

    pub fn enemies(&self) -> &[Enemy] {
        &self.enemies
    }

    pub fn projectiles(&self) -> &[Projectile] {
        &self.projectiles
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn sparks(&self) -> &[Spark] {
        &self.sparks
    }

    pub fn clouds(&self) -> &Clouds {
        &self.clouds
    }

    pub fn leaf_spawners(&self) -> &[Rect] {
        &self.leaf_spawners
    }

    pub fn scroll(&self) -> Vec2 {
        self.scroll
    }

    /// Camera offset snapped to whole pixels.
    pub fn render_scroll(&self) -> Vec2 {
        Vec2::new(self.scroll.x.trunc(), self.scroll.y.trunc())
    }

    pub fn screenshake(&self) -> f32 {
        self.screenshake
    }

    pub fn shake_offset(&self) -> Vec2 {
        self.shake_offset
    }

    pub fn transition(&self) -> i32 {
        self.transition
    }
}
