use std::f32::consts::{PI, TAU};

use rand::Rng;

use crate::effects::ParticleKind;
use crate::math::Vec2;

/// Sound requests surfaced to the host; the core never plays audio itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AudioCue {
    Jump,
    Dash,
    Shoot,
    Hit,
}

/// Side effects requested by actor and effect updates. The scene drains these
/// into its pools after each update phase.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SpawnEvent {
    Particle {
        kind: ParticleKind,
        pos: Vec2,
        velocity: Vec2,
        frame: u32,
    },
    Spark {
        pos: Vec2,
        angle: f32,
        speed: f32,
    },
    /// Horizontal bullet; `velocity` is signed px/tick.
    Projectile {
        pos: Vec2,
        velocity: f32,
    },
    /// Raises screen shake to at least this magnitude.
    Shake(f32),
    Cue(AudioCue),
}

pub const IMPACT_SPARKS: usize = 30;
pub const IMPACT_PARTICLES: usize = 30;

/// Sparks and dust thrown out when something is hit.
pub fn push_impact_burst<R: Rng + ?Sized>(center: Vec2, rng: &mut R, events: &mut Vec<SpawnEvent>) {
    for _ in 0..IMPACT_SPARKS {
        let angle = rng.random::<f32>() * TAU;
        let speed = rng.random::<f32>() * 5.0;
        events.push(SpawnEvent::Spark {
            pos: center,
            angle,
            speed: 2.0 + rng.random::<f32>(),
        });
        events.push(SpawnEvent::Particle {
            kind: ParticleKind::Dust,
            pos: center,
            velocity: Vec2::from_angle(angle + PI, speed * 0.5),
            frame: rng.random_range(0..=7),
        });
    }
}

/// Ring of slow dust particles, used at the start and end of a dash.
pub fn push_dust_ring<R: Rng + ?Sized>(
    center: Vec2,
    count: usize,
    rng: &mut R,
    events: &mut Vec<SpawnEvent>,
) {
    for _ in 0..count {
        let angle = rng.random::<f32>() * TAU;
        let speed = rng.random::<f32>() * 0.5 + 0.5;
        events.push(SpawnEvent::Particle {
            kind: ParticleKind::Dust,
            pos: center,
            velocity: Vec2::from_angle(angle, speed),
            frame: rng.random_range(0..=7),
        });
    }
}
