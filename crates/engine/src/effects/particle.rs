use crate::animation::{Animation, AnimationClip};
use crate::assets::{AssetError, AssetRegistry};
use crate::math::Vec2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParticleKind {
    Leaf,
    Dust,
}

impl ParticleKind {
    pub fn animation_key(self) -> &'static str {
        match self {
            ParticleKind::Leaf => "particle/leaf",
            ParticleKind::Dust => "particle/particle",
        }
    }
}

/// Particle clips resolved once per level.
#[derive(Debug, Clone)]
pub struct ParticleClips {
    leaf: AnimationClip,
    dust: AnimationClip,
}

impl ParticleClips {
    pub fn resolve(assets: &AssetRegistry) -> Result<Self, AssetError> {
        Ok(Self {
            leaf: assets.animation(ParticleKind::Leaf.animation_key())?.clone(),
            dust: assets.animation(ParticleKind::Dust.animation_key())?.clone(),
        })
    }

    pub fn get(&self, kind: ParticleKind) -> &AnimationClip {
        match kind {
            ParticleKind::Leaf => &self.leaf,
            ParticleKind::Dust => &self.dust,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Particle {
    pub kind: ParticleKind,
    pub pos: Vec2,
    pub velocity: Vec2,
    animation: Animation,
}

impl Particle {
    pub fn new(kind: ParticleKind, pos: Vec2, velocity: Vec2, animation: Animation) -> Self {
        Self {
            kind,
            pos,
            velocity,
            animation,
        }
    }

    pub fn spawn(
        clips: &ParticleClips,
        kind: ParticleKind,
        pos: Vec2,
        velocity: Vec2,
        frame: u32,
    ) -> Self {
        let animation = clips.get(kind).instantiate().starting_at(frame);
        Self::new(kind, pos, velocity, animation)
    }

    /// Moves and animates the particle. Returns `true` once it should be
    /// removed, which is the update after its animation finished.
    pub fn update(&mut self) -> bool {
        let expired = self.animation.is_done();
        self.pos += self.velocity;
        self.animation.update();
        if self.kind == ParticleKind::Leaf {
            self.pos.x += (self.animation.frame() as f32 * 0.035).sin() * 0.3;
        }
        expired
    }

    pub fn animation(&self) -> &Animation {
        &self.animation
    }
}
