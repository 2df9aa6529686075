mod clouds;
mod particle;
mod projectile;
mod spark;

pub use clouds::{Cloud, Clouds};
pub use particle::{Particle, ParticleClips, ParticleKind};
pub use projectile::{Projectile, ProjectileOutcome, PROJECTILE_LIFETIME};
pub use spark::Spark;
