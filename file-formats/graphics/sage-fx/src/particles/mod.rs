//! Live particle systems

pub mod emission;
pub mod particle;
pub mod render;
pub mod snapshot;
pub mod system;

pub use emission::{EmissionVelocity, EmissionVolume, Ray};
pub use particle::{Particle, ParticleUnknowns};
pub use render::{ParticleVertex, RenderItem};
pub use snapshot::SnapshotUnknowns;
pub use system::{ParticleSystem, ParticleSystemState, SystemHeader, TICK_DURATION};
