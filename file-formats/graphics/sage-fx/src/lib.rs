//! Particle effects for SAGE engine games
//!
//! Templates describe an effect once; [`ParticleSystem`] instances emit,
//! integrate and recycle a fixed pool of particles at 30 ticks per second;
//! the [`ParticleSystemManager`] owns the instances, drives them every frame
//! and writes them into save games through [`sage_state`].
//!
//! ```
//! use std::sync::Arc;
//! use std::time::Duration;
//! use sage_fx::{
//!     EmissionVelocity, EmissionVolume, FxParticleSystemTemplate, ParticleSystemManager,
//!     Placement, RandomVariable,
//! };
//!
//! let template = FxParticleSystemTemplate {
//!     particle_texture: Some("EXSmoke.tga".to_string()),
//!     burst_count: RandomVariable::constant(4.0),
//!     lifetime: RandomVariable::new(20.0, 30.0),
//!     emission_volume: Some(EmissionVolume::Point { is_hollow: false }),
//!     emission_velocity: Some(EmissionVelocity::Hemispherical {
//!         speed: RandomVariable::new(0.5, 1.0),
//!     }),
//!     ..FxParticleSystemTemplate::new("Smoke")
//! };
//!
//! let mut manager = ParticleSystemManager::default();
//! let id = manager.create(Arc::new(template), Placement::default())?;
//! if let Some(system) = manager.get_mut(id) {
//!     system.activate();
//! }
//! manager.update(Duration::ZERO)?;
//! assert_eq!(manager.particle_count(), 4);
//! # Ok::<(), sage_fx::FxError>(())
//! ```

pub mod attachment;
pub mod error;
pub mod keyframe;
pub mod manager;
pub mod particles;
pub mod placement;
pub mod random;
pub mod template;

pub use attachment::AttachedParticleSystem;
pub use error::{FxError, Result};
pub use keyframe::{
    ParticleAlphaKeyframe, ParticleColorKeyframe, RandomAlphaKeyframe, RgbColorKeyframe,
};
pub use manager::{ParticleSystemId, ParticleSystemManager, ParticleSystemManagerConfig};
pub use particles::{
    EmissionVelocity, EmissionVolume, Particle, ParticleSystem, ParticleSystemState,
    ParticleVertex, RenderItem, TICK_DURATION,
};
pub use placement::{Placement, WorldTransform};
pub use random::{DistributionType, ParticleRng, RandomVariable};
pub use template::{
    FxParticleSystemTemplate, ParticleSystemShader, ParticleSystemTemplate, ParticleSystemType,
    ParticleTemplateSet, TemplateStore,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
