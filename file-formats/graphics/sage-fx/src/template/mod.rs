//! Particle system templates
//!
//! [`FxParticleSystemTemplate`] is the read-only description every live
//! particle system is instantiated from. Legacy flat templates convert into it
//! through [`ParticleSystemTemplate::to_fx_template`].

pub mod legacy;
pub mod modules;
pub mod store;

use glam::Vec3;
use sage_state::persist_enum;

#[cfg(feature = "serde-support")]
use serde::{Deserialize, Serialize};

use crate::error::{FxError, Result};
use crate::keyframe::ParticleColorKeyframe;
use crate::particles::emission::{EmissionVelocity, EmissionVolume};
use crate::random::RandomVariable;

pub use legacy::ParticleSystemTemplate;
pub use modules::{
    AlphaModule, ColorModule, DefaultAlpha, DefaultColor, DefaultPhysics, DefaultUpdate,
    DefaultWind, DrawModule, EventModule, GpuDraw, LightningDraw, ModuleType, PhysicsModule,
    RenderObjectDraw, RenderObjectUpdate, TerrainCollisionEvent, UpdateModule, UpdateParameters,
    WindModule,
};
pub use store::{ParticleTemplateSet, TemplateStore};

persist_enum! {
    /// Blend mode the renderer selects for a system
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    #[cfg_attr(feature = "serde-support", derive(Serialize, Deserialize), serde(rename_all = "SCREAMING_SNAKE_CASE"))]
    pub enum ParticleSystemShader {
        None = 0,
        Alpha = 1,
        AlphaTest = 2,
        #[default]
        Additive = 3,
        Multiply = 4,
        W3dEmissive = 5,
        W3dAlpha = 6,
        W3dDiffuse = 7,
    }
}

persist_enum! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    #[cfg_attr(feature = "serde-support", derive(Serialize, Deserialize), serde(rename_all = "SCREAMING_SNAKE_CASE"))]
    pub enum ParticleSystemType {
        #[default]
        Particle = 0,
        VolumeParticle = 1,
        Drawable = 2,
        Streak = 3,
        Smudge = 4,
        GpuParticle = 5,
        #[cfg_attr(feature = "serde-support", serde(rename = "GPU_TERRAINFIRE"))]
        GpuTerrainFire = 6,
    }
}

persist_enum! {
    /// Importance of a system when particles have to be shed
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
    #[cfg_attr(feature = "serde-support", derive(Serialize, Deserialize), serde(rename_all = "SCREAMING_SNAKE_CASE"))]
    pub enum ParticleSystemPriority {
        #[default]
        WeaponExplosion = 0,
        Scorchmark = 1,
        DustTrail = 2,
        Buildup = 3,
        DebrisTrail = 4,
        UnitDamageFx = 5,
        DeathExplosion = 6,
        SemiConstant = 7,
        Constant = 8,
        WeaponTrail = 9,
        AreaEffect = 10,
        Critical = 11,
        AlwaysRender = 12,
    }
}

persist_enum! {
    /// Legacy velocity numbering
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    #[cfg_attr(feature = "serde-support", derive(Serialize, Deserialize), serde(rename_all = "SCREAMING_SNAKE_CASE"))]
    pub enum ParticleVelocityType {
        #[default]
        None = 0,
        Ortho = 1,
        Spherical = 2,
        Hemispherical = 3,
        Cylindrical = 4,
        Outward = 5,
    }
}

persist_enum! {
    /// Legacy volume numbering
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    #[cfg_attr(feature = "serde-support", derive(Serialize, Deserialize), serde(rename_all = "SCREAMING_SNAKE_CASE"))]
    pub enum ParticleVolumeType {
        #[default]
        None = 0,
        Point = 1,
        Line = 2,
        Box = 3,
        Sphere = 4,
        Cylinder = 5,
    }
}

persist_enum! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    #[cfg_attr(feature = "serde-support", derive(Serialize, Deserialize))]
    pub enum WindMotion {
        #[default]
        Unused = 1,
        PingPong = 2,
        Circular = 3,
    }
}

persist_enum! {
    /// Axis mesh particles rotate around
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    #[cfg_attr(feature = "serde-support", derive(Serialize, Deserialize), serde(rename_all = "SCREAMING_SNAKE_CASE"))]
    pub enum RotationType {
        #[default]
        RotateX = 0,
        RotateY = 1,
        RotateZ = 2,
        RotateV = 3,
    }
}

/// Largest running start size
pub const MAX_START_SIZE: f32 = 50.0;

/// Shared description of a particle effect
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde-support", derive(Serialize, Deserialize), serde(default))]
pub struct FxParticleSystemTemplate {
    pub name: String,
    pub priority: ParticleSystemPriority,
    pub is_one_shot: bool,
    pub shader: ParticleSystemShader,
    #[cfg_attr(feature = "serde-support", serde(rename = "type"))]
    pub kind: ParticleSystemType,
    /// Texture name; systems without one are never simulated
    pub particle_texture: Option<String>,
    pub per_particle_attached_system: Option<String>,
    pub slave_system: Option<String>,
    pub slave_pos_offset: Vec3,
    /// Particle lifetime in ticks
    pub lifetime: RandomVariable,
    /// System lifetime in ticks, zero for unlimited
    pub system_lifetime: u32,
    pub sort_level: u32,
    pub size: RandomVariable,
    /// Growth of the running start size per spawned particle
    pub start_size_rate: RandomVariable,
    pub is_ground_aligned: bool,
    pub is_emit_above_ground_only: bool,
    pub is_particle_up_towards_emitter: bool,
    pub use_maximum_height: bool,
    pub shroud_emitter: bool,
    /// Ticks between bursts
    pub burst_delay: RandomVariable,
    /// Particles per burst
    pub burst_count: RandomVariable,
    /// Ticks before the first burst
    pub initial_delay: RandomVariable,
    pub colors: Option<ColorModule>,
    pub alpha: Option<AlphaModule>,
    pub update: Option<UpdateModule>,
    pub physics: Option<PhysicsModule>,
    pub draw: Option<DrawModule>,
    pub wind: Option<WindModule>,
    pub emission_velocity: Option<EmissionVelocity>,
    pub emission_volume: Option<EmissionVolume>,
    pub event: Option<EventModule>,
}

impl Default for FxParticleSystemTemplate {
    fn default() -> Self {
        Self::new("")
    }
}

impl FxParticleSystemTemplate {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            priority: ParticleSystemPriority::default(),
            is_one_shot: false,
            shader: ParticleSystemShader::default(),
            kind: ParticleSystemType::default(),
            particle_texture: None,
            per_particle_attached_system: None,
            slave_system: None,
            slave_pos_offset: Vec3::ZERO,
            lifetime: RandomVariable::default(),
            system_lifetime: 0,
            sort_level: 0,
            size: RandomVariable::default(),
            start_size_rate: RandomVariable::default(),
            is_ground_aligned: false,
            is_emit_above_ground_only: false,
            is_particle_up_towards_emitter: false,
            use_maximum_height: false,
            shroud_emitter: false,
            burst_delay: RandomVariable::default(),
            burst_count: RandomVariable::default(),
            initial_delay: RandomVariable::default(),
            colors: None,
            alpha: None,
            update: None,
            physics: None,
            draw: None,
            wind: None,
            emission_velocity: None,
            emission_volume: None,
            event: None,
        }
    }

    /// Check that the configured modules can work together
    pub fn validate(&self) -> Result<()> {
        if self.burst_delay.low <= -1.0 {
            return Err(FxError::InvalidBurstDelay {
                template: self.name.clone(),
                low: self.burst_delay.low,
            });
        }
        if let (Some(velocity), Some(volume)) = (&self.emission_velocity, &self.emission_volume) {
            velocity.check_volume(volume)?;
        }
        Ok(())
    }

    /// Longest time a particle can stay alive, bounded by the system lifetime
    pub fn effective_max_lifetime(&self) -> f32 {
        if self.system_lifetime > 0 {
            self.lifetime.high.min(self.system_lifetime as f32)
        } else {
            self.lifetime.high
        }
    }

    /// Number of particle slots an instance of this template needs.
    ///
    /// Saturates instead of overflowing; [`validate`](Self::validate)
    /// rejects the burst delays that would make it unbounded.
    pub fn max_particles(&self) -> usize {
        let burst = self.burst_count.high.max(0.0) as usize;
        let bursts_alive = (self.effective_max_lifetime() / (self.burst_delay.low + 1.0))
            .ceil()
            .max(0.0) as usize;
        bursts_alive.saturating_mul(burst).saturating_add(burst)
    }

    /// Whether instances skip pool allocation entirely
    pub fn is_inert(&self) -> bool {
        self.max_particles() == 0 || self.particle_texture.is_none()
    }

    /// Runtime color track; empty without a color module
    pub fn color_track(&self) -> Vec<ParticleColorKeyframe> {
        self.colors
            .as_ref()
            .map(ColorModule::track)
            .unwrap_or_default()
    }

    /// Update ranges, all zero without an update module
    pub fn update_parameters(&self) -> UpdateParameters {
        self.update
            .as_ref()
            .map(UpdateModule::parameters)
            .unwrap_or_default()
    }

    pub fn color_scale(&self) -> RandomVariable {
        self.colors
            .as_ref()
            .map(ColorModule::color_scale)
            .unwrap_or_default()
    }

    /// Validation run before any instance allocates its pool
    pub(crate) fn check_emission(&self) -> Result<()> {
        self.validate()?;
        match &self.emission_volume {
            None => Err(FxError::MissingEmissionVolume(self.name.clone())),
            Some(volume) if !volume.supports_rays() => {
                Err(FxError::UnsupportedVolume(volume.module_name()))
            }
            Some(_) => Ok(()),
        }
    }
}
