//! Template sub-modules
//!
//! Each family is a closed set of variants selected by a module type token,
//! for example `DefaultUpdate` or `RenderObjectUpdate`.

use glam::Vec3;

#[cfg(feature = "serde-support")]
use serde::{Deserialize, Serialize};

use crate::error::{FxError, Result};
use crate::keyframe::{
    MAX_KEYFRAMES, ParticleColorKeyframe, RandomAlphaKeyframe, RgbColorKeyframe, monotonic_slots,
};
use crate::random::RandomVariable;
use crate::template::{RotationType, WindMotion};

/// A module family resolved from type tokens
pub trait ModuleType: Sized {
    /// Family name used in error messages
    const FAMILY: &'static str;

    /// Resolve a module type token into a variant with default parameters
    fn from_module_name(token: &str) -> Result<Self>;

    /// Token naming this variant
    fn module_name(&self) -> &'static str;
}

pub(crate) fn unknown_module<T>(family: &'static str, token: &str) -> Result<T> {
    Err(FxError::UnknownModuleType {
        family,
        token: token.to_string(),
    })
}

/// Color keyframes
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde-support", derive(Serialize, Deserialize), serde(default))]
pub struct DefaultColor {
    pub colors: [Option<RgbColorKeyframe>; MAX_KEYFRAMES],
    pub color_scale: RandomVariable,
}

impl DefaultColor {
    /// Runtime color track shared by every particle
    pub fn track(&self) -> Vec<ParticleColorKeyframe> {
        monotonic_slots(&self.colors)
            .map(ParticleColorKeyframe::from)
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde-support", derive(Serialize, Deserialize), serde(tag = "type"))]
pub enum ColorModule {
    #[cfg_attr(feature = "serde-support", serde(rename = "DefaultColor"))]
    Default(DefaultColor),
}

impl ColorModule {
    pub fn colors(&self) -> &[Option<RgbColorKeyframe>; MAX_KEYFRAMES] {
        match self {
            Self::Default(color) => &color.colors,
        }
    }

    pub fn color_scale(&self) -> RandomVariable {
        match self {
            Self::Default(color) => color.color_scale,
        }
    }

    pub fn track(&self) -> Vec<ParticleColorKeyframe> {
        match self {
            Self::Default(color) => color.track(),
        }
    }
}

impl ModuleType for ColorModule {
    const FAMILY: &'static str = "color";

    fn from_module_name(token: &str) -> Result<Self> {
        match token {
            "DefaultColor" => Ok(Self::Default(DefaultColor::default())),
            _ => unknown_module(Self::FAMILY, token),
        }
    }

    fn module_name(&self) -> &'static str {
        match self {
            Self::Default(_) => "DefaultColor",
        }
    }
}

/// Alpha keyframes, sampled per particle
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde-support", derive(Serialize, Deserialize), serde(default))]
pub struct DefaultAlpha {
    pub alphas: [Option<RandomAlphaKeyframe>; MAX_KEYFRAMES],
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde-support", derive(Serialize, Deserialize), serde(tag = "type"))]
pub enum AlphaModule {
    #[cfg_attr(feature = "serde-support", serde(rename = "DefaultAlpha"))]
    Default(DefaultAlpha),
}

impl AlphaModule {
    pub fn alphas(&self) -> &[Option<RandomAlphaKeyframe>; MAX_KEYFRAMES] {
        match self {
            Self::Default(alpha) => &alpha.alphas,
        }
    }
}

impl ModuleType for AlphaModule {
    const FAMILY: &'static str = "alpha";

    fn from_module_name(token: &str) -> Result<Self> {
        match token {
            "DefaultAlpha" => Ok(Self::Default(DefaultAlpha::default())),
            _ => unknown_module(Self::FAMILY, token),
        }
    }

    fn module_name(&self) -> &'static str {
        match self {
            Self::Default(_) => "DefaultAlpha",
        }
    }
}

/// Size and rotation ranges for sprite particles
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde-support", derive(Serialize, Deserialize), serde(default))]
pub struct DefaultUpdate {
    pub size_rate: RandomVariable,
    pub size_rate_damping: RandomVariable,
    pub angle_z: RandomVariable,
    pub angular_rate_z: RandomVariable,
    pub angular_damping: RandomVariable,
    pub angular_damping_xy: RandomVariable,
    pub angle_xy: RandomVariable,
    pub angular_rate_xy: RandomVariable,
    pub rotation: RotationType,
}

/// Per-axis size and rotation ranges for mesh particles
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde-support", derive(Serialize, Deserialize), serde(default))]
pub struct RenderObjectUpdate {
    pub angle_x: RandomVariable,
    pub angular_rate_x: RandomVariable,
    pub angle_y: RandomVariable,
    pub angular_rate_y: RandomVariable,
    pub angle_z: RandomVariable,
    pub angular_rate_z: RandomVariable,
    pub angular_damping: RandomVariable,
    pub start_size_x: RandomVariable,
    pub start_size_y: RandomVariable,
    pub start_size_z: RandomVariable,
    pub size_rate_x: RandomVariable,
    pub size_rate_y: RandomVariable,
    pub size_rate_z: RandomVariable,
    pub size_damping_x: RandomVariable,
    pub size_damping_y: RandomVariable,
    pub size_damping_z: RandomVariable,
    pub rotation: RotationType,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde-support", derive(Serialize, Deserialize), serde(tag = "type"))]
pub enum UpdateModule {
    #[cfg_attr(feature = "serde-support", serde(rename = "DefaultUpdate"))]
    Default(DefaultUpdate),
    #[cfg_attr(feature = "serde-support", serde(rename = "RenderObjectUpdate"))]
    RenderObject(RenderObjectUpdate),
}

/// The ranges the simulation samples at spawn time
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct UpdateParameters {
    pub angle_z: RandomVariable,
    pub angular_rate_z: RandomVariable,
    pub angular_damping: RandomVariable,
    pub size_rate: RandomVariable,
    pub size_rate_damping: RandomVariable,
}

impl UpdateModule {
    pub fn parameters(&self) -> UpdateParameters {
        match self {
            Self::Default(update) => UpdateParameters {
                angle_z: update.angle_z,
                angular_rate_z: update.angular_rate_z,
                angular_damping: update.angular_damping,
                size_rate: update.size_rate,
                size_rate_damping: update.size_rate_damping,
            },
            Self::RenderObject(update) => UpdateParameters {
                angle_z: update.angle_z,
                angular_rate_z: update.angular_rate_z,
                angular_damping: update.angular_damping,
                size_rate: update.size_rate_x,
                size_rate_damping: update.size_damping_x,
            },
        }
    }
}

impl ModuleType for UpdateModule {
    const FAMILY: &'static str = "update";

    fn from_module_name(token: &str) -> Result<Self> {
        match token {
            "DefaultUpdate" => Ok(Self::Default(DefaultUpdate::default())),
            "RenderObjectUpdate" => Ok(Self::RenderObject(RenderObjectUpdate::default())),
            _ => unknown_module(Self::FAMILY, token),
        }
    }

    fn module_name(&self) -> &'static str {
        match self {
            Self::Default(_) => "DefaultUpdate",
            Self::RenderObject(_) => "RenderObjectUpdate",
        }
    }
}

/// Gravity, damping and drift
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde-support", derive(Serialize, Deserialize), serde(default))]
pub struct DefaultPhysics {
    /// Added to the Z velocity every tick
    pub gravity: f32,
    pub velocity_damping: RandomVariable,
    /// Added to the position every tick, on top of the velocity
    pub drift_velocity: Vec3,
    pub particles_attach_to_bone: bool,
    pub swirly: bool,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde-support", derive(Serialize, Deserialize), serde(tag = "type"))]
pub enum PhysicsModule {
    #[cfg_attr(feature = "serde-support", serde(rename = "DefaultPhysics"))]
    Default(DefaultPhysics),
}

impl PhysicsModule {
    pub fn gravity(&self) -> f32 {
        match self {
            Self::Default(physics) => physics.gravity,
        }
    }

    pub fn velocity_damping(&self) -> RandomVariable {
        match self {
            Self::Default(physics) => physics.velocity_damping,
        }
    }

    pub fn drift_velocity(&self) -> Vec3 {
        match self {
            Self::Default(physics) => physics.drift_velocity,
        }
    }
}

impl ModuleType for PhysicsModule {
    const FAMILY: &'static str = "physics";

    fn from_module_name(token: &str) -> Result<Self> {
        match token {
            "DefaultPhysics" => Ok(Self::Default(DefaultPhysics::default())),
            _ => unknown_module(Self::FAMILY, token),
        }
    }

    fn module_name(&self) -> &'static str {
        match self {
            Self::Default(_) => "DefaultPhysics",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde-support", derive(Serialize, Deserialize), serde(default))]
pub struct RenderObjectDraw {
    pub shader1: Option<String>,
}

/// Sprite sheet animation
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde-support", derive(Serialize, Deserialize), serde(default))]
pub struct GpuDraw {
    pub frames_per_row: u32,
    pub total_frames: u32,
    pub speed_multiplier: u32,
    pub detail_texture: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde-support", derive(Serialize, Deserialize), serde(default))]
pub struct LightningDraw {
    pub offset_x: RandomVariable,
    pub offset_y: RandomVariable,
    pub offset_z: RandomVariable,
}

/// How the renderer draws each particle
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde-support", derive(Serialize, Deserialize), serde(tag = "type"))]
pub enum DrawModule {
    #[cfg_attr(feature = "serde-support", serde(rename = "DefaultDraw"))]
    Default,
    #[cfg_attr(feature = "serde-support", serde(rename = "ButterflyDraw"))]
    Butterfly,
    #[cfg_attr(feature = "serde-support", serde(rename = "QuadDraw"))]
    Quad,
    #[cfg_attr(feature = "serde-support", serde(rename = "StreakDraw"))]
    Streak,
    #[cfg_attr(feature = "serde-support", serde(rename = "RenderObjectDraw"))]
    RenderObject(RenderObjectDraw),
    #[cfg_attr(feature = "serde-support", serde(rename = "GpuDraw"))]
    Gpu(GpuDraw),
    #[cfg_attr(feature = "serde-support", serde(rename = "LightningDraw"))]
    Lightning(LightningDraw),
}

impl ModuleType for DrawModule {
    const FAMILY: &'static str = "draw";

    fn from_module_name(token: &str) -> Result<Self> {
        match token {
            "DefaultDraw" => Ok(Self::Default),
            "ButterflyDraw" => Ok(Self::Butterfly),
            "QuadDraw" => Ok(Self::Quad),
            "StreakDraw" => Ok(Self::Streak),
            "RenderObjectDraw" => Ok(Self::RenderObject(RenderObjectDraw::default())),
            "GpuDraw" => Ok(Self::Gpu(GpuDraw::default())),
            "LightningDraw" => Ok(Self::Lightning(LightningDraw::default())),
            _ => unknown_module(Self::FAMILY, token),
        }
    }

    fn module_name(&self) -> &'static str {
        match self {
            Self::Default => "DefaultDraw",
            Self::Butterfly => "ButterflyDraw",
            Self::Quad => "QuadDraw",
            Self::Streak => "StreakDraw",
            Self::RenderObject(_) => "RenderObjectDraw",
            Self::Gpu(_) => "GpuDraw",
            Self::Lightning(_) => "LightningDraw",
        }
    }
}

/// Wind parameters; carried for persistence, not simulated
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde-support", derive(Serialize, Deserialize), serde(default))]
pub struct DefaultWind {
    pub motion: WindMotion,
    pub strength: f32,
    pub full_strength_distance: f32,
    pub zero_strength_distance: f32,
    pub angle_change_min: f32,
    pub angle_change_max: f32,
    pub ping_pong_start_angle_min: f32,
    pub ping_pong_start_angle_max: f32,
    pub ping_pong_end_angle_min: f32,
    pub ping_pong_end_angle_max: f32,
    pub turbulence_amplitude: f32,
    pub turbulence_frequency: f32,
}

impl Default for DefaultWind {
    fn default() -> Self {
        Self {
            motion: WindMotion::Unused,
            strength: 0.0,
            full_strength_distance: 0.0,
            zero_strength_distance: 0.0,
            angle_change_min: 0.0,
            angle_change_max: 0.0,
            ping_pong_start_angle_min: 0.0,
            ping_pong_start_angle_max: 0.0,
            ping_pong_end_angle_min: 0.0,
            ping_pong_end_angle_max: 0.0,
            turbulence_amplitude: 0.0,
            turbulence_frequency: 0.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde-support", derive(Serialize, Deserialize), serde(tag = "type"))]
pub enum WindModule {
    #[cfg_attr(feature = "serde-support", serde(rename = "DefaultWind"))]
    Default(DefaultWind),
}

impl WindModule {
    pub fn wind(&self) -> &DefaultWind {
        match self {
            Self::Default(wind) => wind,
        }
    }
}

impl ModuleType for WindModule {
    const FAMILY: &'static str = "wind";

    fn from_module_name(token: &str) -> Result<Self> {
        match token {
            "DefaultWind" => Ok(Self::Default(DefaultWind::default())),
            _ => unknown_module(Self::FAMILY, token),
        }
    }

    fn module_name(&self) -> &'static str {
        match self {
            Self::Default(_) => "DefaultWind",
        }
    }
}

/// Effect spawned when a particle reaches the terrain
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde-support", derive(Serialize, Deserialize), serde(default))]
pub struct TerrainCollisionEvent {
    pub event_fx: Option<String>,
    pub per_particle: bool,
    pub kill_after_event: bool,
    pub height_offset: RandomVariable,
    pub orient_fx_to_terrain: bool,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde-support", derive(Serialize, Deserialize), serde(tag = "type"))]
pub enum EventModule {
    #[cfg_attr(feature = "serde-support", serde(rename = "TerrainCollision"))]
    TerrainCollision(TerrainCollisionEvent),
}

impl ModuleType for EventModule {
    const FAMILY: &'static str = "event";

    fn from_module_name(token: &str) -> Result<Self> {
        match token {
            "TerrainCollision" => Ok(Self::TerrainCollision(TerrainCollisionEvent::default())),
            _ => unknown_module(Self::FAMILY, token),
        }
    }

    fn module_name(&self) -> &'static str {
        match self {
            Self::TerrainCollision(_) => "TerrainCollision",
        }
    }
}
