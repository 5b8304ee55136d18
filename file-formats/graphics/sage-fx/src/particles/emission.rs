//! Particle emission volumes and velocities
//!
//! A volume produces the spawn [`Ray`] of a particle. A velocity strategy
//! turns that ray into the initial velocity; the outward strategy branches
//! on which volume produced the ray.

use glam::{Quat, Vec3};

#[cfg(feature = "serde-support")]
use serde::{Deserialize, Serialize};

use crate::error::{FxError, Result};
use crate::random::{ParticleRng, RandomVariable};
use crate::template::modules::{ModuleType, unknown_module};
use crate::template::{ParticleVelocityType, ParticleVolumeType};

/// Spawn position and direction of a particle
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Ray {
    pub position: Vec3,
    pub direction: Vec3,
}

impl Ray {
    pub const ZERO: Self = Self {
        position: Vec3::ZERO,
        direction: Vec3::ZERO,
    };

    pub fn new(position: Vec3, direction: Vec3) -> Self {
        Self {
            position,
            direction,
        }
    }
}

/// Sinusoidal bolt between two points
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde-support", derive(Serialize, Deserialize), serde(default))]
pub struct LightningVolume {
    pub start_point: Vec3,
    pub end_point: Vec3,
    pub amplitude1: RandomVariable,
    pub frequency1: RandomVariable,
    pub phase1: RandomVariable,
    pub amplitude2: RandomVariable,
    pub frequency2: RandomVariable,
    pub phase2: RandomVariable,
    pub amplitude3: RandomVariable,
    pub frequency3: RandomVariable,
    pub phase3: RandomVariable,
    pub is_hollow: bool,
}

/// Fire spread over terrain cells
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde-support", derive(Serialize, Deserialize), serde(default))]
pub struct TerrainFireVolume {
    pub x_offset: RandomVariable,
    pub y_offset: RandomVariable,
    pub z_offset: RandomVariable,
    pub cell_emission_chance: f32,
    pub is_hollow: bool,
}

/// Region particles spawn in
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde-support", derive(Serialize, Deserialize), serde(tag = "type"))]
pub enum EmissionVolume {
    #[cfg_attr(feature = "serde-support", serde(rename = "PointEmissionVolume"))]
    Point {
        #[cfg_attr(feature = "serde-support", serde(default))]
        is_hollow: bool,
    },
    #[cfg_attr(feature = "serde-support", serde(rename = "LineEmissionVolume"))]
    Line {
        start_point: Vec3,
        end_point: Vec3,
        #[cfg_attr(feature = "serde-support", serde(default))]
        is_hollow: bool,
    },
    /// Spans `[-x, x] x [-y, y] x [0, 2z]` of the half size
    #[cfg_attr(feature = "serde-support", serde(rename = "BoxEmissionVolume"))]
    Box {
        half_size: Vec3,
        #[cfg_attr(feature = "serde-support", serde(default))]
        is_hollow: bool,
    },
    #[cfg_attr(feature = "serde-support", serde(rename = "SphereEmissionVolume"))]
    Sphere {
        radius: f32,
        #[cfg_attr(feature = "serde-support", serde(default))]
        is_hollow: bool,
    },
    /// Upright cylinder standing on the XY plane
    #[cfg_attr(feature = "serde-support", serde(rename = "CylinderEmissionVolume"))]
    Cylinder {
        radius: f32,
        length: f32,
        #[cfg_attr(feature = "serde-support", serde(default))]
        offset: Vec3,
        #[cfg_attr(feature = "serde-support", serde(default))]
        radius_rate: f32,
        #[cfg_attr(feature = "serde-support", serde(default))]
        is_hollow: bool,
    },
    #[cfg_attr(feature = "serde-support", serde(rename = "LightningEmission"))]
    Lightning(LightningVolume),
    #[cfg_attr(feature = "serde-support", serde(rename = "TerrainFireEmission"))]
    TerrainFire(TerrainFireVolume),
}

impl EmissionVolume {
    pub fn is_hollow(&self) -> bool {
        match self {
            Self::Point { is_hollow }
            | Self::Line { is_hollow, .. }
            | Self::Box { is_hollow, .. }
            | Self::Sphere { is_hollow, .. }
            | Self::Cylinder { is_hollow, .. } => *is_hollow,
            Self::Lightning(volume) => volume.is_hollow,
            Self::TerrainFire(volume) => volume.is_hollow,
        }
    }

    /// Legacy volume numbering; lightning and terrain fire have none
    pub fn volume_type(&self) -> Option<ParticleVolumeType> {
        match self {
            Self::Point { .. } => Some(ParticleVolumeType::Point),
            Self::Line { .. } => Some(ParticleVolumeType::Line),
            Self::Box { .. } => Some(ParticleVolumeType::Box),
            Self::Sphere { .. } => Some(ParticleVolumeType::Sphere),
            Self::Cylinder { .. } => Some(ParticleVolumeType::Cylinder),
            Self::Lightning(_) | Self::TerrainFire(_) => None,
        }
    }

    /// Whether [`get_ray`](Self::get_ray) can produce geometry for this volume
    pub fn supports_rays(&self) -> bool {
        self.volume_type().is_some()
    }

    /// Sample a spawn ray
    pub fn get_ray(&self, rng: &mut ParticleRng) -> Result<Ray> {
        match self {
            Self::Point { .. } => Ok(Ray::ZERO),
            Self::Line {
                start_point,
                end_point,
                ..
            } => {
                let position = Vec3::new(
                    rng.random_float(start_point.x, end_point.x),
                    rng.random_float(start_point.y, end_point.y),
                    rng.random_float(start_point.z, end_point.z),
                );
                let direction = (*end_point - *start_point).normalize_or_zero();
                Ok(Ray::new(position, direction))
            }
            Self::Box { half_size, .. } => {
                let position = Vec3::new(
                    rng.random_float(-half_size.x, half_size.x),
                    rng.random_float(-half_size.y, half_size.y),
                    rng.random_float(0.0, half_size.z * 2.0),
                );
                Ok(Ray::new(position, position.normalize_or_zero()))
            }
            Self::Sphere { radius, is_hollow } => {
                let direction = rng.random_direction_3d();
                let radius = if *is_hollow {
                    *radius
                } else {
                    rng.random_float(0.0, *radius)
                };
                Ok(Ray::new(direction * radius, direction))
            }
            Self::Cylinder {
                radius,
                length,
                is_hollow,
                ..
            } => {
                let angle = rng.random_angle();
                let radius = if *is_hollow {
                    *radius
                } else {
                    rng.random_float(0.0, *radius)
                };
                let height = rng.random_float(0.0, *length);
                let direction = Quat::from_rotation_z(angle) * Vec3::X;
                Ok(Ray::new(
                    Vec3::new(direction.x * radius, direction.y * radius, height),
                    direction,
                ))
            }
            Self::Lightning(_) | Self::TerrainFire(_) => {
                Err(FxError::UnsupportedVolume(self.module_name()))
            }
        }
    }
}

impl ModuleType for EmissionVolume {
    const FAMILY: &'static str = "emission volume";

    fn from_module_name(token: &str) -> Result<Self> {
        match token {
            "PointEmissionVolume" => Ok(Self::Point { is_hollow: false }),
            "LineEmissionVolume" => Ok(Self::Line {
                start_point: Vec3::ZERO,
                end_point: Vec3::ZERO,
                is_hollow: false,
            }),
            "BoxEmissionVolume" => Ok(Self::Box {
                half_size: Vec3::ZERO,
                is_hollow: false,
            }),
            "SphereEmissionVolume" => Ok(Self::Sphere {
                radius: 0.0,
                is_hollow: false,
            }),
            "CylinderEmissionVolume" => Ok(Self::Cylinder {
                radius: 0.0,
                length: 0.0,
                offset: Vec3::ZERO,
                radius_rate: 0.0,
                is_hollow: false,
            }),
            "LightningEmission" => Ok(Self::Lightning(LightningVolume::default())),
            "TerrainFireEmission" => Ok(Self::TerrainFire(TerrainFireVolume::default())),
            _ => unknown_module(Self::FAMILY, token),
        }
    }

    fn module_name(&self) -> &'static str {
        match self {
            Self::Point { .. } => "PointEmissionVolume",
            Self::Line { .. } => "LineEmissionVolume",
            Self::Box { .. } => "BoxEmissionVolume",
            Self::Sphere { .. } => "SphereEmissionVolume",
            Self::Cylinder { .. } => "CylinderEmissionVolume",
            Self::Lightning(_) => "LightningEmission",
            Self::TerrainFire(_) => "TerrainFireEmission",
        }
    }
}

/// Initial particle velocity
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde-support", derive(Serialize, Deserialize), serde(tag = "type"))]
pub enum EmissionVelocity {
    /// Independent speed per axis
    #[cfg_attr(feature = "serde-support", serde(rename = "OrthoEmissionVelocity"))]
    Ortho {
        x: RandomVariable,
        y: RandomVariable,
        z: RandomVariable,
    },
    #[cfg_attr(feature = "serde-support", serde(rename = "SphericalEmissionVelocity"))]
    Spherical { speed: RandomVariable },
    /// Spherical, restricted to the upper half
    #[cfg_attr(feature = "serde-support", serde(rename = "HemisphericalEmissionVelocity"))]
    Hemispherical { speed: RandomVariable },
    /// Radial speed around Z plus a vertical speed
    #[cfg_attr(feature = "serde-support", serde(rename = "CylindricalEmissionVelocity"))]
    Cylindrical {
        radial: RandomVariable,
        normal: RandomVariable,
    },
    /// Away from the emission volume
    #[cfg_attr(feature = "serde-support", serde(rename = "OutwardEmissionVelocity"))]
    Outward {
        speed: RandomVariable,
        #[cfg_attr(feature = "serde-support", serde(default))]
        other_speed: RandomVariable,
    },
}

impl EmissionVelocity {
    pub fn velocity_type(&self) -> ParticleVelocityType {
        match self {
            Self::Ortho { .. } => ParticleVelocityType::Ortho,
            Self::Spherical { .. } => ParticleVelocityType::Spherical,
            Self::Hemispherical { .. } => ParticleVelocityType::Hemispherical,
            Self::Cylindrical { .. } => ParticleVelocityType::Cylindrical,
            Self::Outward { .. } => ParticleVelocityType::Outward,
        }
    }

    /// Whether rays from `volume` can drive this strategy
    pub fn check_volume(&self, volume: &EmissionVolume) -> Result<()> {
        match (self, volume) {
            (
                Self::Outward { .. },
                EmissionVolume::Lightning(_) | EmissionVolume::TerrainFire(_),
            ) => Err(FxError::IncompatibleEmission {
                velocity: self.module_name(),
                volume: volume.module_name(),
            }),
            _ => Ok(()),
        }
    }

    /// Sample a velocity for a particle spawned along `direction`
    pub fn get_velocity(
        &self,
        direction: Vec3,
        volume: &EmissionVolume,
        rng: &mut ParticleRng,
    ) -> Result<Vec3> {
        match self {
            Self::Ortho { x, y, z } => Ok(Vec3::new(
                x.sample_float(rng),
                y.sample_float(rng),
                z.sample_float(rng),
            )),
            Self::Spherical { speed } => {
                let direction = rng.random_direction_3d();
                Ok(direction * speed.sample_float(rng))
            }
            Self::Hemispherical { speed } => {
                let mut direction = rng.random_direction_3d();
                direction.z = direction.z.abs();
                Ok(direction * speed.sample_float(rng))
            }
            Self::Cylindrical { radial, normal } => {
                let velocity = Vec3::X * radial.sample_float(rng);
                let mut velocity = Quat::from_rotation_z(rng.random_angle()) * velocity;
                velocity.z = normal.sample_float(rng);
                Ok(velocity)
            }
            Self::Outward { speed, other_speed } => match volume {
                EmissionVolume::Cylinder { .. } => {
                    let velocity = direction * speed.sample_float(rng);
                    Ok(velocity + Vec3::Z * other_speed.sample_float(rng))
                }
                EmissionVolume::Line { .. } => {
                    let up = if direction.dot(Vec3::Z).abs() > 0.999 {
                        Vec3::Y
                    } else {
                        Vec3::Z
                    };
                    let side = direction.cross(up).normalize_or_zero();
                    let lift = side.cross(direction).normalize_or_zero();
                    let side = side * speed.sample_float(rng);
                    let lift = lift * other_speed.sample_float(rng);
                    Ok(side + lift)
                }
                EmissionVolume::Point { .. } => {
                    let direction = rng.random_direction_3d();
                    Ok(direction * speed.sample_float(rng))
                }
                EmissionVolume::Box { .. } | EmissionVolume::Sphere { .. } => {
                    Ok(direction * speed.sample_float(rng))
                }
                EmissionVolume::Lightning(_) | EmissionVolume::TerrainFire(_) => {
                    Err(FxError::IncompatibleEmission {
                        velocity: self.module_name(),
                        volume: volume.module_name(),
                    })
                }
            },
        }
    }
}

impl ModuleType for EmissionVelocity {
    const FAMILY: &'static str = "emission velocity";

    fn from_module_name(token: &str) -> Result<Self> {
        let zero = RandomVariable::default();
        match token {
            "OrthoEmissionVelocity" => Ok(Self::Ortho {
                x: zero,
                y: zero,
                z: zero,
            }),
            "SphericalEmissionVelocity" => Ok(Self::Spherical { speed: zero }),
            "HemisphericalEmissionVelocity" => Ok(Self::Hemispherical { speed: zero }),
            "CylindricalEmissionVelocity" => Ok(Self::Cylindrical {
                radial: zero,
                normal: zero,
            }),
            "OutwardEmissionVelocity" => Ok(Self::Outward {
                speed: zero,
                other_speed: zero,
            }),
            _ => unknown_module(Self::FAMILY, token),
        }
    }

    fn module_name(&self) -> &'static str {
        match self {
            Self::Ortho { .. } => "OrthoEmissionVelocity",
            Self::Spherical { .. } => "SphericalEmissionVelocity",
            Self::Hemispherical { .. } => "HemisphericalEmissionVelocity",
            Self::Cylindrical { .. } => "CylindricalEmissionVelocity",
            Self::Outward { .. } => "OutwardEmissionVelocity",
        }
    }
}
