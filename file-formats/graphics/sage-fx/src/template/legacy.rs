//! Flat particle system templates from the first engine generation

use glam::Vec3;

#[cfg(feature = "serde-support")]
use serde::{Deserialize, Serialize};

use crate::keyframe::{MAX_KEYFRAMES, RandomAlphaKeyframe, RgbColorKeyframe};
use crate::particles::emission::{EmissionVelocity, EmissionVolume};
use crate::random::RandomVariable;

use super::{
    AlphaModule, ColorModule, DefaultAlpha, DefaultColor, DefaultPhysics, DefaultUpdate,
    DefaultWind, DrawModule, FxParticleSystemTemplate, ParticleSystemPriority,
    ParticleSystemShader, ParticleSystemType, ParticleVelocityType, ParticleVolumeType,
    PhysicsModule, UpdateModule, WindMotion, WindModule,
};

/// Legacy template with every parameter as a top-level field
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde-support", derive(Serialize, Deserialize), serde(default))]
pub struct ParticleSystemTemplate {
    pub name: String,
    pub priority: ParticleSystemPriority,
    pub is_one_shot: bool,
    pub shader: ParticleSystemShader,
    #[cfg_attr(feature = "serde-support", serde(rename = "type"))]
    pub kind: ParticleSystemType,
    /// Texture name
    pub particle: Option<String>,

    pub angle_x: RandomVariable,
    pub angle_y: RandomVariable,
    pub angle_z: RandomVariable,
    pub angular_rate_x: RandomVariable,
    pub angular_rate_y: RandomVariable,
    pub angular_rate_z: RandomVariable,
    pub angular_damping: RandomVariable,

    pub velocity_damping: RandomVariable,
    pub gravity: f32,
    pub per_particle_attached_system: Option<String>,
    pub slave_system: Option<String>,
    pub slave_pos_offset: Vec3,
    pub lifetime: RandomVariable,
    pub system_lifetime: u32,
    pub size: RandomVariable,
    pub start_size_rate: RandomVariable,
    pub size_rate: RandomVariable,
    pub size_rate_damping: RandomVariable,

    /// `Alpha1` to `Alpha8`
    pub alphas: [Option<RandomAlphaKeyframe>; MAX_KEYFRAMES],
    /// `Color1` to `Color8`
    pub colors: [Option<RgbColorKeyframe>; MAX_KEYFRAMES],
    pub color_scale: RandomVariable,

    pub burst_delay: RandomVariable,
    pub burst_count: RandomVariable,
    pub initial_delay: RandomVariable,
    pub drift_velocity: Vec3,

    pub velocity_type: ParticleVelocityType,
    pub vel_ortho_x: RandomVariable,
    pub vel_ortho_y: RandomVariable,
    pub vel_ortho_z: RandomVariable,
    pub vel_spherical: RandomVariable,
    pub vel_hemispherical: RandomVariable,
    pub vel_cylindrical_radial: RandomVariable,
    pub vel_cylindrical_normal: RandomVariable,
    pub vel_outward: RandomVariable,
    pub vel_outward_other: RandomVariable,

    pub volume_type: ParticleVolumeType,
    pub vol_line_start: Vec3,
    pub vol_line_end: Vec3,
    pub vol_box_half_size: Vec3,
    pub vol_sphere_radius: f32,
    pub vol_cylinder_radius: f32,
    pub vol_cylinder_length: f32,
    pub is_hollow: bool,

    pub is_ground_aligned: bool,
    pub is_emit_above_ground_only: bool,
    pub is_particle_up_towards_emitter: bool,

    pub wind_motion: WindMotion,
    pub wind_strength: f32,
    pub wind_full_strength_dist: f32,
    pub wind_zero_strength_dist: f32,
    pub wind_angle_change_min: f32,
    pub wind_angle_change_max: f32,
    pub wind_ping_pong_start_angle_min: f32,
    pub wind_ping_pong_start_angle_max: f32,
    pub wind_ping_pong_end_angle_min: f32,
    pub wind_ping_pong_end_angle_max: f32,
}

impl ParticleSystemTemplate {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    fn emission_velocity(&self) -> Option<EmissionVelocity> {
        match self.velocity_type {
            ParticleVelocityType::None => None,
            ParticleVelocityType::Ortho => Some(EmissionVelocity::Ortho {
                x: self.vel_ortho_x,
                y: self.vel_ortho_y,
                z: self.vel_ortho_z,
            }),
            ParticleVelocityType::Spherical => Some(EmissionVelocity::Spherical {
                speed: self.vel_spherical,
            }),
            ParticleVelocityType::Hemispherical => Some(EmissionVelocity::Hemispherical {
                speed: self.vel_hemispherical,
            }),
            ParticleVelocityType::Cylindrical => Some(EmissionVelocity::Cylindrical {
                radial: self.vel_cylindrical_radial,
                normal: self.vel_cylindrical_normal,
            }),
            ParticleVelocityType::Outward => Some(EmissionVelocity::Outward {
                speed: self.vel_outward,
                other_speed: self.vel_outward_other,
            }),
        }
    }

    fn emission_volume(&self) -> Option<EmissionVolume> {
        let is_hollow = self.is_hollow;
        match self.volume_type {
            ParticleVolumeType::None => None,
            ParticleVolumeType::Point => Some(EmissionVolume::Point { is_hollow }),
            ParticleVolumeType::Line => Some(EmissionVolume::Line {
                start_point: self.vol_line_start,
                end_point: self.vol_line_end,
                is_hollow,
            }),
            ParticleVolumeType::Box => Some(EmissionVolume::Box {
                half_size: self.vol_box_half_size,
                is_hollow,
            }),
            ParticleVolumeType::Sphere => Some(EmissionVolume::Sphere {
                radius: self.vol_sphere_radius,
                is_hollow,
            }),
            ParticleVolumeType::Cylinder => Some(EmissionVolume::Cylinder {
                radius: self.vol_cylinder_radius,
                length: self.vol_cylinder_length,
                offset: Vec3::ZERO,
                radius_rate: 0.0,
                is_hollow,
            }),
        }
    }

    /// Map onto the module based template shape
    pub fn to_fx_template(&self) -> FxParticleSystemTemplate {
        FxParticleSystemTemplate {
            name: self.name.clone(),
            priority: self.priority,
            is_one_shot: self.is_one_shot,
            shader: self.shader,
            kind: self.kind,
            particle_texture: self.particle.clone(),
            per_particle_attached_system: self.per_particle_attached_system.clone(),
            slave_system: self.slave_system.clone(),
            slave_pos_offset: self.slave_pos_offset,
            lifetime: self.lifetime,
            system_lifetime: self.system_lifetime,
            size: self.size,
            start_size_rate: self.start_size_rate,
            is_ground_aligned: self.is_ground_aligned,
            is_emit_above_ground_only: self.is_emit_above_ground_only,
            is_particle_up_towards_emitter: self.is_particle_up_towards_emitter,
            burst_delay: self.burst_delay,
            burst_count: self.burst_count,
            initial_delay: self.initial_delay,
            colors: Some(ColorModule::Default(DefaultColor {
                colors: self.colors,
                color_scale: self.color_scale,
            })),
            alpha: Some(AlphaModule::Default(DefaultAlpha {
                alphas: self.alphas,
            })),
            update: Some(UpdateModule::Default(DefaultUpdate {
                angle_z: self.angle_z,
                angular_rate_z: self.angular_rate_z,
                angular_damping: self.angular_damping,
                size_rate: self.size_rate,
                size_rate_damping: self.size_rate_damping,
                ..Default::default()
            })),
            physics: Some(PhysicsModule::Default(DefaultPhysics {
                gravity: self.gravity,
                velocity_damping: self.velocity_damping,
                drift_velocity: self.drift_velocity,
                ..Default::default()
            })),
            draw: Some(DrawModule::Default),
            wind: Some(WindModule::Default(DefaultWind {
                motion: self.wind_motion,
                strength: self.wind_strength,
                full_strength_distance: self.wind_full_strength_dist,
                zero_strength_distance: self.wind_zero_strength_dist,
                angle_change_min: self.wind_angle_change_min,
                angle_change_max: self.wind_angle_change_max,
                ping_pong_start_angle_min: self.wind_ping_pong_start_angle_min,
                ping_pong_start_angle_max: self.wind_ping_pong_start_angle_max,
                ping_pong_end_angle_min: self.wind_ping_pong_end_angle_min,
                ping_pong_end_angle_max: self.wind_ping_pong_end_angle_max,
                turbulence_amplitude: 0.0,
                turbulence_frequency: 0.0,
            })),
            emission_velocity: self.emission_velocity(),
            emission_volume: self.emission_volume(),
            ..FxParticleSystemTemplate::new(self.name.clone())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn legacy() -> ParticleSystemTemplate {
        ParticleSystemTemplate {
            shader: ParticleSystemShader::Alpha,
            particle: Some("EXDust.tga".to_string()),
            gravity: -0.2,
            velocity_damping: RandomVariable::new(0.9, 0.95),
            drift_velocity: Vec3::new(0.0, 0.0, 0.5),
            angle_z: RandomVariable::new(0.0, 6.0),
            size_rate: RandomVariable::new(0.5, 0.5),
            wind_motion: WindMotion::PingPong,
            wind_angle_change_min: 0.1,
            ..ParticleSystemTemplate::new("DustPuff")
        }
    }

    #[test]
    fn test_plain_fields() {
        let fx = legacy().to_fx_template();
        assert_eq!(fx.name, "DustPuff");
        assert_eq!(fx.shader, ParticleSystemShader::Alpha);
        assert_eq!(fx.particle_texture.as_deref(), Some("EXDust.tga"));
        assert_eq!(fx.draw, Some(DrawModule::Default));
    }

    #[test]
    fn test_none_types_map_to_absent_modules() {
        let fx = legacy().to_fx_template();
        assert_eq!(fx.emission_velocity, None);
        assert_eq!(fx.emission_volume, None);
    }

    #[test]
    fn test_velocity_and_volume_mapping() {
        let mut template = legacy();
        template.velocity_type = ParticleVelocityType::Cylindrical;
        template.vel_cylindrical_radial = RandomVariable::new(1.0, 2.0);
        template.vel_cylindrical_normal = RandomVariable::new(3.0, 4.0);
        template.volume_type = ParticleVolumeType::Sphere;
        template.vol_sphere_radius = 7.5;
        template.is_hollow = true;

        let fx = template.to_fx_template();
        assert_eq!(
            fx.emission_velocity,
            Some(EmissionVelocity::Cylindrical {
                radial: RandomVariable::new(1.0, 2.0),
                normal: RandomVariable::new(3.0, 4.0),
            })
        );
        assert_eq!(
            fx.emission_volume,
            Some(EmissionVolume::Sphere {
                radius: 7.5,
                is_hollow: true
            })
        );
    }

    #[test]
    fn test_hollow_flag_for_every_volume() {
        for volume_type in [
            ParticleVolumeType::Point,
            ParticleVolumeType::Line,
            ParticleVolumeType::Box,
            ParticleVolumeType::Sphere,
            ParticleVolumeType::Cylinder,
        ] {
            let mut template = legacy();
            template.volume_type = volume_type;
            template.is_hollow = true;
            let volume = template.to_fx_template().emission_volume.unwrap();
            assert!(volume.is_hollow());
            assert_eq!(volume.volume_type(), Some(volume_type));
        }
    }

    #[test]
    fn test_update_physics_and_wind() {
        let fx = legacy().to_fx_template();
        let update = fx.update_parameters();
        assert_eq!(update.angle_z, RandomVariable::new(0.0, 6.0));
        assert_eq!(update.size_rate, RandomVariable::new(0.5, 0.5));

        let physics = fx.physics.unwrap();
        assert_eq!(physics.gravity(), -0.2);
        assert_eq!(physics.drift_velocity(), Vec3::new(0.0, 0.0, 0.5));
        assert_eq!(physics.velocity_damping(), RandomVariable::new(0.9, 0.95));

        let wind = fx.wind.unwrap();
        assert_eq!(wind.wind().motion, WindMotion::PingPong);
        assert_eq!(wind.wind().angle_change_min, 0.1);
        assert_eq!(wind.wind().turbulence_amplitude, 0.0);
    }
}
