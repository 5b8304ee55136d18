//! Template copy stored with every saved particle system
//!
//! The block mirrors the legacy flat template. Only the shader and type are
//! checked against the bound template when loading; everything else is read
//! and dropped, apart from the fields kept in [`SnapshotUnknowns`].

use glam::Vec3;
use log::debug;
use sage_state::StatePersister;

use crate::error::{FxError, Result};
use crate::keyframe::{RandomAlphaKeyframe, RgbColorKeyframe};
use crate::particles::emission::{EmissionVelocity, EmissionVolume};
use crate::random::RandomVariable;
use crate::template::{
    FxParticleSystemTemplate, ParticleVelocityType, ParticleVolumeType, UpdateModule, WindMotion,
};

/// Template block fields with no template counterpart
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SnapshotUnknowns {
    pub velocity_unknown: u32,
    pub volume_unknown: u32,
    pub wind_unknown12: f32,
    /// Close to the minimum wind angle change in observed saves
    pub wind_unknown13: f32,
    pub wind_unknown14: f32,
    pub wind_unknown15: f32,
    pub trailing: bool,
}

fn persist_random<P: StatePersister>(
    persister: &mut P,
    name: &str,
    value: RandomVariable,
) -> Result<()> {
    let mut value = value;
    persister.persist_object(name, &mut value)?;
    Ok(())
}

/// Persist the template block for `template`
pub(crate) fn persist_template_block<P: StatePersister>(
    persister: &mut P,
    template: &FxParticleSystemTemplate,
    unknowns: &mut SnapshotUnknowns,
) -> Result<()> {
    persister.persist_version("TemplateData", 1)?;

    let mut is_one_shot = template.is_one_shot;
    persister.persist_bool("IsOneShot", &mut is_one_shot)?;

    let mut shader = template.shader;
    persister.persist_enum("Shader", &mut shader)?;
    if shader != template.shader {
        return Err(FxError::TemplateMismatch {
            template: template.name.clone(),
            field: "shader",
        });
    }

    let mut kind = template.kind;
    persister.persist_enum("Type", &mut kind)?;
    if kind != template.kind {
        return Err(FxError::TemplateMismatch {
            template: template.name.clone(),
            field: "type",
        });
    }

    let mut texture = template.particle_texture.clone().unwrap_or_default();
    persister.persist_ascii_string("Texture", &mut texture)?;
    if persister.is_reading() && Some(&texture) != template.particle_texture.as_ref() {
        debug!(
            "Saved texture '{}' differs from template '{}'",
            texture, template.name
        );
    }

    let update = template.update_parameters();
    let render_object = match &template.update {
        Some(UpdateModule::RenderObject(update)) => Some(update),
        _ => None,
    };
    let physics = template.physics.as_ref();

    persist_random(persister, "AngleX", render_object.map(|u| u.angle_x).unwrap_or_default())?;
    persist_random(persister, "AngleY", render_object.map(|u| u.angle_y).unwrap_or_default())?;
    persist_random(persister, "AngleZ", update.angle_z)?;
    persist_random(
        persister,
        "AngularRateX",
        render_object.map(|u| u.angular_rate_x).unwrap_or_default(),
    )?;
    persist_random(
        persister,
        "AngularRateY",
        render_object.map(|u| u.angular_rate_y).unwrap_or_default(),
    )?;
    persist_random(persister, "AngularRateZ", update.angular_rate_z)?;
    persist_random(persister, "AngularDamping", update.angular_damping)?;
    persist_random(
        persister,
        "VelocityDamping",
        physics.map(|p| p.velocity_damping()).unwrap_or_default(),
    )?;
    persist_random(persister, "Lifetime", template.lifetime)?;

    let mut system_lifetime = template.system_lifetime;
    persister.persist_u32("SystemLifetime", &mut system_lifetime)?;

    persist_random(persister, "Size", template.size)?;
    persist_random(persister, "StartSizeRate", template.start_size_rate)?;
    persist_random(persister, "SizeRate", update.size_rate)?;
    persist_random(persister, "SizeRateDamping", update.size_rate_damping)?;

    for i in 0..crate::keyframe::MAX_KEYFRAMES {
        let mut keyframe: RandomAlphaKeyframe = template
            .alpha
            .as_ref()
            .and_then(|alpha| alpha.alphas()[i])
            .unwrap_or_default();
        persister.persist_object("AlphaKeyframe", &mut keyframe)?;
    }
    for i in 0..crate::keyframe::MAX_KEYFRAMES {
        let mut keyframe: RgbColorKeyframe = template
            .colors
            .as_ref()
            .and_then(|colors| colors.colors()[i])
            .unwrap_or_default();
        persister.persist_object("ColorKeyframe", &mut keyframe)?;
    }

    persist_random(persister, "ColorScale", template.color_scale())?;
    persist_random(persister, "BurstDelay", template.burst_delay)?;
    persist_random(persister, "BurstCount", template.burst_count)?;
    persist_random(persister, "InitialDelay", template.initial_delay)?;

    let mut drift_velocity = physics.map(|p| p.drift_velocity()).unwrap_or(Vec3::ZERO);
    persister.persist_vec3("DriftVelocity", &mut drift_velocity)?;
    let mut gravity = physics.map(|p| p.gravity()).unwrap_or_default();
    persister.persist_f32("Gravity", &mut gravity)?;

    let mut slave_system = template.slave_system.clone().unwrap_or_default();
    persister.persist_ascii_string("SlaveSystemName", &mut slave_system)?;
    persister.skip_unknown_bytes("TemplateData", 13)?;

    persist_velocity(persister, template.emission_velocity.as_ref(), unknowns)?;
    persist_volume(persister, template.emission_volume.as_ref())?;
    persister.persist_u32("UnknownVolume", &mut unknowns.volume_unknown)?;

    persist_wind(persister, template, unknowns)?;
    Ok(())
}

fn persist_velocity<P: StatePersister>(
    persister: &mut P,
    velocity: Option<&EmissionVelocity>,
    unknowns: &mut SnapshotUnknowns,
) -> Result<()> {
    let mut velocity_type = velocity
        .map(EmissionVelocity::velocity_type)
        .unwrap_or_default();
    persister.persist_enum("VelocityType", &mut velocity_type)?;
    persister.persist_u32("UnknownVelocity", &mut unknowns.velocity_unknown)?;

    let values = match velocity {
        Some(EmissionVelocity::Ortho { x, y, z }) => vec![*x, *y, *z],
        Some(EmissionVelocity::Spherical { speed })
        | Some(EmissionVelocity::Hemispherical { speed }) => vec![*speed],
        Some(EmissionVelocity::Cylindrical { radial, normal }) => vec![*radial, *normal],
        Some(EmissionVelocity::Outward { speed, other_speed }) => vec![*speed, *other_speed],
        None => Vec::new(),
    };

    let count = match velocity_type {
        ParticleVelocityType::None => 0,
        ParticleVelocityType::Spherical | ParticleVelocityType::Hemispherical => 1,
        ParticleVelocityType::Cylindrical | ParticleVelocityType::Outward => 2,
        ParticleVelocityType::Ortho => 3,
    };

    for i in 0..count {
        let value = values.get(i).copied().unwrap_or_default();
        persist_random(persister, "Velocity", value)?;
    }
    Ok(())
}

fn persist_volume<P: StatePersister>(
    persister: &mut P,
    volume: Option<&EmissionVolume>,
) -> Result<()> {
    let mut volume_type = volume
        .and_then(EmissionVolume::volume_type)
        .unwrap_or_default();
    persister.persist_enum("VolumeType", &mut volume_type)?;

    match volume_type {
        ParticleVolumeType::None | ParticleVolumeType::Point => {}
        ParticleVolumeType::Line => {
            let (mut start, mut end) = match volume {
                Some(EmissionVolume::Line {
                    start_point,
                    end_point,
                    ..
                }) => (*start_point, *end_point),
                _ => (Vec3::ZERO, Vec3::ZERO),
            };
            persister.persist_vec3("LineStartPoint", &mut start)?;
            persister.persist_vec3("LineEndPoint", &mut end)?;
        }
        ParticleVolumeType::Box => {
            let mut half_size = match volume {
                Some(EmissionVolume::Box { half_size, .. }) => *half_size,
                _ => Vec3::ZERO,
            };
            persister.persist_vec3("HalfSize", &mut half_size)?;
        }
        ParticleVolumeType::Sphere => {
            let mut radius = match volume {
                Some(EmissionVolume::Sphere { radius, .. }) => *radius,
                _ => 0.0,
            };
            persister.persist_f32("SphereRadius", &mut radius)?;
        }
        ParticleVolumeType::Cylinder => {
            let (mut radius, mut length) = match volume {
                Some(EmissionVolume::Cylinder { radius, length, .. }) => (*radius, *length),
                _ => (0.0, 0.0),
            };
            persister.persist_f32("CylinderRadius", &mut radius)?;
            persister.persist_f32("CylinderLength", &mut length)?;
        }
    }
    Ok(())
}

fn persist_wind<P: StatePersister>(
    persister: &mut P,
    template: &FxParticleSystemTemplate,
    unknowns: &mut SnapshotUnknowns,
) -> Result<()> {
    let wind = template.wind.as_ref().map(|wind| wind.wind().clone());
    let wind = wind.unwrap_or_default();

    let mut motion: WindMotion = wind.motion;
    persister.persist_enum("WindMotion", &mut motion)?;

    let mut angle_change_min = wind.angle_change_min;
    let mut angle_change_max = wind.angle_change_max;
    let mut start_min = wind.ping_pong_start_angle_min;
    let mut start_max = wind.ping_pong_start_angle_max;
    let mut end_min = wind.ping_pong_end_angle_min;
    let mut end_max = wind.ping_pong_end_angle_max;

    persister.persist_f32("Unknown12", &mut unknowns.wind_unknown12)?;
    persister.persist_f32("Unknown13", &mut unknowns.wind_unknown13)?;
    persister.persist_f32("WindAngleChangeMin", &mut angle_change_min)?;
    persister.persist_f32("WindAngleChangeMax", &mut angle_change_max)?;
    persister.persist_f32("Unknown14", &mut unknowns.wind_unknown14)?;
    persister.persist_f32("WindPingPongStartAngleMin", &mut start_min)?;
    persister.persist_f32("WindPingPongStartAngleMax", &mut start_max)?;
    persister.persist_f32("Unknown15", &mut unknowns.wind_unknown15)?;
    persister.persist_f32("WindPingPongEndAngleMin", &mut end_min)?;
    persister.persist_f32("WindPingPongEndAngleMax", &mut end_max)?;
    persister.persist_bool("Unknown16", &mut unknowns.trailing)?;
    Ok(())
}
