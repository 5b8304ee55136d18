//! Individual particle representation

use glam::Vec3;
use log::debug;
use sage_state::StatePersister;

use crate::keyframe::{MAX_KEYFRAMES, ParticleAlphaKeyframe, ParticleColorKeyframe};

/// Persisted particle fields this engine does not simulate.
///
/// They are carried so that a loaded particle writes back the same bytes.
#[derive(Debug, Clone, PartialEq)]
pub struct ParticleUnknowns {
    /// Always zero for sprite particles
    pub angle_x: f32,
    pub angle_y: f32,
    pub angular_rate_x: f32,
    pub angular_rate_y: f32,
    pub is_particle_up_towards_emitter: bool,
    pub wind_randomness: f32,
    /// Observed 0
    pub unknown_int1: u32,
    /// Creation stamp, observed 0
    pub unknown_int2: u32,
    /// Alpha target key, observed 1
    pub unknown_int3: u32,
    /// Color target key, observed 1
    pub unknown_int4: u32,
    /// Drawable id, observed 0
    pub unknown_int5: u32,
    /// Controlled system id, observed 0
    pub unknown_int6: u32,
}

impl Default for ParticleUnknowns {
    fn default() -> Self {
        Self {
            angle_x: 0.0,
            angle_y: 0.0,
            angular_rate_x: 0.0,
            angular_rate_y: 0.0,
            is_particle_up_towards_emitter: false,
            wind_randomness: 0.0,
            unknown_int1: 0,
            unknown_int2: 0,
            unknown_int3: 1,
            unknown_int4: 1,
            unknown_int5: 0,
            unknown_int6: 0,
        }
    }
}

/// A single particle slot of a particle system
#[derive(Debug, Clone, PartialEq)]
pub struct Particle {
    /// Ticks since spawn
    pub timer: u32,
    /// Ticks the particle survives
    pub lifetime: u32,
    pub position: Vec3,
    pub velocity: Vec3,
    /// Spawn position within the emission volume
    pub emitter_position: Vec3,
    pub velocity_damping: f32,
    pub size: f32,
    pub size_rate: f32,
    pub size_rate_damping: f32,
    pub angle_z: f32,
    pub angular_rate_z: f32,
    pub angular_damping: f32,
    /// Resolved RGB color
    pub color: Vec3,
    pub color_scale: f32,
    pub alpha: f32,
    /// Alpha track sampled at spawn
    pub alpha_keyframes: Vec<ParticleAlphaKeyframe>,
    pub dead: bool,
    pub unknowns: ParticleUnknowns,
}

impl Default for Particle {
    fn default() -> Self {
        Self {
            timer: 0,
            lifetime: 0,
            position: Vec3::ZERO,
            velocity: Vec3::ZERO,
            emitter_position: Vec3::ZERO,
            velocity_damping: 0.0,
            size: 0.0,
            size_rate: 0.0,
            size_rate_damping: 0.0,
            angle_z: 0.0,
            angular_rate_z: 0.0,
            angular_damping: 0.0,
            color: Vec3::ZERO,
            color_scale: 0.0,
            alpha: 0.0,
            alpha_keyframes: Vec::with_capacity(MAX_KEYFRAMES),
            dead: true,
            unknowns: ParticleUnknowns::default(),
        }
    }
}

impl Particle {
    /// An unused slot
    pub fn dead() -> Self {
        Self::default()
    }

    /// Check if the particle is still alive
    #[inline]
    pub fn is_alive(&self) -> bool {
        !self.dead
    }

    /// Whether the age pass retires this particle
    #[inline]
    pub fn is_expired(&self) -> bool {
        self.timer > self.lifetime
    }

    /// Persist the particle layout.
    ///
    /// The system's shared color track is written with every particle. When
    /// reading, the stored copy is discarded in favor of `color_track`.
    pub fn persist<P: StatePersister>(
        &mut self,
        persister: &mut P,
        color_track: &[ParticleColorKeyframe],
    ) -> sage_state::Result<()> {
        persister.persist_version("Particle", 1)?;

        persister.persist_vec3("Velocity", &mut self.velocity)?;
        persister.persist_vec3("Position", &mut self.position)?;
        persister.persist_vec3("EmitterPosition", &mut self.emitter_position)?;
        persister.persist_f32("VelocityDamping", &mut self.velocity_damping)?;

        persister.persist_f32("AngleX", &mut self.unknowns.angle_x)?;
        persister.persist_f32("AngleY", &mut self.unknowns.angle_y)?;
        persister.persist_f32("AngleZ", &mut self.angle_z)?;
        persister.persist_f32("AngularRateX", &mut self.unknowns.angular_rate_x)?;
        persister.persist_f32("AngularRateY", &mut self.unknowns.angular_rate_y)?;
        persister.persist_f32("AngularRateZ", &mut self.angular_rate_z)?;
        persister.persist_f32("AngularDamping", &mut self.angular_damping)?;

        persister.persist_u32("Lifetime", &mut self.lifetime)?;
        persister.persist_f32("Size", &mut self.size)?;
        persister.persist_f32("SizeRate", &mut self.size_rate)?;
        persister.persist_f32("SizeRateDamping", &mut self.size_rate_damping)?;

        self.persist_alpha_keyframes(persister)?;
        persist_color_keyframes(persister, color_track)?;

        persister.persist_f32("ColorScale", &mut self.color_scale)?;
        persister.persist_bool(
            "IsParticleUpTowardsEmitter",
            &mut self.unknowns.is_particle_up_towards_emitter,
        )?;
        persister.persist_f32("WindRandomness", &mut self.unknowns.wind_randomness)?;
        persister.persist_u32("UnknownInt1", &mut self.unknowns.unknown_int1)?;
        persister.skip_unknown_bytes("Acceleration", 12)?;
        persister.persist_u32("Timer", &mut self.timer)?;
        persister.persist_u32("UnknownInt2", &mut self.unknowns.unknown_int2)?;
        persister.persist_f32("Alpha", &mut self.alpha)?;
        persister.persist_u32("UnknownInt3", &mut self.unknowns.unknown_int3)?;
        persister.persist_vec3("Color", &mut self.color)?;
        persister.skip_unknown_bytes("ColorRate", 12)?;
        persister.persist_u32("UnknownInt4", &mut self.unknowns.unknown_int4)?;
        persister.persist_u32("UnknownInt5", &mut self.unknowns.unknown_int5)?;
        persister.persist_u32("UnknownInt6", &mut self.unknowns.unknown_int6)?;
        persister.persist_bool("Dead", &mut self.dead)
    }

    /// Eight `(alpha, time)` slots. On read, the track is the longest prefix
    /// with strictly increasing times; a lone all-zero slot is an empty track.
    fn persist_alpha_keyframes<P: StatePersister>(
        &mut self,
        persister: &mut P,
    ) -> sage_state::Result<()> {
        let mut slots = [ParticleAlphaKeyframe::default(); MAX_KEYFRAMES];
        for (slot, keyframe) in slots.iter_mut().zip(&self.alpha_keyframes) {
            *slot = *keyframe;
        }

        for slot in slots.iter_mut() {
            persister.persist_f32("AlphaKeyframeAlpha", &mut slot.alpha)?;
            persister.persist_u32("AlphaKeyframeTime", &mut slot.time)?;
        }

        if persister.is_reading() {
            let mut count = 1;
            while count < MAX_KEYFRAMES && slots[count].time > slots[count - 1].time {
                count += 1;
            }
            if count == 1 && slots[0] == ParticleAlphaKeyframe::default() {
                count = 0;
            }

            self.alpha_keyframes.clear();
            self.alpha_keyframes.extend_from_slice(&slots[..count]);
        }
        Ok(())
    }
}

fn persist_color_keyframes<P: StatePersister>(
    persister: &mut P,
    color_track: &[ParticleColorKeyframe],
) -> sage_state::Result<()> {
    let mut slots = [ParticleColorKeyframe::default(); MAX_KEYFRAMES];
    for (slot, keyframe) in slots.iter_mut().zip(color_track) {
        *slot = *keyframe;
    }

    let mut mismatch = false;
    for (i, slot) in slots.iter_mut().enumerate() {
        let expected = *slot;
        persister.persist_vec3("ColorKeyframeColor", &mut slot.color)?;
        persister.persist_u32("ColorKeyframeTime", &mut slot.time)?;
        mismatch |= *slot != expected && i < color_track.len();
    }

    if persister.is_reading() && mismatch {
        debug!("Saved particle color keyframes differ from the template track");
    }
    Ok(())
}
