//! Legacy templates driven through the full simulation

use glam::Vec3;
use pretty_assertions::assert_eq;
use sage_fx::template::{ParticleVelocityType, ParticleVolumeType};
use sage_fx::{ParticleRng, ParticleSystemTemplate, ParticleTemplateSet, RandomVariable};

use crate::common::{active_system, fixed, load_bytes, save_bytes, tick_n};

fn spray() -> ParticleSystemTemplate {
    ParticleSystemTemplate {
        particle: Some("EXWater.tga".to_string()),
        burst_count: fixed(2.0),
        lifetime: fixed(20.0),
        velocity_damping: fixed(1.0),
        velocity_type: ParticleVelocityType::Ortho,
        vel_ortho_x: fixed(0.0),
        vel_ortho_y: fixed(0.0),
        vel_ortho_z: fixed(1.0),
        volume_type: ParticleVolumeType::Line,
        vol_line_start: Vec3::ZERO,
        vol_line_end: Vec3::new(10.0, 0.0, 0.0),
        size: RandomVariable::new(1.0, 3.0),
        ..ParticleSystemTemplate::new("WaterSpray")
    }
}

#[test]
fn test_converted_template_simulates() {
    let mut rng = ParticleRng::new(5);
    let mut system = active_system(spray().to_fx_template(), &mut rng);
    tick_n(&mut system, &mut rng, 4);

    assert_eq!(system.particle_count(), 8);
    for particle in system.live_particles() {
        assert!((0.0..10.0).contains(&particle.emitter_position.x));
        assert_eq!(particle.emitter_position.y, 0.0);
        assert_eq!(particle.velocity, Vec3::Z);
        assert_eq!(
            particle.position.z,
            particle.timer as f32,
            "one unit per tick with no damping"
        );
        assert!((1.0..=3.0).contains(&particle.size));
    }
}

#[test]
fn test_converted_template_persists() {
    let fx = spray().to_fx_template();
    let store: ParticleTemplateSet = [fx.clone()].into_iter().collect();

    let mut rng = ParticleRng::new(8);
    let mut system = active_system(fx, &mut rng);
    tick_n(&mut system, &mut rng, 6);

    let bytes = save_bytes(&mut system);
    let restored = load_bytes(&bytes, &store).expect("Failed to load particle system");
    assert_eq!(restored.particles(), system.particles());
}
