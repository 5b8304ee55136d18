//! Shared templates and helpers

#![allow(dead_code)]

use std::io::Cursor;
use std::sync::Arc;

use glam::Vec3;
use sage_fx::keyframe::MAX_KEYFRAMES;
use sage_fx::template::{
    AlphaModule, ColorModule, DefaultAlpha, DefaultColor, DefaultPhysics, DefaultUpdate,
    PhysicsModule, UpdateModule,
};
use sage_fx::{
    EmissionVelocity, EmissionVolume, FxParticleSystemTemplate, ParticleRng, ParticleSystem,
    ParticleTemplateSet, Placement, RandomAlphaKeyframe, RandomVariable, RgbColorKeyframe,
};
use sage_state::{StateReader, StateWriter};

/// Route `log` output through the test harness; set `RUST_LOG` to see it
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub fn fixed(value: f32) -> RandomVariable {
    RandomVariable::new(value, value)
}

/// Three motionless particles per tick from a point, ten ticks each
pub fn fountain() -> FxParticleSystemTemplate {
    FxParticleSystemTemplate {
        particle_texture: Some("EXSpark.tga".to_string()),
        burst_count: fixed(3.0),
        burst_delay: fixed(0.0),
        lifetime: fixed(10.0),
        system_lifetime: 0,
        emission_volume: Some(EmissionVolume::Point { is_hollow: false }),
        emission_velocity: Some(EmissionVelocity::Ortho {
            x: fixed(0.0),
            y: fixed(0.0),
            z: fixed(0.0),
        }),
        ..FxParticleSystemTemplate::new("Fountain")
    }
}

/// A template that uses every module the simulation reads
pub fn smoke() -> FxParticleSystemTemplate {
    let mut alphas: [Option<RandomAlphaKeyframe>; MAX_KEYFRAMES] = Default::default();
    alphas[0] = Some(RandomAlphaKeyframe {
        value: RandomVariable::new(0.0, 0.2),
        time: 0,
    });
    alphas[1] = Some(RandomAlphaKeyframe {
        value: RandomVariable::new(0.8, 1.0),
        time: 10,
    });
    alphas[2] = Some(RandomAlphaKeyframe {
        value: fixed(0.0),
        time: 40,
    });

    let mut colors: [Option<RgbColorKeyframe>; MAX_KEYFRAMES] = Default::default();
    colors[0] = Some(RgbColorKeyframe {
        color: Vec3::new(0.4, 0.4, 0.4),
        time: 0,
    });
    colors[1] = Some(RgbColorKeyframe {
        color: Vec3::new(0.1, 0.1, 0.1),
        time: 30,
    });

    FxParticleSystemTemplate {
        particle_texture: Some("EXSmokNew1.tga".to_string()),
        burst_count: RandomVariable::new(1.0, 2.0),
        burst_delay: RandomVariable::new(1.0, 3.0),
        lifetime: RandomVariable::new(30.0, 40.0),
        size: RandomVariable::new(1.0, 2.0),
        start_size_rate: fixed(0.1),
        colors: Some(ColorModule::Default(DefaultColor {
            colors,
            color_scale: RandomVariable::new(-2.0, 2.0),
        })),
        alpha: Some(AlphaModule::Default(DefaultAlpha { alphas })),
        update: Some(UpdateModule::Default(DefaultUpdate {
            size_rate: RandomVariable::new(0.1, 0.2),
            size_rate_damping: fixed(0.98),
            angle_z: RandomVariable::new(0.0, 6.28),
            angular_rate_z: RandomVariable::new(-0.05, 0.05),
            angular_damping: fixed(0.99),
            ..Default::default()
        })),
        physics: Some(PhysicsModule::Default(DefaultPhysics {
            gravity: 0.01,
            velocity_damping: RandomVariable::new(0.95, 0.98),
            drift_velocity: Vec3::new(0.1, 0.0, 0.0),
            ..Default::default()
        })),
        emission_volume: Some(EmissionVolume::Cylinder {
            radius: 4.0,
            length: 2.0,
            offset: Vec3::ZERO,
            radius_rate: 0.0,
            is_hollow: false,
        }),
        emission_velocity: Some(EmissionVelocity::Outward {
            speed: RandomVariable::new(0.2, 0.5),
            other_speed: RandomVariable::new(0.5, 1.0),
        }),
        ..FxParticleSystemTemplate::new("Smoke")
    }
}

pub fn template_set() -> ParticleTemplateSet {
    [fountain(), smoke()].into_iter().collect()
}

pub fn active_system(template: FxParticleSystemTemplate, rng: &mut ParticleRng) -> ParticleSystem {
    init_logging();
    let mut system = ParticleSystem::new(Arc::new(template), Placement::default(), rng)
        .expect("Failed to create particle system");
    system.activate();
    system
}

pub fn tick_n(system: &mut ParticleSystem, rng: &mut ParticleRng, ticks: usize) {
    for _ in 0..ticks {
        system.tick(rng).expect("Tick failed");
    }
}

pub fn save_bytes(system: &mut ParticleSystem) -> Vec<u8> {
    let mut writer = StateWriter::new(Vec::new());
    system.save(&mut writer).expect("Failed to save particle system");
    writer.into_inner()
}

pub fn load_bytes(bytes: &[u8], store: &ParticleTemplateSet) -> sage_fx::Result<ParticleSystem> {
    let mut reader = StateReader::new(Cursor::new(bytes));
    ParticleSystem::load(&mut reader, store, Placement::default())
}
