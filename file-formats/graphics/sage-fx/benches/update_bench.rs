//! particle system tick benchmarks

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use glam::Vec3;
use std::hint::black_box;
use std::sync::Arc;
use std::time::Duration;
use sage_fx::template::{DefaultPhysics, PhysicsModule};
use sage_fx::{
    EmissionVelocity, EmissionVolume, FxParticleSystemTemplate, ParticleRng, ParticleSystem,
    ParticleSystemManager, Placement, RandomVariable, TICK_DURATION,
};

fn template(burst_count: f32) -> FxParticleSystemTemplate {
    FxParticleSystemTemplate {
        particle_texture: Some("EXSpark.tga".to_string()),
        burst_count: RandomVariable::new(burst_count, burst_count),
        lifetime: RandomVariable::new(20.0, 60.0),
        size: RandomVariable::new(0.5, 2.0),
        physics: Some(PhysicsModule::Default(DefaultPhysics {
            gravity: -0.05,
            velocity_damping: RandomVariable::new(0.95, 0.99),
            drift_velocity: Vec3::new(0.02, 0.0, 0.0),
            ..Default::default()
        })),
        emission_volume: Some(EmissionVolume::Sphere {
            radius: 5.0,
            is_hollow: false,
        }),
        emission_velocity: Some(EmissionVelocity::Spherical {
            speed: RandomVariable::new(0.5, 2.0),
        }),
        ..FxParticleSystemTemplate::new("Bench")
    }
}

fn bench_tick(c: &mut Criterion) {
    let mut group = c.benchmark_group("tick");

    for burst_count in [1.0, 10.0, 50.0] {
        let mut rng = ParticleRng::new(1);
        let mut system =
            ParticleSystem::new(Arc::new(template(burst_count)), Placement::default(), &mut rng)
                .expect("Failed to create particle system");
        system.activate();
        // Warm up to a full pool
        for _ in 0..64 {
            system.tick(&mut rng).expect("Tick failed");
        }

        group.bench_with_input(
            BenchmarkId::from_parameter(system.capacity()),
            &burst_count,
            |b, _| {
                b.iter(|| black_box(system.tick(&mut rng).expect("Tick failed")));
            },
        );
    }

    group.finish();
}

fn bench_manager_frame(c: &mut Criterion) {
    let mut manager = ParticleSystemManager::default();
    let template = Arc::new(template(10.0));
    for _ in 0..16 {
        let id = manager
            .create(template.clone(), Placement::default())
            .expect("Failed to create particle system");
        if let Some(system) = manager.get_mut(id) {
            system.activate();
        }
    }

    let mut now = Duration::ZERO;
    c.bench_function("manager_frame_16_systems", |b| {
        b.iter(|| {
            now += TICK_DURATION;
            manager.update(black_box(now)).expect("Update failed");
        });
    });
}

criterion_group!(benches, bench_tick, bench_manager_frame);
criterion_main!(benches);
