//! Slot bookkeeping of the particle pool under arbitrary templates

use std::collections::HashSet;

use proptest::prelude::*;
use sage_fx::{
    EmissionVelocity, EmissionVolume, FxParticleSystemTemplate, ParticleRng, ParticleSystem,
    RandomVariable,
};

use crate::common::active_system;

fn template(
    burst_count: (u8, u8),
    burst_delay: (u8, u8),
    lifetime: (u8, u8),
    system_lifetime: u32,
) -> FxParticleSystemTemplate {
    let range = |(a, b): (u8, u8)| RandomVariable::new(f32::from(a.min(b)), f32::from(a.max(b)));
    FxParticleSystemTemplate {
        particle_texture: Some("EXSpark.tga".to_string()),
        burst_count: range(burst_count),
        burst_delay: range(burst_delay),
        lifetime: range(lifetime),
        system_lifetime,
        emission_volume: Some(EmissionVolume::Box {
            half_size: glam::Vec3::new(2.0, 2.0, 1.0),
            is_hollow: false,
        }),
        emission_velocity: Some(EmissionVelocity::Spherical {
            speed: RandomVariable::new(0.0, 1.0),
        }),
        ..FxParticleSystemTemplate::new("Random")
    }
}

fn assert_slots_partitioned(system: &ParticleSystem) {
    let dead: Vec<usize> = system.dead_slots().collect();
    let unique: HashSet<usize> = dead.iter().copied().collect();
    assert_eq!(unique.len(), dead.len(), "slot freed twice");

    for (slot, particle) in system.particles().iter().enumerate() {
        assert_eq!(
            unique.contains(&slot),
            particle.dead,
            "slot {slot} is both free and in use, or neither"
        );
    }

    let live = system.live_particles().count();
    assert_eq!(live + dead.len(), system.capacity());
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn pool_slots_stay_partitioned(
        burst_count in (0u8..6, 0u8..6),
        burst_delay in (0u8..4, 0u8..4),
        lifetime in (0u8..40, 0u8..40),
        system_lifetime in 0u32..60,
        seed in any::<u64>(),
        ticks in 1usize..120,
    ) {
        let template = template(burst_count, burst_delay, lifetime, system_lifetime);
        let capacity = template.max_particles();
        let mut rng = ParticleRng::new(seed);
        let mut system = active_system(template, &mut rng);

        for _ in 0..ticks {
            system.tick(&mut rng).expect("Tick failed");
            prop_assert!(system.particle_count() <= capacity);
            assert_slots_partitioned(&system);
        }
    }
}
