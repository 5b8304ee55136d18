//! A point fountain emitting three motionless particles every tick

use glam::Vec3;
use pretty_assertions::assert_eq;
use sage_fx::{ParticleRng, ParticleSystemState};

use crate::common::{active_system, fountain, tick_n};

#[test]
fn test_first_tick_spawns_one_burst() {
    let mut rng = ParticleRng::new(1);
    let mut system = active_system(fountain(), &mut rng);
    tick_n(&mut system, &mut rng, 1);

    assert_eq!(system.particle_count(), 3);
    for particle in system.live_particles() {
        assert_eq!(particle.position, Vec3::ZERO);
        assert_eq!(particle.velocity, Vec3::ZERO);
        assert_eq!(particle.timer, 1);
    }
}

#[test]
fn test_first_burst_replaced_after_its_lifetime() {
    let mut rng = ParticleRng::new(1);
    let mut system = active_system(fountain(), &mut rng);
    tick_n(&mut system, &mut rng, 1);
    let first: Vec<usize> = (0..3).collect();

    // Lifetime 10: alive while the age pass sees timer <= 10
    tick_n(&mut system, &mut rng, 10);
    for &slot in &first {
        assert_eq!(system.particles()[slot].timer, 11);
        assert!(system.particles()[slot].is_alive());
    }

    tick_n(&mut system, &mut rng, 1);
    assert_eq!(system.state(), ParticleSystemState::Active);
    assert_eq!(system.particle_count(), system.capacity());
    for &slot in &first {
        let particle = &system.particles()[slot];
        assert_eq!(particle.timer, 1, "slot {slot} holds a fresh particle");
        assert_eq!(particle.position, Vec3::ZERO);
    }
}

#[test]
fn test_steady_state_reuses_slots() {
    let mut rng = ParticleRng::new(1);
    let mut system = active_system(fountain(), &mut rng);
    tick_n(&mut system, &mut rng, 200);

    assert_eq!(system.particle_count(), 33);
    let mut timers: Vec<u32> = system.live_particles().map(|p| p.timer).collect();
    timers.sort_unstable();
    let expected: Vec<u32> = (1..=11).flat_map(|t| [t, t, t]).collect();
    assert_eq!(timers, expected);
}

#[test]
fn test_deactivated_fountain_drains() {
    let mut rng = ParticleRng::new(1);
    let mut system = active_system(fountain(), &mut rng);
    tick_n(&mut system, &mut rng, 5);

    system.deactivate();
    tick_n(&mut system, &mut rng, 6);
    assert_eq!(system.particle_count(), 15);

    // One burst expires per tick from here on
    let counts: Vec<usize> = (0..5)
        .map(|_| {
            tick_n(&mut system, &mut rng, 1);
            system.particle_count()
        })
        .collect();
    assert_eq!(counts, vec![12, 9, 6, 3, 0]);
    assert_eq!(system.state(), ParticleSystemState::Inactive);
}
