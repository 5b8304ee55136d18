//! Save blocks of whole particle systems

use std::sync::Arc;

use pretty_assertions::assert_eq;
use sage_fx::{
    FxError, ParticleRng, ParticleSystemShader, ParticleSystemState, ParticleTemplateSet,
};
use sage_state::StateError;

use crate::common::{active_system, fountain, load_bytes, save_bytes, smoke, template_set, tick_n};

#[test]
fn test_round_trip_restores_every_particle() {
    let mut rng = ParticleRng::new(42);
    let mut system = active_system(smoke(), &mut rng);
    tick_n(&mut system, &mut rng, 25);

    let bytes = save_bytes(&mut system);
    let restored = load_bytes(&bytes, &template_set()).expect("Failed to load particle system");

    assert_eq!(restored.name(), "Smoke");
    assert_eq!(restored.state(), ParticleSystemState::Active);
    assert_eq!(restored.timer(), system.timer());
    assert_eq!(restored.particle_count(), system.particle_count());
    assert_eq!(restored.particles(), system.particles());
    assert_eq!(restored.header(), system.header());

    for (slot, particle) in restored.particles().iter().enumerate() {
        let vertex = restored.vertices()[slot * 4];
        let expected = if particle.dead { 0.0 } else { particle.size };
        assert_eq!(vertex.size, expected);
    }
}

#[test]
fn test_resave_is_byte_exact() {
    let mut rng = ParticleRng::new(7);
    let mut system = active_system(smoke(), &mut rng);
    tick_n(&mut system, &mut rng, 12);

    let bytes = save_bytes(&mut system);
    let mut restored = load_bytes(&bytes, &template_set()).expect("Failed to load particle system");

    assert_eq!(save_bytes(&mut restored), bytes);
}

#[test]
fn test_dead_list_rebuilt_in_slot_order() {
    let mut rng = ParticleRng::new(3);
    let mut system = active_system(fountain(), &mut rng);
    tick_n(&mut system, &mut rng, 4);

    let bytes = save_bytes(&mut system);
    let restored = load_bytes(&bytes, &template_set()).expect("Failed to load particle system");

    let dead: Vec<usize> = restored.dead_slots().collect();
    assert_eq!(dead, (12..33).collect::<Vec<_>>());
}

#[test]
fn test_restored_system_keeps_simulating() {
    let mut rng = ParticleRng::new(11);
    let mut system = active_system(fountain(), &mut rng);
    tick_n(&mut system, &mut rng, 5);

    let bytes = save_bytes(&mut system);
    let mut restored = load_bytes(&bytes, &template_set()).expect("Failed to load particle system");

    let mut other_rng = ParticleRng::new(11);
    tick_n(&mut system, &mut rng, 10);
    tick_n(&mut restored, &mut other_rng, 10);

    // The fountain draws nothing random, so both continue identically
    assert_eq!(restored.particles(), system.particles());
}

#[test]
fn test_particle_count_follows_master_system_id() {
    let mut rng = ParticleRng::new(5);
    let mut system = active_system(smoke(), &mut rng);
    tick_n(&mut system, &mut rng, 3);
    system.header_mut().master_system_id = 0xDEAD_BEEF;

    let bytes = save_bytes(&mut system);
    let marker = 0xDEAD_BEEFu32.to_le_bytes();
    let offset = bytes
        .windows(4)
        .position(|window| window == marker)
        .expect("Master system id not written")
        + 4;
    let count = u32::from_le_bytes(bytes[offset..offset + 4].try_into().unwrap());

    assert_eq!(count as usize, system.capacity());
}

#[test]
fn test_progress_kept_in_header_slots() {
    let mut rng = ParticleRng::new(5);
    let mut system = active_system(smoke(), &mut rng);
    tick_n(&mut system, &mut rng, 7);
    save_bytes(&mut system);

    let header = system.header();
    assert_eq!(header.unknown_ints[1], 7);
    assert_eq!(header.unknown_ints[3], 1);
    assert_eq!(f32::from_bits(header.unknown_ints[4]), 0.1);
}

#[test]
fn test_restored_system_matches_uninterrupted_run() {
    let mut rng = ParticleRng::new(21);
    let mut system = active_system(smoke(), &mut rng);
    tick_n(&mut system, &mut rng, 8);

    let bytes = save_bytes(&mut system);
    let mut restored = load_bytes(&bytes, &template_set()).expect("Failed to load particle system");

    // Smoke draws on every burst, so any shift in the stream shows up
    let mut other_rng = rng.clone();
    tick_n(&mut system, &mut rng, 20);
    tick_n(&mut restored, &mut other_rng, 20);

    assert_eq!(restored.particles(), system.particles());
    assert_eq!(restored.timer(), system.timer());
}

#[test]
fn test_unknown_template_name() {
    let mut rng = ParticleRng::new(1);
    let mut system = active_system(fountain(), &mut rng);
    let bytes = save_bytes(&mut system);

    let result = load_bytes(&bytes, &ParticleTemplateSet::new());
    assert!(matches!(result, Err(FxError::TemplateNotFound(name)) if name == "Fountain"));
}

#[test]
fn test_shader_mismatch() {
    let mut rng = ParticleRng::new(1);
    let mut system = active_system(fountain(), &mut rng);
    let bytes = save_bytes(&mut system);

    let mut changed = fountain();
    changed.shader = ParticleSystemShader::Alpha;
    let store: ParticleTemplateSet = [changed].into_iter().collect();

    let result = load_bytes(&bytes, &store);
    assert!(matches!(
        result,
        Err(FxError::TemplateMismatch { field: "shader", .. })
    ));
}

#[test]
fn test_capacity_mismatch() {
    let mut rng = ParticleRng::new(1);
    let mut system = active_system(fountain(), &mut rng);
    let bytes = save_bytes(&mut system);

    let mut bigger = fountain();
    bigger.burst_count = crate::common::fixed(4.0);
    let store: ParticleTemplateSet = [bigger].into_iter().collect();

    let result = load_bytes(&bytes, &store);
    assert!(matches!(
        result,
        Err(FxError::CapacityMismatch {
            saved: 33,
            capacity: 44,
            ..
        })
    ));
}

#[test]
fn test_future_version_rejected() {
    let mut rng = ParticleRng::new(1);
    let mut system = active_system(fountain(), &mut rng);
    let mut bytes = save_bytes(&mut system);
    bytes[0] = 2;

    let result = load_bytes(&bytes, &template_set());
    assert!(matches!(
        result,
        Err(FxError::State(StateError::InvalidVersion {
            found: 2,
            maximum: 1,
            ..
        }))
    ));
}

#[test]
fn test_truncated_stream() {
    let mut rng = ParticleRng::new(1);
    let mut system = active_system(fountain(), &mut rng);
    let bytes = save_bytes(&mut system);

    let result = load_bytes(&bytes[..bytes.len() - 10], &template_set());
    assert!(matches!(result, Err(FxError::State(StateError::Io(_)))));
}

#[test]
fn test_inert_system_round_trip() {
    let mut template = fountain();
    template.particle_texture = None;
    let store: ParticleTemplateSet = [template.clone()].into_iter().collect();

    let mut rng = ParticleRng::new(1);
    let mut system = sage_fx::ParticleSystem::new(
        Arc::new(template),
        sage_fx::Placement::default(),
        &mut rng,
    )
    .expect("Failed to create particle system");
    system.activate();
    tick_n(&mut system, &mut rng, 3);

    let bytes = save_bytes(&mut system);
    let restored = load_bytes(&bytes, &store).expect("Failed to load particle system");
    assert!(restored.is_inert());
    assert_eq!(restored.timer(), 3);
    assert_eq!(restored.state(), ParticleSystemState::Active);
}
