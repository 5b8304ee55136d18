//! Effects riding on a moving host

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::sync::Arc;
use std::time::Duration;

use glam::{Mat4, Vec3};
use sage_fx::{ParticleSystemManager, ParticleSystemState, TICK_DURATION};

use crate::common::{fountain, smoke};

#[test]
fn test_render_item_follows_bone() {
    let manager = Rc::new(RefCell::new(ParticleSystemManager::default()));
    let bone = Rc::new(Cell::new(Mat4::IDENTITY));

    let handle = ParticleSystemManager::attach(&manager, Arc::new(smoke()), bone.clone())
        .expect("Failed to attach particle system");

    let mut now = Duration::ZERO;
    for frame in 0..30 {
        bone.set(Mat4::from_translation(Vec3::new(frame as f32, 0.0, 0.0)));
        manager.borrow_mut().update(now).expect("Update failed");

        let manager = manager.borrow();
        let items: Vec<_> = manager.render_items().collect();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].texture, "EXSmokNew1.tga");
        assert_eq!(items[0].world_matrix.w_axis.x, frame as f32);
        now += TICK_DURATION;
    }

    assert!(manager.borrow().particle_count() > 0);
    handle.detach();
    assert!(manager.borrow().is_empty());
}

#[test]
fn test_detach_after_manager_dropped() {
    let manager = Rc::new(RefCell::new(ParticleSystemManager::default()));
    let bone = Rc::new(Cell::new(Mat4::IDENTITY));
    let handle = ParticleSystemManager::attach(&manager, Arc::new(fountain()), bone)
        .expect("Failed to attach particle system");

    drop(manager);
    handle.detach();
}

#[test]
fn test_one_shot_effect_reaped() {
    let manager = Rc::new(RefCell::new(ParticleSystemManager::default()));
    let bone = Rc::new(Cell::new(Mat4::IDENTITY));

    let mut flash = fountain();
    flash.system_lifetime = 3;
    let handle = ParticleSystemManager::attach(&manager, Arc::new(flash), bone)
        .expect("Failed to attach particle system");
    let id = handle.id();

    let mut now = Duration::ZERO;
    let mut finished_seen = false;
    for _ in 0..40 {
        manager.borrow_mut().update(now).expect("Update failed");
        if let Some(system) = manager.borrow().get(id) {
            finished_seen |= system.state() == ParticleSystemState::Finished;
        }
        now += TICK_DURATION;
    }

    assert!(finished_seen);
    assert!(manager.borrow().get(id).is_none());
    // Detaching an already reaped system is harmless
    handle.detach();
}

#[test]
fn test_slow_frames_catch_up() {
    let manager = Rc::new(RefCell::new(ParticleSystemManager::default()));
    let bone = Rc::new(Cell::new(Mat4::IDENTITY));
    let handle = ParticleSystemManager::attach(&manager, Arc::new(fountain()), bone)
        .expect("Failed to attach particle system");

    manager
        .borrow_mut()
        .update(Duration::from_secs(1))
        .expect("Update failed");
    manager
        .borrow_mut()
        .update(Duration::from_secs(1) + TICK_DURATION * 3)
        .expect("Update failed");

    let timer = manager.borrow().get(handle.id()).map(|s| s.timer());
    assert_eq!(timer, Some(4));
    assert_eq!(manager.borrow().particle_count(), 12);
    handle.detach();
}
