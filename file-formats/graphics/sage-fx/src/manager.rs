//! Ownership and per-frame driving of live particle systems

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;
use std::sync::Arc;
use std::time::Duration;

use log::{debug, info, warn};
use sage_state::StatePersister;

#[cfg(feature = "serde-support")]
use serde::{Deserialize, Serialize};

use crate::attachment::AttachedParticleSystem;
use crate::error::Result;
use crate::particles::{ParticleSystem, ParticleSystemState, RenderItem};
use crate::placement::{Placement, WorldTransform};
use crate::random::ParticleRng;
use crate::template::{FxParticleSystemTemplate, TemplateStore};

/// Identifier handed out by [`ParticleSystemManager::create`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ParticleSystemId(u32);

impl ParticleSystemId {
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    pub const fn get(self) -> u32 {
        self.0
    }
}

impl fmt::Display for ParticleSystemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Manager settings
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde-support", derive(Serialize, Deserialize), serde(default))]
pub struct ParticleSystemManagerConfig {
    /// Aggregate live particle count above which a warning is logged
    pub max_particle_count: usize,
    /// Seed of the random stream shared by every system
    pub seed: u64,
}

impl Default for ParticleSystemManagerConfig {
    fn default() -> Self {
        Self {
            max_particle_count: 10_000,
            seed: 0,
        }
    }
}

/// Owns every live particle system and ticks them each frame.
///
/// Systems are created inactive, skipped while inactive and dropped as soon
/// as they report [`ParticleSystemState::Dead`].
#[derive(Debug)]
pub struct ParticleSystemManager {
    config: ParticleSystemManagerConfig,
    rng: ParticleRng,
    systems: Vec<(ParticleSystemId, ParticleSystem)>,
    next_id: u32,
    particle_count: usize,
    over_budget: bool,
}

impl Default for ParticleSystemManager {
    fn default() -> Self {
        Self::new(ParticleSystemManagerConfig::default())
    }
}

impl ParticleSystemManager {
    pub fn new(config: ParticleSystemManagerConfig) -> Self {
        Self {
            rng: ParticleRng::new(config.seed),
            config,
            systems: Vec::new(),
            next_id: 1,
            particle_count: 0,
            over_budget: false,
        }
    }

    pub fn config(&self) -> &ParticleSystemManagerConfig {
        &self.config
    }

    /// Instantiate `template`; the new system starts inactive
    pub fn create(
        &mut self,
        template: Arc<FxParticleSystemTemplate>,
        placement: Placement,
    ) -> Result<ParticleSystemId> {
        let mut system = ParticleSystem::new(template, placement, &mut self.rng)?;
        let id = ParticleSystemId(self.next_id);
        self.next_id += 1;
        system.header_mut().system_id = id.get();

        debug!("Created particle system {} from '{}'", id, system.name());
        self.systems.push((id, system));
        Ok(id)
    }

    /// Create a system that follows `transform`, activate it, and hand back
    /// a handle whose detach removes it again
    pub fn attach(
        this: &Rc<RefCell<Self>>,
        template: Arc<FxParticleSystemTemplate>,
        transform: Rc<dyn WorldTransform>,
    ) -> Result<AttachedParticleSystem> {
        let id = {
            let mut manager = this.borrow_mut();
            let id = manager.create(template, Placement::Tracked(transform))?;
            if let Some(system) = manager.get_mut(id) {
                system.activate();
            }
            id
        };

        let manager = Rc::downgrade(this);
        Ok(AttachedParticleSystem::new(id, move || {
            let Some(manager) = manager.upgrade() else {
                return;
            };
            match manager.try_borrow_mut() {
                Ok(mut manager) => {
                    manager.remove(id);
                }
                Err(_) => warn!("Cannot detach particle system {id}: manager is busy"),
            }
        }))
    }

    /// Tick every non-inactive system up to `now` and reap dead ones.
    ///
    /// A failing system does not stop the others; the first error is
    /// returned once every system has run and the counts are current.
    pub fn update(&mut self, now: Duration) -> Result<()> {
        let mut first_error = None;
        for (id, system) in self.systems.iter_mut() {
            if system.state() == ParticleSystemState::Inactive {
                continue;
            }
            if let Err(e) = system.update(now, &mut self.rng) {
                warn!(
                    "Particle system {} ('{}') failed to update: {}",
                    id,
                    system.name(),
                    e
                );
                first_error.get_or_insert(e);
            }
        }

        self.systems.retain(|(id, system)| {
            let alive = system.state() != ParticleSystemState::Dead;
            if !alive {
                debug!("Reaping particle system {} ('{}')", id, system.name());
            }
            alive
        });

        self.recount();
        first_error.map_or(Ok(()), Err)
    }

    fn recount(&mut self) {
        self.particle_count = self
            .systems
            .iter()
            .map(|(_, system)| system.particle_count())
            .sum();

        let over_budget = self.particle_count > self.config.max_particle_count;
        if over_budget && !self.over_budget {
            warn!(
                "{} live particles exceed the budget of {}",
                self.particle_count, self.config.max_particle_count
            );
        }
        self.over_budget = over_budget;
    }

    pub fn remove(&mut self, id: ParticleSystemId) -> Option<ParticleSystem> {
        let index = self.systems.iter().position(|(other, _)| *other == id)?;
        let (_, system) = self.systems.remove(index);
        self.particle_count = self.particle_count.saturating_sub(system.particle_count());
        debug!("Removed particle system {} ('{}')", id, system.name());
        Some(system)
    }

    pub fn get(&self, id: ParticleSystemId) -> Option<&ParticleSystem> {
        self.systems
            .iter()
            .find(|(other, _)| *other == id)
            .map(|(_, system)| system)
    }

    pub fn get_mut(&mut self, id: ParticleSystemId) -> Option<&mut ParticleSystem> {
        self.systems
            .iter_mut()
            .find(|(other, _)| *other == id)
            .map(|(_, system)| system)
    }

    pub fn len(&self) -> usize {
        self.systems.len()
    }

    pub fn is_empty(&self) -> bool {
        self.systems.is_empty()
    }

    /// Live particles across all systems after the last update
    pub fn particle_count(&self) -> usize {
        self.particle_count
    }

    pub fn iter(&self) -> impl Iterator<Item = (ParticleSystemId, &ParticleSystem)> {
        self.systems.iter().map(|(id, system)| (*id, system))
    }

    /// Draw data of every system that has a particle pool
    pub fn render_items(&self) -> impl Iterator<Item = RenderItem<'_>> {
        self.systems
            .iter()
            .filter_map(|(_, system)| system.render_item())
    }

    /// Write every system
    pub fn save<P: StatePersister>(&mut self, persister: &mut P) -> Result<()> {
        persister.persist_version("ParticleSystemManager", 1)?;
        persister.persist_u32("NextId", &mut self.next_id)?;
        let mut count = self.systems.len() as u32;
        persister.persist_u32("SystemCount", &mut count)?;

        for (_, system) in self.systems.iter_mut() {
            system.save(persister)?;
        }

        info!("Saved {} particle systems", self.systems.len());
        Ok(())
    }

    /// Replace the current systems with the saved ones
    pub fn load<P: StatePersister, S: TemplateStore + ?Sized>(
        &mut self,
        persister: &mut P,
        store: &S,
    ) -> Result<()> {
        persister.persist_version("ParticleSystemManager", 1)?;
        let mut next_id = 0;
        persister.persist_u32("NextId", &mut next_id)?;
        let mut count = 0;
        persister.persist_u32("SystemCount", &mut count)?;

        let mut systems = Vec::with_capacity(count as usize);
        for _ in 0..count {
            let system = ParticleSystem::load(persister, store, Placement::default())?;
            let id = ParticleSystemId(system.header().system_id);
            systems.push((id, system));
        }

        self.systems = systems;
        self.next_id = next_id;
        self.recount();
        info!("Loaded {} particle systems", self.systems.len());
        Ok(())
    }
}
