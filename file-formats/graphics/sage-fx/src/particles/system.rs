//! Particle pool and per-tick simulation

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use glam::{Affine3A, Mat4, Vec3};
use log::{debug, trace, warn};
use sage_state::{PersistEnum, StatePersister, persist_enum};

use super::particle::Particle;
use super::render::{ParticleVertex, RenderItem, build_indices, fill_vertices};
use super::snapshot::{SnapshotUnknowns, persist_template_block};
use crate::error::{FxError, Result};
use crate::keyframe::{
    ParticleAlphaKeyframe, ParticleColorKeyframe, interpolate, monotonic_slots,
};
use crate::placement::Placement;
use crate::random::ParticleRng;
use crate::template::{
    FxParticleSystemTemplate, MAX_START_SIZE, PhysicsModule, TemplateStore, UpdateParameters,
};

/// Length of one simulation tick, 1/30 s
pub const TICK_DURATION: Duration = Duration::from_nanos(33_333_333);

/// Smallest size a live particle shrinks to
const MIN_PARTICLE_SIZE: f32 = 0.001;

persist_enum! {
    /// Lifecycle of a particle system
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub enum ParticleSystemState {
        /// Created but not emitting; skipped by the manager
        #[default]
        Inactive = 0,
        Active = 1,
        /// System lifetime elapsed; live particles run out
        Finished = 2,
        /// No particles left, ready to be disposed
        Dead = 3,
    }
}

/// Persisted system fields outside the particle pool.
///
/// The save record has no dedicated slots for the emitter's own progress, so
/// the system keeps it in the unknown slots: `unknown_ints` hold the next
/// burst countdown, timer, initial delay, state and start size rate bits,
/// and `unknown_float` holds the current start size. They are rewritten from
/// the simulation on every save.
#[derive(Debug, Clone, PartialEq)]
pub struct SystemHeader {
    pub system_id: u32,
    pub attached_to_drawable_id: u32,
    pub attached_to_object_id: u32,
    pub is_identity_transform: bool,
    pub transform: Affine3A,
    pub is_identity_transform2: bool,
    pub transform2: Affine3A,
    pub unknown_ints: [u32; 5],
    pub has_infinite_lifetime: bool,
    pub unknown_float: f32,
    pub unknown_bool1: bool,
    pub position: Vec3,
    pub previous_position: Vec3,
    pub unknown_bool2: bool,
    pub slave_system_id: u32,
    pub master_system_id: u32,
}

impl Default for SystemHeader {
    fn default() -> Self {
        Self {
            system_id: 0,
            attached_to_drawable_id: 0,
            attached_to_object_id: 0,
            is_identity_transform: true,
            transform: Affine3A::IDENTITY,
            is_identity_transform2: true,
            transform2: Affine3A::IDENTITY,
            unknown_ints: [0; 5],
            has_infinite_lifetime: false,
            unknown_float: 0.0,
            unknown_bool1: false,
            position: Vec3::ZERO,
            previous_position: Vec3::ZERO,
            unknown_bool2: false,
            slave_system_id: 0,
            master_system_id: 0,
        }
    }
}

/// A live particle effect instantiated from a template.
///
/// The particle pool is allocated once. Slots are handed out from the front
/// of an ordered free list and returned to its back when a particle dies.
/// Systems with zero capacity or no texture are inert: they have no pool and
/// never emit, but still run their state machine so that they can expire.
#[derive(Debug)]
pub struct ParticleSystem {
    template: Arc<FxParticleSystemTemplate>,
    placement: Placement,
    state: ParticleSystemState,

    particles: Vec<Particle>,
    dead_list: VecDeque<usize>,
    particle_count: usize,

    color_keyframes: Vec<ParticleColorKeyframe>,
    update: UpdateParameters,

    timer: u32,
    next_burst: i32,
    initial_delay: i32,
    start_size: f32,
    start_size_rate: f32,
    next_update: Option<Duration>,

    vertices: Vec<ParticleVertex>,
    indices: Vec<u32>,

    header: SystemHeader,
    snapshot_unknowns: SnapshotUnknowns,
}

impl ParticleSystem {
    /// Instantiate `template`.
    ///
    /// Emitting templates are checked first: they need an emission volume
    /// that can produce rays and a compatible velocity strategy.
    pub fn new(
        template: Arc<FxParticleSystemTemplate>,
        placement: Placement,
        rng: &mut ParticleRng,
    ) -> Result<Self> {
        let mut system = Self::allocate(template, placement)?;
        if !system.is_inert() {
            system.initial_delay = system.template.initial_delay.sample_int(rng);
            system.start_size_rate = system.template.start_size_rate.sample_float(rng);
        }
        Ok(system)
    }

    /// Pool, color track and index buffer; draws nothing from the random
    /// stream
    fn allocate(template: Arc<FxParticleSystemTemplate>, placement: Placement) -> Result<Self> {
        template.validate()?;

        let world = placement.world_matrix();
        let header = SystemHeader {
            is_identity_transform: world == Mat4::IDENTITY,
            transform: Affine3A::from_mat4(world),
            has_infinite_lifetime: template.system_lifetime == 0,
            position: world.w_axis.truncate(),
            previous_position: world.w_axis.truncate(),
            ..Default::default()
        };

        let mut system = Self {
            template: Arc::clone(&template),
            placement,
            state: ParticleSystemState::Inactive,
            particles: Vec::new(),
            dead_list: VecDeque::new(),
            particle_count: 0,
            color_keyframes: Vec::new(),
            update: template.update_parameters(),
            timer: 0,
            next_burst: 0,
            initial_delay: 0,
            start_size: 0.0,
            start_size_rate: 0.0,
            next_update: None,
            vertices: Vec::new(),
            indices: Vec::new(),
            header,
            snapshot_unknowns: SnapshotUnknowns::default(),
        };

        if template.is_inert() {
            debug!("Particle system '{}' is inert", template.name);
            return Ok(system);
        }

        template.check_emission()?;

        let capacity = template.max_particles();
        system.particles = vec![Particle::dead(); capacity];
        system.dead_list = (0..capacity).collect();
        system.color_keyframes = template.color_track();
        system.indices = build_indices(capacity);
        fill_vertices(&system.particles, &mut system.vertices);

        debug!(
            "Created particle system '{}' with {} slots",
            template.name, capacity
        );
        Ok(system)
    }

    pub fn template(&self) -> &Arc<FxParticleSystemTemplate> {
        &self.template
    }

    pub fn name(&self) -> &str {
        &self.template.name
    }

    pub fn state(&self) -> ParticleSystemState {
        self.state
    }

    /// Whether the system has no particle pool
    pub fn is_inert(&self) -> bool {
        self.particles.is_empty()
    }

    /// Number of particle slots
    pub fn capacity(&self) -> usize {
        self.particles.len()
    }

    /// Live particles after the last tick
    pub fn particle_count(&self) -> usize {
        self.particle_count
    }

    /// Every slot, dead or alive
    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn live_particles(&self) -> impl Iterator<Item = &Particle> {
        self.particles.iter().filter(|p| p.is_alive())
    }

    /// Free slots in the order they will be reused
    pub fn dead_slots(&self) -> impl Iterator<Item = usize> + '_ {
        self.dead_list.iter().copied()
    }

    /// Ticks simulated so far
    pub fn timer(&self) -> u32 {
        self.timer
    }

    pub fn placement(&self) -> &Placement {
        &self.placement
    }

    pub fn world_matrix(&self) -> Mat4 {
        self.placement.world_matrix()
    }

    pub fn header(&self) -> &SystemHeader {
        &self.header
    }

    pub fn header_mut(&mut self) -> &mut SystemHeader {
        &mut self.header
    }

    pub fn vertices(&self) -> &[ParticleVertex] {
        &self.vertices
    }

    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    pub fn activate(&mut self) {
        if self.state == ParticleSystemState::Inactive {
            self.state = ParticleSystemState::Active;
        }
    }

    pub fn deactivate(&mut self) {
        if self.state == ParticleSystemState::Active {
            self.state = ParticleSystemState::Inactive;
        }
    }

    /// Run every tick scheduled up to `now`.
    ///
    /// The schedule starts at the first time observed and advances by
    /// [`TICK_DURATION`]. A tick spent in the initial delay ends the
    /// catch-up, so the delay runs down by at most one tick per call.
    /// Returns the number of simulated ticks; vertices are rebuilt when it
    /// is nonzero.
    pub fn update(&mut self, now: Duration, rng: &mut ParticleRng) -> Result<usize> {
        let mut next = *self.next_update.get_or_insert(now);
        let mut steps = 0;

        while next <= now {
            next += TICK_DURATION;
            self.next_update = Some(next);
            if !self.tick(rng)? {
                break;
            }
            steps += 1;
        }

        if steps > 0 {
            self.refresh_vertices();
        }
        Ok(steps)
    }

    /// Advance the simulation by one tick.
    ///
    /// Returns `false` when the tick was consumed by the initial delay.
    pub fn tick(&mut self, rng: &mut ParticleRng) -> Result<bool> {
        if self.initial_delay > 0 {
            self.initial_delay -= 1;
            return Ok(false);
        }

        for (index, particle) in self.particles.iter_mut().enumerate() {
            if particle.is_alive() && particle.is_expired() {
                particle.dead = true;
                self.dead_list.push_back(index);
            }
        }

        if self.state == ParticleSystemState::Active && !self.is_inert() {
            self.emit(rng)?;
        }

        let physics = self.template.physics.as_ref();
        let mut count = 0;
        for particle in self.particles.iter_mut().filter(|p| p.is_alive()) {
            integrate(particle, physics, &self.color_keyframes);
            count += 1;
        }
        self.particle_count = count;

        if count == 0 && self.state == ParticleSystemState::Finished {
            debug!("Particle system '{}' is dead", self.template.name);
            self.state = ParticleSystemState::Dead;
        }

        self.timer += 1;

        let system_lifetime = self.template.system_lifetime;
        if system_lifetime != 0
            && self.timer > system_lifetime
            && self.state != ParticleSystemState::Dead
            && self.state != ParticleSystemState::Finished
        {
            debug!(
                "Particle system '{}' finished after {} ticks",
                self.template.name, self.timer
            );
            self.state = ParticleSystemState::Finished;
        }

        trace!(
            "Tick {} of '{}': {} live particles",
            self.timer, self.template.name, count
        );
        Ok(true)
    }

    fn emit(&mut self, rng: &mut ParticleRng) -> Result<()> {
        if self.next_burst > 0 {
            self.next_burst -= 1;
            return Ok(());
        }

        let template = Arc::clone(&self.template);
        self.next_burst = template.burst_delay.sample_int(rng);
        let burst_count = template.burst_count.sample_int(rng);

        let volume = template
            .emission_volume
            .as_ref()
            .ok_or_else(|| FxError::MissingEmissionVolume(template.name.clone()))?;

        for _ in 0..burst_count {
            let ray = volume.get_ray(rng)?;
            let velocity = match &template.emission_velocity {
                Some(velocity) => velocity.get_velocity(ray.direction, volume, rng)?,
                None => Vec3::ZERO,
            };

            let index = self
                .dead_list
                .pop_front()
                .ok_or_else(|| FxError::PoolExhausted {
                    template: template.name.clone(),
                    capacity: self.particles.len(),
                })?;

            let start_size = self.start_size;
            let update = self.update;
            spawn(
                &mut self.particles[index],
                &template,
                &update,
                ray.position,
                velocity,
                start_size,
                rng,
            );

            self.start_size = (self.start_size + self.start_size_rate).min(MAX_START_SIZE);
        }
        Ok(())
    }

    fn refresh_vertices(&mut self) {
        fill_vertices(&self.particles, &mut self.vertices);
    }

    /// Draw data for this frame; inert systems have none
    pub fn render_item(&self) -> Option<RenderItem<'_>> {
        if self.is_inert() {
            return None;
        }
        Some(RenderItem {
            name: &self.template.name,
            vertices: &self.vertices,
            indices: &self.indices,
            shader: self.template.shader,
            is_ground_aligned: self.template.is_ground_aligned,
            texture: self.template.particle_texture.as_deref().unwrap_or_default(),
            world_matrix: self.world_matrix(),
        })
    }

    /// Write the system: version, template name, then its state
    pub fn save<P: StatePersister>(&mut self, persister: &mut P) -> Result<()> {
        persister.persist_version("ParticleSystem", 1)?;
        let mut name = self.template.name.clone();
        persister.persist_ascii_string("TemplateName", &mut name)?;
        self.persist_state(persister)
    }

    /// Read a system written by [`save`](Self::save), resolving its template
    /// through `store`.
    ///
    /// A tracked `placement` stays in effect; otherwise the system is pinned
    /// to the transform stored in its header. Nothing is drawn from the
    /// random stream.
    pub fn load<P: StatePersister, S: TemplateStore + ?Sized>(
        persister: &mut P,
        store: &S,
        placement: Placement,
    ) -> Result<Self> {
        persister.persist_version("ParticleSystem", 1)?;
        let mut name = String::new();
        persister.persist_ascii_string("TemplateName", &mut name)?;

        let template = store
            .get(&name)
            .ok_or_else(|| FxError::TemplateNotFound(name.clone()))?;

        let mut system = Self::allocate(template, placement)?;
        system.persist_state(persister)?;
        Ok(system)
    }

    fn persist_state<P: StatePersister>(&mut self, persister: &mut P) -> Result<()> {
        persist_template_block(persister, &self.template, &mut self.snapshot_unknowns)?;

        if !persister.is_reading() {
            self.store_progress();
        }

        let header = &mut self.header;
        persister.persist_u32("SystemId", &mut header.system_id)?;
        persister.persist_u32("AttachedToDrawableId", &mut header.attached_to_drawable_id)?;
        persister.persist_u32("AttachedToObjectId", &mut header.attached_to_object_id)?;
        persister.persist_bool("IsIdentityTransform", &mut header.is_identity_transform)?;
        persister.persist_matrix4x3("Transform", &mut header.transform)?;
        persister.persist_bool("IsIdentityTransform2", &mut header.is_identity_transform2)?;
        persister.persist_matrix4x3("Transform2", &mut header.transform2)?;
        for value in header.unknown_ints.iter_mut() {
            persister.persist_u32("UnknownInt", value)?;
        }
        persister.persist_bool("HasInfiniteLifetime", &mut header.has_infinite_lifetime)?;
        persister.persist_f32("UnknownFloat", &mut header.unknown_float)?;
        persister.persist_bool("UnknownBool1", &mut header.unknown_bool1)?;

        for _ in 0..6 {
            persister.persist_f32_sentinel("Unknown25", 1.0)?;
        }

        persister.persist_vec3("Position", &mut header.position)?;
        persister.persist_vec3("PositionPrevious", &mut header.previous_position)?;
        persister.persist_bool("UnknownBool2", &mut header.unknown_bool2)?;
        persister.persist_u32("SlaveSystemId", &mut header.slave_system_id)?;
        persister.persist_u32("MasterSystemId", &mut header.master_system_id)?;

        let mut count = self.particles.len() as u32;
        persister.persist_u32("ParticleCount", &mut count)?;
        if count as usize != self.particles.len() {
            return Err(FxError::CapacityMismatch {
                template: self.template.name.clone(),
                saved: count as usize,
                capacity: self.particles.len(),
            });
        }

        for particle in self.particles.iter_mut() {
            particle.persist(persister, &self.color_keyframes)?;
        }

        if persister.is_reading() {
            self.dead_list = self
                .particles
                .iter()
                .enumerate()
                .filter(|(_, p)| p.dead)
                .map(|(index, _)| index)
                .collect();
            self.particle_count = self.particles.len() - self.dead_list.len();
            self.restore_progress();
            if !self.placement.is_tracked() {
                self.placement = Placement::Fixed(Mat4::from(self.header.transform));
            }
            self.next_update = None;
            self.refresh_vertices();
            debug!(
                "Loaded particle system '{}' with {} live particles",
                self.template.name, self.particle_count
            );
        }
        Ok(())
    }

    fn store_progress(&mut self) {
        let header = &mut self.header;
        header.unknown_ints = [
            self.next_burst as u32,
            self.timer,
            self.initial_delay as u32,
            self.state.to_u32(),
            self.start_size_rate.to_bits(),
        ];
        header.unknown_float = self.start_size;
    }

    fn restore_progress(&mut self) {
        let [next_burst, timer, initial_delay, state, start_size_rate] = self.header.unknown_ints;
        self.next_burst = next_burst as i32;
        self.timer = timer;
        self.initial_delay = initial_delay as i32;
        self.start_size_rate = f32::from_bits(start_size_rate);
        self.start_size = self.header.unknown_float;
        self.state = ParticleSystemState::from_u32(state).unwrap_or_else(|| {
            warn!(
                "Particle system '{}' saved unknown state {}, treating it as active",
                self.template.name, state
            );
            ParticleSystemState::Active
        });
    }
}

fn spawn(
    particle: &mut Particle,
    template: &FxParticleSystemTemplate,
    update: &UpdateParameters,
    position: Vec3,
    velocity: Vec3,
    start_size: f32,
    rng: &mut ParticleRng,
) {
    particle.dead = false;
    particle.timer = 0;
    particle.position = position;
    particle.emitter_position = position;
    particle.velocity = velocity;

    particle.angle_z = update.angle_z.sample_float(rng);
    particle.angular_rate_z = update.angular_rate_z.sample_float(rng);
    particle.angular_damping = update.angular_damping.sample_float(rng);

    particle.lifetime = template.lifetime.sample_int(rng).max(0) as u32;
    particle.color_scale = template.color_scale().sample_float(rng);

    particle.size = start_size + template.size.sample_float(rng);
    particle.size_rate = update.size_rate.sample_float(rng);
    particle.size_rate_damping = update.size_rate_damping.sample_float(rng);

    particle.velocity_damping = template
        .physics
        .as_ref()
        .map(|physics| physics.velocity_damping().sample_float(rng))
        .unwrap_or(0.0);

    particle.unknowns.is_particle_up_towards_emitter = template.is_particle_up_towards_emitter;

    particle.alpha_keyframes.clear();
    if let Some(alpha) = &template.alpha {
        for keyframe in monotonic_slots(alpha.alphas()) {
            particle
                .alpha_keyframes
                .push(ParticleAlphaKeyframe::sample(keyframe, rng));
        }
    }
}

fn integrate(
    particle: &mut Particle,
    physics: Option<&PhysicsModule>,
    color_keyframes: &[ParticleColorKeyframe],
) {
    particle.velocity *= particle.velocity_damping;
    let mut total_velocity = particle.velocity;
    if let Some(physics) = physics {
        particle.velocity.z += physics.gravity();
        total_velocity = particle.velocity + physics.drift_velocity();
    }
    particle.position += total_velocity;

    particle.size = (particle.size + particle.size_rate).max(MIN_PARTICLE_SIZE);
    particle.size_rate *= particle.size_rate_damping;

    particle.angle_z += particle.angular_rate_z;
    particle.angular_rate_z *= particle.angular_damping;

    let color = interpolate(particle.timer, color_keyframes).unwrap_or(Vec3::ZERO);
    let tint = particle.color_scale * particle.timer as f32 / 255.0;
    particle.color = color + Vec3::splat(tint);

    particle.alpha = if particle.alpha_keyframes.len() > 1 {
        interpolate(particle.timer, &particle.alpha_keyframes).unwrap_or(1.0)
    } else {
        1.0
    };

    particle.timer += 1;
}
