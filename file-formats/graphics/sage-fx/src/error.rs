use sage_state::StateError;
use std::io;
use thiserror::Error;

/// Error types for particle templates, simulation and persistence
#[derive(Error, Debug)]
pub enum FxError {
    /// I/O error during reading or writing
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Save-state stream error
    #[error("Save state error: {0}")]
    State(#[from] StateError),

    /// Module token with no matching variant in its family
    #[error("Unknown module type '{token}' for {family}")]
    UnknownModuleType { family: &'static str, token: String },

    /// Random variable whose distribution cannot be sampled
    #[error("Unsupported distribution type '{0}'")]
    UnsupportedDistribution(String),

    /// Emission volume without ray generation
    #[error("Emission volume {0} cannot generate particle rays")]
    UnsupportedVolume(&'static str),

    /// Velocity strategy that cannot be combined with the volume
    #[error("Emission velocity {velocity} cannot be used with volume {volume}")]
    IncompatibleEmission {
        velocity: &'static str,
        volume: &'static str,
    },

    /// Burst delay low enough to make the slot estimate unbounded
    #[error("Particle system '{template}' has burst delay {low}, must be greater than -1")]
    InvalidBurstDelay { template: String, low: f32 },

    /// Emitting template without an emission volume
    #[error("Particle system '{0}' emits particles but has no emission volume")]
    MissingEmissionVolume(String),

    /// Spawn attempted with every slot in use
    #[error("Particle system '{template}' ran out of particle slots (capacity {capacity})")]
    PoolExhausted { template: String, capacity: usize },

    /// Saved template data does not describe the bound template
    #[error("Saved {field} does not match template '{template}'")]
    TemplateMismatch {
        template: String,
        field: &'static str,
    },

    /// Template name not present in the template store
    #[error("Particle system template not found: {0}")]
    TemplateNotFound(String),

    /// Saved particle count differs from the instance capacity
    #[error("Particle system '{template}' saved {saved} particles but has capacity {capacity}")]
    CapacityMismatch {
        template: String,
        saved: usize,
        capacity: usize,
    },
}

/// Result type using FxError
pub type Result<T> = std::result::Result<T, FxError>;
