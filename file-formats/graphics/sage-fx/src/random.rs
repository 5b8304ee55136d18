//! Random variables and the particle random stream
//!
//! Every randomized template parameter is a [`RandomVariable`]. Sampling goes
//! through an explicit [`ParticleRng`] so that one seeded stream drives all
//! particle systems in call order.

use glam::Vec3;
use rand::{Rng, SeedableRng, rngs::StdRng};
use sage_state::{Persist, StatePersister, persist_enum};
use std::f32::consts::TAU;

#[cfg(feature = "serde-support")]
use serde::{Deserialize, Serialize};

use crate::error::{FxError, Result};

persist_enum! {
    /// Distribution a random variable is drawn from
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    #[cfg_attr(feature = "serde-support", derive(Serialize, Deserialize))]
    pub enum DistributionType {
        #[cfg_attr(feature = "serde-support", serde(rename = "CONSTANT"))]
        Constant = 0,
        #[default]
        #[cfg_attr(feature = "serde-support", serde(rename = "UNIFORM"))]
        Uniform = 1,
    }
}

impl DistributionType {
    /// Resolve a distribution token such as `UNIFORM`
    pub fn from_token(token: &str) -> Result<Self> {
        match token.to_ascii_uppercase().as_str() {
            "CONSTANT" => Ok(Self::Constant),
            "UNIFORM" => Ok(Self::Uniform),
            _ => Err(FxError::UnsupportedDistribution(token.to_string())),
        }
    }

    pub fn token(self) -> &'static str {
        match self {
            Self::Constant => "CONSTANT",
            Self::Uniform => "UNIFORM",
        }
    }
}

/// A scalar range sampled per use
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde-support", derive(Serialize, Deserialize))]
pub struct RandomVariable {
    pub low: f32,
    pub high: f32,
    #[cfg_attr(feature = "serde-support", serde(default))]
    pub distribution: DistributionType,
}

impl RandomVariable {
    /// Uniform range `[low, high]`
    pub const fn new(low: f32, high: f32) -> Self {
        Self {
            low,
            high,
            distribution: DistributionType::Uniform,
        }
    }

    /// A range that always yields `value`
    pub const fn constant(value: f32) -> Self {
        Self {
            low: value,
            high: value,
            distribution: DistributionType::Constant,
        }
    }

    /// Build from a raw distribution discriminant, as found in foreign data
    pub fn from_raw(low: f32, high: f32, distribution: u32) -> Result<Self> {
        use sage_state::PersistEnum;

        let distribution = DistributionType::from_u32(distribution)
            .ok_or_else(|| FxError::UnsupportedDistribution(distribution.to_string()))?;
        Ok(Self {
            low,
            high,
            distribution,
        })
    }

    pub fn sample_float(&self, rng: &mut ParticleRng) -> f32 {
        match self.distribution {
            DistributionType::Constant => self.low,
            DistributionType::Uniform => rng.random_float(self.low, self.high),
        }
    }

    /// Inclusive integer draw between the truncated bounds
    pub fn sample_int(&self, rng: &mut ParticleRng) -> i32 {
        match self.distribution {
            DistributionType::Constant => self.low as i32,
            DistributionType::Uniform => rng.random_int(self.low as i32, self.high as i32),
        }
    }
}

impl Persist for RandomVariable {
    fn persist<P: StatePersister>(&mut self, persister: &mut P) -> sage_state::Result<()> {
        persister.persist_enum("DistributionType", &mut self.distribution)?;
        persister.persist_f32("Low", &mut self.low)?;
        persister.persist_f32("High", &mut self.high)
    }
}

/// Seeded random stream shared by every particle system of a manager
#[derive(Debug, Clone)]
pub struct ParticleRng {
    inner: StdRng,
}

impl ParticleRng {
    /// Create a new stream with the given seed
    pub fn new(seed: u64) -> Self {
        Self {
            inner: StdRng::seed_from_u64(seed),
        }
    }

    /// Uniform float in `[min, max)`; equal bounds return `min`
    pub fn random_float(&mut self, min: f32, max: f32) -> f32 {
        if min == max {
            return min;
        }
        min + self.inner.random::<f32>() * (max - min)
    }

    /// Uniform integer in `[min, max]`, bounds in either order
    pub fn random_int(&mut self, min: i32, max: i32) -> i32 {
        let (lo, hi) = if min <= max { (min, max) } else { (max, min) };
        if lo == hi {
            return lo;
        }
        self.inner.random_range(lo..=hi)
    }

    /// Uniform angle in `[0, 2pi)`
    pub fn random_angle(&mut self) -> f32 {
        self.random_float(0.0, TAU)
    }

    /// Uniformly distributed unit vector
    pub fn random_direction_3d(&mut self) -> Vec3 {
        let z = self.random_float(-1.0, 1.0);
        let theta = self.random_angle();
        let r = (1.0 - z * z).max(0.0).sqrt();
        Vec3::new(r * theta.cos(), r * theta.sin(), z)
    }
}

impl Default for ParticleRng {
    fn default() -> Self {
        Self::new(0)
    }
}
