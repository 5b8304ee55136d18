//! Color and alpha keyframes
//!
//! Templates configure up to eight keyframe slots per track. At runtime only
//! the slots with strictly increasing times are kept, and values between two
//! keyframes are interpolated linearly.

use glam::Vec3;
use sage_state::{Persist, StatePersister};

#[cfg(feature = "serde-support")]
use serde::{Deserialize, Serialize};

use crate::random::{ParticleRng, RandomVariable};

/// Number of keyframe slots per track
pub const MAX_KEYFRAMES: usize = 8;

/// Configured color keyframe; channels are in `0.0..=1.0`
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde-support", derive(Serialize, Deserialize))]
pub struct RgbColorKeyframe {
    pub color: Vec3,
    pub time: u32,
}

/// Configured alpha keyframe, sampled once per particle
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde-support", derive(Serialize, Deserialize))]
pub struct RandomAlphaKeyframe {
    pub value: RandomVariable,
    pub time: u32,
}

impl Persist for RgbColorKeyframe {
    fn persist<P: StatePersister>(&mut self, persister: &mut P) -> sage_state::Result<()> {
        persister.persist_vec3("Color", &mut self.color)?;
        persister.persist_u32("Time", &mut self.time)
    }
}

impl Persist for RandomAlphaKeyframe {
    fn persist<P: StatePersister>(&mut self, persister: &mut P) -> sage_state::Result<()> {
        persister.persist_object("Value", &mut self.value)?;
        persister.persist_u32("Time", &mut self.time)
    }
}

/// Anything placed at a tick on a track
pub trait Timed {
    fn time(&self) -> u32;
}

impl Timed for RgbColorKeyframe {
    fn time(&self) -> u32 {
        self.time
    }
}

impl Timed for RandomAlphaKeyframe {
    fn time(&self) -> u32 {
        self.time
    }
}

/// Iterate the configured slots that form a strictly increasing track.
///
/// The first slot is kept when present. Every later slot is kept only when it
/// and its predecessor are both present and its time exceeds the predecessor's.
pub fn monotonic_slots<T: Timed>(slots: &[Option<T>]) -> impl Iterator<Item = &T> {
    slots.iter().enumerate().filter_map(move |(i, slot)| {
        let current = slot.as_ref()?;
        if i == 0 {
            return Some(current);
        }
        let previous = slots[i - 1].as_ref()?;
        (current.time() > previous.time()).then_some(current)
    })
}

/// Values that can be blended between keyframes
pub trait Lerp: Copy {
    fn lerp(self, other: Self, t: f32) -> Self;
}

impl Lerp for f32 {
    fn lerp(self, other: Self, t: f32) -> Self {
        self + (other - self) * t
    }
}

impl Lerp for Vec3 {
    fn lerp(self, other: Self, t: f32) -> Self {
        Vec3::lerp(self, other, t)
    }
}

/// Runtime keyframe with a resolved value
pub trait Keyframe: Copy + PartialEq {
    type Value: Lerp;

    fn time(&self) -> u32;
    fn value(&self) -> Self::Value;
}

/// Resolved color keyframe shared by every particle of a system
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ParticleColorKeyframe {
    pub time: u32,
    pub color: Vec3,
}

impl From<&RgbColorKeyframe> for ParticleColorKeyframe {
    fn from(keyframe: &RgbColorKeyframe) -> Self {
        Self {
            time: keyframe.time,
            color: keyframe.color,
        }
    }
}

impl Keyframe for ParticleColorKeyframe {
    type Value = Vec3;

    fn time(&self) -> u32 {
        self.time
    }

    fn value(&self) -> Vec3 {
        self.color
    }
}

/// Alpha keyframe sampled for a single particle
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ParticleAlphaKeyframe {
    pub time: u32,
    pub alpha: f32,
}

impl ParticleAlphaKeyframe {
    pub fn sample(keyframe: &RandomAlphaKeyframe, rng: &mut ParticleRng) -> Self {
        Self {
            time: keyframe.time,
            alpha: keyframe.value.sample_float(rng),
        }
    }
}

impl Keyframe for ParticleAlphaKeyframe {
    type Value = f32;

    fn time(&self) -> u32 {
        self.time
    }

    fn value(&self) -> f32 {
        self.alpha
    }
}

/// Find the keyframes bracketing `timer` as `(previous, next)`.
///
/// `previous` starts at the first keyframe; the scan stops at the first
/// keyframe whose time is at or after `timer`, which becomes `next`. When no
/// such keyframe exists both brackets are the last keyframe passed.
pub fn find_keyframes<K: Keyframe>(timer: u32, keyframes: &[K]) -> Option<(K, K)> {
    let mut previous = *keyframes.first()?;
    let mut next = previous;

    for keyframe in keyframes {
        if keyframe.time() >= timer {
            next = *keyframe;
            break;
        }
        previous = *keyframe;
        next = previous;
    }

    Some((previous, next))
}

/// Resolve the track value at `timer`
pub fn interpolate<K: Keyframe>(timer: u32, keyframes: &[K]) -> Option<K::Value> {
    let (previous, next) = find_keyframes(timer, keyframes)?;
    if previous == next || next.time() == previous.time() {
        return Some(previous.value());
    }

    let t = (timer as f32 - previous.time() as f32) / (next.time() as f32 - previous.time() as f32);
    Some(previous.value().lerp(next.value(), t))
}
