//! Handles for particle systems that follow a host object

use std::fmt;

use log::warn;

use crate::manager::ParticleSystemId;

/// A particle system bound to a host, such as a model bone.
///
/// The host keeps this handle for as long as the effect should live and
/// calls [`detach`](Self::detach) when it goes away. Detaching consumes the
/// handle, so the callback runs at most once.
pub struct AttachedParticleSystem {
    id: ParticleSystemId,
    detach: Option<Box<dyn FnOnce()>>,
}

impl AttachedParticleSystem {
    pub fn new(id: ParticleSystemId, detach: impl FnOnce() + 'static) -> Self {
        Self {
            id,
            detach: Some(Box::new(detach)),
        }
    }

    pub fn id(&self) -> ParticleSystemId {
        self.id
    }

    /// Release the particle system
    pub fn detach(mut self) {
        if let Some(detach) = self.detach.take() {
            detach();
        }
    }
}

impl Drop for AttachedParticleSystem {
    fn drop(&mut self) {
        if self.detach.is_some() {
            warn!(
                "Attached particle system {} dropped without being detached",
                self.id
            );
        }
    }
}

impl fmt::Debug for AttachedParticleSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AttachedParticleSystem")
            .field("id", &self.id)
            .field("detached", &self.detach.is_none())
            .finish()
    }
}
