//! Render-ready particle data
//!
//! Every particle slot becomes four identical vertices that the vertex shader
//! expands into the corners of a camera-facing quad.

use bytemuck::{Pod, Zeroable};
use glam::Mat4;

use super::particle::Particle;
use crate::template::ParticleSystemShader;

/// Vertices emitted per particle slot
pub const VERTICES_PER_PARTICLE: usize = 4;

/// Indices emitted per particle slot, two triangles
pub const INDICES_PER_PARTICLE: usize = 6;

/// Packed particle vertex
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Default, Pod, Zeroable)]
pub struct ParticleVertex {
    pub position: [f32; 3],
    /// Zero for dead slots
    pub size: f32,
    pub color: [f32; 3],
    pub alpha: f32,
    pub angle_z: f32,
}

impl From<&Particle> for ParticleVertex {
    fn from(particle: &Particle) -> Self {
        Self {
            position: particle.position.to_array(),
            size: if particle.dead { 0.0 } else { particle.size },
            color: particle.color.to_array(),
            alpha: particle.alpha,
            angle_z: particle.angle_z,
        }
    }
}

/// Refill `vertices` from the particle slots, dead or alive
pub fn fill_vertices(particles: &[Particle], vertices: &mut Vec<ParticleVertex>) {
    vertices.clear();
    for particle in particles {
        let vertex = ParticleVertex::from(particle);
        vertices.extend(std::iter::repeat_n(vertex, VERTICES_PER_PARTICLE));
    }
}

/// Fixed index pattern for `capacity` quads
pub fn build_indices(capacity: usize) -> Vec<u32> {
    let mut indices = Vec::with_capacity(capacity * INDICES_PER_PARTICLE);
    for slot in 0..capacity {
        let i = (slot * VERTICES_PER_PARTICLE) as u32;
        indices.extend_from_slice(&[i, i + 2, i + 1, i + 1, i + 2, i + 3]);
    }
    indices
}

/// Everything a renderer needs to draw one particle system
#[derive(Debug, Clone, Copy)]
pub struct RenderItem<'a> {
    pub name: &'a str,
    pub vertices: &'a [ParticleVertex],
    pub indices: &'a [u32],
    pub shader: ParticleSystemShader,
    pub is_ground_aligned: bool,
    pub texture: &'a str,
    pub world_matrix: Mat4,
}

impl RenderItem<'_> {
    /// Vertex data as raw bytes for upload
    pub fn vertex_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(self.vertices)
    }

    pub fn index_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(self.indices)
    }
}
