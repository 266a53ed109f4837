// SPDX-License-Identifier: CEPL-1.0
use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3};

/// Capacity of each frame slot's object storage buffer.
pub const MAX_OBJECTS: usize = 256;

/// Camera transform block, binding 0 of the frame descriptor set.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct UniformBufferObject {
    pub model: Mat4,
    pub view: Mat4,
    pub proj: Mat4,
}

impl Default for UniformBufferObject {
    fn default() -> Self {
        Self {
            model: Mat4::IDENTITY,
            view: Mat4::IDENTITY,
            proj: Mat4::IDENTITY,
        }
    }
}

/// One element of the per-slot storage buffer (binding 2). The shader reads
/// it with `gl_InstanceIndex`, so `w` is padding for std430's vec3 alignment.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct ObjectData {
    pub position: [f32; 4],
}

impl From<Vec3> for ObjectData {
    fn from(p: Vec3) -> Self {
        Self {
            position: [p.x, p.y, p.z, 1.0],
        }
    }
}

/// Centred square grid in the XY plane, row-major.
pub fn grid_positions(count: usize, spacing: f32) -> Vec<Vec3> {
    if count == 0 {
        return Vec::new();
    }
    let side = (count as f32).sqrt().ceil() as usize;
    let half = (side - 1) as f32 * 0.5;
    (0..count)
        .map(|i| {
            let col = (i % side) as f32;
            let row = (i / side) as f32;
            Vec3::new((col - half) * spacing, (row - half) * spacing, 0.0)
        })
        .collect()
}
