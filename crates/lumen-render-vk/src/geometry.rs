// SPDX-License-Identifier: CEPL-1.0
use std::mem::{offset_of, size_of};

use ash::vk;

#[repr(C)]
#[derive(Clone, Copy, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Vertex {
    pub pos: [f32; 3],
    pub color: [f32; 3],
    pub uv: [f32; 2],
}

impl Vertex {
    pub fn binding_description() -> vk::VertexInputBindingDescription {
        vk::VertexInputBindingDescription {
            binding: 0,
            stride: size_of::<Vertex>() as u32,
            input_rate: vk::VertexInputRate::VERTEX,
        }
    }

    pub fn attribute_descriptions() -> [vk::VertexInputAttributeDescription; 3] {
        [
            vk::VertexInputAttributeDescription {
                location: 0,
                binding: 0,
                format: vk::Format::R32G32B32_SFLOAT,
                offset: offset_of!(Vertex, pos) as u32,
            },
            vk::VertexInputAttributeDescription {
                location: 1,
                binding: 0,
                format: vk::Format::R32G32B32_SFLOAT,
                offset: offset_of!(Vertex, color) as u32,
            },
            vk::VertexInputAttributeDescription {
                location: 2,
                binding: 0,
                format: vk::Format::R32G32_SFLOAT,
                offset: offset_of!(Vertex, uv) as u32,
            },
        ]
    }
}

const fn v(pos: [f32; 3], color: [f32; 3], uv: [f32; 2]) -> Vertex {
    Vertex { pos, color, uv }
}

const RED: [f32; 3] = [1.0, 0.35, 0.35];
const GREEN: [f32; 3] = [0.35, 1.0, 0.35];
const BLUE: [f32; 3] = [0.35, 0.35, 1.0];
const YELLOW: [f32; 3] = [1.0, 1.0, 0.35];
const CYAN: [f32; 3] = [0.35, 1.0, 1.0];
const WHITE: [f32; 3] = [1.0, 1.0, 1.0];

/// Unit cube centred on the origin, four vertices per face so each face gets
/// its own colour and full texture. Faces wind counter-clockwise seen from
/// outside.
#[rustfmt::skip]
pub const CUBE_VERTICES: [Vertex; 24] = [
    // +X
    v([ 0.5, -0.5, -0.5], RED, [0.0, 1.0]),
    v([ 0.5,  0.5, -0.5], RED, [1.0, 1.0]),
    v([ 0.5,  0.5,  0.5], RED, [1.0, 0.0]),
    v([ 0.5, -0.5,  0.5], RED, [0.0, 0.0]),
    // -X
    v([-0.5,  0.5, -0.5], CYAN, [0.0, 1.0]),
    v([-0.5, -0.5, -0.5], CYAN, [1.0, 1.0]),
    v([-0.5, -0.5,  0.5], CYAN, [1.0, 0.0]),
    v([-0.5,  0.5,  0.5], CYAN, [0.0, 0.0]),
    // +Y
    v([ 0.5,  0.5, -0.5], GREEN, [0.0, 1.0]),
    v([-0.5,  0.5, -0.5], GREEN, [1.0, 1.0]),
    v([-0.5,  0.5,  0.5], GREEN, [1.0, 0.0]),
    v([ 0.5,  0.5,  0.5], GREEN, [0.0, 0.0]),
    // -Y
    v([-0.5, -0.5, -0.5], YELLOW, [0.0, 1.0]),
    v([ 0.5, -0.5, -0.5], YELLOW, [1.0, 1.0]),
    v([ 0.5, -0.5,  0.5], YELLOW, [1.0, 0.0]),
    v([-0.5, -0.5,  0.5], YELLOW, [0.0, 0.0]),
    // +Z
    v([-0.5, -0.5,  0.5], BLUE, [0.0, 1.0]),
    v([ 0.5, -0.5,  0.5], BLUE, [1.0, 1.0]),
    v([ 0.5,  0.5,  0.5], BLUE, [1.0, 0.0]),
    v([-0.5,  0.5,  0.5], BLUE, [0.0, 0.0]),
    // -Z
    v([-0.5, -0.5, -0.5], WHITE, [0.0, 1.0]),
    v([-0.5,  0.5, -0.5], WHITE, [1.0, 1.0]),
    v([ 0.5,  0.5, -0.5], WHITE, [1.0, 0.0]),
    v([ 0.5, -0.5, -0.5], WHITE, [0.0, 0.0]),
];

pub const CUBE_INDICES: [u16; 36] = cube_indices();

const fn cube_indices() -> [u16; 36] {
    let mut out = [0u16; 36];
    let mut face = 0;
    while face < 6 {
        let base = (face * 4) as u16;
        let quad = [0, 1, 2, 2, 3, 0];
        let mut k = 0;
        while k < 6 {
            out[face * 6 + k] = base + quad[k];
            k += 1;
        }
        face += 1;
    }
    out
}
