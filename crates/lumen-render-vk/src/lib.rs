// SPDX-License-Identifier: CEPL-1.0
//! ash backend: instance, surface and device setup plus the [`GpuDevice`]
//! implementation the frame lifecycle drives.
//!
//! [`GpuDevice`]: lumen_render::GpuDevice

mod adapter;
mod backend;
mod geometry;
mod instance;
mod memory;
mod resources;
mod shaders;
mod texture;

pub use backend::{VkDevice, VkOptions};
pub use geometry::{Vertex, CUBE_INDICES, CUBE_VERTICES};
pub use instance::VALIDATION_LAYER;
pub use memory::pick_memory_type;
pub use shaders::{parse_spirv, ShaderCode};
pub use texture::{load_rgba, TexturePixels};
