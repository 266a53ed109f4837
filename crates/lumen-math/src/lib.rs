// SPDX-License-Identifier: CEPL-1.0
//! Camera state, the GPU-visible uniform/object layouts derived from it, and
//! the free-fly controller that moves it.

mod camera;
mod fly;
mod gpu;

pub use camera::CameraState;
pub use fly::{FlyController, Movement};
pub use glam;
pub use gpu::{grid_positions, ObjectData, UniformBufferObject, MAX_OBJECTS};
