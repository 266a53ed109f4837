// SPDX-License-Identifier: CEPL-1.0
#![deny(unsafe_op_in_unsafe_fn)]

mod input;
mod window;

pub use input::InputState;
pub use window::WinitSurface;
pub use winit;
