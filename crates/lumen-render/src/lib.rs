// SPDX-License-Identifier: CEPL-1.0
//! Frame lifecycle core: swapchain management, the in-flight frame ring,
//! command recording and the acquire/record/submit/present state machine.
//!
//! Everything here talks to the GPU through [`GpuDevice`], so the lifecycle
//! logic runs unchanged against the ash backend or a recording test double.

mod buffer;
mod config;
mod device;
mod error;
mod frame;
mod orchestrator;
mod overlay;
mod recorder;
mod renderer;
mod surface;
pub mod swapchain;

pub use ash::vk;
pub use buffer::AllocatedBuffer;
pub use config::{PresentPreference, RenderConfig, MAX_FRAME_SLOTS};
pub use device::{DepthTarget, FrameSubmit, Geometry, GpuDevice, PipelineSet, SwapchainConfig};
pub use error::{BackendCall, RenderError, StartupError};
pub use frame::{FrameResourceSet, FrameSlot};
pub use orchestrator::{FrameInput, FrameOrchestrator, FrameOutcome, FrameState, FrameStats};
pub use overlay::{NoOverlay, Overlay};
pub use recorder::{CommandRecorder, DrawParams};
pub use renderer::{RenderTargets, Renderer, RendererContext};
pub use surface::{
    choose_extent, choose_image_count, choose_present_mode, choose_surface_format,
    swapchain_config, RenderSize, SurfaceProvider, SurfaceSupport, PREFERRED_SURFACE_FORMAT,
};
pub use swapchain::Swapchain;
