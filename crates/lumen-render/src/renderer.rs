// SPDX-License-Identifier: CEPL-1.0
use tracing::{info, warn};

use crate::{
    config::RenderConfig,
    device::{GpuDevice, PipelineSet},
    error::{RenderError, StartupError},
    frame::FrameResourceSet,
    orchestrator::{FrameInput, FrameOrchestrator, FrameOutcome},
    overlay::Overlay,
    surface::SurfaceProvider,
    swapchain::{build_render_targets, destroy_render_targets, Swapchain},
};

/// The device plus the settings every lifecycle function reads.
pub struct RendererContext<D: GpuDevice> {
    pub device: D,
    pub config: RenderConfig,
}

/// Everything rebuilt when the swapchain goes stale.
#[derive(Debug, Default)]
pub struct RenderTargets {
    pub swapchain: Swapchain,
    pub pipelines: PipelineSet,
}

pub struct Renderer<D: GpuDevice> {
    ctx: RendererContext<D>,
    targets: RenderTargets,
    frames: FrameResourceSet,
    orchestrator: FrameOrchestrator,
}

impl<D: GpuDevice> Renderer<D> {
    /// Builds the swapchain and its dependents, then a frame ring sized from
    /// the swapchain image count. The ring keeps that size for the life of
    /// the renderer.
    pub fn new<S>(device: D, config: RenderConfig, surface: &S) -> Result<Self, StartupError>
    where
        S: SurfaceProvider + ?Sized,
    {
        let ctx = RendererContext { device, config };
        let mut targets = build_render_targets(&ctx, surface.drawable_size())?;

        let slot_count = ctx.config.slot_count(targets.swapchain.image_count());
        let frames = match FrameResourceSet::create(&ctx, slot_count) {
            Ok(frames) => frames,
            Err(e) => {
                destroy_render_targets(&ctx, &mut targets);
                return Err(e);
            }
        };
        info!(
            "renderer ready: {} swapchain images, {} frames in flight",
            targets.swapchain.image_count(),
            frames.len()
        );

        Ok(Self {
            ctx,
            targets,
            orchestrator: FrameOrchestrator::new(frames.len()),
            frames,
        })
    }

    pub fn render_frame<S, O>(
        &mut self,
        surface: &mut S,
        input: &FrameInput<'_>,
        overlay: &mut O,
        overlay_data: &O::DrawData,
    ) -> Result<FrameOutcome, RenderError>
    where
        S: SurfaceProvider + ?Sized,
        O: Overlay<D> + ?Sized,
    {
        self.orchestrator.render_frame(
            &self.ctx,
            &mut self.targets,
            &self.frames,
            surface,
            input,
            overlay,
            overlay_data,
        )
    }

    pub fn mark_stale(&mut self) {
        self.orchestrator.mark_stale();
    }

    pub fn device(&self) -> &D {
        &self.ctx.device
    }

    pub fn config(&self) -> &RenderConfig {
        &self.ctx.config
    }

    pub fn swapchain(&self) -> &Swapchain {
        &self.targets.swapchain
    }

    pub fn pipelines(&self) -> &PipelineSet {
        &self.targets.pipelines
    }

    pub fn frames(&self) -> &FrameResourceSet {
        &self.frames
    }

    pub fn orchestrator(&self) -> &FrameOrchestrator {
        &self.orchestrator
    }
}

impl<D: GpuDevice> Drop for Renderer<D> {
    fn drop(&mut self) {
        // STRICT ORDER: idle, frame slots, pipelines + swapchain. The device
        // itself (static resources, then the device handle) drops after.
        if let Err(code) = self.ctx.device.device_wait_idle() {
            warn!("vkDeviceWaitIdle at shutdown failed: {code}");
        }
        self.frames.destroy(&self.ctx.device);
        destroy_render_targets(&self.ctx, &mut self.targets);
    }
}
