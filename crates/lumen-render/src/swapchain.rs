// SPDX-License-Identifier: CEPL-1.0
//! Swapchain creation, teardown and the recreation protocol.
//!
//! The swapchain owns everything sized by the window: image views, the depth
//! target and framebuffers. Pipelines bake the extent too, so recreation
//! tears them down and rebuilds them alongside (see [`RenderTargets`]).

use ash::vk;
use tracing::{debug, info, warn};

use crate::{
    device::{DepthTarget, GpuDevice, PipelineSet},
    error::{BackendCall, StartupError},
    renderer::{RenderTargets, RendererContext},
    surface::{swapchain_config, RenderSize, SurfaceProvider},
};

#[derive(Debug, Default)]
pub struct Swapchain {
    pub handle: vk::SwapchainKHR,
    pub format: vk::SurfaceFormatKHR,
    pub present_mode: vk::PresentModeKHR,
    pub extent: vk::Extent2D,
    pub images: Vec<vk::Image>,
    pub views: Vec<vk::ImageView>,
    pub depth: Option<DepthTarget>,
    /// Indexed by acquired image index, never by frame slot.
    pub framebuffers: Vec<vk::Framebuffer>,
}

impl Swapchain {
    pub fn image_count(&self) -> usize {
        self.images.len()
    }

    pub fn framebuffer(&self, image_index: u32) -> Option<vk::Framebuffer> {
        self.framebuffers.get(image_index as usize).copied()
    }

    /// True after teardown until the next successful rebuild.
    pub fn is_retired(&self) -> bool {
        self.handle == vk::SwapchainKHR::null()
    }

    pub fn aspect(&self) -> f32 {
        if self.extent.height == 0 {
            1.0
        } else {
            self.extent.width as f32 / self.extent.height as f32
        }
    }
}

/// Queries the surface fresh, selects format/mode/extent/count and creates
/// the swapchain plus its image list. Views and framebuffers are left empty.
pub fn create_swapchain<D: GpuDevice>(
    ctx: &RendererContext<D>,
    drawable: RenderSize,
    old: vk::SwapchainKHR,
) -> Result<Swapchain, StartupError> {
    let device = &ctx.device;
    let support = device
        .surface_support()
        .during("vkGetPhysicalDeviceSurfaceCapabilitiesKHR")?;
    let config = swapchain_config(&support, drawable, ctx.config.present)?;

    let handle = device
        .create_swapchain(&config, old)
        .during("vkCreateSwapchainKHR")?;
    let images = match device.swapchain_images(handle) {
        Ok(images) => images,
        Err(code) => {
            device.destroy_swapchain(handle);
            return Err(StartupError::Backend {
                call: "vkGetSwapchainImagesKHR",
                code,
            });
        }
    };

    info!(
        "swapchain {}x{} {:?} {:?} {:?} images={}",
        config.extent.width,
        config.extent.height,
        config.surface_format.format,
        config.surface_format.color_space,
        config.present_mode,
        images.len()
    );

    Ok(Swapchain {
        handle,
        format: config.surface_format,
        present_mode: config.present_mode,
        extent: config.extent,
        images,
        ..Default::default()
    })
}

/// One colour view per swapchain image, in image order.
pub fn create_image_views<D: GpuDevice>(
    ctx: &RendererContext<D>,
    swapchain: &mut Swapchain,
) -> Result<(), StartupError> {
    for &image in &swapchain.images {
        let view = ctx
            .device
            .create_image_view(image, swapchain.format.format)
            .during("vkCreateImageView")?;
        swapchain.views.push(view);
    }
    Ok(())
}

/// One framebuffer per image view, plus the shared depth view when present.
pub fn create_framebuffers<D: GpuDevice>(
    ctx: &RendererContext<D>,
    swapchain: &mut Swapchain,
) -> Result<(), StartupError> {
    let depth_view = swapchain.depth.map(|d| d.view);
    for &view in &swapchain.views {
        let fb = match depth_view {
            Some(depth) => ctx
                .device
                .create_framebuffer(&[view, depth], swapchain.extent),
            None => ctx.device.create_framebuffer(&[view], swapchain.extent),
        }
        .during("vkCreateFramebuffer")?;
        swapchain.framebuffers.push(fb);
    }
    Ok(())
}

/// Build order: swapchain, views, depth, pipelines, framebuffers.
pub fn build_render_targets<D: GpuDevice>(
    ctx: &RendererContext<D>,
    drawable: RenderSize,
) -> Result<RenderTargets, StartupError> {
    let mut swapchain = create_swapchain(ctx, drawable, vk::SwapchainKHR::null())?;
    let built = (|| -> Result<PipelineSet, StartupError> {
        create_image_views(ctx, &mut swapchain)?;
        if ctx.config.depth_test {
            swapchain.depth = Some(ctx.device.create_depth_target(swapchain.extent)?);
        }
        let pipelines = ctx.device.create_pipelines(swapchain.extent)?;
        if let Err(e) = create_framebuffers(ctx, &mut swapchain) {
            ctx.device.destroy_pipelines(&pipelines);
            return Err(e);
        }
        Ok(pipelines)
    })();

    match built {
        Ok(pipelines) => Ok(RenderTargets {
            swapchain,
            pipelines,
        }),
        Err(e) => {
            destroy_swapchain(ctx, &mut swapchain);
            Err(e)
        }
    }
}

/// Framebuffers, views, depth, then the swapchain itself. Idempotent.
pub fn destroy_swapchain<D: GpuDevice>(ctx: &RendererContext<D>, swapchain: &mut Swapchain) {
    let device = &ctx.device;
    for fb in swapchain.framebuffers.drain(..) {
        device.destroy_framebuffer(fb);
    }
    for view in swapchain.views.drain(..) {
        device.destroy_image_view(view);
    }
    if let Some(depth) = swapchain.depth.take() {
        device.destroy_depth_target(&depth);
    }
    if !swapchain.is_retired() {
        device.destroy_swapchain(swapchain.handle);
        swapchain.handle = vk::SwapchainKHR::null();
    }
    swapchain.images.clear();
}

pub fn destroy_render_targets<D: GpuDevice>(ctx: &RendererContext<D>, targets: &mut RenderTargets) {
    destroy_swapchain(ctx, &mut targets.swapchain);
    if !targets.pipelines.is_null() {
        ctx.device.destroy_pipelines(&targets.pipelines);
        targets.pipelines = Default::default();
    }
}

/// STRICT ORDER: wait idle, tear down everything sized by the window, stall
/// while the window is minimised, rebuild.
///
/// Frame slots are left alone; they do not depend on the swapchain.
/// Returns `Ok(false)` if the window asked to close while minimised, in
/// which case the targets stay torn down.
pub fn recreate_swapchain_and_dependents<D, S>(
    ctx: &RendererContext<D>,
    targets: &mut RenderTargets,
    surface: &mut S,
) -> Result<bool, StartupError>
where
    D: GpuDevice,
    S: SurfaceProvider + ?Sized,
{
    if let Err(code) = ctx.device.device_wait_idle() {
        warn!("vkDeviceWaitIdle before recreation failed: {code}");
    }
    destroy_render_targets(ctx, targets);

    let mut drawable = surface.drawable_size();
    while drawable.is_zero() {
        if surface.should_close() {
            debug!("close requested while minimised; skipping rebuild");
            return Ok(false);
        }
        surface.wait_events();
        drawable = surface.drawable_size();
    }

    *targets = build_render_targets(ctx, drawable)?;
    Ok(true)
}
