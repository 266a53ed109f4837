// SPDX-License-Identifier: CEPL-1.0
use ash::{prelude::VkResult, vk};

use crate::{buffer::AllocatedBuffer, error::StartupError, surface::SurfaceSupport};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SwapchainConfig {
    pub surface_format: vk::SurfaceFormatKHR,
    pub present_mode: vk::PresentModeKHR,
    pub extent: vk::Extent2D,
    pub image_count: u32,
    pub pre_transform: vk::SurfaceTransformFlagsKHR,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DepthTarget {
    pub image: vk::Image,
    pub memory: vk::DeviceMemory,
    pub view: vk::ImageView,
    pub format: vk::Format,
}

/// Pipelines bake the swapchain extent into their viewport and scissor, so
/// they are rebuilt together with the swapchain.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PipelineSet {
    pub fill: vk::Pipeline,
    /// Only present when the device supports non-solid fill.
    pub wireframe: Option<vk::Pipeline>,
}

impl PipelineSet {
    pub fn select(&self, wireframe: bool) -> vk::Pipeline {
        match (wireframe, self.wireframe) {
            (true, Some(p)) => p,
            _ => self.fill,
        }
    }

    pub fn is_null(&self) -> bool {
        self.fill == vk::Pipeline::null()
    }
}

/// Device-local mesh data uploaded once at startup.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Geometry {
    pub vertex_buffer: vk::Buffer,
    pub index_buffer: vk::Buffer,
    pub index_count: u32,
}

/// One frame's graphics submission: wait for the acquired image at the
/// colour-output stage, then signal the present semaphore and the slot fence.
#[derive(Clone, Copy, Debug)]
pub struct FrameSubmit {
    pub command_buffer: vk::CommandBuffer,
    pub wait_semaphore: vk::Semaphore,
    pub wait_stage: vk::PipelineStageFlags,
    pub signal_semaphore: vk::Semaphore,
    pub fence: vk::Fence,
}

/// Everything the frame lifecycle needs from the GPU.
///
/// Methods take `&self` and mirror the Vulkan entry points they wrap. Calls
/// that can fail at frame time return the raw [`VkResult`] so the caller can
/// tell stale-swapchain codes apart from real failures; creation of objects
/// whose failure is unrecoverable returns [`StartupError`] directly.
pub trait GpuDevice {
    // surface and static resources
    fn surface_support(&self) -> VkResult<SurfaceSupport>;
    fn geometry(&self) -> Geometry;

    // swapchain-scoped
    fn create_swapchain(
        &self,
        config: &SwapchainConfig,
        old: vk::SwapchainKHR,
    ) -> VkResult<vk::SwapchainKHR>;
    fn swapchain_images(&self, swapchain: vk::SwapchainKHR) -> VkResult<Vec<vk::Image>>;
    fn destroy_swapchain(&self, swapchain: vk::SwapchainKHR);
    fn create_image_view(&self, image: vk::Image, format: vk::Format) -> VkResult<vk::ImageView>;
    fn destroy_image_view(&self, view: vk::ImageView);
    fn create_depth_target(&self, extent: vk::Extent2D) -> Result<DepthTarget, StartupError>;
    fn destroy_depth_target(&self, depth: &DepthTarget);
    /// Framebuffer compatible with the backend's render pass.
    fn create_framebuffer(
        &self,
        attachments: &[vk::ImageView],
        extent: vk::Extent2D,
    ) -> VkResult<vk::Framebuffer>;
    fn destroy_framebuffer(&self, framebuffer: vk::Framebuffer);
    fn create_pipelines(&self, extent: vk::Extent2D) -> Result<PipelineSet, StartupError>;
    fn destroy_pipelines(&self, pipelines: &PipelineSet);

    // frame slots
    fn create_semaphore(&self) -> VkResult<vk::Semaphore>;
    fn destroy_semaphore(&self, semaphore: vk::Semaphore);
    fn create_fence(&self, signaled: bool) -> VkResult<vk::Fence>;
    fn destroy_fence(&self, fence: vk::Fence);
    /// Pool on the graphics family whose buffers can be reset individually.
    fn create_command_pool(&self) -> VkResult<vk::CommandPool>;
    fn allocate_command_buffer(&self, pool: vk::CommandPool) -> VkResult<vk::CommandBuffer>;
    fn destroy_command_pool(&self, pool: vk::CommandPool);
    fn create_buffer(
        &self,
        size: vk::DeviceSize,
        usage: vk::BufferUsageFlags,
        properties: vk::MemoryPropertyFlags,
    ) -> Result<AllocatedBuffer, StartupError>;
    fn destroy_buffer(&self, buffer: &AllocatedBuffer);
    /// Descriptor set binding `uniform`, the shared texture and `storage`.
    fn allocate_frame_descriptor_set(
        &self,
        uniform: &AllocatedBuffer,
        storage: &AllocatedBuffer,
    ) -> VkResult<vk::DescriptorSet>;

    // per frame
    /// `Ok((index, suboptimal))`; `ERROR_OUT_OF_DATE_KHR` arrives as `Err`.
    fn acquire_next_image(
        &self,
        swapchain: vk::SwapchainKHR,
        signal: vk::Semaphore,
    ) -> VkResult<(u32, bool)>;
    fn wait_for_fence(&self, fence: vk::Fence) -> VkResult<()>;
    fn reset_fence(&self, fence: vk::Fence) -> VkResult<()>;
    /// Submission with no command buffers: waits on `wait` at the
    /// colour-output stage, then signals `fence`.
    fn signal_fence(&self, wait: vk::Semaphore, fence: vk::Fence) -> VkResult<()>;
    fn reset_command_buffer(&self, cmd: vk::CommandBuffer) -> VkResult<()>;
    /// Begins a one-time-submit recording.
    fn begin_command_buffer(&self, cmd: vk::CommandBuffer) -> VkResult<()>;
    fn end_command_buffer(&self, cmd: vk::CommandBuffer) -> VkResult<()>;
    /// Map, copy, unmap. `data` must fit in `buffer`.
    fn write_buffer(&self, buffer: &AllocatedBuffer, data: &[u8]) -> VkResult<()>;
    fn queue_submit(&self, submit: &FrameSubmit) -> VkResult<()>;
    /// `Ok(suboptimal)`; `ERROR_OUT_OF_DATE_KHR` arrives as `Err`.
    fn queue_present(
        &self,
        swapchain: vk::SwapchainKHR,
        image_index: u32,
        wait: vk::Semaphore,
    ) -> VkResult<bool>;
    fn device_wait_idle(&self) -> VkResult<()>;

    // recording
    fn cmd_begin_render_pass(
        &self,
        cmd: vk::CommandBuffer,
        framebuffer: vk::Framebuffer,
        extent: vk::Extent2D,
        clear_values: &[vk::ClearValue],
    );
    fn cmd_bind_pipeline(&self, cmd: vk::CommandBuffer, pipeline: vk::Pipeline);
    fn cmd_bind_vertex_buffer(&self, cmd: vk::CommandBuffer, buffer: vk::Buffer);
    /// Indices are 16-bit.
    fn cmd_bind_index_buffer(&self, cmd: vk::CommandBuffer, buffer: vk::Buffer);
    fn cmd_bind_descriptor_set(&self, cmd: vk::CommandBuffer, set: vk::DescriptorSet);
    fn cmd_draw_indexed(&self, cmd: vk::CommandBuffer, index_count: u32, first_instance: u32);
    /// Clears `rects` of the colour attachment inside the active render pass.
    fn cmd_clear_rects(&self, cmd: vk::CommandBuffer, color: [f32; 4], rects: &[vk::Rect2D]);
    fn cmd_end_render_pass(&self, cmd: vk::CommandBuffer);
}

#[cfg(test)]
mod tests {
    use super::*;
    use ash::vk::Handle;

    #[test]
    fn wireframe_falls_back_to_fill() {
        let fill = vk::Pipeline::from_raw(1);
        let wire = vk::Pipeline::from_raw(2);
        let without = PipelineSet {
            fill,
            wireframe: None,
        };
        assert_eq!(without.select(true), fill);
        let with = PipelineSet {
            fill,
            wireframe: Some(wire),
        };
        assert_eq!(with.select(true), wire);
        assert_eq!(with.select(false), fill);
    }
}
