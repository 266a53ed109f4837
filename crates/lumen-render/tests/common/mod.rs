// SPDX-License-Identifier: CEPL-1.0
//! Recording GPU and window doubles for lifecycle tests.
#![allow(dead_code)]

use std::{
    cell::{Cell, RefCell},
    collections::{HashMap, HashSet},
    ops::Deref,
    rc::Rc,
};

use lumen_render::{
    vk::{self, Handle},
    AllocatedBuffer, DepthTarget, FrameSubmit, Geometry, GpuDevice, PipelineSet, RenderSize,
    StartupError, SurfaceProvider, SurfaceSupport, SwapchainConfig,
};

type VkResult<T> = Result<T, vk::Result>;

pub const VERTEX_BUFFER: u64 = 0xbeef_0001;
pub const INDEX_BUFFER: u64 = 0xbeef_0002;
pub const INDEX_COUNT: u32 = 36;

#[derive(Clone, Debug, PartialEq)]
pub enum Call {
    WaitIdle,
    CreateSwapchain {
        handle: vk::SwapchainKHR,
        extent: vk::Extent2D,
        image_count: u32,
    },
    DestroySwapchain(vk::SwapchainKHR),
    DestroyView(vk::ImageView),
    CreateDepth,
    DestroyDepth,
    CreateFramebuffer {
        framebuffer: vk::Framebuffer,
        attachments: usize,
    },
    DestroyFramebuffer(vk::Framebuffer),
    CreatePipelines(vk::Extent2D),
    DestroyPipelines,
    DestroySemaphore(vk::Semaphore),
    DestroyFence(vk::Fence),
    DestroyCommandPool(vk::CommandPool),
    DestroyBuffer(vk::Buffer),
    Acquire {
        semaphore: vk::Semaphore,
    },
    WaitFence {
        fence: vk::Fence,
        signaled: bool,
    },
    ResetFence(vk::Fence),
    SignalFence {
        wait: vk::Semaphore,
        fence: vk::Fence,
    },
    ResetCommandBuffer(vk::CommandBuffer),
    BeginCommandBuffer(vk::CommandBuffer),
    EndCommandBuffer(vk::CommandBuffer),
    WriteBuffer {
        buffer: vk::Buffer,
        len: usize,
    },
    Submit {
        command_buffer: vk::CommandBuffer,
        wait: vk::Semaphore,
        signal: vk::Semaphore,
        fence: vk::Fence,
    },
    Present {
        image_index: u32,
        wait: vk::Semaphore,
    },
    BeginRenderPass {
        framebuffer: vk::Framebuffer,
        clear_count: usize,
        clear_color: [f32; 4],
    },
    BindPipeline(vk::Pipeline),
    BindVertexBuffer(vk::Buffer),
    BindIndexBuffer(vk::Buffer),
    BindDescriptorSet(vk::DescriptorSet),
    DrawIndexed {
        index_count: u32,
        first_instance: u32,
    },
    ClearRects(usize),
    EndRenderPass,
}

pub struct MockState {
    next_handle: Cell<u64>,
    pub calls: RefCell<Vec<Call>>,
    pub support: RefCell<SurfaceSupport>,
    pub wireframe_supported: Cell<bool>,
    /// Handles created and not yet destroyed.
    pub live: RefCell<HashSet<u64>>,
    signaled: RefCell<HashSet<vk::Fence>>,
    acquire_calls: Cell<u32>,
    submit_calls: Cell<u32>,
    present_calls: Cell<u32>,
    buffer_calls: Cell<u32>,
    /// 1-based `create_buffer` call that fails.
    pub fail_buffer_call: Cell<Option<u32>>,
    rotation: Cell<u32>,
    image_count: Cell<u32>,
    /// Image indices handed out in turn, instead of strict rotation.
    pub image_order: RefCell<Vec<u32>>,
    /// Keyed by 1-based call number.
    pub acquire_script: RefCell<HashMap<u32, VkResult<(u32, bool)>>>,
    pub submit_script: RefCell<HashMap<u32, vk::Result>>,
    pub present_script: RefCell<HashMap<u32, VkResult<bool>>>,
}

#[derive(Clone)]
pub struct MockDevice(Rc<MockState>);

impl Deref for MockDevice {
    type Target = MockState;

    fn deref(&self) -> &MockState {
        &self.0
    }
}

pub fn sentinel_caps(min_images: u32) -> vk::SurfaceCapabilitiesKHR {
    vk::SurfaceCapabilitiesKHR {
        min_image_count: min_images,
        max_image_count: 0,
        current_extent: vk::Extent2D {
            width: u32::MAX,
            height: u32::MAX,
        },
        min_image_extent: vk::Extent2D {
            width: 1,
            height: 1,
        },
        max_image_extent: vk::Extent2D {
            width: 4096,
            height: 4096,
        },
        supported_transforms: vk::SurfaceTransformFlagsKHR::IDENTITY,
        current_transform: vk::SurfaceTransformFlagsKHR::IDENTITY,
        ..Default::default()
    }
}

impl MockDevice {
    /// Surface offering three images (min 2 + 1), BGRA sRGB, FIFO + MAILBOX.
    pub fn new() -> Self {
        Self::with_caps(sentinel_caps(2))
    }

    pub fn with_caps(capabilities: vk::SurfaceCapabilitiesKHR) -> Self {
        Self(Rc::new(MockState {
            next_handle: Cell::new(1),
            calls: RefCell::new(Vec::new()),
            support: RefCell::new(SurfaceSupport {
                capabilities,
                formats: vec![
                    vk::SurfaceFormatKHR {
                        format: vk::Format::R8G8B8A8_UNORM,
                        color_space: vk::ColorSpaceKHR::SRGB_NONLINEAR,
                    },
                    lumen_render::PREFERRED_SURFACE_FORMAT,
                ],
                present_modes: vec![vk::PresentModeKHR::FIFO, vk::PresentModeKHR::MAILBOX],
            }),
            wireframe_supported: Cell::new(true),
            live: RefCell::new(HashSet::new()),
            signaled: RefCell::new(HashSet::new()),
            acquire_calls: Cell::new(0),
            submit_calls: Cell::new(0),
            present_calls: Cell::new(0),
            buffer_calls: Cell::new(0),
            fail_buffer_call: Cell::new(None),
            rotation: Cell::new(0),
            image_count: Cell::new(0),
            image_order: RefCell::new(Vec::new()),
            acquire_script: RefCell::new(HashMap::new()),
            submit_script: RefCell::new(HashMap::new()),
            present_script: RefCell::new(HashMap::new()),
        }))
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.borrow().clone()
    }

    pub fn count(&self, pred: impl Fn(&Call) -> bool) -> usize {
        self.calls.borrow().iter().filter(|c| pred(c)).count()
    }

    pub fn clear_calls(&self) {
        self.calls.borrow_mut().clear();
    }

    fn log(&self, call: Call) {
        self.calls.borrow_mut().push(call);
    }

    fn handle<H: Handle>(&self) -> H {
        let raw = self.next_handle.get();
        self.next_handle.set(raw + 1);
        H::from_raw(raw)
    }

    fn tracked<H: Handle + Copy>(&self) -> H {
        let h: H = self.handle();
        self.live.borrow_mut().insert(h.as_raw());
        h
    }

    fn release<H: Handle>(&self, h: H) {
        self.live.borrow_mut().remove(&h.as_raw());
    }
}

impl GpuDevice for MockDevice {
    fn surface_support(&self) -> VkResult<SurfaceSupport> {
        Ok(self.support.borrow().clone())
    }

    fn geometry(&self) -> Geometry {
        Geometry {
            vertex_buffer: vk::Buffer::from_raw(VERTEX_BUFFER),
            index_buffer: vk::Buffer::from_raw(INDEX_BUFFER),
            index_count: INDEX_COUNT,
        }
    }

    fn create_swapchain(
        &self,
        config: &SwapchainConfig,
        _old: vk::SwapchainKHR,
    ) -> VkResult<vk::SwapchainKHR> {
        let handle = self.tracked();
        self.image_count.set(config.image_count);
        self.rotation.set(0);
        self.log(Call::CreateSwapchain {
            handle,
            extent: config.extent,
            image_count: config.image_count,
        });
        Ok(handle)
    }

    fn swapchain_images(&self, _swapchain: vk::SwapchainKHR) -> VkResult<Vec<vk::Image>> {
        Ok((0..self.image_count.get()).map(|_| self.handle()).collect())
    }

    fn destroy_swapchain(&self, swapchain: vk::SwapchainKHR) {
        self.release(swapchain);
        self.log(Call::DestroySwapchain(swapchain));
    }

    fn create_image_view(&self, _image: vk::Image, _format: vk::Format) -> VkResult<vk::ImageView> {
        Ok(self.tracked())
    }

    fn destroy_image_view(&self, view: vk::ImageView) {
        self.release(view);
        self.log(Call::DestroyView(view));
    }

    fn create_depth_target(&self, _extent: vk::Extent2D) -> Result<DepthTarget, StartupError> {
        self.log(Call::CreateDepth);
        Ok(DepthTarget {
            image: self.handle(),
            memory: self.handle(),
            view: self.tracked(),
            format: vk::Format::D32_SFLOAT,
        })
    }

    fn destroy_depth_target(&self, depth: &DepthTarget) {
        self.release(depth.view);
        self.log(Call::DestroyDepth);
    }

    fn create_framebuffer(
        &self,
        attachments: &[vk::ImageView],
        _extent: vk::Extent2D,
    ) -> VkResult<vk::Framebuffer> {
        let framebuffer = self.tracked();
        self.log(Call::CreateFramebuffer {
            framebuffer,
            attachments: attachments.len(),
        });
        Ok(framebuffer)
    }

    fn destroy_framebuffer(&self, framebuffer: vk::Framebuffer) {
        self.release(framebuffer);
        self.log(Call::DestroyFramebuffer(framebuffer));
    }

    fn create_pipelines(&self, extent: vk::Extent2D) -> Result<PipelineSet, StartupError> {
        self.log(Call::CreatePipelines(extent));
        let fill = self.tracked();
        let wireframe = self.wireframe_supported.get().then(|| self.tracked());
        Ok(PipelineSet { fill, wireframe })
    }

    fn destroy_pipelines(&self, pipelines: &PipelineSet) {
        self.release(pipelines.fill);
        if let Some(w) = pipelines.wireframe {
            self.release(w);
        }
        self.log(Call::DestroyPipelines);
    }

    fn create_semaphore(&self) -> VkResult<vk::Semaphore> {
        Ok(self.tracked())
    }

    fn destroy_semaphore(&self, semaphore: vk::Semaphore) {
        self.release(semaphore);
        self.log(Call::DestroySemaphore(semaphore));
    }

    fn create_fence(&self, signaled: bool) -> VkResult<vk::Fence> {
        let fence = self.tracked();
        if signaled {
            self.signaled.borrow_mut().insert(fence);
        }
        Ok(fence)
    }

    fn destroy_fence(&self, fence: vk::Fence) {
        self.release(fence);
        self.log(Call::DestroyFence(fence));
    }

    fn create_command_pool(&self) -> VkResult<vk::CommandPool> {
        Ok(self.tracked())
    }

    fn allocate_command_buffer(&self, _pool: vk::CommandPool) -> VkResult<vk::CommandBuffer> {
        Ok(self.handle())
    }

    fn destroy_command_pool(&self, pool: vk::CommandPool) {
        self.release(pool);
        self.log(Call::DestroyCommandPool(pool));
    }

    fn create_buffer(
        &self,
        size: vk::DeviceSize,
        _usage: vk::BufferUsageFlags,
        _properties: vk::MemoryPropertyFlags,
    ) -> Result<AllocatedBuffer, StartupError> {
        let n = self.buffer_calls.get() + 1;
        self.buffer_calls.set(n);
        if self.fail_buffer_call.get() == Some(n) {
            return Err(StartupError::Backend {
                call: "vkAllocateMemory",
                code: vk::Result::ERROR_OUT_OF_DEVICE_MEMORY,
            });
        }
        Ok(AllocatedBuffer {
            buffer: self.tracked(),
            memory: self.handle(),
            size,
        })
    }

    fn destroy_buffer(&self, buffer: &AllocatedBuffer) {
        self.release(buffer.buffer);
        self.log(Call::DestroyBuffer(buffer.buffer));
    }

    fn allocate_frame_descriptor_set(
        &self,
        _uniform: &AllocatedBuffer,
        _storage: &AllocatedBuffer,
    ) -> VkResult<vk::DescriptorSet> {
        Ok(self.handle())
    }

    fn acquire_next_image(
        &self,
        _swapchain: vk::SwapchainKHR,
        signal: vk::Semaphore,
    ) -> VkResult<(u32, bool)> {
        let n = self.acquire_calls.get() + 1;
        self.acquire_calls.set(n);
        self.log(Call::Acquire { semaphore: signal });
        if let Some(r) = self.acquire_script.borrow_mut().remove(&n) {
            return r;
        }
        let turn = self.rotation.get();
        self.rotation.set(turn + 1);
        let order = self.image_order.borrow();
        let index = if order.is_empty() {
            turn % self.image_count.get().max(1)
        } else {
            order[turn as usize % order.len()]
        };
        Ok((index, false))
    }

    fn wait_for_fence(&self, fence: vk::Fence) -> VkResult<()> {
        let signaled = self.signaled.borrow().contains(&fence);
        self.log(Call::WaitFence { fence, signaled });
        Ok(())
    }

    fn reset_fence(&self, fence: vk::Fence) -> VkResult<()> {
        self.signaled.borrow_mut().remove(&fence);
        self.log(Call::ResetFence(fence));
        Ok(())
    }

    fn signal_fence(&self, wait: vk::Semaphore, fence: vk::Fence) -> VkResult<()> {
        self.signaled.borrow_mut().insert(fence);
        self.log(Call::SignalFence { wait, fence });
        Ok(())
    }

    fn reset_command_buffer(&self, cmd: vk::CommandBuffer) -> VkResult<()> {
        self.log(Call::ResetCommandBuffer(cmd));
        Ok(())
    }

    fn begin_command_buffer(&self, cmd: vk::CommandBuffer) -> VkResult<()> {
        self.log(Call::BeginCommandBuffer(cmd));
        Ok(())
    }

    fn end_command_buffer(&self, cmd: vk::CommandBuffer) -> VkResult<()> {
        self.log(Call::EndCommandBuffer(cmd));
        Ok(())
    }

    fn write_buffer(&self, buffer: &AllocatedBuffer, data: &[u8]) -> VkResult<()> {
        assert!(data.len() as u64 <= buffer.size, "write past end of buffer");
        self.log(Call::WriteBuffer {
            buffer: buffer.buffer,
            len: data.len(),
        });
        Ok(())
    }

    fn queue_submit(&self, submit: &FrameSubmit) -> VkResult<()> {
        let n = self.submit_calls.get() + 1;
        self.submit_calls.set(n);
        if let Some(code) = self.submit_script.borrow_mut().remove(&n) {
            return Err(code);
        }
        assert_eq!(
            submit.wait_stage,
            vk::PipelineStageFlags::COLOR_ATTACHMENT_OUTPUT
        );
        self.log(Call::Submit {
            command_buffer: submit.command_buffer,
            wait: submit.wait_semaphore,
            signal: submit.signal_semaphore,
            fence: submit.fence,
        });
        // the GPU finishes instantly
        self.signaled.borrow_mut().insert(submit.fence);
        Ok(())
    }

    fn queue_present(
        &self,
        _swapchain: vk::SwapchainKHR,
        image_index: u32,
        wait: vk::Semaphore,
    ) -> VkResult<bool> {
        let n = self.present_calls.get() + 1;
        self.present_calls.set(n);
        self.log(Call::Present { image_index, wait });
        self.present_script
            .borrow_mut()
            .remove(&n)
            .unwrap_or(Ok(false))
    }

    fn device_wait_idle(&self) -> VkResult<()> {
        self.log(Call::WaitIdle);
        Ok(())
    }

    fn cmd_begin_render_pass(
        &self,
        _cmd: vk::CommandBuffer,
        framebuffer: vk::Framebuffer,
        _extent: vk::Extent2D,
        clear_values: &[vk::ClearValue],
    ) {
        let clear_color = unsafe { clear_values[0].color.float32 };
        self.log(Call::BeginRenderPass {
            framebuffer,
            clear_count: clear_values.len(),
            clear_color,
        });
    }

    fn cmd_bind_pipeline(&self, _cmd: vk::CommandBuffer, pipeline: vk::Pipeline) {
        self.log(Call::BindPipeline(pipeline));
    }

    fn cmd_bind_vertex_buffer(&self, _cmd: vk::CommandBuffer, buffer: vk::Buffer) {
        self.log(Call::BindVertexBuffer(buffer));
    }

    fn cmd_bind_index_buffer(&self, _cmd: vk::CommandBuffer, buffer: vk::Buffer) {
        self.log(Call::BindIndexBuffer(buffer));
    }

    fn cmd_bind_descriptor_set(&self, _cmd: vk::CommandBuffer, set: vk::DescriptorSet) {
        self.log(Call::BindDescriptorSet(set));
    }

    fn cmd_draw_indexed(&self, _cmd: vk::CommandBuffer, index_count: u32, first_instance: u32) {
        self.log(Call::DrawIndexed {
            index_count,
            first_instance,
        });
    }

    fn cmd_clear_rects(&self, _cmd: vk::CommandBuffer, _color: [f32; 4], rects: &[vk::Rect2D]) {
        self.log(Call::ClearRects(rects.len()));
    }

    fn cmd_end_render_pass(&self, _cmd: vk::CommandBuffer) {
        self.log(Call::EndRenderPass);
    }
}

/// Window double. Reports (0,0) until `wait_events` has run
/// `minimized_for` times.
pub struct MockSurface {
    pub size: RenderSize,
    pub minimized_for: usize,
    pub waits: usize,
    pub polls: usize,
    pub close_requested: bool,
}

impl MockSurface {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            size: RenderSize::new(width, height),
            minimized_for: 0,
            waits: 0,
            polls: 0,
            close_requested: false,
        }
    }

    pub fn minimized(mut self, waits: usize) -> Self {
        self.minimized_for = self.waits + waits;
        self
    }
}

impl SurfaceProvider for MockSurface {
    fn drawable_size(&self) -> RenderSize {
        if self.waits < self.minimized_for {
            RenderSize::default()
        } else {
            self.size
        }
    }

    fn poll_events(&mut self) {
        self.polls += 1;
    }

    fn wait_events(&mut self) {
        self.waits += 1;
    }

    fn should_close(&self) -> bool {
        self.close_requested
    }
}
