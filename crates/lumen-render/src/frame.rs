// SPDX-License-Identifier: CEPL-1.0
use std::mem::size_of;

use ash::vk;
use lumen_math::{ObjectData, UniformBufferObject};
use tracing::debug;

use crate::{
    buffer::AllocatedBuffer,
    device::GpuDevice,
    error::{BackendCall, StartupError},
    renderer::RendererContext,
};

/// Per-slot resources. A slot is reused every F frames, and only after its
/// fence shows the previous use finished on the GPU.
#[derive(Debug)]
pub struct FrameSlot {
    pub image_available: vk::Semaphore,
    pub render_done: vk::Semaphore,
    /// Created signaled so the first wait on a fresh slot returns at once.
    pub in_flight: vk::Fence,
    pub command_pool: vk::CommandPool,
    pub command_buffer: vk::CommandBuffer,
    pub uniforms: AllocatedBuffer,
    pub objects: AllocatedBuffer,
    pub descriptor_set: vk::DescriptorSet,
}

impl FrameSlot {
    fn empty() -> Self {
        Self {
            image_available: vk::Semaphore::null(),
            render_done: vk::Semaphore::null(),
            in_flight: vk::Fence::null(),
            command_pool: vk::CommandPool::null(),
            command_buffer: vk::CommandBuffer::null(),
            uniforms: AllocatedBuffer::default(),
            objects: AllocatedBuffer::default(),
            descriptor_set: vk::DescriptorSet::null(),
        }
    }

    fn create<D: GpuDevice>(ctx: &RendererContext<D>) -> Result<Self, StartupError> {
        let mut slot = Self::empty();
        match slot.fill(ctx) {
            Ok(()) => Ok(slot),
            Err(e) => {
                slot.destroy(&ctx.device);
                Err(e)
            }
        }
    }

    fn fill<D: GpuDevice>(&mut self, ctx: &RendererContext<D>) -> Result<(), StartupError> {
        let device = &ctx.device;
        let host = vk::MemoryPropertyFlags::HOST_VISIBLE | vk::MemoryPropertyFlags::HOST_COHERENT;

        self.image_available = device.create_semaphore().during("vkCreateSemaphore")?;
        self.render_done = device.create_semaphore().during("vkCreateSemaphore")?;
        self.in_flight = device.create_fence(true).during("vkCreateFence")?;
        self.command_pool = device.create_command_pool().during("vkCreateCommandPool")?;
        self.command_buffer = device
            .allocate_command_buffer(self.command_pool)
            .during("vkAllocateCommandBuffers")?;

        self.uniforms = device.create_buffer(
            size_of::<UniformBufferObject>() as vk::DeviceSize,
            vk::BufferUsageFlags::UNIFORM_BUFFER,
            host,
        )?;
        self.objects = device.create_buffer(
            (ctx.config.max_objects.max(1) * size_of::<ObjectData>()) as vk::DeviceSize,
            vk::BufferUsageFlags::STORAGE_BUFFER,
            host,
        )?;
        self.descriptor_set = device
            .allocate_frame_descriptor_set(&self.uniforms, &self.objects)
            .during("vkAllocateDescriptorSets")?;
        Ok(())
    }

    /// Skips handles that were never created.
    fn destroy<D: GpuDevice>(&self, device: &D) {
        for semaphore in [self.image_available, self.render_done] {
            if semaphore != vk::Semaphore::null() {
                device.destroy_semaphore(semaphore);
            }
        }
        if self.in_flight != vk::Fence::null() {
            device.destroy_fence(self.in_flight);
        }
        // frees the command buffer too; the descriptor set goes with the
        // backend's pool
        if self.command_pool != vk::CommandPool::null() {
            device.destroy_command_pool(self.command_pool);
        }
        for buffer in [&self.uniforms, &self.objects] {
            if !buffer.is_null() {
                device.destroy_buffer(buffer);
            }
        }
    }
}

/// The ring of F frame slots. Sized once at startup.
#[derive(Debug, Default)]
pub struct FrameResourceSet {
    slots: Vec<FrameSlot>,
}

impl FrameResourceSet {
    pub fn create<D: GpuDevice>(
        ctx: &RendererContext<D>,
        count: usize,
    ) -> Result<Self, StartupError> {
        let mut set = Self {
            slots: Vec::with_capacity(count),
        };
        for _ in 0..count {
            match FrameSlot::create(ctx) {
                Ok(slot) => set.slots.push(slot),
                Err(e) => {
                    set.destroy(&ctx.device);
                    return Err(e);
                }
            }
        }
        debug!("created {} frame slots", set.slots.len());
        Ok(set)
    }

    /// Caller must have waited for the device to go idle.
    pub fn destroy<D: GpuDevice>(&mut self, device: &D) {
        for slot in self.slots.drain(..) {
            slot.destroy(device);
        }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn slots(&self) -> &[FrameSlot] {
        &self.slots
    }
}
