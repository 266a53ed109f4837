// SPDX-License-Identifier: CEPL-1.0
use ash::vk;
use lumen_render::{AllocatedBuffer, BackendCall, StartupError};

/// First memory type allowed by `type_bits` whose flags contain `flags`.
pub fn pick_memory_type(
    props: &vk::PhysicalDeviceMemoryProperties,
    type_bits: u32,
    flags: vk::MemoryPropertyFlags,
) -> Result<u32, StartupError> {
    (0..props.memory_type_count)
        .find(|&i| {
            (type_bits & (1 << i)) != 0
                && props.memory_types[i as usize].property_flags.contains(flags)
        })
        .ok_or(StartupError::NoSuitableMemoryType { type_bits, flags })
}

pub(crate) unsafe fn allocate(
    device: &ash::Device,
    props: &vk::PhysicalDeviceMemoryProperties,
    req: vk::MemoryRequirements,
    flags: vk::MemoryPropertyFlags,
) -> Result<vk::DeviceMemory, StartupError> {
    let mai = vk::MemoryAllocateInfo {
        s_type: vk::StructureType::MEMORY_ALLOCATE_INFO,
        allocation_size: req.size,
        memory_type_index: pick_memory_type(props, req.memory_type_bits, flags)?,
        ..Default::default()
    };
    device.allocate_memory(&mai, None).during("vkAllocateMemory")
}

pub(crate) unsafe fn create_buffer_and_memory(
    device: &ash::Device,
    props: &vk::PhysicalDeviceMemoryProperties,
    size: vk::DeviceSize,
    usage: vk::BufferUsageFlags,
    flags: vk::MemoryPropertyFlags,
) -> Result<AllocatedBuffer, StartupError> {
    let bci = vk::BufferCreateInfo {
        s_type: vk::StructureType::BUFFER_CREATE_INFO,
        size,
        usage,
        sharing_mode: vk::SharingMode::EXCLUSIVE,
        ..Default::default()
    };
    let buffer = device.create_buffer(&bci, None).during("vkCreateBuffer")?;
    let req = device.get_buffer_memory_requirements(buffer);
    let memory = match allocate(device, props, req, flags) {
        Ok(m) => m,
        Err(e) => {
            device.destroy_buffer(buffer, None);
            return Err(e);
        }
    };
    if let Err(e) = device
        .bind_buffer_memory(buffer, memory, 0)
        .during("vkBindBufferMemory")
    {
        device.destroy_buffer(buffer, None);
        device.free_memory(memory, None);
        return Err(e);
    }
    Ok(AllocatedBuffer {
        buffer,
        memory,
        size,
    })
}

pub(crate) unsafe fn destroy_buffer(device: &ash::Device, buffer: &AllocatedBuffer) {
    device.destroy_buffer(buffer.buffer, None);
    device.free_memory(buffer.memory, None);
}

/// Map, copy, unmap. Memory must be HOST_VISIBLE | HOST_COHERENT.
pub(crate) unsafe fn write_mapped(
    device: &ash::Device,
    buffer: &AllocatedBuffer,
    data: &[u8],
) -> ash::prelude::VkResult<()> {
    debug_assert!(data.len() as vk::DeviceSize <= buffer.size);
    let ptr = device.map_memory(
        buffer.memory,
        0,
        data.len() as vk::DeviceSize,
        vk::MemoryMapFlags::empty(),
    )?;
    std::ptr::copy_nonoverlapping(data.as_ptr(), ptr.cast::<u8>(), data.len());
    device.unmap_memory(buffer.memory);
    Ok(())
}

/// Records `f` into a throwaway command buffer, submits it and waits for
/// the queue to drain.
pub(crate) unsafe fn submit_one_time(
    device: &ash::Device,
    queue: vk::Queue,
    pool: vk::CommandPool,
    f: impl FnOnce(vk::CommandBuffer),
) -> Result<(), StartupError> {
    let ai = vk::CommandBufferAllocateInfo {
        s_type: vk::StructureType::COMMAND_BUFFER_ALLOCATE_INFO,
        command_pool: pool,
        level: vk::CommandBufferLevel::PRIMARY,
        command_buffer_count: 1,
        ..Default::default()
    };
    let cmd = device
        .allocate_command_buffers(&ai)
        .during("vkAllocateCommandBuffers")?[0];
    let bi = vk::CommandBufferBeginInfo {
        s_type: vk::StructureType::COMMAND_BUFFER_BEGIN_INFO,
        flags: vk::CommandBufferUsageFlags::ONE_TIME_SUBMIT,
        ..Default::default()
    };
    let result = (|| -> Result<(), StartupError> {
        device
            .begin_command_buffer(cmd, &bi)
            .during("vkBeginCommandBuffer")?;
        f(cmd);
        device
            .end_command_buffer(cmd)
            .during("vkEndCommandBuffer")?;
        let si = vk::SubmitInfo {
            s_type: vk::StructureType::SUBMIT_INFO,
            command_buffer_count: 1,
            p_command_buffers: &cmd,
            ..Default::default()
        };
        device
            .queue_submit(queue, std::slice::from_ref(&si), vk::Fence::null())
            .during("vkQueueSubmit")?;
        device.queue_wait_idle(queue).during("vkQueueWaitIdle")
    })();
    device.free_command_buffers(pool, std::slice::from_ref(&cmd));
    result
}

/// One-shot staging upload into a new device-local buffer.
pub(crate) unsafe fn upload_via_staging(
    device: &ash::Device,
    props: &vk::PhysicalDeviceMemoryProperties,
    queue: vk::Queue,
    pool: vk::CommandPool,
    usage: vk::BufferUsageFlags,
    data: &[u8],
) -> Result<AllocatedBuffer, StartupError> {
    let size = data.len() as vk::DeviceSize;
    let host = vk::MemoryPropertyFlags::HOST_VISIBLE | vk::MemoryPropertyFlags::HOST_COHERENT;
    let staging =
        create_buffer_and_memory(device, props, size, vk::BufferUsageFlags::TRANSFER_SRC, host)?;

    let uploaded = (|| -> Result<AllocatedBuffer, StartupError> {
        write_mapped(device, &staging, data).during("vkMapMemory")?;
        let dst = create_buffer_and_memory(
            device,
            props,
            size,
            usage | vk::BufferUsageFlags::TRANSFER_DST,
            vk::MemoryPropertyFlags::DEVICE_LOCAL,
        )?;
        let region = vk::BufferCopy {
            src_offset: 0,
            dst_offset: 0,
            size,
        };
        let copied = submit_one_time(device, queue, pool, |cmd| {
            device.cmd_copy_buffer(cmd, staging.buffer, dst.buffer, std::slice::from_ref(&region));
        });
        match copied {
            Ok(()) => Ok(dst),
            Err(e) => {
                destroy_buffer(device, &dst);
                Err(e)
            }
        }
    })();

    destroy_buffer(device, &staging);
    uploaded
}
