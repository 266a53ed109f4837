// SPDX-License-Identifier: CEPL-1.0
use ash::vk;

use crate::{
    device::{Geometry, GpuDevice},
    overlay::Overlay,
};

/// What one frame draws into the framebuffer of the acquired image.
#[derive(Clone, Copy, Debug)]
pub struct DrawParams {
    pub framebuffer: vk::Framebuffer,
    pub extent: vk::Extent2D,
    pub clear_color: [f32; 4],
    /// Adds a depth clear value of 1.0.
    pub clear_depth: bool,
    pub pipeline: vk::Pipeline,
    pub geometry: Geometry,
    pub descriptor_set: vk::DescriptorSet,
    /// One indexed draw per object; instance i reads object i.
    pub object_count: u32,
}

/// Emits the render pass for one frame into an already begun command buffer.
pub struct CommandRecorder;

impl CommandRecorder {
    pub fn record<D, O>(
        device: &D,
        cmd: vk::CommandBuffer,
        params: &DrawParams,
        overlay: &mut O,
        overlay_data: &O::DrawData,
    ) where
        D: GpuDevice,
        O: Overlay<D> + ?Sized,
    {
        let mut clears = vec![vk::ClearValue {
            color: vk::ClearColorValue {
                float32: params.clear_color,
            },
        }];
        if params.clear_depth {
            clears.push(vk::ClearValue {
                depth_stencil: vk::ClearDepthStencilValue {
                    depth: 1.0,
                    stencil: 0,
                },
            });
        }

        device.cmd_begin_render_pass(cmd, params.framebuffer, params.extent, &clears);
        device.cmd_bind_pipeline(cmd, params.pipeline);
        device.cmd_bind_vertex_buffer(cmd, params.geometry.vertex_buffer);
        device.cmd_bind_index_buffer(cmd, params.geometry.index_buffer);
        device.cmd_bind_descriptor_set(cmd, params.descriptor_set);
        for i in 0..params.object_count {
            device.cmd_draw_indexed(cmd, params.geometry.index_count, i);
        }
        overlay.record_into(device, cmd, params.extent, overlay_data);
        device.cmd_end_render_pass(cmd);
    }
}
