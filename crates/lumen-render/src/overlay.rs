// SPDX-License-Identifier: CEPL-1.0
use ash::vk;
use lumen_math::CameraState;

use crate::device::GpuDevice;

/// Debug UI drawn inside the scene render pass, after the scene draws.
///
/// `render` runs on the CPU before any GPU work for the frame and may edit
/// the camera; its output is consumed by `record_into` during recording.
pub trait Overlay<D: GpuDevice> {
    type DrawData;

    fn begin_frame(&mut self);
    fn render(&mut self, camera: &mut CameraState) -> Self::DrawData;
    fn record_into(
        &mut self,
        device: &D,
        cmd: vk::CommandBuffer,
        extent: vk::Extent2D,
        data: &Self::DrawData,
    );
}

/// Draws nothing.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoOverlay;

impl<D: GpuDevice> Overlay<D> for NoOverlay {
    type DrawData = ();

    fn begin_frame(&mut self) {}

    fn render(&mut self, _camera: &mut CameraState) {}

    fn record_into(&mut self, _: &D, _: vk::CommandBuffer, _: vk::Extent2D, _: &()) {}
}
