// SPDX-License-Identifier: CEPL-1.0
//! The per-frame state machine.
//!
//! One call to [`FrameOrchestrator::render_frame`] runs, in this order:
//! acquire an image, wait for and reset the slot fence, update the slot's
//! buffers, record, submit, present, advance the slot counter. The slot is
//! chosen by the frame counter; the framebuffer by the acquired image index.
//! The two are unrelated and must never be swapped.

use ash::{prelude::VkResult, vk};
use lumen_math::{glam::Vec3, CameraState, ObjectData};
use tracing::{debug, error, trace, warn};

use crate::{
    device::{FrameSubmit, GpuDevice},
    error::RenderError,
    frame::{FrameResourceSet, FrameSlot},
    overlay::Overlay,
    recorder::{CommandRecorder, DrawParams},
    renderer::{RenderTargets, RendererContext},
    surface::SurfaceProvider,
    swapchain::recreate_swapchain_and_dependents,
};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FrameState {
    #[default]
    Idle,
    Acquiring,
    Recording,
    Submitting,
    Presenting,
    Recreating,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FrameStats {
    /// Times the slot counter moved on.
    pub advanced: u64,
    pub presented: u64,
    pub recreations: u64,
    /// Frames dropped at acquire (stale swapchain or acquire failure).
    pub abandoned: u64,
    /// Failed backend calls that cost the frame.
    pub failures: u64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FrameOutcome {
    Presented { slot: usize, image_index: u32 },
    /// Presented, then rebuilt because present reported a suboptimal
    /// swapchain or a resize had been flagged.
    PresentedThenRecreated { slot: usize, image_index: u32 },
    /// The swapchain was out of date and has been rebuilt; nothing reached
    /// the screen. `advanced` is false when this was found at acquire.
    Recreated { advanced: bool },
}

/// CPU-side inputs for one frame.
#[derive(Clone, Copy, Debug)]
pub struct FrameInput<'a> {
    pub camera: &'a CameraState,
    pub objects: &'a [Vec3],
}

#[derive(Debug)]
pub struct FrameOrchestrator {
    slot_count: usize,
    /// Always in `0..slot_count`.
    frame_counter: usize,
    state: FrameState,
    resize_pending: bool,
    /// An acquired image was never presented. The swapchain is rebuilt
    /// before the next acquire to hand it back.
    image_orphaned: bool,
    stats: FrameStats,
}

impl FrameOrchestrator {
    pub fn new(slot_count: usize) -> Self {
        Self {
            slot_count: slot_count.max(1),
            frame_counter: 0,
            state: FrameState::Idle,
            resize_pending: false,
            image_orphaned: false,
            stats: FrameStats::default(),
        }
    }

    /// Slot the next frame will use.
    pub fn slot_index(&self) -> usize {
        self.frame_counter
    }

    pub fn slot_count(&self) -> usize {
        self.slot_count
    }

    /// Phase of the frame in progress. Outside `render_frame` this is
    /// always `Idle`.
    pub fn state(&self) -> FrameState {
        self.state
    }

    pub fn stats(&self) -> FrameStats {
        self.stats
    }

    /// Flags the swapchain as stale (e.g. the window was resized). It is
    /// rebuilt after the next present.
    pub fn mark_stale(&mut self) {
        self.resize_pending = true;
    }

    #[allow(clippy::too_many_arguments)]
    pub fn render_frame<D, S, O>(
        &mut self,
        ctx: &RendererContext<D>,
        targets: &mut RenderTargets,
        frames: &FrameResourceSet,
        surface: &mut S,
        input: &FrameInput<'_>,
        overlay: &mut O,
        overlay_data: &O::DrawData,
    ) -> Result<FrameOutcome, RenderError>
    where
        D: GpuDevice,
        S: SurfaceProvider + ?Sized,
        O: Overlay<D> + ?Sized,
    {
        let out = self.run_frame(ctx, targets, frames, surface, input, overlay, overlay_data);
        self.enter(FrameState::Idle);
        out
    }

    #[allow(clippy::too_many_arguments)]
    fn run_frame<D, S, O>(
        &mut self,
        ctx: &RendererContext<D>,
        targets: &mut RenderTargets,
        frames: &FrameResourceSet,
        surface: &mut S,
        input: &FrameInput<'_>,
        overlay: &mut O,
        overlay_data: &O::DrawData,
    ) -> Result<FrameOutcome, RenderError>
    where
        D: GpuDevice,
        S: SurfaceProvider + ?Sized,
        O: Overlay<D> + ?Sized,
    {
        let device = &ctx.device;
        let slot_index = self.frame_counter;
        let slot = &frames.slots()[slot_index];

        if targets.swapchain.is_retired() || self.image_orphaned {
            self.recreate(ctx, targets, surface)?;
            return Ok(FrameOutcome::Recreated { advanced: false });
        }

        // 1. acquire
        self.enter(FrameState::Acquiring);
        let image_index =
            match device.acquire_next_image(targets.swapchain.handle, slot.image_available) {
                Ok((index, suboptimal)) => {
                    if suboptimal {
                        trace!("acquire reported a suboptimal swapchain");
                    }
                    index
                }
                Err(vk::Result::ERROR_OUT_OF_DATE_KHR) => {
                    debug!("swapchain out of date at acquire");
                    self.stats.abandoned += 1;
                    self.recreate(ctx, targets, surface)?;
                    return Ok(FrameOutcome::Recreated { advanced: false });
                }
                Err(code) => {
                    error!("vkAcquireNextImageKHR failed: {code}");
                    self.stats.abandoned += 1;
                    self.stats.failures += 1;
                    return Err(RenderError::Backend {
                        call: "vkAcquireNextImageKHR",
                        code,
                    });
                }
            };

        // 2. throttle: the slot's previous submission must be done before
        // anything it owns is touched.
        log_failure("vkWaitForFences", device.wait_for_fence(slot.in_flight));
        log_failure("vkResetFences", device.reset_fence(slot.in_flight));

        let Some(framebuffer) = targets.swapchain.framebuffer(image_index) else {
            error!(
                "acquired image {image_index} but only {} framebuffers exist",
                targets.swapchain.framebuffers.len()
            );
            return Err(self.drop_submission(
                device,
                slot,
                "vkAcquireNextImageKHR",
                vk::Result::ERROR_UNKNOWN,
            ));
        };

        // 3. per-frame data
        let object_count = self.write_slot_buffers(device, slot, targets, input);

        // 4. record
        self.enter(FrameState::Recording);
        let cmd = slot.command_buffer;
        let params = DrawParams {
            framebuffer,
            extent: targets.swapchain.extent,
            clear_color: ctx.config.clear_color,
            clear_depth: targets.swapchain.depth.is_some(),
            pipeline: targets.pipelines.select(input.camera.wireframe),
            geometry: device.geometry(),
            descriptor_set: slot.descriptor_set,
            object_count,
        };
        let recorded = device
            .reset_command_buffer(cmd)
            .map_err(|code| ("vkResetCommandBuffer", code))
            .and_then(|()| {
                device
                    .begin_command_buffer(cmd)
                    .map_err(|code| ("vkBeginCommandBuffer", code))
            })
            .map(|()| CommandRecorder::record(device, cmd, &params, overlay, overlay_data))
            .and_then(|()| {
                device
                    .end_command_buffer(cmd)
                    .map_err(|code| ("vkEndCommandBuffer", code))
            });
        if let Err((call, code)) = recorded {
            error!("{call} failed: {code}");
            return Err(self.drop_submission(device, slot, call, code));
        }

        // 5. submit
        self.enter(FrameState::Submitting);
        let submit = FrameSubmit {
            command_buffer: cmd,
            wait_semaphore: slot.image_available,
            wait_stage: vk::PipelineStageFlags::COLOR_ATTACHMENT_OUTPUT,
            signal_semaphore: slot.render_done,
            fence: slot.in_flight,
        };
        if let Err(code) = device.queue_submit(&submit) {
            error!("vkQueueSubmit failed: {code}");
            return Err(self.drop_submission(device, slot, "vkQueueSubmit", code));
        }

        // 6. present, then advance whatever present said
        self.enter(FrameState::Presenting);
        let presented =
            device.queue_present(targets.swapchain.handle, image_index, slot.render_done);
        self.advance();

        match presented {
            Ok(suboptimal) => {
                self.stats.presented += 1;
                if suboptimal || self.resize_pending {
                    debug!(suboptimal, resize = self.resize_pending, "rebuilding after present");
                    self.recreate(ctx, targets, surface)?;
                    return Ok(FrameOutcome::PresentedThenRecreated {
                        slot: slot_index,
                        image_index,
                    });
                }
                Ok(FrameOutcome::Presented {
                    slot: slot_index,
                    image_index,
                })
            }
            Err(vk::Result::ERROR_OUT_OF_DATE_KHR) => {
                debug!("swapchain out of date at present");
                self.recreate(ctx, targets, surface)?;
                Ok(FrameOutcome::Recreated { advanced: true })
            }
            Err(code) => {
                error!("vkQueuePresentKHR failed: {code}");
                self.stats.failures += 1;
                Err(RenderError::Backend {
                    call: "vkQueuePresentKHR",
                    code,
                })
            }
        }
    }

    /// Uniforms from the camera, one storage entry per object. Returns the
    /// number of objects written.
    fn write_slot_buffers<D: GpuDevice>(
        &self,
        device: &D,
        slot: &FrameSlot,
        targets: &RenderTargets,
        input: &FrameInput<'_>,
    ) -> u32 {
        let ubo = input.camera.uniforms(targets.swapchain.aspect());
        log_failure(
            "vkMapMemory(uniforms)",
            device.write_buffer(&slot.uniforms, bytemuck::bytes_of(&ubo)),
        );

        let capacity = slot.objects.capacity_of::<ObjectData>();
        if input.objects.len() > capacity {
            warn!(
                "{} objects submitted, drawing the first {capacity}",
                input.objects.len()
            );
        }
        let objects: Vec<ObjectData> = input
            .objects
            .iter()
            .take(capacity)
            .map(|&p| ObjectData::from(p))
            .collect();
        if !objects.is_empty() {
            log_failure(
                "vkMapMemory(objects)",
                device.write_buffer(&slot.objects, bytemuck::cast_slice(&objects)),
            );
        }
        objects.len() as u32
    }

    /// The fence was reset and `image_available` signaled, but the frame's
    /// submission never happened. An empty submit consumes the semaphore and
    /// signals the fence, so the slot can be reused. The acquired image is
    /// never presented; the swapchain is rebuilt before the next acquire.
    fn drop_submission<D: GpuDevice>(
        &mut self,
        device: &D,
        slot: &FrameSlot,
        call: &'static str,
        code: vk::Result,
    ) -> RenderError {
        log_failure(
            "vkQueueSubmit(fence only)",
            device.signal_fence(slot.image_available, slot.in_flight),
        );
        self.image_orphaned = true;
        self.stats.failures += 1;
        self.advance();
        RenderError::Backend { call, code }
    }

    fn enter(&mut self, state: FrameState) {
        if self.state != state {
            trace!(from = ?self.state, to = ?state, "frame state");
            self.state = state;
        }
    }

    fn advance(&mut self) {
        self.frame_counter = (self.frame_counter + 1) % self.slot_count;
        self.stats.advanced += 1;
    }

    fn recreate<D, S>(
        &mut self,
        ctx: &RendererContext<D>,
        targets: &mut RenderTargets,
        surface: &mut S,
    ) -> Result<(), RenderError>
    where
        D: GpuDevice,
        S: SurfaceProvider + ?Sized,
    {
        self.enter(FrameState::Recreating);
        let rebuilt = recreate_swapchain_and_dependents(ctx, targets, surface);
        // the old swapchain is gone either way, and with it any held image
        self.image_orphaned = false;
        if rebuilt? {
            self.stats.recreations += 1;
            self.resize_pending = false;
        }
        Ok(())
    }
}

fn log_failure(call: &str, result: VkResult<()>) {
    if let Err(code) = result {
        error!("{call} failed: {code}");
    }
}
