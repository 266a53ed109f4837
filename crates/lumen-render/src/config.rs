// SPDX-License-Identifier: CEPL-1.0
use lumen_math::MAX_OBJECTS;

/// Upper bound on the in-flight ring; the backend sizes its descriptor pool
/// for this many frame slots.
pub const MAX_FRAME_SLOTS: usize = 8;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum PresentPreference {
    /// FIFO: wait for vblank.
    Fifo,
    /// MAILBOX when available (low latency, uncapped), FIFO otherwise.
    #[default]
    LowLatency,
}

/// Knobs that select between the simpler and the complete frame setup
/// without a separate code path for each.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RenderConfig {
    pub clear_color: [f32; 4],
    pub present: PresentPreference,
    /// Adds a depth attachment to every framebuffer and clears it to 1.0.
    pub depth_test: bool,
    /// 0 sizes the frame ring to the swapchain image count.
    pub frames_in_flight: u32,
    /// Capacity of each slot's object storage buffer.
    pub max_objects: usize,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            clear_color: [0.0, 0.0, 0.0, 1.0],
            present: PresentPreference::LowLatency,
            depth_test: true,
            frames_in_flight: 0,
            max_objects: MAX_OBJECTS,
        }
    }
}

impl RenderConfig {
    pub fn slot_count(&self, image_count: usize) -> usize {
        let wanted = match self.frames_in_flight {
            0 => image_count,
            n => n as usize,
        };
        wanted.clamp(1, MAX_FRAME_SLOTS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slot_count_follows_swapchain_by_default() {
        let cfg = RenderConfig::default();
        assert_eq!(cfg.slot_count(3), 3);
        assert_eq!(cfg.slot_count(0), 1);
        assert_eq!(cfg.slot_count(64), MAX_FRAME_SLOTS);
    }

    #[test]
    fn fixed_slot_count_ignores_image_count() {
        let cfg = RenderConfig {
            frames_in_flight: 2,
            ..Default::default()
        };
        assert_eq!(cfg.slot_count(4), 2);
    }
}
