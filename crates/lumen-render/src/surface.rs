// SPDX-License-Identifier: CEPL-1.0
use ash::vk;

use crate::{config::PresentPreference, device::SwapchainConfig, error::StartupError};

pub const PREFERRED_SURFACE_FORMAT: vk::SurfaceFormatKHR = vk::SurfaceFormatKHR {
    format: vk::Format::B8G8R8A8_SRGB,
    color_space: vk::ColorSpaceKHR::SRGB_NONLINEAR,
};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RenderSize {
    pub width: u32,
    pub height: u32,
}

impl RenderSize {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Minimised windows report a zero dimension.
    pub fn is_zero(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// The window the renderer presents into.
pub trait SurfaceProvider {
    /// Current drawable size in pixels.
    fn drawable_size(&self) -> RenderSize;
    /// Pump pending window events without blocking.
    fn poll_events(&mut self);
    /// Block until at least one window event arrives.
    fn wait_events(&mut self);
    fn should_close(&self) -> bool;
}

/// What the surface reports it can do, queried fresh on every (re)creation.
#[derive(Clone, Debug, Default)]
pub struct SurfaceSupport {
    pub capabilities: vk::SurfaceCapabilitiesKHR,
    pub formats: Vec<vk::SurfaceFormatKHR>,
    pub present_modes: Vec<vk::PresentModeKHR>,
}

/// B8G8R8A8_SRGB + SRGB_NONLINEAR if offered, otherwise whatever comes first.
pub fn choose_surface_format(formats: &[vk::SurfaceFormatKHR]) -> Option<vk::SurfaceFormatKHR> {
    formats
        .iter()
        .copied()
        .find(|f| {
            f.format == PREFERRED_SURFACE_FORMAT.format
                && f.color_space == PREFERRED_SURFACE_FORMAT.color_space
        })
        .or_else(|| formats.first().copied())
}

/// FIFO is always supported, so it is the fallback.
pub fn choose_present_mode(
    modes: &[vk::PresentModeKHR],
    pref: PresentPreference,
) -> vk::PresentModeKHR {
    match pref {
        PresentPreference::LowLatency if modes.contains(&vk::PresentModeKHR::MAILBOX) => {
            vk::PresentModeKHR::MAILBOX
        }
        _ => vk::PresentModeKHR::FIFO,
    }
}

pub fn choose_extent(caps: &vk::SurfaceCapabilitiesKHR, drawable: RenderSize) -> vk::Extent2D {
    if caps.current_extent.width != u32::MAX {
        return caps.current_extent;
    }
    vk::Extent2D {
        width: drawable
            .width
            .clamp(caps.min_image_extent.width, caps.max_image_extent.width),
        height: drawable
            .height
            .clamp(caps.min_image_extent.height, caps.max_image_extent.height),
    }
}

/// One more than the minimum, bounded by the maximum (0 = unbounded).
pub fn choose_image_count(caps: &vk::SurfaceCapabilitiesKHR) -> u32 {
    let wanted = caps.min_image_count + 1;
    if caps.max_image_count > 0 {
        wanted.min(caps.max_image_count)
    } else {
        wanted
    }
}

pub fn swapchain_config(
    support: &SurfaceSupport,
    drawable: RenderSize,
    pref: PresentPreference,
) -> Result<SwapchainConfig, StartupError> {
    let caps = &support.capabilities;
    let surface_format =
        choose_surface_format(&support.formats).ok_or(StartupError::NoSurfaceFormat)?;

    let pre_transform = if caps
        .supported_transforms
        .contains(vk::SurfaceTransformFlagsKHR::IDENTITY)
    {
        vk::SurfaceTransformFlagsKHR::IDENTITY
    } else {
        caps.current_transform
    };

    Ok(SwapchainConfig {
        surface_format,
        present_mode: choose_present_mode(&support.present_modes, pref),
        extent: choose_extent(caps, drawable),
        image_count: choose_image_count(caps),
        pre_transform,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn caps(min: u32, max: u32) -> vk::SurfaceCapabilitiesKHR {
        vk::SurfaceCapabilitiesKHR {
            min_image_count: min,
            max_image_count: max,
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
                height: 2048,
            },
            supported_transforms: vk::SurfaceTransformFlagsKHR::IDENTITY,
            current_transform: vk::SurfaceTransformFlagsKHR::IDENTITY,
            ..Default::default()
        }
    }

    #[test]
    fn prefers_srgb_bgra() {
        let unorm = vk::SurfaceFormatKHR {
            format: vk::Format::R8G8B8A8_UNORM,
            color_space: vk::ColorSpaceKHR::SRGB_NONLINEAR,
        };
        let picked = choose_surface_format(&[unorm, PREFERRED_SURFACE_FORMAT]);
        assert_eq!(picked, Some(PREFERRED_SURFACE_FORMAT));
        assert_eq!(choose_surface_format(&[unorm]), Some(unorm));
        assert_eq!(choose_surface_format(&[]), None);
    }

    #[test]
    fn srgb_format_in_wrong_colour_space_is_not_preferred() {
        let odd = vk::SurfaceFormatKHR {
            format: vk::Format::B8G8R8A8_SRGB,
            color_space: vk::ColorSpaceKHR::EXTENDED_SRGB_LINEAR_EXT,
        };
        let unorm = vk::SurfaceFormatKHR {
            format: vk::Format::B8G8R8A8_UNORM,
            color_space: vk::ColorSpaceKHR::SRGB_NONLINEAR,
        };
        assert_eq!(choose_surface_format(&[odd, unorm]), Some(odd));
    }

    #[test]
    fn mailbox_only_when_offered_and_wanted() {
        let all = [vk::PresentModeKHR::FIFO, vk::PresentModeKHR::MAILBOX];
        let fifo_only = [vk::PresentModeKHR::FIFO];
        assert_eq!(
            choose_present_mode(&all, PresentPreference::LowLatency),
            vk::PresentModeKHR::MAILBOX
        );
        assert_eq!(
            choose_present_mode(&fifo_only, PresentPreference::LowLatency),
            vk::PresentModeKHR::FIFO
        );
        assert_eq!(
            choose_present_mode(&all, PresentPreference::Fifo),
            vk::PresentModeKHR::FIFO
        );
    }

    #[test]
    fn extent_uses_current_unless_sentinel() {
        let mut c = caps(2, 3);
        assert_eq!(
            choose_extent(&c, RenderSize::new(8000, 600)),
            vk::Extent2D {
                width: 4096,
                height: 600
            }
        );
        c.current_extent = vk::Extent2D {
            width: 1280,
            height: 720,
        };
        assert_eq!(
            choose_extent(&c, RenderSize::new(10, 10)),
            vk::Extent2D {
                width: 1280,
                height: 720
            }
        );
    }

    #[test]
    fn image_count_respects_max() {
        assert_eq!(choose_image_count(&caps(2, 0)), 3);
        assert_eq!(choose_image_count(&caps(2, 8)), 3);
        assert_eq!(choose_image_count(&caps(3, 3)), 3);
    }

    #[test]
    fn config_fails_without_formats() {
        let support = SurfaceSupport {
            capabilities: caps(2, 0),
            formats: vec![],
            present_modes: vec![vk::PresentModeKHR::FIFO],
        };
        assert!(matches!(
            swapchain_config(&support, RenderSize::new(800, 600), PresentPreference::Fifo),
            Err(StartupError::NoSurfaceFormat)
        ));
    }
}
