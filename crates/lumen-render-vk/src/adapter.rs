// SPDX-License-Identifier: CEPL-1.0
use std::ffi::CStr;

use ash::{khr::surface, khr::swapchain, vk, Instance};
use lumen_render::{BackendCall, StartupError};
use tracing::{debug, info};

/// The physical device and queue family everything runs on.
pub(crate) struct Adapter {
    pub phys: vk::PhysicalDevice,
    pub queue_family: u32,
    pub name: String,
    pub features: vk::PhysicalDeviceFeatures,
    pub max_anisotropy: f32,
}

/// Features turned on at device creation.
#[derive(Clone, Copy, Debug, Default)]
pub(crate) struct EnabledFeatures {
    pub fill_mode_non_solid: bool,
    pub sampler_anisotropy: bool,
}

unsafe fn supports_swapchain(instance: &Instance, phys: vk::PhysicalDevice) -> bool {
    instance
        .enumerate_device_extension_properties(phys)
        .unwrap_or_default()
        .iter()
        .any(|e| CStr::from_ptr(e.extension_name.as_ptr()) == swapchain::NAME)
}

/// Prefers a discrete GPU; within a device, the first family with graphics
/// bits that can also present to `surface`.
pub(crate) unsafe fn pick_adapter(
    instance: &Instance,
    surface_loader: &surface::Instance,
    surface: vk::SurfaceKHR,
) -> Result<Adapter, StartupError> {
    let mut devices = instance
        .enumerate_physical_devices()
        .during("vkEnumeratePhysicalDevices")?;
    if devices.is_empty() {
        return Err(StartupError::NoPhysicalDevice);
    }
    devices.sort_by_key(|&phys| {
        let kind = instance.get_physical_device_properties(phys).device_type;
        kind != vk::PhysicalDeviceType::DISCRETE_GPU
    });

    let mut graphics_without_present = None;
    for phys in devices {
        let props = instance.get_physical_device_properties(phys);
        let name = CStr::from_ptr(props.device_name.as_ptr())
            .to_string_lossy()
            .into_owned();
        if !supports_swapchain(instance, phys) {
            debug!("skipping {name}: no VK_KHR_swapchain");
            continue;
        }

        let families = instance.get_physical_device_queue_family_properties(phys);
        for (i, family) in families.iter().enumerate() {
            if !family.queue_flags.contains(vk::QueueFlags::GRAPHICS) {
                continue;
            }
            let present = surface_loader
                .get_physical_device_surface_support(phys, i as u32, surface)
                .unwrap_or(false);
            if !present {
                graphics_without_present.get_or_insert(i as u32);
                continue;
            }
            info!("using {name} ({:?}), queue family {i}", props.device_type);
            return Ok(Adapter {
                phys,
                queue_family: i as u32,
                name,
                features: instance.get_physical_device_features(phys),
                max_anisotropy: props.limits.max_sampler_anisotropy,
            });
        }
    }

    Err(match graphics_without_present {
        Some(family) => StartupError::PresentUnsupported(family),
        None => StartupError::NoQueueFamily(vk::QueueFlags::GRAPHICS),
    })
}

/// One graphics+present queue and the swapchain extension. Wireframe and
/// anisotropic filtering are enabled when the adapter has them.
pub(crate) unsafe fn create_logical_device(
    instance: &Instance,
    adapter: &Adapter,
) -> Result<(ash::Device, vk::Queue, EnabledFeatures), StartupError> {
    let priorities = [1.0_f32];
    let qinfo = vk::DeviceQueueCreateInfo {
        s_type: vk::StructureType::DEVICE_QUEUE_CREATE_INFO,
        queue_family_index: adapter.queue_family,
        queue_count: 1,
        p_queue_priorities: priorities.as_ptr(),
        ..Default::default()
    };

    let enabled = EnabledFeatures {
        fill_mode_non_solid: adapter.features.fill_mode_non_solid == vk::TRUE,
        sampler_anisotropy: adapter.features.sampler_anisotropy == vk::TRUE,
    };
    let features = vk::PhysicalDeviceFeatures {
        fill_mode_non_solid: enabled.fill_mode_non_solid.into(),
        sampler_anisotropy: enabled.sampler_anisotropy.into(),
        ..Default::default()
    };

    let device_exts = [swapchain::NAME.as_ptr()];
    let dinfo = vk::DeviceCreateInfo {
        s_type: vk::StructureType::DEVICE_CREATE_INFO,
        queue_create_info_count: 1,
        p_queue_create_infos: &qinfo,
        enabled_extension_count: device_exts.len() as u32,
        pp_enabled_extension_names: device_exts.as_ptr(),
        p_enabled_features: &features,
        ..Default::default()
    };

    let device = instance
        .create_device(adapter.phys, &dinfo, None)
        .during("vkCreateDevice")?;
    let queue = device.get_device_queue(adapter.queue_family, 0);
    debug!(?enabled, "logical device on {}", adapter.name);
    Ok((device, queue, enabled))
}
