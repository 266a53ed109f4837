// SPDX-License-Identifier: CEPL-1.0
use std::ffi::{c_void, CStr};

use ash::{ext::debug_utils, vk, Entry, Instance};
use lumen_render::{BackendCall, StartupError};
use raw_window_handle::RawDisplayHandle;
use tracing::{debug, error, info, trace, warn};

pub const VALIDATION_LAYER: &CStr = c"VK_LAYER_KHRONOS_validation";

unsafe fn cstr_eq(raw: &[std::ffi::c_char], name: &CStr) -> bool {
    CStr::from_ptr(raw.as_ptr()) == name
}

/// Instance with the platform WSI extensions, plus the validation layer and
/// debug-utils extension when `validation` is set. Anything missing is fatal.
pub(crate) unsafe fn create_instance(
    entry: &Entry,
    display: RawDisplayHandle,
    app_name: &CStr,
    validation: bool,
) -> Result<Instance, StartupError> {
    let app_info = vk::ApplicationInfo {
        s_type: vk::StructureType::APPLICATION_INFO,
        p_application_name: app_name.as_ptr(),
        application_version: 0,
        p_engine_name: app_name.as_ptr(),
        engine_version: 0,
        api_version: vk::API_VERSION_1_0,
        ..Default::default()
    };

    let mut extensions = ash_window::enumerate_required_extensions(display)
        .during("ash_window::enumerate_required_extensions")?
        .to_vec();
    let available = entry
        .enumerate_instance_extension_properties(None)
        .during("vkEnumerateInstanceExtensionProperties")?;
    let has_ext = |name: &CStr| available.iter().any(|e| cstr_eq(&e.extension_name, name));

    for &ext in &extensions {
        let name = CStr::from_ptr(ext);
        if !has_ext(name) {
            return Err(StartupError::MissingExtension(
                name.to_string_lossy().into_owned(),
            ));
        }
    }

    let mut layers = Vec::new();
    if validation {
        let available_layers = entry
            .enumerate_instance_layer_properties()
            .during("vkEnumerateInstanceLayerProperties")?;
        if !available_layers
            .iter()
            .any(|l| cstr_eq(&l.layer_name, VALIDATION_LAYER))
        {
            return Err(StartupError::MissingLayer(
                VALIDATION_LAYER.to_string_lossy().into_owned(),
            ));
        }
        if !has_ext(debug_utils::NAME) {
            return Err(StartupError::MissingExtension(
                debug_utils::NAME.to_string_lossy().into_owned(),
            ));
        }
        layers.push(VALIDATION_LAYER.as_ptr());
        extensions.push(debug_utils::NAME.as_ptr());
    }

    let create_info = vk::InstanceCreateInfo {
        s_type: vk::StructureType::INSTANCE_CREATE_INFO,
        p_application_info: &app_info,
        enabled_extension_count: extensions.len() as u32,
        pp_enabled_extension_names: extensions.as_ptr(),
        enabled_layer_count: layers.len() as u32,
        pp_enabled_layer_names: layers.as_ptr(),
        ..Default::default()
    };

    let instance = entry
        .create_instance(&create_info, None)
        .during("vkCreateInstance")?;
    info!(
        "Vulkan instance created ({} extensions, validation {})",
        extensions.len(),
        if validation { "on" } else { "off" }
    );
    Ok(instance)
}

unsafe extern "system" fn debug_callback(
    severity: vk::DebugUtilsMessageSeverityFlagsEXT,
    types: vk::DebugUtilsMessageTypeFlagsEXT,
    data: *const vk::DebugUtilsMessengerCallbackDataEXT,
    _user: *mut c_void,
) -> vk::Bool32 {
    if data.is_null() || (*data).p_message.is_null() {
        return vk::FALSE;
    }
    let msg = CStr::from_ptr((*data).p_message).to_string_lossy();
    if severity.contains(vk::DebugUtilsMessageSeverityFlagsEXT::ERROR) {
        error!(target: "vulkan", ?types, "{msg}");
    } else if severity.contains(vk::DebugUtilsMessageSeverityFlagsEXT::WARNING) {
        warn!(target: "vulkan", ?types, "{msg}");
    } else if severity.contains(vk::DebugUtilsMessageSeverityFlagsEXT::INFO) {
        debug!(target: "vulkan", ?types, "{msg}");
    } else {
        trace!(target: "vulkan", ?types, "{msg}");
    }
    vk::FALSE
}

/// Routes validation output into `tracing` under target `vulkan`.
pub(crate) struct DebugMessenger {
    loader: debug_utils::Instance,
    messenger: vk::DebugUtilsMessengerEXT,
}

impl DebugMessenger {
    pub(crate) unsafe fn new(entry: &Entry, instance: &Instance) -> Result<Self, StartupError> {
        let loader = debug_utils::Instance::new(entry, instance);
        let ci = vk::DebugUtilsMessengerCreateInfoEXT {
            s_type: vk::StructureType::DEBUG_UTILS_MESSENGER_CREATE_INFO_EXT,
            message_severity: vk::DebugUtilsMessageSeverityFlagsEXT::VERBOSE
                | vk::DebugUtilsMessageSeverityFlagsEXT::INFO
                | vk::DebugUtilsMessageSeverityFlagsEXT::WARNING
                | vk::DebugUtilsMessageSeverityFlagsEXT::ERROR,
            message_type: vk::DebugUtilsMessageTypeFlagsEXT::GENERAL
                | vk::DebugUtilsMessageTypeFlagsEXT::VALIDATION
                | vk::DebugUtilsMessageTypeFlagsEXT::PERFORMANCE,
            pfn_user_callback: Some(debug_callback),
            ..Default::default()
        };
        let messenger = loader
            .create_debug_utils_messenger(&ci, None)
            .during("vkCreateDebugUtilsMessengerEXT")?;
        Ok(Self { loader, messenger })
    }

    pub(crate) unsafe fn destroy(&self) {
        self.loader
            .destroy_debug_utils_messenger(self.messenger, None);
    }
}
