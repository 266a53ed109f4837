// SPDX-License-Identifier: CEPL-1.0
use std::path::PathBuf;

use ash::{prelude::VkResult, vk};

/// Unrecoverable conditions. They unwind out of initialisation (or out of a
/// swapchain rebuild) and end the process.
#[derive(thiserror::Error, Debug)]
pub enum StartupError {
    #[error("validation layer {0} is not available")]
    MissingLayer(String),

    #[error("instance extension {0} is not available")]
    MissingExtension(String),

    #[error("no Vulkan physical device found")]
    NoPhysicalDevice,

    #[error("no queue family supports {0:?}")]
    NoQueueFamily(vk::QueueFlags),

    #[error("queue family {0} cannot present to the window surface")]
    PresentUnsupported(u32),

    #[error("surface exposes no formats")]
    NoSurfaceFormat,

    #[error("no memory type matches bits {type_bits:#b} with {flags:?}")]
    NoSuitableMemoryType {
        type_bits: u32,
        flags: vk::MemoryPropertyFlags,
    },

    #[error("asset {} could not be read", .path.display())]
    AssetMissing {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("asset {} could not be decoded: {reason}", .path.display())]
    AssetDecode { path: PathBuf, reason: String },

    #[error("shader {name} is not valid SPIR-V")]
    InvalidShader {
        name: String,
        #[source]
        source: std::io::Error,
    },

    #[error("window system: {0}")]
    Window(String),

    #[error("{call} failed: {code}")]
    Backend { call: &'static str, code: vk::Result },
}

/// Errors surfaced by a frame. `Fatal` must end the render loop; `Backend`
/// has already been logged and the caller may simply render the next frame.
#[derive(thiserror::Error, Debug)]
pub enum RenderError {
    #[error(transparent)]
    Fatal(#[from] StartupError),

    #[error("{call} failed: {code}")]
    Backend { call: &'static str, code: vk::Result },
}

impl RenderError {
    pub fn is_fatal(&self) -> bool {
        matches!(self, RenderError::Fatal(_))
    }
}

/// Names the backend call a raw `vk::Result` came from.
pub trait BackendCall<T> {
    fn during(self, call: &'static str) -> Result<T, StartupError>;
}

impl<T> BackendCall<T> for VkResult<T> {
    fn during(self, call: &'static str) -> Result<T, StartupError> {
        self.map_err(|code| StartupError::Backend { call, code })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backend_errors_name_the_call() {
        let r: VkResult<()> = Err(vk::Result::ERROR_DEVICE_LOST);
        let err = r.during("vkCreateSwapchainKHR").unwrap_err();
        assert!(err.to_string().contains("vkCreateSwapchainKHR"));
        assert!(matches!(
            err,
            StartupError::Backend {
                code: vk::Result::ERROR_DEVICE_LOST,
                ..
            }
        ));
    }

    #[test]
    fn fatal_and_retryable_are_distinct() {
        let fatal: RenderError = StartupError::NoPhysicalDevice.into();
        assert!(fatal.is_fatal());
        let retry = RenderError::Backend {
            call: "vkQueueSubmit",
            code: vk::Result::ERROR_OUT_OF_HOST_MEMORY,
        };
        assert!(!retry.is_fatal());
    }
}
