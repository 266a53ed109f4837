// SPDX-License-Identifier: CEPL-1.0
use ash::vk;

/// A buffer together with the memory bound to it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct AllocatedBuffer {
    pub buffer: vk::Buffer,
    pub memory: vk::DeviceMemory,
    pub size: vk::DeviceSize,
}

impl AllocatedBuffer {
    pub fn is_null(&self) -> bool {
        self.buffer == vk::Buffer::null()
    }

    /// How many whole `T` fit in this buffer.
    pub fn capacity_of<T>(&self) -> usize {
        match std::mem::size_of::<T>() {
            0 => 0,
            n => self.size as usize / n,
        }
    }
}
