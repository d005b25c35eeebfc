use std::sync::Arc;

use tracing::debug;
use vulkano::device::physical::PhysicalDevice;
use vulkano::device::QueueFlags;

use crate::queue_family::QueueFamilyIndices;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum DeviceSelectionError {
    #[error("failed to find GPU with Vulkan support")]
    NoVulkanDevice,
    #[error("failed to find suitable GPU")]
    NoSuitableDevice,
}

/// A selection candidate: something that can report its queue families.
pub trait QueueFamilySource {
    fn name(&self) -> String;

    fn queue_family_flags(&self) -> Vec<QueueFlags>;
}

impl QueueFamilySource for Arc<PhysicalDevice> {
    fn name(&self) -> String {
        self.properties().device_name.clone()
    }

    fn queue_family_flags(&self) -> Vec<QueueFlags> {
        self.queue_family_properties()
            .iter()
            .map(|q| q.queue_flags)
            .collect()
    }
}

/// Picks the first device, in enumeration order, exposing a graphics queue family.
pub fn select_physical_device<D, I>(
    devices: I,
) -> Result<(D, QueueFamilyIndices), DeviceSelectionError>
where
    D: QueueFamilySource,
    I: IntoIterator<Item = D>,
{
    let mut devices = devices.into_iter().peekable();

    if devices.peek().is_none() {
        return Err(DeviceSelectionError::NoVulkanDevice);
    }

    devices
        .find_map(|device| {
            let indices = QueueFamilyIndices::find(device.queue_family_flags());
            debug!(
                "Physical device {} graphics family: {:?}",
                device.name(),
                indices.graphics_family
            );
            indices.is_complete().then_some((device, indices))
        })
        .ok_or(DeviceSelectionError::NoSuitableDevice)
}
