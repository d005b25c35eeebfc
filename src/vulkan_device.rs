use std::sync::Arc;

use anyhow::{Context as AnyhowContext, Result};
use tracing::info;
use vulkano::device::physical::PhysicalDevice;
use vulkano::device::{Device, DeviceCreateInfo, DeviceOwned, Queue, QueueCreateInfo};

use crate::queue_family::QueueFamilyIndices;

pub struct VulkanDevice {
    graphics_queue: Arc<Queue>,
}

impl VulkanDevice {
    pub(crate) fn new(
        physical_device: Arc<PhysicalDevice>,
        indices: QueueFamilyIndices,
    ) -> Result<Self> {
        let queue_family_index = indices
            .graphics_family
            .context("Physical device has no graphics queue family")?;

        let (_device, mut queues) = Device::new(
            physical_device,
            DeviceCreateInfo {
                queue_create_infos: vec![QueueCreateInfo {
                    queue_family_index,
                    ..Default::default()
                }],
                ..Default::default()
            },
        )
        .context("Could not create the logical device")?;

        let graphics_queue = queues
            .next()
            .context("Logical device returned no graphics queue")?;

        info!(
            "Created logical device with graphics queue from family {}",
            queue_family_index
        );

        Ok(Self { graphics_queue })
    }

    pub fn device(&self) -> &Arc<Device> {
        self.graphics_queue.device()
    }

    pub fn graphics_queue(&self) -> &Arc<Queue> {
        &self.graphics_queue
    }
}
