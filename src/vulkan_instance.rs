use std::sync::Arc;

use anyhow::{bail, Context as AnyhowContext, Result};
use tracing::{debug, error, info, trace, warn};
use vulkano::device::physical::PhysicalDevice;
use vulkano::instance::debug::{
    DebugUtilsMessageSeverity, DebugUtilsMessageType, DebugUtilsMessenger,
    DebugUtilsMessengerCallback, DebugUtilsMessengerCreateInfo,
};
#[cfg(target_os = "macos")]
use vulkano::instance::InstanceCreateFlags;
use vulkano::instance::{Instance, InstanceCreateInfo, InstanceExtensions};
use vulkano::swapchain::Surface;
use vulkano::{Version, VulkanLibrary};
use winit::window::Window;

use crate::config::AppConfig;
use crate::physical_device::select_physical_device;
use crate::queue_family::QueueFamilyIndices;

pub const VALIDATION_LAYERS: &[&str] = &["VK_LAYER_KHRONOS_validation"];

const APPLICATION_VERSION: Version = Version {
    major: 0,
    minor: 0,
    patch: 1,
};
const ENGINE_VERSION: Version = APPLICATION_VERSION;

pub struct VulkanInstance {
    _debug_messenger: Option<DebugUtilsMessenger>,
    instance: Arc<Instance>,
}

impl VulkanInstance {
    pub fn new(compatible_window: &Window, config: &AppConfig) -> Result<VulkanInstance> {
        let library = VulkanLibrary::new().context("Could not load the Vulkan library")?;

        let required_extensions = Surface::required_extensions(&compatible_window);
        debug!("Window system requires {:?}", required_extensions);

        let enable_validation = config.validation_enabled();
        let enabled_extensions = instance_extensions(
            required_extensions,
            library.supported_extensions(),
            enable_validation,
        );

        let enabled_layers = if enable_validation {
            let available = library
                .layer_properties()?
                .map(|layer| layer.name().to_string())
                .collect::<Vec<_>>();

            let missing = missing_layers(VALIDATION_LAYERS, &available);
            if !missing.is_empty() {
                bail!(
                    "validation layers requested, but not available: {}",
                    missing.join(", ")
                );
            }

            VALIDATION_LAYERS.iter().map(|l| l.to_string()).collect()
        } else {
            Vec::new()
        };
        debug!("Enabled layers: {:?}", enabled_layers);

        let instance = Instance::new(
            library,
            instance_create_info(config, enabled_extensions, enabled_layers),
        )
        .context("Could not create a Vulkan instance")?;

        info!(
            "Created Vulkan instance (api version {:?})",
            instance.api_version()
        );

        let debug_messenger = if enable_validation && instance.enabled_extensions().ext_debug_utils
        {
            Some(Self::create_debug_messenger(Arc::clone(&instance))?)
        } else {
            None
        };

        Ok(VulkanInstance {
            _debug_messenger: debug_messenger,
            instance,
        })
    }

    fn create_debug_messenger(instance: Arc<Instance>) -> Result<DebugUtilsMessenger> {
        // Safety: the callback only forwards to tracing and never calls into Vulkan.
        let callback = unsafe {
            DebugUtilsMessengerCallback::new(|severity, message_type, data| {
                let id = data.message_id_name.unwrap_or("unknown");
                if severity.intersects(DebugUtilsMessageSeverity::ERROR) {
                    error!("[{:?}] {}: {}", message_type, id, data.message);
                } else if severity.intersects(DebugUtilsMessageSeverity::WARNING) {
                    warn!("[{:?}] {}: {}", message_type, id, data.message);
                } else if severity.intersects(DebugUtilsMessageSeverity::INFO) {
                    debug!("[{:?}] {}: {}", message_type, id, data.message);
                } else {
                    trace!("[{:?}] {}: {}", message_type, id, data.message);
                }
            })
        };

        let messenger = DebugUtilsMessenger::new(
            instance,
            DebugUtilsMessengerCreateInfo {
                message_severity: DebugUtilsMessageSeverity::ERROR
                    | DebugUtilsMessageSeverity::WARNING
                    | DebugUtilsMessageSeverity::INFO
                    | DebugUtilsMessageSeverity::VERBOSE,
                message_type: DebugUtilsMessageType::GENERAL
                    | DebugUtilsMessageType::VALIDATION
                    | DebugUtilsMessageType::PERFORMANCE,
                ..DebugUtilsMessengerCreateInfo::user_callback(callback)
            },
        )
        .context("Could not create the debug messenger")?;

        Ok(messenger)
    }

    pub fn instance(&self) -> &Arc<Instance> {
        &self.instance
    }

    pub fn create_surface(&self, window: Arc<Window>) -> Result<Arc<Surface>> {
        Surface::from_window(Arc::clone(&self.instance), window)
            .context("Could not create a Vulkan surface")
    }

    pub fn pick_physical_device(
        &self,
        surface: &Surface,
    ) -> Result<(Arc<PhysicalDevice>, QueueFamilyIndices)> {
        let (physical_device, indices) =
            select_physical_device(self.instance.enumerate_physical_devices()?)?;

        info!(
            "Using physical device {} (type: {:?})",
            physical_device.properties().device_name,
            physical_device.properties().device_type
        );

        if let Some(graphics_family) = indices.graphics_family {
            let can_present = physical_device
                .surface_support(graphics_family, surface)
                .unwrap_or(false);
            info!(
                "Graphics queue family {} can present to the surface: {}",
                graphics_family, can_present
            );
        }

        Ok((physical_device, indices))
    }
}

/// Window-system extensions, plus debug utils whenever validation is on and the loader has it.
fn instance_extensions(
    required: InstanceExtensions,
    supported: &InstanceExtensions,
    enable_validation: bool,
) -> InstanceExtensions {
    let mut extensions = required;

    if enable_validation {
        extensions.ext_debug_utils = supported.ext_debug_utils;
    }

    #[cfg(target_os = "macos")]
    {
        extensions.khr_portability_enumeration = true;
    }

    extensions
}

fn instance_create_info(
    config: &AppConfig,
    enabled_extensions: InstanceExtensions,
    enabled_layers: Vec<String>,
) -> InstanceCreateInfo {
    InstanceCreateInfo {
        #[cfg(target_os = "macos")]
        flags: InstanceCreateFlags::ENUMERATE_PORTABILITY,
        application_name: Some(config.application_name.clone()),
        application_version: APPLICATION_VERSION,
        engine_name: Some(config.engine_name.clone()),
        engine_version: ENGINE_VERSION,
        max_api_version: Some(Version::V1_0),
        enabled_extensions,
        enabled_layers,
        ..Default::default()
    }
}

/// Required layer names that are absent from `available`, in required order.
pub fn missing_layers<'a>(required: &[&'a str], available: &[String]) -> Vec<&'a str> {
    required
        .iter()
        .copied()
        .filter(|required| !available.iter().any(|name| name == required))
        .collect()
}
