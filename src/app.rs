use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context as AnyhowContext, Result};
use tracing::{debug, info};
use vulkano::swapchain::Surface;
use winit::event::{Event, WindowEvent};
use winit::event_loop::{ControlFlow, EventLoopWindowTarget};
use winit::window::{Window, WindowId};

use crate::config::AppConfig;
use crate::vulkan_device::VulkanDevice;
use crate::vulkan_instance::VulkanInstance;
use crate::window::create_window;

/// Everything tied to the window. Fields drop top to bottom: device, surface,
/// then the window.
pub struct VisualSystem {
    _vulkan_device: VulkanDevice,
    _surface: Arc<Surface>,
    window: Arc<Window>,
}

impl VisualSystem {
    pub fn new(vulkan_instance: &VulkanInstance, window: Arc<Window>) -> Result<Self> {
        let surface = vulkan_instance.create_surface(Arc::clone(&window))?;

        let (physical_device, indices) = vulkan_instance
            .pick_physical_device(&surface)
            .context("Could not select a physical device")?;
        let vulkan_device = VulkanDevice::new(physical_device, indices)?;

        info!(
            "Bootstrap complete on {} (graphics queue family {})",
            vulkan_device.device().physical_device().properties().device_name,
            vulkan_device.graphics_queue().queue_family_index()
        );

        Ok(Self {
            _vulkan_device: vulkan_device,
            _surface: surface,
            window,
        })
    }

    pub fn window_id(&self) -> WindowId {
        self.window.id()
    }
}

/// Window events that end the application.
pub fn is_quit_request(event: &WindowEvent) -> bool {
    matches!(event, WindowEvent::CloseRequested | WindowEvent::Destroyed)
}

/// True when `event` asks to quit and targets the application window.
/// Nothing quits the loop before the window exists.
pub fn should_exit(app_window: Option<WindowId>, window_id: WindowId, event: &WindowEvent) -> bool {
    app_window == Some(window_id) && is_quit_request(event)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LoopStep {
    Start,
    Exit,
    ReleaseWindows,
    Wait,
    Ignore,
}

pub struct App {
    config: AppConfig,
    is_started: bool,
    visual_system: Option<VisualSystem>,
    vulkan_instance: Option<VulkanInstance>,
}

impl App {
    pub fn process_event(
        &mut self,
        event: Event<()>,
        window_target: &EventLoopWindowTarget<()>,
    ) -> Result<()> {
        match self.next_step(&event) {
            LoopStep::Start => {
                self.is_started = true;
                self.start(window_target)?
            }
            LoopStep::Exit => {
                info!("Quit requested");
                window_target.exit();
            }
            LoopStep::ReleaseWindows => self.release_windows(),
            LoopStep::Wait => window_target.set_control_flow(ControlFlow::WaitUntil(
                Instant::now() + self.config.poll_interval(),
            )),
            LoopStep::Ignore => {}
        }
        Ok(())
    }

    fn next_step(&self, event: &Event<()>) -> LoopStep {
        match event {
            Event::WindowEvent { event, window_id } => {
                if should_exit(self.app_window(), *window_id, event) {
                    LoopStep::Exit
                } else {
                    LoopStep::Ignore
                }
            }
            Event::Resumed if !self.is_started => LoopStep::Start,
            Event::Suspended => {
                debug!("Suspended");
                LoopStep::Ignore
            }
            Event::AboutToWait => LoopStep::Wait,
            Event::LoopExiting => LoopStep::ReleaseWindows,
            _ => LoopStep::Ignore,
        }
    }

    fn app_window(&self) -> Option<WindowId> {
        self.visual_system.as_ref().map(VisualSystem::window_id)
    }
}

impl App {
    pub fn new(config: AppConfig) -> Self {
        Self {
            config,
            is_started: false,
            visual_system: None,
            vulkan_instance: None,
        }
    }

    pub fn start<T>(&mut self, window_target: &EventLoopWindowTarget<T>) -> Result<()> {
        let window = Arc::new(create_window(window_target, &self.config.window)?);
        let vulkan_instance = VulkanInstance::new(&window, &self.config)?;

        self.visual_system = Some(VisualSystem::new(&vulkan_instance, window)?);
        self.vulkan_instance = Some(vulkan_instance);
        Ok(())
    }

    /// Drops device, surface and window while the event loop is still alive.
    fn release_windows(&mut self) {
        if self.visual_system.take().is_some() {
            debug!("Released device, surface and window");
        }
    }

    /// Destroys the Vulkan instance. Call once the event loop has returned.
    pub fn shutdown(&mut self) {
        self.release_windows();
        if let Some(vulkan_instance) = self.vulkan_instance.take() {
            debug!(
                "Destroying Vulkan instance (api version {:?})",
                vulkan_instance.instance().api_version()
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use winit::dpi::{PhysicalPosition, PhysicalSize};

    use super::*;

    fn window(id: u64) -> WindowId {
        WindowId::from(id)
    }

    #[test]
    fn close_and_destroy_are_quit_requests() {
        assert!(is_quit_request(&WindowEvent::CloseRequested));
        assert!(is_quit_request(&WindowEvent::Destroyed));
    }

    #[test]
    fn other_window_events_keep_running() {
        let events = [
            WindowEvent::Focused(true),
            WindowEvent::Focused(false),
            WindowEvent::Moved(PhysicalPosition::new(10, 10)),
            WindowEvent::Resized(PhysicalSize::new(800, 600)),
            WindowEvent::Occluded(true),
            WindowEvent::RedrawRequested,
        ];

        for event in &events {
            assert!(!is_quit_request(event), "{:?} should not quit", event);
        }
    }

    #[test]
    fn quit_before_start_is_ignored() {
        assert!(!should_exit(None, window(1), &WindowEvent::CloseRequested));
    }

    #[test]
    fn non_quit_event_on_app_window_keeps_running() {
        assert!(!should_exit(
            Some(window(1)),
            window(1),
            &WindowEvent::Focused(true)
        ));
    }

    #[test]
    fn quit_on_app_window_exits() {
        assert!(should_exit(
            Some(window(1)),
            window(1),
            &WindowEvent::CloseRequested
        ));
    }

    #[test]
    fn quit_on_foreign_window_is_ignored() {
        assert!(!should_exit(
            Some(window(1)),
            window(2),
            &WindowEvent::CloseRequested
        ));
    }

    #[test]
    fn unstarted_app_ignores_close_requests() {
        let app = App::new(AppConfig::default());
        let event = Event::WindowEvent {
            window_id: window(1),
            event: WindowEvent::CloseRequested,
        };
        assert_eq!(app.next_step(&event), LoopStep::Ignore);
    }

    #[test]
    fn first_resume_starts_and_later_ones_are_ignored() {
        let mut app = App::new(AppConfig::default());
        assert_eq!(app.next_step(&Event::Resumed), LoopStep::Start);

        app.is_started = true;
        assert_eq!(app.next_step(&Event::Resumed), LoopStep::Ignore);
    }

    #[test]
    fn loop_exit_releases_windows_before_the_event_loop_is_dropped() {
        let app = App::new(AppConfig::default());
        assert_eq!(app.next_step(&Event::LoopExiting), LoopStep::ReleaseWindows);
        assert_eq!(app.next_step(&Event::AboutToWait), LoopStep::Wait);
    }

    #[test]
    fn shutdown_is_idempotent() {
        let mut app = App::new(AppConfig::default());
        app.shutdown();
        app.shutdown();
        assert!(app.visual_system.is_none());
        assert!(app.vulkan_instance.is_none());
    }
}
