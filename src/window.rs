use anyhow::{Context as AnyhowContext, Result};
use tracing::{debug, warn};
use winit::dpi::{PhysicalPosition, PhysicalSize};
use winit::event_loop::EventLoopWindowTarget;
use winit::window::{Window, WindowBuilder};

use crate::config::WindowConfig;

pub fn create_window<T>(
    window_target: &EventLoopWindowTarget<T>,
    config: &WindowConfig,
) -> Result<Window> {
    let size = PhysicalSize::new(config.width, config.height);

    let mut builder = WindowBuilder::new()
        .with_title(config.title.as_str())
        .with_inner_size(size);

    if config.centered {
        let monitor = window_target
            .primary_monitor()
            .or_else(|| window_target.available_monitors().next());

        match monitor {
            Some(monitor) => {
                let position = centered_position(monitor.position(), monitor.size(), size);
                debug!("Centering window at {:?}", position);
                builder = builder.with_position(position);
            }
            None => warn!("No monitor reported, leaving window placement to the platform"),
        }
    }

    builder
        .build(window_target)
        .context("Could not create window")
}

/// Top-left corner placing `window` at the center of the monitor.
pub fn centered_position(
    monitor_position: PhysicalPosition<i32>,
    monitor_size: PhysicalSize<u32>,
    window: PhysicalSize<u32>,
) -> PhysicalPosition<i32> {
    let offset = |monitor: u32, window: u32| (monitor.saturating_sub(window) / 2) as i32;

    PhysicalPosition::new(
        monitor_position.x + offset(monitor_size.width, window.width),
        monitor_position.y + offset(monitor_size.height, window.height),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn centers_on_primary_monitor() {
        let position = centered_position(
            PhysicalPosition::new(0, 0),
            PhysicalSize::new(1920, 1080),
            PhysicalSize::new(1280, 720),
        );
        assert_eq!(position, PhysicalPosition::new(320, 180));
    }

    #[test]
    fn respects_monitor_offset() {
        let position = centered_position(
            PhysicalPosition::new(-1920, 100),
            PhysicalSize::new(1920, 1080),
            PhysicalSize::new(1280, 720),
        );
        assert_eq!(position, PhysicalPosition::new(-1600, 280));
    }

    #[test]
    fn oversized_window_sticks_to_monitor_origin() {
        let position = centered_position(
            PhysicalPosition::new(10, 20),
            PhysicalSize::new(1024, 600),
            PhysicalSize::new(1280, 720),
        );
        assert_eq!(position, PhysicalPosition::new(10, 20));
    }
}
