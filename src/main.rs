use anyhow::{Context as AnyhowContext, Result};
use tracing::{error, info};
use winit::event_loop::EventLoopBuilder;

use crate::app::App;
use crate::config::AppConfig;

mod app;
mod config;
mod physical_device;
mod queue_family;
mod vulkan_device;
mod vulkan_instance;
mod window;

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let config = match std::env::args_os().nth(1) {
        Some(path) => AppConfig::load(&path)
            .with_context(|| format!("Could not load config from {}", path.to_string_lossy()))?,
        None => AppConfig::default(),
    };
    info!("Starting with {:?}", config);

    let event_loop = EventLoopBuilder::new().build()?;
    let mut app = App::new(config);
    let mut failure = None;

    event_loop.run(|event, window_target| {
        if let Err(err) = app.process_event(event, window_target) {
            error!("{:#}", err);
            failure.get_or_insert(err);
            window_target.exit();
        }
    })?;

    app.shutdown();

    match failure {
        Some(err) => Err(err),
        None => {
            info!("Exited cleanly");
            Ok(())
        }
    }
}
