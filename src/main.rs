mod host;

use anyhow::Context;
use winit::event_loop::EventLoop;

use avatar_hud::config::{self, AppConfig};
use avatar_hud::{logging, monitor};

use crate::host::HostApp;

fn main() -> anyhow::Result<()> {
    let config_path = config::config_path();
    let (config, config_error) = match AppConfig::load(&config_path) {
        Ok(config) => (config, None),
        Err(e) => (AppConfig::default(), Some(e)),
    };
    logging::init(config.debug_logging);
    if let Some(e) = config_error {
        tracing::warn!("using default configuration: {e}");
    }

    tracing::info!("=== avatar-hud ===");

    match monitor::enumerate_monitors() {
        Ok(monitors) => {
            tracing::info!("found {} monitor(s)", monitors.len());
            for (i, mon) in monitors.iter().enumerate() {
                tracing::info!(
                    "  [{}] {}x{} at ({}, {})",
                    i,
                    mon.width(),
                    mon.height(),
                    mon.left,
                    mon.top,
                );
            }
        }
        Err(e) => tracing::warn!("monitor enumeration unavailable: {e}"),
    }

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .thread_name("release-worker")
        .enable_time()
        .build()
        .context("failed to start async runtime")?;

    let event_loop = EventLoop::new().context("failed to create event loop")?;
    let mut app = HostApp::new(config, runtime.handle().clone());
    event_loop
        .run_app(&mut app)
        .context("event loop terminated abnormally")?;

    Ok(())
}
