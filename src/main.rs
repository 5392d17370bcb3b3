//! Docomon daemon entry point.

use std::sync::Arc;

use log::{error, info};
use tokio::signal;

mod config;
mod console;
mod diff;
mod error;
mod format;
mod monitor;
mod notify;
mod runtime;
mod types;

use config::Config;
use monitor::{Monitor, MonitorOptions};
use notify::Dispatcher;
use runtime::DockerRuntime;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    // Load configuration
    let cfg = Config::load()?;
    info!(
        "Starting Docomon: polling every {}s, server label {:?}",
        cfg.poll_interval_secs, cfg.server_name
    );

    let dispatcher = Dispatcher::from_config(&cfg)?;
    info!("{} notification sink(s) enabled", dispatcher.sink_count());

    // Container Runtime (Docker)
    let runtime = Arc::new(DockerRuntime::connect()?);

    // Baseline snapshot; without it there is nothing to diff against.
    let options = MonitorOptions {
        interval: cfg.poll_interval(),
        show_listing: cfg.show_listing,
        clear_screen: cfg.clear_screen,
    };
    let monitor = Monitor::start(runtime, dispatcher, cfg.host_label(), options)
        .await
        .map_err(|e| anyhow::anyhow!("Cannot take baseline snapshot: {}", e))?;

    let monitor_handle = tokio::spawn(monitor.run());

    // Graceful Shutdown
    match signal::ctrl_c().await {
        Ok(()) => {
            info!("Received Ctrl+C, shutting down...");
        }
        Err(err) => {
            error!("Unable to listen for shutdown signal: {}", err);
        }
    }

    // In-flight deliveries are abandoned with the runtime.
    monitor_handle.abort();

    info!("Shutdown complete.");
    Ok(())
}
