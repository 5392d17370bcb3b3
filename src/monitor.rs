//! The poll loop.
//!
//! Every tick lists the running containers, diffs them against the
//! previous tick, and hands one message per change to the dispatcher.
//! Delivery runs on detached tasks; the loop never waits for it.

use std::sync::Arc;
use std::time::Duration;

use log::{debug, info, warn};
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};

use crate::console;
use crate::diff::diff;
use crate::error::{MonitorError, Result};
use crate::format::{format_message, short_id};
use crate::notify::Dispatcher;
use crate::runtime::ContainerRuntime;
use crate::types::{ContainerEvent, ContainerSummary, Snapshot};

#[derive(Debug, Clone)]
pub struct MonitorOptions {
    pub interval: Duration,
    pub show_listing: bool,
    pub clear_screen: bool,
}

impl Default for MonitorOptions {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(5),
            show_listing: false,
            clear_screen: false,
        }
    }
}

/// What one tick did.
#[derive(Debug, Default)]
pub struct TickReport {
    /// Listing failed; the previous snapshot was kept.
    pub skipped: bool,
    pub started: usize,
    pub removed: usize,
    /// Changed containers whose notification was dropped because they
    /// could not be inspected.
    pub unannounced: usize,
    /// Detached deliveries launched by this tick.
    pub deliveries: Vec<JoinHandle<()>>,
}

pub struct Monitor<R: ?Sized> {
    runtime: Arc<R>,
    dispatcher: Dispatcher,
    host: String,
    options: MonitorOptions,
    previous: Snapshot,
}

impl<R> Monitor<R>
where
    R: ContainerRuntime + ?Sized,
{
    /// Take the baseline snapshot.  Containers already running are treated
    /// as known and never reported.
    pub async fn start(
        runtime: Arc<R>,
        dispatcher: Dispatcher,
        host: String,
        options: MonitorOptions,
    ) -> Result<Self> {
        let previous = runtime.list_running().await?;
        if previous.is_empty() {
            info!("No containers running at startup");
        } else {
            info!("Baseline snapshot holds {} running containers", previous.len());
        }
        Ok(Self {
            runtime,
            dispatcher,
            host,
            options,
            previous,
        })
    }

    #[cfg(test)]
    pub fn previous(&self) -> &Snapshot {
        &self.previous
    }

    /// Tick forever at the configured interval.
    pub async fn run(mut self) {
        let mut ticker = interval(self.options.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick completes immediately and the baseline is fresh.
        ticker.tick().await;
        loop {
            ticker.tick().await;
            // Deliveries are fire-and-forget; dropping the handles detaches them.
            let _ = self.tick().await;
        }
    }

    pub async fn tick(&mut self) -> TickReport {
        let mut report = TickReport::default();

        let current = match self.runtime.list_running().await {
            Ok(snapshot) => snapshot,
            Err(e) => {
                warn!("Skipping tick, keeping previous snapshot: {}", e);
                report.skipped = true;
                return report;
            }
        };
        debug!(
            "Tick: {} running, {} previously",
            current.len(),
            self.previous.len()
        );

        if self.options.show_listing {
            console::print_listing(self.runtime.as_ref(), &current, self.options.clear_screen).await;
        }

        let changes = diff(&self.previous, &current);
        if !changes.is_empty() {
            info!(
                "{} container(s) started, {} removed",
                changes.added.len(),
                changes.removed.len()
            );
        }
        let events = changes
            .added
            .iter()
            .map(|c| (ContainerEvent::Started, c))
            .chain(changes.removed.iter().map(|c| (ContainerEvent::Removed, c)));

        for (event, container) in events {
            match self.announce(event, container).await {
                Ok(handle) => {
                    match event {
                        ContainerEvent::Started => report.started += 1,
                        ContainerEvent::Removed => report.removed += 1,
                    }
                    report.deliveries.push(handle);
                }
                Err(MonitorError::ContainerVanished(_)) => {
                    warn!(
                        "Container {} ({}) vanished before inspection, not announcing",
                        short_id(&container.id),
                        container.name
                    );
                    report.unannounced += 1;
                }
                Err(e) => {
                    warn!(
                        "Could not inspect container {} ({}): {}",
                        short_id(&container.id),
                        container.name,
                        e
                    );
                    report.unannounced += 1;
                }
            }
        }

        self.previous = current;
        report
    }

    async fn announce(
        &self,
        event: ContainerEvent,
        container: &ContainerSummary,
    ) -> Result<JoinHandle<()>> {
        let detail = self.runtime.inspect(&container.id).await?;
        let message = format_message(event, container, &detail.port_mappings(), &self.host);
        info!(
            "Container {}: {} ({})",
            event,
            container.name,
            short_id(&container.id)
        );
        Ok(self.dispatcher.notify(message))
    }
}
