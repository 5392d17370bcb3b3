//! In-memory [`ContainerRuntime`] for tests.
//!
//! Containers are seeded and removed explicitly; listing can be switched
//! to fail, and individual ids can be made to vanish so `inspect` races
//! against removal the way the live daemon does.

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use tokio::sync::Mutex;

use super::{ContainerDetail, ContainerRuntime, HostBinding};
use crate::error::{MonitorError, Result};
use crate::types::{ContainerSummary, Snapshot};

#[derive(Default)]
struct Inner {
    running: Vec<ContainerSummary>,
    details: HashMap<String, ContainerDetail>,
    vanished: HashSet<String>,
    unreachable: HashSet<String>,
    listing_down: bool,
}

#[derive(Default)]
pub struct FakeRuntime {
    inner: Mutex<Inner>,
}

impl FakeRuntime {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a running container with no published ports.
    pub async fn start(&self, container: ContainerSummary) {
        let mut state = self.inner.lock().await;
        state
            .details
            .entry(container.id.clone())
            .or_default();
        state.running.push(container);
    }

    /// Seed a running container publishing `host_port` for `spec`.
    pub async fn start_with_port(&self, container: ContainerSummary, spec: &str, host_port: &str) {
        let mut state = self.inner.lock().await;
        let detail = state.details.entry(container.id.clone()).or_default();
        detail
            .port_bindings
            .entry(spec.to_string())
            .or_default()
            .push(HostBinding {
                host_ip: None,
                host_port: host_port.to_string(),
            });
        state.running.push(container);
    }

    /// Stop a container.  It stays inspectable, like a stopped container.
    pub async fn stop(&self, id: &str) {
        self.inner.lock().await.running.retain(|c| c.id != id);
    }

    /// Make `inspect` fail with `ContainerVanished` for this id.
    pub async fn vanish(&self, id: &str) {
        self.inner.lock().await.vanished.insert(id.to_string());
    }

    /// Make `inspect` fail with `RuntimeUnavailable` for this id.
    pub async fn break_inspect(&self, id: &str) {
        self.inner.lock().await.unreachable.insert(id.to_string());
    }

    pub async fn set_listing_down(&self, down: bool) {
        self.inner.lock().await.listing_down = down;
    }
}

#[async_trait]
impl ContainerRuntime for FakeRuntime {
    async fn list_running(&self) -> Result<Snapshot> {
        let state = self.inner.lock().await;
        if state.listing_down {
            return Err(MonitorError::RuntimeUnavailable(
                "connection refused".to_string(),
            ));
        }
        Ok(state.running.iter().cloned().collect())
    }

    async fn inspect(&self, id: &str) -> Result<ContainerDetail> {
        let state = self.inner.lock().await;
        if state.vanished.contains(id) {
            return Err(MonitorError::ContainerVanished(id.to_string()));
        }
        if state.unreachable.contains(id) {
            return Err(MonitorError::RuntimeUnavailable(format!(
                "inspect {} timed out",
                id
            )));
        }
        state
            .details
            .get(id)
            .cloned()
            .ok_or_else(|| MonitorError::ContainerVanished(id.to_string()))
    }
}
