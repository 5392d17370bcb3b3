use std::collections::BTreeMap;

use async_trait::async_trait;

use crate::error::Result;
use crate::types::{PortMapping, Snapshot};

pub mod docker;
#[cfg(test)]
pub mod fake;

pub use docker::DockerRuntime;

/// Read-only view of a container runtime.
#[async_trait]
pub trait ContainerRuntime: Send + Sync {
    /// Every container currently running.
    async fn list_running(&self) -> Result<Snapshot>;

    /// Full port-binding detail for one container.
    ///
    /// Fails with `ContainerVanished` when the container disappeared
    /// between listing and inspection.
    async fn inspect(&self, id: &str) -> Result<ContainerDetail>;
}

/// A host-side binding of a container port.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HostBinding {
    pub host_ip: Option<String>,
    pub host_port: String,
}

/// Inspection detail the notifier cares about.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContainerDetail {
    /// Declared container port (`80/tcp`) to its host bindings, in order.
    pub port_bindings: BTreeMap<String, Vec<HostBinding>>,
}

impl ContainerDetail {
    /// Flatten the bindings into one mapping per host binding.
    pub fn port_mappings(&self) -> Vec<PortMapping> {
        self.port_bindings
            .iter()
            .flat_map(|(spec, bindings)| {
                let (port, protocol) = match spec.split_once('/') {
                    Some((port, protocol)) => (port, protocol),
                    None => (spec.as_str(), ""),
                };
                bindings.iter().map(move |b| PortMapping {
                    host_port: b.host_port.clone(),
                    container_port: port.to_string(),
                    protocol: protocol.to_string(),
                })
            })
            .collect()
    }
}
