use std::collections::BTreeMap;

use async_trait::async_trait;
use bollard::container::ListContainersOptions;
use bollard::models::{ContainerInspectResponse, PortMap};
use bollard::Docker;
use log::debug;

use super::{ContainerDetail, ContainerRuntime, HostBinding};
use crate::error::{MonitorError, Result};
use crate::types::{ContainerSummary, Snapshot};

/// [`ContainerRuntime`] backed by the local Docker daemon.
pub struct DockerRuntime {
    docker: Docker,
}

impl DockerRuntime {
    /// Connect using the local defaults: `DOCKER_HOST` when set, the unix
    /// socket otherwise.
    pub fn connect() -> Result<Self> {
        let docker = Docker::connect_with_local_defaults()?;
        Ok(Self { docker })
    }
}

#[async_trait]
impl ContainerRuntime for DockerRuntime {
    async fn list_running(&self) -> Result<Snapshot> {
        let opts = ListContainersOptions::<String> {
            all: false,
            ..Default::default()
        };
        let containers = self.docker.list_containers(Some(opts)).await?;
        debug!("Runtime reported {} running containers", containers.len());

        Ok(containers
            .into_iter()
            .filter_map(|c| {
                let id = c.id?;
                let name = c
                    .names
                    .as_ref()
                    .and_then(|n| n.first())
                    .map(|n| n.trim_start_matches('/').to_string())
                    .unwrap_or_else(|| id.clone());
                let image = c.image.unwrap_or_default();
                Some(ContainerSummary::new(id, name, image))
            })
            .collect())
    }

    async fn inspect(&self, id: &str) -> Result<ContainerDetail> {
        match self.docker.inspect_container(id, None).await {
            Ok(detail) => Ok(detail_from_inspect(detail)),
            Err(bollard::errors::Error::DockerResponseServerError {
                status_code: 404, ..
            }) => Err(MonitorError::ContainerVanished(id.to_string())),
            Err(e) => Err(e.into()),
        }
    }
}

/// Live `NetworkSettings.Ports` bindings win per container port: they carry
/// the host port Docker picked for `-p 80`.  A stopped container has no
/// live bindings, so its configured `HostConfig.PortBindings` are used.
fn detail_from_inspect(detail: ContainerInspectResponse) -> ContainerDetail {
    let mut port_bindings = detail
        .host_config
        .and_then(|h| h.port_bindings)
        .map(collect_bindings)
        .unwrap_or_default();

    let live = detail
        .network_settings
        .and_then(|n| n.ports)
        .map(collect_bindings)
        .unwrap_or_default();
    for (spec, bindings) in live {
        if !bindings.is_empty() {
            port_bindings.insert(spec, bindings);
        } else {
            port_bindings.entry(spec).or_default();
        }
    }

    ContainerDetail { port_bindings }
}

fn collect_bindings(ports: PortMap) -> BTreeMap<String, Vec<HostBinding>> {
    ports
        .into_iter()
        .map(|(spec, bindings)| {
            let bindings = bindings
                .unwrap_or_default()
                .into_iter()
                .map(|b| HostBinding {
                    host_ip: b.host_ip.filter(|ip| !ip.is_empty()),
                    host_port: b.host_port.unwrap_or_default(),
                })
                .collect();
            (spec, bindings)
        })
        .collect()
}
