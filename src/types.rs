//! Data structures shared by the monitor, differ and formatter.
//!
//! Everything here is a plain value owned by the poll cycle that produced
//! it.  Nothing is cached between ticks except the previous [`Snapshot`],
//! which the monitor replaces wholesale every cycle.

use std::collections::HashSet;
use std::fmt;

/// A running container as reported by the runtime's list call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerSummary {
    /// Runtime-assigned id.  Opaque; only compared for equality.
    pub id: String,
    pub name: String,
    pub image: String,
}

impl ContainerSummary {
    pub fn new(id: impl Into<String>, name: impl Into<String>, image: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            image: image.into(),
        }
    }
}

/// One published port of a container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortMapping {
    pub host_port: String,
    pub container_port: String,
    /// `tcp`, `udp` or `sctp`; empty when the runtime did not qualify the port.
    pub protocol: String,
}

impl fmt::Display for PortMapping {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}->{}", self.host_port, self.container_port)
    }
}

/// The set of containers observed running at one tick.
///
/// Ids are unique: when built from an iterator, later entries carrying an
/// id that was already seen are dropped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Snapshot {
    containers: Vec<ContainerSummary>,
}

impl Snapshot {
    #[cfg(test)]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn containers(&self) -> &[ContainerSummary] {
        &self.containers
    }

    pub fn len(&self) -> usize {
        self.containers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.containers.is_empty()
    }

    /// Linear scan, for assertions only.
    #[cfg(test)]
    pub fn contains(&self, id: &str) -> bool {
        self.containers.iter().any(|c| c.id == id)
    }

    /// Ids of every container in the snapshot.
    pub fn ids(&self) -> HashSet<&str> {
        self.containers.iter().map(|c| c.id.as_str()).collect()
    }
}

impl FromIterator<ContainerSummary> for Snapshot {
    fn from_iter<I: IntoIterator<Item = ContainerSummary>>(iter: I) -> Self {
        let mut seen = HashSet::new();
        let containers = iter
            .into_iter()
            .filter(|c| seen.insert(c.id.clone()))
            .collect();
        Self { containers }
    }
}

/// Delta between two consecutive snapshots.
///
/// `added` and `removed` never share an id, and a container present in
/// both snapshots appears in neither.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiffResult {
    pub added: Vec<ContainerSummary>,
    pub removed: Vec<ContainerSummary>,
}

impl DiffResult {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }
}

/// Kind of change a notification reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainerEvent {
    Started,
    Removed,
}

impl ContainerEvent {
    /// Text prepended to the rendered message body.
    pub fn prefix(self) -> &'static str {
        match self {
            ContainerEvent::Started => "New container started:",
            ContainerEvent::Removed => "Removed container:",
        }
    }
}

impl fmt::Display for ContainerEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContainerEvent::Started => write!(f, "started"),
            ContainerEvent::Removed => write!(f, "removed"),
        }
    }
}
