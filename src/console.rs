//! Terminal listing of the running containers, printed once per tick.

use std::fmt::Write;

use chrono::{DateTime, TimeZone};

use crate::format::short_id;
use crate::runtime::ContainerRuntime;
use crate::types::{ContainerSummary, PortMapping, Snapshot};

const CLEAR_SCREEN: &str = "\x1b[H\x1b[2J";

pub fn render_listing<Tz>(now: &DateTime<Tz>, entries: &[(ContainerSummary, Vec<PortMapping>)]) -> String
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    let mut out = String::new();
    let _ = writeln!(out, "Container monitoring:");
    let _ = writeln!(out, "Time: {}", now.format("%-d %B %Y %-I:%M %p"));
    let _ = writeln!(out, "Current containers:");
    for (c, ports) in entries {
        let ports = ports
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ");
        let _ = writeln!(
            out,
            "ID: {}, Name: {}, Image: {}, Ports: {}",
            short_id(&c.id),
            c.name,
            c.image,
            ports
        );
    }
    out
}

/// Print the listing for `snapshot`.  Containers that cannot be inspected
/// are shown without ports.
pub async fn print_listing<R>(runtime: &R, snapshot: &Snapshot, clear: bool)
where
    R: ContainerRuntime + ?Sized,
{
    let mut entries = Vec::with_capacity(snapshot.len());
    for c in snapshot.containers() {
        let ports = match runtime.inspect(&c.id).await {
            Ok(detail) => detail.port_mappings(),
            Err(_) => Vec::new(),
        };
        entries.push((c.clone(), ports));
    }

    let listing = render_listing(&chrono::Local::now(), &entries);
    if clear {
        print!("{}{}", CLEAR_SCREEN, listing);
    } else {
        print!("{}", listing);
    }
}
