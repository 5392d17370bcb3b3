//! Notification text.
//!
//! The rendered message is embedded verbatim inside a JSON string by the
//! webhook sinks, so every interpolated field is escaped here, exactly once.

use std::fmt::Write;

use crate::types::{ContainerEvent, ContainerSummary, PortMapping};

const SHORT_ID_LEN: usize = 12;

/// First twelve characters of a container id, or the whole id when shorter.
pub fn short_id(id: &str) -> &str {
    match id.char_indices().nth(SHORT_ID_LEN) {
        Some((idx, _)) => &id[..idx],
        None => id,
    }
}

/// Render the notification for one changed container.
pub fn format_message(
    event: ContainerEvent,
    container: &ContainerSummary,
    ports: &[PortMapping],
    host: &str,
) -> String {
    let ports = ports
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ");

    format!(
        "{} ID: {}, Name: {}, Image: {}, Ports: {}, Server: {}",
        event.prefix(),
        escape(short_id(&container.id)),
        escape(&container.name),
        escape(&container.image),
        escape(&ports),
        escape(host),
    )
}

/// Escape `input` for use inside a JSON string literal.
pub fn escape(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if (c as u32) < 0x20 => {
                let _ = write!(out, "\\u{:04x}", c as u32);
            }
            c => out.push(c),
        }
    }
    out
}
