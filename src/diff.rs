//! Snapshot comparison.

use crate::types::{DiffResult, Snapshot};

/// Containers that appeared in `current` and disappeared from `previous`.
///
/// Membership is tested against id sets, so the cost is linear in the size
/// of both snapshots.  Output order follows the order of the input
/// snapshots.
pub fn diff(previous: &Snapshot, current: &Snapshot) -> DiffResult {
    let previous_ids = previous.ids();
    let current_ids = current.ids();

    let added = current
        .containers()
        .iter()
        .filter(|c| !previous_ids.contains(c.id.as_str()))
        .cloned()
        .collect();
    let removed = previous
        .containers()
        .iter()
        .filter(|c| !current_ids.contains(c.id.as_str()))
        .cloned()
        .collect();

    DiffResult { added, removed }
}
