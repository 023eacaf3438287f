//! # Reloader registry.
//!
//! Append-only list of `(priority, reloader)` entries. Priority groups are not
//! stored; [`Registry::groups`] derives them at the start of every dispatch cycle.
//!
//! ## Rules
//! - Lower priority value runs earlier; the range is unbounded (`i64`).
//! - Entries sharing a priority keep their registration order inside the group.
//! - No deduplication: the same reloader may appear in several groups, or twice in one.

use std::collections::BTreeMap;

use crate::reloaders::ReloaderRef;

/// One registered reloader.
struct Entry {
    priority: i64,
    reloader: ReloaderRef,
}

/// All reloaders sharing one priority, in registration order.
#[derive(Clone)]
pub(crate) struct PriorityGroup {
    pub priority: i64,
    pub reloaders: Vec<ReloaderRef>,
}

/// Append-only registry of prioritized reloaders.
#[derive(Default)]
pub(crate) struct Registry {
    entries: Vec<Entry>,
}

impl Registry {
    pub fn push(&mut self, priority: i64, reloader: ReloaderRef) {
        self.entries.push(Entry { priority, reloader });
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Groups entries by priority, sorted ascending.
    pub fn groups(&self) -> Vec<PriorityGroup> {
        let mut by_priority: BTreeMap<i64, Vec<ReloaderRef>> = BTreeMap::new();
        for entry in &self.entries {
            by_priority
                .entry(entry.priority)
                .or_default()
                .push(entry.reloader.clone());
        }

        by_priority
            .into_iter()
            .map(|(priority, reloaders)| PriorityGroup {
                priority,
                reloaders,
            })
            .collect()
    }
}
