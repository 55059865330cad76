//! Batch queue and combined-request construction.
//!
//! While the endpoint is combo-capable, first requests for a fragment land
//! in this queue instead of issuing an individual load. Each dispatch tick
//! drains the queue atomically; entries raised while the combined load is
//! in flight belong to the next tick.

use crate::combo::PathFor;
use crate::config::ComboConfig;

#[derive(Default)]
pub(crate) struct BatchQueue {
    entries: Vec<String>,
}

impl BatchQueue {
    pub(crate) fn push(&mut self, id: &str) {
        self.entries.push(id.to_string());
    }

    /// Snapshot the queue and clear it; a fresh queue accepts entries
    /// raised during the combined load.
    pub(crate) fn drain(&mut self) -> Vec<String> {
        std::mem::take(&mut self.entries)
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Build the combined target for one batch: the endpoint, the combo marker,
/// then every fragment's path segment in enqueue order joined by the
/// configured delimiter.
pub(crate) fn combo_target(
    endpoint: &str,
    ids: &[String],
    path_for: &PathFor,
    cfg: &ComboConfig,
) -> String {
    let segments: Vec<String> = ids.iter().map(|id| path_for(id)).collect();
    format!(
        "{}{}{}",
        endpoint,
        cfg.combo_marker,
        segments.join(&cfg.combo_delimiter)
    )
}
