// Change detection between consecutive cycles. The stored "previous" map is
// the only state carried across cycles; it has exactly one writer (the poll
// worker) and is replaced wholesale each cycle.

use crate::models::BoardEntry;
use std::collections::HashMap;

/// Flags each entry whose value differs from the previous cycle. A group
/// absent from `previous` (first cycle it appears) is never flagged, which
/// avoids a highlight storm on startup. Pure with respect to its inputs.
pub fn diff(current: &[BoardEntry], previous: &HashMap<String, f64>) -> Vec<BoardEntry> {
    current
        .iter()
        .cloned()
        .map(|mut entry| {
            entry.changed = previous
                .get(&entry.group)
                .is_some_and(|prev| *prev != entry.value);
            entry
        })
        .collect()
}

/// Previous-cycle values for one metric.
#[derive(Debug, Default)]
pub struct MetricTracker {
    previous: HashMap<String, f64>,
}

impl MetricTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Annotates the board against the stored previous cycle, then replaces
    /// the stored values with the current ones in full.
    pub fn observe(&mut self, board: Vec<BoardEntry>) -> Vec<BoardEntry> {
        let annotated = diff(&board, &self.previous);
        self.previous = annotated
            .iter()
            .map(|entry| (entry.group.clone(), entry.value))
            .collect();
        annotated
    }
}

/// One tracker per published metric.
#[derive(Debug, Default)]
pub struct DeltaTracker {
    pub players: MetricTracker,
    pub ratios: MetricTracker,
    pub ratings: MetricTracker,
}

impl DeltaTracker {
    pub fn new() -> Self {
        Self::default()
    }
}
