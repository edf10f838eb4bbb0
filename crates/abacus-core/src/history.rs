use std::collections::VecDeque;

use crate::format::format_number;

/// Maximum number of results kept.
pub const HISTORY_CAPACITY: usize = 20;

/// Bounded log of computed results, most recent first.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct History {
    values: VecDeque<f64>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from a loaded snapshot (most recent first). Entries beyond the
    /// capacity are dropped from the tail.
    pub fn from_values(values: impl IntoIterator<Item = f64>) -> Self {
        let values = values
            .into_iter()
            .filter(|v| v.is_finite())
            .take(HISTORY_CAPACITY)
            .collect();
        Self { values }
    }

    /// Insert at the front, evicting the oldest entry when full.
    pub fn push(&mut self, value: f64) {
        if self.values.len() >= HISTORY_CAPACITY {
            self.values.pop_back();
        }
        self.values.push_front(value);
    }

    pub fn clear(&mut self) {
        self.values.clear();
    }

    pub fn get(&self, index: usize) -> Option<f64> {
        self.values.get(index).copied()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = f64> + '_ {
        self.values.iter().copied()
    }

    pub fn to_vec(&self) -> Vec<f64> {
        self.values.iter().copied().collect()
    }

    /// Entries rendered for a history list.
    pub fn formatted(&self) -> Vec<String> {
        self.values.iter().map(|v| format_number(*v)).collect()
    }
}
