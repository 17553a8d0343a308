//! Bounded linear undo/redo history over dashboard snapshots.
//!
//! The undo stack holds pre-mutation snapshots (most recent at the back).
//! Undoing pops one and parks the live state on the redo stack; any new
//! mutation clears the redo stack, so history never branches.

use crate::dashboard::model::Snapshot;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use tracing::debug;

/// History limits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryConfig {
    /// Snapshots retained on the undo stack; the oldest is evicted first.
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            max_depth: default_max_depth(),
        }
    }
}

impl HistoryConfig {
    pub fn new(max_depth: usize) -> Self {
        Self { max_depth }
    }
}

fn default_max_depth() -> usize {
    50
}

#[derive(Debug, Default)]
pub struct UndoRedoManager {
    undo_stack: VecDeque<Snapshot>,
    redo_stack: VecDeque<Snapshot>,
    config: HistoryConfig,
}

impl UndoRedoManager {
    /// A `max_depth` of 0 is treated as 1.
    pub fn new(mut config: HistoryConfig) -> Self {
        config.max_depth = config.max_depth.max(1);
        Self {
            undo_stack: VecDeque::new(),
            redo_stack: VecDeque::new(),
            config,
        }
    }

    pub fn push_undo_state(&mut self, snapshot: Snapshot) {
        self.undo_stack.push_back(snapshot);
        while self.undo_stack.len() > self.config.max_depth {
            self.undo_stack.pop_front();
            debug!(max_depth = self.config.max_depth, "evicted oldest undo snapshot");
        }
    }

    pub fn clear_redo_stack(&mut self) {
        self.redo_stack.clear();
    }

    /// Pop the most recent undo snapshot, parking `current` for redo.
    /// Returns `None` (and keeps `current` out of history) when empty.
    pub fn undo(&mut self, current: Snapshot) -> Option<Snapshot> {
        let previous = self.undo_stack.pop_back()?;
        self.redo_stack.push_back(current);
        Some(previous)
    }

    /// Inverse of [`undo`](Self::undo).
    pub fn redo(&mut self, current: Snapshot) -> Option<Snapshot> {
        let next = self.redo_stack.pop_back()?;
        self.undo_stack.push_back(current);
        while self.undo_stack.len() > self.config.max_depth {
            self.undo_stack.pop_front();
        }
        Some(next)
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn undo_depth(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn redo_depth(&self) -> usize {
        self.redo_stack.len()
    }

    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }

    pub fn config(&self) -> &HistoryConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dashboard::model::{Widget, WidgetType};

    fn snap(ids: &[&str]) -> Snapshot {
        Snapshot::new(
            ids.iter()
                .map(|id| Widget::new(*id, WidgetType::Kpi, *id))
                .collect(),
            Default::default(),
        )
    }

    #[test]
    fn test_empty_stacks_are_noops() {
        let mut h = UndoRedoManager::default();
        assert!(h.undo(snap(&["a"])).is_none());
        assert!(h.redo(snap(&["a"])).is_none());
        assert!(!h.can_undo());
        assert!(!h.can_redo());
        assert_eq!(h.redo_depth(), 0);
    }

    #[test]
    fn test_undo_then_redo_swaps_states() {
        let mut h = UndoRedoManager::default();
        h.push_undo_state(snap(&["a", "b"]));

        let restored = h.undo(snap(&["b"])).unwrap();
        assert_eq!(restored, snap(&["a", "b"]));
        assert!(h.can_redo());
        assert!(!h.can_undo());

        let again = h.redo(restored).unwrap();
        assert_eq!(again, snap(&["b"]));
        assert!(h.can_undo());
        assert!(!h.can_redo());
    }

    #[test]
    fn test_depth_is_bounded() {
        let mut h = UndoRedoManager::new(HistoryConfig::new(3));
        for i in 0..10 {
            let id = format!("w{}", i);
            h.push_undo_state(snap(&[id.as_str()]));
        }
        assert_eq!(h.undo_depth(), 3);
        let newest = h.undo(snap(&[])).unwrap();
        assert_eq!(newest.widgets[0].id, "w9");
    }

    #[test]
    fn test_clear_redo() {
        let mut h = UndoRedoManager::default();
        h.push_undo_state(snap(&["a"]));
        h.undo(snap(&[]));
        assert!(h.can_redo());
        h.clear_redo_stack();
        assert!(!h.can_redo());
    }
}
