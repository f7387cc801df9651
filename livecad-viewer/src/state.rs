//! UI state that outlives the scene graph and the tree view

use livecad_core::VisibilityState;
use std::collections::HashMap;

/// Recorded UI state of one part
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PartRecord {
    pub visibility: VisibilityState,
    pub selected: bool,
}

/// Per-identifier visibility and selection records.
///
/// Records are keyed by part identifier, not by scene node, so they
/// survive tree rebuilds and a part's removal and re-addition. A record is
/// dropped only by [`StateManager::forget`] or [`StateManager::clear`].
#[derive(Debug, Clone)]
pub struct StateManager {
    records: HashMap<String, PartRecord>,
    expansion_level: u32,
}

impl StateManager {
    /// Create an empty manager with the initial tree expansion level
    pub fn new(expansion_level: u32) -> Self {
        Self {
            records: HashMap::new(),
            expansion_level,
        }
    }

    /// Visibility for a part arriving in a snapshot.
    ///
    /// An explicit state from the snapshot is recorded and returned. Without
    /// one the part inherits its recorded state, or fully visible when
    /// nothing is recorded yet.
    pub fn resolve(&mut self, id: &str, explicit: Option<VisibilityState>) -> VisibilityState {
        let record = self.records.entry(id.to_string()).or_default();
        if let Some(visibility) = explicit {
            record.visibility = visibility;
        }
        record.visibility
    }

    /// Recorded visibility, fully visible when none is recorded
    pub fn visibility(&self, id: &str) -> VisibilityState {
        self.records
            .get(id)
            .map(|r| r.visibility)
            .unwrap_or_default()
    }

    pub fn record(&self, id: &str) -> Option<&PartRecord> {
        self.records.get(id)
    }

    /// Record the shape toggle
    pub fn set_shape_visible(&mut self, id: &str, visible: bool) -> VisibilityState {
        let record = self.records.entry(id.to_string()).or_default();
        record.visibility.shape = visible;
        record.visibility
    }

    /// Record the edge toggle
    pub fn set_edges_visible(&mut self, id: &str, visible: bool) -> VisibilityState {
        let record = self.records.entry(id.to_string()).or_default();
        record.visibility.edges = visible;
        record.visibility
    }

    /// Mark `id` as the single selected part
    pub fn select(&mut self, id: &str) {
        for record in self.records.values_mut() {
            record.selected = false;
        }
        self.records.entry(id.to_string()).or_default().selected = true;
    }

    /// Identifier of the selected part
    pub fn selected(&self) -> Option<&str> {
        self.records
            .iter()
            .find(|(_, r)| r.selected)
            .map(|(id, _)| id.as_str())
    }

    pub fn expansion_level(&self) -> u32 {
        self.expansion_level
    }

    pub fn set_expansion_level(&mut self, level: u32) {
        self.expansion_level = level;
    }

    /// Drop the record of one part
    pub fn forget(&mut self, id: &str) -> Option<PartRecord> {
        self.records.remove(id)
    }

    /// Drop every record
    pub fn clear(&mut self) {
        self.records.clear();
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl Default for StateManager {
    fn default() -> Self {
        Self::new(1)
    }
}
