//! Navigation tree shown next to the viewport

use crate::state::StateManager;
use livecad_core::{Error, Result, VisibilityMap, VisibilityState};
use std::collections::HashSet;

/// One entry of the tree: a part under the assembly root
#[derive(Debug, Clone, PartialEq)]
pub struct TreeEntry {
    pub id: String,
    pub name: String,
    /// `/<assembly>/<name>`
    pub path: String,
    pub state: VisibilityState,
}

/// Two-level tree: the assembly root and one leaf per part.
///
/// The tree is disposable. It is rebuilt from the registry and the state
/// manager whenever part membership changes, and owns no state of its own.
#[derive(Debug, Clone, PartialEq)]
pub struct TreeView {
    assembly: String,
    entries: Vec<TreeEntry>,
    expansion_level: u32,
}

impl TreeView {
    /// Build the tree for `parts`, given as `(id, display name)` pairs.
    ///
    /// Leaves are addressed by path, so two parts with the same display name
    /// cannot be represented and fail the build.
    pub fn build<'a>(
        assembly: &str,
        parts: impl IntoIterator<Item = (&'a str, &'a str)>,
        state: &StateManager,
    ) -> Result<Self> {
        let mut seen = HashSet::new();
        let mut entries = Vec::new();
        for (id, name) in parts {
            if name.is_empty() || name.contains('/') {
                return Err(Error::TreeView(format!(
                    "part '{}' has an unusable display name '{}'",
                    id, name
                )));
            }
            if !seen.insert(name) {
                return Err(Error::TreeView(format!(
                    "duplicate display name '{}' (part '{}')",
                    name, id
                )));
            }
            entries.push(TreeEntry {
                id: id.to_string(),
                name: name.to_string(),
                path: format!("/{}/{}", assembly, name),
                state: state.visibility(id),
            });
        }

        Ok(Self {
            assembly: assembly.to_string(),
            entries,
            expansion_level: state.expansion_level(),
        })
    }

    /// Visibility keyed by display name, as handed to the tree widget
    pub fn state_map(&self) -> VisibilityMap {
        self.entries
            .iter()
            .map(|e| (e.name.clone(), e.state))
            .collect()
    }

    /// Refresh the displayed state of one part
    pub fn set_state(&mut self, id: &str, state: VisibilityState) {
        if let Some(entry) = self.entries.iter_mut().find(|e| e.id == id) {
            entry.state = state;
        }
    }

    /// Path of a part
    pub fn path_of(&self, id: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|e| e.id == id)
            .map(|e| e.path.as_str())
    }

    /// Part identifier behind a path
    pub fn id_for_path(&self, path: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|e| e.path == path)
            .map(|e| e.id.as_str())
    }

    pub fn assembly(&self) -> &str {
        &self.assembly
    }

    pub fn entries(&self) -> &[TreeEntry] {
        &self.entries
    }

    pub fn expansion_level(&self) -> u32 {
        self.expansion_level
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
