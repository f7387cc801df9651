//! Part registry: identifier to handle mapping and snapshot diffing
//!
//! The registry is the single owner of part handles. It reconciles the
//! scene with each incoming snapshot and heals itself when the scene holds
//! part nodes it does not track.

use crate::handle::PartHandle;
use indexmap::{IndexMap, IndexSet};
use livecad_core::{Error, Part};
use livecad_scene::SceneGraph;

/// Counts produced by one [`PartRegistry::sync`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncReport {
    pub added: usize,
    pub updated: usize,
    pub removed: usize,
    /// Updated parts whose display name changed
    pub relabeled: usize,
}

impl SyncReport {
    /// Whether the set of parts changed (as opposed to only their contents)
    pub fn membership_changed(&self) -> bool {
        self.added > 0 || self.removed > 0
    }

    /// Whether the navigation tree is out of date
    pub fn tree_changed(&self) -> bool {
        self.membership_changed() || self.relabeled > 0
    }
}

/// Registry of live part handles, in insertion order
#[derive(Debug)]
pub struct PartRegistry {
    handles: IndexMap<String, PartHandle>,
    fallback_color: String,
}

impl PartRegistry {
    /// Create an empty registry; `fallback_color` replaces unparsable part colors
    pub fn new(fallback_color: impl Into<String>) -> Self {
        Self {
            handles: IndexMap::new(),
            fallback_color: fallback_color.into(),
        }
    }

    /// Create and track a handle for `part`.
    ///
    /// A part without usable mesh data is skipped with a warning and `None`
    /// is returned. A part whose identifier is already tracked replaces the
    /// old node.
    pub fn add(&mut self, scene: &mut SceneGraph, part: &Part) -> Option<&PartHandle> {
        let key = part.key().to_string();
        if let Some(mut previous) = self.handles.shift_remove(&key) {
            previous.dispose(scene);
        }

        match PartHandle::create(scene, part, &self.fallback_color) {
            Ok(handle) => {
                self.handles.insert(key.clone(), handle);
                self.handles.get(&key)
            }
            Err(Error::MissingMesh { .. }) => {
                log::warn!("registry.add: skipping part '{}': missing mesh vertices", key);
                None
            }
            Err(e) => {
                log::warn!("registry.add: skipping part '{}': {}", key, e);
                None
            }
        }
    }

    /// Dispose the part with identifier `id`.
    ///
    /// Untracked scene nodes carrying the same identifier are disposed as
    /// well. Returns `true` if anything was removed; an unknown id is a no-op.
    pub fn remove(&mut self, scene: &mut SceneGraph, id: &str) -> bool {
        let mut removed = false;
        if let Some(mut handle) = self.handles.shift_remove(id) {
            removed |= handle.dispose(scene).is_some();
        }
        while let Some(mut stray) = PartHandle::adopt(scene, id) {
            log::warn!("registry.remove: disposing untracked node for part '{}'", id);
            if stray.dispose(scene).is_none() {
                break;
            }
            removed = true;
        }
        removed
    }

    /// Bring the tracked part `id` in line with `part`.
    ///
    /// An invalid tracked handle is disposed and an untracked scene node
    /// with this identifier is adopted in its place. Returns `None` when no
    /// node can be resolved, otherwise whether the display name changed.
    pub fn update(&mut self, scene: &mut SceneGraph, id: &str, part: &Part) -> Option<bool> {
        if !self.handles.get(id).is_some_and(|h| h.is_valid(scene)) {
            if let Some(mut stale) = self.handles.shift_remove(id) {
                if stale.dispose(scene).is_some() {
                    log::warn!("registry.update: disposed detached node of part '{}'", id);
                }
            }
            let handle = PartHandle::adopt(scene, id)?;
            log::warn!("registry.update: adopting untracked node for part '{}'", id);
            self.handles.insert(id.to_string(), handle);
        }
        let handle = self.handles.get(id)?;

        if let Some(transform) = &part.transform {
            handle.set_transform(scene, transform);
        }
        match part.mesh.validate(id) {
            Ok(()) => {
                let vertices = part.mesh.vertices.as_deref().unwrap_or_default();
                handle.update_geometry(scene, vertices, &part.mesh.normals, &part.mesh.triangle_indices);
                if let Some(segments) = &part.mesh.edge_segments {
                    handle.update_edges(scene, segments);
                }
            }
            Err(e) => log::warn!("registry.update: keeping geometry of part '{}': {}", id, e),
        }
        handle.set_appearance(scene, &part.appearance, &self.fallback_color);
        Some(handle.set_label(scene, &part.name))
    }

    /// Reconcile the scene with a complete snapshot.
    ///
    /// All removals happen before any update or addition. When an
    /// identifier appears more than once, the last occurrence wins.
    pub fn sync(&mut self, scene: &mut SceneGraph, parts: &[Part]) -> SyncReport {
        let mut latest: IndexMap<&str, &Part> = IndexMap::new();
        for part in parts {
            latest.insert(part.key(), part);
        }

        let mut existing: IndexSet<String> = self.handles.keys().cloned().collect();
        existing.extend(scene.part_keys(scene.root()));

        let mut report = SyncReport::default();
        for id in existing.iter().filter(|id| !latest.contains_key(id.as_str())) {
            if self.remove(scene, id) {
                report.removed += 1;
            }
        }

        for (id, part) in latest {
            if existing.contains(id) {
                match self.update(scene, id, part) {
                    Some(relabeled) => {
                        report.updated += 1;
                        report.relabeled += usize::from(relabeled);
                    }
                    None => {
                        if self.add(scene, part).is_some() {
                            report.added += 1;
                        }
                    }
                }
            } else if self.add(scene, part).is_some() {
                report.added += 1;
            }
        }

        log::debug!(
            "registry.sync: added {}, updated {} ({} relabeled), removed {}",
            report.added,
            report.updated,
            report.relabeled,
            report.removed
        );
        report
    }

    /// Dispose every tracked handle
    pub fn clear(&mut self, scene: &mut SceneGraph) -> usize {
        let mut disposed = 0;
        for (_, mut handle) in self.handles.drain(..) {
            if handle.dispose(scene).is_some() {
                disposed += 1;
            }
        }
        disposed
    }

    pub fn get(&self, id: &str) -> Option<&PartHandle> {
        self.handles.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.handles.contains_key(id)
    }

    /// Tracked identifiers in insertion order
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.handles.keys().map(String::as_str)
    }

    pub fn handles(&self) -> impl Iterator<Item = &PartHandle> {
        self.handles.values()
    }

    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use livecad_core::{PartMesh, PartTransform};
    use livecad_scene::BufferWrite;

    fn part(name: &str, size: f32) -> Part {
        Part::named(name, PartMesh::cuboid([0.0; 3], [size; 3]))
    }

    fn setup() -> (SceneGraph, PartRegistry) {
        (SceneGraph::new("Assembly"), PartRegistry::new("#888888"))
    }

    #[test]
    fn test_add_skips_missing_mesh() {
        let (mut scene, mut registry) = setup();
        assert!(registry.add(&mut scene, &Part::named("Empty", PartMesh::default())).is_none());
        assert!(registry.is_empty());
    }

    #[test]
    fn test_add_same_id_replaces_node() {
        let (mut scene, mut registry) = setup();
        registry.add(&mut scene, &part("A", 1.0));
        registry.add(&mut scene, &part("A", 2.0));
        assert_eq!(registry.len(), 1);
        assert_eq!(scene.part_keys(scene.root()), vec!["A"]);
    }

    #[test]
    fn test_remove_unknown_is_noop() {
        let (mut scene, mut registry) = setup();
        registry.add(&mut scene, &part("A", 1.0));
        assert!(!registry.remove(&mut scene, "Z"));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_remove_clears_untracked_node() {
        let (mut scene, mut registry) = setup();
        PartHandle::create(&mut scene, &part("Stray", 1.0), "#888888").unwrap();
        assert!(registry.remove(&mut scene, "Stray"));
        assert!(scene.part_keys(scene.root()).is_empty());
    }

    #[test]
    fn test_update_adopts_untracked_node() {
        let (mut scene, mut registry) = setup();
        PartHandle::create(&mut scene, &part("Stray", 1.0), "#888888").unwrap();
        let moved = part("Stray", 1.0).with_transform(PartTransform::at([5.0, 0.0, 0.0]));

        assert_eq!(registry.update(&mut scene, "Stray", &moved), Some(false));
        assert!(registry.contains("Stray"));
        let node = scene.node(registry.get("Stray").unwrap().node()).unwrap();
        assert_eq!(node.pose.translation.x, 5.0);
    }

    #[test]
    fn test_update_unresolvable_is_noop() {
        let (mut scene, mut registry) = setup();
        assert!(registry.update(&mut scene, "Nobody", &part("Nobody", 1.0)).is_none());
        assert!(registry.is_empty());
    }

    #[test]
    fn test_sync_diff_counts() {
        let (mut scene, mut registry) = setup();
        let first = registry.sync(&mut scene, &[part("A", 1.0), part("B", 1.0)]);
        assert_eq!(first, SyncReport { added: 2, ..SyncReport::default() });

        let second = registry.sync(&mut scene, &[part("A", 2.0), part("C", 1.0)]);
        assert_eq!(second, SyncReport { added: 1, updated: 1, removed: 1, relabeled: 0 });
        assert_eq!(registry.keys().collect::<Vec<_>>(), vec!["A", "C"]);
    }

    #[test]
    fn test_sync_duplicate_last_wins() {
        let (mut scene, mut registry) = setup();
        let report = registry.sync(&mut scene, &[part("A", 1.0), part("A", 3.0)]);
        assert_eq!(report.added, 1);
        let node = scene.node(registry.get("A").unwrap().node()).unwrap();
        let bbox = node.mesh.as_ref().unwrap().bounding_box().unwrap();
        assert_eq!(bbox.max.x, 1.5);
    }

    #[test]
    fn test_sync_reuses_buffers_for_same_topology() {
        let (mut scene, mut registry) = setup();
        registry.sync(&mut scene, &[part("A", 1.0)]);
        let node = registry.get("A").unwrap().node();
        let before = scene.node(node).unwrap().mesh.as_ref().unwrap().positions().allocation();

        registry.sync(&mut scene, &[part("A", 2.0)]);
        let after = scene.node(node).unwrap().mesh.as_ref().unwrap().positions().allocation();
        assert_eq!(before, after);
    }

    #[test]
    fn test_sync_heals_drifted_scene() {
        let (mut scene, mut registry) = setup();
        PartHandle::create(&mut scene, &part("Ghost", 1.0), "#888888").unwrap();
        let report = registry.sync(&mut scene, &[part("A", 1.0)]);
        assert_eq!(report, SyncReport { added: 1, removed: 1, ..SyncReport::default() });
        assert_eq!(scene.part_keys(scene.root()), vec!["A"]);
    }

    #[test]
    fn test_sync_skips_invalid_part_and_continues() {
        let (mut scene, mut registry) = setup();
        let report = registry.sync(
            &mut scene,
            &[part("A", 1.0), Part::named("Broken", PartMesh::default()), part("B", 1.0)],
        );
        assert_eq!(report.added, 2);
        assert!(!registry.contains("Broken"));
    }

    #[test]
    fn test_update_edges_independent_of_mesh() {
        let (mut scene, mut registry) = setup();
        let with_edges = |y: f32| {
            Part::named(
                "E",
                PartMesh::cuboid([0.0; 3], [1.0; 3]).with_edges(vec![0.0, 0.0, 0.0, 0.0, y, 0.0]),
            )
        };
        registry.sync(&mut scene, &[with_edges(1.0)]);
        registry.sync(&mut scene, &[with_edges(4.0)]);
        let handle = registry.get("E").unwrap();
        assert_eq!(
            handle.update_edges(&mut scene, &[0.0; 6]),
            Some(BufferWrite::Reused)
        );
    }

    #[test]
    fn test_clear_disposes_all() {
        let (mut scene, mut registry) = setup();
        registry.sync(&mut scene, &[part("A", 1.0), part("B", 1.0)]);
        assert_eq!(registry.clear(&mut scene), 2);
        assert!(scene.materials().is_empty());
        assert_eq!(scene.len(), 1);
    }

    #[test]
    fn test_update_disposes_detached_handle_before_adopting() {
        let (mut scene, mut registry) = setup();
        registry.sync(&mut scene, &[part("A", 1.0)]);
        let detached = registry.get("A").unwrap().node();
        scene.detach(detached);
        let stray = PartHandle::create(&mut scene, &part("A", 1.0), "#888888").unwrap();

        assert_eq!(registry.update(&mut scene, "A", &part("A", 2.0)), Some(false));
        assert!(!scene.contains(detached));
        assert_eq!(registry.get("A").unwrap().node(), stray.node());
        assert_eq!(scene.len(), 2);
        let material = scene.node(stray.node()).unwrap().material.unwrap();
        assert_eq!(scene.materials().users(&material), 1);
    }

    #[test]
    fn test_sync_counts_relabeled_parts() {
        let (mut scene, mut registry) = setup();
        let mesh = PartMesh::cuboid([0.0; 3], [1.0; 3]);
        registry.sync(&mut scene, &[Part::new("a", "Old", mesh.clone())]);

        let report = registry.sync(&mut scene, &[Part::new("a", "New", mesh.clone())]);
        assert_eq!(report, SyncReport { updated: 1, relabeled: 1, ..SyncReport::default() });
        assert!(!report.membership_changed());
        assert!(report.tree_changed());
        assert_eq!(scene.node(registry.get("a").unwrap().node()).unwrap().label, "New");

        let again = registry.sync(&mut scene, &[Part::new("a", "New", mesh)]);
        assert_eq!(again.relabeled, 0);
        assert!(!again.tree_changed());
    }
}
