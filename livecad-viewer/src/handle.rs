//! Part handles: owned references to one part node in the scene

use livecad_core::{Appearance, Part, PartTransform, Result};
use livecad_scene::{
    update_edges, update_mesh, AllocationId, BufferWrite, EdgeGeometry, MeshGeometry, MeshUpdate,
    NodeId, SceneGraph, SceneNode,
};

/// What a disposal gave back
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReleasedResources {
    /// Buffer allocations that were freed
    pub allocations: Vec<AllocationId>,
    /// Whether the part's material had no other users and was freed
    pub material_freed: bool,
}

/// Handle to one part node and its geometry.
///
/// A handle is valid while it has not been disposed and its node is still
/// attached to the assembly root. Every mutation on an invalid handle is a
/// no-op. Once disposed a handle never becomes valid again.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartHandle {
    key: String,
    node: NodeId,
    disposed: bool,
}

impl PartHandle {
    /// Build the node for `part` and attach it under the assembly root.
    ///
    /// This is the only place part nodes are constructed. Fails with
    /// `MissingMesh` when the part has no vertices and `InvalidData` when
    /// its buffers are inconsistent.
    pub fn create(scene: &mut SceneGraph, part: &Part, fallback_color: &str) -> Result<Self> {
        let key = part.key().to_string();
        part.mesh.validate(&key)?;
        let vertices = part.mesh.vertices.as_deref().unwrap_or_default();

        let geometry = MeshGeometry::new(vertices, &part.mesh.normals, &part.mesh.triangle_indices);
        let material = scene
            .materials_mut()
            .acquire(&part.appearance, fallback_color);

        let mut node = SceneNode::mesh(key.clone(), part.name.clone(), geometry, material);
        node.edges = part.mesh.edge_segments.as_deref().map(EdgeGeometry::new);
        if let Some(transform) = &part.transform {
            node.pose.apply(transform);
        }
        if let Some(visibility) = part.visibility_state {
            node.visible = visibility.shape;
            node.edges_visible = visibility.edges;
        }

        let root = scene.root();
        let node = match scene.add_node(root, node) {
            Ok(node) => node,
            Err(e) => {
                scene.materials_mut().release(material);
                return Err(e);
            }
        };
        Ok(Self {
            key,
            node,
            disposed: false,
        })
    }

    /// Take ownership of an existing part node found under the assembly root
    pub fn adopt(scene: &SceneGraph, key: &str) -> Option<Self> {
        let node = scene.find_child(scene.root(), key)?;
        if !scene.node(node)?.has_mesh() {
            return None;
        }
        Some(Self {
            key: key.to_string(),
            node,
            disposed: false,
        })
    }

    /// Part identifier
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Scene node
    pub fn node(&self) -> NodeId {
        self.node
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    /// Not disposed and attached to the assembly root
    pub fn is_valid(&self, scene: &SceneGraph) -> bool {
        !self.disposed
            && scene
                .node(self.node)
                .is_some_and(|n| n.parent() == Some(scene.root()))
    }

    fn node_mut<'a>(&self, scene: &'a mut SceneGraph) -> Option<&'a mut SceneNode> {
        if !self.is_valid(scene) {
            return None;
        }
        scene.node_mut(self.node)
    }

    /// Apply the components present in `transform`; absent ones are kept
    pub fn set_transform(&self, scene: &mut SceneGraph, transform: &PartTransform) {
        if let Some(node) = self.node_mut(scene) {
            node.pose.apply(transform);
        }
    }

    /// Overwrite the solid mesh
    pub fn update_geometry(
        &self,
        scene: &mut SceneGraph,
        vertices: &[f32],
        normals: &[f32],
        indices: &[u32],
    ) -> Option<MeshUpdate> {
        let mesh = self.node_mut(scene)?.mesh.as_mut()?;
        Some(update_mesh(mesh, vertices, normals, indices))
    }

    /// Overwrite the edge overlay; no-op when the part was created without one
    pub fn update_edges(&self, scene: &mut SceneGraph, segments: &[f32]) -> Option<BufferWrite> {
        let edges = self.node_mut(scene)?.edges.as_mut()?;
        Some(update_edges(edges, segments))
    }

    /// Switch to the material for `appearance`, releasing the previous one
    pub fn set_appearance(&self, scene: &mut SceneGraph, appearance: &Appearance, fallback: &str) {
        let Some(previous) = self.node_mut(scene).and_then(|n| n.material) else {
            return;
        };
        let next = scene.materials_mut().acquire(appearance, fallback);
        if let Some(node) = scene.node_mut(self.node) {
            node.material = Some(next);
        }
        scene.materials_mut().release(previous);
    }

    /// Replace the display label; returns `true` if it changed
    pub fn set_label(&self, scene: &mut SceneGraph, label: &str) -> bool {
        match self.node_mut(scene) {
            Some(node) if node.label != label => {
                node.label = label.to_string();
                true
            }
            _ => false,
        }
    }

    /// Set shape and edge visibility on the node
    pub fn set_visibility(&self, scene: &mut SceneGraph, shape: bool, edges: bool) {
        if let Some(node) = self.node_mut(scene) {
            node.visible = shape;
            node.edges_visible = edges;
        }
    }

    /// Detach the node, free its buffers and release its material.
    ///
    /// Idempotent: the second and later calls return `None`.
    pub fn dispose(&mut self, scene: &mut SceneGraph) -> Option<ReleasedResources> {
        if self.disposed {
            return None;
        }
        self.disposed = true;

        let mut node = scene.remove_node(self.node)?;
        let mut released = ReleasedResources::default();
        if let Some(mesh) = node.mesh.as_mut() {
            released.allocations.extend(mesh.release());
        }
        if let Some(edges) = node.edges.as_mut() {
            released.allocations.push(edges.release());
        }
        if let Some(material) = node.material.take() {
            released.material_freed = scene.materials_mut().release(material);
        }
        Some(released)
    }
}
