//! Retained scene graph
//!
//! Nodes live in a generational arena. A removed node's key is never
//! resolved again, so stale handles cannot reach a node that later reuses
//! the slot.

use crate::geometry::{EdgeGeometry, MeshGeometry};
use crate::material::{MaterialCache, MaterialKey};
use livecad_core::{BoundingBox, Error, Pose, Result, Rgb};
use nalgebra::Point3;
use slotmap::{new_key_type, SlotMap};

new_key_type! {
    /// Key of a node in a [`SceneGraph`]
    pub struct NodeId;
}

/// One node of the scene graph
#[derive(Debug, Clone)]
pub struct SceneNode {
    /// Stable identifier used for lookup (a part's id, or its name)
    pub name: String,
    /// Display label
    pub label: String,
    pub pose: Pose,
    pub visible: bool,
    pub edges_visible: bool,
    pub mesh: Option<MeshGeometry>,
    pub edges: Option<EdgeGeometry>,
    pub material: Option<MaterialKey>,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

impl SceneNode {
    /// Create an empty grouping node
    pub fn group(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            label: name.clone(),
            name,
            pose: Pose::identity(),
            visible: true,
            edges_visible: true,
            mesh: None,
            edges: None,
            material: None,
            parent: None,
            children: Vec::new(),
        }
    }

    /// Create a node that carries a mesh
    pub fn mesh(
        name: impl Into<String>,
        label: impl Into<String>,
        mesh: MeshGeometry,
        material: MaterialKey,
    ) -> Self {
        Self {
            label: label.into(),
            mesh: Some(mesh),
            material: Some(material),
            ..Self::group(name)
        }
    }

    /// Parent node, if attached
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Child nodes in insertion order
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    /// Whether this node is a part (carries mesh geometry)
    pub fn has_mesh(&self) -> bool {
        self.mesh.is_some()
    }
}

/// The scene: a node arena with a single assembly root and a material cache
#[derive(Debug)]
pub struct SceneGraph {
    nodes: SlotMap<NodeId, SceneNode>,
    root: NodeId,
    materials: MaterialCache,
    edge_color: Rgb,
}

impl SceneGraph {
    /// Create a scene containing only the assembly root
    pub fn new(assembly_label: &str) -> Self {
        let mut nodes = SlotMap::with_key();
        let root = nodes.insert(SceneNode::group(assembly_label));
        Self {
            nodes,
            root,
            materials: MaterialCache::new(),
            edge_color: Rgb([0.44, 0.44, 0.44]),
        }
    }

    /// The assembly root, parent of every part node
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Insert `node` as the last child of `parent`
    pub fn add_node(&mut self, parent: NodeId, mut node: SceneNode) -> Result<NodeId> {
        if !self.nodes.contains_key(parent) {
            return Err(Error::InvalidData(format!(
                "cannot attach '{}': parent node does not exist",
                node.name
            )));
        }
        node.parent = Some(parent);
        node.children.clear();
        let id = self.nodes.insert(node);
        if let Some(p) = self.nodes.get_mut(parent) {
            p.children.push(id);
        }
        Ok(id)
    }

    /// Unlink a node from its parent without removing it from the arena
    pub fn detach(&mut self, id: NodeId) {
        let Some(parent) = self.nodes.get_mut(id).and_then(|n| n.parent.take()) else {
            return;
        };
        if let Some(p) = self.nodes.get_mut(parent) {
            p.children.retain(|c| *c != id);
        }
    }

    /// Detach and remove a node along with its whole subtree.
    ///
    /// Returns the removed node itself; descendants are dropped. The root
    /// cannot be removed.
    pub fn remove_node(&mut self, id: NodeId) -> Option<SceneNode> {
        if id == self.root {
            return None;
        }
        self.detach(id);
        let node = self.nodes.remove(id)?;
        let mut stack = node.children.clone();
        while let Some(child) = stack.pop() {
            if let Some(removed) = self.nodes.remove(child) {
                stack.extend(removed.children);
            }
        }
        Some(node)
    }

    /// Find a direct child of `parent` by identifier
    pub fn find_child(&self, parent: NodeId, name: &str) -> Option<NodeId> {
        self.nodes
            .get(parent)?
            .children
            .iter()
            .copied()
            .find(|c| self.nodes.get(*c).is_some_and(|n| n.name == name))
    }

    /// Identifiers of the mesh-bearing children of `parent`, in order
    pub fn part_keys(&self, parent: NodeId) -> Vec<String> {
        self.children(parent)
            .iter()
            .filter_map(|c| self.nodes.get(*c))
            .filter(|n| n.has_mesh())
            .map(|n| n.name.clone())
            .collect()
    }

    /// Children of a node; empty if the node does not exist
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.nodes.get(id).map(|n| n.children.as_slice()).unwrap_or(&[])
    }

    pub fn node(&self, id: NodeId) -> Option<&SceneNode> {
        self.nodes.get(id)
    }

    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut SceneNode> {
        self.nodes.get_mut(id)
    }

    /// Whether the key still resolves to a live node
    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(id)
    }

    /// Number of nodes including the root
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// A scene always contains its root
    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn materials(&self) -> &MaterialCache {
        &self.materials
    }

    pub fn materials_mut(&mut self) -> &mut MaterialCache {
        &mut self.materials
    }

    /// Color shared by every edge overlay
    pub fn edge_color(&self) -> Rgb {
        self.edge_color
    }

    pub fn set_edge_color(&mut self, color: Rgb) {
        self.edge_color = color;
    }

    /// All live mesh-bearing nodes
    pub fn iter_meshes(&self) -> impl Iterator<Item = (NodeId, &SceneNode)> {
        self.nodes.iter().filter(|(_, n)| n.has_mesh())
    }

    /// World-space bounds of every part under the assembly root
    pub fn assembly_bounds(&self) -> Option<BoundingBox> {
        self.children(self.root)
            .iter()
            .filter_map(|c| self.nodes.get(*c))
            .filter_map(|n| {
                let local = n.mesh.as_ref()?.bounding_box()?;
                Some(transform_box(local, &n.pose))
            })
            .reduce(|a, b| a.union(&b))
    }
}

fn transform_box(bbox: &BoundingBox, pose: &Pose) -> BoundingBox {
    let iso = pose.isometry();
    let corners: Vec<f32> = (0..8)
        .flat_map(|i| {
            let corner = Point3::new(
                if i & 1 == 0 { bbox.min.x } else { bbox.max.x },
                if i & 2 == 0 { bbox.min.y } else { bbox.max.y },
                if i & 4 == 0 { bbox.min.z } else { bbox.max.z },
            );
            let p = iso * corner;
            [p.x, p.y, p.z]
        })
        .collect();
    BoundingBox::from_positions(&corners).unwrap_or(*bbox)
}
