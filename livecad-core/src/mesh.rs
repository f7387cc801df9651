//! Tessellated mesh data as delivered for one part

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// Flat tessellation buffers for a single part.
///
/// `vertices` and `normals` are packed `x, y, z` triples, `triangle_indices`
/// index into the vertex triples and `edge_segments` holds line-segment
/// endpoints as triples (two triples per segment).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartMesh {
    #[serde(default)]
    pub vertices: Option<Vec<f32>>,
    #[serde(default)]
    pub normals: Vec<f32>,
    #[serde(default)]
    pub triangle_indices: Vec<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub edge_segments: Option<Vec<f32>>,
}

impl PartMesh {
    /// Create a mesh from vertices, normals and triangle indices
    pub fn new(vertices: Vec<f32>, normals: Vec<f32>, triangle_indices: Vec<u32>) -> Self {
        Self {
            vertices: Some(vertices),
            normals,
            triangle_indices,
            edge_segments: None,
        }
    }

    /// Attach an edge overlay
    pub fn with_edges(mut self, edge_segments: Vec<f32>) -> Self {
        self.edge_segments = Some(edge_segments);
        self
    }

    /// Axis-aligned box centred at `center`, with per-face normals and the
    /// twelve box edges as overlay segments.
    pub fn cuboid(center: [f32; 3], size: [f32; 3]) -> Self {
        let [cx, cy, cz] = center;
        let [hx, hy, hz] = [size[0] / 2.0, size[1] / 2.0, size[2] / 2.0];
        let corner = |sx: f32, sy: f32, sz: f32| [cx + sx * hx, cy + sy * hy, cz + sz * hz];

        // (normal, four corners counter-clockwise seen from outside)
        let faces: [([f32; 3], [[f32; 3]; 4]); 6] = [
            ([0.0, 0.0, 1.0], [corner(-1.0, -1.0, 1.0), corner(1.0, -1.0, 1.0), corner(1.0, 1.0, 1.0), corner(-1.0, 1.0, 1.0)]),
            ([0.0, 0.0, -1.0], [corner(1.0, -1.0, -1.0), corner(-1.0, -1.0, -1.0), corner(-1.0, 1.0, -1.0), corner(1.0, 1.0, -1.0)]),
            ([0.0, 1.0, 0.0], [corner(-1.0, 1.0, 1.0), corner(1.0, 1.0, 1.0), corner(1.0, 1.0, -1.0), corner(-1.0, 1.0, -1.0)]),
            ([0.0, -1.0, 0.0], [corner(-1.0, -1.0, -1.0), corner(1.0, -1.0, -1.0), corner(1.0, -1.0, 1.0), corner(-1.0, -1.0, 1.0)]),
            ([1.0, 0.0, 0.0], [corner(1.0, -1.0, 1.0), corner(1.0, -1.0, -1.0), corner(1.0, 1.0, -1.0), corner(1.0, 1.0, 1.0)]),
            ([-1.0, 0.0, 0.0], [corner(-1.0, -1.0, -1.0), corner(-1.0, -1.0, 1.0), corner(-1.0, 1.0, 1.0), corner(-1.0, 1.0, -1.0)]),
        ];

        let mut vertices = Vec::with_capacity(72);
        let mut normals = Vec::with_capacity(72);
        let mut triangle_indices = Vec::with_capacity(36);
        for (face_index, (normal, quad)) in faces.iter().enumerate() {
            for v in quad {
                vertices.extend_from_slice(v);
                normals.extend_from_slice(normal);
            }
            let base = (face_index * 4) as u32;
            triangle_indices.extend_from_slice(&[base, base + 1, base + 2, base + 2, base + 3, base]);
        }

        let mut edge_segments = Vec::with_capacity(72);
        for (a, b) in BOX_EDGES {
            edge_segments.extend_from_slice(&corner(a[0], a[1], a[2]));
            edge_segments.extend_from_slice(&corner(b[0], b[1], b[2]));
        }

        Self::new(vertices, normals, triangle_indices).with_edges(edge_segments)
    }

    /// Whether vertex data is present at all
    pub fn has_vertices(&self) -> bool {
        self.vertices.is_some()
    }

    /// Get the number of vertices
    pub fn vertex_count(&self) -> usize {
        self.vertices.as_ref().map_or(0, |v| v.len() / 3)
    }

    /// Get the number of triangles
    pub fn triangle_count(&self) -> usize {
        self.triangle_indices.len() / 3
    }

    /// Get the number of edge segments
    pub fn edge_segment_count(&self) -> usize {
        self.edge_segments.as_ref().map_or(0, |e| e.len() / 6)
    }

    /// Vertex positions viewed as triples, if the buffer is well formed
    pub fn positions(&self) -> Option<&[[f32; 3]]> {
        self.vertices
            .as_deref()
            .and_then(|v| bytemuck::try_cast_slice(v).ok())
    }

    /// Check the buffers for structural consistency.
    ///
    /// Fails with [`Error::MissingMesh`] when no vertices were supplied and with
    /// [`Error::InvalidData`] when lengths or indices do not line up.
    pub fn validate(&self, id: &str) -> Result<()> {
        let vertices = self
            .vertices
            .as_ref()
            .ok_or_else(|| Error::MissingMesh { id: id.to_string() })?;

        if vertices.len() % 3 != 0 {
            return Err(Error::InvalidData(format!(
                "part '{}': vertex buffer length {} is not a multiple of 3",
                id,
                vertices.len()
            )));
        }
        if !self.normals.is_empty() && self.normals.len() != vertices.len() {
            return Err(Error::InvalidData(format!(
                "part '{}': {} normal components for {} vertex components",
                id,
                self.normals.len(),
                vertices.len()
            )));
        }
        if self.triangle_indices.len() % 3 != 0 {
            return Err(Error::InvalidData(format!(
                "part '{}': index count {} is not a multiple of 3",
                id,
                self.triangle_indices.len()
            )));
        }
        let vertex_count = vertices.len() / 3;
        if let Some(&bad) = self
            .triangle_indices
            .iter()
            .find(|&&i| i as usize >= vertex_count)
        {
            return Err(Error::InvalidData(format!(
                "part '{}': index {} out of range for {} vertices",
                id, bad, vertex_count
            )));
        }
        if let Some(edges) = &self.edge_segments {
            if edges.len() % 6 != 0 {
                return Err(Error::InvalidData(format!(
                    "part '{}': edge buffer length {} is not a multiple of 6",
                    id,
                    edges.len()
                )));
            }
        }
        Ok(())
    }
}

const BOX_EDGES: [([f32; 3], [f32; 3]); 12] = [
    ([-1.0, -1.0, -1.0], [1.0, -1.0, -1.0]),
    ([1.0, -1.0, -1.0], [1.0, 1.0, -1.0]),
    ([1.0, 1.0, -1.0], [-1.0, 1.0, -1.0]),
    ([-1.0, 1.0, -1.0], [-1.0, -1.0, -1.0]),
    ([-1.0, -1.0, 1.0], [1.0, -1.0, 1.0]),
    ([1.0, -1.0, 1.0], [1.0, 1.0, 1.0]),
    ([1.0, 1.0, 1.0], [-1.0, 1.0, 1.0]),
    ([-1.0, 1.0, 1.0], [-1.0, -1.0, 1.0]),
    ([-1.0, -1.0, -1.0], [-1.0, -1.0, 1.0]),
    ([1.0, -1.0, -1.0], [1.0, -1.0, 1.0]),
    ([1.0, 1.0, -1.0], [1.0, 1.0, 1.0]),
    ([-1.0, 1.0, -1.0], [-1.0, 1.0, 1.0]),
];
