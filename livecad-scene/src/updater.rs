//! In-place geometry updates for parts whose identity is unchanged

use crate::buffer::BufferWrite;
use crate::geometry::{EdgeGeometry, MeshGeometry};

/// Per-buffer outcome of a mesh update
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MeshUpdate {
    pub positions: BufferWrite,
    pub normals: BufferWrite,
    pub indices: BufferWrite,
}

impl MeshUpdate {
    /// Whether every buffer kept its allocation
    pub fn all_reused(&self) -> bool {
        [self.positions, self.normals, self.indices]
            .iter()
            .all(|w| *w == BufferWrite::Reused)
    }
}

/// Overwrite a mesh's buffers with new contents.
///
/// Each buffer is reused when its length is unchanged and reallocated
/// otherwise. Bounds are recomputed only after all writes have landed.
pub fn update_mesh(
    geometry: &mut MeshGeometry,
    vertices: &[f32],
    normals: &[f32],
    indices: &[u32],
) -> MeshUpdate {
    let update = MeshUpdate {
        positions: geometry.positions.write(vertices),
        normals: geometry.normals.write(normals),
        indices: geometry.indices.write(indices),
    };
    geometry.compute_bounds();
    update
}

/// Overwrite an edge overlay's segment buffer, independently of the solid mesh
pub fn update_edges(edges: &mut EdgeGeometry, segments: &[f32]) -> BufferWrite {
    let write = edges.segments.write(segments);
    edges.compute_bounds();
    write
}
