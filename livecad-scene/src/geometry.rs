//! Mesh and edge-overlay geometry held by scene nodes

use crate::buffer::{AllocationId, AttributeBuffer};
use livecad_core::{BoundingBox, BoundingSphere};

/// Solid mesh buffers plus derived bounding volumes
#[derive(Debug, Clone)]
pub struct MeshGeometry {
    pub(crate) positions: AttributeBuffer<f32>,
    pub(crate) normals: AttributeBuffer<f32>,
    pub(crate) indices: AttributeBuffer<u32>,
    pub(crate) bounding_box: Option<BoundingBox>,
    pub(crate) bounding_sphere: Option<BoundingSphere>,
}

impl MeshGeometry {
    /// Create geometry from packed positions, normals and triangle indices
    pub fn new(positions: &[f32], normals: &[f32], indices: &[u32]) -> Self {
        let mut geometry = Self {
            positions: AttributeBuffer::new(positions, 3),
            normals: AttributeBuffer::new(normals, 3),
            indices: AttributeBuffer::new(indices, 1),
            bounding_box: None,
            bounding_sphere: None,
        };
        geometry.compute_bounds();
        geometry
    }

    /// Recompute bounding box and bounding sphere from the position buffer
    pub fn compute_bounds(&mut self) {
        let positions = self.positions.as_slice();
        self.bounding_box = BoundingBox::from_positions(positions);
        self.bounding_sphere = self
            .bounding_box
            .as_ref()
            .map(|bbox| BoundingSphere::from_positions(positions, bbox));
    }

    pub fn positions(&self) -> &AttributeBuffer<f32> {
        &self.positions
    }

    pub fn normals(&self) -> &AttributeBuffer<f32> {
        &self.normals
    }

    pub fn indices(&self) -> &AttributeBuffer<u32> {
        &self.indices
    }

    pub fn bounding_box(&self) -> Option<&BoundingBox> {
        self.bounding_box.as_ref()
    }

    pub fn bounding_sphere(&self) -> Option<&BoundingSphere> {
        self.bounding_sphere.as_ref()
    }

    /// Number of vertices
    pub fn vertex_count(&self) -> usize {
        self.positions.count()
    }

    /// Number of triangles
    pub fn triangle_count(&self) -> usize {
        self.indices.count() / 3
    }

    /// Free all buffers, returning the allocations that were released
    pub fn release(&mut self) -> Vec<AllocationId> {
        self.positions.release();
        self.normals.release();
        self.indices.release();
        self.bounding_box = None;
        self.bounding_sphere = None;
        vec![
            self.positions.allocation(),
            self.normals.allocation(),
            self.indices.allocation(),
        ]
    }

    /// Whether the buffers have been released
    pub fn is_released(&self) -> bool {
        self.positions.is_released()
    }
}

/// Line-segment overlay drawn on top of a part's faces
#[derive(Debug, Clone)]
pub struct EdgeGeometry {
    pub(crate) segments: AttributeBuffer<f32>,
    pub(crate) bounding_box: Option<BoundingBox>,
    pub(crate) bounding_sphere: Option<BoundingSphere>,
}

impl EdgeGeometry {
    /// Create an overlay from packed segment endpoints
    pub fn new(segments: &[f32]) -> Self {
        let mut edges = Self {
            segments: AttributeBuffer::new(segments, 3),
            bounding_box: None,
            bounding_sphere: None,
        };
        edges.compute_bounds();
        edges
    }

    /// Recompute bounding volumes from the segment endpoints
    pub fn compute_bounds(&mut self) {
        let points = self.segments.as_slice();
        self.bounding_box = BoundingBox::from_positions(points);
        self.bounding_sphere = self
            .bounding_box
            .as_ref()
            .map(|bbox| BoundingSphere::from_positions(points, bbox));
    }

    pub fn segments(&self) -> &AttributeBuffer<f32> {
        &self.segments
    }

    pub fn bounding_box(&self) -> Option<&BoundingBox> {
        self.bounding_box.as_ref()
    }

    pub fn bounding_sphere(&self) -> Option<&BoundingSphere> {
        self.bounding_sphere.as_ref()
    }

    /// Number of line segments
    pub fn segment_count(&self) -> usize {
        self.segments.count() / 2
    }

    /// Free the segment buffer
    pub fn release(&mut self) -> AllocationId {
        self.segments.release();
        self.bounding_box = None;
        self.bounding_sphere = None;
        self.segments.allocation()
    }
}
