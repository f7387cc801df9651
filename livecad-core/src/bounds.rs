//! Bounding volumes over flat position buffers

use nalgebra::Point3;

/// Axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min: Point3<f32>,
    pub max: Point3<f32>,
}

/// Bounding sphere
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingSphere {
    pub center: Point3<f32>,
    pub radius: f32,
}

impl BoundingBox {
    /// Compute the box of packed `x, y, z` triples.
    ///
    /// Returns `None` for an empty buffer. A trailing partial triple is ignored.
    pub fn from_positions(positions: &[f32]) -> Option<Self> {
        let mut triples = positions.chunks_exact(3);
        let first = triples.next()?;
        let mut min = Point3::new(first[0], first[1], first[2]);
        let mut max = min;

        for p in triples {
            min.x = min.x.min(p[0]);
            min.y = min.y.min(p[1]);
            min.z = min.z.min(p[2]);

            max.x = max.x.max(p[0]);
            max.y = max.y.max(p[1]);
            max.z = max.z.max(p[2]);
        }

        Some(Self { min, max })
    }

    /// Center of the box
    pub fn center(&self) -> Point3<f32> {
        nalgebra::center(&self.min, &self.max)
    }

    /// Length of the box diagonal
    pub fn diagonal(&self) -> f32 {
        (self.max - self.min).norm()
    }

    /// Smallest box containing both
    pub fn union(&self, other: &Self) -> Self {
        Self {
            min: self.min.inf(&other.min),
            max: self.max.sup(&other.max),
        }
    }
}

impl BoundingSphere {
    /// Sphere centred on the box center that encloses every position.
    ///
    /// Matches the usual scene-graph approach: the center comes from the box,
    /// the radius is the largest distance from that center.
    pub fn from_positions(positions: &[f32], bbox: &BoundingBox) -> Self {
        let center = bbox.center();
        let radius_sq = positions
            .chunks_exact(3)
            .map(|p| (Point3::new(p[0], p[1], p[2]) - center).norm_squared())
            .fold(0.0f32, f32::max);

        Self {
            center,
            radius: radius_sq.sqrt(),
        }
    }

    /// Sphere circumscribing a box
    pub fn enclosing(bbox: &BoundingBox) -> Self {
        Self {
            center: bbox.center(),
            radius: bbox.diagonal() / 2.0,
        }
    }
}
