//! Part placement: optional position and orientation

use nalgebra::{Isometry3, Matrix4, Quaternion, Translation3, UnitQuaternion, Vector3};
use serde::{Deserialize, Serialize};

/// Placement of a part relative to the assembly root.
///
/// Both components are optional. A missing component means "leave whatever
/// the node currently has", never "reset to identity".
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PartTransform {
    #[serde(default)]
    pub position: Option<[f32; 3]>,
    /// Quaternion as `[x, y, z, w]`
    #[serde(default)]
    pub orientation: Option<[f32; 4]>,
}

impl PartTransform {
    /// Create a transform with only a position
    pub fn at(position: [f32; 3]) -> Self {
        Self {
            position: Some(position),
            orientation: None,
        }
    }

    /// Create a transform from both components
    pub fn new(position: [f32; 3], orientation: [f32; 4]) -> Self {
        Self {
            position: Some(position),
            orientation: Some(orientation),
        }
    }

    /// Position as a vector
    pub fn translation(&self) -> Option<Vector3<f32>> {
        self.position.map(Vector3::from)
    }

    /// Orientation as a unit quaternion.
    ///
    /// The input is renormalized; a zero-length quaternion yields `None`.
    pub fn rotation(&self) -> Option<UnitQuaternion<f32>> {
        self.orientation.and_then(|[x, y, z, w]| {
            let q = Quaternion::new(w, x, y, z);
            if q.norm() <= f32::EPSILON {
                None
            } else {
                Some(UnitQuaternion::from_quaternion(q))
            }
        })
    }

    /// Whether neither component is set
    pub fn is_empty(&self) -> bool {
        self.position.is_none() && self.orientation.is_none()
    }
}

/// A resolved node pose: translation plus rotation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pose {
    pub translation: Vector3<f32>,
    pub rotation: UnitQuaternion<f32>,
}

impl Pose {
    /// Identity pose
    pub fn identity() -> Self {
        Self {
            translation: Vector3::zeros(),
            rotation: UnitQuaternion::identity(),
        }
    }

    /// Overwrite only the components present in `transform`
    pub fn apply(&mut self, transform: &PartTransform) {
        if let Some(translation) = transform.translation() {
            self.translation = translation;
        }
        if let Some(rotation) = transform.rotation() {
            self.rotation = rotation;
        }
    }

    /// As an isometry
    pub fn isometry(&self) -> Isometry3<f32> {
        Isometry3::from_parts(Translation3::from(self.translation), self.rotation)
    }

    /// As a homogeneous matrix
    pub fn to_homogeneous(&self) -> Matrix4<f32> {
        self.isometry().to_homogeneous()
    }
}

impl Default for Pose {
    fn default() -> Self {
        Self::identity()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_partial_apply_keeps_orientation() {
        let mut pose = Pose::identity();
        pose.apply(&PartTransform::new([1.0, 0.0, 0.0], [0.0, 0.0, 0.7071068, 0.7071068]));
        let rotation = pose.rotation;

        pose.apply(&PartTransform::at([5.0, 6.0, 7.0]));
        assert_eq!(pose.translation, Vector3::new(5.0, 6.0, 7.0));
        assert_eq!(pose.rotation, rotation);
    }

    #[test]
    fn test_orientation_only_keeps_position() {
        let mut pose = Pose::identity();
        pose.apply(&PartTransform::at([1.0, 2.0, 3.0]));
        pose.apply(&PartTransform {
            position: None,
            orientation: Some([0.0, 0.0, 1.0, 0.0]),
        });
        assert_eq!(pose.translation, Vector3::new(1.0, 2.0, 3.0));
        assert_relative_eq!(pose.rotation.angle(), std::f32::consts::PI, epsilon = 1e-5);
    }

    #[test]
    fn test_zero_quaternion_is_ignored() {
        let transform = PartTransform {
            position: None,
            orientation: Some([0.0, 0.0, 0.0, 0.0]),
        };
        assert!(transform.rotation().is_none());
        let mut pose = Pose::identity();
        pose.apply(&transform);
        assert_eq!(pose, Pose::identity());
    }

    #[test]
    fn test_homogeneous_translation() {
        let mut pose = Pose::identity();
        pose.apply(&PartTransform::at([1.0, 2.0, 3.0]));
        let m = pose.to_homogeneous();
        assert_relative_eq!(m[(0, 3)], 1.0);
        assert_relative_eq!(m[(1, 3)], 2.0);
        assert_relative_eq!(m[(2, 3)], 3.0);
    }
}
