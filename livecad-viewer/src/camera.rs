//! Viewer camera
//!
//! The camera belongs to the viewer for its whole lifetime. Part-list
//! updates never write to it; only the first render frames the assembly.

use livecad_core::BoundingSphere;
use nalgebra::{Matrix4, Perspective3, Point3, Vector3};

/// A perspective camera looking at a target point
#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    pub position: Point3<f32>,
    pub target: Point3<f32>,
    pub up: Vector3<f32>,
    pub fov: f32,
    pub aspect_ratio: f32,
    pub near: f32,
    pub far: f32,
}

impl Camera {
    /// Create a new camera
    pub fn new(
        position: Point3<f32>,
        target: Point3<f32>,
        up: Vector3<f32>,
        fov: f32,
        aspect_ratio: f32,
        near: f32,
        far: f32,
    ) -> Self {
        Self {
            position,
            target,
            up,
            fov,
            aspect_ratio,
            near,
            far,
        }
    }

    /// Get the view matrix
    pub fn view_matrix(&self) -> Matrix4<f32> {
        Matrix4::look_at_rh(&self.position, &self.target, &self.up)
    }

    /// Get the projection matrix
    pub fn projection_matrix(&self) -> Matrix4<f32> {
        let perspective = Perspective3::new(self.aspect_ratio, self.fov, self.near, self.far);
        perspective.into_inner()
    }

    /// Projection times view, mapping world space to clip space
    pub fn view_projection(&self) -> Matrix4<f32> {
        self.projection_matrix() * self.view_matrix()
    }

    /// Update the aspect ratio for a new surface size; zero sizes are ignored
    pub fn set_viewport(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.aspect_ratio = width as f32 / height as f32;
        }
    }

    /// Place the camera so that `sphere` fills the view.
    ///
    /// The viewing direction is kept; a degenerate direction falls back to
    /// an isometric one.
    pub fn fit_sphere(&mut self, sphere: &BoundingSphere) {
        let radius = sphere.radius.max(1e-3);
        let half_fov = (self.fov * 0.5).min(self.fov * 0.5 * self.aspect_ratio);
        let distance = radius / half_fov.sin().max(1e-3) * 1.1;

        let direction = (self.position - self.target)
            .try_normalize(1e-6)
            .unwrap_or_else(|| Vector3::new(1.0, 1.0, 1.0).normalize());

        self.target = sphere.center;
        self.position = sphere.center + direction * distance;
        self.near = (distance - radius * 2.0).max(distance * 0.01);
        self.far = distance + radius * 4.0;
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(
            Point3::new(0.0, 0.0, 5.0),
            Point3::new(0.0, 0.0, 0.0),
            Vector3::new(0.0, 1.0, 0.0),
            std::f32::consts::FRAC_PI_4,
            16.0 / 9.0,
            0.1,
            100.0,
        )
    }
}
