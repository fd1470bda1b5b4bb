//! Pointer rays.

use glam::{Affine3A, Vec3};

/// A half-line starting at `origin` and extending along `direction`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    /// Start of the ray in world space.
    pub origin: Vec3,
    /// Unit direction of the ray.
    pub direction: Vec3,
}

impl Ray {
    /// Create a ray, normalizing `direction`.
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self {
            origin,
            direction: direction.normalize_or_zero(),
        }
    }

    /// Ray cast by a tracked pose: starts at the pose origin and points along its local -Z.
    pub fn from_pose(pose: &Affine3A) -> Self {
        Self::new(
            Vec3::from(pose.translation),
            -Vec3::from(pose.matrix3.z_axis),
        )
    }

    /// Point at parameter `t` along the ray.
    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }
}
