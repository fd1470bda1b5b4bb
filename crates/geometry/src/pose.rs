//! Helpers for rigid poses stored as [`Affine3A`].

use glam::{Affine3A, Mat3, Vec3};

/// Convenience accessors for poses (rotation + translation).
pub trait PoseExt {
    /// World-space origin of the pose.
    fn origin(&self) -> Vec3;

    /// Move the pose origin without touching its rotation.
    fn set_origin(&mut self, origin: Vec3);

    /// Local X axis (right).
    fn basis_x(&self) -> Vec3;

    /// Local Y axis (up).
    fn basis_y(&self) -> Vec3;

    /// Local Z axis (back).
    fn basis_z(&self) -> Vec3;

    /// The pose moved by `offset` expressed in its own local frame.
    fn translated_local(&self, offset: Vec3) -> Affine3A;

    /// Express a world-space point in this pose's local frame.
    fn to_local(&self, point: Vec3) -> Vec3;
}

impl PoseExt for Affine3A {
    fn origin(&self) -> Vec3 {
        Vec3::from(self.translation)
    }

    fn set_origin(&mut self, origin: Vec3) {
        self.translation = origin.into();
    }

    fn basis_x(&self) -> Vec3 {
        Vec3::from(self.matrix3.x_axis)
    }

    fn basis_y(&self) -> Vec3 {
        Vec3::from(self.matrix3.y_axis)
    }

    fn basis_z(&self) -> Vec3 {
        Vec3::from(self.matrix3.z_axis)
    }

    fn translated_local(&self, offset: Vec3) -> Affine3A {
        *self * Affine3A::from_translation(offset)
    }

    fn to_local(&self, point: Vec3) -> Vec3 {
        self.inverse().transform_point3(point)
    }
}

/// Build a pose at `origin` whose local +Z axis points along `front`.
///
/// `up` is a hint; when it is (nearly) parallel to `front` the world X axis is used
/// to complete the basis instead.
pub fn facing(origin: Vec3, front: Vec3, up: Vec3) -> Affine3A {
    let z = front.normalize_or_zero();
    if z == Vec3::ZERO {
        return Affine3A::from_translation(origin);
    }

    let mut x = up.cross(z);
    if x.length_squared() < 1e-8 {
        x = Vec3::X;
    }
    let x = x.normalize();
    let y = z.cross(x);

    Affine3A::from_mat3_translation(Mat3::from_cols(x, y, z), origin)
}
