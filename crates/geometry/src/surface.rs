//! Flat and cylindrical panel surfaces.
//!
//! Content UV `(0,0)..(1,1)` spans the rendered rectangle. Panels are hit-tested
//! through a square interaction quad that the content rectangle is centred in, so
//! the clickable region always matches the rendered one regardless of aspect ratio.

use crate::ray::Ray;
use glam::{Affine2, Affine3A, Vec2, Vec3};
use std::f32::consts::PI;

/// Rays closer than this to parallel with the panel are treated as misses.
const PARALLEL_EPSILON: f32 = 1e-6;

/// Placement of the content rectangle inside the square interaction quad.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContentRect {
    to_quad: Affine2,
    to_content: Affine2,
    side_scale: f32,
}

impl Default for ContentRect {
    fn default() -> Self {
        Self::SQUARE
    }
}

impl ContentRect {
    /// Square content filling the whole quad.
    pub const SQUARE: Self = Self {
        to_quad: Affine2::IDENTITY,
        to_content: Affine2::IDENTITY,
        side_scale: 1.0,
    };

    /// Build the placement for content of `width x height` pixels.
    ///
    /// Wide content keeps the quad at the panel width and occupies a centred
    /// horizontal band. Tall content grows the quad to `width * height / width` so the
    /// content still renders at the panel width.
    pub fn from_extent(width: u32, height: u32) -> Self {
        if width == 0 || height == 0 || width == height {
            return Self::SQUARE;
        }

        let w = width as f32;
        let h = height as f32;
        let (scale, translation, side_scale) = if w > h {
            (
                Vec2::new(1.0, h / w),
                Vec2::new(0.0, (w - h) * 0.5 / w),
                1.0,
            )
        } else {
            (
                Vec2::new(w / h, 1.0),
                Vec2::new((h - w) * 0.5 / h, 0.0),
                h / w,
            )
        };

        let to_quad = Affine2::from_scale_angle_translation(scale, 0.0, translation);
        Self {
            to_quad,
            to_content: to_quad.inverse(),
            side_scale,
        }
    }

    /// Map content UV to quad UV.
    pub fn content_to_quad(&self, uv: Vec2) -> Vec2 {
        self.to_quad.transform_point2(uv)
    }

    /// Map quad UV back to content UV, or `None` if it falls outside the content.
    pub fn quad_to_content(&self, quad_uv: Vec2) -> Option<Vec2> {
        let uv = self.to_content.transform_point2(quad_uv);
        in_unit_square(uv).then_some(uv)
    }

    /// Side length of the interaction quad for a panel of the given width.
    pub fn quad_side(&self, panel_width: f32) -> f32 {
        panel_width * self.side_scale
    }
}

/// Result of intersecting a ray with a panel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceHit {
    /// Distance from the ray origin along the ray.
    pub distance: f32,
    /// Content UV of the hit.
    pub uv: Vec2,
    /// World-space hit point.
    pub point: Vec3,
    /// World-space surface normal, facing the viewer side of the panel.
    pub normal: Vec3,
}

/// An overlay panel placed in the world.
///
/// The panel faces its local +Z axis. With `curvature == 0` it is a flat quad;
/// otherwise it is a section of a vertical cylinder bending towards (+K) or away
/// from (-K) the viewer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PanelSurface {
    /// Pose of the panel centre.
    pub transform: Affine3A,
    /// Rendered width of the content in metres.
    pub width: f32,
    /// Curvature factor `K`; the arc spans `4πK` radians. Keep `|K| < 0.5`, beyond
    /// that the arc closes into a full circle.
    pub curvature: f32,
    /// Content rectangle placement.
    pub content: ContentRect,
}

impl PanelSurface {
    /// Whether the panel is a cylinder section rather than a flat quad.
    pub fn is_curved(&self) -> bool {
        self.curvature.abs() >= f32::EPSILON
    }

    fn side(&self) -> f32 {
        self.content.quad_side(self.width)
    }

    /// Arc angle and signed radius of the cylinder section.
    fn arc(&self) -> (f32, f32) {
        let theta = PI * 4.0 * self.curvature;
        (theta, self.side() / theta)
    }

    /// Panel-local position of a quad UV.
    pub fn quad_to_local(&self, quad_uv: Vec2) -> Vec3 {
        let centred = quad_uv - Vec2::splat(0.5);
        let side = self.side();

        if !self.is_curved() {
            return Vec3::new(side * centred.x, side * centred.y, 0.0);
        }

        // u in [-1, 1] sweeps the full arc; the pivot sits `r` behind the panel centre.
        let (theta, r) = self.arc();
        let u = centred.x * 2.0;
        let angle = u * theta * 0.5;
        Vec3::new(r * angle.sin(), side * centred.y, r - r * angle.cos())
    }

    /// Quad UV of a panel-local position. Exact inverse of [`Self::quad_to_local`].
    pub fn local_to_quad(&self, local: Vec3) -> Vec2 {
        let side = self.side();
        let v = local.y / side + 0.5;

        if !self.is_curved() {
            return Vec2::new(local.x / side + 0.5, v);
        }

        let (theta, r) = self.arc();
        let angle = (local.x / r).atan2((r - local.z) / r);
        let u = angle * 2.0 / theta;
        Vec2::new(u * 0.5 + 0.5, v)
    }

    /// World position of a content UV.
    pub fn uv_to_world(&self, uv: Vec2) -> Vec3 {
        let quad_uv = self.content.content_to_quad(uv);
        self.transform
            .transform_point3(self.quad_to_local(quad_uv))
    }

    /// Content UV of a world position on the panel, or `None` outside the content.
    pub fn world_to_uv(&self, point: Vec3) -> Option<Vec2> {
        let local = self.transform.inverse().transform_point3(point);
        self.content.quad_to_content(self.local_to_quad(local))
    }

    /// Intersect a ray with the panel.
    pub fn intersect(&self, ray: &Ray) -> Option<SurfaceHit> {
        let inverse = self.transform.inverse();
        let origin = inverse.transform_point3(ray.origin);
        let direction = inverse.transform_vector3(ray.direction);

        // Affine maps preserve the ray parameter, so `t` is the world distance.
        let (t, local_point, local_normal) = if self.is_curved() {
            self.intersect_cylinder(origin, direction)?
        } else {
            self.intersect_plane(origin, direction)?
        };

        let uv = self
            .content
            .quad_to_content(self.local_to_quad(local_point))?;

        Some(SurfaceHit {
            distance: t,
            uv,
            point: self.transform.transform_point3(local_point),
            normal: self
                .transform
                .transform_vector3(local_normal)
                .normalize_or_zero(),
        })
    }

    fn intersect_plane(&self, origin: Vec3, direction: Vec3) -> Option<(f32, Vec3, Vec3)> {
        if direction.z.abs() < PARALLEL_EPSILON {
            return None;
        }

        let t = -origin.z / direction.z;
        if t < 0.0 {
            return None;
        }

        let point = origin + direction * t;
        in_unit_square(self.local_to_quad(point)).then_some((t, point, Vec3::Z))
    }

    fn intersect_cylinder(&self, origin: Vec3, direction: Vec3) -> Option<(f32, Vec3, Vec3)> {
        let (_, r) = self.arc();

        // Cylinder axis is parallel to local Y through (0, _, r).
        let oz = origin.z - r;
        let a = direction.x * direction.x + direction.z * direction.z;
        if a < PARALLEL_EPSILON {
            return None;
        }
        let b = 2.0 * (origin.x * direction.x + oz * direction.z);
        let c = origin.x * origin.x + oz * oz - r * r;

        let discriminant = b * b - 4.0 * a * c;
        if discriminant < 0.0 {
            return None;
        }
        let root = discriminant.sqrt();

        for t in [(-b - root) / (2.0 * a), (-b + root) / (2.0 * a)] {
            if t < 0.0 {
                continue;
            }

            // The quad range check also rejects the rest of the cylinder behind the arc.
            let point = origin + direction * t;
            if !in_unit_square(self.local_to_quad(point)) {
                continue;
            }

            let normal = (Vec3::new(0.0, point.y, r) - point) / r;
            return Some((t, point, normal));
        }

        None
    }
}

fn in_unit_square(uv: Vec2) -> bool {
    (0.0..=1.0).contains(&uv.x) && (0.0..=1.0).contains(&uv.y)
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Quat;

    fn panel(curvature: f32, content: ContentRect) -> PanelSurface {
        PanelSurface {
            transform: Affine3A::from_translation(Vec3::new(0.0, 0.0, -2.0)),
            width: 1.0,
            curvature,
            content,
        }
    }

    #[test]
    fn flat_center_hit() {
        let hit = panel(0.0, ContentRect::SQUARE)
            .intersect(&Ray::new(Vec3::ZERO, Vec3::NEG_Z))
            .expect("ray through centre hits");
        assert!((hit.distance - 2.0).abs() < 1e-5);
        assert!((hit.uv - Vec2::splat(0.5)).length() < 1e-5);
        assert!((hit.point - Vec3::new(0.0, 0.0, -2.0)).length() < 1e-5);
        assert!((hit.normal - Vec3::Z).length() < 1e-5);
    }

    #[test]
    fn flat_miss_outside_and_behind() {
        let p = panel(0.0, ContentRect::SQUARE);
        assert!(p
            .intersect(&Ray::new(Vec3::new(0.6, 0.0, 0.0), Vec3::NEG_Z))
            .is_none());
        assert!(p.intersect(&Ray::new(Vec3::ZERO, Vec3::Z)).is_none());
        assert!(p.intersect(&Ray::new(Vec3::ZERO, Vec3::X)).is_none());
    }

    #[test]
    fn wide_content_band_outside_rect_is_a_miss() {
        let p = panel(0.0, ContentRect::from_extent(1920, 1080));
        // Inside the square quad but above the 16:9 content band.
        assert!(p
            .intersect(&Ray::new(Vec3::new(0.0, 0.4, 0.0), Vec3::NEG_Z))
            .is_none());
        let hit = p
            .intersect(&Ray::new(Vec3::new(0.25, 0.2, 0.0), Vec3::NEG_Z))
            .expect("inside content band");
        assert!((hit.uv.x - 0.75).abs() < 1e-4);
        assert!((hit.uv.y - (0.7 - 0.21875) / 0.5625).abs() < 1e-4);
    }

    #[test]
    fn tall_content_grows_interaction_quad() {
        let content = ContentRect::from_extent(1080, 1920);
        let p = panel(0.0, content);
        assert!((content.quad_side(1.0) - 1920.0 / 1080.0).abs() < 1e-5);

        // Content is still 1m wide and 16:9 tall.
        let top = p
            .intersect(&Ray::new(Vec3::new(0.0, 0.85, 0.0), Vec3::NEG_Z))
            .expect("tall content extends above the square");
        assert!(top.uv.y > 0.9);
        assert!(p
            .intersect(&Ray::new(Vec3::new(0.55, 0.0, 0.0), Vec3::NEG_Z))
            .is_none());
    }

    #[test]
    fn curved_center_hit_skips_far_side() {
        let p = panel(0.1, ContentRect::SQUARE);
        let hit = p
            .intersect(&Ray::new(Vec3::ZERO, Vec3::NEG_Z))
            .expect("ray through centre hits");
        assert!((hit.distance - 2.0).abs() < 1e-4);
        assert!((hit.uv - Vec2::splat(0.5)).length() < 1e-4);
        assert!((hit.normal - Vec3::Z).length() < 1e-4);
    }

    #[test]
    fn curved_edges_bend_towards_viewer() {
        let p = panel(0.1, ContentRect::SQUARE);
        let edge = p.uv_to_world(Vec2::new(1.0, 0.5));
        let centre = p.uv_to_world(Vec2::new(0.5, 0.5));
        assert!(edge.z > centre.z);
        // Arc length of the half panel equals half the width.
        let (theta, r) = p.arc();
        assert!((r * theta * 0.5 - 0.5).abs() < 1e-5);
    }

    #[test]
    fn tiny_curvature_matches_flat_mapping() {
        let flat = panel(0.0, ContentRect::SQUARE);
        let curved = panel(1e-4, ContentRect::SQUARE);
        for uv in [Vec2::new(0.0, 0.0), Vec2::new(0.3, 0.9), Vec2::new(1.0, 0.5)] {
            assert!((flat.uv_to_world(uv) - curved.uv_to_world(uv)).length() < 1e-3);
        }
    }

    #[test]
    fn rotated_curved_panel_hit_matches_uv_to_world() {
        let p = PanelSurface {
            transform: Affine3A::from_rotation_translation(
                Quat::from_rotation_y(0.4),
                Vec3::new(0.5, 1.2, -1.5),
            ),
            width: 1.2,
            curvature: 0.15,
            content: ContentRect::from_extent(1600, 900),
        };
        let uv = Vec2::new(0.8, 0.3);
        let target = p.uv_to_world(uv);
        let eye = p.transform.transform_point3(Vec3::new(0.0, 0.0, 0.4));
        let hit = p
            .intersect(&Ray::new(eye, target - eye))
            .expect("aimed ray hits");
        assert!((hit.uv - uv).length() < 1e-3);
        assert!((hit.point - target).length() < 1e-3);
        assert!((hit.distance - (target - eye).length()).abs() < 1e-3);
    }
}
