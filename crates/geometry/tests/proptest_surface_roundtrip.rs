//! Property-based tests for panel surface mapping
//!
//! Validates that:
//! - World -> UV is the inverse of UV -> world for flat and curved panels
//! - A ray aimed at a UV from in front of the panel reports that UV back

use glam::{Affine3A, EulerRot, Quat, Vec2, Vec3};
use proptest::prelude::*;
use raydesk_geometry::{ContentRect, PanelSurface, Ray};

fn panel(
    curvature: f32,
    width: f32,
    extent: (u32, u32),
    yaw: f32,
    pitch: f32,
    origin: (f32, f32, f32),
) -> PanelSurface {
    PanelSurface {
        transform: Affine3A::from_rotation_translation(
            Quat::from_euler(EulerRot::YXZ, yaw, pitch, 0.0),
            Vec3::new(origin.0, origin.1, origin.2),
        ),
        width,
        curvature,
        content: ContentRect::from_extent(extent.0, extent.1),
    }
}

proptest! {
    /// Property: mapping a UV into the world and back yields the same UV.
    #[test]
    fn uv_world_roundtrip(
        u in 0.0f32..=1.0,
        v in 0.0f32..=1.0,
        curvature in prop_oneof![Just(0.0f32), -0.4f32..-0.01, 0.01f32..0.4],
        width in 0.3f32..3.0,
        extent in prop_oneof![Just((1920u32, 1080u32)), Just((1080, 1920)), Just((800, 800))],
        yaw in -3.0f32..3.0,
        pitch in -1.0f32..1.0,
        origin in (-5.0f32..5.0, -2.0f32..3.0, -5.0f32..5.0),
    ) {
        let surface = panel(curvature, width, extent, yaw, pitch, origin);
        let uv = Vec2::new(u, v);
        let world = surface.uv_to_world(uv);
        let back = surface.world_to_uv(world);

        // Points on the content border may round to just outside [0, 1].
        if let Some(back) = back {
            prop_assert!((back - uv).length() < 1e-3, "uv {:?} came back as {:?}", uv, back);
        } else {
            prop_assert!(u < 1e-3 || u > 1.0 - 1e-3 || v < 1e-3 || v > 1.0 - 1e-3);
        }
    }

    /// Property: a ray from just in front of the panel centre towards a UV hits that UV.
    #[test]
    fn aimed_ray_reports_uv(
        u in 0.05f32..0.95,
        v in 0.05f32..0.95,
        curvature in prop_oneof![Just(0.0f32), 0.01f32..0.3],
        width in 0.5f32..2.0,
        yaw in -3.0f32..3.0,
    ) {
        let surface = panel(curvature, width, (1920, 1080), yaw, 0.0, (0.0, 1.5, -1.0));
        let uv = Vec2::new(u, v);
        let target = surface.uv_to_world(uv);
        let eye = surface.transform.transform_point3(Vec3::new(0.0, 0.0, 0.05));

        let hit = surface.intersect(&Ray::new(eye, target - eye));
        prop_assert!(hit.is_some());
        let hit = hit.unwrap();
        prop_assert!((hit.uv - uv).length() < 1e-3);
        prop_assert!((hit.distance - (target - eye).length()).abs() < 1e-3);
    }
}
