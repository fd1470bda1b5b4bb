//! Per-frame ray hits handed to overlay callbacks.

use glam::{Vec2, Vec3};
use raydesk_geometry::SurfaceHit;
use raydesk_input::{Hand, PointerMode};
use std::fmt;

/// Where one pointer's ray lands on an overlay during a frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerHit {
    /// Hand of the pointer that cast the ray.
    pub hand: Hand,
    /// Pointer mode at the time of the hit.
    pub mode: PointerMode,
    /// Distance from the pointer origin.
    pub distance: f32,
    /// Content coordinates in `[0, 1]^2`.
    pub uv: Vec2,
    /// World-space hit point.
    pub point: Vec3,
    /// World-space surface normal.
    pub normal: Vec3,
    /// Whether `hand` is the overlay's primary pointer.
    pub is_primary: bool,
}

impl PointerHit {
    /// Wrap a geometric hit for `hand`.
    pub fn from_surface(hand: Hand, mode: PointerMode, hit: SurfaceHit) -> Self {
        Self {
            hand,
            mode,
            distance: hit.distance,
            uv: hit.uv,
            point: hit.point,
            normal: hit.normal,
            is_primary: false,
        }
    }
}

impl fmt::Display for PointerHit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} pointer at uv ({:.3}, {:.3}), {:.2}m",
            self.hand, self.uv.x, self.uv.y, self.distance
        )
    }
}
