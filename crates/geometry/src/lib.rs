#![warn(missing_docs)]
//! Ray/surface geometry for overlay panels.
//!
//! Overlays are flat quads or sections of a vertical cylinder placed in world
//! space. This crate maps between content UV coordinates and world positions on
//! such a panel, and intersects pointer rays with it.
//!
//! ```rust
//! use glam::{Affine3A, Vec2, Vec3};
//! use raydesk_geometry::{ContentRect, PanelSurface, Ray};
//!
//! let panel = PanelSurface {
//!     transform: Affine3A::from_translation(Vec3::new(0.0, 0.0, -2.0)),
//!     width: 1.0,
//!     curvature: 0.0,
//!     content: ContentRect::from_extent(1920, 1080),
//! };
//!
//! let hit = panel.intersect(&Ray::new(Vec3::ZERO, Vec3::NEG_Z)).unwrap();
//! assert!((hit.distance - 2.0).abs() < 1e-4);
//! assert!((hit.uv - Vec2::splat(0.5)).length() < 1e-4);
//! ```

mod pose;
mod ray;
mod surface;

pub use pose::{facing, PoseExt};
pub use ray::Ray;
pub use surface::{ContentRect, PanelSurface, SurfaceHit};
