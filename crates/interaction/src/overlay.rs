//! World-space panels the pointers can interact with.

use crate::hit::PointerHit;
use bitflags::bitflags;
use glam::{Affine3A, Vec3};
use parking_lot::Mutex;
use raydesk_geometry::{facing, ContentRect, PanelSurface, PoseExt};
use raydesk_input::Hand;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// Saved spawn offsets further than this from the headset are discarded on show.
pub const FAR_RESET_DISTANCE: f32 = 20.0;
/// Saved spawn offsets closer than this to the headset are discarded on show.
pub const NEAR_RESET_DISTANCE: f32 = 0.2;

/// Headset roll (|right . world up|) above which panels align with the headset's up axis.
const ROLLED_HEAD_THRESHOLD: f32 = 0.2;

bitflags! {
    /// Interaction kinds an overlay opts into.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Capabilities: u8 {
        /// Receives hover, click and scroll events.
        const HOVER = 1 << 0;
        /// Can be picked up and carried by a pointer.
        const GRAB = 1 << 1;
    }
}

/// Stable identifier assigned by the registrar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct OverlayId(pub(crate) u64);

impl OverlayId {
    /// Raw numeric value.
    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for OverlayId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Application hooks invoked by the engine.
///
/// Every method has an empty default so behaviors only implement what they use.
/// Hover callbacks fire only for [`Capabilities::HOVER`] overlays, grab callbacks
/// only for [`Capabilities::GRAB`] ones.
pub trait OverlayBehavior: Send {
    /// A pointer rests on the overlay this frame.
    fn on_pointer_hover(&mut self, _hit: &PointerHit) {}
    /// The pointer of `hand` moved off the overlay.
    fn on_pointer_left(&mut self, _hand: Hand) {}
    /// Click pressed while hovering.
    fn on_pointer_down(&mut self, _hit: &PointerHit) {}
    /// Click released while hovering.
    fn on_pointer_up(&mut self, _hit: &PointerHit) {}
    /// Scroll axis deflected while hovering.
    fn on_scroll(&mut self, _hit: &PointerHit, _value: f32) {}
    /// A pointer picked the overlay up.
    fn on_grabbed(&mut self, _hit: &PointerHit) {}
    /// The carrying pointer let go.
    fn on_dropped(&mut self) {}
    /// Click pressed while carried.
    fn on_click_while_held(&mut self) {}
    /// Alt-click pressed while carried.
    fn on_alt_click_while_held(&mut self) {}
    /// Overlay became visible.
    fn on_show(&mut self) {}
    /// Overlay was hidden.
    fn on_hide(&mut self) {}
}

/// Behavior that ignores every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoBehavior;

impl OverlayBehavior for NoBehavior {}

/// Overlay shared between the application, the registrar and the engine.
pub type SharedOverlay = Arc<Mutex<Overlay>>;

/// A panel placed in world space.
pub struct Overlay {
    name: String,
    capabilities: Capabilities,
    behavior: Box<dyn OverlayBehavior>,
    visible: bool,
    saved_spawn_position: Vec3,
    /// Width in meters before `local_scale`.
    pub width: f32,
    /// Cylinder curvature; 0 for flat panels.
    pub curvature: f32,
    /// Uniform scale applied by resize gestures.
    pub local_scale: f32,
    /// World pose; local -Z faces away from the viewer.
    pub transform: Affine3A,
    /// Content aspect; `None` until content is available, which disables hit testing.
    pub content: Option<ContentRect>,
    /// Whether the user wants the overlay shown when overlays are toggled on.
    pub want_visible: bool,
    /// Follows the global show/hide toggle.
    pub show_hide_binding: bool,
    /// Turn to face the headset after moves.
    pub face_viewer: bool,
    /// Keep the panel's up axis vertical when facing the headset.
    pub snap_upright: bool,
    /// Default position relative to the headset.
    pub spawn_position: Vec3,
}

impl Overlay {
    /// Create a visible, flat, square overlay `width` meters wide with no capabilities.
    pub fn new(name: impl Into<String>, width: f32) -> Self {
        let spawn_position = Vec3::new(0.0, 0.0, -1.0);
        Self {
            name: name.into(),
            capabilities: Capabilities::empty(),
            behavior: Box::new(NoBehavior),
            visible: true,
            saved_spawn_position: spawn_position,
            width,
            curvature: 0.0,
            local_scale: 1.0,
            transform: Affine3A::IDENTITY,
            content: Some(ContentRect::SQUARE),
            want_visible: true,
            show_hide_binding: true,
            face_viewer: true,
            snap_upright: false,
            spawn_position,
        }
    }

    /// Builder: set the interaction capabilities.
    pub fn with_capabilities(mut self, capabilities: Capabilities) -> Self {
        self.capabilities = capabilities;
        self
    }

    /// Builder: attach application callbacks.
    pub fn with_behavior(mut self, behavior: impl OverlayBehavior + 'static) -> Self {
        self.behavior = Box::new(behavior);
        self
    }

    /// Builder: set the content size in pixels.
    pub fn with_content(mut self, width: u32, height: u32) -> Self {
        self.content = Some(ContentRect::from_extent(width, height));
        self
    }

    /// Builder: set the curvature.
    pub fn with_curvature(mut self, curvature: f32) -> Self {
        self.curvature = curvature;
        self
    }

    /// Builder: set the world pose.
    pub fn with_transform(mut self, transform: Affine3A) -> Self {
        self.transform = transform;
        self
    }

    /// Builder: set the headset-relative spawn position.
    pub fn with_spawn_position(mut self, spawn_position: Vec3) -> Self {
        self.spawn_position = spawn_position;
        self.saved_spawn_position = spawn_position;
        self
    }

    /// Wrap for sharing with the registrar.
    pub fn shared(self) -> SharedOverlay {
        Arc::new(Mutex::new(self))
    }

    /// Display name used in logs.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Interaction capabilities.
    pub fn capabilities(&self) -> Capabilities {
        self.capabilities
    }

    /// Whether hover events are delivered.
    pub fn supports_hover(&self) -> bool {
        self.capabilities.contains(Capabilities::HOVER)
    }

    /// Whether the overlay can be carried.
    pub fn supports_grab(&self) -> bool {
        self.capabilities.contains(Capabilities::GRAB)
    }

    /// Whether the overlay is currently shown.
    pub fn visible(&self) -> bool {
        self.visible
    }

    /// World-space origin.
    pub fn origin(&self) -> Vec3 {
        self.transform.origin()
    }

    /// Move the overlay without rotating it.
    pub fn set_origin(&mut self, origin: Vec3) {
        self.transform.set_origin(origin);
    }

    /// Width in meters including `local_scale`.
    pub fn effective_width(&self) -> f32 {
        self.width * self.local_scale
    }

    /// Headset-relative position the overlay reappears at.
    pub fn saved_spawn_position(&self) -> Vec3 {
        self.saved_spawn_position
    }

    /// Hit-testable surface, or `None` while hidden or without content.
    pub fn surface(&self) -> Option<PanelSurface> {
        if !self.visible {
            return None;
        }
        Some(PanelSurface {
            transform: self.transform,
            width: self.effective_width(),
            curvature: self.curvature,
            content: self.content?,
        })
    }

    /// Show the overlay. Grabbable overlays respawn relative to the headset.
    pub fn show(&mut self, hmd: &Affine3A) {
        if self.supports_grab() {
            let distance = self.saved_spawn_position.length();
            if !(NEAR_RESET_DISTANCE..=FAR_RESET_DISTANCE).contains(&distance) {
                debug!(overlay = %self.name, distance, "Saved spawn out of range; resetting");
                self.saved_spawn_position = self.spawn_position;
            }
            self.set_origin(hmd.transform_point3(self.saved_spawn_position));
            self.on_orientation_changed(hmd);
        }
        self.visible = true;
        self.behavior.on_show();
    }

    /// Hide the overlay.
    pub fn hide(&mut self) {
        self.visible = false;
        self.behavior.on_hide();
    }

    /// Remember the current position, relative to the headset, for the next show.
    pub fn save_spawn_position(&mut self, hmd: &Affine3A) {
        self.saved_spawn_position = hmd.to_local(self.origin());
    }

    /// Turn to face the headset if `face_viewer` is set.
    pub fn on_orientation_changed(&mut self, hmd: &Affine3A) {
        if !self.face_viewer {
            return;
        }

        let mut front = hmd.origin() - self.origin();
        if self.snap_upright {
            front.y = 0.0;
        }

        let up = if hmd.basis_x().dot(Vec3::Y).abs() > ROLLED_HEAD_THRESHOLD && !self.snap_upright
        {
            hmd.basis_y()
        } else {
            Vec3::Y
        };

        self.transform = facing(self.origin(), front, up);
    }

    pub(crate) fn behavior_mut(&mut self) -> &mut dyn OverlayBehavior {
        self.behavior.as_mut()
    }
}

impl fmt::Debug for Overlay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Overlay")
            .field("name", &self.name)
            .field("capabilities", &self.capabilities)
            .field("visible", &self.visible)
            .field("width", &self.width)
            .field("curvature", &self.curvature)
            .field("local_scale", &self.local_scale)
            .field("origin", &self.origin())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Clone, Default)]
    struct ShowCounter(Arc<AtomicUsize>);

    impl OverlayBehavior for ShowCounter {
        fn on_show(&mut self) {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
        fn on_hide(&mut self) {
            self.0.fetch_add(100, Ordering::SeqCst);
        }
    }

    #[test]
    fn hidden_overlay_has_no_surface() {
        let mut overlay = Overlay::new("panel", 1.0).with_content(1920, 1080);
        assert!(overlay.surface().is_some());
        overlay.hide();
        assert!(overlay.surface().is_none());

        overlay.content = None;
        overlay.show(&Affine3A::IDENTITY);
        assert!(overlay.surface().is_none());
    }

    #[test]
    fn surface_uses_scaled_width() {
        let mut overlay = Overlay::new("panel", 1.0);
        overlay.local_scale = 2.0;
        assert_eq!(overlay.surface().unwrap().width, 2.0);
    }

    #[test]
    fn grabbable_show_respawns_in_front_of_headset() {
        let counter = ShowCounter::default();
        let mut overlay = Overlay::new("panel", 1.0)
            .with_capabilities(Capabilities::GRAB)
            .with_behavior(counter.clone())
            .with_spawn_position(Vec3::new(0.0, 0.0, -2.0));

        let hmd = Affine3A::from_translation(Vec3::new(1.0, 1.6, 0.0));
        overlay.hide();
        overlay.show(&hmd);

        assert!((overlay.origin() - Vec3::new(1.0, 1.6, -2.0)).length() < 1e-5);
        // Front faces back towards the headset.
        assert!((overlay.transform.basis_z() - Vec3::Z).length() < 1e-5);
        assert_eq!(counter.0.load(Ordering::SeqCst), 101);
    }

    #[test]
    fn out_of_range_spawn_is_reset() {
        let mut overlay = Overlay::new("panel", 1.0)
            .with_capabilities(Capabilities::GRAB)
            .with_spawn_position(Vec3::new(0.0, 0.0, -1.0));

        overlay.set_origin(Vec3::new(0.0, 0.0, -50.0));
        overlay.save_spawn_position(&Affine3A::IDENTITY);
        assert!(overlay.saved_spawn_position().length() > FAR_RESET_DISTANCE);

        overlay.show(&Affine3A::IDENTITY);
        assert_eq!(overlay.saved_spawn_position(), overlay.spawn_position);
        assert!((overlay.origin() - Vec3::new(0.0, 0.0, -1.0)).length() < 1e-5);
    }

    #[test]
    fn snap_upright_keeps_panel_vertical() {
        let mut overlay = Overlay::new("panel", 1.0);
        overlay.snap_upright = true;
        overlay.set_origin(Vec3::new(0.0, 0.0, -1.0));

        // Headset above the panel, looking down at it.
        overlay.on_orientation_changed(&Affine3A::from_translation(Vec3::new(0.0, 2.0, 0.0)));
        assert!((overlay.transform.basis_y() - Vec3::Y).length() < 1e-5);
        assert!((overlay.transform.basis_z() - Vec3::Z).length() < 1e-5);
    }
}
