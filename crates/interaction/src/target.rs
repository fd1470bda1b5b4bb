//! Per-overlay interaction bookkeeping.

use crate::hit::PointerHit;
use crate::overlay::{Capabilities, OverlayId, SharedOverlay};
use glam::{Affine3A, Vec3};
use raydesk_geometry::{PoseExt, Ray};
use raydesk_input::{Hand, PointerMode};
use tracing::trace;

/// Smallest accepted overlay scale after a resize gesture.
pub const MIN_SCALE: f32 = 0.35;
/// Largest accepted overlay scale after a resize gesture.
pub const MAX_SCALE: f32 = 10.0;
/// Closest a carried overlay may be pulled towards the pointer.
pub const MIN_GRAB_DISTANCE: f32 = 0.3;
/// Furthest a carried overlay may be pushed away from the pointer.
pub const MAX_GRAB_DISTANCE: f32 = 10.0;

/// Engine-side state attached to one interactive overlay.
///
/// Tracks the hits recorded this frame, which hand is primary, and the grab
/// offset while the overlay is carried.
#[derive(Debug)]
pub struct InteractionTarget {
    id: OverlayId,
    overlay: SharedOverlay,
    capabilities: Capabilities,
    hits_this_frame: Vec<PointerHit>,
    primary: Option<Hand>,
    grab_offset: Vec3,
}

impl InteractionTarget {
    /// Wrap a registered overlay.
    pub fn new(id: OverlayId, overlay: SharedOverlay, capabilities: Capabilities) -> Self {
        Self {
            id,
            overlay,
            capabilities,
            hits_this_frame: Vec::with_capacity(2),
            primary: None,
            grab_offset: Vec3::ZERO,
        }
    }

    /// Registrar id of the overlay.
    pub fn id(&self) -> OverlayId {
        self.id
    }

    /// The wrapped overlay.
    pub fn overlay(&self) -> &SharedOverlay {
        &self.overlay
    }

    /// Whether the overlay can be carried.
    pub fn supports_grab(&self) -> bool {
        self.capabilities.contains(Capabilities::GRAB)
    }

    /// Hand currently designated primary, if any.
    pub fn primary(&self) -> Option<Hand> {
        self.primary
    }

    /// Hits recorded since the last [`begin`](Self::begin).
    pub fn hits(&self) -> &[PointerHit] {
        &self.hits_this_frame
    }

    /// Pointer-local offset of the overlay origin while carried.
    pub fn grab_offset(&self) -> Vec3 {
        self.grab_offset
    }

    /// Reset per-frame state.
    pub fn begin(&mut self) {
        self.hits_this_frame.clear();
    }

    /// Cast the pointer ray at the overlay. Hidden overlays never hit.
    pub fn test_interaction(
        &self,
        hand: Hand,
        mode: PointerMode,
        pose: &Affine3A,
    ) -> Option<PointerHit> {
        let surface = self.overlay.lock().surface()?;
        let hit = surface.intersect(&Ray::from_pose(pose))?;
        Some(PointerHit::from_surface(hand, mode, hit))
    }

    /// Make `hand` primary. Returns the previously primary hand if it was displaced.
    fn ensure_primary(&mut self, hand: Hand) -> Option<Hand> {
        let displaced = match self.primary {
            Some(current) if current == hand => return None,
            previous => previous,
        };
        self.primary = Some(hand);
        for hit in &mut self.hits_this_frame {
            hit.is_primary = hit.hand == hand;
        }
        displaced
    }

    /// Record a hover hit; the first hand to hover becomes primary.
    pub fn on_pointer_hover(&mut self, hit: &mut PointerHit) {
        let primary = *self.primary.get_or_insert(hit.hand);
        hit.is_primary = primary == hit.hand;
        self.hits_this_frame.push(*hit);

        let mut overlay = self.overlay.lock();
        if overlay.supports_hover() {
            overlay.behavior_mut().on_pointer_hover(hit);
        }
    }

    /// The pointer of `hand` moved off this overlay; it gives up primary status.
    pub fn on_pointer_left(&mut self, hand: Hand) {
        if self.primary == Some(hand) {
            self.primary = None;
        }

        let mut overlay = self.overlay.lock();
        if overlay.supports_hover() {
            overlay.behavior_mut().on_pointer_left(hand);
        }
    }

    /// Click pressed on this overlay. Returns the hand that lost primary status.
    pub fn on_pointer_down(&mut self, hit: &mut PointerHit) -> Option<Hand> {
        let displaced = self.ensure_primary(hit.hand);
        hit.is_primary = true;

        let mut overlay = self.overlay.lock();
        if overlay.supports_hover() {
            overlay.behavior_mut().on_pointer_down(hit);
        }
        displaced
    }

    /// Click released on this overlay.
    pub fn on_pointer_up(&mut self, hit: &PointerHit) {
        let mut overlay = self.overlay.lock();
        if overlay.supports_hover() {
            overlay.behavior_mut().on_pointer_up(hit);
        }
    }

    /// Scroll axis deflected over this overlay.
    pub fn on_scroll(&mut self, hit: &PointerHit, value: f32) {
        let mut overlay = self.overlay.lock();
        if overlay.supports_hover() {
            overlay.behavior_mut().on_scroll(hit, value);
        }
    }

    /// Start carrying the overlay with the pointer at `pose`.
    ///
    /// Returns the hand that lost primary status, which must drop its grab.
    pub fn on_grabbed(&mut self, pose: &Affine3A, hit: &mut PointerHit) -> Option<Hand> {
        let displaced = self.ensure_primary(hit.hand);
        hit.is_primary = true;

        let mut overlay = self.overlay.lock();
        self.grab_offset = pose.to_local(overlay.origin());
        trace!(overlay = %overlay.name(), offset = ?self.grab_offset, "Grab offset captured");
        if overlay.supports_grab() {
            overlay.behavior_mut().on_grabbed(hit);
        }
        displaced
    }

    fn carry(&self, pose: &Affine3A, hmd: &Affine3A) {
        let mut overlay = self.overlay.lock();
        overlay.set_origin(pose.translated_local(self.grab_offset).origin());
        overlay.on_orientation_changed(hmd);
    }

    /// Follow the carrying pointer.
    pub fn on_grab_held(&mut self, pose: &Affine3A, hmd: &Affine3A) {
        self.carry(pose, hmd);
    }

    /// The carrying pointer let go; remember where the overlay was left.
    pub fn on_dropped(&mut self, hmd: &Affine3A) {
        let mut overlay = self.overlay.lock();
        overlay.save_spawn_position(hmd);
        if overlay.supports_grab() {
            overlay.behavior_mut().on_dropped();
        }
    }

    /// Click pressed while carried. The overlay still follows the pointer.
    pub fn on_click_while_held(&mut self, pose: &Affine3A, hmd: &Affine3A) {
        self.carry(pose, hmd);
        let mut overlay = self.overlay.lock();
        if overlay.supports_grab() {
            overlay.behavior_mut().on_click_while_held();
        }
    }

    /// Alt-click pressed while carried. The overlay still follows the pointer.
    pub fn on_alt_click_while_held(&mut self, pose: &Affine3A, hmd: &Affine3A) {
        self.carry(pose, hmd);
        let mut overlay = self.overlay.lock();
        if overlay.supports_grab() {
            overlay.behavior_mut().on_alt_click_while_held();
        }
    }

    /// Resize gesture. Returns `false` when the result would leave `[MIN_SCALE, MAX_SCALE]`.
    pub fn on_scroll_size(&mut self, value: f32) -> bool {
        let mut overlay = self.overlay.lock();
        let scale = overlay.local_scale * (1.0 - value.powi(3) * 2.0);
        if !(MIN_SCALE..=MAX_SCALE).contains(&scale) {
            return false;
        }
        overlay.local_scale = scale;
        true
    }

    /// Push/pull gesture. Returns `false` when the move would cross the distance bounds.
    pub fn on_scroll_distance(&mut self, value: f32) -> bool {
        let offset = self.grab_offset + self.grab_offset.normalize_or_zero() * value.powi(3);
        let distance = offset.length();
        if (distance < MIN_GRAB_DISTANCE && value < 0.0)
            || (distance > MAX_GRAB_DISTANCE && value > 0.0)
        {
            return false;
        }
        self.grab_offset = offset;
        true
    }
}

/// Find the target wrapping `id`.
pub fn find_target(
    targets: &mut [InteractionTarget],
    id: OverlayId,
) -> Option<&mut InteractionTarget> {
    targets.iter_mut().find(|target| target.id == id)
}
