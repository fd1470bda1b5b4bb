//! Per-hand pointer state machine.

use crate::hit::PointerHit;
use crate::overlay::OverlayId;
use crate::target::{find_target, InteractionTarget};
use glam::{Affine3A, Vec3};
use parking_lot::Mutex;
use raydesk_geometry::PoseExt;
use raydesk_input::{classify_mode, Hand, HandFrame, InputHistory, ModeOptions, PointerMode};
use std::collections::VecDeque;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// Deferred work run on the next click release.
pub type ReleaseAction = Box<dyn FnOnce() + Send>;

/// FIFO of actions to run when the pointer's click is released.
///
/// Cheap to clone; clones share the same queue, so callbacks can enqueue from
/// any thread.
#[derive(Clone, Default)]
pub struct ReleaseQueue(Arc<Mutex<VecDeque<ReleaseAction>>>);

impl ReleaseQueue {
    /// Append an action.
    pub fn push(&self, action: impl FnOnce() + Send + 'static) {
        self.0.lock().push_back(Box::new(action));
    }

    /// Number of pending actions.
    pub fn len(&self) -> usize {
        self.0.lock().len()
    }

    /// Whether no action is pending.
    pub fn is_empty(&self) -> bool {
        self.0.lock().is_empty()
    }

    /// Run and remove every pending action in insertion order.
    ///
    /// Actions run outside the lock, so they may enqueue follow-ups; those wait
    /// for the next release.
    pub fn drain(&self) -> usize {
        let actions = std::mem::take(&mut *self.0.lock());
        let count = actions.len();
        for action in actions {
            action();
        }
        count
    }
}

impl fmt::Debug for ReleaseQueue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReleaseQueue")
            .field("pending", &self.len())
            .finish()
    }
}

/// Renderer-side laser for one hand.
pub trait PointerVisual: Send {
    /// Hand this visual is attached to.
    fn hand(&self) -> Hand;
    /// Laser length in meters; 0 hides it.
    fn set_length(&mut self, length: f32);
    /// Laser color (sRGB components in `[0, 1]`).
    fn set_color(&mut self, color: Vec3);
}

/// State of one pointer across frames.
#[derive(Debug)]
pub struct PointerState {
    hand: Hand,
    transform: Affine3A,
    input: InputHistory,
    mode: PointerMode,
    release_queue: ReleaseQueue,
    hovered: Option<OverlayId>,
    grabbed: Option<OverlayId>,
    drag_anchor: Option<Vec3>,
}

impl PointerState {
    /// Idle pointer for `hand`.
    pub fn new(hand: Hand) -> Self {
        Self {
            hand,
            transform: Affine3A::IDENTITY,
            input: InputHistory::default(),
            mode: PointerMode::Left,
            release_queue: ReleaseQueue::default(),
            hovered: None,
            grabbed: None,
            drag_anchor: None,
        }
    }

    /// Hand this pointer belongs to.
    pub fn hand(&self) -> Hand {
        self.hand
    }

    /// Current world pose.
    pub fn transform(&self) -> &Affine3A {
        &self.transform
    }

    /// Input for this and the previous frame.
    pub fn input(&self) -> &InputHistory {
        &self.input
    }

    /// Button semantics for this frame.
    pub fn mode(&self) -> PointerMode {
        self.mode
    }

    /// Overlay the pointer rested on last.
    pub fn hovered(&self) -> Option<OverlayId> {
        self.hovered
    }

    /// Overlay being carried, if any.
    pub fn grabbed(&self) -> Option<OverlayId> {
        self.grabbed
    }

    /// Whether the pointer is carrying an overlay.
    pub fn is_grabbing(&self) -> bool {
        self.grabbed.is_some()
    }

    /// Shared handle to this pointer's release queue.
    pub fn release_queue(&self) -> ReleaseQueue {
        self.release_queue.clone()
    }

    /// Ingest a new frame of tracking and buttons.
    pub fn refresh(&mut self, frame: &HandFrame, hmd: &Affine3A, options: ModeOptions) {
        self.transform = frame.transform;
        self.input.advance(frame.state);
        self.mode = classify_mode(&frame.state, hmd, &self.transform, self.hand, options);
    }

    /// Run queued release actions. Returns how many ran.
    pub fn handle_release(&mut self) -> usize {
        self.release_queue.drain()
    }

    /// Movement since last frame while the space-drag button is held.
    ///
    /// Returns `None` when not dragging and on the first held frame.
    pub fn space_drag_delta(&mut self) -> Option<Vec3> {
        if !self.input.now.space_drag {
            self.drag_anchor = None;
            return None;
        }

        let position = self.transform.origin();
        let delta = self.drag_anchor.map(|anchor| position - anchor);
        self.drag_anchor = Some(position);
        delta
    }

    /// The ray landed on `targets[index]` and it was the nearest hit.
    ///
    /// Returns the hand displaced as primary on that target, if any; the caller
    /// must make it drop any grab on the target.
    pub fn handle_pointer_hit(
        &mut self,
        targets: &mut [InteractionTarget],
        index: usize,
        mut hit: PointerHit,
        hmd: &Affine3A,
    ) -> Option<Hand> {
        if self.grabbed.is_some() {
            self.handle_grabbed(targets, hmd);
            return None;
        }

        let id = targets[index].id();
        if self.hovered != Some(id) {
            if let Some(previous) = self.hovered.and_then(|prev| find_target(targets, prev)) {
                previous.on_pointer_left(self.hand);
            }
            self.hovered = Some(id);
        }

        let target = &mut targets[index];
        if self.input.grab_pressed() && target.supports_grab() {
            let displaced = target.on_grabbed(&self.transform, &mut hit);
            self.grabbed = Some(id);
            debug!(hand = %self.hand, overlay = %id, "Grab started");
            return displaced;
        }

        target.on_pointer_hover(&mut hit);

        let mut displaced = None;
        if self.input.click_pressed() {
            displaced = target.on_pointer_down(&mut hit);
        } else if self.input.click_released() {
            target.on_pointer_up(&hit);
        }

        if self.input.now.scrolling() {
            target.on_scroll(&hit, self.input.now.scroll);
        }

        displaced
    }

    /// The ray missed every overlay this frame.
    pub fn handle_no_hit(&mut self, targets: &mut [InteractionTarget]) {
        if let Some(previous) = self.hovered.take() {
            if let Some(target) = find_target(targets, previous) {
                target.on_pointer_left(self.hand);
            }
        }
    }

    /// Advance an active grab: drop, resize, push/pull, or follow the pointer.
    pub fn handle_grabbed(&mut self, targets: &mut [InteractionTarget], hmd: &Affine3A) {
        let Some(id) = self.grabbed else {
            return;
        };
        let Some(target) = find_target(targets, id) else {
            self.grabbed = None;
            return;
        };

        if !self.input.now.grab {
            target.on_dropped(hmd);
            self.grabbed = None;
            debug!(hand = %self.hand, overlay = %id, "Grab released");
            return;
        }

        if self.input.now.scrolling() {
            let value = self.input.now.scroll;
            if self.mode == PointerMode::Middle {
                target.on_scroll_size(value);
            } else {
                target.on_scroll_distance(value);
            }
        }

        if self.input.click_pressed() {
            target.on_click_while_held(&self.transform, hmd);
        } else if self.input.alt_click_pressed() {
            target.on_alt_click_while_held(&self.transform, hmd);
        } else {
            target.on_grab_held(&self.transform, hmd);
        }
    }

    /// Stop carrying `id` without notifying it. Used when another hand takes over.
    pub fn try_drop(&mut self, id: OverlayId) -> bool {
        if self.grabbed != Some(id) {
            return false;
        }
        self.grabbed = None;
        debug!(hand = %self.hand, overlay = %id, "Grab taken over by other hand");
        true
    }

    /// Forget any reference to an overlay that left the live set.
    pub fn forget(&mut self, id: OverlayId) {
        if self.hovered == Some(id) {
            self.hovered = None;
        }
        if self.grabbed == Some(id) {
            self.grabbed = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn release_queue_runs_fifo_once() {
        let queue = ReleaseQueue::default();
        let order = Arc::new(Mutex::new(Vec::new()));
        for i in 0..3 {
            let order = Arc::clone(&order);
            queue.push(move || order.lock().push(i));
        }
        assert_eq!(queue.len(), 3);

        assert_eq!(queue.drain(), 3);
        assert_eq!(*order.lock(), vec![0, 1, 2]);
        assert!(queue.is_empty());
        assert_eq!(queue.drain(), 0);
    }

    #[test]
    fn action_enqueued_during_drain_waits() {
        let queue = ReleaseQueue::default();
        let ran = Arc::new(AtomicUsize::new(0));

        let inner_queue = queue.clone();
        let inner_ran = Arc::clone(&ran);
        queue.push(move || {
            inner_queue.push(move || {
                inner_ran.fetch_add(1, Ordering::SeqCst);
            });
        });

        assert_eq!(queue.drain(), 1);
        assert_eq!(ran.load(Ordering::SeqCst), 0);
        assert_eq!(queue.drain(), 1);
        assert_eq!(ran.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn space_drag_reports_movement_after_first_frame() {
        let mut pointer = PointerState::new(Hand::Right);
        let options = ModeOptions::default();
        let mut frame = HandFrame::default();
        frame.state.space_drag = true;

        pointer.refresh(&frame, &Affine3A::IDENTITY, options);
        assert_eq!(pointer.space_drag_delta(), None);

        frame.transform = Affine3A::from_translation(Vec3::new(0.5, 0.0, 0.0));
        pointer.refresh(&frame, &Affine3A::IDENTITY, options);
        assert_eq!(pointer.space_drag_delta(), Some(Vec3::new(0.5, 0.0, 0.0)));

        frame.state.space_drag = false;
        pointer.refresh(&frame, &Affine3A::IDENTITY, options);
        assert_eq!(pointer.space_drag_delta(), None);
    }

    #[test]
    fn try_drop_only_matches_grabbed_overlay() {
        let mut pointer = PointerState::new(Hand::Left);
        pointer.grabbed = Some(OverlayId(4));
        assert!(!pointer.try_drop(OverlayId(5)));
        assert!(pointer.try_drop(OverlayId(4)));
        assert!(!pointer.is_grabbing());
    }
}
