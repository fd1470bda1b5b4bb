//! Per-frame arbitration between pointers and overlays.

use crate::config::{InteractionConfig, ModeColors};
use crate::custom::{
    self, CustomInteraction, CustomInteractionHandle, InteractionArgs, InteractionResult,
};
use crate::error::InteractionError;
use crate::hit::PointerHit;
use crate::overlay::{OverlayId, SharedOverlay};
use crate::playspace::{PlaySpaceMover, SpaceMover};
use crate::pointer::{PointerState, PointerVisual};
use crate::ptt::push_to_talk;
use crate::registrar::{Registrar, RegisteredOverlay};
use crate::target::InteractionTarget;
use glam::Affine3A;
use raydesk_input::{Hand, InputSource, ModeOptions};
use std::sync::Arc;
use tracing::{debug, trace};

/// What a pointer ended up doing in a frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerOutcome {
    /// Hit nothing and no custom interaction claimed it.
    Miss,
    /// Nearest hit was this overlay.
    Hit {
        /// Overlay that won arbitration.
        overlay: OverlayId,
        /// Distance along the ray.
        distance: f32,
    },
    /// Carrying an overlay.
    Grabbing {
        /// Overlay being carried.
        overlay: OverlayId,
    },
    /// A custom interaction handled the frame.
    Custom,
}

/// Result of one [`ArbitrationEngine::update`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameReport {
    /// Frame counter, starting at 1.
    pub frame: u64,
    /// Outcome per hand, indexed by [`Hand::index`].
    pub outcomes: [PointerOutcome; 2],
}

impl FrameReport {
    /// Outcome for one hand.
    pub fn outcome(&self, hand: Hand) -> PointerOutcome {
        self.outcomes[hand.index()]
    }
}

/// Routes both pointers to at most one overlay each per frame.
///
/// Registration goes through a [`Registrar`], which may be cloned and used
/// from other threads; [`update`](Self::update) must be driven from a single
/// thread once per frame.
pub struct ArbitrationEngine {
    registrar: Registrar,
    mode_options: ModeOptions,
    mode_colors: ModeColors,
    pointers: [PointerState; 2],
    visuals: [Option<Box<dyn PointerVisual>>; 2],
    targets: Vec<InteractionTarget>,
    space_mover: Box<dyn SpaceMover>,
    show_hide_state: bool,
    hmd: Affine3A,
    frame: u64,
}

impl ArbitrationEngine {
    /// Create an engine with its own registrar.
    pub fn new(config: &InteractionConfig) -> Self {
        Self::with_registrar(config, Registrar::new())
    }

    /// Create an engine sharing an existing registrar.
    ///
    /// Push-to-talk interactions enabled in `config` are registered here.
    pub fn with_registrar(config: &InteractionConfig, registrar: Registrar) -> Self {
        for hand in Hand::ALL {
            let ptt = config.push_to_talk(hand);
            if ptt.enabled {
                registrar.register_custom_interaction(
                    &format!("push-to-talk ({hand})"),
                    push_to_talk(hand, ptt),
                );
            }
        }

        Self {
            registrar,
            mode_options: config.mode_options(),
            mode_colors: config.mode_colors(),
            pointers: [PointerState::new(Hand::Left), PointerState::new(Hand::Right)],
            visuals: [None, None],
            targets: Vec::new(),
            space_mover: Box::new(PlaySpaceMover::default()),
            show_hide_state: false,
            hmd: Affine3A::IDENTITY,
            frame: 0,
        }
    }

    /// Replace the play-space drag handler.
    pub fn set_space_mover(&mut self, mover: impl SpaceMover + 'static) {
        self.space_mover = Box::new(mover);
    }

    /// Handle for registering overlays and custom interactions.
    pub fn registrar(&self) -> Registrar {
        self.registrar.clone()
    }

    /// Attach the two laser visuals. They must belong to different hands.
    pub fn register_pointers(
        &mut self,
        first: Box<dyn PointerVisual>,
        second: Box<dyn PointerVisual>,
    ) -> Result<(), InteractionError> {
        if first.hand() == second.hand() {
            return Err(InteractionError::DuplicateHand(first.hand()));
        }
        for visual in [first, second] {
            let hand = visual.hand();
            self.visuals[hand.index()] = Some(visual);
        }
        debug!("Pointer visuals registered");
        Ok(())
    }

    /// Detach both laser visuals. Pointers keep tracking.
    pub fn unregister_pointers(&mut self) {
        self.visuals = [None, None];
        debug!("Pointer visuals unregistered");
    }

    /// See [`Registrar::register_target`].
    pub fn register_target(&self, overlay: SharedOverlay) -> Result<OverlayId, InteractionError> {
        self.registrar.register_target(overlay)
    }

    /// See [`Registrar::register_overlay`].
    pub fn register_overlay(&self, overlay: SharedOverlay) -> OverlayId {
        self.registrar.register_overlay(overlay)
    }

    /// See [`Registrar::unregister_overlay`].
    pub fn unregister_overlay(&self, id: OverlayId) -> bool {
        self.registrar.unregister_overlay(id)
    }

    /// See [`Registrar::register_custom_interaction`].
    pub fn register_custom_interaction(
        &self,
        name: &str,
        callback: impl FnMut(&InteractionArgs) -> InteractionResult + Send + 'static,
    ) -> CustomInteractionHandle {
        self.registrar.register_custom_interaction(name, callback)
    }

    /// See [`Registrar::unregister_custom_interaction`].
    pub fn unregister_custom_interaction(&self, handle: CustomInteractionHandle) -> bool {
        self.registrar.unregister_custom_interaction(handle)
    }

    /// Queue `action` to run on the next click release of `hand`.
    pub fn enqueue_release_action(&self, hand: Hand, action: impl FnOnce() + Send + 'static) {
        self.pointers[hand.index()].release_queue().push(action);
    }

    /// Pointer state for `hand`.
    pub fn pointer(&self, hand: Hand) -> &PointerState {
        &self.pointers[hand.index()]
    }

    /// Interactive overlays as of the last update, in registration order.
    pub fn targets(&self) -> &[InteractionTarget] {
        &self.targets
    }

    /// Target wrapping `id`, if it was live at the last update.
    pub fn target(&self, id: OverlayId) -> Option<&InteractionTarget> {
        self.targets.iter().find(|target| target.id() == id)
    }

    /// Whether bound overlays are currently toggled on. Starts off, so the first
    /// toggle only shows overlays that want to be visible.
    pub fn show_hide_state(&self) -> bool {
        self.show_hide_state
    }

    /// Frames processed so far.
    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// Run one frame.
    pub fn update(&mut self, input: &mut dyn InputSource) -> FrameReport {
        self.frame += 1;
        let frame = input.poll();
        self.hmd = frame.hmd;

        let snapshot = self.registrar.snapshot();
        self.reconcile(&snapshot.overlays);

        for hand in Hand::ALL {
            let pointer = &mut self.pointers[hand.index()];
            pointer.refresh(frame.hand(hand), &frame.hmd, self.mode_options);

            if pointer.input().click_released() {
                let ran = pointer.handle_release();
                if ran > 0 {
                    trace!(%hand, ran, "Release actions ran");
                }
            }

            let toggle = pointer.input().show_hide_pressed();
            let drag = pointer.space_drag_delta();

            if toggle {
                self.toggle_show_hide(&snapshot.overlays);
            }
            if let Some(delta) = drag {
                let overlays: Vec<SharedOverlay> = snapshot
                    .overlays
                    .iter()
                    .map(|entry| Arc::clone(&entry.overlay))
                    .collect();
                self.space_mover.on_space_drag(delta, &overlays);
            }
        }
        self.space_mover.end_frame();

        for target in &mut self.targets {
            target.begin();
        }

        let mut outcomes = [PointerOutcome::Miss; 2];
        for hand in Hand::ALL {
            outcomes[hand.index()] = self.update_pointer(hand, &snapshot.interactions);
        }

        FrameReport {
            frame: self.frame,
            outcomes,
        }
    }

    fn update_pointer(
        &mut self,
        hand: Hand,
        interactions: &[CustomInteraction],
    ) -> PointerOutcome {
        let Self {
            pointers,
            visuals,
            targets,
            mode_colors,
            hmd,
            ..
        } = self;
        let pointer_index = hand.index();
        let mode = pointers[pointer_index].mode();
        let pose = *pointers[pointer_index].transform();

        let mut nearest: Option<(usize, PointerHit)> = None;
        for (index, target) in targets.iter().enumerate() {
            let Some(hit) = target.test_interaction(hand, mode, &pose) else {
                continue;
            };
            // Strictly nearer only: on ties the earlier-registered target keeps the hit.
            if nearest.map_or(true, |(_, best)| hit.distance < best.distance) {
                nearest = Some((index, hit));
            }
        }

        if let Some(visual) = visuals[pointer_index].as_deref_mut() {
            visual.set_color(mode_colors.for_mode(mode));
            visual.set_length(nearest.map_or(0.0, |(_, hit)| hit.distance));
        }

        if let Some((index, hit)) = nearest {
            let id = targets[index].id();
            let displaced = pointers[pointer_index].handle_pointer_hit(targets, index, hit, hmd);
            if let Some(other) = displaced.filter(|other| *other != hand) {
                pointers[other.index()].try_drop(id);
            }

            return match pointers[pointer_index].grabbed() {
                Some(overlay) => PointerOutcome::Grabbing { overlay },
                None => PointerOutcome::Hit {
                    overlay: id,
                    distance: hit.distance,
                },
            };
        }

        let pointer = &mut pointers[pointer_index];
        pointer.handle_no_hit(targets);
        if pointer.is_grabbing() {
            pointer.handle_grabbed(targets, hmd);
            return match pointer.grabbed() {
                Some(overlay) => PointerOutcome::Grabbing { overlay },
                None => PointerOutcome::Miss,
            };
        }

        let args = InteractionArgs {
            hand,
            mode,
            transform: pose,
            now: pointer.input().now,
            before: pointer.input().before,
        };
        match custom::dispatch(interactions, &args) {
            InteractionResult::Handled { length, color } => {
                if let Some(visual) = visuals[pointer_index].as_deref_mut() {
                    if let Some(length) = length {
                        visual.set_length(length);
                    }
                    if let Some(color) = color {
                        visual.set_color(color);
                    }
                }
                PointerOutcome::Custom
            }
            InteractionResult::Unhandled => PointerOutcome::Miss,
        }
    }

    fn toggle_show_hide(&mut self, overlays: &[RegisteredOverlay]) {
        self.show_hide_state = !self.show_hide_state;
        debug!(shown = self.show_hide_state, "Show/hide toggled");

        for entry in overlays {
            let mut overlay = entry.overlay.lock();
            if !overlay.show_hide_binding {
                continue;
            }
            if self.show_hide_state {
                if overlay.want_visible && !overlay.visible() {
                    overlay.show(&self.hmd);
                }
            } else if overlay.visible() {
                overlay.hide();
            }
        }
    }

    /// Align `targets` with the live set: keep state for survivors, wrap new
    /// overlays, and clear pointer references to removed ones.
    fn reconcile(&mut self, overlays: &[RegisteredOverlay]) {
        let mut next = Vec::with_capacity(overlays.len());
        for entry in overlays.iter().filter(|entry| entry.interactive) {
            match self.targets.iter().position(|target| target.id() == entry.id) {
                Some(position) => next.push(self.targets.swap_remove(position)),
                None => next.push(InteractionTarget::new(
                    entry.id,
                    Arc::clone(&entry.overlay),
                    entry.capabilities,
                )),
            }
        }

        for stale in self.targets.drain(..) {
            debug!(overlay = %stale.id(), "Target left the live set");
            for pointer in &mut self.pointers {
                pointer.forget(stale.id());
            }
        }
        self.targets = next;
    }
}
