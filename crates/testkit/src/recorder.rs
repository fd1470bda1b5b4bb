//! Overlay behaviors and pointer visuals that record what the engine does.

use glam::{Vec2, Vec3};
use parking_lot::Mutex;
use raydesk_input::Hand;
use raydesk_interaction::{OverlayBehavior, PointerHit, PointerVisual};
use serde::Serialize;
use std::sync::Arc;
use tracing::trace;

/// One callback delivered to an overlay.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum OverlayEvent {
    /// Pointer resting on the overlay.
    Hover {
        /// Pointer hand.
        hand: Hand,
        /// Content coordinates.
        uv: [f32; 2],
        /// Whether the hand was primary.
        primary: bool,
    },
    /// Pointer moved off.
    Left {
        /// Pointer hand.
        hand: Hand,
    },
    /// Click pressed.
    Down {
        /// Pointer hand.
        hand: Hand,
        /// Content coordinates.
        uv: [f32; 2],
    },
    /// Click released.
    Up {
        /// Pointer hand.
        hand: Hand,
        /// Content coordinates.
        uv: [f32; 2],
    },
    /// Scroll axis deflected.
    Scroll {
        /// Pointer hand.
        hand: Hand,
        /// Axis value.
        value: f32,
    },
    /// Picked up.
    Grabbed {
        /// Pointer hand.
        hand: Hand,
    },
    /// Let go.
    Dropped,
    /// Click while carried.
    ClickWhileHeld,
    /// Alt-click while carried.
    AltClickWhileHeld,
    /// Became visible.
    Shown,
    /// Hidden.
    Hidden,
}

impl OverlayEvent {
    /// Snake-case label, matching the serialized `kind` field.
    pub fn kind(&self) -> &'static str {
        match self {
            OverlayEvent::Hover { .. } => "hover",
            OverlayEvent::Left { .. } => "left",
            OverlayEvent::Down { .. } => "down",
            OverlayEvent::Up { .. } => "up",
            OverlayEvent::Scroll { .. } => "scroll",
            OverlayEvent::Grabbed { .. } => "grabbed",
            OverlayEvent::Dropped => "dropped",
            OverlayEvent::ClickWhileHeld => "click_while_held",
            OverlayEvent::AltClickWhileHeld => "alt_click_while_held",
            OverlayEvent::Shown => "shown",
            OverlayEvent::Hidden => "hidden",
        }
    }
}

/// An event tagged with the frame and overlay it happened on.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EventRecord {
    /// Frame number set via [`EventLog::set_frame`].
    pub frame: u64,
    /// Overlay name.
    pub overlay: String,
    /// What happened.
    #[serde(flatten)]
    pub event: OverlayEvent,
}

#[derive(Default)]
struct LogState {
    frame: u64,
    records: Vec<EventRecord>,
}

/// Shared, append-only log fed by [`RecordingBehavior`]s.
#[derive(Clone, Default)]
pub struct EventLog {
    inner: Arc<Mutex<LogState>>,
}

impl EventLog {
    /// Empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Frame number stamped on subsequent records.
    pub fn set_frame(&self, frame: u64) {
        self.inner.lock().frame = frame;
    }

    /// A behavior that records into this log under `overlay`.
    pub fn behavior(&self, overlay: &str) -> RecordingBehavior {
        RecordingBehavior {
            overlay: overlay.to_string(),
            log: self.clone(),
        }
    }

    /// Copy of every record so far.
    pub fn records(&self) -> Vec<EventRecord> {
        self.inner.lock().records.clone()
    }

    /// Remove and return every record so far.
    pub fn drain(&self) -> Vec<EventRecord> {
        std::mem::take(&mut self.inner.lock().records)
    }

    /// Number of records with the given [`OverlayEvent::kind`].
    pub fn count(&self, kind: &str) -> usize {
        self.inner
            .lock()
            .records
            .iter()
            .filter(|record| record.event.kind() == kind)
            .count()
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.inner.lock().records.len()
    }

    /// Whether nothing was recorded.
    pub fn is_empty(&self) -> bool {
        self.inner.lock().records.is_empty()
    }

    fn push(&self, overlay: &str, event: OverlayEvent) {
        trace!(overlay, kind = event.kind(), "Overlay event");
        let mut state = self.inner.lock();
        let frame = state.frame;
        state.records.push(EventRecord {
            frame,
            overlay: overlay.to_string(),
            event,
        });
    }
}

/// [`OverlayBehavior`] that appends every callback to an [`EventLog`].
pub struct RecordingBehavior {
    overlay: String,
    log: EventLog,
}

fn uv(hit: &PointerHit) -> [f32; 2] {
    let Vec2 { x, y } = hit.uv;
    [x, y]
}

impl OverlayBehavior for RecordingBehavior {
    fn on_pointer_hover(&mut self, hit: &PointerHit) {
        self.log.push(
            &self.overlay,
            OverlayEvent::Hover {
                hand: hit.hand,
                uv: uv(hit),
                primary: hit.is_primary,
            },
        );
    }

    fn on_pointer_left(&mut self, hand: Hand) {
        self.log.push(&self.overlay, OverlayEvent::Left { hand });
    }

    fn on_pointer_down(&mut self, hit: &PointerHit) {
        self.log.push(
            &self.overlay,
            OverlayEvent::Down {
                hand: hit.hand,
                uv: uv(hit),
            },
        );
    }

    fn on_pointer_up(&mut self, hit: &PointerHit) {
        self.log.push(
            &self.overlay,
            OverlayEvent::Up {
                hand: hit.hand,
                uv: uv(hit),
            },
        );
    }

    fn on_scroll(&mut self, hit: &PointerHit, value: f32) {
        self.log.push(
            &self.overlay,
            OverlayEvent::Scroll {
                hand: hit.hand,
                value,
            },
        );
    }

    fn on_grabbed(&mut self, hit: &PointerHit) {
        self.log
            .push(&self.overlay, OverlayEvent::Grabbed { hand: hit.hand });
    }

    fn on_dropped(&mut self) {
        self.log.push(&self.overlay, OverlayEvent::Dropped);
    }

    fn on_click_while_held(&mut self) {
        self.log.push(&self.overlay, OverlayEvent::ClickWhileHeld);
    }

    fn on_alt_click_while_held(&mut self) {
        self.log.push(&self.overlay, OverlayEvent::AltClickWhileHeld);
    }

    fn on_show(&mut self) {
        self.log.push(&self.overlay, OverlayEvent::Shown);
    }

    fn on_hide(&mut self) {
        self.log.push(&self.overlay, OverlayEvent::Hidden);
    }
}

/// Last laser settings pushed to a [`RecordingPointer`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LaserState {
    /// Laser length; 0 when hidden.
    pub length: f32,
    /// Laser color.
    pub color: Vec3,
}

/// Read side of a [`RecordingPointer`].
#[derive(Clone)]
pub struct LaserProbe(Arc<Mutex<LaserState>>);

impl LaserProbe {
    /// Current laser settings.
    pub fn get(&self) -> LaserState {
        *self.0.lock()
    }
}

/// [`PointerVisual`] that stores the latest length and color.
pub struct RecordingPointer {
    hand: Hand,
    state: Arc<Mutex<LaserState>>,
}

impl RecordingPointer {
    /// Visual for `hand` plus a handle to read it back after it moves into the engine.
    pub fn new(hand: Hand) -> (Self, LaserProbe) {
        let state = Arc::new(Mutex::new(LaserState {
            length: 0.0,
            color: Vec3::ONE,
        }));
        (
            Self {
                hand,
                state: Arc::clone(&state),
            },
            LaserProbe(state),
        )
    }
}

impl PointerVisual for RecordingPointer {
    fn hand(&self) -> Hand {
        self.hand
    }

    fn set_length(&mut self, length: f32) {
        self.state.lock().length = length;
    }

    fn set_color(&mut self, color: Vec3) {
        self.state.lock().color = color;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_carry_frame_and_overlay() {
        let log = EventLog::new();
        let mut behavior = log.behavior("desktop");
        log.set_frame(7);
        behavior.on_dropped();
        behavior.on_show();

        let records = log.records();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].frame, 7);
        assert_eq!(records[0].overlay, "desktop");
        assert_eq!(log.count("dropped"), 1);
        assert_eq!(log.drain().len(), 2);
        assert!(log.is_empty());
    }

    #[test]
    fn event_kind_matches_serialized_tag() {
        let event = OverlayEvent::AltClickWhileHeld;
        let json = serde_json::to_string(&event).unwrap();
        assert_eq!(json, format!("{{\"kind\":\"{}\"}}", event.kind()));
    }
}
