#![warn(missing_docs)]
//! Per-hand controller input for the two ray pointers.

use glam::Affine3A;
use raydesk_geometry::PoseExt;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Scroll magnitudes at or below this are treated as no scroll.
pub const SCROLL_THRESHOLD: f32 = 0.1;

/// Wrist-roll dot product below which the pointer switches to right-click mode.
const RIGHT_ORIENTATION_DOT: f32 = -0.85;
/// Wrist-roll dot product above which the pointer switches to middle-click mode.
const MIDDLE_ORIENTATION_DOT: f32 = 0.7;

/// Which hand a pointer is bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Hand {
    /// Left hand.
    Left = 0,
    /// Right hand.
    Right = 1,
}

impl Hand {
    /// Both hands, in index order.
    pub const ALL: [Hand; 2] = [Hand::Left, Hand::Right];

    /// Index into per-hand arrays.
    pub fn index(self) -> usize {
        self as usize
    }

    /// The opposite hand.
    pub fn other(self) -> Hand {
        match self {
            Hand::Left => Hand::Right,
            Hand::Right => Hand::Left,
        }
    }
}

impl fmt::Display for Hand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Hand::Left => write!(f, "left"),
            Hand::Right => write!(f, "right"),
        }
    }
}

/// Button semantics a pointer currently emulates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PointerMode {
    /// Primary (left mouse button).
    #[default]
    Left,
    /// Secondary (right mouse button).
    Right,
    /// Middle mouse button.
    Middle,
}

impl PointerMode {
    /// Index into per-mode arrays (e.g. laser colors).
    pub fn index(self) -> usize {
        match self {
            PointerMode::Left => 0,
            PointerMode::Right => 1,
            PointerMode::Middle => 2,
        }
    }
}

/// Controller state for one hand, sampled once per frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InputState {
    /// Click (trigger) held.
    pub click: bool,
    /// Grab (grip) held.
    pub grab: bool,
    /// Alternate click held.
    pub alt_click: bool,
    /// Show/hide toggle button held.
    pub show_hide: bool,
    /// Play-space drag button held.
    pub space_drag: bool,
    /// Explicit right-click modifier held.
    pub click_modifier_right: bool,
    /// Explicit middle-click modifier held.
    pub click_modifier_middle: bool,
    /// Scroll axis value in `[-1, 1]`.
    pub scroll: f32,
}

impl InputState {
    /// Whether the scroll axis is deflected past [`SCROLL_THRESHOLD`].
    pub fn scrolling(&self) -> bool {
        self.scroll.abs() > SCROLL_THRESHOLD
    }
}

/// Current and previous input for one hand, used for edge detection.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct InputHistory {
    /// This frame's state.
    pub now: InputState,
    /// Last frame's state.
    pub before: InputState,
}

impl InputHistory {
    /// Shift `now` into `before` and store the fresh sample.
    pub fn advance(&mut self, next: InputState) {
        self.before = self.now;
        self.now = next;
    }

    /// Click went from released to held this frame.
    pub fn click_pressed(&self) -> bool {
        self.now.click && !self.before.click
    }

    /// Click went from held to released this frame.
    pub fn click_released(&self) -> bool {
        !self.now.click && self.before.click
    }

    /// Grab went from released to held this frame.
    pub fn grab_pressed(&self) -> bool {
        self.now.grab && !self.before.grab
    }

    /// Alt-click went from released to held this frame.
    pub fn alt_click_pressed(&self) -> bool {
        self.now.alt_click && !self.before.alt_click
    }

    /// Alt-click went from held to released this frame.
    pub fn alt_click_released(&self) -> bool {
        !self.now.alt_click && self.before.alt_click
    }

    /// Show/hide went from released to held this frame.
    pub fn show_hide_pressed(&self) -> bool {
        self.now.show_hide && !self.before.show_hide
    }
}

/// Which wrist orientations may switch the pointer mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModeOptions {
    /// Allow rolling the wrist outwards to select right-click.
    pub right_click_orientation: bool,
    /// Allow rolling the wrist inwards to select middle-click.
    pub middle_click_orientation: bool,
}

impl Default for ModeOptions {
    fn default() -> Self {
        Self {
            right_click_orientation: true,
            middle_click_orientation: true,
        }
    }
}

/// Roll of the pointer relative to the headset, mirrored so both hands agree.
///
/// Computed as `dot(hmd_up, pointer_x) * (1 - 2 * hand_index)`.
pub fn orientation_dot(hmd: &Affine3A, pointer: &Affine3A, hand: Hand) -> f32 {
    let sign = 1.0 - 2.0 * hand.index() as f32;
    hmd.basis_y().dot(pointer.basis_x()) * sign
}

/// Classify an orientation dot product into a pointer mode.
pub fn classify_orientation(dot: f32, grab_held: bool, options: ModeOptions) -> PointerMode {
    let mode = if dot < RIGHT_ORIENTATION_DOT {
        PointerMode::Right
    } else if dot > MIDDLE_ORIENTATION_DOT {
        PointerMode::Middle
    } else {
        PointerMode::Left
    };

    match mode {
        PointerMode::Middle if !grab_held && !options.middle_click_orientation => PointerMode::Left,
        PointerMode::Right if !options.right_click_orientation => PointerMode::Left,
        mode => mode,
    }
}

/// Derive the pointer mode from explicit modifiers, falling back to wrist orientation.
pub fn classify_mode(
    state: &InputState,
    hmd: &Affine3A,
    pointer: &Affine3A,
    hand: Hand,
    options: ModeOptions,
) -> PointerMode {
    if state.click_modifier_right {
        return PointerMode::Right;
    }
    if state.click_modifier_middle {
        return PointerMode::Middle;
    }
    classify_orientation(orientation_dot(hmd, pointer, hand), state.grab, options)
}

/// One hand's pose and buttons for a frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HandFrame {
    /// World pose of the pointer.
    pub transform: Affine3A,
    /// Button state.
    pub state: InputState,
}

impl Default for HandFrame {
    fn default() -> Self {
        Self {
            transform: Affine3A::IDENTITY,
            state: InputState::default(),
        }
    }
}

/// A consistent snapshot of all tracked input for one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameInput {
    /// Headset pose.
    pub hmd: Affine3A,
    /// Per-hand data, indexed by [`Hand::index`].
    pub hands: [HandFrame; 2],
}

impl Default for FrameInput {
    fn default() -> Self {
        Self {
            hmd: Affine3A::IDENTITY,
            hands: [HandFrame::default(); 2],
        }
    }
}

impl FrameInput {
    /// Data for one hand.
    pub fn hand(&self, hand: Hand) -> &HandFrame {
        &self.hands[hand.index()]
    }

    /// Mutable data for one hand.
    pub fn hand_mut(&mut self, hand: Hand) -> &mut HandFrame {
        &mut self.hands[hand.index()]
    }
}

/// Supplier of per-frame input (tracking backend, scripted playback, tests).
pub trait InputSource {
    /// Sample all input for the next frame.
    fn poll(&mut self) -> FrameInput;
}

impl InputSource for FrameInput {
    fn poll(&mut self) -> FrameInput {
        *self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::{Quat, Vec3};

    #[test]
    fn hand_index_and_other() {
        assert_eq!(Hand::Left.index(), 0);
        assert_eq!(Hand::Right.index(), 1);
        assert_eq!(Hand::Left.other(), Hand::Right);
        assert_eq!(Hand::Right.to_string(), "right");
    }

    #[test]
    fn orientation_thresholds() {
        let all = ModeOptions::default();
        assert_eq!(classify_orientation(-0.9, false, all), PointerMode::Right);
        assert_eq!(classify_orientation(0.8, false, all), PointerMode::Middle);
        assert_eq!(classify_orientation(0.0, false, all), PointerMode::Left);
        assert_eq!(classify_orientation(-0.85, false, all), PointerMode::Left);
        assert_eq!(classify_orientation(0.7, false, all), PointerMode::Left);
    }

    #[test]
    fn disabled_orientations_fall_back_to_left() {
        let none = ModeOptions {
            right_click_orientation: false,
            middle_click_orientation: false,
        };
        for dot in [-1.0, -0.9, -0.5, 0.0, 0.5, 0.8, 1.0] {
            assert_eq!(classify_orientation(dot, false, none), PointerMode::Left);
        }
        // Middle survives while grabbing so the grabbed panel can be resized.
        assert_eq!(classify_orientation(0.8, true, none), PointerMode::Middle);
    }

    #[test]
    fn modifiers_override_orientation() {
        let hmd = Affine3A::IDENTITY;
        let pointer = Affine3A::IDENTITY;
        let state = InputState {
            click_modifier_right: true,
            click_modifier_middle: true,
            ..Default::default()
        };
        let mode = classify_mode(&state, &hmd, &pointer, Hand::Left, ModeOptions::default());
        assert_eq!(mode, PointerMode::Right);

        let state = InputState {
            click_modifier_middle: true,
            ..Default::default()
        };
        let mode = classify_mode(&state, &hmd, &pointer, Hand::Left, ModeOptions::default());
        assert_eq!(mode, PointerMode::Middle);
    }

    #[test]
    fn wrist_roll_is_mirrored_between_hands() {
        let hmd = Affine3A::IDENTITY;
        // Roll the pointer so its local X points up.
        let rolled = Affine3A::from_rotation_translation(
            Quat::from_rotation_z(std::f32::consts::FRAC_PI_2),
            Vec3::ZERO,
        );
        assert!((orientation_dot(&hmd, &rolled, Hand::Left) - 1.0).abs() < 1e-5);
        assert!((orientation_dot(&hmd, &rolled, Hand::Right) + 1.0).abs() < 1e-5);

        let state = InputState::default();
        let options = ModeOptions::default();
        assert_eq!(
            classify_mode(&state, &hmd, &rolled, Hand::Left, options),
            PointerMode::Middle
        );
        assert_eq!(
            classify_mode(&state, &hmd, &rolled, Hand::Right, options),
            PointerMode::Right
        );
    }

    #[test]
    fn history_detects_edges() {
        let mut history = InputHistory::default();
        history.advance(InputState {
            click: true,
            ..Default::default()
        });
        assert!(history.click_pressed());
        assert!(!history.click_released());

        history.advance(InputState {
            click: true,
            ..Default::default()
        });
        assert!(!history.click_pressed());

        history.advance(InputState::default());
        assert!(history.click_released());
    }

    #[test]
    fn scroll_threshold_is_exclusive() {
        let mut state = InputState {
            scroll: 0.1,
            ..Default::default()
        };
        assert!(!state.scrolling());
        state.scroll = -0.11;
        assert!(state.scrolling());
    }
}
