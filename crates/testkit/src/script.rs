//! Scripted input and pose helpers.

use glam::{Affine3A, Vec3};
use raydesk_geometry::facing;
use raydesk_input::{FrameInput, Hand, InputSource, InputState};
use std::collections::VecDeque;

/// Pose at `origin` whose pointer ray passes through `target`.
pub fn aim(origin: Vec3, target: Vec3) -> Affine3A {
    facing(origin, origin - target, Vec3::Y)
}

/// Pose at `origin` pointing straight up, away from panels placed around the user.
pub fn sky(origin: Vec3) -> Affine3A {
    aim(origin, origin + Vec3::Y)
}

/// Builder for a single [`FrameInput`].
#[derive(Debug, Clone, Copy)]
pub struct FrameBuilder {
    frame: FrameInput,
}

impl Default for FrameBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameBuilder {
    /// Headset at the origin, both pointers aimed at the sky with no buttons held.
    pub fn new() -> Self {
        let mut frame = FrameInput::default();
        for hand in Hand::ALL {
            frame.hand_mut(hand).transform = sky(Vec3::ZERO);
        }
        Self { frame }
    }

    /// Set the headset pose.
    pub fn hmd(mut self, hmd: Affine3A) -> Self {
        self.frame.hmd = hmd;
        self
    }

    /// Set one hand's pose and buttons.
    pub fn hand(mut self, hand: Hand, transform: Affine3A, state: InputState) -> Self {
        let slot = self.frame.hand_mut(hand);
        slot.transform = transform;
        slot.state = state;
        self
    }

    /// Finished frame.
    pub fn build(self) -> FrameInput {
        self.frame
    }
}

/// Plays back a fixed list of frames, then repeats the last one.
#[derive(Debug, Clone, Default)]
pub struct ScriptedInput {
    frames: VecDeque<FrameInput>,
    last: FrameInput,
}

impl ScriptedInput {
    /// Empty script; polls return [`FrameInput::default`].
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one frame.
    pub fn push(&mut self, frame: FrameInput) -> &mut Self {
        self.frames.push_back(frame);
        self
    }

    /// Append `count` copies of `frame`.
    pub fn hold(&mut self, frame: FrameInput, count: usize) -> &mut Self {
        self.frames.extend(std::iter::repeat(frame).take(count));
        self
    }

    /// Frames not yet played.
    pub fn remaining(&self) -> usize {
        self.frames.len()
    }

    /// Whether every scripted frame has been played.
    pub fn is_finished(&self) -> bool {
        self.frames.is_empty()
    }
}

impl InputSource for ScriptedInput {
    fn poll(&mut self) -> FrameInput {
        if let Some(frame) = self.frames.pop_front() {
            self.last = frame;
        }
        self.last
    }
}

impl FromIterator<FrameInput> for ScriptedInput {
    fn from_iter<I: IntoIterator<Item = FrameInput>>(iter: I) -> Self {
        Self {
            frames: iter.into_iter().collect(),
            last: FrameInput::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use raydesk_geometry::Ray;

    #[test]
    fn aim_points_the_ray_at_target() {
        let target = Vec3::new(1.0, 1.5, -2.0);
        let pose = aim(Vec3::new(0.0, 1.0, 0.0), target);
        let ray = Ray::from_pose(&pose);
        let expected = (target - ray.origin).normalize();
        assert!((ray.direction - expected).length() < 1e-5);
    }

    #[test]
    fn script_repeats_last_frame() {
        let pressed = FrameBuilder::new()
            .hand(
                Hand::Left,
                sky(Vec3::ZERO),
                InputState {
                    click: true,
                    ..Default::default()
                },
            )
            .build();

        let mut script = ScriptedInput::new();
        script.push(FrameInput::default()).hold(pressed, 2);
        assert_eq!(script.remaining(), 3);

        assert_eq!(script.poll(), FrameInput::default());
        assert_eq!(script.poll(), pressed);
        assert_eq!(script.poll(), pressed);
        assert!(script.is_finished());
        assert_eq!(script.poll(), pressed);
    }
}
