//! Play-space dragging.

use crate::overlay::SharedOverlay;
use glam::Vec3;
use tracing::trace;

/// Receives space-drag gestures forwarded by the engine.
pub trait SpaceMover: Send {
    /// A pointer holding space-drag moved by `delta` since last frame.
    fn on_space_drag(&mut self, delta: Vec3, overlays: &[SharedOverlay]);

    /// Called once at the end of each frame's pointer pass.
    fn end_frame(&mut self) {}
}

/// Shifts the play space and counter-moves world-locked overlays.
///
/// Overlays that can be grabbed are attached to the user and stay put. Only the
/// first drag delivered in a frame is applied, so two hands dragging at once do
/// not double the movement.
#[derive(Debug, Default)]
pub struct PlaySpaceMover {
    offset: Vec3,
    moved_this_frame: bool,
}

impl PlaySpaceMover {
    /// Accumulated play-space offset.
    pub fn offset(&self) -> Vec3 {
        self.offset
    }
}

impl SpaceMover for PlaySpaceMover {
    fn on_space_drag(&mut self, delta: Vec3, overlays: &[SharedOverlay]) {
        if self.moved_this_frame {
            return;
        }
        self.moved_this_frame = true;

        for overlay in overlays {
            let mut overlay = overlay.lock();
            if overlay.supports_grab() {
                continue;
            }
            let origin = overlay.origin();
            overlay.set_origin(origin - delta);
        }

        self.offset += delta;
        trace!(?delta, offset = ?self.offset, "Play space moved");
    }

    fn end_frame(&mut self) {
        self.moved_this_frame = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::overlay::{Capabilities, Overlay};

    #[test]
    fn moves_world_locked_overlays_once_per_frame() {
        let fixed = Overlay::new("fixed", 1.0).shared();
        let carried = Overlay::new("carried", 1.0)
            .with_capabilities(Capabilities::GRAB)
            .shared();
        let overlays = [fixed.clone(), carried.clone()];

        let mut mover = PlaySpaceMover::default();
        let delta = Vec3::new(1.0, 0.0, 0.0);
        mover.on_space_drag(delta, &overlays);
        mover.on_space_drag(delta, &overlays);

        assert_eq!(fixed.lock().origin(), Vec3::new(-1.0, 0.0, 0.0));
        assert_eq!(carried.lock().origin(), Vec3::ZERO);
        assert_eq!(mover.offset(), delta);

        mover.end_frame();
        mover.on_space_drag(delta, &overlays);
        assert_eq!(fixed.lock().origin(), Vec3::new(-2.0, 0.0, 0.0));
    }
}
