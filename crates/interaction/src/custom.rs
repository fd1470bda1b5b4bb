//! Fallback handlers consulted when a pointer hits no overlay.

use glam::{Affine3A, Vec3};
use parking_lot::Mutex;
use raydesk_input::{Hand, InputState, PointerMode};
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use tracing::error;

/// Snapshot handed to custom interactions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InteractionArgs {
    /// Hand of the pointer.
    pub hand: Hand,
    /// Current pointer mode.
    pub mode: PointerMode,
    /// Pointer world pose.
    pub transform: Affine3A,
    /// This frame's buttons.
    pub now: InputState,
    /// Last frame's buttons.
    pub before: InputState,
}

/// Outcome of a custom interaction.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum InteractionResult {
    /// Not interested; try the next handler.
    #[default]
    Unhandled,
    /// Consumed; optionally override the laser.
    Handled {
        /// Laser length to show.
        length: Option<f32>,
        /// Laser color to show.
        color: Option<Vec3>,
    },
}

impl InteractionResult {
    /// Consumed without touching the laser.
    pub const HANDLED: Self = Self::Handled {
        length: None,
        color: None,
    };

    /// Whether a handler consumed the event.
    pub fn is_handled(&self) -> bool {
        matches!(self, Self::Handled { .. })
    }
}

/// Boxed custom interaction callback.
pub type CustomInteractionFn = Box<dyn FnMut(&InteractionArgs) -> InteractionResult + Send>;

/// Handle returned by registration, used to unregister.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CustomInteractionHandle(pub(crate) u64);

#[derive(Clone)]
pub(crate) struct CustomInteraction {
    pub(crate) handle: CustomInteractionHandle,
    pub(crate) name: Arc<str>,
    callback: Arc<Mutex<CustomInteractionFn>>,
}

impl CustomInteraction {
    pub(crate) fn new(
        handle: CustomInteractionHandle,
        name: &str,
        callback: CustomInteractionFn,
    ) -> Self {
        Self {
            handle,
            name: name.into(),
            callback: Arc::new(Mutex::new(callback)),
        }
    }
}

/// Run handlers in order until one reports [`InteractionResult::Handled`].
///
/// A panicking handler is logged and skipped.
pub(crate) fn dispatch(
    interactions: &[CustomInteraction],
    args: &InteractionArgs,
) -> InteractionResult {
    for interaction in interactions {
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
            let mut callback = interaction.callback.lock();
            (*callback)(args)
        }));

        match outcome {
            Ok(InteractionResult::Unhandled) => {}
            Ok(result) => return result,
            Err(_) => {
                error!(
                    interaction = %interaction.name,
                    hand = %args.hand,
                    "Custom interaction panicked; skipping"
                );
            }
        }
    }
    InteractionResult::Unhandled
}
