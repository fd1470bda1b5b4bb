//! Thread-safe set of live overlays and custom interactions.

use crate::custom::{
    CustomInteraction, CustomInteractionHandle, InteractionArgs, InteractionResult,
};
use crate::error::InteractionError;
use crate::overlay::{Capabilities, OverlayId, SharedOverlay};
use parking_lot::Mutex;
use std::sync::Arc;
use tracing::{debug, warn};

#[derive(Clone)]
pub(crate) struct RegisteredOverlay {
    pub(crate) id: OverlayId,
    pub(crate) overlay: SharedOverlay,
    pub(crate) capabilities: Capabilities,
    pub(crate) interactive: bool,
}

/// Copy of the live set taken once per frame.
pub(crate) struct Snapshot {
    pub(crate) overlays: Vec<RegisteredOverlay>,
    pub(crate) interactions: Vec<CustomInteraction>,
}

#[derive(Default)]
struct LiveSet {
    overlays: Vec<RegisteredOverlay>,
    interactions: Vec<CustomInteraction>,
    next_overlay: u64,
    next_interaction: u64,
}

/// Registration entry point shared between the engine and application threads.
///
/// Changes take effect at the start of the engine's next update.
#[derive(Clone, Default)]
pub struct Registrar {
    inner: Arc<Mutex<LiveSet>>,
}

impl Registrar {
    /// Empty registrar.
    pub fn new() -> Self {
        Self::default()
    }

    fn insert(
        &self,
        overlay: SharedOverlay,
        capabilities: Capabilities,
        interactive: bool,
    ) -> OverlayId {
        let mut live = self.inner.lock();
        live.next_overlay += 1;
        let id = OverlayId(live.next_overlay);
        live.overlays.push(RegisteredOverlay {
            id,
            overlay,
            capabilities,
            interactive,
        });
        id
    }

    /// Register an overlay pointers can interact with.
    pub fn register_target(&self, overlay: SharedOverlay) -> Result<OverlayId, InteractionError> {
        let (name, capabilities) = {
            let overlay = overlay.lock();
            (overlay.name().to_string(), overlay.capabilities())
        };
        if capabilities.is_empty() {
            warn!(overlay = %name, "Refusing target without hover or grab support");
            return Err(InteractionError::NoCapabilities(name));
        }

        let id = self.insert(overlay, capabilities, true);
        debug!(overlay = %name, %id, ?capabilities, "Registered interaction target");
        Ok(id)
    }

    /// Register an overlay that only follows show/hide and play-space moves.
    pub fn register_overlay(&self, overlay: SharedOverlay) -> OverlayId {
        let capabilities = overlay.lock().capabilities();
        let id = self.insert(overlay, capabilities, false);
        debug!(%id, "Registered passive overlay");
        id
    }

    /// Remove an overlay. Returns `false` if it was not registered.
    pub fn unregister_overlay(&self, id: OverlayId) -> bool {
        let mut live = self.inner.lock();
        let before = live.overlays.len();
        live.overlays.retain(|entry| entry.id != id);
        let removed = live.overlays.len() != before;
        if removed {
            debug!(%id, "Unregistered overlay");
        }
        removed
    }

    /// Add a fallback handler consulted in registration order.
    pub fn register_custom_interaction(
        &self,
        name: &str,
        callback: impl FnMut(&InteractionArgs) -> InteractionResult + Send + 'static,
    ) -> CustomInteractionHandle {
        let mut live = self.inner.lock();
        live.next_interaction += 1;
        let handle = CustomInteractionHandle(live.next_interaction);
        live.interactions.push(CustomInteraction::new(handle, name, Box::new(callback)));
        debug!(interaction = name, "Registered custom interaction");
        handle
    }

    /// Remove a fallback handler. Returns `false` if it was not registered.
    pub fn unregister_custom_interaction(&self, handle: CustomInteractionHandle) -> bool {
        let mut live = self.inner.lock();
        let before = live.interactions.len();
        live.interactions.retain(|entry| entry.handle != handle);
        live.interactions.len() != before
    }

    /// Every registered overlay, in registration order.
    pub fn overlays(&self) -> Vec<SharedOverlay> {
        self.inner
            .lock()
            .overlays
            .iter()
            .map(|entry| Arc::clone(&entry.overlay))
            .collect()
    }

    /// Number of registered overlays.
    pub fn overlay_count(&self) -> usize {
        self.inner.lock().overlays.len()
    }

    pub(crate) fn snapshot(&self) -> Snapshot {
        let live = self.inner.lock();
        Snapshot {
            overlays: live.overlays.clone(),
            interactions: live.interactions.clone(),
        }
    }
}
