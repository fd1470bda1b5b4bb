#![warn(missing_docs)]
//! Pointer/overlay interaction engine for raydesk
//!
//! Two hand-held ray pointers interact with panels ("overlays") placed in world
//! space. Once per frame the [`ArbitrationEngine`] casts each pointer's ray at
//! every interactive overlay, routes it to the nearest hit and dispatches hover,
//! click, scroll and grab events to that overlay's [`OverlayBehavior`].
//!
//! # Features
//!
//! - **Nearest-hit arbitration**: each pointer reaches at most one overlay per frame
//! - **Primary pointer**: per overlay, the hand that hovered or clicked first
//! - **Grab and carry**: grabbable overlays follow the pointer and can be pushed,
//!   pulled and resized with the scroll axis
//! - **Release actions**: work deferred until the next click release
//! - **Custom interactions**: fallback handlers for rays that hit nothing
//!
//! # Example
//!
//! ```rust
//! use glam::{Affine3A, Vec3};
//! use raydesk_input::{FrameInput, Hand};
//! use raydesk_interaction::{
//!     ArbitrationEngine, Capabilities, InteractionConfig, Overlay, PointerOutcome,
//! };
//!
//! let mut engine = ArbitrationEngine::new(&InteractionConfig::default());
//! let panel = Overlay::new("desktop", 1.6)
//!     .with_capabilities(Capabilities::HOVER | Capabilities::GRAB)
//!     .with_content(1920, 1080)
//!     .with_transform(Affine3A::from_translation(Vec3::new(0.0, 0.0, -2.0)))
//!     .shared();
//! let id = engine.register_target(panel).unwrap();
//!
//! // Both pointers at the origin, looking down -Z.
//! let mut input = FrameInput::default();
//! let report = engine.update(&mut input);
//! assert!(matches!(
//!     report.outcome(Hand::Left),
//!     PointerOutcome::Hit { overlay, .. } if overlay == id
//! ));
//! ```

pub mod config;
mod custom;
mod engine;
mod error;
mod hit;
mod overlay;
mod playspace;
mod pointer;
mod ptt;
mod registrar;
mod target;

pub use config::{InteractionConfig, ModeColors, PushToTalkConfig};
pub use custom::{CustomInteractionFn, CustomInteractionHandle, InteractionArgs, InteractionResult};
pub use engine::{ArbitrationEngine, FrameReport, PointerOutcome};
pub use error::{ColorParseError, InteractionError};
pub use hit::PointerHit;
pub use overlay::{
    Capabilities, NoBehavior, Overlay, OverlayBehavior, OverlayId, SharedOverlay,
    FAR_RESET_DISTANCE, NEAR_RESET_DISTANCE,
};
pub use playspace::{PlaySpaceMover, SpaceMover};
pub use pointer::{PointerState, PointerVisual, ReleaseAction, ReleaseQueue};
pub use ptt::{push_to_talk, push_to_talk_with};
pub use registrar::Registrar;
pub use target::{
    InteractionTarget, MAX_GRAB_DISTANCE, MAX_SCALE, MIN_GRAB_DISTANCE, MIN_SCALE,
};
