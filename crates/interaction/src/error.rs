use raydesk_input::Hand;
use thiserror::Error;

/// Errors raised while wiring pointers and overlays into the engine.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum InteractionError {
    /// An overlay was registered as a target without hover or grab support.
    #[error("overlay `{0}` supports neither hover nor grab")]
    NoCapabilities(String),

    /// Both pointer visuals report the same hand.
    #[error("both pointers are bound to the {0} hand")]
    DuplicateHand(Hand),
}

/// Error parsing a `#RRGGBB` color string.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("color `{0}` is not of the form #RRGGBB")]
pub struct ColorParseError(pub String);
