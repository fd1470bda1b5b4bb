//! User-tunable interaction settings.

use crate::error::ColorParseError;
use glam::Vec3;
use raydesk_input::{Hand, ModeOptions, PointerMode};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Laser color while in left-click mode.
pub const DEFAULT_PRIMARY_COLOR: &str = "#006080";
/// Laser color while in right-click mode.
pub const DEFAULT_SHIFT_COLOR: &str = "#B03000";
/// Laser color while in middle-click mode.
pub const DEFAULT_ALT_COLOR: &str = "#600080";

/// Settings consumed by [`crate::ArbitrationEngine`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InteractionConfig {
    /// Rolling the wrist outwards selects right-click.
    pub right_click_orientation: bool,
    /// Rolling the wrist inwards selects middle-click.
    pub middle_click_orientation: bool,
    /// `#RRGGBB` laser color in left-click mode.
    pub primary_color: String,
    /// `#RRGGBB` laser color in right-click mode.
    pub shift_color: String,
    /// `#RRGGBB` laser color in middle-click mode.
    pub alt_color: String,
    /// Push-to-talk bound to the left hand's alt-click.
    pub left_ptt: PushToTalkConfig,
    /// Push-to-talk bound to the right hand's alt-click.
    pub right_ptt: PushToTalkConfig,
}

impl Default for InteractionConfig {
    fn default() -> Self {
        Self {
            right_click_orientation: true,
            middle_click_orientation: true,
            primary_color: DEFAULT_PRIMARY_COLOR.to_string(),
            shift_color: DEFAULT_SHIFT_COLOR.to_string(),
            alt_color: DEFAULT_ALT_COLOR.to_string(),
            left_ptt: PushToTalkConfig::default(),
            right_ptt: PushToTalkConfig::default(),
        }
    }
}

/// Commands run while alt-click is held with the pointer off every overlay.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PushToTalkConfig {
    /// Register the push-to-talk interaction for this hand.
    pub enabled: bool,
    /// Program and arguments run when alt-click is pressed.
    pub down_cmd: Option<Vec<String>>,
    /// Program and arguments run when alt-click is released.
    pub up_cmd: Option<Vec<String>>,
}

impl InteractionConfig {
    /// Orientation switches for mode classification.
    pub fn mode_options(&self) -> ModeOptions {
        ModeOptions {
            right_click_orientation: self.right_click_orientation,
            middle_click_orientation: self.middle_click_orientation,
        }
    }

    /// Parsed laser colors. Unparseable entries fall back to the defaults.
    pub fn mode_colors(&self) -> ModeColors {
        let pick = |value: &str, fallback: &str| match parse_hex_color(value) {
            Ok(color) => color,
            Err(err) => {
                warn!(%err, fallback, "Invalid laser color; using default");
                parse_hex_color(fallback).unwrap_or(Vec3::ONE)
            }
        };

        ModeColors([
            pick(&self.primary_color, DEFAULT_PRIMARY_COLOR),
            pick(&self.shift_color, DEFAULT_SHIFT_COLOR),
            pick(&self.alt_color, DEFAULT_ALT_COLOR),
        ])
    }

    /// Push-to-talk settings for `hand`.
    pub fn push_to_talk(&self, hand: Hand) -> &PushToTalkConfig {
        match hand {
            Hand::Left => &self.left_ptt,
            Hand::Right => &self.right_ptt,
        }
    }
}

/// sRGB laser colors indexed by [`PointerMode`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModeColors([Vec3; 3]);

impl ModeColors {
    /// Color for the given pointer mode.
    pub fn for_mode(&self, mode: PointerMode) -> Vec3 {
        self.0[mode.index()]
    }
}

impl Default for ModeColors {
    fn default() -> Self {
        InteractionConfig::default().mode_colors()
    }
}

/// Parse `#RRGGBB` (leading `#` optional) into sRGB components in `[0, 1]`.
///
/// Channels are scaled as stored; no gamma conversion is applied.
pub fn parse_hex_color(value: &str) -> Result<Vec3, ColorParseError> {
    let digits = value.trim().trim_start_matches('#');
    if digits.len() != 6 || !digits.is_ascii() {
        return Err(ColorParseError(value.to_string()));
    }

    let channel = |range: std::ops::Range<usize>| {
        u8::from_str_radix(&digits[range], 16)
            .map(|c| c as f32 / 255.0)
            .map_err(|_| ColorParseError(value.to_string()))
    };

    Ok(Vec3::new(channel(0..2)?, channel(2..4)?, channel(4..6)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_hex_colors() {
        let color = parse_hex_color("#FF8000").unwrap();
        assert!((color - Vec3::new(1.0, 128.0 / 255.0, 0.0)).length() < 1e-6);
        assert_eq!(parse_hex_color("000000").unwrap(), Vec3::ZERO);
    }

    #[test]
    fn channels_keep_srgb_encoding() {
        // Mid grey stays at 0x80 / 255; a linearizing decode would give ~0.216.
        let grey = parse_hex_color("#808080").unwrap();
        assert!((grey - Vec3::splat(128.0 / 255.0)).length() < 1e-6);
    }

    #[test]
    fn rejects_malformed_colors() {
        assert!(parse_hex_color("#FFF").is_err());
        assert!(parse_hex_color("#GG0000").is_err());
        assert!(parse_hex_color("#ÿÿÿ").is_err());
    }

    #[test]
    fn bad_color_falls_back_to_default() {
        let config = InteractionConfig {
            shift_color: "not a color".into(),
            ..Default::default()
        };
        let colors = config.mode_colors();
        assert_eq!(
            colors.for_mode(PointerMode::Right),
            parse_hex_color(DEFAULT_SHIFT_COLOR).unwrap()
        );
    }

    #[test]
    fn ptt_is_looked_up_per_hand() {
        let mut config = InteractionConfig::default();
        config.right_ptt.enabled = true;
        assert!(!config.push_to_talk(Hand::Left).enabled);
        assert!(config.push_to_talk(Hand::Right).enabled);
    }
}
