//! Operator model: the parameter sets a user stages and applies.
//!
//! Two operator kinds exist. A transparency operator keys matching pixels out
//! to alpha 0; a color-change operator shifts hue/saturation/brightness and
//! rescales contrast for matching pixels. Both carry a [0, 1000] per-mille
//! tolerance. A third, the unaffected color, is not an operator but an
//! exclusion evaluated before everything else.
//!
//! The `Default` impl of each state is its identity: no color picked (the
//! operator matches nothing), tolerance at the UI's starting position of 50,
//! all adjustments zero. Histories and staging slots are seeded with it.

use serde::{Deserialize, Serialize};

use crate::color::RgbaColor;

/// Tolerance the UI sliders start at.
pub const DEFAULT_TOLERANCE: u16 = 50;

/// "Pixels within `tolerance` of `color` become fully transparent."
///
/// `color: None` is the staged placeholder before the user picks a color;
/// such an operator matches nothing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransparencyState {
    pub color: Option<RgbaColor>,
    pub tolerance: u16,
}

impl Default for TransparencyState {
    fn default() -> Self {
        Self {
            color: None,
            tolerance: DEFAULT_TOLERANCE,
        }
    }
}

/// "Pixels within `tolerance` of `target` get hue rotated by `hue` degrees,
/// saturation/brightness shifted additively and contrast rescaled."
///
/// `sharpness` is carried through state, serialization and scripts but has no
/// pixel effect; the slider exists in the UI ahead of the actual filter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColorChangeState {
    pub target: Option<RgbaColor>,
    pub tolerance: u16,
    /// Hue rotation in degrees, [-180, 180]
    pub hue: i16,
    /// Saturation shift in percent of full range, [-100, 100]
    pub saturation: i16,
    /// Brightness shift in percent of full range, [-100, 100]
    pub brightness: i16,
    /// Contrast adjustment, [-100, 100]
    pub contrast: i16,
    /// Reserved, [0, 100]; no pixel effect yet
    pub sharpness: u16,
}

impl Default for ColorChangeState {
    fn default() -> Self {
        Self {
            target: None,
            tolerance: DEFAULT_TOLERANCE,
            hue: 0,
            saturation: 0,
            brightness: 0,
            contrast: 0,
            sharpness: 0,
        }
    }
}

/// A color+tolerance region excluded from all processing. Checked before any
/// operator, so a matching pixel is always copied through untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnaffectedColorState {
    pub enabled: bool,
    pub color: Option<RgbaColor>,
    pub tolerance: u16,
}

impl Default for UnaffectedColorState {
    fn default() -> Self {
        Self {
            enabled: false,
            color: None,
            tolerance: DEFAULT_TOLERANCE,
        }
    }
}

/// One recorded Apply event. Serializes as
/// `{"type": "transparency" | "colorChange", "params": {...}}`, the action
/// script wire format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "params")]
pub enum Action {
    #[serde(rename = "transparency")]
    Transparency(TransparencyState),
    #[serde(rename = "colorChange")]
    ColorChange(ColorChangeState),
}
