//! Memoryless waveshaping.
//!
//! Every function here is pure: gain in, transfer curve, gain out. There is no
//! state to reset and nothing allocates, so these are safe to call from the
//! audio thread for every sample.

pub mod character;
pub mod mode;

pub use character::Character;
pub use mode::Mode;

use serde::{Deserialize, Serialize};

/// Which catalog is used and how the signal is split between curves.
#[derive(Copy, Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ShapingPolicy {
    /// One mode for the whole signal.
    Single { mode: Mode },
    /// `top` shapes samples >= 0, `bottom` shapes samples < 0.
    Split { top: Mode, bottom: Mode },
    /// The alternate three-way catalog, applied to every sample.
    Character { character: Character },
}

impl Default for ShapingPolicy {
    fn default() -> Self {
        Self::Single {
            mode: Mode::default(),
        }
    }
}

impl std::fmt::Display for ShapingPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Single { mode } => write!(f, "{mode}"),
            Self::Split { top, bottom } => write!(f, "{top} / {bottom}"),
            Self::Character { character } => write!(f, "{character}"),
        }
    }
}

impl From<Mode> for ShapingPolicy {
    fn from(mode: Mode) -> Self {
        Self::Single { mode }
    }
}

impl From<Character> for ShapingPolicy {
    fn from(character: Character) -> Self {
        Self::Character { character }
    }
}

/// Shape one sample with a single mode.
#[inline]
pub fn shape(sample: f32, input_gain_linear: f32, output_gain_linear: f32, mode: Mode) -> f32 {
    mode.apply(sample * input_gain_linear) * output_gain_linear
}

/// Shape one sample according to `policy`.
///
/// For [`ShapingPolicy::Split`] the curve is picked per sample from the sign
/// of the incoming sample.
#[inline]
pub fn shape_with_policy(
    sample: f32,
    input_gain_linear: f32,
    output_gain_linear: f32,
    policy: ShapingPolicy,
) -> f32 {
    match policy {
        ShapingPolicy::Single { mode } => shape(sample, input_gain_linear, output_gain_linear, mode),
        ShapingPolicy::Split { top, bottom } => {
            let mode = if sample >= 0.0 { top } else { bottom };
            shape(sample, input_gain_linear, output_gain_linear, mode)
        }
        ShapingPolicy::Character { character } => {
            character.apply(sample * input_gain_linear) * output_gain_linear
        }
    }
}
