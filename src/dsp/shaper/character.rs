use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::f32::consts::FRAC_PI_2;

/// The smaller three-way catalog. Each character is applied to every sample
/// regardless of the sign split used by [`super::ShapingPolicy::Split`].
#[derive(ValueEnum, Copy, Clone, Debug, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum Character {
    /// Asymmetric: cubic soft clip below zero, scaled tanh above.
    #[default]
    Vintage,
    /// Clamped quintic soft clip.
    Modern,
    /// Two-sine fold, clamped.
    Apocalypse,
}

impl std::fmt::Display for Character {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Vintage => write!(f, "Vintage"),
            Self::Modern => write!(f, "Modern"),
            Self::Apocalypse => write!(f, "Apocalypse"),
        }
    }
}

impl Character {
    pub const ALL: [Self; 3] = [Self::Vintage, Self::Modern, Self::Apocalypse];

    /// Apply the character curve to an already gained sample.
    #[inline]
    pub fn apply(self, x: f32) -> f32 {
        match self {
            Self::Vintage => {
                if x < 0.0 {
                    let x = x.clamp(-1.0, 1.0);
                    1.5 * (x - x.powi(3) / 3.0)
                } else {
                    1.5 * x.tanh()
                }
            }

            Self::Modern => {
                let x = x.clamp(-1.0, 1.0);
                1.25 * (x - x.powi(5) / 5.0)
            }

            Self::Apocalypse => {
                let folded = 0.5 * ((FRAC_PI_2 * x).sin() + (3.0 * FRAC_PI_2 * x).sin());
                folded.clamp(-1.0, 1.0)
            }
        }
    }
}
