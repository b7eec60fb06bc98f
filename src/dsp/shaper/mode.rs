use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::f32::consts::{FRAC_PI_2, FRAC_PI_4, PI};

/// The twelve-way transfer function catalog.
///
/// Most variants clamp the gained sample to `[-1, 1]` before the curve is
/// applied. The fold variants (`SineFold`, `TanFold`, `SinTan`, `TanSin`) run
/// the curve first and clamp the result, so the order is part of the sound.
#[derive(ValueEnum, Copy, Clone, Debug, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum Mode {
    #[default]
    Hard,
    Quintic,
    Cubic,
    Sine,
    Sigmoid,
    Tanh,
    Arctan,
    SineFold,
    Tan,
    TanFold,
    SinTan,
    TanSin,
}

impl std::fmt::Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::Hard => "Hard",
            Self::Quintic => "Quintic",
            Self::Cubic => "Cubic",
            Self::Sine => "Sine",
            Self::Sigmoid => "Sigmoid",
            Self::Tanh => "Tanh",
            Self::Arctan => "Arctan",
            Self::SineFold => "Sine Fold",
            Self::Tan => "Tan",
            Self::TanFold => "Tan Fold",
            Self::SinTan => "Sin(Tan)",
            Self::TanSin => "Tan(Sin)",
        };
        write!(f, "{label}")
    }
}

#[inline]
fn clip(x: f32) -> f32 {
    x.clamp(-1.0, 1.0)
}

impl Mode {
    pub const ALL: [Self; 12] = [
        Self::Hard,
        Self::Quintic,
        Self::Cubic,
        Self::Sine,
        Self::Sigmoid,
        Self::Tanh,
        Self::Arctan,
        Self::SineFold,
        Self::Tan,
        Self::TanFold,
        Self::SinTan,
        Self::TanSin,
    ];

    /// Apply the transfer function to an already gained sample.
    #[inline]
    pub fn apply(self, x: f32) -> f32 {
        match self {
            Self::Hard => clip(x),

            Self::Quintic => {
                let x = clip(x);
                1.25 * (x - x.powi(5) / 5.0)
            }

            Self::Cubic => {
                let x = clip(x);
                1.5 * (x - x.powi(3) / 3.0)
            }

            Self::Sine => (FRAC_PI_2 * clip(x)).sin(),

            Self::Sigmoid => {
                let x = clip(x);
                2.0 / (1.0 + (-6.0 * x).exp()) - 1.0
            }

            Self::Tanh => (PI * clip(x)).tanh(),

            Self::Arctan => (2.0 / 3.0) * (4.0 * PI * clip(x)).atan(),

            Self::SineFold => clip((FRAC_PI_2 * x).sin()),

            Self::Tan => (FRAC_PI_4 * clip(x)).tan(),

            // Unbounded near the asymptotes at |x| = 2 (mod 4); the clamp catches it.
            Self::TanFold => clip((FRAC_PI_4 * x).tan()),

            Self::SinTan => clip(x.tan().sin()),

            Self::TanSin => clip(x.sin().tan()),
        }
    }

    /// Whether the curve clamps its input before shaping.
    pub const fn clamps_first(self) -> bool {
        !matches!(
            self,
            Self::SineFold | Self::TanFold | Self::SinTan | Self::TanSin
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sweep() -> impl Iterator<Item = f32> {
        (-400..=400).map(|i| i as f32 / 100.0)
    }

    #[test]
    fn every_mode_passes_through_origin() {
        for mode in Mode::ALL {
            assert_eq!(mode.apply(0.0), 0.0, "{mode} does not pass the origin");
        }
    }

    #[test]
    fn hard_clips_at_unity() {
        assert_eq!(Mode::Hard.apply(2.0), 1.0);
        assert_eq!(Mode::Hard.apply(-2.0), -1.0);
        assert_eq!(Mode::Hard.apply(0.25), 0.25);
    }

    #[test]
    fn polynomial_modes_hit_unity_at_the_clip_point() {
        assert!((Mode::Quintic.apply(1.0) - 1.0).abs() < 1e-6);
        assert!((Mode::Cubic.apply(1.0) - 1.0).abs() < 1e-6);
        assert!((Mode::Quintic.apply(5.0) - 1.0).abs() < 1e-6);
        assert!((Mode::Cubic.apply(-5.0) + 1.0).abs() < 1e-6);
    }

    #[test]
    fn literal_formulas_hold() {
        let x = 0.3f32;
        assert_eq!(Mode::Quintic.apply(x), 1.25 * (x - x.powi(5) / 5.0));
        assert_eq!(Mode::Cubic.apply(x), 1.5 * (x - x.powi(3) / 3.0));
        assert_eq!(Mode::Sine.apply(x), (FRAC_PI_2 * x).sin());
        assert_eq!(
            Mode::Sigmoid.apply(x),
            2.0 / (1.0 + (-6.0 * x).exp()) - 1.0
        );
        assert_eq!(Mode::Tanh.apply(x), (PI * x).tanh());
        assert_eq!(Mode::Arctan.apply(x), (2.0 / 3.0) * (4.0 * PI * x).atan());
        assert_eq!(Mode::Tan.apply(x), (FRAC_PI_4 * x).tan());
        assert_eq!(Mode::SinTan.apply(x), x.tan().sin());
        assert_eq!(Mode::TanSin.apply(x), x.sin().tan());
    }

    #[test]
    fn clamp_order_changes_the_curve() {
        // Sine clamps first and saturates at 1; SineFold folds back past x = 1.
        assert!((Mode::Sine.apply(1.5) - 1.0).abs() < 1e-6);
        let folded = Mode::SineFold.apply(1.5);
        assert!((folded - (FRAC_PI_2 * 1.5).sin()).abs() < 1e-6);
        assert!(folded < 0.75);

        // Tan clamps first so it tops out at tan(pi/4); TanFold clips the raw tangent.
        assert!((Mode::Tan.apply(1.5) - 1.0).abs() < 1e-6);
        assert_eq!(Mode::TanFold.apply(1.5), 1.0);
    }

    #[test]
    fn outputs_stay_within_each_curves_range() {
        let arctan_bound = (2.0 / 3.0) * (4.0 * PI).atan();
        for x in sweep() {
            assert!(Mode::Hard.apply(x).abs() <= 1.0);
            assert!(Mode::Quintic.apply(x).abs() <= 1.0 + 1e-6);
            assert!(Mode::Cubic.apply(x).abs() <= 1.0 + 1e-6);
            assert!(Mode::Sine.apply(x).abs() <= 1.0);
            assert!(Mode::Sigmoid.apply(x).abs() < 1.0);
            assert!(Mode::Tanh.apply(x).abs() < 1.0);
            assert!(Mode::Arctan.apply(x).abs() <= arctan_bound + 1e-6);
            assert!(Mode::SineFold.apply(x).abs() <= 1.0);
            assert!(Mode::Tan.apply(x).abs() <= 1.0 + 1e-6);
            assert!(Mode::TanFold.apply(x).abs() <= 1.0);
            assert!(Mode::SinTan.apply(x).abs() <= 1.0);
            assert!(Mode::TanSin.apply(x).abs() <= 1.0);
        }
    }

    #[test]
    fn clamping_modes_are_odd_symmetric() {
        for mode in Mode::ALL.into_iter().filter(|m| m.clamps_first()) {
            for x in sweep() {
                let diff = mode.apply(x) + mode.apply(-x);
                assert!(diff.abs() < 1e-5, "{mode} is not odd at x={x}");
            }
        }
    }

    #[test]
    fn value_enum_names_are_kebab_case() {
        let names: Vec<String> = Mode::value_variants()
            .iter()
            .filter_map(|m| m.to_possible_value())
            .map(|v| v.get_name().to_string())
            .collect();
        assert!(names.contains(&"sine-fold".to_string()));
        assert!(names.contains(&"tan-sin".to_string()));
        assert_eq!(names.len(), Mode::ALL.len());
    }
}
