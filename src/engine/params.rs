use crate::dsp::shaper::ShapingPolicy;
use arc_swap::ArcSwap;
use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;
use std::sync::Arc;

pub const INPUT_GAIN_DB: RangeInclusive<f32> = 0.0..=30.0;
pub const OUTPUT_GAIN_DB: RangeInclusive<f32> = -12.0..=12.0;
pub const CUTOFF_HZ: RangeInclusive<f32> = 20.0..=18_000.0;

/// Parameter values for one block. The engine only ever reads these.
#[derive(Copy, Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Params {
    pub input_gain_db: f32,
    pub output_gain_db: f32,
    pub shaping: ShapingPolicy,
    pub cutoff_hz: f32,
}

impl Default for Params {
    fn default() -> Self {
        Self {
            input_gain_db: 0.0,
            output_gain_db: 0.0,
            shaping: ShapingPolicy::default(),
            cutoff_hz: *CUTOFF_HZ.end(),
        }
    }
}

impl std::fmt::Display for Params {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Input Gain: {}", format_gain_db(self.input_gain_db))?;
        writeln!(f, "Output Gain: {}", format_gain_db(self.output_gain_db))?;
        writeln!(f, "Shaping: {}", self.shaping)?;
        writeln!(f, "Cutoff: {}", format_frequency(self.cutoff_hz))?;
        Ok(())
    }
}

impl Params {
    /// Pin every value into its published range.
    pub fn clamped(self) -> Self {
        Self {
            input_gain_db: clamp_to(self.input_gain_db, &INPUT_GAIN_DB),
            output_gain_db: clamp_to(self.output_gain_db, &OUTPUT_GAIN_DB),
            cutoff_hz: clamp_to(self.cutoff_hz, &CUTOFF_HZ),
            ..self
        }
    }

    pub fn is_in_range(&self) -> bool {
        INPUT_GAIN_DB.contains(&self.input_gain_db)
            && OUTPUT_GAIN_DB.contains(&self.output_gain_db)
            && CUTOFF_HZ.contains(&self.cutoff_hz)
    }
}

fn clamp_to(value: f32, range: &RangeInclusive<f32>) -> f32 {
    value.clamp(*range.start(), *range.end())
}

/// Gains are shown with two decimals: `-3.00 dB`.
pub fn format_gain_db(db: f32) -> String {
    format!("{db:.2} dB")
}

/// Frequencies are shown without decimals: `1500 Hz`.
pub fn format_frequency(hz: f32) -> String {
    format!("{hz:.0} Hz")
}

/// Parse a gain typed as `-3`, `-3.00 dB` or `-3dB`.
pub fn parse_gain_db(text: &str) -> Option<f32> {
    parse_with_unit(text, "db")
}

/// Parse a frequency typed as `1500`, `1500 Hz` or `1.5 kHz`.
pub fn parse_frequency(text: &str) -> Option<f32> {
    let lower = text.trim().to_ascii_lowercase();
    if let Some(khz) = lower.strip_suffix("khz") {
        return khz
            .trim()
            .parse::<f32>()
            .ok()
            .filter(|v| v.is_finite())
            .map(|v| v * 1000.0);
    }
    parse_with_unit(&lower, "hz")
}

fn parse_with_unit(text: &str, unit: &str) -> Option<f32> {
    let lower = text.trim().to_ascii_lowercase();
    let number = lower.strip_suffix(unit).unwrap_or(&lower);
    number.trim().parse::<f32>().ok().filter(|v| v.is_finite())
}

/// Publishing side of a shared parameter snapshot.
///
/// A control thread stores complete [`Params`] values; the audio side reads a
/// consistent copy once per block through a [`ParamsReader`].
pub struct ParamStore {
    current: Arc<ArcSwap<Params>>,
}

pub struct ParamsReader {
    current: Arc<ArcSwap<Params>>,
}

impl ParamStore {
    pub fn new(initial: Params) -> (Self, ParamsReader) {
        let current = Arc::new(ArcSwap::from_pointee(initial));
        (
            Self {
                current: Arc::clone(&current),
            },
            ParamsReader { current },
        )
    }

    pub fn store(&self, params: Params) {
        self.current.store(Arc::new(params));
    }

    /// Apply `f` to the current snapshot and publish the result.
    pub fn update(&self, f: impl Fn(&mut Params)) {
        self.current.rcu(|current| {
            let mut next = **current;
            f(&mut next);
            next
        });
    }
}

impl ParamsReader {
    pub fn snapshot(&self) -> Params {
        **self.current.load()
    }
}
